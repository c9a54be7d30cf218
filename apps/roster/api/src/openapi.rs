use axum_helpers::ErrorResponse;
use utoipa::OpenApi;

/// Root OpenAPI document; domain docs are nested under their route prefix.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Roster API",
        description = "User and address management"
    ),
    servers((url = "/api")),
    nest(
        (path = "/users", api = domain_users::ApiDoc)
    ),
    components(schemas(ErrorResponse))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_includes_user_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        assert!(paths.iter().any(|p| p.as_str() == "/users"));
        assert!(paths.iter().any(|p| p.as_str() == "/users/add"));
    }
}
