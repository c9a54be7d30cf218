use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::sync::LazyLock;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// A letter followed by letters or digits
static USERNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9]*$").unwrap());

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("must not be blank")));
    }
    Ok(())
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    not_blank(username)?;
    if !USERNAME_PATTERN.is_match(username) {
        return Err(ValidationError::new("pattern").with_message(Cow::Borrowed(
            "Username must start with a letter and contain only letters and digits",
        )));
    }
    Ok(())
}

/// Treats an explicit `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Postal address owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: i32,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// A persisted user.
///
/// Equality and hashing cover every field, addresses included, so a set of
/// users collapses value-equal entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Assigned by the store on creation, always positive
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    /// Stored and compared as plain text; never serialized in responses
    #[serde(default, skip_serializing)]
    #[schema(write_only)]
    pub password: String,
    pub email: String,
    #[serde(default)]
    pub addresses: Vec<Address>,
}

/// Request body for `POST /users/add`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[validate(length(min = 2, message = "First name must be at least 2 characters"))]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    #[schema(nullable)]
    pub last_name: String,
    #[validate(
        length(min = 5, message = "Username must be at least 5 characters"),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[validate(custom(function = "not_blank"))]
    pub password: String,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    #[schema(nullable)]
    #[validate(nested)]
    pub addresses: Vec<CreateAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddress {
    #[validate(custom(function = "not_blank"))]
    pub street: String,
    #[validate(custom(function = "not_blank"))]
    pub city: String,
    #[validate(custom(function = "not_blank"))]
    pub state: String,
    #[validate(custom(function = "not_blank"))]
    pub zip: String,
}

/// User columns written on insert; the id comes back from the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
    pub email: String,
}

impl CreateUser {
    pub fn into_parts(self) -> (NewUser, Vec<CreateAddress>) {
        let user = NewUser {
            first_name: self.first_name,
            last_name: self.last_name,
            username: self.username,
            password: self.password,
            email: self.email,
        };
        (user, self.addresses)
    }
}

impl NewUser {
    pub fn into_user(self, id: i32, addresses: Vec<Address>) -> User {
        User {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            username: self.username,
            password: self.password,
            email: self.email,
            addresses,
        }
    }
}

impl CreateAddress {
    pub fn into_address(self, id: i32) -> Address {
        Address {
            id,
            street: self.street,
            city: self.city,
            state: self.state,
            zip: self.zip,
        }
    }
}
