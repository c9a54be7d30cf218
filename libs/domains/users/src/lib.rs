//! Users Domain
//!
//! User records with their postal addresses, credential lookup, and the two
//! HTTP endpoints that list and add users.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← GET /users, POST /users/add (validated at the boundary)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← authenticate, find_all, add, remove, get_by_username, get_by_id
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← reads + UserUnitOfWork for writes (in-memory or PostgreSQL)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← User, Address, CreateUser, SeaORM entities
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{
//!     handlers,
//!     repository::InMemoryUserRepository,
//!     service::UserService,
//! };
//!
//! let repository = InMemoryUserRepository::new();
//! let service = UserService::new(repository);
//!
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{Address, CreateAddress, CreateUser, NewUser, User};
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository, UserUnitOfWork};
pub use service::UserService;
