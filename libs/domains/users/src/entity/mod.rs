//! SeaORM entities for the `users`, `addresses` and `users_addresses` tables.

pub mod address;
pub mod user;
pub mod user_address;
