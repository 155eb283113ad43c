pub mod auth;
pub mod directory;
pub mod error;
pub mod schema;
pub mod seed;
