pub mod auth;
pub mod request;
