pub mod auth;
pub mod cart;
pub mod product;
pub mod try_on;
pub mod user;
