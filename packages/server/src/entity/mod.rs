pub mod product;
pub mod product_size;
pub mod size;
pub mod try_on;
pub mod try_on_history;
pub mod user;
pub mod user_profile;
