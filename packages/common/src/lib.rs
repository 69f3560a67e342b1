pub mod retry;
pub mod storage;
pub mod try_on_status;

pub use try_on_status::TryOnStatus;
