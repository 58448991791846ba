pub mod bounded;
pub mod error;

pub use bounded::{bounded, BoundedTimeout};
pub use error::ApiError;
