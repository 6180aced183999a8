pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod timestamp;
pub mod validation;

pub use models::*;
pub use services::*;
pub use validation::{ClaimCommand, TimeRange, ValidationError};
