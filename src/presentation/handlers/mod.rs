mod engines;
mod error;
mod health;
mod transcribe;

pub use engines::engines_handler;
pub use error::{ApiError, ErrorResponse};
pub use health::health_handler;
pub use transcribe::transcribe_handler;
