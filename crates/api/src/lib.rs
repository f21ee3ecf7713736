pub mod error;
pub mod models;
pub mod parser;

// Re-export commonly used types
pub use error::{ApiError, ApiResult};
pub use models::*;
pub use parser::{ParseOutcome, SourceParser};
