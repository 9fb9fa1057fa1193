pub mod earnings;
pub mod error;
pub mod period;
pub mod projection;
pub mod revenue;
pub mod types;

#[cfg(feature = "samples")]
pub mod samples;

pub use error::ProjectionError;
pub use types::*;

/// Standard result type for all revproj operations
pub type ProjectionResult<T> = Result<T, ProjectionError>;
