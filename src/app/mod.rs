pub mod context;
pub mod error;
pub mod submission;

pub use context::AppContext;
pub use error::{Result, TributaryError};
pub use submission::submit;
