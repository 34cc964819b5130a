pub mod config;
pub mod error;
pub mod types;

pub use config::EnrollcastConfig;
pub use error::{EnrollcastError, Result};
pub use types::*;
