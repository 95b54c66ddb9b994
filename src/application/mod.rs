pub mod catalog;
mod dependencies;
mod errors;
pub mod loan;
pub mod membership;
pub mod stats;

pub use dependencies::ServiceDependencies;
pub use errors::{ApplicationError, Result};
