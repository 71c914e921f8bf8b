pub mod calculations;
pub mod error;
pub mod models;

pub use error::{CalcError, NonConvergenceReason};
pub use models::*;
