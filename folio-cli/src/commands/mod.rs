//! CLI command implementations

mod build;
mod outline;

pub use build::build;
pub use outline::outline;
