pub mod config;
pub mod context;
pub mod error;

pub use config::BeaconConfig;
pub use context::PageContext;
pub use error::{BeaconError, BeaconResult};
