pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{session::SessionConfig, storage::LocalStorage, CliConfig};
pub use core::{engine::CalendarEngine, pipeline::IpoPipeline};
pub use utils::error::{CalError, Result};
