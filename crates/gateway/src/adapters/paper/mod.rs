//! Paper venue

mod config;
mod executor;

pub use config::PaperConfig;
pub use executor::PaperExecutor;
