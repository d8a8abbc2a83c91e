mod config;
mod init;
mod monitor;
mod roster;
mod stats;

pub use config::ConfigValidationError;
pub use init::InitializationError;
pub use monitor::MonitorError;
pub use roster::RosterError;
pub use stats::StatsError;
