pub mod config;
pub mod errors;
pub mod http_api;
pub mod logging;
pub mod monitor;
pub mod roster;
pub mod rpc;
pub mod stats;

pub use config::MonitorConfig;
pub use errors::{ConfigValidationError, InitializationError, MonitorError, RosterError, StatsError};
pub use monitor::{FleetMonitor, ListenAddrs};
pub use stats::{
    DeviceStatRecord, DeviceStatSnapshot, DeviceStatUpdate, StatsHandle, StatsManager, StatsTable,
};
