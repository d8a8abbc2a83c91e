mod http;
mod logging;
mod monitor;
mod rpc;
mod stats;

pub use http::Config as HttpConfig;
pub use logging::Config as LoggingConfig;
pub use monitor::Config as MonitorConfig;
pub use rpc::Config as RpcConfig;
pub use stats::Config as StatsConfig;
