mod duration;
mod events;
mod handle;
mod manager;
mod record;
mod table;
mod update;

pub use duration::format_duration;
pub use events::StatsCommand;
pub use handle::StatsHandle;
pub use manager::StatsManager;
pub use record::DeviceStatRecord;
pub use table::StatsTable;
pub use update::{DeviceStatSnapshot, DeviceStatUpdate};
