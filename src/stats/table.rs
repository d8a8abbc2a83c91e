use std::collections::HashMap;

use super::DeviceStatRecord;

/// Device id to aggregate record. Owned by the stats manager; it performs
/// no synchronization of its own.
#[derive(Debug, Default)]
pub struct StatsTable {
    records: HashMap<String, DeviceStatRecord>,
}

impl StatsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table holding one fresh record per device id. Duplicate ids
    /// collapse into a single record.
    pub fn seed<I, S>(device_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let records = device_ids
            .into_iter()
            .map(|id| {
                let record = DeviceStatRecord::new(id);
                (record.device_id.clone(), record)
            })
            .collect();

        Self { records }
    }

    pub fn lookup(&self, device_id: &str) -> Option<&DeviceStatRecord> {
        self.records.get(device_id)
    }

    /// Store `record` over the existing entry for its device id. Unknown ids
    /// are never inserted; returns whether the record was stored.
    pub fn replace(&mut self, record: DeviceStatRecord) -> bool {
        match self.records.get_mut(&record.device_id) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, device_id: &str) -> bool {
        self.records.contains_key(device_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Known device ids, sorted
    pub fn device_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.records.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }
}
