use std::{collections::HashSet, path::Path};

use tracing::{info, warn};

use crate::{RosterError, StatsTable};

/// Read the device roster and build the initial stats table.
///
/// One device id per line. Surrounding whitespace is trimmed, blank lines
/// and `#` comments are skipped and repeated ids are kept once.
pub async fn load_roster(path: impl AsRef<Path>) -> Result<StatsTable, RosterError> {
    let path = path.as_ref();

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| RosterError::io(path, e))?;

    let device_ids = parse_roster(&content);
    if device_ids.is_empty() {
        return Err(RosterError::Empty(path.to_path_buf()));
    }

    info!("Loaded {} devices from {}", device_ids.len(), path.display());

    Ok(StatsTable::seed(device_ids))
}

pub fn parse_roster(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();

    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|id| {
            let fresh = seen.insert(*id);
            if !fresh {
                warn!("Duplicate device id in roster: {}", id);
            }
            fresh
        })
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_roster() {
        let content = "# fleet\n60-6b-44-84-dc-64\n\n  b4-45-52-a2-f1-3c \r\n60-6b-44-84-dc-64\n";
        assert_eq!(
            parse_roster(content),
            vec!["60-6b-44-84-dc-64", "b4-45-52-a2-f1-3c"]
        );
    }

    #[tokio::test]
    async fn test_load_roster() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("devices.csv");
        fs::write(&path, "d1\nd2\nd3\n").unwrap();

        let table = load_roster(&path).await.unwrap();
        assert_eq!(table.device_ids(), vec!["d1", "d2", "d3"]);
    }

    #[tokio::test]
    async fn test_missing_roster_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.csv");

        let err = load_roster(&path).await.unwrap_err();
        assert!(matches!(err, RosterError::Io { .. }));
    }

    #[tokio::test]
    async fn test_empty_roster_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("devices.csv");
        fs::write(&path, "# nothing here\n\n").unwrap();

        let err = load_roster(&path).await.unwrap_err();
        assert!(matches!(err, RosterError::Empty(_)));
    }
}
