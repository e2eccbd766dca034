use std::collections::BTreeMap;

use tracing::debug;

use crate::catalog::EpisodeKey;

/// Maps an episode to a playable media URL. `None` means there is nothing to play,
/// which the player view shows as a normal state.
pub trait SourceResolver {
    fn resolve(&self, key: &EpisodeKey) -> Option<String>;
}

/// Fixed lookup table keyed by `"{show}-{season}-{episode}"`
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    entries: BTreeMap<String, String>,
}

impl SourceTable {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl SourceResolver for SourceTable {
    fn resolve(&self, key: &EpisodeKey) -> Option<String> {
        let url = self
            .entries
            .get(&key.to_string())
            .map(|u| u.trim())
            .filter(|u| !u.is_empty())
            .map(str::to_string);
        debug!(key = %key, found = url.is_some(), "Resolved playback source");
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SourceTable {
        SourceTable::new(BTreeMap::from([
            ("1429-1-1".to_string(), "https://example.test/aot.mp4".to_string()),
            ("1429-1-2".to_string(), "   ".to_string()),
        ]))
    }

    #[test]
    fn test_resolve_by_key() {
        assert_eq!(
            table().resolve(&EpisodeKey::new(1429, 1, 1)).as_deref(),
            Some("https://example.test/aot.mp4")
        );
    }

    #[test]
    fn test_missing_or_blank_is_none() {
        let table = table();

        assert_eq!(table.resolve(&EpisodeKey::new(1429, 1, 3)), None);
        assert_eq!(table.resolve(&EpisodeKey::new(1429, 1, 2)), None);
        assert_eq!(table.resolve(&EpisodeKey::new(14, 291, 1)), None);
        assert_eq!(table.len(), 2);
    }
}
