use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::{CatalogProvider, Episode, Show};
use crate::error::{Error, Result};

pub type SharedCatalog = Arc<dyn CatalogProvider + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub message: String,
    pub retryable: bool,
}

impl From<&Error> for FetchFailure {
    fn from(e: &Error) -> Self {
        Self {
            message: e.to_string(),
            retryable: e.is_transient(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Ready(T),
    NotFound,
    Failed(FetchFailure),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Idle
    }
}

impl<T> LoadState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            LoadState::Failed(f) => Some(f),
            _ => None,
        }
    }

    fn from_result(result: Result<Option<T>>) -> Self {
        match result {
            Ok(Some(v)) => LoadState::Ready(v),
            Ok(None) => LoadState::NotFound,
            Err(e) => {
                warn!(error = %e, transient = e.is_transient(), "Catalog fetch failed");
                LoadState::Failed(FetchFailure::from(&e))
            }
        }
    }
}

/// Token for one issued request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Issues monotonically increasing request tokens. Only the latest one is current,
/// so a response carrying an older token belongs to a superseded request.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: u64,
}

impl RequestSequence {
    pub fn issue(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken(self.latest)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }
}

/// Fetches catalog records for the views
#[derive(Clone)]
pub struct MetadataLoader {
    catalog: SharedCatalog,
}

impl MetadataLoader {
    pub fn new(catalog: SharedCatalog) -> Self {
        Self { catalog }
    }

    pub async fn load_show(&self, show_id: u64) -> LoadState<Show> {
        debug!(show_id, "Loading show");
        LoadState::from_result(self.catalog.fetch_show(show_id).await)
    }

    /// A season the catalog does not know loads as an empty episode list
    pub async fn load_season(&self, show_id: u64, season: u32) -> LoadState<Vec<Episode>> {
        debug!(show_id, season, "Loading season");
        match self.catalog.fetch_season_episodes(show_id, season).await {
            Ok(detail) => LoadState::Ready(detail.map(|d| d.episodes).unwrap_or_default()),
            Err(e) => LoadState::from_result(Err(e)),
        }
    }

    pub async fn load_episode(&self, show_id: u64, season: u32, episode: u32) -> LoadState<Episode> {
        debug!(show_id, season, episode, "Loading episode");
        LoadState::from_result(self.catalog.fetch_episode(show_id, season, episode).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{SeasonDetail, SeasonSummary};

    struct FakeCatalog;

    fn episode(season: u32, number: u32) -> Episode {
        Episode {
            id: (season * 100 + number) as u64,
            season_number: season,
            number,
            title: String::new(),
            overview: String::new(),
            still_path: None,
        }
    }

    #[async_trait::async_trait]
    impl CatalogProvider for FakeCatalog {
        async fn fetch_show(&self, id: u64) -> Result<Option<Show>> {
            match id {
                1 => Ok(Some(Show {
                    id: 1,
                    title: "Frieren".to_string(),
                    seasons: vec![SeasonSummary { id: 10, number: 1 }],
                    ..Show::default()
                })),
                500 => Err(Error::Catalog {
                    status: 503,
                    message: "Service unavailable".to_string(),
                }),
                401 => Err(Error::Catalog {
                    status: 401,
                    message: "Invalid API key.".to_string(),
                }),
                _ => Ok(None),
            }
        }

        async fn fetch_season_episodes(
            &self,
            _show_id: u64,
            season_number: u32,
        ) -> Result<Option<SeasonDetail>> {
            if season_number == 1 {
                Ok(Some(SeasonDetail {
                    number: 1,
                    episodes: vec![episode(1, 1), episode(1, 2)],
                }))
            } else {
                Ok(None)
            }
        }

        async fn fetch_episode(
            &self,
            _show_id: u64,
            season_number: u32,
            episode_number: u32,
        ) -> Result<Option<Episode>> {
            Ok((season_number == 1 && episode_number <= 2)
                .then(|| episode(season_number, episode_number)))
        }
    }

    fn loader() -> MetadataLoader {
        MetadataLoader::new(Arc::new(FakeCatalog))
    }

    #[tokio::test]
    async fn test_show_states() {
        let loader = loader();

        let ready = loader.load_show(1).await;
        assert_eq!(ready.ready().map(|s| s.title.as_str()), Some("Frieren"));

        assert_eq!(loader.load_show(2).await, LoadState::NotFound);

        let transient = loader.load_show(500).await;
        assert!(transient.failure().unwrap().retryable);

        let terminal = loader.load_show(401).await;
        let failure = terminal.failure().unwrap();
        assert!(!failure.retryable);
        assert!(failure.message.contains("Invalid API key."));
    }

    #[tokio::test]
    async fn test_missing_season_is_empty() {
        let loader = loader();

        assert_eq!(loader.load_season(1, 1).await.ready().map(Vec::len), Some(2));
        assert_eq!(loader.load_season(1, 7).await, LoadState::Ready(Vec::new()));
    }

    #[tokio::test]
    async fn test_episode_states() {
        let loader = loader();

        assert_eq!(
            loader.load_episode(1, 1, 2).await.ready().map(|e| e.number),
            Some(2)
        );
        assert_eq!(loader.load_episode(1, 1, 3).await, LoadState::NotFound);
    }

    #[test]
    fn test_only_latest_token_is_current() {
        let mut seq = RequestSequence::default();

        let first = seq.issue();
        let second = seq.issue();
        assert!(!seq.is_current(first));
        assert!(seq.is_current(second));
        assert!(second > first);

        let third = seq.issue();
        assert!(!seq.is_current(second));
        assert!(seq.is_current(third));
    }

    #[test]
    fn test_load_state_accessors() {
        let state: LoadState<u32> = LoadState::default();
        assert_eq!(state, LoadState::Idle);
        assert!(LoadState::<u32>::Loading.is_loading());
        assert_eq!(LoadState::Ready(3).ready(), Some(&3));
    }
}
