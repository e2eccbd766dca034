use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod tmdb;

pub use tmdb::TmdbClient;

const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Show {
    pub id: u64,
    pub title: String,
    pub overview: String,
    pub backdrop_path: Option<String>,
    pub poster_path: Option<String>,
    pub genres: Vec<String>,
    pub rating: f64,
    pub season_count: u32,
    pub episode_count: u32,
    pub seasons: Vec<SeasonSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub id: u64,
    pub number: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SeasonDetail {
    pub number: u32,
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: u64,
    pub season_number: u32,
    pub number: u32,
    pub title: String,
    pub overview: String,
    pub still_path: Option<String>,
}

impl Show {
    pub fn overview_or_default(&self) -> &str {
        non_empty(&self.overview).unwrap_or("No overview available.")
    }
}

impl Episode {
    /// Title, falling back to "Episode N" when the catalog has none
    pub fn display_title(&self) -> String {
        match non_empty(&self.title) {
            Some(title) => title.to_string(),
            None => format!("Episode {}", self.number),
        }
    }

    pub fn overview_or_default(&self) -> &str {
        non_empty(&self.overview).unwrap_or("No description available.")
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Identifies one playable episode: `"{show}-{season}-{episode}"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EpisodeKey {
    pub show_id: u64,
    pub season: u32,
    pub episode: u32,
}

impl EpisodeKey {
    pub fn new(show_id: u64, season: u32, episode: u32) -> Self {
        Self {
            show_id,
            season,
            episode,
        }
    }
}

impl fmt::Display for EpisodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.show_id, self.season, self.episode)
    }
}

/// Absolute artwork URL for a catalog image path at the given size token
/// (`"original"`, `"w780"`, `"w300"`, ...).
pub fn image_url(path: Option<&str>, size: &str) -> Option<String> {
    let path = path.map(str::trim).filter(|p| !p.is_empty())?;
    if path.starts_with('/') {
        Some(format!("{}/{}{}", IMAGE_BASE_URL, size, path))
    } else {
        Some(format!("{}/{}/{}", IMAGE_BASE_URL, size, path))
    }
}

/// Show, season and episode records by id. `Ok(None)` means the catalog has no such record.
#[async_trait::async_trait]
pub trait CatalogProvider {
    async fn fetch_show(&self, id: u64) -> Result<Option<Show>>;

    async fn fetch_season_episodes(
        &self,
        show_id: u64,
        season_number: u32,
    ) -> Result<Option<SeasonDetail>>;

    async fn fetch_episode(
        &self,
        show_id: u64,
        season_number: u32,
        episode_number: u32,
    ) -> Result<Option<Episode>>;
}
