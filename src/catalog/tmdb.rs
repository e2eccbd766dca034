use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::catalog::{CatalogProvider, Episode, SeasonDetail, SeasonSummary, Show};
use crate::config::CatalogConfig;
use crate::error::{Error, Result};

pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl TmdbClient {
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
        })
    }

    /// GET `path`; a 404 is `Ok(None)`
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let url = format!("{}{}", self.base_url, path);
        debug!(path = %path, "Catalog request");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(path = %path, "Catalog record not found");
            return Ok(None);
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Catalog {
                status: status.as_u16(),
                message: api_message(&body),
            });
        }

        Ok(Some(serde_json::from_str(&body)?))
    }
}

/// TMDB error bodies look like `{"status_code": 7, "status_message": "..."}`
fn api_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ApiError {
        status_message: String,
    }

    serde_json::from_str::<ApiError>(body)
        .map(|e| e.status_message)
        .unwrap_or_else(|_| body.chars().take(200).collect())
}

#[derive(Deserialize)]
struct TmdbShow {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    overview: Option<String>,
    backdrop_path: Option<String>,
    poster_path: Option<String>,
    #[serde(default)]
    genres: Vec<TmdbGenre>,
    #[serde(default)]
    vote_average: f64,
    #[serde(default)]
    number_of_seasons: u32,
    #[serde(default)]
    number_of_episodes: u32,
    #[serde(default)]
    seasons: Vec<TmdbSeasonSummary>,
}

#[derive(Deserialize)]
struct TmdbGenre {
    name: String,
}

#[derive(Deserialize)]
struct TmdbSeasonSummary {
    id: u64,
    season_number: u32,
}

#[derive(Deserialize)]
struct TmdbSeason {
    season_number: u32,
    #[serde(default)]
    episodes: Vec<TmdbEpisode>,
}

#[derive(Deserialize)]
struct TmdbEpisode {
    id: u64,
    season_number: u32,
    episode_number: u32,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    overview: Option<String>,
    still_path: Option<String>,
}

impl From<TmdbShow> for Show {
    fn from(s: TmdbShow) -> Self {
        Show {
            id: s.id,
            title: s.name,
            overview: s.overview.unwrap_or_default(),
            backdrop_path: s.backdrop_path,
            poster_path: s.poster_path,
            genres: s.genres.into_iter().map(|g| g.name).collect(),
            rating: s.vote_average,
            season_count: s.number_of_seasons,
            episode_count: s.number_of_episodes,
            seasons: s
                .seasons
                .into_iter()
                .map(|season| SeasonSummary {
                    id: season.id,
                    number: season.season_number,
                })
                .collect(),
        }
    }
}

impl From<TmdbEpisode> for Episode {
    fn from(e: TmdbEpisode) -> Self {
        Episode {
            id: e.id,
            season_number: e.season_number,
            number: e.episode_number,
            title: e.name.unwrap_or_default(),
            overview: e.overview.unwrap_or_default(),
            still_path: e.still_path,
        }
    }
}

impl From<TmdbSeason> for SeasonDetail {
    fn from(s: TmdbSeason) -> Self {
        SeasonDetail {
            number: s.season_number,
            episodes: s.episodes.into_iter().map(Episode::from).collect(),
        }
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbClient {
    async fn fetch_show(&self, id: u64) -> Result<Option<Show>> {
        let show: Option<TmdbShow> = self.get(&format!("/tv/{}", id)).await?;
        Ok(show.map(Show::from))
    }

    async fn fetch_season_episodes(
        &self,
        show_id: u64,
        season_number: u32,
    ) -> Result<Option<SeasonDetail>> {
        let season: Option<TmdbSeason> = self
            .get(&format!("/tv/{}/season/{}", show_id, season_number))
            .await?;
        Ok(season.map(SeasonDetail::from))
    }

    async fn fetch_episode(
        &self,
        show_id: u64,
        season_number: u32,
        episode_number: u32,
    ) -> Result<Option<Episode>> {
        let episode: Option<TmdbEpisode> = self
            .get(&format!(
                "/tv/{}/season/{}/episode/{}",
                show_id, season_number, episode_number
            ))
            .await?;
        Ok(episode.map(Episode::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_show() {
        let json = r#"{
            "id": 1429,
            "name": "Attack on Titan",
            "overview": "Humanity lives inside walls.",
            "backdrop_path": "/back.jpg",
            "poster_path": null,
            "genres": [{"id": 16, "name": "Animation"}, {"id": 10759, "name": "Action & Adventure"}],
            "vote_average": 8.664,
            "number_of_seasons": 4,
            "number_of_episodes": 94,
            "seasons": [
                {"id": 3627, "season_number": 0, "name": "Specials", "episode_count": 36},
                {"id": 3624, "season_number": 1, "name": "Season 1", "episode_count": 25}
            ],
            "status": "Ended"
        }"#;

        let show: Show = serde_json::from_str::<TmdbShow>(json).unwrap().into();

        assert_eq!(show.id, 1429);
        assert_eq!(show.title, "Attack on Titan");
        assert_eq!(show.genres, vec!["Animation", "Action & Adventure"]);
        assert_eq!(show.season_count, 4);
        assert_eq!(show.episode_count, 94);
        assert_eq!(show.poster_path, None);
        assert_eq!(
            show.seasons,
            vec![
                SeasonSummary { id: 3627, number: 0 },
                SeasonSummary { id: 3624, number: 1 },
            ]
        );
    }

    #[test]
    fn test_decode_season_keeps_catalog_order() {
        let json = r#"{
            "_id": "52542282760ee313280017f9",
            "season_number": 1,
            "episodes": [
                {"id": 63056, "season_number": 1, "episode_number": 2, "name": "That Day", "overview": "", "still_path": null},
                {"id": 63055, "season_number": 1, "episode_number": 1, "name": null, "still_path": "/s.jpg"}
            ]
        }"#;

        let season: SeasonDetail = serde_json::from_str::<TmdbSeason>(json).unwrap().into();

        assert_eq!(season.number, 1);
        let numbers: Vec<u32> = season.episodes.iter().map(|e| e.number).collect();
        assert_eq!(numbers, vec![2, 1]);
        assert_eq!(season.episodes[1].title, "");
        assert_eq!(season.episodes[1].display_title(), "Episode 1");
    }

    #[test]
    fn test_api_message() {
        assert_eq!(
            api_message(r#"{"status_code": 7, "status_message": "Invalid API key.", "success": false}"#),
            "Invalid API key."
        );
        assert_eq!(api_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_missing_api_key() {
        let config = CatalogConfig::default();
        assert!(matches!(TmdbClient::new(&config), Err(Error::MissingApiKey)));
    }
}
