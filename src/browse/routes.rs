use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::{Episode, EpisodeKey};
use crate::error::{Error, Result};

static SHOW_ROUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/?show/(\d+)/?$").expect("valid route pattern"));

static EPISODE_ROUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/?show/(\d+)/season/(\d+)/episode/(\d+)/?$").expect("valid route pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Show { show_id: u64 },
    Episode { show_id: u64, season: u32, episode: u32 },
}

impl Route {
    pub fn show(show_id: u64) -> Self {
        Route::Show { show_id }
    }

    pub fn episode(show_id: u64, episode: &Episode) -> Self {
        Route::Episode {
            show_id,
            season: episode.season_number,
            episode: episode.number,
        }
    }

    /// Parse a route path, or a bare show id
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if let Ok(show_id) = input.parse::<u64>() {
            return Ok(Route::Show { show_id });
        }

        if let Some(caps) = SHOW_ROUTE.captures(input) {
            let show_id = parse_num(&caps[1], input)?;
            return Ok(Route::Show { show_id });
        }

        if let Some(caps) = EPISODE_ROUTE.captures(input) {
            return Ok(Route::Episode {
                show_id: parse_num(&caps[1], input)?,
                season: parse_num(&caps[2], input)?,
                episode: parse_num(&caps[3], input)?,
            });
        }

        Err(Error::InvalidRoute(input.to_string()))
    }

    pub fn show_id(&self) -> u64 {
        match *self {
            Route::Show { show_id } | Route::Episode { show_id, .. } => show_id,
        }
    }

    pub fn episode_key(&self) -> Option<EpisodeKey> {
        match *self {
            Route::Show { .. } => None,
            Route::Episode {
                show_id,
                season,
                episode,
            } => Some(EpisodeKey::new(show_id, season, episode)),
        }
    }

    pub fn path(&self) -> String {
        self.to_string()
    }

    /// Absolute address under `base` (used for share links)
    pub fn url(&self, base: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), self.path())
    }
}

fn parse_num<T: std::str::FromStr>(digits: &str, input: &str) -> Result<T> {
    digits
        .parse()
        .map_err(|_| Error::InvalidRoute(input.to_string()))
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Show { show_id } => write!(f, "/show/{}", show_id),
            Route::Episode {
                show_id,
                season,
                episode,
            } => write!(f, "/show/{}/season/{}/episode/{}", show_id, season, episode),
        }
    }
}
