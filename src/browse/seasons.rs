use crate::catalog::{SeasonSummary, Show};

/// Seasons a user can pick from: specials (season 0) dropped, ascending by number.
pub fn selectable_seasons(show: &Show) -> Vec<SeasonSummary> {
    let mut seasons: Vec<SeasonSummary> = show
        .seasons
        .iter()
        .filter(|s| s.number > 0)
        .cloned()
        .collect();
    seasons.sort_by_key(|s| s.number);
    seasons
}

pub fn default_season(seasons: &[SeasonSummary]) -> Option<&SeasonSummary> {
    seasons.first()
}

/// Tracks which season of the loaded show is selected
#[derive(Debug, Clone, Default)]
pub struct SeasonSelector {
    seasons: Vec<SeasonSummary>,
    current: Option<u32>,
}

impl SeasonSelector {
    /// Rebuild from a freshly loaded show and select its default season.
    /// Returns the selected season number, if any.
    pub fn reset(&mut self, show: &Show) -> Option<u32> {
        self.seasons = selectable_seasons(show);
        self.current = default_season(&self.seasons).map(|s| s.number);
        self.current
    }

    pub fn seasons(&self) -> &[SeasonSummary] {
        &self.seasons
    }

    pub fn current(&self) -> Option<u32> {
        self.current
    }

    /// Select `number`. Returns true when the selection changed.
    pub fn select(&mut self, number: u32) -> bool {
        if self.current == Some(number) || !self.seasons.iter().any(|s| s.number == number) {
            return false;
        }
        self.current = Some(number);
        true
    }

    /// Move to the following season, wrapping around
    pub fn select_next(&mut self) -> Option<u32> {
        self.step(1)
    }

    /// Move to the preceding season, wrapping around
    pub fn select_previous(&mut self) -> Option<u32> {
        self.step(-1)
    }

    fn step(&mut self, delta: isize) -> Option<u32> {
        let len = self.seasons.len();
        if len < 2 {
            return None;
        }

        let idx = self
            .current
            .and_then(|n| self.seasons.iter().position(|s| s.number == n))
            .unwrap_or(0);
        let next = (idx as isize + delta).rem_euclid(len as isize) as usize;
        let number = self.seasons[next].number;

        self.select(number).then_some(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show_with(numbers: &[u32]) -> Show {
        Show {
            id: 1,
            seasons: numbers
                .iter()
                .map(|&n| SeasonSummary {
                    id: 100 + n as u64,
                    number: n,
                })
                .collect(),
            ..Show::default()
        }
    }

    fn numbers(seasons: &[SeasonSummary]) -> Vec<u32> {
        seasons.iter().map(|s| s.number).collect()
    }

    #[test]
    fn test_specials_excluded_and_sorted() {
        let show = show_with(&[3, 0, 1, 2]);
        let seasons = selectable_seasons(&show);

        assert_eq!(numbers(&seasons), vec![1, 2, 3]);
        assert_eq!(default_season(&seasons).map(|s| s.number), Some(1));
    }

    #[test]
    fn test_only_specials() {
        let seasons = selectable_seasons(&show_with(&[0]));
        assert!(seasons.is_empty());
        assert!(default_season(&seasons).is_none());
    }

    #[test]
    fn test_default_is_lowest_nonzero() {
        let show = show_with(&[5, 0, 2]);
        let mut selector = SeasonSelector::default();

        assert_eq!(selector.reset(&show), Some(2));
        assert_eq!(selector.current(), Some(2));
    }

    #[test]
    fn test_select_rejects_unknown_and_unchanged() {
        let mut selector = SeasonSelector::default();
        selector.reset(&show_with(&[0, 1, 2]));

        assert!(!selector.select(0));
        assert!(!selector.select(9));
        assert!(!selector.select(1));
        assert!(selector.select(2));
        assert_eq!(selector.current(), Some(2));
    }

    #[test]
    fn test_cycling_wraps() {
        let mut selector = SeasonSelector::default();
        selector.reset(&show_with(&[1, 2, 3]));

        assert_eq!(selector.select_previous(), Some(3));
        assert_eq!(selector.select_next(), Some(1));
        assert_eq!(selector.select_next(), Some(2));

        selector.reset(&show_with(&[0, 1]));
        assert_eq!(selector.select_next(), None);
    }
}
