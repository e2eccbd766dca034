//! Previous/next episode lookups over a season's episodes, in catalog order.

use crate::catalog::Episode;

pub fn locate(episodes: &[Episode], episode_number: u32) -> Option<usize> {
    episodes.iter().position(|e| e.number == episode_number)
}

pub fn previous(episodes: &[Episode], index: Option<usize>) -> Option<&Episode> {
    let index = index?;
    if index == 0 {
        return None;
    }
    episodes.get(index - 1)
}

pub fn next(episodes: &[Episode], index: Option<usize>) -> Option<&Episode> {
    episodes.get(index?.checked_add(1)?)
}
