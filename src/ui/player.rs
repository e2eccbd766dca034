use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{ListState, Paragraph, Wrap},
};

use crate::browse::LoadState;
use crate::catalog::{Episode, Show};
use crate::player::{PlaybackState, PlaybackStatus, format_time};

use super::episodes::render_episode_list;
use super::widgets::{failure_text, message_panel, titled_block};

/// Everything the player view draws from
pub struct PlayerPage<'a> {
    pub show: &'a LoadState<Show>,
    pub episode: &'a LoadState<Episode>,
    pub episodes: &'a LoadState<Vec<Episode>>,
    pub season: u32,
    pub episode_number: u32,
    pub playback: &'a PlaybackState,
    pub source: Option<&'a str>,
    pub previous: Option<&'a Episode>,
    pub next: Option<&'a Episode>,
}

fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64) as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn transport_panel<'a>(playback: &PlaybackState, width: u16, accent: Color) -> Paragraph<'a> {
    let (icon, label, color) = match (playback.is_playing(), playback.status) {
        (true, _) => ("▶", "Playing", Color::Green),
        (false, PlaybackStatus::Ended) if playback.is_ended() => ("■", "Ended", Color::DarkGray),
        _ => ("⏸", "Paused", Color::Yellow),
    };
    let volume_icon = if playback.is_silent() { "🔇" } else { "🔊" };
    let volume_label = if playback.muted {
        "muted".to_string()
    } else {
        format!("{:.0}%", playback.volume * 100.0)
    };
    let bar_width = usize::from(width.saturating_sub(4)).max(10);

    let lines = vec![
        Line::from(Span::styled(
            progress_bar(playback.progress_percent() / 100.0, bar_width),
            Style::default().fg(accent),
        )),
        Line::from(vec![
            Span::styled(
                format!("{} {}", icon, label),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
            Span::raw(format!(
                "{} / {}",
                format_time(playback.current_time),
                format_time(playback.duration)
            )),
        ]),
        Line::from(vec![
            Span::raw(format!("{} ", volume_icon)),
            Span::styled(
                progress_bar(if playback.muted { 0.0 } else { playback.volume }, 10),
                Style::default().fg(Color::White),
            ),
            Span::raw(" "),
            Span::styled(volume_label, Style::default().fg(Color::DarkGray)),
        ]),
    ];

    Paragraph::new(lines).block(titled_block("Player", accent))
}

fn episode_link(key: &str, label: &str, ep: &Episode) -> Line<'static> {
    Line::from(vec![
        Span::styled(key.to_string(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(label.to_string(), Style::default().fg(Color::DarkGray)),
        Span::raw(format!(" E{}: {}", ep.number, ep.display_title())),
    ])
}

fn overview_panel<'a>(page: &PlayerPage<'_>, accent: Color) -> Paragraph<'a> {
    let overview = page
        .episode
        .ready()
        .map(|ep| ep.overview.trim())
        .filter(|text| !text.is_empty())
        .unwrap_or("No overview available for this episode.");

    let mut lines = vec![Line::raw(overview.to_string()), Line::raw("")];
    if let Some(prev) = page.previous {
        lines.push(episode_link("p", "Previous Episode", prev));
    }
    if let Some(next) = page.next {
        lines.push(episode_link("n", "Next Episode", next));
    }

    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(titled_block("Episode Overview", accent))
}

/// Why the header is showing fallbacks, if it is
fn metadata_notice(page: &PlayerPage<'_>) -> Option<String> {
    if let Some(failure) = page.show.failure().or(page.episode.failure()) {
        return Some(failure_text(failure));
    }
    if page.show.is_loading() || page.episode.is_loading() {
        return Some("Loading anime details...".to_string());
    }
    match (page.show, page.episode) {
        (LoadState::NotFound, _) => Some("Anime not found.".to_string()),
        (_, LoadState::NotFound) => Some("Episode not found.".to_string()),
        _ => None,
    }
}

fn header<'a>(page: &PlayerPage<'_>, accent: Color) -> Paragraph<'a> {
    let show_title = page
        .show
        .ready()
        .map(|show| show.title.clone())
        .unwrap_or_else(|| "Loading Anime...".to_string());
    let episode_title = page
        .episode
        .ready()
        .map(Episode::display_title)
        .unwrap_or_else(|| format!("Episode {}", page.episode_number));

    let mut lines = vec![
        Line::from(Span::styled(
            format!("← Back to {}", show_title),
            Style::default().fg(accent),
        )),
        Line::from(Span::styled(
            episode_title,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("{} - Season {}", show_title, page.season),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    if let Some(notice) = metadata_notice(page) {
        lines.push(Line::from(Span::styled(
            notice,
            Style::default().fg(Color::Yellow),
        )));
    }

    Paragraph::new(lines).block(titled_block("Now Playing", accent))
}

/// Header, transport controls, overview with prev/next links and the season's
/// episodes. Playback does not depend on the metadata having loaded.
pub fn render_player_view(
    frame: &mut Frame,
    area: Rect,
    page: &PlayerPage<'_>,
    list_state: &mut ListState,
    accent: Color,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(5),
            Constraint::Min(5),
        ])
        .split(area);

    frame.render_widget(header(page, accent), chunks[0]);

    if page.source.is_some() {
        frame.render_widget(
            transport_panel(page.playback, chunks[1].width, accent),
            chunks[1],
        );
    } else {
        frame.render_widget(
            message_panel("Player", "No video source available.".to_string(), accent),
            chunks[1],
        );
    }

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[2]);

    frame.render_widget(overview_panel(page, accent), bottom[0]);

    let title = format!("More Episodes (Season {})", page.season);
    render_episode_list(
        frame,
        bottom[1],
        &title,
        page.episodes,
        list_state,
        Some(page.episode_number),
        "No episodes found for this season.",
        accent,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::render_to_string;

    fn episode(number: u32) -> Episode {
        Episode {
            id: u64::from(number),
            season_number: 1,
            number,
            title: format!("Departure {}", number),
            overview: String::new(),
            still_path: None,
        }
    }

    fn playback(current_time: f64, duration: f64) -> PlaybackState {
        PlaybackState {
            status: PlaybackStatus::Paused,
            pending_play: None,
            volume: 0.8,
            muted: false,
            current_time,
            duration,
        }
    }

    fn render(page: &PlayerPage<'_>) -> String {
        let mut list_state = ListState::default();
        render_to_string(100, 40, |frame| {
            let area = frame.area();
            render_player_view(frame, area, page, &mut list_state, Color::Magenta)
        })
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.5, 4), "██░░");
        assert_eq!(progress_bar(0.0, 3), "░░░");
        assert_eq!(progress_bar(1.7, 3), "███");
    }

    #[test]
    fn test_transport_shown_without_episode_metadata() {
        let show = LoadState::Ready(Show {
            id: 1,
            title: "Frieren".to_string(),
            ..Show::default()
        });
        let playback = playback(30.0, 120.0);
        let page = PlayerPage {
            show: &show,
            episode: &LoadState::NotFound,
            episodes: &LoadState::Ready(vec![episode(1), episode(2)]),
            season: 1,
            episode_number: 1,
            playback: &playback,
            source: Some("https://example.test/ep1.mp4"),
            previous: None,
            next: None,
        };

        let out = render(&page);

        assert!(out.contains("0:30 / 2:00"));
        assert!(out.contains("Episode 1"));
        assert!(out.contains("Back to Frieren"));
        assert!(out.contains("Episode not found."));
        assert!(out.contains("No overview available for this episode."));
    }

    #[test]
    fn test_missing_source_and_loading_metadata() {
        let playback = playback(0.0, 0.0);
        let page = PlayerPage {
            show: &LoadState::Loading,
            episode: &LoadState::Loading,
            episodes: &LoadState::Loading,
            season: 2,
            episode_number: 3,
            playback: &playback,
            source: None,
            previous: None,
            next: None,
        };

        let out = render(&page);

        assert!(out.contains("No video source available."));
        assert!(out.contains("Loading Anime... - Season 2"));
        assert!(out.contains("Episode 3"));
        assert!(out.contains("Loading episodes..."));
    }

    #[test]
    fn test_neighbour_links() {
        let show = LoadState::Ready(Show::default());
        let current = LoadState::Ready(episode(2));
        let (prev, next) = (episode(1), episode(3));
        let playback = playback(0.0, 0.0);
        let page = PlayerPage {
            show: &show,
            episode: &current,
            episodes: &LoadState::Ready(Vec::new()),
            season: 1,
            episode_number: 2,
            playback: &playback,
            source: None,
            previous: Some(&prev),
            next: Some(&next),
        };

        let out = render(&page);

        assert!(out.contains("Previous Episode E1: Departure 1"));
        assert!(out.contains("Next Episode E3: Departure 3"));
        assert!(out.contains("No episodes found for this season."));
    }
}
