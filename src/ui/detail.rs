use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{ListState, Paragraph, Tabs, Wrap},
};

use crate::browse::{LoadState, SeasonSelector};
use crate::catalog::{self, Episode, Show};

use super::episodes::render_episode_list;
use super::widgets::{failure_text, message_panel, titled_block};

fn show_header(show: &Show, accent: Color) -> Paragraph<'_> {
    let mut lines = vec![
        Line::from(Span::styled(
            show.title.clone(),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )),
    ];

    if !show.genres.is_empty() {
        lines.push(Line::from(Span::styled(
            show.genres.join(" • "),
            Style::default().fg(Color::Cyan),
        )));
    }

    lines.push(Line::from(vec![
        Span::styled("Rating: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("{:.1} / 10", show.rating),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("   "),
        Span::styled("Seasons: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(show.season_count.to_string()),
        Span::raw("   "),
        Span::styled("Episodes: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(show.episode_count.to_string()),
    ]));

    lines.push(Line::raw(""));
    lines.push(Line::raw(show.overview_or_default().to_string()));

    let artwork = [
        ("Poster", catalog::image_url(show.poster_path.as_deref(), "w780")),
        ("Backdrop", catalog::image_url(show.backdrop_path.as_deref(), "original")),
    ];
    if artwork.iter().any(|(_, url)| url.is_some()) {
        lines.push(Line::raw(""));
    }
    for (label, url) in artwork {
        if let Some(url) = url {
            lines.push(Line::from(Span::styled(
                format!("{}: {}", label, url),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(titled_block("Anime", accent))
}

fn season_tabs(seasons: &SeasonSelector, accent: Color) -> Tabs<'static> {
    let titles: Vec<String> = seasons
        .seasons()
        .iter()
        .map(|s| format!("Season {}", s.number))
        .collect();
    let selected = seasons
        .current()
        .and_then(|n| seasons.seasons().iter().position(|s| s.number == n))
        .unwrap_or(0);

    Tabs::new(titles)
        .select(selected)
        .highlight_style(
            Style::default()
                .bg(accent)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .block(titled_block("Seasons", accent))
}

/// Show details, season picker and the selected season's episodes
pub fn render_detail_view(
    frame: &mut Frame,
    area: Rect,
    show: &LoadState<Show>,
    seasons: &SeasonSelector,
    episodes: &LoadState<Vec<Episode>>,
    list_state: &mut ListState,
    accent: Color,
) {
    let show = match show {
        LoadState::Ready(show) => show,
        LoadState::NotFound => {
            frame.render_widget(
                message_panel("Anime", "Anime not found.".to_string(), accent),
                area,
            );
            return;
        }
        LoadState::Failed(failure) => {
            frame.render_widget(message_panel("Anime", failure_text(failure), accent), area);
            return;
        }
        LoadState::Idle | LoadState::Loading => {
            frame.render_widget(
                message_panel("Anime", "Loading anime details...".to_string(), accent),
                area,
            );
            return;
        }
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(12),
            Constraint::Length(3),
            Constraint::Min(5),
        ])
        .split(area);

    frame.render_widget(show_header(show, accent), chunks[0]);

    if seasons.seasons().is_empty() {
        frame.render_widget(
            Paragraph::new("No seasons available")
                .style(Style::default().fg(Color::DarkGray))
                .block(titled_block("Seasons", accent)),
            chunks[1],
        );
    } else {
        frame.render_widget(season_tabs(seasons, accent), chunks[1]);
    }

    let title = match seasons.current() {
        Some(n) => format!("Season {} Episodes", n),
        None => "Episodes".to_string(),
    };
    render_episode_list(
        frame,
        chunks[2],
        &title,
        episodes,
        list_state,
        None,
        "No episodes available for this season.",
        accent,
    );
}
