use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState},
};

use crate::browse::LoadState;
use crate::catalog::Episode;

use super::widgets::{failure_text, message_panel, titled_block};

fn episode_list_item(ep: &Episode, active: bool, accent: Color) -> ListItem<'static> {
    let marker = if active { "● " } else { "  " };
    let label_style = if active {
        Style::default().fg(accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    ListItem::new(vec![
        Line::from(vec![
            Span::styled(marker, Style::default().fg(accent)),
            Span::styled(format!("E{}: ", ep.number), label_style),
            Span::styled(ep.display_title(), label_style),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(
                ep.overview_or_default().to_string(),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
    ])
}

/// Episode list for one season. `active` highlights the episode being watched.
#[allow(clippy::too_many_arguments)]
pub fn render_episode_list(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    episodes: &LoadState<Vec<Episode>>,
    list_state: &mut ListState,
    active: Option<u32>,
    empty_message: &str,
    accent: Color,
) {
    let episodes = match episodes {
        LoadState::Ready(episodes) if !episodes.is_empty() => episodes,
        LoadState::Ready(_) | LoadState::NotFound => {
            frame.render_widget(message_panel(title, empty_message.to_string(), accent), area);
            return;
        }
        LoadState::Failed(failure) => {
            frame.render_widget(message_panel(title, failure_text(failure), accent), area);
            return;
        }
        LoadState::Idle | LoadState::Loading => {
            frame.render_widget(
                message_panel(title, "Loading episodes...".to_string(), accent),
                area,
            );
            return;
        }
    };

    let items: Vec<ListItem> = episodes
        .iter()
        .map(|ep| episode_list_item(ep, active == Some(ep.number), accent))
        .collect();

    let list = List::new(items)
        .block(titled_block(title, accent))
        .highlight_style(
            Style::default()
                .bg(accent)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(list, area, list_state);
}
