pub mod detail;
pub mod episodes;
pub mod player;
pub mod widgets;

pub use detail::render_detail_view;
pub use player::{PlayerPage, render_player_view};

/// Draw into an in-memory terminal and return the screen text, one line per row
#[cfg(test)]
pub fn render_to_string(width: u16, height: u16, draw: impl FnOnce(&mut ratatui::Frame)) -> String {
    use ratatui::{Terminal, backend::TestBackend};

    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(draw).unwrap();

    let buffer = terminal.backend().buffer();
    (0..buffer.area.height)
        .map(|y| {
            (0..buffer.area.width)
                .map(|x| buffer[(x, y)].symbol())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
