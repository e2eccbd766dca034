use std::io;
use std::time::Duration;

use chrono::Datelike;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table},
};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::browse::{
    LoadState, MetadataLoader, RequestSequence, RequestToken, Route, SeasonSelector, navigator,
};
use crate::catalog::{Episode, EpisodeKey, Show};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::player::{MediaSignal, MpvElement, PlaybackController, SourceResolver, TaggedSignal};
use crate::share;
use crate::ui::{self, PlayerPage, widgets};

const DETAIL_HINTS: &[(&str, &str)] = &[
    ("[/]", "season"),
    ("j/k", "move"),
    ("Enter", "play"),
    ("w", "watch first"),
    ("s", "share"),
    ("?", "help"),
    ("q", "quit"),
];

const PLAYER_HINTS: &[(&str, &str)] = &[
    ("Space", "play/pause"),
    ("←/→", "skip"),
    ("+/-", "volume"),
    ("m", "mute"),
    ("f", "fullscreen"),
    ("n/p", "next/prev"),
    ("Esc", "back"),
    ("?", "help"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Detail,
    Player,
    Help,
}

pub enum AppMessage {
    ShowLoaded(RequestToken, LoadState<Show>),
    EpisodeLoaded(RequestToken, LoadState<Episode>),
    SeasonLoaded(RequestToken, LoadState<Vec<Episode>>),
}

/// Everything fetched for the current route. Replaced wholesale on navigation.
#[derive(Default)]
struct Page {
    show: LoadState<Show>,
    episode: LoadState<Episode>,
    episodes: LoadState<Vec<Episode>>,
    seasons: SeasonSelector,
    episodes_state: ratatui::widgets::ListState,
}

pub struct App {
    pub config: Config,
    pub running: bool,
    pub view: View,
    pub previous_view: View,
    pub accent: Color,
    pub route: Route,

    page: Page,
    page_requests: RequestSequence,
    season_requests: RequestSequence,
    loader: MetadataLoader,

    sources: Box<dyn SourceResolver>,
    source: Option<String>,
    controller: PlaybackController<MpvElement>,
    status: Option<String>,

    msg_tx: mpsc::UnboundedSender<AppMessage>,
    msg_rx: mpsc::UnboundedReceiver<AppMessage>,
    signal_rx: mpsc::UnboundedReceiver<TaggedSignal>,
}

impl App {
    pub fn new(
        config: Config,
        loader: MetadataLoader,
        sources: Box<dyn SourceResolver>,
        route: Route,
    ) -> Self {
        let accent = widgets::parse_accent_color(&config.ui.accent_color);
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let controller = PlaybackController::new(signal_tx, config.initial_volume());

        Self {
            config,
            running: true,
            view: View::Detail,
            previous_view: View::Detail,
            accent,
            route,

            page: Page::default(),
            page_requests: RequestSequence::default(),
            season_requests: RequestSequence::default(),
            loader,

            sources,
            source: None,
            controller,
            status: None,

            msg_tx,
            msg_rx,
            signal_rx,
        }
    }

    pub async fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        self.navigate(self.route);

        while self.running {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
            self.process_messages();
        }

        self.controller.unbind();
        Ok(())
    }

    /// Switch to `route`, dropping everything fetched for the previous one
    fn navigate(&mut self, route: Route) {
        info!(route = %route, "Navigating");
        self.route = route;
        self.page = Page::default();
        self.status = None;

        let token = self.page_requests.issue();
        let season_token = self.season_requests.issue();
        let loader = self.loader.clone();
        let tx = self.msg_tx.clone();

        match route {
            Route::Show { show_id } => {
                self.view = View::Detail;
                self.source = None;
                self.controller.unbind();
                self.page.show = LoadState::Loading;

                tokio::spawn(async move {
                    let show = loader.load_show(show_id).await;
                    let _ = tx.send(AppMessage::ShowLoaded(token, show));
                });
            }
            Route::Episode {
                show_id,
                season,
                episode,
            } => {
                self.view = View::Player;
                self.page.show = LoadState::Loading;
                self.page.episode = LoadState::Loading;
                self.page.episodes = LoadState::Loading;
                self.bind_source(EpisodeKey::new(show_id, season, episode));

                tokio::spawn(async move {
                    let show = loader.load_show(show_id).await;
                    if tx.send(AppMessage::ShowLoaded(token, show)).is_err() {
                        return;
                    }

                    let current = loader.load_episode(show_id, season, episode).await;
                    if tx.send(AppMessage::EpisodeLoaded(token, current)).is_err() {
                        return;
                    }

                    let episodes = loader.load_season(show_id, season).await;
                    let _ = tx.send(AppMessage::SeasonLoaded(season_token, episodes));
                });
            }
        }
    }

    fn request_season(&mut self, show_id: u64, season: u32) {
        let token = self.season_requests.issue();
        self.page.episodes = LoadState::Loading;
        self.page.episodes_state.select(None);

        let loader = self.loader.clone();
        let tx = self.msg_tx.clone();
        tokio::spawn(async move {
            let episodes = loader.load_season(show_id, season).await;
            let _ = tx.send(AppMessage::SeasonLoaded(token, episodes));
        });
    }

    /// Resolve the episode's media URL and load it into the player, reusing
    /// the running player when there is one
    fn bind_source(&mut self, key: EpisodeKey) {
        self.source = self.sources.resolve(&key);
        let Some(url) = self.source.clone() else {
            info!(key = %key, "No video source");
            self.controller.unbind();
            return;
        };

        if self.controller.source() == Some(url.as_str()) {
            return;
        }

        let element = self.controller.release().unwrap_or_else(|| {
            MpvElement::new(
                self.config.player.command.clone(),
                self.config.player.args.clone(),
            )
        });
        if let Err(e) = self.controller.bind(element, &url) {
            self.report(e);
        }
    }

    fn process_messages(&mut self) {
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.handle_message(msg);
        }

        while let Ok(tagged) = self.signal_rx.try_recv() {
            let signal = tagged.signal;
            if self.controller.handle_signal(tagged) {
                self.on_media_signal(signal);
            }
        }
    }

    /// React to a signal the controller has already applied
    fn on_media_signal(&mut self, signal: MediaSignal) {
        match signal {
            MediaSignal::Ended => self.on_media_ended(),
            MediaSignal::Closed => {
                self.status = Some("Player window closed (press r to reopen)".to_string());
            }
            _ => {}
        }
    }

    fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::ShowLoaded(token, state) => {
                if !self.page_requests.is_current(token) {
                    debug!("Discarding stale show response");
                    return;
                }
                if let (Route::Show { .. }, Some(show)) = (self.route, state.ready()) {
                    let show_id = show.id;
                    match self.page.seasons.reset(show) {
                        Some(season) => self.request_season(show_id, season),
                        None => self.page.episodes = LoadState::Ready(Vec::new()),
                    }
                }
                self.page.show = state;
            }
            AppMessage::EpisodeLoaded(token, state) => {
                if !self.page_requests.is_current(token) {
                    debug!("Discarding stale episode response");
                    return;
                }
                self.page.episode = state;
            }
            AppMessage::SeasonLoaded(token, state) => {
                if !self.season_requests.is_current(token) {
                    debug!("Discarding stale season response");
                    return;
                }
                let selected = match (&state, self.route) {
                    (LoadState::Ready(episodes), Route::Episode { episode, .. }) => {
                        navigator::locate(episodes, episode)
                    }
                    (LoadState::Ready(episodes), Route::Show { .. }) if !episodes.is_empty() => {
                        Some(0)
                    }
                    _ => None,
                };
                self.page.episodes_state.select(selected);
                self.page.episodes = state;
            }
        }
    }

    fn on_media_ended(&mut self) {
        if !self.config.player.auto_advance {
            return;
        }
        match self.adjacent_episode(true) {
            Some(route) => {
                info!(route = %route, "Auto-advancing to next episode");
                self.navigate(route);
            }
            None => info!("Reached last episode of the season"),
        }
    }

    fn report(&mut self, e: Error) {
        error!(error = %e, "Player command failed");
        self.status = Some(e.to_string());
    }

    fn player_command(
        &mut self,
        op: impl FnOnce(&mut PlaybackController<MpvElement>) -> Result<()>,
    ) {
        if let Err(e) = op(&mut self.controller) {
            self.report(e);
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let view = if self.view == View::Help {
            self.previous_view
        } else {
            self.view
        };

        match view {
            View::Player => self.render_player(frame, chunks[0]),
            View::Detail | View::Help => ui::render_detail_view(
                frame,
                chunks[0],
                &self.page.show,
                &self.page.seasons,
                &self.page.episodes,
                &mut self.page.episodes_state,
                self.accent,
            ),
        }

        let status = match &self.status {
            Some(text) => Paragraph::new(text.clone()).style(Style::default().fg(self.accent)),
            None => Paragraph::new(footer_text(chrono::Local::now().year()))
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
        };
        frame.render_widget(status, chunks[1]);

        let hints = if view == View::Player {
            PLAYER_HINTS
        } else {
            DETAIL_HINTS
        };
        frame.render_widget(widgets::help_bar(hints), chunks[2]);

        if self.view == View::Help {
            self.render_help(frame);
        }
    }

    fn render_player(&mut self, frame: &mut Frame, area: Rect) {
        let Route::Episode {
            season, episode, ..
        } = self.route
        else {
            return;
        };

        let episodes = self.page.episodes.ready().map(Vec::as_slice).unwrap_or(&[]);
        let index = navigator::locate(episodes, episode);
        let page = PlayerPage {
            show: &self.page.show,
            episode: &self.page.episode,
            episodes: &self.page.episodes,
            season,
            episode_number: episode,
            playback: self.controller.state(),
            source: self.source.as_deref(),
            previous: navigator::previous(episodes, index),
            next: navigator::next(episodes, index),
        };

        ui::render_player_view(frame, area, &page, &mut self.page.episodes_state, self.accent);
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(());
                }
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    self.running = false;
                    return Ok(());
                }

                match self.view {
                    View::Detail => self.handle_detail_input(key)?,
                    View::Player => self.handle_player_input(key)?,
                    View::Help => self.handle_help_input(key.code),
                }
            }
        }
        Ok(())
    }

    fn handle_detail_input(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') => {
                self.running = false;
            }
            KeyCode::Char('?') => self.toggle_help(),
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(true),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(false),
            KeyCode::Char(']') | KeyCode::Tab | KeyCode::Right => self.change_season(true),
            KeyCode::Char('[') | KeyCode::BackTab | KeyCode::Left => self.change_season(false),
            KeyCode::Enter | KeyCode::Char('l') => self.open_selected_episode(),
            KeyCode::Char('w') => self.watch_first_episode(),
            KeyCode::Char('s') => self.share_page()?,
            KeyCode::Char('r') => self.retry(),
            _ => {}
        }
        Ok(())
    }

    fn handle_player_input(&mut self, key: KeyEvent) -> Result<()> {
        let step = self.config.player.skip_seconds;

        match key.code {
            KeyCode::Char('q') => {
                self.running = false;
            }
            KeyCode::Char('?') => self.toggle_help(),
            KeyCode::Char(' ') => self.player_command(|c| c.toggle_play_pause()),
            KeyCode::Left => self.player_command(|c| c.skip(-step)),
            KeyCode::Right => self.player_command(|c| c.skip(step)),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.player_command(|c| c.adjust_volume(10))
            }
            KeyCode::Char('-') => self.player_command(|c| c.adjust_volume(-10)),
            KeyCode::Char('m') => self.player_command(|c| c.toggle_mute()),
            KeyCode::Char('f') => self.player_command(|c| c.toggle_fullscreen()),
            KeyCode::Char(d) if d.is_ascii_digit() => {
                let percent = f64::from(d.to_digit(10).unwrap_or(0) * 10);
                self.player_command(|c| c.seek(percent));
            }
            KeyCode::Char('n') => {
                if let Some(route) = self.adjacent_episode(true) {
                    self.navigate(route);
                }
            }
            KeyCode::Char('p') => {
                if let Some(route) = self.adjacent_episode(false) {
                    self.navigate(route);
                }
            }
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('h') => {
                self.navigate(Route::show(self.route.show_id()));
            }
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(true),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(false),
            KeyCode::Enter => self.open_selected_episode(),
            KeyCode::Char('s') => self.share_page()?,
            KeyCode::Char('r') => self.retry(),
            _ => {}
        }
        Ok(())
    }

    fn move_selection(&mut self, down: bool) {
        let len = self.page.episodes.ready().map(Vec::len).unwrap_or(0);
        if len == 0 {
            return;
        }

        let state = &mut self.page.episodes_state;
        let next = match (state.selected(), down) {
            (Some(i), true) => (i + 1).min(len - 1),
            (Some(i), false) => i.saturating_sub(1),
            (None, _) => 0,
        };
        state.select(Some(next));
    }

    fn change_season(&mut self, forward: bool) {
        let selected = if forward {
            self.page.seasons.select_next()
        } else {
            self.page.seasons.select_previous()
        };
        if let Some(season) = selected {
            debug!(season, "Season selected");
            self.request_season(self.route.show_id(), season);
        }
    }

    fn open_selected_episode(&mut self) {
        let show_id = self.route.show_id();
        let route = self
            .page
            .episodes_state
            .selected()
            .zip(self.page.episodes.ready())
            .and_then(|(i, episodes)| episodes.get(i))
            .map(|ep| Route::episode(show_id, ep));

        if let Some(route) = route {
            self.navigate(route);
        }
    }

    fn watch_first_episode(&mut self) {
        let show_id = self.route.show_id();
        let route = self
            .page
            .episodes
            .ready()
            .and_then(|episodes| episodes.first())
            .map(|ep| Route::episode(show_id, ep));

        if let Some(route) = route {
            self.navigate(route);
        }
    }

    /// Route of the episode before or after the current one in the loaded season
    fn adjacent_episode(&self, forward: bool) -> Option<Route> {
        let Route::Episode {
            show_id, episode, ..
        } = self.route
        else {
            return None;
        };

        let episodes = self.page.episodes.ready()?;
        let index = navigator::locate(episodes, episode);
        let target = if forward {
            navigator::next(episodes, index)
        } else {
            navigator::previous(episodes, index)
        }?;
        Some(Route::episode(show_id, target))
    }

    /// Re-issue whatever failed: the page itself, the episode list, or a closed player
    fn retry(&mut self) {
        let page_failed =
            self.page.show.failure().is_some() || self.page.episode.failure().is_some();
        if page_failed {
            info!(route = %self.route, "Retrying page");
            self.navigate(self.route);
            return;
        }

        if self.page.episodes.failure().is_some() {
            let season = match self.route {
                Route::Episode { season, .. } => Some(season),
                Route::Show { .. } => self.page.seasons.current(),
            };
            if let Some(season) = season {
                info!(season, "Retrying season");
                self.request_season(self.route.show_id(), season);
            }
            return;
        }

        if let Some(key) = self.route.episode_key() {
            if !self.controller.is_bound() {
                self.status = None;
                self.bind_source(key);
            }
        }
    }

    fn share_page(&mut self) -> Result<()> {
        let Some(show) = self.page.show.ready() else {
            return Ok(());
        };

        let title = match (self.route, self.page.episode.ready()) {
            (Route::Episode { .. }, Some(ep)) => format!("{} - {}", show.title, ep.display_title()),
            _ => show.title.clone(),
        };
        let url = self.route.url(&self.config.ui.share_base_url);

        let text = share::share(&mut io::stdout(), &title, &url)?;
        self.status = Some(format!("Copied to clipboard: {}", text));
        Ok(())
    }

    fn toggle_help(&mut self) {
        if self.view == View::Help {
            self.view = self.previous_view;
        } else {
            self.previous_view = self.view;
            self.view = View::Help;
        }
    }

    fn render_help(&self, frame: &mut Frame) {
        let area = frame.area();
        let dialog_area = Rect {
            x: area.width.saturating_sub(70) / 2,
            y: area.height.saturating_sub(28) / 2,
            width: 70.min(area.width),
            height: 28.min(area.height),
        };

        frame.render_widget(Clear, dialog_area);

        let block = Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.accent));

        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let rows = vec![
            Row::new(vec!["Global", "?", "Toggle Help"]),
            Row::new(vec!["", "q", "Quit"]),
            Row::new(vec!["", "s", "Share Link"]),
            Row::new(vec!["", "r", "Retry"]),
            Row::new(vec!["Show", "[ / ]", "Previous / Next Season"]),
            Row::new(vec!["", "j/k", "Navigate Episodes"]),
            Row::new(vec!["", "Enter", "Watch Episode"]),
            Row::new(vec!["", "w", "Watch First Episode"]),
            Row::new(vec!["Player", "Space", "Play / Pause"]),
            Row::new(vec!["", "← / →", "Skip Back / Forward"]),
            Row::new(vec!["", "+ / -", "Volume"]),
            Row::new(vec!["", "m", "Mute"]),
            Row::new(vec!["", "f", "Fullscreen"]),
            Row::new(vec!["", "0-9", "Seek to 0-90%"]),
            Row::new(vec!["", "n / p", "Next / Previous Episode"]),
            Row::new(vec!["", "Enter", "Watch Selected Episode"]),
            Row::new(vec!["", "Esc", "Back to Show"]),
        ];

        let table = Table::new(
            rows,
            &[
                Constraint::Percentage(20),
                Constraint::Percentage(20),
                Constraint::Percentage(60),
            ],
        )
        .header(
            Row::new(vec!["Context", "Key", "Action"]).style(
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .fg(self.accent),
            ),
        )
        .block(Block::default().borders(Borders::NONE));

        frame.render_widget(table, inner);
    }

    fn handle_help_input(&mut self, key: KeyCode) {
        if matches!(key, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')) {
            self.toggle_help();
        }
    }
}

fn footer_text(year: i32) -> String {
    format!("© {} Anime Stream. All rights reserved.", year)
}

pub fn init_terminal() -> io::Result<DefaultTerminal> {
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
    Ok(ratatui::init())
}

pub fn restore_terminal() -> io::Result<()> {
    ratatui::restore();
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::browse::loader::FetchFailure;
    use crate::catalog::{CatalogProvider, SeasonDetail, SeasonSummary};
    use crate::player::SourceTable;

    struct FakeCatalog;

    fn episode(season: u32, number: u32) -> Episode {
        Episode {
            id: u64::from(season * 100 + number),
            season_number: season,
            number,
            title: format!("Episode {}", number),
            overview: String::new(),
            still_path: None,
        }
    }

    #[async_trait::async_trait]
    impl CatalogProvider for FakeCatalog {
        async fn fetch_show(&self, id: u64) -> Result<Option<Show>> {
            Ok(Some(Show {
                id,
                title: "Frieren".to_string(),
                seasons: vec![
                    SeasonSummary { id: 1, number: 0 },
                    SeasonSummary { id: 2, number: 2 },
                    SeasonSummary { id: 3, number: 1 },
                ],
                ..Show::default()
            }))
        }

        async fn fetch_season_episodes(
            &self,
            _show_id: u64,
            season_number: u32,
        ) -> Result<Option<SeasonDetail>> {
            Ok(Some(SeasonDetail {
                number: season_number,
                episodes: (1..=3).map(|n| episode(season_number, n)).collect(),
            }))
        }

        async fn fetch_episode(
            &self,
            _show_id: u64,
            season_number: u32,
            episode_number: u32,
        ) -> Result<Option<Episode>> {
            Ok(Some(episode(season_number, episode_number)))
        }
    }

    fn app_with(config: Config, sources: SourceTable, route: Route) -> App {
        App::new(
            config,
            MetadataLoader::new(Arc::new(FakeCatalog)),
            Box::new(sources),
            route,
        )
    }

    fn app(route: Route) -> App {
        app_with(Config::default(), SourceTable::default(), route)
    }

    fn episode_route(episode: u32) -> Route {
        Route::Episode {
            show_id: 7,
            season: 1,
            episode,
        }
    }

    /// App on the player page with season 1 (episodes 1-3) loaded
    fn watching(episode: u32, auto_advance: bool) -> App {
        let mut config = Config::default();
        config.player.auto_advance = auto_advance;
        let mut app = app_with(config, SourceTable::default(), episode_route(episode));
        app.navigate(episode_route(episode));

        let token = app.season_requests.issue();
        app.handle_message(AppMessage::SeasonLoaded(
            token,
            LoadState::Ready((1..=3).map(|n| self::episode(1, n)).collect()),
        ));
        app
    }

    fn failed() -> FetchFailure {
        FetchFailure {
            message: "Network error: timed out".to_string(),
            retryable: true,
        }
    }

    fn show() -> Show {
        Show {
            id: 7,
            title: "Frieren".to_string(),
            seasons: vec![
                SeasonSummary { id: 1, number: 0 },
                SeasonSummary { id: 2, number: 2 },
                SeasonSummary { id: 3, number: 1 },
            ],
            ..Show::default()
        }
    }

    #[tokio::test]
    async fn test_show_load_selects_default_season() {
        let mut app = app(Route::show(7));
        app.navigate(Route::show(7));
        let token = app.page_requests.issue();

        app.handle_message(AppMessage::ShowLoaded(token, LoadState::Ready(show())));

        assert_eq!(app.page.seasons.current(), Some(1));
        assert!(app.page.episodes.is_loading());
    }

    #[tokio::test]
    async fn test_stale_season_response_is_discarded() {
        let mut app = app(Route::show(7));
        app.navigate(Route::show(7));
        let token = app.page_requests.issue();
        app.handle_message(AppMessage::ShowLoaded(token, LoadState::Ready(show())));

        let stale = app.season_requests.issue();
        app.change_season(true);
        assert_eq!(app.page.seasons.current(), Some(2));

        app.handle_message(AppMessage::SeasonLoaded(
            stale,
            LoadState::Ready(vec![episode(1, 1)]),
        ));
        assert!(app.page.episodes.is_loading());
    }

    #[tokio::test]
    async fn test_stale_show_response_is_discarded() {
        let mut app = app(Route::show(7));
        app.navigate(Route::show(7));
        let stale = app.page_requests.issue();
        app.navigate(Route::show(8));

        app.handle_message(AppMessage::ShowLoaded(stale, LoadState::Ready(show())));

        assert!(app.page.show.is_loading());
    }

    #[tokio::test]
    async fn test_adjacent_episodes_without_source() {
        let route = Route::Episode {
            show_id: 7,
            season: 1,
            episode: 2,
        };
        let mut app = app(route);
        app.navigate(route);
        assert_eq!(app.source, None);
        assert!(!app.controller.is_bound());

        let token = app.season_requests.issue();
        app.handle_message(AppMessage::SeasonLoaded(
            token,
            LoadState::Ready((1..=3).map(|n| episode(1, n)).collect()),
        ));

        assert_eq!(app.page.episodes_state.selected(), Some(1));
        assert_eq!(
            app.adjacent_episode(true),
            Some(Route::Episode {
                show_id: 7,
                season: 1,
                episode: 3
            })
        );
        assert_eq!(
            app.adjacent_episode(false),
            Some(Route::Episode {
                show_id: 7,
                season: 1,
                episode: 1
            })
        );
    }

    #[tokio::test]
    async fn test_retry_reloads_failed_page() {
        let mut app = app(Route::show(7));
        app.navigate(Route::show(7));
        let token = app.page_requests.issue();
        app.handle_message(AppMessage::ShowLoaded(token, LoadState::Failed(failed())));

        app.retry();

        assert!(!app.page_requests.is_current(token));
        assert!(app.page.show.is_loading());
    }

    #[tokio::test]
    async fn test_retry_reloads_failed_season() {
        let mut app = app(Route::show(7));
        app.navigate(Route::show(7));
        let token = app.page_requests.issue();
        app.handle_message(AppMessage::ShowLoaded(token, LoadState::Ready(show())));
        let season_token = app.season_requests.issue();
        app.handle_message(AppMessage::SeasonLoaded(
            season_token,
            LoadState::Failed(failed()),
        ));

        app.retry();

        assert!(app.page_requests.is_current(token));
        assert!(!app.season_requests.is_current(season_token));
        assert!(app.page.episodes.is_loading());
        assert_eq!(app.page.seasons.current(), Some(1));
    }

    #[tokio::test]
    async fn test_retry_rebinds_closed_player() {
        let mut config = Config::default();
        config.player.command = "anistream-no-such-player".to_string();
        let sources = SourceTable::new(
            [("7-1-1".to_string(), "https://example.test/ep1.mp4".to_string())].into(),
        );
        let mut app = app_with(config, sources, episode_route(1));

        app.navigate(episode_route(1));
        assert_eq!(app.source.as_deref(), Some("https://example.test/ep1.mp4"));
        assert!(!app.controller.is_bound());

        app.on_media_signal(MediaSignal::Closed);
        assert!(app.status.as_deref().unwrap().contains("press r to reopen"));

        app.retry();
        assert!(app.status.as_deref().unwrap().contains("Player not found"));
    }

    #[tokio::test]
    async fn test_auto_advance_to_next_episode() {
        let mut app = watching(1, true);

        app.on_media_signal(MediaSignal::Ended);

        assert_eq!(app.route, episode_route(2));
        assert!(app.page.episodes.is_loading());
    }

    #[tokio::test]
    async fn test_auto_advance_stops_at_last_episode() {
        let mut app = watching(3, true);

        app.on_media_signal(MediaSignal::Ended);

        assert_eq!(app.route, episode_route(3));
    }

    #[tokio::test]
    async fn test_auto_advance_is_opt_in() {
        let mut app = watching(1, false);

        app.on_media_signal(MediaSignal::Ended);

        assert_eq!(app.route, episode_route(1));
    }

    #[tokio::test]
    async fn test_missing_show_still_loads_episodes() {
        let mut app = app(episode_route(2));
        app.navigate(episode_route(2));

        let token = app.page_requests.issue();
        app.handle_message(AppMessage::ShowLoaded(token, LoadState::NotFound));
        app.handle_message(AppMessage::EpisodeLoaded(
            token,
            LoadState::Ready(episode(1, 2)),
        ));

        assert_eq!(app.page.show, LoadState::NotFound);
        assert_eq!(app.page.episode.ready().map(|e| e.number), Some(2));
    }

    #[test]
    fn test_footer_text() {
        assert_eq!(footer_text(2026), "© 2026 Anime Stream. All rights reserved.");
    }
}
