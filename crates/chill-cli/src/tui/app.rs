use chill_core::config::DisplayConfig;
use chill_core::fetch::{PageFetcher, RecommendationSource};
use chill_core::query::QueryController;
use chill_core::recommend::RecommendationLoader;
use chill_core::scroll::{ScrollPosition, ScrollTrigger};
use chill_core::{Loader, LoaderEvent, Status};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Input mode of the results screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

/// Rows one result card takes up in the list.
pub const CARD_HEIGHT: usize = 4;

/// Ticks an error toast stays up (~5s at 50ms tick).
const ERROR_TICKS: u8 = 100;

/// Central application state.
pub struct App<F, R> {
    pub input_mode: InputMode,
    pub should_quit: bool,

    // -- Query --
    pub search_input: String,
    pub search_cursor: usize,
    /// The query the results view is bound to. Only changes on submit.
    pub submitted_query: Option<String>,
    controller: QueryController,
    rec_controller: QueryController,

    // -- Results --
    pub results: Loader<F>,
    pub recommendations: RecommendationLoader<R>,
    pub recs_open: bool,
    pub selected: usize,
    /// Index of the first visible card.
    pub scroll_offset: usize,
    /// Whole cards that fit in the list area; set by the render loop.
    pub viewport_cards: usize,

    pub display: DisplayConfig,

    // -- Error toast --
    pub error_message: Option<String>,
    pub error_timer: u8,
}

impl<F, R> App<F, R>
where
    F: PageFetcher + 'static,
    R: RecommendationSource + 'static,
{
    pub fn new(
        results: Loader<F>,
        recommendations: RecommendationLoader<R>,
        display: DisplayConfig,
    ) -> Self {
        Self {
            input_mode: InputMode::Normal,
            should_quit: false,

            search_input: String::new(),
            search_cursor: 0,
            submitted_query: None,
            controller: QueryController::new(),
            rec_controller: QueryController::new(),

            results,
            recommendations,
            recs_open: true,
            selected: 0,
            scroll_offset: 0,
            viewport_cards: 1,

            display,

            error_message: None,
            error_timer: 0,
        }
    }

    /// Bind the view to `query` as if it had been typed and submitted.
    pub fn submit_query(&mut self, query: &str) {
        self.search_input = query.to_string();
        self.search_cursor = self.search_input.len();
        self.submitted_query = Some(query.to_string());
    }

    /// Let the controllers see the current query; a change resets both loaders.
    pub fn sync_query(&mut self) {
        let query = self.submitted_query.clone();
        if self.controller.observe(query.as_deref(), &mut self.results) {
            self.selected = 0;
            self.scroll_offset = 0;
            self.dismiss_error();
        }
        self.rec_controller
            .observe(query.as_deref(), &mut self.recommendations);
    }

    /// Apply every fetch completion that is ready, without blocking.
    /// Returns `true` if a results page landed.
    pub fn pump(&mut self) -> bool {
        let mut page_loaded = false;
        while let Some(event) = self.results.try_next_event() {
            match event {
                LoaderEvent::PageLoaded { .. } => page_loaded = true,
                LoaderEvent::Failed(failure) => {
                    self.show_error(format!("Search failed: {}", failure.message));
                }
                LoaderEvent::Discarded { .. } => {}
            }
        }
        while let Some(event) = self.recommendations.try_next_event() {
            if let LoaderEvent::Failed(failure) = event {
                tracing::debug!(error = %failure.message, "recommendations unavailable");
            }
        }
        page_loaded
    }

    /// Pump completions; after a page lands, check the trigger again at the
    /// current position. A page that adds nothing leaves the position unchanged,
    /// so no scroll change would fire it. Returns `true` if a fetch was issued.
    pub fn refresh(&mut self, trigger: &ScrollTrigger) -> bool {
        self.pump() && trigger.on_scroll(self.scroll_position(), &mut self.results)
    }

    /// Viewport geometry in card units, for the scroll trigger.
    pub fn scroll_position(&self) -> ScrollPosition {
        ScrollPosition::new(
            self.scroll_offset as f64,
            self.viewport_cards as f64,
            self.results.items().len() as f64,
        )
    }

    pub fn set_viewport_rows(&mut self, rows: u16) {
        self.viewport_cards = (usize::from(rows) / CARD_HEIGHT).max(1);
        self.keep_selection_visible();
    }

    /// Handle a key event.
    pub fn handle_key(&mut self, key: KeyEvent) {
        // Ctrl+C always quits
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        // Any key dismisses the toast
        self.dismiss_error();

        match self.input_mode {
            InputMode::Normal => self.handle_normal(key),
            InputMode::Search => self.handle_search(key),
        }
    }

    fn handle_normal(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::PageDown => self.move_selection(self.viewport_cards as i64),
            KeyCode::PageUp => self.move_selection(-(self.viewport_cards as i64)),
            KeyCode::Char('g') => self.move_selection(i64::MIN / 2),
            KeyCode::Char('G') => self.move_selection(i64::MAX / 2),
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Search;
                self.search_cursor = self.search_input.len();
            }
            KeyCode::Char('r') => {
                self.results.retry();
            }
            KeyCode::Tab => self.recs_open = !self.recs_open,
            _ => {}
        }
    }

    fn handle_search(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                let query = self.search_input.trim();
                if !query.is_empty() {
                    self.submitted_query = Some(query.to_string());
                }
            }
            KeyCode::Backspace => {
                let before = &self.search_input[..self.search_cursor];
                if let Some((idx, _)) = before.char_indices().last() {
                    self.search_input.remove(idx);
                    self.search_cursor = idx;
                }
            }
            KeyCode::Left => {
                let before = &self.search_input[..self.search_cursor];
                if let Some((idx, _)) = before.char_indices().last() {
                    self.search_cursor = idx;
                }
            }
            KeyCode::Right => {
                if let Some(c) = self.search_input[self.search_cursor..].chars().next() {
                    self.search_cursor += c.len_utf8();
                }
            }
            KeyCode::Char(c) => {
                self.search_input.insert(self.search_cursor, c);
                self.search_cursor += c.len_utf8();
            }
            _ => {}
        }
    }

    fn move_selection(&mut self, delta: i64) {
        let len = self.results.items().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let new = (self.selected as i64).saturating_add(delta).clamp(0, len as i64 - 1);
        self.selected = new as usize;
        self.keep_selection_visible();
    }

    fn keep_selection_visible(&mut self) {
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + self.viewport_cards {
            self.scroll_offset = self.selected + 1 - self.viewport_cards;
        }
    }

    /// Footer text for the results list.
    pub fn status_line(&self) -> String {
        let count = self.results.items().len();
        match self.results.status() {
            Status::Idle => "Type / to search".to_string(),
            Status::Loading if count == 0 => "Searching...".to_string(),
            Status::Loading => format!("{count} results, loading more..."),
            Status::LoadedWithMore => format!("{count} results, scroll for more"),
            Status::Exhausted if count == 0 => "No results".to_string(),
            Status::Exhausted => format!("{count} results, end of list"),
            Status::Error(failure) => {
                format!("{count} results, stopped: {} (r to retry)", failure.message)
            }
        }
    }

    fn show_error(&mut self, msg: String) {
        self.error_message = Some(msg);
        self.error_timer = ERROR_TICKS;
    }

    fn dismiss_error(&mut self) {
        self.error_message = None;
        self.error_timer = 0;
    }

    pub fn tick_error(&mut self) {
        if self.error_timer > 0 {
            self.error_timer -= 1;
            if self.error_timer == 0 {
                self.error_message = None;
            }
        }
    }
}
