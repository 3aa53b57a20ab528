use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use std::time::Instant;
use tracing::debug;
use ostravels_core::{Conversation, CountryVisaRecord, Region};

/// Ticks per frame of the typing-indicator animation
const TICKS_PER_FRAME: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Chat,
    Directory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavLevel {
    Region,
    Country,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,

    // Chat state
    pub conversation: Conversation,
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars
    pub selected_reply: Option<usize>,
    pub chat_scroll: u16,
    pub follow_bottom: bool,

    // Directory state
    pub nav_level: NavLevel,
    pub region_state: ListState,
    pub country_state: ListState,
    pub cached_countries: Vec<CountryVisaRecord>,

    // Animation state
    pub tick_count: u64,

    // Panel area for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
}

impl App {
    pub fn new(conversation: Conversation) -> Self {
        let mut region_state = ListState::default();
        region_state.select(Some(0));

        Self {
            should_quit: false,
            screen: Screen::Chat,
            input_mode: InputMode::Editing,

            conversation,
            input: String::new(),
            cursor: 0,
            selected_reply: None,
            chat_scroll: 0,
            follow_bottom: true,

            nav_level: NavLevel::Region,
            region_state,
            country_state: ListState::default(),
            cached_countries: Vec::new(),

            tick_count: 0,

            chat_area: None,
        }
    }

    /// 0-2, for the animated ellipsis
    pub fn animation_frame(&self) -> usize {
        ((self.tick_count / TICKS_PER_FRAME) % 3) as usize
    }

    /// Reveal due replies and advance the typing animation
    pub fn tick(&mut self, now: Instant) {
        if self.conversation.is_composing() {
            self.tick_count = self.tick_count.wrapping_add(1);
        }

        if self.conversation.poll(now) > 0 {
            self.selected_reply = None;
            self.follow_bottom = true;
        }
    }

    // Chat actions
    pub fn submit_input(&mut self, now: Instant) {
        if self.conversation.submit(&self.input, now) {
            self.input.clear();
            self.cursor = 0;
            self.selected_reply = None;
            self.follow_bottom = true;
        }
    }

    pub fn choose_quick_reply(&mut self, index: usize, now: Instant) -> bool {
        let Some(reply) = self.conversation.quick_replies().get(index).cloned() else {
            return false;
        };

        debug!(label = %reply.label, value = %reply.value, "Quick reply chosen");
        self.conversation.select_quick_reply(&reply.label, &reply.value, now);
        self.selected_reply = None;
        self.follow_bottom = true;
        true
    }

    pub fn choose_selected_reply(&mut self, now: Instant) -> bool {
        match self.selected_reply {
            Some(index) => self.choose_quick_reply(index, now),
            None => false,
        }
    }

    pub fn reply_next(&mut self) {
        let len = self.conversation.quick_replies().len();
        if len > 0 {
            self.selected_reply = Some(match self.selected_reply {
                Some(i) => (i + 1).min(len - 1),
                None => 0,
            });
        }
    }

    pub fn reply_prev(&mut self) {
        if !self.conversation.quick_replies().is_empty() {
            let i = self.selected_reply.unwrap_or(0);
            self.selected_reply = Some(i.saturating_sub(1));
        }
    }

    /// Start over with a fresh greeting
    pub fn restart_conversation(&mut self, now: Instant) {
        self.conversation.reset();
        self.conversation.open(now);
        self.selected_reply = None;
        self.chat_scroll = 0;
        self.follow_bottom = true;
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.follow_bottom = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    // Directory navigation
    pub fn selected_region(&self) -> Option<Region> {
        self.region_state
            .selected()
            .and_then(|i| Region::all().get(i).copied())
    }

    pub fn selected_country(&self) -> Option<&CountryVisaRecord> {
        if self.nav_level != NavLevel::Country {
            return None;
        }
        self.country_state
            .selected()
            .and_then(|i| self.cached_countries.get(i))
    }

    pub fn nav_down(&mut self) {
        match self.nav_level {
            NavLevel::Region => {
                let len = Region::all().len();
                let i = self.region_state.selected().unwrap_or(0);
                self.region_state.select(Some((i + 1).min(len - 1)));
            }
            NavLevel::Country => {
                let len = self.cached_countries.len();
                if len > 0 {
                    let i = self.country_state.selected().unwrap_or(0);
                    self.country_state.select(Some((i + 1).min(len - 1)));
                }
            }
        }
    }

    pub fn nav_up(&mut self) {
        match self.nav_level {
            NavLevel::Region => {
                let i = self.region_state.selected().unwrap_or(0);
                self.region_state.select(Some(i.saturating_sub(1)));
            }
            NavLevel::Country => {
                let i = self.country_state.selected().unwrap_or(0);
                self.country_state.select(Some(i.saturating_sub(1)));
            }
        }
    }

    pub fn nav_enter(&mut self) {
        if self.nav_level != NavLevel::Region {
            return;
        }
        if let Some(region) = self.selected_region() {
            self.cached_countries = self
                .conversation
                .resolver()
                .db()
                .countries_in_region(region)
                .into_iter()
                .cloned()
                .collect();
            if !self.cached_countries.is_empty() {
                self.country_state.select(Some(0));
                self.nav_level = NavLevel::Country;
            }
        }
    }

    pub fn nav_back(&mut self) {
        if self.nav_level == NavLevel::Country {
            self.nav_level = NavLevel::Region;
            self.cached_countries.clear();
            self.country_state.select(None);
        }
    }

    pub fn nav_first(&mut self) {
        match self.nav_level {
            NavLevel::Region => self.region_state.select(Some(0)),
            NavLevel::Country => self.country_state.select(Some(0)),
        }
    }

    pub fn nav_last(&mut self) {
        match self.nav_level {
            NavLevel::Region => self.region_state.select(Some(Region::all().len() - 1)),
            NavLevel::Country => {
                let len = self.cached_countries.len();
                if len > 0 {
                    self.country_state.select(Some(len - 1));
                }
            }
        }
    }

    /// Jump to chat and ask about the country highlighted in the directory
    pub fn ask_about_selected_country(&mut self, now: Instant) {
        if let Some(name) = self.selected_country().map(|c| c.name.clone()) {
            self.screen = Screen::Chat;
            self.input_mode = InputMode::Normal;
            self.conversation.submit(&name, now);
            self.selected_reply = None;
            self.follow_bottom = true;
        }
    }

    // Title helpers
    pub fn directory_title(&self) -> String {
        match self.nav_level {
            NavLevel::Region => "Regions".to_string(),
            NavLevel::Country => self
                .selected_region()
                .map(|r| r.display_name().to_string())
                .unwrap_or_default(),
        }
    }
}
