use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use kanadr::catalog::loader::{DirectorySource, EmbeddedSource, RemoteSource};
use kanadr::catalog::{CatalogCache, CatalogSource, KanaClass};
use kanadr::config::Config;
use kanadr::engine::filter::{Content, Toggle};
use kanadr::session::{PracticeError, PracticeSurface, Surface};
use kanadr::speech::{CommandSpeaker, SilentSpeaker, Speaker};
use kanadr::store::{JsonStore, MemoryStore, SettingsStore};

use crate::ui::components::menu::{Menu, MenuAction};
use crate::ui::components::selector;
use crate::ui::theme::Theme;

const NOTICE_TTL: Duration = Duration::from_secs(4);

/// Rows on the settings screen.
pub const SETTINGS_ROWS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Practice,
    Selection,
    Settings,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

pub struct Notice {
    pub text: String,
    pub level: NoticeLevel,
    shown_at: Instant,
}

pub struct App {
    pub screen: AppScreen,
    pub show_help: bool,
    pub should_quit: bool,
    pub config: Config,
    pub theme: &'static Theme,
    pub menu: Menu<'static>,
    pub active: Surface,
    pub selection_cursor: usize,
    pub settings_selected: usize,
    pub notice: Option<Notice>,
    surfaces: HashMap<Surface, PracticeSurface<SmallRng>>,
    cache: CatalogCache,
    store: Box<dyn SettingsStore>,
    speaker: Box<dyn Speaker>,
}

impl App {
    pub fn new(config: Config, persist: bool) -> Self {
        let store: Box<dyn SettingsStore> = if persist {
            match JsonStore::new() {
                Ok(store) => Box::new(store),
                Err(e) => {
                    warn!("settings store unavailable, not persisting: {e}");
                    Box::new(MemoryStore::new())
                }
            }
        } else {
            Box::new(MemoryStore::new())
        };
        let speaker: Box<dyn Speaker> = if config.speech_enabled {
            Box::new(CommandSpeaker::new(config.speech_command.as_deref()))
        } else {
            Box::new(SilentSpeaker)
        };
        let source = catalog_source(&config);
        Self::with_parts(config, source, store, speaker)
    }

    pub fn with_parts(
        config: Config,
        source: Box<dyn CatalogSource>,
        store: Box<dyn SettingsStore>,
        speaker: Box<dyn Speaker>,
    ) -> Self {
        info!("catalogs from {}", source.describe());
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
        let mut menu = Menu::new(theme);
        menu.select_surface(config.default_surface);

        Self {
            screen: AppScreen::Menu,
            show_help: false,
            should_quit: false,
            active: config.default_surface,
            config,
            theme,
            menu,
            selection_cursor: 0,
            settings_selected: 0,
            notice: None,
            surfaces: HashMap::new(),
            cache: CatalogCache::new(source),
            store,
            speaker,
        }
    }

    pub fn surface(&self) -> Option<&PracticeSurface<SmallRng>> {
        self.surfaces.get(&self.active)
    }

    pub fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            level,
            shown_at: Instant::now(),
        });
    }

    pub fn tick(&mut self) {
        if self
            .notice
            .as_ref()
            .is_some_and(|n| n.shown_at.elapsed() > NOTICE_TTL)
        {
            self.notice = None;
        }
    }

    pub fn run_menu_action(&mut self, action: MenuAction) {
        match action {
            MenuAction::Open(surface) => self.open_surface(surface),
            MenuAction::ClearCache => self.clear_cache(),
            MenuAction::Quit => self.should_quit = true,
        }
    }

    pub fn go_to_menu(&mut self) {
        self.screen = AppScreen::Menu;
        self.show_help = false;
    }

    pub fn open_surface(&mut self, surface: Surface) {
        if !self.surfaces.contains_key(&surface) {
            let rng = self.make_rng(surface);
            match PracticeSurface::open(surface, &mut self.cache, self.store.as_ref(), rng) {
                Ok(opened) => {
                    self.surfaces.insert(surface, opened);
                }
                Err(e) => {
                    warn!("could not open {} surface: {e}", surface.prefix());
                    self.notify(
                        NoticeLevel::Error,
                        format!("Could not load {}: {e}. Try again from the menu.", surface.label()),
                    );
                    self.screen = AppScreen::Menu;
                    return;
                }
            }
        }
        self.active = surface;
        self.screen = AppScreen::Practice;
        self.selection_cursor = 0;
        if self.surface().is_some_and(|s| !s.controller().is_active()) {
            self.start_session();
        }
    }

    fn make_rng(&self, surface: Surface) -> SmallRng {
        match self.config.seed {
            Some(seed) => {
                let offset = Surface::ALL.iter().position(|s| *s == surface).unwrap_or(0);
                SmallRng::seed_from_u64(seed.wrapping_add(offset as u64))
            }
            None => SmallRng::from_entropy(),
        }
    }

    fn start_session(&mut self) {
        let Some(surface) = self.surfaces.get_mut(&self.active) else {
            return;
        };
        if let Err(e) = surface.start(self.speaker.as_mut()) {
            self.report(e);
        }
    }

    pub fn next_prompt(&mut self) {
        let Some(surface) = self.surfaces.get_mut(&self.active) else {
            return;
        };
        let result = if surface.controller().is_active() {
            surface.advance(self.speaker.as_mut())
        } else {
            surface.start(self.speaker.as_mut())
        };
        if let Err(e) = result {
            self.report(e);
        }
    }

    pub fn toggle_hint(&mut self) {
        if let Some(surface) = self.surfaces.get_mut(&self.active)
            && let Err(e) = surface.toggle_hint()
        {
            self.report(e);
        }
    }

    pub fn speak(&mut self) {
        if let Some(surface) = self.surfaces.get(&self.active)
            && let Err(e) = surface.speak_current(self.speaker.as_mut())
        {
            self.report(e);
        }
    }

    fn report(&mut self, error: PracticeError) {
        let text = match error {
            PracticeError::NothingSelected => {
                "Nothing to practice. Press e to choose what to study.".to_string()
            }
            PracticeError::NoItems => {
                "Nothing left in the current selection. Press e to choose more.".to_string()
            }
            other => capitalize(&other.to_string()),
        };
        self.notify(NoticeLevel::Warning, text);
    }

    // --- selection screen ---

    pub fn go_to_selection(&mut self) {
        if self.surfaces.contains_key(&self.active) {
            self.screen = AppScreen::Selection;
            self.selection_cursor = self.selection_cursor.min(self.selection_len().saturating_sub(1));
        }
    }

    /// Leave the selection screen for practice, starting a session if the
    /// previous attempt found nothing to draw.
    pub fn leave_selection(&mut self) {
        self.screen = AppScreen::Practice;
        let needs_prompt = self
            .surface()
            .is_some_and(|s| s.controller().prompt().is_none());
        if needs_prompt {
            self.next_prompt();
        }
    }

    pub fn selection_len(&self) -> usize {
        match self.surface().map(|s| s.controller().content()) {
            Some(Content::Kana(kana)) | Some(Content::Words { kana, .. }) => kana.len(),
            Some(Content::Phrases(phrases)) => phrases.categories().len(),
            None => 0,
        }
    }

    pub fn selection_move(&mut self, dx: isize, dy: isize) {
        let len = self.selection_len();
        self.selection_cursor = match self.surface().map(|s| s.controller().content()) {
            Some(Content::Phrases(_)) => {
                (self.selection_cursor as isize + dy + dx).clamp(0, len.saturating_sub(1) as isize)
                    as usize
            }
            _ => selector::move_cursor(self.selection_cursor, len, dx, dy),
        };
    }

    pub fn selection_toggle(&mut self) {
        let cursor = self.selection_cursor;
        let Some(surface) = self.surfaces.get_mut(&self.active) else {
            return;
        };
        match surface.controller().content().clone() {
            Content::Kana(kana) | Content::Words { kana, .. } => {
                if let Some(entry) = kana.entries().get(cursor) {
                    surface.toggle_kana(&entry.id, self.store.as_mut());
                }
            }
            Content::Phrases(phrases) => {
                if let Some(key) = phrases.categories().get(cursor)
                    && surface.toggle_category(key, self.store.as_mut()) == Toggle::Rejected
                {
                    self.notify(NoticeLevel::Warning, "At least one category must stay selected.");
                }
            }
        }
    }

    /// Select the whole class, or clear it when it is already complete.
    pub fn selection_toggle_class(&mut self, class: KanaClass) {
        let Some(surface) = self.surfaces.get_mut(&self.active) else {
            return;
        };
        let Some(kana) = surface.controller().content().kana() else {
            return;
        };
        let complete = surface
            .kana_selection()
            .is_some_and(|sel| {
                let (on, total) = sel.count(kana, class);
                on == total
            });
        surface.set_kana_class(class, !complete, self.store.as_mut());
    }

    // --- settings screen ---

    pub fn go_to_settings(&mut self) {
        if self.surfaces.contains_key(&self.active) {
            self.screen = AppScreen::Settings;
            self.settings_selected = 0;
        }
    }

    pub fn settings_cycle(&mut self, forward: bool) {
        if self.settings_selected == 3 {
            self.cycle_theme(forward);
            return;
        }
        let Some(surface) = self.surfaces.get_mut(&self.active) else {
            return;
        };
        let store = self.store.as_mut();
        match self.settings_selected {
            0 => {
                surface.cycle_display_mode(forward, store);
            }
            1 => {
                surface.toggle_practice_mode(store);
            }
            2 => {
                surface.toggle_auto_speak(store);
            }
            _ => {}
        }
    }

    fn cycle_theme(&mut self, forward: bool) {
        let themes = Theme::available_themes();
        if themes.is_empty() {
            return;
        }
        let next = match themes.iter().position(|t| *t == self.config.theme) {
            Some(idx) if forward => (idx + 1) % themes.len(),
            Some(idx) => (idx + themes.len() - 1) % themes.len(),
            None => 0,
        };
        self.config.theme = themes[next].clone();
        if let Some(new_theme) = Theme::load(&self.config.theme) {
            let theme: &'static Theme = Box::leak(Box::new(new_theme));
            self.theme = theme;
            self.menu.theme = theme;
        }
    }

    pub fn leave_settings(&mut self) {
        if let Err(e) = self.config.save() {
            warn!("could not save config: {e}");
        }
        self.screen = AppScreen::Practice;
    }

    // --- cache ---

    /// Drop every loaded catalog and reload the ones open surfaces use.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        let mut failed = Vec::new();
        for (surface, practice) in self.surfaces.iter_mut() {
            if let Err(e) = practice.reload(&mut self.cache) {
                warn!("reload of {} failed: {e}", surface.prefix());
                failed.push(*surface);
            }
        }
        // a surface without catalogs is reopened from scratch next time
        for surface in &failed {
            self.surfaces.remove(surface);
        }
        if failed.is_empty() {
            self.notify(NoticeLevel::Info, "Catalog cache cleared.");
        } else {
            self.notify(
                NoticeLevel::Error,
                "Catalog cache cleared, but reloading failed. Try again from the menu.",
            );
        }
    }
}

fn catalog_source(config: &Config) -> Box<dyn CatalogSource> {
    if let Some(url) = config.catalog_url.as_deref() {
        return Box::new(RemoteSource::new(url));
    }
    match config.catalog_dir() {
        Some(dir) => Box::new(DirectorySource::new(dir)),
        None => Box::new(EmbeddedSource),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
