use std::collections::BTreeMap;

use log::info;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogCache, CatalogError, CatalogKind, EntryKind, KanaClass};
use crate::engine::display::{DisplayMode, KanaMode, VocabMode};
use crate::engine::filter::{CategorySelection, Content, KanaSelection, Selection, Toggle};
use crate::engine::random::RandomSource;
use crate::session::controller::{PracticeController, PracticeError, PracticeMode};
use crate::speech::Speaker;
use crate::store::SettingsStore;

const SELECTED_KANA: &str = "selected_kana";
const CATEGORIES: &str = "categories";
const DISPLAY_MODE: &str = "display_mode";
const PRACTICE_MODE: &str = "practice_mode";
const AUTO_SPEAK: &str = "auto_speak";

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    #[default]
    Kana,
    Words,
    Phrases,
}

impl Surface {
    pub const ALL: [Surface; 3] = [Surface::Kana, Surface::Words, Surface::Phrases];

    /// Settings key prefix.
    pub fn prefix(self) -> &'static str {
        match self {
            Surface::Kana => "kana",
            Surface::Words => "words",
            Surface::Phrases => "phrases",
        }
    }

    pub fn key(self, name: &str) -> String {
        format!("{}_{name}", self.prefix())
    }

    pub fn label(self) -> &'static str {
        match self {
            Surface::Kana => "Kana",
            Surface::Words => "Words",
            Surface::Phrases => "Phrases",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.prefix() == name)
    }
}

/// One practice surface: a controller plus the settings that belong to it.
/// Every user-driven change is written through to the settings store.
pub struct PracticeSurface<R: RandomSource> {
    surface: Surface,
    controller: PracticeController<R>,
    auto_speak: bool,
}

impl<R: RandomSource> PracticeSurface<R> {
    pub fn open(
        surface: Surface,
        cache: &mut CatalogCache,
        store: &dyn SettingsStore,
        rng: R,
    ) -> Result<Self, CatalogError> {
        let content = load_content(surface, cache)?;
        let selection = restore_selection(surface, &content, store);

        let display_mode = match surface {
            Surface::Kana => DisplayMode::Kana(
                store
                    .load::<KanaMode>(&surface.key(DISPLAY_MODE))
                    .unwrap_or_default(),
            ),
            Surface::Words | Surface::Phrases => DisplayMode::Vocab(
                store
                    .load::<VocabMode>(&surface.key(DISPLAY_MODE))
                    .unwrap_or_default(),
            ),
        };
        let practice_mode = store
            .load::<PracticeMode>(&surface.key(PRACTICE_MODE))
            .unwrap_or_default();
        let auto_speak = store
            .load::<bool>(&surface.key(AUTO_SPEAK))
            .unwrap_or(false);

        info!(
            "opened {} surface ({} display, {} mode)",
            surface.prefix(),
            display_mode.label(),
            practice_mode.label()
        );
        Ok(Self {
            surface,
            controller: PracticeController::new(
                content,
                selection,
                display_mode,
                practice_mode,
                rng,
            ),
            auto_speak,
        })
    }

    /// Re-fetch catalogs through `cache`, keeping the current selection.
    pub fn reload(&mut self, cache: &mut CatalogCache) -> Result<(), CatalogError> {
        let content = load_content(self.surface, cache)?;
        self.controller.replace_content(content);
        Ok(())
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn controller(&self) -> &PracticeController<R> {
        &self.controller
    }

    pub fn auto_speak(&self) -> bool {
        self.auto_speak
    }

    pub fn start(&mut self, speaker: &mut dyn Speaker) -> Result<(), PracticeError> {
        self.controller.start()?;
        self.after_advance(speaker);
        Ok(())
    }

    pub fn advance(&mut self, speaker: &mut dyn Speaker) -> Result<(), PracticeError> {
        self.controller.advance()?;
        self.after_advance(speaker);
        Ok(())
    }

    fn after_advance(&mut self, speaker: &mut dyn Speaker) {
        if self.auto_speak && self.controller.practice_mode() == PracticeMode::Learning {
            let _ = self.speak_current(speaker);
        }
    }

    pub fn reveal_hint(&mut self) -> Result<(), PracticeError> {
        self.controller.reveal_hint()
    }

    pub fn toggle_hint(&mut self) -> Result<bool, PracticeError> {
        self.controller.toggle_hint()
    }

    pub fn stop(&mut self) {
        self.controller.stop();
    }

    /// What speech should read for the current prompt.
    pub fn speech_text(&self) -> Option<String> {
        let prompt = self.controller.prompt()?;
        let text = match prompt.entry.kind {
            EntryKind::Kana { .. } => {
                if self.controller.display_mode() == DisplayMode::Kana(KanaMode::Romaji) {
                    prompt.entry.phonetic.clone()
                } else {
                    prompt.primary.clone()
                }
            }
            EntryKind::Word { .. } | EntryKind::Phrase { .. } => prompt.entry.bare_phonetic(),
        };
        Some(text)
    }

    pub fn speak_current(&self, speaker: &mut dyn Speaker) -> Result<(), PracticeError> {
        let text = self.speech_text().ok_or(PracticeError::NoPrompt)?;
        speaker.speak(&text);
        Ok(())
    }

    /// Flip one kana in or out. Returns false on the phrase surface.
    pub fn toggle_kana(&mut self, id: &str, store: &mut dyn SettingsStore) -> bool {
        self.edit_kana(store, |sel, _| sel.toggle(id))
    }

    pub fn set_kana_class(
        &mut self,
        class: KanaClass,
        on: bool,
        store: &mut dyn SettingsStore,
    ) -> bool {
        self.edit_kana(store, |sel, kana| sel.set_class(kana, class, on))
    }

    fn edit_kana<F>(&mut self, store: &mut dyn SettingsStore, edit: F) -> bool
    where
        F: FnOnce(&mut KanaSelection, &Catalog),
    {
        let Some(kana) = self.controller.content().kana() else {
            return false;
        };
        let mut selection = self.controller.selection().clone();
        let (Selection::Kana(sel) | Selection::Words(sel)) = &mut selection else {
            return false;
        };
        edit(sel, kana);
        let flags = sel.to_flags(kana);

        store.save(&self.surface.key(SELECTED_KANA), &flags);
        self.controller.change_selection(selection);
        true
    }

    /// Flip a phrase category. Turning off the last active one is rejected.
    pub fn toggle_category(&mut self, key: &str, store: &mut dyn SettingsStore) -> Toggle {
        let mut selection = self.controller.selection().clone();
        let Selection::Phrases(sel) = &mut selection else {
            return Toggle::Rejected;
        };
        if sel.toggle(key) == Toggle::Rejected {
            return Toggle::Rejected;
        }
        store.save(&self.surface.key(CATEGORIES), &sel.keys());
        self.controller.change_selection(selection);
        Toggle::Applied
    }

    pub fn kana_selection(&self) -> Option<&KanaSelection> {
        match self.controller.selection() {
            Selection::Kana(sel) | Selection::Words(sel) => Some(sel),
            Selection::Phrases(_) => None,
        }
    }

    pub fn category_selection(&self) -> Option<&CategorySelection> {
        match self.controller.selection() {
            Selection::Phrases(sel) => Some(sel),
            _ => None,
        }
    }

    pub fn cycle_display_mode(&mut self, forward: bool, store: &mut dyn SettingsStore) -> DisplayMode {
        let mode = self.controller.display_mode().cycle(forward);
        self.set_display_mode(mode, store);
        mode
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode, store: &mut dyn SettingsStore) {
        let key = self.surface.key(DISPLAY_MODE);
        match mode {
            DisplayMode::Kana(m) => store.save(&key, &m),
            DisplayMode::Vocab(m) => store.save(&key, &m),
        }
        self.controller.set_display_mode(mode);
    }

    pub fn set_practice_mode(&mut self, mode: PracticeMode, store: &mut dyn SettingsStore) {
        store.save(&self.surface.key(PRACTICE_MODE), &mode);
        self.controller.set_practice_mode(mode);
    }

    pub fn toggle_practice_mode(&mut self, store: &mut dyn SettingsStore) -> PracticeMode {
        let mode = self.controller.practice_mode().toggled();
        self.set_practice_mode(mode, store);
        mode
    }

    pub fn toggle_auto_speak(&mut self, store: &mut dyn SettingsStore) -> bool {
        self.auto_speak = !self.auto_speak;
        store.save(&self.surface.key(AUTO_SPEAK), &self.auto_speak);
        self.auto_speak
    }
}

fn load_content(surface: Surface, cache: &mut CatalogCache) -> Result<Content, CatalogError> {
    Ok(match surface {
        Surface::Kana => Content::Kana(cache.get_or_load(CatalogKind::Kana)?),
        Surface::Words => Content::Words {
            kana: cache.get_or_load(CatalogKind::Kana)?,
            words: cache.get_or_load(CatalogKind::Words)?,
        },
        Surface::Phrases => Content::Phrases(cache.get_or_load(CatalogKind::Phrases)?),
    })
}

fn restore_selection(surface: Surface, content: &Content, store: &dyn SettingsStore) -> Selection {
    match content {
        Content::Phrases(phrases) => {
            let saved = store
                .load::<Vec<String>>(&surface.key(CATEGORIES))
                .unwrap_or_default();
            Selection::Phrases(CategorySelection::restored(phrases, &saved))
        }
        Content::Kana(kana) => Selection::Kana(restore_kana(surface, kana, store)),
        Content::Words { kana, .. } => Selection::Words(restore_kana(surface, kana, store)),
    }
}

fn restore_kana(surface: Surface, kana: &Catalog, store: &dyn SettingsStore) -> KanaSelection {
    let saved = store
        .load::<BTreeMap<String, bool>>(&surface.key(SELECTED_KANA))
        .unwrap_or_default();
    KanaSelection::merged(kana, &saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::loader::EmbeddedSource;
    use crate::engine::random::ScriptedSource;
    use crate::speech::RecordingSpeaker;
    use crate::store::MemoryStore;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn cache() -> CatalogCache {
        CatalogCache::new(Box::new(EmbeddedSource))
    }

    #[test]
    fn surface_keys_are_prefixed() {
        assert_eq!(Surface::Kana.key("display_mode"), "kana_display_mode");
        assert_eq!(Surface::Phrases.key("categories"), "phrases_categories");
        assert_eq!(Surface::from_name("words"), Some(Surface::Words));
        assert_eq!(Surface::from_name("kanji"), None);
    }

    #[test]
    fn fresh_kana_surface_selects_seion() {
        let mut cache = cache();
        let store = MemoryStore::new();
        let surface =
            PracticeSurface::open(Surface::Kana, &mut cache, &store, SmallRng::seed_from_u64(1))
                .unwrap();
        assert_eq!(surface.controller().eligible_len(), 46);
        assert_eq!(
            surface.controller().display_mode(),
            DisplayMode::Kana(KanaMode::Mixed)
        );
        assert_eq!(surface.controller().practice_mode(), PracticeMode::Memory);
        assert!(!surface.auto_speak());
    }

    #[test]
    fn kana_toggles_persist_and_restore() {
        let mut cache = cache();
        let mut store = MemoryStore::new();
        let mut surface =
            PracticeSurface::open(Surface::Kana, &mut cache, &store, SmallRng::seed_from_u64(2))
                .unwrap();
        assert!(surface.set_kana_class(KanaClass::Dakuon, true, &mut store));
        assert!(surface.toggle_kana("a", &mut store));
        assert_eq!(surface.controller().eligible_len(), 46 + 25 - 1);

        let reopened =
            PracticeSurface::open(Surface::Kana, &mut cache, &store, SmallRng::seed_from_u64(3))
                .unwrap();
        let sel = reopened.kana_selection().unwrap();
        assert!(!sel.is_selected("a"));
        assert!(sel.is_selected("ga"));
        assert_eq!(reopened.controller().eligible_len(), 70);
    }

    #[test]
    fn surfaces_do_not_share_settings() {
        let mut cache = cache();
        let mut store = MemoryStore::new();
        let mut kana =
            PracticeSurface::open(Surface::Kana, &mut cache, &store, SmallRng::seed_from_u64(4))
                .unwrap();
        kana.set_practice_mode(PracticeMode::Learning, &mut store);
        kana.toggle_auto_speak(&mut store);

        let words =
            PracticeSurface::open(Surface::Words, &mut cache, &store, SmallRng::seed_from_u64(5))
                .unwrap();
        assert_eq!(words.controller().practice_mode(), PracticeMode::Memory);
        assert!(!words.auto_speak());
    }

    #[test]
    fn phrase_categories_reject_emptying() {
        let mut cache = cache();
        let mut store = MemoryStore::new();
        let mut phrases =
            PracticeSurface::open(Surface::Phrases, &mut cache, &store, SmallRng::seed_from_u64(6))
                .unwrap();
        assert_eq!(phrases.controller().eligible_len(), 6);
        assert_eq!(phrases.toggle_category("greeting", &mut store), Toggle::Rejected);
        assert_eq!(phrases.toggle_category("daily", &mut store), Toggle::Applied);
        assert_eq!(phrases.controller().eligible_len(), 12);

        let s: &dyn SettingsStore = &store;
        assert_eq!(
            s.load::<Vec<String>>("phrases_categories"),
            Some(vec!["daily".to_string(), "greeting".to_string()])
        );
        // kana edits do nothing on the phrase surface
        assert!(!phrases.toggle_kana("a", &mut store));
    }

    #[test]
    fn display_mode_cycles_and_persists() {
        let mut cache = cache();
        let mut store = MemoryStore::new();
        let mut words =
            PracticeSurface::open(Surface::Words, &mut cache, &store, SmallRng::seed_from_u64(7))
                .unwrap();
        assert_eq!(
            words.cycle_display_mode(true, &mut store),
            DisplayMode::Vocab(VocabMode::Phonetic)
        );
        let reopened =
            PracticeSurface::open(Surface::Words, &mut cache, &store, SmallRng::seed_from_u64(8))
                .unwrap();
        assert_eq!(
            reopened.controller().display_mode(),
            DisplayMode::Vocab(VocabMode::Phonetic)
        );
    }

    #[test]
    fn learning_mode_auto_speaks_each_prompt() {
        let mut cache = cache();
        let mut store = MemoryStore::new();
        let mut speaker = RecordingSpeaker::default();
        let mut kana =
            PracticeSurface::open(Surface::Kana, &mut cache, &store, ScriptedSource::new(&[], &[]))
                .unwrap();
        kana.set_display_mode(DisplayMode::Kana(KanaMode::Romaji), &mut store);
        kana.toggle_auto_speak(&mut store);

        kana.start(&mut speaker).unwrap();
        assert!(speaker.spoken.is_empty());

        kana.set_practice_mode(PracticeMode::Learning, &mut store);
        kana.advance(&mut speaker).unwrap();
        assert_eq!(speaker.spoken.len(), 1);
        // romaji on screen, kana read aloud
        let prompt = kana.controller().prompt().unwrap();
        assert_eq!(speaker.spoken[0], prompt.entry.phonetic);
        assert_ne!(speaker.spoken[0], prompt.primary);
    }

    #[test]
    fn words_speak_reading_without_pitch_marker() {
        let mut cache = cache();
        let mut store = MemoryStore::new();
        let mut speaker = RecordingSpeaker::default();
        let mut words =
            PracticeSurface::open(Surface::Words, &mut cache, &store, SmallRng::seed_from_u64(9))
                .unwrap();
        words.set_kana_class(KanaClass::Dakuon, true, &mut store);
        words.set_kana_class(KanaClass::Yoon, true, &mut store);
        assert_eq!(words.speak_current(&mut speaker), Err(PracticeError::NoPrompt));

        words.start(&mut speaker).unwrap();
        words.speak_current(&mut speaker).unwrap();
        let spoken = &speaker.spoken[0];
        assert!(!spoken.chars().any(|c| crate::catalog::PITCH_MARKERS.contains(&c)));
        assert_eq!(*spoken, words.controller().prompt().unwrap().entry.bare_phonetic());
    }
}
