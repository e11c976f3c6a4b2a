use std::collections::HashSet;
use std::fs;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tempfile::TempDir;

use kanadr::catalog::loader::{DirectorySource, EmbeddedSource};
use kanadr::catalog::{CatalogCache, CatalogKind, KanaClass, PITCH_MARKERS};
use kanadr::engine::display::{DisplayMode, KanaMode, VocabMode};
use kanadr::engine::filter::{self, CategorySelection, Content, KanaSelection, Selection, Toggle};
use kanadr::session::{PracticeController, PracticeError, PracticeMode, PracticeSurface, Surface};
use kanadr::speech::RecordingSpeaker;
use kanadr::store::{JsonStore, SettingsStore};

fn embedded_cache() -> CatalogCache {
    CatalogCache::new(Box::new(EmbeddedSource))
}

#[test]
fn bundled_catalogs_have_expected_shape() {
    let mut cache = embedded_cache();
    let kana = cache.get_or_load(CatalogKind::Kana).unwrap();
    assert_eq!(kana.in_class(KanaClass::Seion).count(), 46);
    assert_eq!(kana.in_class(KanaClass::Dakuon).count(), 25);
    assert_eq!(kana.in_class(KanaClass::Yoon).count(), 33);

    let ids: HashSet<&str> = kana.entries().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids.len(), kana.len(), "kana ids are unique");

    let phrases = cache.get_or_load(CatalogKind::Phrases).unwrap();
    assert_eq!(phrases.categories(), ["greeting", "daily", "travel", "dining"]);

    let words = cache.get_or_load(CatalogKind::Words).unwrap();
    assert!(words.entries().iter().any(|w| w.pitch().is_some()));
}

#[test]
fn word_filter_follows_kana_selection() {
    let mut cache = embedded_cache();
    let kana = cache.get_or_load(CatalogKind::Kana).unwrap();
    let words = cache.get_or_load(CatalogKind::Words).unwrap();
    let content = Content::Words {
        kana: kana.clone(),
        words: words.clone(),
    };

    let with = Selection::Words(KanaSelection::from_ids(["ka", "su"]));
    let eligible = filter::eligible(&content, &with);
    assert!(eligible.iter().any(|w| w.bare_phonetic() == "かすたむ"));
    // same inputs, same ids in the same order
    let again = filter::eligible(&content, &with);
    assert_eq!(
        eligible.iter().map(|e| &e.id).collect::<Vec<_>>(),
        again.iter().map(|e| &e.id).collect::<Vec<_>>()
    );

    let without = Selection::Words(KanaSelection::from_ids(["a", "i"]));
    assert!(
        filter::eligible(&content, &without)
            .iter()
            .all(|w| w.bare_phonetic() != "かすたむ")
    );
}

#[test]
fn phrase_union_has_no_duplicates() {
    let mut cache = embedded_cache();
    let phrases = cache.get_or_load(CatalogKind::Phrases).unwrap();
    let content = Content::Phrases(phrases.clone());
    let selection = Selection::Phrases(CategorySelection::from_keys(["greeting", "daily"]));

    let eligible = filter::eligible(&content, &selection);
    let ids: HashSet<&str> = eligible.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids.len(), eligible.len());
    assert_eq!(eligible.len(), 12);
    assert!(
        eligible
            .iter()
            .all(|e| matches!(e.category(), Some("greeting" | "daily")))
    );

    let mut only = CategorySelection::from_keys(["travel"]);
    assert_eq!(only.toggle("travel"), Toggle::Rejected);
    assert!(only.contains("travel"));
}

#[test]
fn full_cycle_is_a_permutation_then_repeats() {
    let mut cache = embedded_cache();
    let kana = cache.get_or_load(CatalogKind::Kana).unwrap();
    let selection = KanaSelection::defaults(&kana);
    let mut controller = PracticeController::new(
        Content::Kana(kana.clone()),
        Selection::Kana(selection),
        DisplayMode::Kana(KanaMode::Romaji),
        PracticeMode::Memory,
        SmallRng::seed_from_u64(42),
    );

    let mut seen = HashSet::new();
    seen.insert(controller.start().unwrap().entry.id.clone());
    for _ in 1..46 {
        seen.insert(controller.advance().unwrap().entry.id.clone());
    }
    assert_eq!(seen.len(), 46);
    assert_eq!(controller.progress(), (46, 46));
    assert_eq!(controller.cycle(), 1);

    controller.advance().unwrap();
    assert_eq!(controller.cycle(), 2);
    assert_eq!(controller.progress(), (1, 46));
}

#[test]
fn settings_survive_a_restart() {
    let dir = TempDir::new().unwrap();
    let mut cache = embedded_cache();
    {
        let mut store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let store: &mut dyn SettingsStore = &mut store;
        let mut words =
            PracticeSurface::open(Surface::Words, &mut cache, &*store, SmallRng::seed_from_u64(1))
                .unwrap();
        words.set_kana_class(KanaClass::Yoon, true, store);
        words.set_display_mode(DisplayMode::Vocab(VocabMode::Native), store);
        words.set_practice_mode(PracticeMode::Learning, store);
        words.toggle_auto_speak(store);
    }

    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let words =
        PracticeSurface::open(Surface::Words, &mut cache, &store, SmallRng::seed_from_u64(2))
            .unwrap();
    let controller = words.controller();
    assert_eq!(controller.display_mode(), DisplayMode::Vocab(VocabMode::Native));
    assert_eq!(controller.practice_mode(), PracticeMode::Learning);
    assert!(words.auto_speak());
    let sel = words.kana_selection().unwrap();
    assert!(sel.is_selected("kya"));
    assert!(sel.is_selected("a"));
    assert!(!sel.is_selected("ga"));

    // the kana surface keeps its own defaults
    let kana =
        PracticeSurface::open(Surface::Kana, &mut cache, &store, SmallRng::seed_from_u64(3))
            .unwrap();
    assert!(!kana.kana_selection().unwrap().is_selected("kya"));
}

#[test]
fn directory_catalogs_and_cache_clear() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("phrases.json"),
        r#"{"travel": [{"id": "t1", "hiragana": "えき", "japanese": "駅", "romaji": "eki", "translation": "station"}]}"#,
    )
    .unwrap();

    let mut cache = CatalogCache::new(Box::new(DirectorySource::new(dir.path().to_path_buf())));
    let phrases = cache.get_or_load(CatalogKind::Phrases).unwrap();
    assert_eq!(phrases.len(), 1);
    // greeting is missing, so the first category becomes the default
    assert!(CategorySelection::defaults(&phrases).contains("travel"));

    // a missing file fails without poisoning the cache
    assert!(cache.get_or_load(CatalogKind::Words).is_err());
    assert!(!cache.is_loaded(CatalogKind::Words));

    fs::write(
        dir.path().join("phrases.json"),
        r#"{"travel": [
            {"id": "t1", "hiragana": "えき", "japanese": "駅", "romaji": "eki", "translation": "station"},
            {"id": "t2", "hiragana": "きっぷ", "japanese": "切符", "romaji": "kippu", "translation": "ticket"}
        ]}"#,
    )
    .unwrap();
    assert_eq!(cache.get_or_load(CatalogKind::Phrases).unwrap().len(), 1);
    cache.clear();
    assert_eq!(cache.get_or_load(CatalogKind::Phrases).unwrap().len(), 2);
}

#[test]
fn learning_session_speaks_every_word() {
    let mut cache = embedded_cache();
    let mut store = kanadr::store::MemoryStore::new();
    let mut speaker = RecordingSpeaker::default();
    let mut words =
        PracticeSurface::open(Surface::Words, &mut cache, &store, SmallRng::seed_from_u64(5))
            .unwrap();
    words.set_practice_mode(PracticeMode::Learning, &mut store);
    words.toggle_auto_speak(&mut store);

    words.start(&mut speaker).unwrap();
    for _ in 0..5 {
        assert!(words.controller().hint_visible());
        words.advance(&mut speaker).unwrap();
    }
    assert_eq!(speaker.spoken.len(), 6);
    assert!(
        speaker
            .spoken
            .iter()
            .all(|s| !s.chars().any(|c| PITCH_MARKERS.contains(&c)))
    );

    words.stop();
    assert_eq!(words.reveal_hint(), Err(PracticeError::NoPrompt));
}
