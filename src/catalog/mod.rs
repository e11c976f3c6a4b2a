pub mod cache;
pub mod loader;

use serde::{Deserialize, Serialize};

pub use loader::{CatalogCache, CatalogError, CatalogSource};

/// Circled digits used as pitch-accent annotations in word readings.
pub const PITCH_MARKERS: &[char] = &['①', '②', '③', '④', '⑤', '⑥', '⑦', '⑧', '⑨', '⓪'];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KanaClass {
    Seion,
    Dakuon,
    Yoon,
}

impl KanaClass {
    pub const ALL: [KanaClass; 3] = [KanaClass::Seion, KanaClass::Dakuon, KanaClass::Yoon];

    pub fn key(self) -> &'static str {
        match self {
            KanaClass::Seion => "seion",
            KanaClass::Dakuon => "dakuon",
            KanaClass::Yoon => "yoon",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            KanaClass::Seion => "Seion 清音",
            KanaClass::Dakuon => "Dakuon 濁音",
            KanaClass::Yoon => "Yoon 拗音",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    Kana,
    Words,
    Phrases,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 3] = [CatalogKind::Kana, CatalogKind::Words, CatalogKind::Phrases];

    pub fn file_name(self) -> &'static str {
        match self {
            CatalogKind::Kana => "kana.json",
            CatalogKind::Words => "words.json",
            CatalogKind::Phrases => "phrases.json",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CatalogKind::Kana => "kana",
            CatalogKind::Words => "words",
            CatalogKind::Phrases => "phrases",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Kana { class: KanaClass },
    Word { pitch: Option<String> },
    Phrase { category: String },
}

/// One catalog item. Kana keep hiragana in `phonetic` and katakana in
/// `secondary`; words and phrases keep the kana reading in `phonetic` and
/// the native spelling in `secondary`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub id: String,
    pub phonetic: String,
    pub secondary: String,
    pub romaji: String,
    pub translation: Option<String>,
    pub kind: EntryKind,
}

/// The facet set an entry offers to the display resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facets<'a> {
    Kana {
        hiragana: &'a str,
        katakana: &'a str,
        romaji: &'a str,
    },
    Vocab {
        phonetic: &'a str,
        native: &'a str,
        romaji: &'a str,
        translation: &'a str,
    },
}

impl Entry {
    pub fn kana(id: &str, hiragana: &str, katakana: &str, romaji: &str, class: KanaClass) -> Self {
        Self {
            id: id.to_string(),
            phonetic: hiragana.to_string(),
            secondary: katakana.to_string(),
            romaji: romaji.to_string(),
            translation: None,
            kind: EntryKind::Kana { class },
        }
    }

    pub fn word(id: &str, phonetic: &str, native: &str, romaji: &str, translation: &str) -> Self {
        Self {
            id: id.to_string(),
            phonetic: phonetic.to_string(),
            secondary: native.to_string(),
            romaji: romaji.to_string(),
            translation: Some(translation.to_string()),
            kind: EntryKind::Word {
                pitch: pitch_marker(phonetic),
            },
        }
    }

    pub fn phrase(
        id: &str,
        category: &str,
        phonetic: &str,
        native: &str,
        romaji: &str,
        translation: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            phonetic: phonetic.to_string(),
            secondary: native.to_string(),
            romaji: romaji.to_string(),
            translation: Some(translation.to_string()),
            kind: EntryKind::Phrase {
                category: category.to_string(),
            },
        }
    }

    pub fn facets(&self) -> Facets<'_> {
        match self.kind {
            EntryKind::Kana { .. } => Facets::Kana {
                hiragana: &self.phonetic,
                katakana: &self.secondary,
                romaji: &self.romaji,
            },
            EntryKind::Word { .. } | EntryKind::Phrase { .. } => Facets::Vocab {
                phonetic: &self.phonetic,
                native: &self.secondary,
                romaji: &self.romaji,
                translation: self.translation.as_deref().unwrap_or(""),
            },
        }
    }

    pub fn class(&self) -> Option<KanaClass> {
        match self.kind {
            EntryKind::Kana { class } => Some(class),
            _ => None,
        }
    }

    pub fn category(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::Phrase { category } => Some(category),
            _ => None,
        }
    }

    pub fn pitch(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::Word { pitch } => pitch.as_deref(),
            _ => None,
        }
    }

    /// Reading with pitch markers removed.
    pub fn bare_phonetic(&self) -> String {
        strip_pitch_markers(&self.phonetic)
    }
}

pub fn strip_pitch_markers(text: &str) -> String {
    text.chars().filter(|c| !PITCH_MARKERS.contains(c)).collect()
}

fn pitch_marker(text: &str) -> Option<String> {
    text.chars()
        .find(|c| PITCH_MARKERS.contains(c))
        .map(|c| c.to_string())
}

/// Read-only list of entries of one kind. Phrase catalogs also remember the
/// order their categories appeared in.
#[derive(Clone, Debug)]
pub struct Catalog {
    kind: CatalogKind,
    entries: Vec<Entry>,
    categories: Vec<String>,
}

impl Catalog {
    pub fn new(kind: CatalogKind, entries: Vec<Entry>) -> Self {
        let mut categories: Vec<String> = Vec::new();
        for entry in &entries {
            if let Some(category) = entry.category()
                && !categories.iter().any(|c| c == category)
            {
                categories.push(category.to_string());
            }
        }
        Self {
            kind,
            entries,
            categories,
        }
    }

    pub fn kind(&self) -> CatalogKind {
        self.kind
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn in_category<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Entry> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.category() == Some(key))
    }

    pub fn in_class(&self, class: KanaClass) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(move |e| e.class() == Some(class))
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_pitch_markers_removes_all_circled_digits() {
        assert_eq!(strip_pitch_markers("ねこ①"), "ねこ");
        assert_eq!(strip_pitch_markers("⓪さかな"), "さかな");
        assert_eq!(strip_pitch_markers("かすたむ"), "かすたむ");
    }

    #[test]
    fn word_pitch_is_taken_from_reading_marker() {
        let word = Entry::word("neko", "ねこ①", "猫", "neko", "cat");
        assert_eq!(word.pitch(), Some("①"));
        assert_eq!(word.bare_phonetic(), "ねこ");
    }

    #[test]
    fn catalog_keeps_category_order_of_first_appearance() {
        let catalog = Catalog::new(
            CatalogKind::Phrases,
            vec![
                Entry::phrase("p1", "greeting", "おはよう", "おはよう", "ohayou", "good morning"),
                Entry::phrase("p2", "daily", "いただきます", "いただきます", "itadakimasu", "thanks for the meal"),
                Entry::phrase("p3", "greeting", "こんばんは", "こんばんは", "konbanwa", "good evening"),
            ],
        );
        assert_eq!(catalog.categories(), &["greeting".to_string(), "daily".to_string()]);
        assert_eq!(catalog.in_category("greeting").count(), 2);
    }

    #[test]
    fn kana_facets_map_hiragana_and_katakana() {
        let a = Entry::kana("a", "あ", "ア", "a", KanaClass::Seion);
        assert_eq!(
            a.facets(),
            Facets::Kana {
                hiragana: "あ",
                katakana: "ア",
                romaji: "a"
            }
        );
        assert_eq!(a.class(), Some(KanaClass::Seion));
        assert_eq!(a.category(), None);
    }
}
