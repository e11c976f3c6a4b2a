use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use log::warn;

use crate::catalog::{Catalog, Entry, KanaClass, strip_pitch_markers};

/// Which kana are in scope, by entry id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KanaSelection {
    selected: BTreeSet<String>,
}

impl KanaSelection {
    /// Seion on, everything else off.
    pub fn defaults(kana: &Catalog) -> Self {
        Self {
            selected: kana
                .in_class(KanaClass::Seion)
                .map(|e| e.id.clone())
                .collect(),
        }
    }

    /// Apply saved flags on top of the defaults. Ids the catalog no longer
    /// has are dropped; ids missing from `saved` keep their default.
    pub fn merged(kana: &Catalog, saved: &BTreeMap<String, bool>) -> Self {
        let defaults = Self::defaults(kana);
        let selected = kana
            .entries()
            .iter()
            .filter(|e| {
                saved
                    .get(&e.id)
                    .copied()
                    .unwrap_or_else(|| defaults.is_selected(&e.id))
            })
            .map(|e| e.id.clone())
            .collect();
        Self { selected }
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selected: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn toggle(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    pub fn set_class(&mut self, kana: &Catalog, class: KanaClass, on: bool) {
        for entry in kana.in_class(class) {
            if on {
                self.selected.insert(entry.id.clone());
            } else {
                self.selected.remove(&entry.id);
            }
        }
    }

    /// (selected, total) for one class.
    pub fn count(&self, kana: &Catalog, class: KanaClass) -> (usize, usize) {
        kana.in_class(class).fold((0, 0), |(on, total), e| {
            (on + usize::from(self.is_selected(&e.id)), total + 1)
        })
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Full id -> flag map, the shape persisted in settings.
    pub fn to_flags(&self, kana: &Catalog) -> BTreeMap<String, bool> {
        kana.entries()
            .iter()
            .map(|e| (e.id.clone(), self.is_selected(&e.id)))
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    Applied,
    /// The change would have left no category active.
    Rejected,
}

/// Active phrase categories. Never empty once built from a catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategorySelection {
    active: BTreeSet<String>,
}

pub const DEFAULT_CATEGORY: &str = "greeting";

impl CategorySelection {
    pub fn defaults(phrases: &Catalog) -> Self {
        let key = if phrases.categories().iter().any(|c| c == DEFAULT_CATEGORY) {
            Some(DEFAULT_CATEGORY.to_string())
        } else {
            phrases.categories().first().cloned()
        };
        Self {
            active: key.into_iter().collect(),
        }
    }

    /// Saved keys the catalog still knows; falls back to the defaults when
    /// none survive.
    pub fn restored(phrases: &Catalog, saved: &[String]) -> Self {
        let active: BTreeSet<String> = saved
            .iter()
            .filter(|k| phrases.categories().contains(*k))
            .cloned()
            .collect();
        if active.is_empty() {
            Self::defaults(phrases)
        } else {
            Self { active }
        }
    }

    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            active: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.active.contains(key)
    }

    pub fn toggle(&mut self, key: &str) -> Toggle {
        if self.active.contains(key) {
            if self.active.len() == 1 {
                return Toggle::Rejected;
            }
            self.active.remove(key);
        } else {
            self.active.insert(key.to_string());
        }
        Toggle::Applied
    }

    pub fn keys(&self) -> Vec<String> {
        self.active.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// Per-surface selection state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    Kana(KanaSelection),
    Words(KanaSelection),
    Phrases(CategorySelection),
}

/// Catalogs a surface filters over.
#[derive(Clone, Debug)]
pub enum Content {
    Kana(Rc<Catalog>),
    Words { kana: Rc<Catalog>, words: Rc<Catalog> },
    Phrases(Rc<Catalog>),
}

impl Content {
    /// The kana catalog backing a kana-based selection, if any.
    pub fn kana(&self) -> Option<&Catalog> {
        match self {
            Content::Kana(kana) | Content::Words { kana, .. } => Some(kana.as_ref()),
            Content::Phrases(_) => None,
        }
    }
}

/// The eligible set for `selection`. Pure: same inputs, same ids in the
/// same order.
pub fn eligible(content: &Content, selection: &Selection) -> Vec<Entry> {
    match (content, selection) {
        (Content::Kana(kana), Selection::Kana(sel)) => kana_eligible(kana, sel),
        (Content::Words { kana, words }, Selection::Words(sel)) => {
            vocab_eligible(words, &selected_tokens(kana, sel))
        }
        (Content::Phrases(phrases), Selection::Phrases(sel)) => phrase_eligible(phrases, sel),
        _ => {
            warn!("selection does not match surface content");
            Vec::new()
        }
    }
}

pub fn kana_eligible(kana: &Catalog, selection: &KanaSelection) -> Vec<Entry> {
    kana.entries()
        .iter()
        .filter(|e| selection.is_selected(&e.id))
        .cloned()
        .collect()
}

/// Hiragana of every selected kana, longest first. The ordering lets a
/// digraph like きゃ be tried before き; since matching is plain
/// containment over all tokens it never changes the result.
pub fn selected_tokens(kana: &Catalog, selection: &KanaSelection) -> Vec<String> {
    let mut tokens: Vec<String> = kana
        .entries()
        .iter()
        .filter(|e| selection.is_selected(&e.id))
        .map(|e| e.phonetic.clone())
        .filter(|t| !t.is_empty())
        .collect();
    tokens.sort_by_key(|t| std::cmp::Reverse(t.chars().count()));
    tokens
}

pub fn vocab_eligible(words: &Catalog, tokens: &[String]) -> Vec<Entry> {
    if tokens.is_empty() {
        return Vec::new();
    }
    words
        .entries()
        .iter()
        .filter(|w| {
            let reading = strip_pitch_markers(&w.phonetic);
            tokens.iter().any(|t| reading.contains(t.as_str()))
        })
        .cloned()
        .collect()
}

/// Entries of every active category, in catalog category order.
pub fn phrase_eligible(phrases: &Catalog, selection: &CategorySelection) -> Vec<Entry> {
    phrases
        .categories()
        .iter()
        .filter(|c| selection.contains(c))
        .flat_map(|c| phrases.in_category(c))
        .cloned()
        .collect()
}
