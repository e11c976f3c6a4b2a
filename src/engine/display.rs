use serde::{Deserialize, Serialize};

use crate::catalog::{Entry, Facets};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KanaMode {
    #[default]
    Mixed,
    Hiragana,
    Katakana,
    Romaji,
    Swap,
}

impl KanaMode {
    pub const ALL: [KanaMode; 5] = [
        KanaMode::Mixed,
        KanaMode::Hiragana,
        KanaMode::Katakana,
        KanaMode::Romaji,
        KanaMode::Swap,
    ];

    pub fn label(self) -> &'static str {
        match self {
            KanaMode::Mixed => "Mixed",
            KanaMode::Hiragana => "Hiragana",
            KanaMode::Katakana => "Katakana",
            KanaMode::Romaji => "Romaji",
            KanaMode::Swap => "Swap",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VocabMode {
    #[default]
    Mixed,
    Phonetic,
    Native,
}

impl VocabMode {
    pub const ALL: [VocabMode; 3] = [VocabMode::Mixed, VocabMode::Phonetic, VocabMode::Native];

    pub fn label(self) -> &'static str {
        match self {
            VocabMode::Mixed => "Mixed",
            VocabMode::Phonetic => "Kana reading",
            VocabMode::Native => "Japanese",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DisplayMode {
    Kana(KanaMode),
    Vocab(VocabMode),
}

impl DisplayMode {
    pub fn label(self) -> &'static str {
        match self {
            DisplayMode::Kana(m) => m.label(),
            DisplayMode::Vocab(m) => m.label(),
        }
    }

    /// Next mode of the same domain, wrapping around.
    pub fn cycle(self, forward: bool) -> Self {
        fn step<T: Copy + PartialEq>(all: &[T], cur: T, forward: bool) -> T {
            let i = all.iter().position(|&m| m == cur).unwrap_or(0);
            let n = all.len();
            all[if forward { (i + 1) % n } else { (i + n - 1) % n }]
        }
        match self {
            DisplayMode::Kana(m) => DisplayMode::Kana(step(&KanaMode::ALL, m, forward)),
            DisplayMode::Vocab(m) => DisplayMode::Vocab(step(&VocabMode::ALL, m, forward)),
        }
    }

    /// Whether resolution consumes the caller's random bit.
    pub fn is_randomized(self) -> bool {
        matches!(
            self,
            DisplayMode::Kana(KanaMode::Mixed | KanaMode::Swap) | DisplayMode::Vocab(VocabMode::Mixed)
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Script {
    Hiragana,
    Katakana,
    Romaji,
    Unknown,
}

/// Classify text by content: all ASCII letters is romaji, otherwise the
/// Unicode block of the first character decides.
pub fn classify_script(text: &str) -> Script {
    if !text.is_empty() && text.chars().all(|c| c.is_ascii_alphabetic()) {
        return Script::Romaji;
    }
    match text.chars().next() {
        Some('\u{3040}'..='\u{309F}') => Script::Hiragana,
        Some('\u{30A0}'..='\u{30FF}') => Script::Katakana,
        _ => Script::Unknown,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HintLabel {
    Hiragana,
    Katakana,
    Romaji,
    Reading,
    Native,
    Translation,
    Unknown,
}

impl HintLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            HintLabel::Hiragana => "hiragana",
            HintLabel::Katakana => "katakana",
            HintLabel::Romaji => "romaji",
            HintLabel::Reading => "reading",
            HintLabel::Native => "japanese",
            HintLabel::Translation => "meaning",
            HintLabel::Unknown => "",
        }
    }
}

impl From<Script> for HintLabel {
    fn from(script: Script) -> Self {
        match script {
            Script::Hiragana => HintLabel::Hiragana,
            Script::Katakana => HintLabel::Katakana,
            Script::Romaji => HintLabel::Romaji,
            Script::Unknown => HintLabel::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HintPart {
    pub label: HintLabel,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolved {
    pub primary: String,
    pub hint: String,
    pub parts: Vec<HintPart>,
}

/// Primary and hint text for `entry` under `mode`. `bit` picks the shown
/// face in randomized modes and is ignored otherwise. A mode from the other
/// domain falls back to that entry's mixed mode.
pub fn resolve(entry: &Entry, mode: DisplayMode, bit: bool) -> Resolved {
    match entry.facets() {
        Facets::Kana {
            hiragana,
            katakana,
            romaji,
        } => {
            let mode = match mode {
                DisplayMode::Kana(m) => m,
                DisplayMode::Vocab(_) => KanaMode::Mixed,
            };
            resolve_kana([hiragana, katakana, romaji], mode, bit)
        }
        Facets::Vocab {
            phonetic,
            native,
            romaji,
            translation,
        } => {
            let mode = match mode {
                DisplayMode::Vocab(m) => m,
                DisplayMode::Kana(_) => VocabMode::Mixed,
            };
            resolve_vocab(phonetic, native, romaji, translation, mode, bit)
        }
    }
}

fn resolve_kana(facets: [&str; 3], mode: KanaMode, bit: bool) -> Resolved {
    let [hiragana, katakana, romaji] = facets;
    let coin = if bit { hiragana } else { katakana };
    let primary = match mode {
        KanaMode::Mixed | KanaMode::Swap => coin,
        KanaMode::Hiragana => hiragana,
        KanaMode::Katakana => katakana,
        KanaMode::Romaji => romaji,
    };
    let parts = match mode {
        KanaMode::Swap => hint_parts(primary, &[hiragana, katakana]),
        _ => hint_parts(primary, &facets),
    };
    Resolved {
        primary: primary.to_string(),
        hint: join(&parts, " "),
        parts,
    }
}

/// Every facet except the one equal to `primary`, labelled by content.
pub fn hint_parts(primary: &str, facets: &[&str]) -> Vec<HintPart> {
    let Some(shown) = facets.iter().position(|f| *f == primary) else {
        return Vec::new();
    };
    facets
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != shown)
        .map(|(_, text)| HintPart {
            label: classify_script(text).into(),
            text: text.to_string(),
        })
        .collect()
}

fn resolve_vocab(
    phonetic: &str,
    native: &str,
    romaji: &str,
    translation: &str,
    mode: VocabMode,
    bit: bool,
) -> Resolved {
    let show_phonetic = match mode {
        VocabMode::Mixed => bit,
        VocabMode::Phonetic => true,
        VocabMode::Native => false,
    };
    let (primary, other) = if show_phonetic {
        (phonetic, HintPart { label: HintLabel::Native, text: native.to_string() })
    } else {
        (native, HintPart { label: HintLabel::Reading, text: phonetic.to_string() })
    };

    let mut parts = vec![
        other,
        HintPart {
            label: HintLabel::Romaji,
            text: romaji.to_string(),
        },
    ];
    if !translation.is_empty() {
        parts.push(HintPart {
            label: HintLabel::Translation,
            text: translation.to_string(),
        });
    }

    Resolved {
        primary: primary.to_string(),
        hint: join(&parts, "\n"),
        parts,
    }
}

fn join(parts: &[HintPart], sep: &str) -> String {
    parts
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(sep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::KanaClass;

    fn a() -> Entry {
        Entry::kana("a", "あ", "ア", "a", KanaClass::Seion)
    }

    fn neko() -> Entry {
        Entry::word("neko", "ねこ①", "猫", "neko", "cat")
    }

    #[test]
    fn hiragana_mode_is_deterministic() {
        for bit in [true, false, true] {
            let r = resolve(&a(), DisplayMode::Kana(KanaMode::Hiragana), bit);
            assert_eq!(r.primary, "あ");
            assert_eq!(r.hint, "ア a");
        }
    }

    #[test]
    fn katakana_and_romaji_modes() {
        let r = resolve(&a(), DisplayMode::Kana(KanaMode::Katakana), true);
        assert_eq!((r.primary.as_str(), r.hint.as_str()), ("ア", "あ a"));
        let r = resolve(&a(), DisplayMode::Kana(KanaMode::Romaji), true);
        assert_eq!((r.primary.as_str(), r.hint.as_str()), ("a", "あ ア"));
    }

    #[test]
    fn mixed_follows_the_bit() {
        let r = resolve(&a(), DisplayMode::Kana(KanaMode::Mixed), true);
        assert_eq!((r.primary.as_str(), r.hint.as_str()), ("あ", "ア a"));
        let r = resolve(&a(), DisplayMode::Kana(KanaMode::Mixed), false);
        assert_eq!((r.primary.as_str(), r.hint.as_str()), ("ア", "あ a"));
    }

    #[test]
    fn swap_hint_is_the_other_form_only() {
        let r = resolve(&a(), DisplayMode::Kana(KanaMode::Swap), false);
        assert_eq!(r.primary, "ア");
        assert_eq!(r.hint, "あ");
        assert_eq!(r.parts[0].label, HintLabel::Hiragana);
    }

    #[test]
    fn hint_parts_are_labelled_by_content() {
        let r = resolve(&a(), DisplayMode::Kana(KanaMode::Hiragana), true);
        let labels: Vec<HintLabel> = r.parts.iter().map(|p| p.label).collect();
        assert_eq!(labels, vec![HintLabel::Katakana, HintLabel::Romaji]);
    }

    #[test]
    fn yoon_digraphs_classify_by_first_char() {
        let kya = Entry::kana("kya", "きゃ", "キャ", "kya", KanaClass::Yoon);
        let r = resolve(&kya, DisplayMode::Kana(KanaMode::Romaji), true);
        let labels: Vec<HintLabel> = r.parts.iter().map(|p| p.label).collect();
        assert_eq!(labels, vec![HintLabel::Hiragana, HintLabel::Katakana]);
    }

    #[test]
    fn classify_script_cases() {
        assert_eq!(classify_script("shi"), Script::Romaji);
        assert_eq!(classify_script("Tsu"), Script::Romaji);
        assert_eq!(classify_script("ん"), Script::Hiragana);
        assert_eq!(classify_script("ヲ"), Script::Katakana);
        assert_eq!(classify_script("猫"), Script::Unknown);
        assert_eq!(classify_script(""), Script::Unknown);
        assert_eq!(classify_script("eki wa"), Script::Unknown);
    }

    #[test]
    fn romaji_classifier_matches_letter_pattern() {
        let re = regex::Regex::new(r"(?i)^[a-z]+$").unwrap();
        for text in ["a", "kya", "n", "Shi", "ka1", "", "ア", "o o", "ō"] {
            assert_eq!(
                classify_script(text) == Script::Romaji,
                re.is_match(text),
                "mismatch for {text:?}"
            );
        }
    }

    #[test]
    fn vocab_phonetic_and_native_modes() {
        let r = resolve(&neko(), DisplayMode::Vocab(VocabMode::Phonetic), false);
        assert_eq!(r.primary, "ねこ①");
        assert_eq!(r.hint, "猫\nneko\ncat");
        let r = resolve(&neko(), DisplayMode::Vocab(VocabMode::Native), true);
        assert_eq!(r.primary, "猫");
        assert_eq!(r.hint, "ねこ①\nneko\ncat");
    }

    #[test]
    fn vocab_mixed_follows_the_bit() {
        let shown_reading = resolve(&neko(), DisplayMode::Vocab(VocabMode::Mixed), true);
        assert_eq!(shown_reading.primary, "ねこ①");
        let shown_native = resolve(&neko(), DisplayMode::Vocab(VocabMode::Mixed), false);
        assert_eq!(shown_native.primary, "猫");
        assert_eq!(shown_native.parts[0].label, HintLabel::Reading);
    }

    #[test]
    fn mode_from_other_domain_falls_back_to_mixed() {
        let r = resolve(&neko(), DisplayMode::Kana(KanaMode::Romaji), false);
        assert_eq!(r.primary, "猫");
        let r = resolve(&a(), DisplayMode::Vocab(VocabMode::Native), true);
        assert_eq!(r.primary, "あ");
    }

    #[test]
    fn cycle_wraps_within_domain() {
        assert_eq!(
            DisplayMode::Kana(KanaMode::Swap).cycle(true),
            DisplayMode::Kana(KanaMode::Mixed)
        );
        assert_eq!(
            DisplayMode::Vocab(VocabMode::Mixed).cycle(false),
            DisplayMode::Vocab(VocabMode::Native)
        );
        assert!(!DisplayMode::Kana(KanaMode::Romaji).is_randomized());
    }
}
