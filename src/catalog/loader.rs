use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use icu_normalizer::ComposingNormalizerBorrowed;
use log::{debug, info, warn};
use rust_embed::Embed;
use serde::Deserialize;

use crate::catalog::cache::{DiskCache, fetch_url};
use crate::catalog::{Catalog, CatalogKind, Entry, EntryKind, KanaClass};

#[derive(Embed)]
#[folder = "assets/dict/"]
struct DictAssets;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("bundled catalog {0} is missing")]
    MissingAsset(&'static str),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {file}: {source}")]
    Parse {
        file: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not fetch {0} and no cached copy exists")]
    Fetch(String),
    #[error("{0} catalog has no entries")]
    Empty(&'static str),
}

/// Where raw catalog JSON comes from.
pub trait CatalogSource {
    fn read(&self, kind: CatalogKind) -> Result<String, CatalogError>;

    fn describe(&self) -> String;
}

/// Catalogs compiled into the binary.
pub struct EmbeddedSource;

impl CatalogSource for EmbeddedSource {
    fn read(&self, kind: CatalogKind) -> Result<String, CatalogError> {
        let file = DictAssets::get(kind.file_name())
            .ok_or(CatalogError::MissingAsset(kind.file_name()))?;
        Ok(String::from_utf8_lossy(file.data.as_ref()).into_owned())
    }

    fn describe(&self) -> String {
        "bundled".to_string()
    }
}

/// `kana.json`, `words.json` and `phrases.json` in a user directory.
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl CatalogSource for DirectorySource {
    fn read(&self, kind: CatalogKind) -> Result<String, CatalogError> {
        let path = self.dir.join(kind.file_name());
        fs::read_to_string(&path).map_err(|source| CatalogError::Io { path, source })
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

/// Catalogs served over HTTP. The last good response is kept on disk and
/// used whenever the network is unavailable.
pub struct RemoteSource {
    base_url: String,
    disk: Option<DiskCache>,
}

impl RemoteSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            disk: DiskCache::new("catalogs"),
        }
    }

    pub fn with_disk_cache(base_url: &str, disk: DiskCache) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            disk: Some(disk),
        }
    }

    fn url(&self, kind: CatalogKind) -> String {
        format!("{}/{}", self.base_url, kind.file_name())
    }
}

impl CatalogSource for RemoteSource {
    fn read(&self, kind: CatalogKind) -> Result<String, CatalogError> {
        let url = self.url(kind);
        if let Some(body) = fetch_url(&url) {
            if let Some(ref disk) = self.disk
                && !disk.put(&url, &body)
            {
                warn!("could not write disk cache for {url}");
            }
            return Ok(body);
        }
        debug!("fetch of {url} failed, trying disk cache");
        self.disk
            .as_ref()
            .and_then(|disk| disk.get(&url))
            .ok_or(CatalogError::Fetch(url))
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// Catalogs loaded so far, keyed by kind. A catalog is loaded at most once
/// until `clear` is called; failed loads are not remembered.
pub struct CatalogCache {
    source: Box<dyn CatalogSource>,
    loaded: HashMap<CatalogKind, Rc<Catalog>>,
}

impl CatalogCache {
    pub fn new(source: Box<dyn CatalogSource>) -> Self {
        Self {
            source,
            loaded: HashMap::new(),
        }
    }

    pub fn get_or_load(&mut self, kind: CatalogKind) -> Result<Rc<Catalog>, CatalogError> {
        if let Some(catalog) = self.loaded.get(&kind) {
            return Ok(Rc::clone(catalog));
        }

        let raw = self.source.read(kind)?;
        let catalog = Rc::new(parse_catalog(kind, &raw)?);
        info!(
            "loaded {} {} entries from {}",
            catalog.len(),
            kind.as_str(),
            self.source.describe()
        );
        self.loaded.insert(kind, Rc::clone(&catalog));
        Ok(catalog)
    }

    pub fn is_loaded(&self, kind: CatalogKind) -> bool {
        self.loaded.contains_key(&kind)
    }

    pub fn clear(&mut self) {
        info!("clearing {} cached catalogs", self.loaded.len());
        self.loaded.clear();
    }
}

#[derive(Deserialize)]
struct RawKana {
    #[serde(default)]
    id: Option<String>,
    hiragana: String,
    katakana: String,
    romaji: String,
}

#[derive(Deserialize)]
struct RawKanaCatalog {
    seion: Vec<RawKana>,
    #[serde(default)]
    dakuon: Vec<RawKana>,
    #[serde(default)]
    yoon: Vec<RawKana>,
}

#[derive(Deserialize)]
struct RawVocab {
    #[serde(default)]
    id: Option<String>,
    hiragana: String,
    japanese: String,
    romaji: String,
    #[serde(alias = "chinese")]
    translation: String,
    #[serde(default)]
    pitch: Option<String>,
}

pub fn parse_catalog(kind: CatalogKind, raw: &str) -> Result<Catalog, CatalogError> {
    let parse_err = |source| CatalogError::Parse {
        file: kind.file_name(),
        source,
    };

    let entries = match kind {
        CatalogKind::Kana => {
            let data: RawKanaCatalog = serde_json::from_str(raw).map_err(parse_err)?;
            let classes = [
                (KanaClass::Seion, data.seion),
                (KanaClass::Dakuon, data.dakuon),
                (KanaClass::Yoon, data.yoon),
            ];
            classes
                .into_iter()
                .flat_map(|(class, items)| items.into_iter().map(move |k| kana_entry(k, class)))
                .collect::<Vec<_>>()
        }
        CatalogKind::Words => {
            let data: Vec<RawVocab> = serde_json::from_str(raw).map_err(parse_err)?;
            data.into_iter()
                .enumerate()
                .map(|(i, w)| {
                    let id = w.id.clone().unwrap_or_else(|| format!("word-{i}"));
                    vocab_entry(id, w, None)
                })
                .collect()
        }
        CatalogKind::Phrases => {
            // preserve_order keeps categories in file order
            let data: serde_json::Map<String, serde_json::Value> =
                serde_json::from_str(raw).map_err(parse_err)?;
            let mut entries = Vec::new();
            for (category, value) in data {
                let items: Vec<RawVocab> = serde_json::from_value(value).map_err(parse_err)?;
                for (i, p) in items.into_iter().enumerate() {
                    let id = p.id.clone().unwrap_or_else(|| format!("{category}-{i}"));
                    entries.push(vocab_entry(id, p, Some(category.clone())));
                }
            }
            entries
        }
    };

    if entries.is_empty() {
        return Err(CatalogError::Empty(kind.as_str()));
    }
    Ok(Catalog::new(kind, entries))
}

fn nfc(text: &str) -> String {
    ComposingNormalizerBorrowed::new_nfc()
        .normalize(text.trim())
        .into_owned()
}

fn kana_entry(raw: RawKana, class: KanaClass) -> Entry {
    let romaji = raw.romaji.trim().to_string();
    let id = raw.id.unwrap_or_else(|| romaji.clone());
    Entry::kana(&id, &nfc(&raw.hiragana), &nfc(&raw.katakana), &romaji, class)
}

fn vocab_entry(id: String, raw: RawVocab, category: Option<String>) -> Entry {
    let phonetic = nfc(&raw.hiragana);
    let native = nfc(&raw.japanese);
    let romaji = raw.romaji.trim().to_string();
    let translation = raw.translation.trim().to_string();
    match category {
        Some(category) => Entry::phrase(&id, &category, &phonetic, &native, &romaji, &translation),
        None => {
            let mut entry = Entry::word(&id, &phonetic, &native, &romaji, &translation);
            if let Some(pitch) = raw.pitch.filter(|p| !p.is_empty()) {
                entry.kind = EntryKind::Word { pitch: Some(pitch) };
            }
            entry
        }
    }
}
