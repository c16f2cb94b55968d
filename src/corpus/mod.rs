// Recipe corpus: CSV loading, field cleaning and the shared snapshot cache

pub mod clean;
pub mod loader;
pub mod models;

pub use loader::parse_recipes;
pub use models::{Nutrition, Recipe, RecipeView};

use crate::error::Result;
use crate::similarity::{self, TfIdfModel};
use crate::text::TermDictionary;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, RwLock};
use std::time::SystemTime;
use tracing::{info, warn};

/// Fingerprint recorded when the corpus file does not exist
const MISSING_FINGERPRINT: &str = "missing";

/// Immutable view of the corpus and everything derived from it
#[derive(Debug)]
pub struct Snapshot {
    recipes: Vec<Recipe>,
    by_id: HashMap<i64, usize>,
    model: TfIdfModel,
    terms: OnceLock<TermDictionary>,
    fingerprint: String,
    loaded_at: DateTime<Utc>,
}

impl Snapshot {
    /// Fit the vector space over `recipes`
    pub fn build(recipes: Vec<Recipe>, fingerprint: impl Into<String>) -> Self {
        let documents: Vec<String> = recipes.iter().map(Recipe::document).collect();
        let model = TfIdfModel::fit(&documents);
        let by_id = recipes
            .iter()
            .enumerate()
            .map(|(index, recipe)| (recipe.id, index))
            .collect();

        Self {
            recipes,
            by_id,
            model,
            terms: OnceLock::new(),
            fingerprint: fingerprint.into(),
            loaded_at: Utc::now(),
        }
    }

    pub fn empty() -> Self {
        Self::build(Vec::new(), String::new())
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Vector space fitted over every recipe of the snapshot
    pub fn model(&self) -> &TfIdfModel {
        &self.model
    }

    /// Food-term dictionary, built on first use
    pub fn terms(&self) -> &TermDictionary {
        self.terms
            .get_or_init(|| TermDictionary::from_recipes(&self.recipes))
    }

    pub fn get(&self, id: i64) -> Option<&Recipe> {
        self.by_id.get(&id).map(|&index| &self.recipes[index])
    }

    /// Position of the first recipe named `title`, ignoring case
    pub fn find_by_name(&self, title: &str) -> Option<usize> {
        similarity::find_seed(self.recipes.iter().map(|r| r.name.as_str()), title)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

/// Size and modification time of the corpus file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    len: u64,
    modified: SystemTime,
}

impl FileStamp {
    /// `None` when the file is missing or the platform has no mtime
    fn of(path: &Path) -> Result<Option<Self>> {
        match std::fs::metadata(path) {
            Ok(meta) => Ok(meta.modified().ok().map(|modified| Self {
                len: meta.len(),
                modified,
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug)]
struct Current {
    snapshot: Arc<Snapshot>,
    /// Stamp of the file the snapshot's fingerprint was last confirmed against
    stamp: Option<FileStamp>,
}

/// Source of corpus snapshots for a CSV file.
///
/// [`CorpusStore::snapshot`] first compares the file's size and mtime with
/// the ones recorded for the current snapshot. Only when they differ is the
/// file read and its SHA-256 fingerprint compared; a changed file is parsed
/// and fitted outside the snapshot lock, then swapped in whole. Requests
/// already holding the previous `Arc<Snapshot>` keep reading it undisturbed.
///
/// Reloads are serialized, so an older file version never replaces a newer
/// one. Staleness windows: a request that races a rewrite is served whichever
/// version its own check saw, and a rewrite that keeps both the size and the
/// mtime (within filesystem timestamp resolution) goes unnoticed until the
/// file's stamp changes again.
#[derive(Debug)]
pub struct CorpusStore {
    path: PathBuf,
    current: RwLock<Current>,
    reload: Mutex<()>,
}

impl CorpusStore {
    /// Create a store; the first snapshot is loaded lazily
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: RwLock::new(Current {
                snapshot: Arc::new(Snapshot::empty()),
                stamp: None,
            }),
            reload: Mutex::new(()),
        }
    }

    /// Create a store and load the corpus eagerly
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(path);
        store.snapshot()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last snapshot loaded, without checking the file
    pub fn current(&self) -> Arc<Snapshot> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .snapshot
            .clone()
    }

    /// Snapshot matching the file's current contents
    pub fn snapshot(&self) -> Result<Arc<Snapshot>> {
        if let Some(snapshot) = self.unchanged(FileStamp::of(&self.path)?) {
            return Ok(snapshot);
        }

        let _reload = self
            .reload
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Stamp before reading, so a write during the read is caught next time
        let stamp = FileStamp::of(&self.path)?;
        if let Some(snapshot) = self.unchanged(stamp) {
            return Ok(snapshot);
        }

        let data = match std::fs::read(&self.path) {
            Ok(data) => Some(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        let fingerprint = match &data {
            Some(bytes) => format!("{:x}", Sha256::digest(bytes)),
            None => MISSING_FINGERPRINT.to_string(),
        };

        let current = self.current();
        if current.fingerprint() == fingerprint {
            self.install(current.clone(), stamp);
            return Ok(current);
        }

        let recipes = match &data {
            Some(bytes) => parse_recipes(bytes)?,
            None => {
                warn!("Corpus file {:?} not found, serving an empty corpus", self.path);
                Vec::new()
            }
        };
        if data.is_some() && recipes.is_empty() {
            warn!("Corpus file {:?} contains no usable recipes", self.path);
        }

        let snapshot = Arc::new(Snapshot::build(recipes, fingerprint));
        info!(
            "Loaded corpus snapshot from {:?}: {} recipes, {} terms",
            self.path,
            snapshot.len(),
            snapshot.model().vocabulary_size()
        );

        self.install(snapshot.clone(), stamp);
        Ok(snapshot)
    }

    /// Current snapshot, if it was confirmed against this exact stamp
    fn unchanged(&self, stamp: Option<FileStamp>) -> Option<Arc<Snapshot>> {
        let current = self
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        (stamp.is_some() && current.stamp == stamp).then(|| current.snapshot.clone())
    }

    fn install(&self, snapshot: Arc<Snapshot>, stamp: Option<FileStamp>) {
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Current { snapshot, stamp };
    }
}
