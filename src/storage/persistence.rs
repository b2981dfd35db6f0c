use crate::core::{ExampleOrigin, RasterImage};
use crate::error::{Result, SketchError};
use crate::storage::ExampleStore;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub const STORE_FORMAT_VERSION: u32 = 1;

/// One persisted example. Descriptors are not stored: they are recomputed
/// with whatever extractor loads them.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredExample {
    pub label: String,
    pub origin: ExampleOrigin,
    pub image: RasterImage,
}

pub trait ExamplePersistence: Send {
    fn save(&self, store: &ExampleStore) -> Result<()>;
    fn load(&self) -> Result<Vec<StoredExample>>;
    fn describe(&self) -> String;
}

/// Keeps nothing: saves and loads are only logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPersistence;

impl ExamplePersistence for NullPersistence {
    fn save(&self, store: &ExampleStore) -> Result<()> {
        debug!(
            labels = store.stats().label_count(),
            examples = store.len(),
            "store not persisted (no store path configured)"
        );
        Ok(())
    }

    fn load(&self) -> Result<Vec<StoredExample>> {
        debug!("no store path configured, starting empty");
        Ok(Vec::new())
    }

    fn describe(&self) -> String {
        "memory only".to_string()
    }
}

#[derive(Serialize)]
struct StoreDocumentRef<'a> {
    version: u32,
    saved_at: String,
    examples: BTreeMap<&'a str, Vec<EntryRef<'a>>>,
}

#[derive(Serialize)]
struct EntryRef<'a> {
    origin: ExampleOrigin,
    image: &'a RasterImage,
}

#[derive(Deserialize)]
struct StoreDocument {
    version: u32,
    #[serde(default)]
    saved_at: Option<String>,
    examples: BTreeMap<String, Vec<Entry>>,
}

#[derive(Deserialize)]
struct Entry {
    origin: ExampleOrigin,
    image: RasterImage,
}

/// Whole-store JSON document, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }
}

impl ExamplePersistence for JsonFilePersistence {
    fn save(&self, store: &ExampleStore) -> Result<()> {
        let mut examples: BTreeMap<&str, Vec<EntryRef<'_>>> = BTreeMap::new();
        for ex in store.iter() {
            examples.entry(ex.label()).or_default().push(EntryRef {
                origin: ex.origin(),
                image: ex.image(),
            });
        }
        let doc = StoreDocumentRef {
            version: STORE_FORMAT_VERSION,
            saved_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            examples,
        };

        let dir = self.parent_dir();
        fs::create_dir_all(dir)?;

        let temp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            serde_json::to_writer(&mut writer, &doc)?;
            writer.flush()?;
        }
        temp.persist(&self.path).map_err(|e| e.error)?;

        info!(
            path = %self.path.display(),
            labels = store.stats().label_count(),
            examples = store.len(),
            "saved example store"
        );
        Ok(())
    }

    fn load(&self) -> Result<Vec<StoredExample>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no saved store yet, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let doc: StoreDocument = serde_json::from_reader(BufReader::new(file))?;
        if doc.version != STORE_FORMAT_VERSION {
            return Err(SketchError::UnsupportedFormat(format!(
                "store version {} (expected {STORE_FORMAT_VERSION})",
                doc.version
            )));
        }

        let out: Vec<StoredExample> = doc
            .examples
            .into_iter()
            .flat_map(|(label, entries)| {
                entries.into_iter().map(move |e| StoredExample {
                    label: label.clone(),
                    origin: e.origin,
                    image: e.image,
                })
            })
            .collect();

        info!(
            path = %self.path.display(),
            saved_at = doc.saved_at.as_deref().unwrap_or("unknown"),
            examples = out.len(),
            "loaded example store"
        );
        Ok(out)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
