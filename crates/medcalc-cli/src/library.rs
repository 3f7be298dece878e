use std::path::{Path, PathBuf};

use medcalc_core::Schema;
use medcalc_engine::{CalculatorInstance, Collaborators};
use medcalc_instruments::{Instrument, all_instruments, get_instrument, load_schema, variant_for};

/// Where a calculator's schema comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Bundled,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub id: String,
    pub title: String,
    pub variant: String,
    pub origin: Origin,
}

/// Every calculator the CLI can open: the bundled instruments followed by
/// valid schemas found in the configured directories.
#[derive(Debug, Clone, Default)]
pub struct Library {
    entries: Vec<Entry>,
}

impl Library {
    pub fn bundled() -> eyre::Result<Self> {
        let mut entries = Vec::new();
        for instrument in all_instruments() {
            let schema = instrument.schema()?;
            entries.push(Entry {
                id: schema.id,
                title: schema.title,
                variant: schema.variant,
                origin: Origin::Bundled,
            });
        }
        Ok(Self { entries })
    }

    /// Bundled calculators plus `*.json` schemas from `schema_dirs`. Files
    /// that fail to load, or reuse an id already present, are skipped with
    /// a warning.
    pub fn load(schema_dirs: &[PathBuf]) -> eyre::Result<Self> {
        let mut library = Self::bundled()?;
        for dir in schema_dirs {
            for path in schema_files(dir) {
                match check_file(&path) {
                    Ok(schema) if library.get(&schema.id).is_some() => {
                        tracing::warn!(
                            path = %path.display(),
                            id = %schema.id,
                            "duplicate calculator id, skipped"
                        );
                    }
                    Ok(schema) => {
                        tracing::debug!(path = %path.display(), id = %schema.id, "schema loaded");
                        library.entries.push(Entry {
                            id: schema.id,
                            title: schema.title,
                            variant: schema.variant,
                            origin: Origin::File(path),
                        });
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "invalid schema, skipped"
                        );
                    }
                }
            }
        }
        Ok(library)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Build a fresh calculator instance for `id`.
    pub fn open(&self, id: &str, collaborators: Collaborators) -> eyre::Result<CalculatorInstance> {
        let entry = self
            .get(id)
            .ok_or_else(|| eyre::eyre!("unknown calculator: {id}"))?;

        let (schema, variant) = match &entry.origin {
            Origin::Bundled => {
                let instrument = get_instrument(&entry.variant)
                    .ok_or_else(|| eyre::eyre!("unknown calculator: {id}"))?;
                (instrument.schema()?, variant_for(&entry.variant)?)
            }
            Origin::File(path) => load_schema(&std::fs::read_to_string(path)?)?,
        };

        let instance = CalculatorInstance::new(schema, variant, collaborators)?;
        tracing::debug!(calculator = %id, "calculator opened");
        Ok(instance)
    }
}

/// Load a schema file and bind it to the variant it declares.
pub fn check_file(path: &Path) -> eyre::Result<Schema> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read {}: {e}", path.display()))?;
    let (schema, _) = load_schema(&json)?;
    Ok(schema)
}

fn schema_files(dir: &Path) -> Vec<PathBuf> {
    let read = match std::fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "schema directory unreadable");
            return Vec::new();
        }
    };
    let mut files: Vec<PathBuf> = read
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}
