use std::path::{Path, PathBuf};

use medcalc_export::ReportFormat;
use medcalc_export::styles::DocumentStyles;
use serde::{Deserialize, Serialize};

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
const CURRENT_VERSION: u32 = 1;

const FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedcalcConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    #[serde(default)]
    pub config_version: u32,
    /// Where exported reports are written.
    pub export_dir: PathBuf,
    pub export_format: ReportFormat,
    /// Directories scanned for extra calculator schemas (`*.json`). Added
    /// in v1.
    #[serde(default)]
    pub schema_dirs: Vec<PathBuf>,
    /// Terminal bell on warnings and errors. Added in v1.
    #[serde(default)]
    pub sound_cues: bool,
    /// DOCX typography; partial objects keep the remaining defaults.
    #[serde(default)]
    pub styles: DocumentStyles,
    pub created_at: jiff::Timestamp,
}

impl Default for MedcalcConfig {
    fn default() -> Self {
        let base = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            config_version: CURRENT_VERSION,
            export_dir: base.join("medcalc"),
            export_format: ReportFormat::default(),
            schema_dirs: Vec::new(),
            sound_cues: false,
            styles: DocumentStyles::default(),
            created_at: jiff::Timestamp::now(),
        }
    }
}

pub fn config_dir() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("com.medcalc.cli"))
}

pub fn config_path() -> eyre::Result<PathBuf> {
    Ok(config_dir()?.join(FILE_NAME))
}

pub fn has_config() -> bool {
    config_path().map(|p| p.exists()).unwrap_or(false)
}

/// Load the user's config, or the defaults when none was saved yet.
pub fn load_or_default() -> eyre::Result<MedcalcConfig> {
    if !has_config() {
        return Ok(MedcalcConfig::default());
    }
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> eyre::Result<MedcalcConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = json
        .get("config_version")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;

    let migrated = migrate(json, on_disk_version)?;
    let config: MedcalcConfig = serde_json::from_value(migrated)?;
    Ok(config)
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION}). \
             Please update medcalc."
        ));
    }

    // v0 → v1: schema_dirs and sound_cues
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;
        obj.entry("schema_dirs")
            .or_insert(serde_json::Value::Array(Vec::new()));
        obj.entry("sound_cues")
            .or_insert(serde_json::Value::Bool(false));
        obj.insert(
            "config_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!("migrated config v0 → v1 (added schema_dirs, sound_cues)");
    }

    Ok(json)
}

pub fn save_config(config: &MedcalcConfig) -> eyre::Result<PathBuf> {
    save_config_to(&config_dir()?, config)
}

pub fn save_config_to(dir: &Path, config: &MedcalcConfig) -> eyre::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    // Always write the current version, regardless of what was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;

    let path = dir.join(FILE_NAME);
    let json = serde_json::to_string_pretty(&stamped)?;

    let tmp_path = dir.join(format!("{FILE_NAME}.tmp"));
    std::fs::write(&tmp_path, json.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, &path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(path)
}
