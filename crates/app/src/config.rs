use std::path::{Path, PathBuf};

use lotsnap_archive::{Dimensions, IngestOptions, ResizeSpec};
use lotsnap_core::GroupingPolicy;
use lotsnap_ocr::LotPrefix;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Everything that shapes a run, loadable from a TOML file.
///
/// ```toml
/// [ingest]
/// recursive = true
///
/// [recognition]
/// lot_prefix = "required"
///
/// [grouping]
/// duplicate_tags = "first_tag_wins"
///
/// [resize]
/// enabled = true
/// landscape = { width = 1600, height = 1200 }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub ingest: IngestOptions,
    pub recognition: RecognitionConfig,
    pub grouping: GroupingPolicy,
    pub resize: ResizeConfig,
    pub output: OutputConfig,
}

impl PipelineConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_content)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    pub lot_prefix: LotPrefix,
    /// Grayscale and contrast-stretch photos before OCR.
    pub preprocess: bool,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self { lot_prefix: LotPrefix::default(), preprocess: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeConfig {
    pub enabled: bool,
    pub landscape: Dimensions,
    pub portrait: Dimensions,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        let spec = ResizeSpec::default();
        Self { enabled: false, landscape: spec.landscape, portrait: spec.portrait }
    }
}

impl ResizeConfig {
    /// The resize to apply, if any.
    pub fn spec(&self) -> Option<ResizeSpec> {
        self.enabled.then_some(ResizeSpec { landscape: self.landscape, portrait: self.portrait })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Download name prefix; a `_YYYYmmdd_HHMMSS.zip` timestamp is appended.
    pub file_prefix: String,
    /// Where run workspaces are created. Defaults to the system temp directory.
    pub workspace_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { file_prefix: "renamed_lots".to_string(), workspace_dir: None }
    }
}
