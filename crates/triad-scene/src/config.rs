//! Scene configuration
//!
//! A scene is described in a RON file: the model files to load, the welds
//! that place them, and the frames to annotate with triads.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use triad_core::{FrameKind, Pose, TriadSpec, TriadStyle, Weld};

/// Configuration error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Deserialization error: {0}")]
    Deserialize(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Unsupported config version {found} (current is {current})")]
    UnsupportedVersion { found: u32, current: u32 },
}

/// A weld as written in the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeldConfig {
    pub parent: String,
    pub child: String,
    /// Transform from parent to child
    #[serde(default)]
    pub origin: Pose,
    /// `Fixed` for offset frames that are not bodies
    #[serde(default)]
    pub kind: FrameKind,
}

impl WeldConfig {
    pub fn to_weld(&self) -> Weld {
        Weld {
            kind: self.kind,
            ..Weld::from_pose(&self.parent, &self.child, &self.origin)
        }
    }
}

/// A frame to annotate with a triad
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriadConfig {
    pub frame: String,
    /// Placement of the triad within the frame
    #[serde(default)]
    pub offset: Option<Pose>,
    /// Overrides the scene-wide triad style
    #[serde(default)]
    pub style: Option<TriadStyle>,
}

impl TriadConfig {
    pub fn to_spec(&self, default_style: TriadStyle) -> TriadSpec {
        let spec = TriadSpec::new(&self.frame, self.style.unwrap_or(default_style));
        match &self.offset {
            Some(offset) => spec.with_offset(offset.to_transform()),
            None => spec,
        }
    }
}

/// Complete scene description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Configuration format version
    #[serde(default = "SceneConfig::current_version")]
    pub version: u32,
    /// Style shared by every triad
    #[serde(default)]
    pub triad: TriadStyle,
    /// URDF files, relative to the config file
    #[serde(default)]
    pub models: Vec<PathBuf>,
    /// Welds in assembly order (parents first)
    #[serde(default)]
    pub welds: Vec<WeldConfig>,
    /// Frames to annotate, in registration order
    #[serde(default)]
    pub triads: Vec<TriadConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            triad: TriadStyle::default(),
            models: Vec::new(),
            welds: Vec::new(),
            triads: Vec::new(),
        }
    }
}

impl SceneConfig {
    /// Current configuration version
    pub const CURRENT_VERSION: u32 = 1;

    fn current_version() -> u32 {
        Self::CURRENT_VERSION
    }

    /// Load a config file; model paths are made relative to its directory
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let mut config = Self::from_ron_str(&content)?;

        if let Some(base_dir) = path.parent() {
            config.models = config
                .models
                .into_iter()
                .map(|m| if m.is_absolute() { m } else { base_dir.join(m) })
                .collect();
        }

        tracing::info!("Loaded scene config from {:?}", path);
        Ok(config)
    }

    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        if config.version > Self::CURRENT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                current: Self::CURRENT_VERSION,
            });
        }
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn weld_list(&self) -> Vec<Weld> {
        self.welds.iter().map(WeldConfig::to_weld).collect()
    }

    pub fn triad_specs(&self) -> Vec<TriadSpec> {
        self.triads.iter().map(|t| t.to_spec(self.triad)).collect()
    }
}
