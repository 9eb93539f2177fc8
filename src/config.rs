// ==============================================================================
// config.rs - Strain and Colony Configuration
// ==============================================================================
// Description: Vendor strain/mutation definitions (JSON) and colony ID
//              settings (TOML)
// Author: Genotype Importer maintainers
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Vendor config example:
//   {
//     "C57BL/6-Foo": {
//       "display_name": "Foo-Cre",
//       "mutations": [
//         {
//           "name": "Foo-Cre", "mut_marker": "tg", "wt_marker": "wt",
//           "leading_marker": "mut",
//           "alleles": [ { "name": "Cre", "if_positive": "mut" }, "wt" ]
//         }
//       ]
//     }
//   }
//
// Colony config example:
//   [animals]
//   id_prefix = "AN"
//   id_zfill = 4
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::allele::{AlleleState, MarkerPair};

/// Default vendor config file name, looked up in the config directory
pub const VENDOR_CONFIG_FILENAME: &str = "transnetyx_config.json";

/// Default colony config file name, looked up in the config directory
pub const COLONY_CONFIG_FILENAME: &str = "pyrat_config.toml";

/// Errors that can occur while loading configuration files
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid vendor config {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid colony config {path:?}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// How one allele of a mutation gets its state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlleleSpec {
    /// Always this state (control/reference alleles)
    Fixed(AlleleState),

    /// State read from a vendor presence column
    Conditional {
        /// Input column holding the presence signal
        #[serde(rename = "name")]
        column: String,

        /// State of the allele when the signal contains '+'
        if_positive: AlleleState,
    },
}

/// One tracked mutation of a strain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationConfig {
    /// Label written to the "mutation N" column
    pub name: String,

    #[serde(flatten)]
    pub markers: MarkerPair,

    /// State rendered first in the genotype string
    pub leading_marker: AlleleState,

    pub alleles: Vec<AlleleSpec>,
}

/// Vendor strain entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrainConfig {
    /// Line name used by the colony system
    #[serde(alias = "pyrat_name")]
    pub display_name: String,

    #[serde(default)]
    pub mutations: Vec<MutationConfig>,
}

/// Vendor strain name → strain entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VendorConfig {
    strains: HashMap<String, StrainConfig>,
}

impl VendorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn strain(&self, vendor_name: &str) -> Option<&StrainConfig> {
        self.strains.get(vendor_name)
    }

    pub fn insert(&mut self, vendor_name: impl Into<String>, strain: StrainConfig) {
        self.strains.insert(vendor_name.into(), strain);
    }

    pub fn len(&self) -> usize {
        self.strains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strains.is_empty()
    }
}

/// Animal identifier settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalsConfig {
    pub id_prefix: String,
    pub id_zfill: usize,
}

/// Colony system settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColonyConfig {
    pub animals: AnimalsConfig,
}

impl ColonyConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// Config directory shipped with the source tree
pub const BUNDLED_CONFIG_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config");

/// Directory configs are looked up in when none is given
///
/// # Returns
/// * `<exe dir>/config` or `<exe dir>` - whichever holds the vendor config
/// * `BUNDLED_CONFIG_DIR` - otherwise (e.g., `cargo run`, tests)
pub fn default_config_dir() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));

    if let Some(dir) = exe_dir {
        for candidate in [dir.join("config"), dir] {
            if candidate.join(VENDOR_CONFIG_FILENAME).is_file() {
                debug!("Using config directory next to executable: {:?}", candidate);
                return candidate;
            }
        }
    }

    PathBuf::from(BUNDLED_CONFIG_DIR)
}

/// Absolute paths are kept, relative ones are joined onto `base`
pub fn resolve_path(path: impl AsRef<Path>, base: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.as_ref().join(path)
    }
}

fn read_config(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the vendor strain/mutation config
pub fn load_vendor_config(path: impl AsRef<Path>) -> Result<VendorConfig, ConfigError> {
    let path = path.as_ref();
    let text = read_config(path)?;
    let config = VendorConfig::from_json_str(&text).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("Loaded {} strains from {:?}", config.len(), path);
    Ok(config)
}

/// Load the colony ID config
pub fn load_colony_config(path: impl AsRef<Path>) -> Result<ColonyConfig, ConfigError> {
    let path = path.as_ref();
    let text = read_config(path)?;
    let config = ColonyConfig::from_toml_str(&text).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(
        "Loaded colony config from {:?} (prefix '{}', zfill {})",
        path, config.animals.id_prefix, config.animals.id_zfill
    );
    Ok(config)
}
