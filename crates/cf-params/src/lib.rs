//! cf-params: parameter setting for LinearisedSV and IDZ channel-flow blocks.
//!
//! Reads reach geometry and nominal state from a flat, dotted-key parameter
//! store (`"<channel>.length"`), derives the linearization coefficients with
//! `cf-hydraulics` and writes them back under the same channel prefix.

pub mod inform;
pub mod schema;
pub mod setting;
pub mod store;

use std::fmt;
use std::path::Path;

use cf_hydraulics::HydraulicsError;

pub use inform::inform_once;
pub use schema::*;
pub use setting::{
    parameters, set_idz_dynamic_nominal, set_idz_parameters, set_linear_sv_dynamic_nominal,
    set_linear_sv_parameters,
};
pub use store::{MAX_COUNT, ParameterStore, ParameterValue};

pub type ParamResult<T> = Result<T, ParamError>;

/// Channel-flow block a branch is declared as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockKind {
    LinearisedSv,
    Idz,
}

impl BlockKind {
    pub fn name(self) -> &'static str {
        match self {
            BlockKind::LinearisedSv => "LinearisedSV",
            BlockKind::Idz => "IDZ",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ParamError {
    #[error(
        "Parameter {key} is required to set {block} parameters but is missing; \
         declare it on the {block} branch {channel}"
    )]
    MissingParameter {
        key: String,
        block: BlockKind,
        channel: String,
    },

    #[error("Parameter {key} not found")]
    NotFound { key: String },

    #[error("Parameter {key} is not numeric: {value:?}")]
    NonNumeric { key: String, value: String },

    #[error("Parameter {key} is not a valid node count: {value}")]
    InvalidCount { key: String, value: f64 },

    #[error("{block} is enabled but no {block} branches are listed")]
    MissingBranches { block: BlockKind },

    #[error("{block} dynamic nominals are enabled but no nominal levels are given")]
    MissingNominalLevels { block: BlockKind },

    #[error("Timeseries {name} (nominal of {channel}) is unknown or empty")]
    UnknownTimeseries { name: String, channel: String },

    #[error("Failed to derive {block} parameters for {channel}: {source}")]
    Derivation {
        channel: String,
        block: BlockKind,
        #[source]
        source: HydraulicsError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &Path) -> ParamResult<ParameterFile> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

pub fn save_yaml(path: &Path, file: &ParameterFile) -> ParamResult<()> {
    let content = serde_yaml::to_string(file)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ParamResult<ParameterFile> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_json(path: &Path, file: &ParameterFile) -> ParamResult<()> {
    let content = serde_json::to_string_pretty(file)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// True for `.yaml`/`.yml` paths; everything else is treated as JSON.
pub fn is_yaml_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}
