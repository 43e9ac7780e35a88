//! Settings and parameter file definitions.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use cf_hydraulics::{GridConfig, LinearizationConfig};
use serde::{Deserialize, Serialize};

use crate::ParamResult;
use crate::store::ParameterStore;

/// Which channel-flow blocks get parameters, and how their nominals are set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChannelFlowSettings {
    pub linearised_sv: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linearised_sv_branches: Option<Vec<String>>,
    pub linearised_sv_use_dynamic_nominals: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linearised_sv_nominal_levels: Option<BTreeMap<String, NominalLevels>>,
    pub idz: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idz_branches: Option<Vec<String>>,
    pub idz_use_dynamic_nominals: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idz_nominal_levels: Option<BTreeMap<String, NominalLevels>>,
    pub linearization: LinearizationConfig,
}

impl ChannelFlowSettings {
    pub fn load_yaml(path: &Path) -> ParamResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn load_json(path: &Path) -> ParamResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Grid configuration sharing this settings' singularity policy.
    pub fn grid_config(&self) -> GridConfig {
        GridConfig {
            singularity_policy: self.linearization.singularity_policy,
            ..GridConfig::default()
        }
    }
}

/// A nominal value: fixed, or the initial value of a named timeseries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum NominalSource {
    Fixed(f64),
    Timeseries(String),
}

/// Nominal overrides for one branch. Absent entries keep the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NominalLevels {
    #[serde(
        rename = "H_nominal",
        alias = "H_b_up",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub h_nominal: Option<NominalSource>,
    #[serde(
        rename = "H_nominal_down",
        alias = "H_b_down",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub h_nominal_down: Option<NominalSource>,
    #[serde(rename = "Q_nominal", default, skip_serializing_if = "Option::is_none")]
    pub q_nominal: Option<NominalSource>,
}

impl NominalLevels {
    /// Present overrides with the store parameter name each one replaces.
    pub fn overrides(&self) -> impl Iterator<Item = (&'static str, &NominalSource)> {
        [
            ("H_nominal", self.h_nominal.as_ref()),
            ("H_nominal_down", self.h_nominal_down.as_ref()),
            ("Q_nominal", self.q_nominal.as_ref()),
        ]
        .into_iter()
        .filter_map(|(name, source)| source.map(|s| (name, s)))
    }
}

/// Lookup of the value a timeseries holds at the start of the run.
pub trait TimeseriesSource {
    fn initial_value(&self, name: &str) -> Option<f64>;
}

impl TimeseriesSource for BTreeMap<String, Vec<f64>> {
    fn initial_value(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|values| values.first().copied())
    }
}

impl TimeseriesSource for HashMap<String, Vec<f64>> {
    fn initial_value(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|values| values.first().copied())
    }
}

/// Parameters together with the timeseries their nominals may refer to.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ParameterFile {
    #[serde(default)]
    pub parameters: ParameterStore,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub timeseries: BTreeMap<String, Vec<f64>>,
}
