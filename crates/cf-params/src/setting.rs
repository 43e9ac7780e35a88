//! Parameter setting for LinearisedSV and IDZ branches.
//!
//! Each operation first derives every listed branch from an immutable view of
//! the store (in parallel), then writes the results back one branch at a time
//! in list order. A branch whose derivation fails is never written; branches
//! listed before it are. Dynamic nominals are resolved for all branches before
//! anything is derived, and derived from a staged copy of the store.

use std::collections::BTreeMap;

use cf_core::units::{m, m3ps};
use cf_hydraulics::{
    ChannelReach, CrossSection, GridConfig, GridLinearization, IdzParameters, LinearSvReach,
    LinearizationConfig, derive_idz, linearize_grid,
};
use rayon::prelude::*;

use crate::inform::inform_once;
use crate::schema::{ChannelFlowSettings, NominalLevels, NominalSource, TimeseriesSource};
use crate::store::{ParameterStore, channel_key};
use crate::{BlockKind, ParamError, ParamResult};

const LINEAR_SV_REQUIRED: &[&str] = &[
    "n_level_nodes",
    "length",
    "H_b_up",
    "H_b_down",
    "Q_nominal",
    "width",
    "H_nominal",
    "H_nominal_down",
    "friction_coefficient",
];

const IDZ_REQUIRED: &[&str] = &[
    "length",
    "H_b_up",
    "H_b_down",
    "Q_nominal",
    "width",
    "H_nominal",
    "friction_coefficient",
    "side_slope",
];

/// Set the parameters of every enabled block in `settings`.
pub fn parameters(
    settings: &ChannelFlowSettings,
    store: &mut ParameterStore,
    timeseries: &dyn TimeseriesSource,
) -> ParamResult<()> {
    if settings.linearised_sv {
        let block = BlockKind::LinearisedSv;
        let branches = settings
            .linearised_sv_branches
            .as_deref()
            .ok_or(ParamError::MissingBranches { block })?;
        let config = settings.grid_config();
        set_linear_sv_parameters(store, branches, &config)?;
        if settings.linearised_sv_use_dynamic_nominals {
            let levels = settings
                .linearised_sv_nominal_levels
                .as_ref()
                .ok_or(ParamError::MissingNominalLevels { block })?;
            set_linear_sv_dynamic_nominal(store, branches, levels, timeseries, &config)?;
        }
    }

    if settings.idz {
        let block = BlockKind::Idz;
        let branches = settings
            .idz_branches
            .as_deref()
            .ok_or(ParamError::MissingBranches { block })?;
        set_idz_parameters(store, branches, &settings.linearization)?;
        if settings.idz_use_dynamic_nominals {
            let levels = settings
                .idz_nominal_levels
                .as_ref()
                .ok_or(ParamError::MissingNominalLevels { block })?;
            set_idz_dynamic_nominal(store, branches, levels, timeseries, &settings.linearization)?;
        }
    }

    Ok(())
}

/// Writes `T0, V0, Delta, Gamma, C0` (1-based) for each LinearisedSV branch.
pub fn set_linear_sv_parameters(
    store: &mut ParameterStore,
    branches: &[String],
    config: &GridConfig,
) -> ParamResult<()> {
    let derived = derive_linear_sv(store, branches, config);
    for (channel, grid) in branches.iter().zip(derived) {
        write_linear_sv(store, channel, &grid?);
    }
    Ok(())
}

/// Writes `p11, p12, p21, p22, Au, Ad, Delay_in_hour` for each IDZ branch.
///
/// A `radius` parameter on the branch selects a circular section; `width` and
/// `side_slope` are still required but then unused.
pub fn set_idz_parameters(
    store: &mut ParameterStore,
    branches: &[String],
    config: &LinearizationConfig,
) -> ParamResult<()> {
    let derived = derive_idz_branches(store, branches, config);
    for (channel, idz) in branches.iter().zip(derived) {
        write_idz(store, channel, &idz?);
    }
    Ok(())
}

/// Re-derive LinearisedSV branches around overridden nominals.
///
/// Only branches listed in both `branches` and `levels` are touched. A branch's
/// nominals are written together with its coefficients, never alone.
pub fn set_linear_sv_dynamic_nominal(
    store: &mut ParameterStore,
    branches: &[String],
    levels: &BTreeMap<String, NominalLevels>,
    timeseries: &dyn TimeseriesSource,
    config: &GridConfig,
) -> ParamResult<()> {
    let overrides =
        resolve_nominal_overrides(BlockKind::LinearisedSv, branches, levels, timeseries)?;
    let staged = staged_store(store, &overrides);
    let channels: Vec<String> = overrides.iter().map(|o| o.channel.clone()).collect();
    let derived = derive_linear_sv(&staged, &channels, config);

    for (nominals, grid) in overrides.iter().zip(derived) {
        let grid = grid?;
        nominals.write(store);
        write_linear_sv(store, &nominals.channel, &grid);
    }
    Ok(())
}

/// Re-derive IDZ branches around overridden nominals.
///
/// Only branches listed in both `branches` and `levels` are touched. A branch's
/// nominals are written together with its coefficients, never alone.
pub fn set_idz_dynamic_nominal(
    store: &mut ParameterStore,
    branches: &[String],
    levels: &BTreeMap<String, NominalLevels>,
    timeseries: &dyn TimeseriesSource,
    config: &LinearizationConfig,
) -> ParamResult<()> {
    let overrides = resolve_nominal_overrides(BlockKind::Idz, branches, levels, timeseries)?;
    let staged = staged_store(store, &overrides);
    let channels: Vec<String> = overrides.iter().map(|o| o.channel.clone()).collect();
    let derived = derive_idz_branches(&staged, &channels, config);

    for (nominals, idz) in overrides.iter().zip(derived) {
        let idz = idz?;
        nominals.write(store);
        write_idz(store, &nominals.channel, &idz);
    }
    Ok(())
}

fn derive_linear_sv(
    store: &ParameterStore,
    branches: &[String],
    config: &GridConfig,
) -> Vec<ParamResult<GridLinearization>> {
    branches
        .par_iter()
        .map(|channel| {
            let reach = linear_sv_reach(store, channel)?;
            linearize_grid(&reach, config).map_err(|source| ParamError::Derivation {
                channel: channel.clone(),
                block: BlockKind::LinearisedSv,
                source,
            })
        })
        .collect()
}

fn derive_idz_branches(
    store: &ParameterStore,
    branches: &[String],
    config: &LinearizationConfig,
) -> Vec<ParamResult<IdzParameters>> {
    branches
        .par_iter()
        .map(|channel| {
            let reach = idz_reach(store, channel)?;
            derive_idz(&reach, config).map_err(|source| ParamError::Derivation {
                channel: channel.clone(),
                block: BlockKind::Idz,
                source,
            })
        })
        .collect()
}

fn write_linear_sv(store: &mut ParameterStore, channel: &str, grid: &GridLinearization) {
    for (name, values) in [
        ("T0", &grid.t0),
        ("V0", &grid.v0),
        ("Delta", &grid.delta),
        ("Gamma", &grid.gamma),
        ("C0", &grid.c0),
    ] {
        store.set_indexed(channel, name, values);
    }
    tracing::debug!(
        channel = %channel,
        block = %BlockKind::LinearisedSv,
        nodes = grid.n_level_nodes(),
        "channel flow parameters set"
    );
}

fn write_idz(store: &mut ParameterStore, channel: &str, idz: &IdzParameters) {
    for (name, value) in [
        ("p11", idz.p11),
        ("p12", idz.p12),
        ("p21", idz.p21),
        ("p22", idz.p22),
        ("Au", idz.au),
        ("Ad", idz.ad),
        // Mean travel time in seconds, despite the block's parameter name.
        ("Delay_in_hour", idz.mean_delay()),
    ] {
        store.insert(channel_key(channel, name), value);
    }
    tracing::debug!(
        channel = %channel,
        block = %BlockKind::Idz,
        yn = idz.yn,
        x2 = idz.x2,
        "channel flow parameters set"
    );
}

/// Resolved nominal values of one overridden branch.
#[derive(Debug, Clone, PartialEq)]
struct BranchNominals {
    channel: String,
    values: Vec<(&'static str, f64)>,
}

impl BranchNominals {
    fn write(&self, store: &mut ParameterStore) {
        for &(name, value) in &self.values {
            store.insert(channel_key(&self.channel, name), value);
        }
    }
}

/// The store as the overridden branches will see it.
fn staged_store(store: &ParameterStore, overrides: &[BranchNominals]) -> ParameterStore {
    let mut staged = store.clone();
    for nominals in overrides {
        nominals.write(&mut staged);
    }
    staged
}

/// Resolves the nominals of every branch in both `branches` and `levels`, in
/// branch order. Fails on the first unknown timeseries without touching
/// anything.
fn resolve_nominal_overrides(
    block: BlockKind,
    branches: &[String],
    levels: &BTreeMap<String, NominalLevels>,
    timeseries: &dyn TimeseriesSource,
) -> ParamResult<Vec<BranchNominals>> {
    for channel in levels.keys() {
        if !branches.contains(channel) {
            inform_once(&format!(
                "Nominal levels given for {channel}, which is not a {block} branch; ignored"
            ));
        }
    }

    let mut overrides = Vec::new();
    for channel in branches {
        let Some(nominals) = levels.get(channel) else {
            continue;
        };

        let mut values = Vec::new();
        for (name, source) in nominals.overrides() {
            let value = match source {
                NominalSource::Fixed(v) => *v,
                NominalSource::Timeseries(series) => {
                    let value = timeseries.initial_value(series).ok_or_else(|| {
                        ParamError::UnknownTimeseries {
                            name: series.clone(),
                            channel: channel.clone(),
                        }
                    })?;
                    inform_once(&format!(
                        "{block} branch {channel}: {name} taken from the initial value of timeseries {series}"
                    ));
                    value
                }
            };
            values.push((name, value));
        }
        overrides.push(BranchNominals {
            channel: channel.clone(),
            values,
        });
    }
    Ok(overrides)
}

fn linear_sv_reach(store: &ParameterStore, channel: &str) -> ParamResult<LinearSvReach> {
    store.require(channel, BlockKind::LinearisedSv, LINEAR_SV_REQUIRED)?;
    let get = |name: &str| store.get_f64(&channel_key(channel, name));
    Ok(LinearSvReach {
        n_level_nodes: store.get_count(&channel_key(channel, "n_level_nodes"))?,
        length: m(get("length")?),
        h_b_up: m(get("H_b_up")?),
        h_b_down: m(get("H_b_down")?),
        q_nominal: m3ps(get("Q_nominal")?),
        width: m(get("width")?),
        y_nominal: m(get("H_nominal")?),
        y_nominal_down: m(get("H_nominal_down")?),
        friction_coefficient: get("friction_coefficient")?,
    })
}

fn idz_reach(store: &ParameterStore, channel: &str) -> ParamResult<ChannelReach> {
    store.require(channel, BlockKind::Idz, IDZ_REQUIRED)?;
    let get = |name: &str| store.get_f64(&channel_key(channel, name));
    let section = match store.try_f64(&channel_key(channel, "radius"))? {
        Some(radius) => CrossSection::circular(m(radius)),
        None => CrossSection::trapezoidal(m(get("width")?), get("side_slope")?),
    };
    Ok(ChannelReach {
        length: m(get("length")?),
        bed_level_up: m(get("H_b_up")?),
        bed_level_down: m(get("H_b_down")?),
        discharge: m3ps(get("Q_nominal")?),
        friction_coefficient: get("friction_coefficient")?,
        section,
        reference_depth: m(get("H_nominal")?),
    })
}
