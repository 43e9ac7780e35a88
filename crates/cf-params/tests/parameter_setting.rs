use std::collections::BTreeMap;

use cf_hydraulics::GridConfig;
use cf_params::*;

fn assert_rel(actual: f64, expected: f64, what: &str) {
    let rel = ((actual - expected) / expected).abs();
    assert!(rel < 1e-9, "{what}: got {actual}, expected {expected}");
}

fn base_store() -> ParameterStore {
    let mut store = ParameterStore::new();
    for (key, value) in [
        // LinearisedSV branch
        ("upper.n_level_nodes", 4.0),
        ("upper.length", 7_000.0),
        ("upper.H_b_up", 2.5),
        ("upper.H_b_down", 1.1),
        ("upper.Q_nominal", 15.0),
        ("upper.width", 12.0),
        ("upper.H_nominal", 2.0),
        ("upper.H_nominal_down", 2.3),
        ("upper.friction_coefficient", 0.02),
        // IDZ branch
        ("lower.length", 10_000.0),
        ("lower.H_b_up", 2.0),
        ("lower.H_b_down", 0.0),
        ("lower.Q_nominal", 100.0),
        ("lower.width", 30.0),
        ("lower.H_nominal", 3.0),
        ("lower.friction_coefficient", 0.02),
        ("lower.side_slope", 0.0),
    ] {
        store.insert(key, value);
    }
    store
}

fn settings() -> ChannelFlowSettings {
    ChannelFlowSettings {
        linearised_sv: true,
        linearised_sv_branches: Some(vec!["upper".to_string()]),
        idz: true,
        idz_branches: Some(vec!["lower".to_string()]),
        ..ChannelFlowSettings::default()
    }
}

fn no_series() -> BTreeMap<String, Vec<f64>> {
    BTreeMap::new()
}

#[test]
fn writes_both_blocks() {
    let mut store = base_store();
    parameters(&settings(), &mut store, &no_series()).unwrap();

    // LinearisedSV arrays, 1-based
    for i in 1..=4 {
        assert_eq!(store.get_f64(&format!("upper.T0[{i}]")).unwrap(), 12.0);
    }
    assert!(!store.contains("upper.T0[0]"));
    assert!(!store.contains("upper.T0[5]"));
    assert!(store.contains("upper.V0[7]") && !store.contains("upper.V0[8]"));
    assert!(store.contains("upper.C0[5]") && !store.contains("upper.C0[6]"));
    assert!(store.contains("upper.Delta[5]") && !store.contains("upper.Delta[6]"));
    assert!(store.contains("upper.Gamma[4]") && !store.contains("upper.Gamma[5]"));
    assert_rel(store.get_f64("upper.V0[1]").unwrap(), 0.5434782608695653, "V0[1]");
    assert_rel(store.get_f64("upper.C0[1]").unwrap(), 4.749241518390068, "C0[1]");
    assert_rel(store.get_f64("upper.Delta[5]").unwrap(), 0.002786121952085579, "Delta[5]");
    assert_rel(store.get_f64("upper.Gamma[1]").unwrap(), 0.020265062896346907, "Gamma[1]");

    // IDZ coefficients
    assert_rel(store.get_f64("lower.p11").unwrap(), 0.005865794310814712, "p11");
    assert_rel(store.get_f64("lower.p12").unwrap(), 0.0002529144868306821, "p12");
    assert_rel(store.get_f64("lower.p21").unwrap(), 0.001942631081299558, "p21");
    assert_rel(store.get_f64("lower.p22").unwrap(), 0.008889312219446341, "p22");
    assert_rel(store.get_f64("lower.Au").unwrap(), 1079496.5362363087, "Au");
    assert_rel(store.get_f64("lower.Ad").unwrap(), 140541.5135822202, "Ad");
    assert_rel(
        store.get_f64("lower.Delay_in_hour").unwrap(),
        (2484.744192187468 + 1556.8257704129128) / 2.0,
        "Delay_in_hour",
    );
}

#[test]
fn missing_key_names_key_and_channel() {
    let mut store = base_store();
    let mut settings = settings();
    settings.linearised_sv = false;
    store = store
        .iter()
        .filter(|(k, _)| k.as_str() != "lower.side_slope")
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let err = parameters(&settings, &mut store, &no_series()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("lower.side_slope"), "{msg}");
    assert!(msg.contains("lower"), "{msg}");
    assert!(matches!(
        err,
        ParamError::MissingParameter { block: BlockKind::Idz, .. }
    ));
    assert!(!store.contains("lower.p11"));
}

#[test]
fn enabled_block_without_branches_fails() {
    let mut store = base_store();
    let settings = ChannelFlowSettings {
        linearised_sv: true,
        ..ChannelFlowSettings::default()
    };
    let err = parameters(&settings, &mut store, &no_series()).unwrap_err();
    assert!(matches!(
        err,
        ParamError::MissingBranches { block: BlockKind::LinearisedSv }
    ));
}

#[test]
fn dynamic_nominals_require_levels() {
    let mut store = base_store();
    let settings = ChannelFlowSettings {
        idz_use_dynamic_nominals: true,
        ..settings()
    };
    let err = parameters(&settings, &mut store, &no_series()).unwrap_err();
    assert!(matches!(
        err,
        ParamError::MissingNominalLevels { block: BlockKind::Idz }
    ));
}

#[test]
fn text_parameter_must_be_numeric() {
    let mut store = base_store();
    store.insert("upper.width", "twelve");
    let err = parameters(&settings(), &mut store, &no_series()).unwrap_err();
    assert!(matches!(err, ParamError::NonNumeric { ref key, .. } if key == "upper.width"));
}

#[test]
fn dynamic_nominal_from_timeseries_changes_coefficients() {
    let mut reference = base_store();
    parameters(&settings(), &mut reference, &no_series()).unwrap();

    let mut levels = BTreeMap::new();
    levels.insert(
        "lower".to_string(),
        NominalLevels {
            h_nominal: Some(NominalSource::Timeseries("lower_level".to_string())),
            q_nominal: Some(NominalSource::Fixed(80.0)),
            ..NominalLevels::default()
        },
    );
    let settings = ChannelFlowSettings {
        idz_use_dynamic_nominals: true,
        idz_nominal_levels: Some(levels),
        ..settings()
    };
    let mut series = BTreeMap::new();
    series.insert("lower_level".to_string(), vec![3.4, 3.1, 2.9]);

    let mut store = base_store();
    parameters(&settings, &mut store, &series).unwrap();

    assert_eq!(store.get_f64("lower.H_nominal").unwrap(), 3.4);
    assert_eq!(store.get_f64("lower.Q_nominal").unwrap(), 80.0);
    assert_ne!(
        store.get_f64("lower.p11").unwrap(),
        reference.get_f64("lower.p11").unwrap()
    );
    assert_ne!(
        store.get_f64("lower.Au").unwrap(),
        reference.get_f64("lower.Au").unwrap()
    );
    // LinearisedSV branch had no overrides
    assert_eq!(
        store.get_f64("upper.Gamma[2]").unwrap(),
        reference.get_f64("upper.Gamma[2]").unwrap()
    );
}

#[test]
fn dynamic_nominal_with_unknown_timeseries_fails() {
    let mut levels = BTreeMap::new();
    levels.insert(
        "upper".to_string(),
        NominalLevels {
            h_nominal_down: Some(NominalSource::Timeseries("nope".to_string())),
            ..NominalLevels::default()
        },
    );
    let settings = ChannelFlowSettings {
        linearised_sv_use_dynamic_nominals: true,
        linearised_sv_nominal_levels: Some(levels),
        ..settings()
    };
    let mut store = base_store();
    let err = parameters(&settings, &mut store, &no_series()).unwrap_err();
    assert!(matches!(
        err,
        ParamError::UnknownTimeseries { ref name, ref channel } if name == "nope" && channel == "upper"
    ));
}

#[test]
fn circular_idz_branch() {
    let mut store = base_store();
    for (key, value) in [
        ("lower.length", 2_000.0),
        ("lower.H_b_up", 1.0),
        ("lower.Q_nominal", 2.0),
        ("lower.H_nominal", 1.2),
        ("lower.friction_coefficient", 0.013),
        ("lower.radius", 1.5),
    ] {
        store.insert(key, value);
    }
    let settings = ChannelFlowSettings {
        linearised_sv: false,
        ..settings()
    };
    parameters(&settings, &mut store, &no_series()).unwrap();
    let p11 = store.get_f64("lower.p11").unwrap();
    assert!(p11.is_finite() && p11 > 0.0);
}

#[test]
fn parameter_file_roundtrip_and_apply() {
    let yaml = r#"
parameters:
  lower.length: 10000
  lower.H_b_up: 2.0
  lower.H_b_down: 0.0
  lower.Q_nominal: 100
  lower.width: 30
  lower.H_nominal: "3.0"
  lower.friction_coefficient: 0.02
  lower.side_slope: 0
timeseries:
  q_series: [100.0, 110.0]
"#;
    let dir = std::env::temp_dir();
    let in_path = dir.join("cf_params_roundtrip_in.yaml");
    let out_path = dir.join("cf_params_roundtrip_out.json");
    std::fs::write(&in_path, yaml).unwrap();

    let mut file = load_yaml(&in_path).unwrap();
    assert_eq!(file.timeseries.initial_value("q_series"), Some(100.0));

    let settings = ChannelFlowSettings {
        idz: true,
        idz_branches: Some(vec!["lower".to_string()]),
        ..ChannelFlowSettings::default()
    };
    parameters(&settings, &mut file.parameters, &file.timeseries).unwrap();
    assert_rel(file.parameters.get_f64("lower.p22").unwrap(), 0.008889312219446341, "p22");

    save_json(&out_path, &file).unwrap();
    let loaded = load_json(&out_path).unwrap();
    assert_eq!(loaded, file);
    assert!(is_yaml_path(&in_path) && !is_yaml_path(&out_path));
}

fn with_second_linear_sv_branch(mut store: ParameterStore) -> ParameterStore {
    let upper: Vec<(String, ParameterValue)> = store
        .iter()
        .filter(|(k, _)| k.starts_with("upper."))
        .map(|(k, v)| (k.replacen("upper.", "side.", 1), v.clone()))
        .collect();
    for (key, value) in upper {
        store.insert(key, value);
    }
    store
}

fn two_branches() -> Vec<String> {
    vec!["upper".to_string(), "side".to_string()]
}

#[test]
fn unresolved_nominal_leaves_every_branch_untouched() {
    let mut store = with_second_linear_sv_branch(base_store());
    let config = GridConfig::default();
    set_linear_sv_parameters(&mut store, &two_branches(), &config).unwrap();
    let before = store.clone();

    let mut levels = BTreeMap::new();
    levels.insert(
        "upper".to_string(),
        NominalLevels {
            h_nominal: Some(NominalSource::Fixed(3.0)),
            ..NominalLevels::default()
        },
    );
    levels.insert(
        "side".to_string(),
        NominalLevels {
            h_nominal: Some(NominalSource::Timeseries("missing".to_string())),
            ..NominalLevels::default()
        },
    );

    let err = set_linear_sv_dynamic_nominal(&mut store, &two_branches(), &levels, &no_series(), &config)
        .unwrap_err();
    assert!(matches!(
        err,
        ParamError::UnknownTimeseries { ref channel, .. } if channel == "side"
    ));
    assert_eq!(store, before);
}

#[test]
fn failed_derivation_keeps_nominals_and_coefficients_together() {
    let mut store = with_second_linear_sv_branch(base_store());
    let config = GridConfig::default();
    set_linear_sv_parameters(&mut store, &two_branches(), &config).unwrap();
    let old_side_c0 = store.get_f64("side.C0[5]").unwrap();

    let mut levels = BTreeMap::new();
    levels.insert(
        "upper".to_string(),
        NominalLevels {
            h_nominal: Some(NominalSource::Fixed(3.0)),
            ..NominalLevels::default()
        },
    );
    levels.insert(
        "side".to_string(),
        NominalLevels {
            h_nominal: Some(NominalSource::Fixed(-1.0)),
            ..NominalLevels::default()
        },
    );

    let err = set_linear_sv_dynamic_nominal(&mut store, &two_branches(), &levels, &no_series(), &config)
        .unwrap_err();
    assert!(matches!(
        err,
        ParamError::Derivation { ref channel, block: BlockKind::LinearisedSv, .. } if channel == "side"
    ));

    // upper: new nominal and coefficients derived from it
    assert_eq!(store.get_f64("upper.H_nominal").unwrap(), 3.0);
    assert_rel(
        store.get_f64("upper.C0[5]").unwrap(),
        (config.gravity * 3.0).sqrt(),
        "upper C0[5]",
    );
    // side: neither nominal nor coefficients written
    assert_eq!(store.get_f64("side.H_nominal").unwrap(), 2.0);
    assert_eq!(store.get_f64("side.C0[5]").unwrap(), old_side_c0);
}
