use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use uom::si::time::hour;

use cf_core::units::{m, m3ps};
use cf_hydraulics::{
    ChannelReach, CrossSection, GridConfig, LinearSvReach, LinearizationConfig, derive_idz,
    linearize_grid,
};
use cf_params::{
    BlockKind, ChannelFlowSettings, ParamError, ParamResult, ParameterFile, is_yaml_path,
};

#[derive(Parser)]
#[command(name = "cf-cli")]
#[command(about = "ChannelFlow CLI - linearized open-channel model parameters", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set LinearisedSV and IDZ parameters for the branches in a settings file
    Apply {
        /// Settings file (YAML or JSON)
        settings_path: PathBuf,
        /// Parameter file with parameters and timeseries (YAML or JSON)
        parameters_path: PathBuf,
        /// Output file (JSON, or YAML for .yaml/.yml); defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the IDZ coefficients of a single reach
    Idz {
        #[arg(long)]
        length: f64,
        /// Upstream bed level
        #[arg(long)]
        h_b_up: f64,
        /// Downstream bed level
        #[arg(long)]
        h_b_down: f64,
        #[arg(long)]
        discharge: f64,
        /// Bottom width
        #[arg(long)]
        width: f64,
        #[arg(long, default_value_t = 0.0)]
        side_slope: f64,
        /// Nominal downstream depth
        #[arg(long)]
        depth: f64,
        /// Manning coefficient
        #[arg(long)]
        friction: f64,
        /// Circular conduit radius; replaces width and side slope
        #[arg(long)]
        radius: Option<f64>,
        /// Return raw values at singular points instead of failing
        #[arg(long)]
        permissive: bool,
    },
    /// Print the LinearSV grid arrays of a rectangular reach
    LinearSv {
        #[arg(long)]
        nodes: usize,
        #[arg(long)]
        length: f64,
        #[arg(long)]
        h_b_up: f64,
        #[arg(long)]
        h_b_down: f64,
        #[arg(long)]
        discharge: f64,
        #[arg(long)]
        width: f64,
        /// Nominal upstream depth
        #[arg(long)]
        depth: f64,
        /// Nominal downstream depth
        #[arg(long)]
        depth_down: f64,
        /// Manning coefficient
        #[arg(long)]
        friction: f64,
    },
}

fn main() -> ParamResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            settings_path,
            parameters_path,
            output,
        } => cmd_apply(&settings_path, &parameters_path, output.as_deref()),
        Commands::Idz {
            length,
            h_b_up,
            h_b_down,
            discharge,
            width,
            side_slope,
            depth,
            friction,
            radius,
            permissive,
        } => {
            let section = match radius {
                Some(r) => CrossSection::circular(m(r)),
                None => CrossSection::trapezoidal(m(width), side_slope),
            };
            let reach = ChannelReach {
                length: m(length),
                bed_level_up: m(h_b_up),
                bed_level_down: m(h_b_down),
                discharge: m3ps(discharge),
                friction_coefficient: friction,
                section,
                reference_depth: m(depth),
            };
            let config = if permissive {
                LinearizationConfig::permissive()
            } else {
                LinearizationConfig::default()
            };
            cmd_idz(&reach, &config)
        }
        Commands::LinearSv {
            nodes,
            length,
            h_b_up,
            h_b_down,
            discharge,
            width,
            depth,
            depth_down,
            friction,
        } => cmd_linear_sv(&LinearSvReach {
            n_level_nodes: nodes,
            length: m(length),
            h_b_up: m(h_b_up),
            h_b_down: m(h_b_down),
            q_nominal: m3ps(discharge),
            width: m(width),
            y_nominal: m(depth),
            y_nominal_down: m(depth_down),
            friction_coefficient: friction,
        }),
    }
}

fn cmd_apply(settings_path: &Path, parameters_path: &Path, output: Option<&Path>) -> ParamResult<()> {
    let settings = if is_yaml_path(settings_path) {
        ChannelFlowSettings::load_yaml(settings_path)?
    } else {
        ChannelFlowSettings::load_json(settings_path)?
    };
    let mut file = if is_yaml_path(parameters_path) {
        cf_params::load_yaml(parameters_path)?
    } else {
        cf_params::load_json(parameters_path)?
    };

    cf_params::parameters(&settings, &mut file.parameters, &file.timeseries)?;

    match output {
        Some(path) => {
            if is_yaml_path(path) {
                cf_params::save_yaml(path, &file)?;
            } else {
                cf_params::save_json(path, &file)?;
            }
            eprintln!("✓ Parameters written to {}", path.display());
        }
        None => print_parameters(&file)?,
    }
    Ok(())
}

fn print_parameters(file: &ParameterFile) -> ParamResult<()> {
    println!("{}", serde_json::to_string_pretty(&file.parameters)?);
    Ok(())
}

fn cmd_idz(reach: &ChannelReach, config: &LinearizationConfig) -> ParamResult<()> {
    let idz = derive_idz(reach, config).map_err(|source| ParamError::Derivation {
        channel: "<command line>".to_string(),
        block: BlockKind::Idz,
        source,
    })?;

    println!("IDZ coefficients:");
    println!("  normal depth yn  = {:.6} m", idz.yn);
    println!("  mid-region x2    = {:.3} m", idz.x2);
    println!("  p11 = {:e}", idz.p11);
    println!("  p12 = {:e}", idz.p12);
    println!("  p21 = {:e}", idz.p21);
    println!("  p22 = {:e}", idz.p22);
    println!("  Au  = {:.3} m²", idz.au);
    println!("  Ad  = {:.3} m²", idz.ad);
    println!("  tu  = {:.3} s", idz.tu);
    println!("  td  = {:.3} s", idz.td);
    println!(
        "  mean delay = {:.3} s ({:.3} h)",
        idz.mean_delay(),
        idz.delay().get::<hour>()
    );
    Ok(())
}

fn cmd_linear_sv(reach: &LinearSvReach) -> ParamResult<()> {
    let grid = linearize_grid(reach, &GridConfig::default()).map_err(|source| {
        ParamError::Derivation {
            channel: "<command line>".to_string(),
            block: BlockKind::LinearisedSv,
            source,
        }
    })?;

    println!("LinearSV grid ({} level nodes):", grid.n_level_nodes());
    for (name, values) in [
        ("T0", &grid.t0),
        ("V0", &grid.v0),
        ("Delta", &grid.delta),
        ("Gamma", &grid.gamma),
        ("C0", &grid.c0),
    ] {
        let joined: Vec<String> = values.iter().map(|v| format!("{v:.6e}")).collect();
        println!("  {:<5} [{}]", name, joined.join(", "));
    }
    Ok(())
}
