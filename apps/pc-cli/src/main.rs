mod table;

use clap::{Parser, Subcommand};
use pc_core::BinSet;
use pc_curve::{InterpolationMode, PowerCurve, PowerQuery};
use serde::Serialize;
use std::path::{Path, PathBuf};
use table::{CliResult, load_yaml};

#[derive(Parser)]
#[command(name = "pc-cli")]
#[command(about = "Wind turbine power curves and turbulence correction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the centers and limits of a bin set
    Bins {
        /// Center of the first bin (m/s)
        #[arg(long)]
        first: f64,
        /// Bin width (m/s)
        #[arg(long)]
        width: f64,
        /// Center of the last bin (m/s)
        #[arg(long, conflicts_with = "count", required_unless_present = "count")]
        last: Option<f64>,
        /// Number of bins
        #[arg(long)]
        count: Option<usize>,
    },
    /// Evaluate the power curve at one wind speed
    Evaluate {
        /// Path to the sample table YAML file
        table_path: PathBuf,
        /// Wind speed (m/s)
        #[arg(long)]
        wind_speed: f64,
        /// Turbulence intensity; enables the zero-turbulence correction
        #[arg(long)]
        turbulence: Option<f64>,
        /// Interpolation mode, overriding the table (e.g. "Linear", "Marmander (Cubic Spline)")
        #[arg(long)]
        mode: Option<InterpolationMode>,
    },
    /// Derive the zero-turbulence curve of a sample table
    ZeroTi {
        /// Path to the sample table YAML file
        table_path: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Bins {
            first,
            width,
            last,
            count,
        } => cmd_bins(first, width, last, count),
        Commands::Evaluate {
            table_path,
            wind_speed,
            turbulence,
            mode,
        } => cmd_evaluate(&table_path, wind_speed, turbulence, mode),
        Commands::ZeroTi { table_path, json } => cmd_zero_ti(&table_path, json),
    }
}

fn cmd_bins(first: f64, width: f64, last: Option<f64>, count: Option<usize>) -> CliResult<()> {
    let bins = BinSet::new(first, width, last, count)?;
    println!("{} bins of width {}", bins.number_of_bins(), bins.bin_width());
    println!("{:>5} {:>10} {:>10} {:>10}", "index", "center", "start", "end");
    for (i, limits) in bins.limits().iter().enumerate() {
        println!(
            "{:>5} {:>10.3} {:>10.3} {:>10.3}",
            i,
            bins.bin_center_by_index(i),
            limits.start,
            limits.end
        );
    }
    Ok(())
}

fn cmd_evaluate(
    table_path: &Path,
    wind_speed: f64,
    turbulence: Option<f64>,
    mode: Option<InterpolationMode>,
) -> CliResult<()> {
    let table = load_yaml(table_path)?;
    let mut config = table.config(mode)?;
    if turbulence.is_some() {
        config = config.with_zero_ti();
    }
    let curve = PowerCurve::new(table.samples, config)?;
    for warning in curve.warnings() {
        println!("warning: {warning}");
    }

    let mut query = PowerQuery::new(wind_speed);
    if let Some(ti) = turbulence {
        query = query.with_turbulence(ti);
    }
    let power = curve.power(query)?;

    match turbulence {
        Some(ti) => println!(
            "{} at {wind_speed} m/s, TI {ti}: {power:.3} kW",
            curve.interpolation_mode()
        ),
        None => println!("{} at {wind_speed} m/s: {power:.3} kW", curve.interpolation_mode()),
    }
    Ok(())
}

#[derive(Serialize)]
struct ZeroTiReport {
    rated_power_kw: f64,
    rated_wind_speed: f64,
    cut_in_wind_speed: f64,
    iterations: usize,
    points: Vec<ZeroTiPoint>,
}

#[derive(Serialize)]
struct ZeroTiPoint {
    wind_speed: f64,
    reference_power: f64,
    zero_ti_power: f64,
}

fn cmd_zero_ti(table_path: &Path, json: bool) -> CliResult<()> {
    let table = load_yaml(table_path)?;
    let config = table.config(None)?.with_zero_ti();
    let curve = PowerCurve::new(table.samples, config)?;
    let Some(zero_ti) = curve.zero_ti_curve() else {
        return Err(pc_curve::CurveError::ZeroTiNotReady.into());
    };

    let report = ZeroTiReport {
        rated_power_kw: zero_ti.rated_power(),
        rated_wind_speed: zero_ti.rated_wind_speed(),
        cut_in_wind_speed: zero_ti.cut_in_wind_speed(),
        iterations: zero_ti.iterations(),
        points: curve
            .samples()
            .samples()
            .iter()
            .zip(zero_ti.powers())
            .map(|(s, &p)| ZeroTiPoint {
                wind_speed: s.wind_speed,
                reference_power: s.power,
                zero_ti_power: p,
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Zero-turbulence curve ({} iterations)", report.iterations);
    println!("  Rated power:      {:.1} kW", report.rated_power_kw);
    println!("  Rated wind speed: {:.2} m/s", report.rated_wind_speed);
    println!("  Cut-in:           {:.2} m/s", report.cut_in_wind_speed);
    println!();
    println!("{:>8} {:>12} {:>12}", "v [m/s]", "ref [kW]", "zero-TI [kW]");
    for point in &report.points {
        println!(
            "{:>8.2} {:>12.1} {:>12.1}",
            point.wind_speed, point.reference_power, point.zero_ti_power
        );
    }
    for warning in curve.warnings() {
        println!("warning: {warning}");
    }
    Ok(())
}
