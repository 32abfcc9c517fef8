//! Diagnostic color-color diagram for a dropout selection run.
//!
//! Dropouts are drawn as filled circles and a sampled fraction of
//! non-dropouts as crosses, both colored by reference redshift.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use plotters::prelude::*;

use dropsim::{
    load_catalog, run_simulation_parallel, DegradationMode, DepthProfile, DiagnosticPoint,
    DropoutType, NoiseModel, PredicateSet, RunConfig,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Color-color diagram of a dropout selection run")]
struct Args {
    /// Input catalog CSV (columns u,g,r,i,z,redshift,in_area)
    #[arg(long)]
    catalog: PathBuf,

    /// Dropout type to select
    #[arg(long, default_value = "g")]
    dropout_type: DropoutType,

    /// Degradation mode
    #[arg(long, default_value = "degraded")]
    mode: DegradationMode,

    /// Random seed
    #[arg(long, default_value_t = 314)]
    seed: u64,

    /// Selection predicate set
    #[arg(long, default_value_t = PredicateSet::Standard)]
    predicates: PredicateSet,

    /// Apply the stricter fourth cut
    #[arg(long, default_value_t = false)]
    fourth_cut: bool,

    /// Fraction of non-dropouts to plot
    #[arg(long, default_value_t = 0.01)]
    sample_rate: f64,

    /// Output plot filename
    #[arg(long, default_value = "plots/color_diagram.png")]
    output: PathBuf,
}

/// Map a reference redshift onto a blue-to-red ramp over z in [0, 5].
fn redshift_color(redshift: Option<f64>) -> HSLColor {
    let t = redshift.map_or(0.0, |z| (z / 5.0).clamp(0.0, 1.0));
    HSLColor(0.7 * (1.0 - t), 0.8, 0.45)
}

fn create_plot(
    points: &[DiagnosticPoint],
    dropout: DropoutType,
    output: &PathBuf,
) -> anyhow::Result<()> {
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let ((red_lo, red_hi), (blue_lo, blue_hi)) = dropout.diagram_window();

    let root = BitMapBackend::new(output, (1200, 900)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{dropout}-dropout selection diagram"),
            ("sans-serif", 36),
        )
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(red_lo..red_hi, blue_lo..blue_hi)?;

    chart
        .configure_mesh()
        .x_desc(dropout.red_color().to_string())
        .y_desc(dropout.blue_color().to_string())
        .draw()?;

    chart.draw_series(
        points
            .iter()
            .filter(|p| !p.is_dropout)
            .map(|p| Cross::new((p.red, p.blue), 4, redshift_color(p.redshift).mix(0.4))),
    )?;

    chart.draw_series(points.iter().filter(|p| p.is_dropout).map(|p| {
        Circle::new(
            (p.red, p.blue),
            4,
            redshift_color(p.redshift).mix(0.8).filled(),
        )
    }))?;

    root.present()?;
    println!("Plot saved to {}", output.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rows = load_catalog(&args.catalog)
        .with_context(|| format!("reading catalog {}", args.catalog.display()))?;
    let rows: Vec<_> = rows.into_iter().filter(|row| row.in_area).collect();

    let depths = DepthProfile::degraded_survey();
    let noise = NoiseModel::default();
    let config = RunConfig {
        predicates: args.predicates,
        fourth_cut: args.fourth_cut,
        mode: args.mode,
        seed: args.seed,
        nondropout_sample_rate: args.sample_rate,
        collect_diagnostics: true,
        ..RunConfig::new(args.dropout_type)
    };

    let outcome = run_simulation_parallel(&rows, &depths, &noise, &config)?;
    println!(
        "{} diagnostic points ({} dropouts)",
        outcome.diagnostics.len(),
        outcome.statistics.dropouts
    );

    create_plot(&outcome.diagnostics, args.dropout_type, &args.output)
}
