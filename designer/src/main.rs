use anyhow::Context;
use clap::Parser;
use log::info;
use rfidcore::config::{ReaderEntry, SiteConfig};
use rfidcore::render::{EXPORT_DPI, EXPORT_FILE_NAME, LEGEND_CAPTION};
use std::path::{Path, PathBuf};
use workflow::config::DesignerConfig;
use workflow::runner::Runner;

mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Headless RFID coverage designer")]
struct Args {
    /// Load the site description from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Background floorplan image (overrides the config)
    #[arg(long)]
    floorplan: Option<PathBuf>,
    #[arg(long)]
    pixels_per_meter: Option<f64>,
    /// Reader override as ID=X,Y or ID=X,Y,RADIUS_M; repeatable
    #[arg(long = "reader", value_name = "ID=X,Y[,R]")]
    readers: Vec<ReaderEntry>,
    /// Save the composed view as custom_rfid_coverage.png
    #[arg(long, default_value_t = false)]
    export: bool,
    /// Write the color legend strip to this PNG
    #[arg(long)]
    legend: Option<PathBuf>,
    /// Write readers, coverage fractions and overlay geometry as JSON
    #[arg(long)]
    overlays_json: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let base = if let Some(path) = &args.config {
        DesignerConfig::load(path)?
    } else {
        DesignerConfig::from_site(SiteConfig::default())
    };
    let config = base
        .with_overrides(args.floorplan, args.pixels_per_meter, &args.readers)
        .context("applying command-line overrides")?;

    let runner = Runner::new(config);
    let mut result = runner.execute()?;

    let grid = result.session.grid();
    println!(
        "Coverage map {} ({}x{}) -> readers {}, contour lines {}, degraded {}",
        result.floorplan.path().display(),
        grid.width,
        grid.height,
        result.session.readers().len(),
        result.frame.overlays.contours.len(),
        result.frame.degraded
    );
    for entry in &result.coverage {
        println!(
            "  strength >= {:.2}: {:5.1}% of floorplan",
            entry.level,
            entry.fraction * 100.0
        );
    }
    for note in &result.frame.notes {
        println!("  note: {}", note);
    }

    if args.export {
        let path = Path::new(EXPORT_FILE_NAME);
        match runner.export(&mut result, path) {
            Ok(()) => println!("Saved as {} ({} DPI)", EXPORT_FILE_NAME, EXPORT_DPI),
            Err(err) => eprintln!("Save failed: {:#}", err),
        }
    }

    if let Some(path) = &args.legend {
        runner.write_legend(path)?;
        info!("Legend written to {}", path.display());
        println!("Legend: {}", LEGEND_CAPTION);
    }

    if let Some(path) = &args.overlays_json {
        runner.write_report(&result, path)?;
        info!("Coverage report written to {}", path.display());
    }

    Ok(())
}
