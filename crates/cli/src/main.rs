//! NBCLM CLI - Naive Bayes cloud mask

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::Array2;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use nbclm_algorithms::classifier::{Angle, Channel, Scene};
use nbclm_algorithms::evaluation::{category_shift, contingency, SkillScores};
use nbclm_algorithms::fusion::{FusionConfig, FusionEngine};
use nbclm_algorithms::prelude::ProcessingMode;
use nbclm_core::io::{read_geotiff, read_masked_geotiff, write_category_geotiff, write_geotiff};
use nbclm_core::surface::{derive_surface_type, validate_surface_codes};
use nbclm_core::table::load_table;
use nbclm_core::{Month, Raster, SurfaceType, TableSource, TableStore};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "nbclm")]
#[command(author, version, about = "Naive Bayes cloud mask for geostationary imagery", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a scene directory into a cloud mask
    Classify {
        /// Directory with the scene GeoTIFFs (<channel>.tif, <angle>.tif, surface_type.tif, ...)
        scene_dir: PathBuf,
        /// Output category GeoTIFF
        output: PathBuf,
        /// Directory with trained tables (<table_id>_M<MM>.json)
        #[arg(short, long)]
        tables: PathBuf,
        /// Acquisition month (1-12)
        #[arg(short, long)]
        month: u8,
        /// Fusion configuration (JSON); defaults to the operational set
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Worker threads (1 = sequential)
        #[arg(long)]
        threads: Option<usize>,
        /// Sensor fill value of the observation bands
        #[arg(long)]
        fill_value: Option<f64>,
        /// Also write the fused probability (32-bit float GeoTIFF)
        #[arg(long)]
        probability: Option<PathBuf>,
    },
    /// Compare a cloud mask against a reference mask
    Evaluate {
        /// Reference category GeoTIFF
        reference: PathBuf,
        /// Predicted category GeoTIFF
        predicted: PathBuf,
        /// Restrict the comparison to surface type > 0
        #[arg(long)]
        surface_type: Option<PathBuf>,
        /// Write the per-pixel category shift to this GeoTIFF
        #[arg(long)]
        shift: Option<PathBuf>,
    },
    /// Show bin ranges and priors of a table
    TableInfo {
        /// Table file (JSON)
        table: PathBuf,
    },
    /// Derive the surface type grid from navigation masks
    SurfaceType {
        /// Land mask GeoTIFF
        land: PathBuf,
        /// Snow mask GeoTIFF
        snow: PathBuf,
        /// Desert mask GeoTIFF
        desert: PathBuf,
        /// Latitude GeoTIFF (degrees)
        latitude: PathBuf,
        /// Output surface type GeoTIFF
        output: PathBuf,
        /// Space mask GeoTIFF (non-zero = space)
        #[arg(long)]
        space: Option<PathBuf>,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_u8(path: &Path) -> Result<Raster<u8>> {
    read_geotiff(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_flag(path: &Path) -> Result<Array2<bool>> {
    Ok(read_u8(path)?.data().mapv(|v| v != 0))
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

/// Build a scene from conventionally named files; absent optional files are skipped
fn load_scene(dir: &Path, fill_value: Option<f64>) -> Result<Scene> {
    let pb = spinner("Reading scene...");
    let sft = read_u8(&dir.join("surface_type.tif"))?;
    validate_surface_codes(&sft, sft.grid_shape()).context("Invalid surface_type.tif")?;
    info!("Scene: {} x {}", sft.cols(), sft.rows());
    let mut scene = Scene::new(sft);

    for channel in Channel::ALL {
        let path = dir.join(format!("{}.tif", channel.name()));
        if path.is_file() {
            let band = read_masked_geotiff(&path, fill_value)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            scene = scene.with_band(channel, band)?;
        } else {
            debug!("No {} in scene", channel);
        }
    }
    for angle in Angle::ALL {
        let path = dir.join(format!("{}.tif", angle.name()));
        if path.is_file() {
            let values: Raster<f64> = read_geotiff(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            scene = scene.with_angle(angle, values)?;
        }
    }

    let elevation = dir.join("elevation.tif");
    if elevation.is_file() {
        let values: Raster<f64> = read_geotiff(&elevation).context("Failed to read elevation")?;
        scene = scene.with_elevation(values)?;
    }
    let coastal = dir.join("coastal.tif");
    if coastal.is_file() {
        scene = scene.with_coastal(read_flag(&coastal)?)?;
    }
    let snow = dir.join("snow.tif");
    if snow.is_file() {
        scene = scene.with_snow(read_flag(&snow)?)?;
    }
    let space = dir.join("space.tif");
    if space.is_file() {
        scene = scene.with_space(read_flag(&space)?)?;
    }

    pb.finish_and_clear();
    Ok(scene)
}

fn load_config(path: Option<&Path>) -> Result<FusionConfig> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&text).context("Invalid fusion configuration")
        }
        None => Ok(FusionConfig::default()),
    }
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Classify {
            scene_dir,
            output,
            tables,
            month,
            config,
            threads,
            fill_value,
            probability,
        } => {
            let month = Month::new(month)?;
            let mut config = load_config(config.as_deref())?;
            if threads.is_some() {
                config.mode = ProcessingMode::from_threads(threads);
            }

            let pb = spinner("Loading tables...");
            let source = TableSource::new(tables);
            let store = TableStore::load(&source, month, config.table_ids())
                .context("Failed to load tables")?;
            let engine = FusionEngine::new(&config, &store)?;
            pb.finish_and_clear();

            let scene = load_scene(&scene_dir, fill_value)?;

            if config.mode != ProcessingMode::Sequential {
                debug!("{} worker threads available", nbclm_parallel::num_cpus());
            }
            let pb = spinner("Classifying...");
            let start = Instant::now();
            let result = engine.classify(&scene).context("Classification failed")?;
            let elapsed = start.elapsed();
            pb.finish_and_clear();

            for (category, n) in result.category_counts() {
                info!("{:>16}: {}", category.name(), n);
            }
            if let Some(mean) = result.probability.statistics().mean {
                info!("Mean cloud probability: {:.3}", mean);
            }

            write_category_geotiff(&result.category, &output).context("Failed to write output")?;
            if let Some(path) = probability {
                write_geotiff(&result.probability, &path, None)
                    .context("Failed to write probability")?;
            }
            done("Cloud mask", &output, elapsed);
        }

        Commands::Evaluate {
            reference,
            predicted,
            surface_type,
            shift,
        } => {
            let reference = read_u8(&reference)?;
            let predicted = read_u8(&predicted)?;
            let domain = match surface_type {
                Some(path) => Some(read_u8(&path)?.data().mapv(|s| s != SurfaceType::Space.code())),
                None => None,
            };

            let table = contingency(&reference, &predicted, domain.as_ref())?;
            let scores = SkillScores::from_contingency(&table);

            println!("Contingency (reference x predicted):");
            println!("  cloudy/cloudy (a): {}", table.a);
            println!("  clear/cloudy  (b): {}", table.b);
            println!("  cloudy/clear  (c): {}", table.c);
            println!("  clear/clear   (d): {}", table.d);
            println!("Skill scores:");
            println!("  POD cloudy: {:.4}", scores.pod_cloudy);
            println!("  POD clear:  {:.4}", scores.pod_clear);
            println!("  FAR cloudy: {:.4}", scores.far_cloudy);
            println!("  FAR clear:  {:.4}", scores.far_clear);
            println!("  Hit rate:   {:.4}", scores.hit_rate);
            println!("  KSS:        {:.4}", scores.kss);

            if let Some(path) = shift {
                let shift = category_shift(&reference, &predicted)?;
                write_category_geotiff(&shift, &path).context("Failed to write shift")?;
                println!("Category shift saved to: {}", path.display());
            }
        }

        Commands::TableInfo { table } => {
            let table = load_table(&table)
                .with_context(|| format!("Failed to read {}", table.display()))?;
            println!("Table: {}", table.name());
            println!(
                "  {:<14} {:>10} {:>10} {:>8} {:>7} {:>10} {:>10}",
                "surface", "start", "end", "delta", "prior", "min ratio", "max ratio"
            );
            for (sft, row) in SurfaceType::CLASSIFIED.iter().zip(table.rows()) {
                let min = row.class_cond_ratio.iter().cloned().fold(f64::INFINITY, f64::min);
                let max = row.class_cond_ratio.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                println!(
                    "  {:<14} {:>10.3} {:>10.3} {:>8.4} {:>7.3} {:>10.4} {:>10.4}",
                    sft.name(),
                    row.bin_start,
                    row.bin_end,
                    row.delta_bin,
                    row.prior_yes,
                    min,
                    max
                );
            }
        }

        Commands::SurfaceType {
            land,
            snow,
            desert,
            latitude,
            output,
            space,
        } => {
            let pb = spinner("Reading navigation masks...");
            let land = read_u8(&land)?;
            let snow = read_u8(&snow)?;
            let desert = read_u8(&desert)?;
            let latitude: Raster<f64> = read_geotiff(&latitude).context("Failed to read latitude")?;
            let space = space.as_deref().map(read_flag).transpose()?;
            pb.finish_and_clear();

            let start = Instant::now();
            let sft = derive_surface_type(&land, &snow, &desert, &latitude, space.as_ref())?;
            let elapsed = start.elapsed();
            write_category_geotiff(&sft, &output).context("Failed to write output")?;
            done("Surface type", &output, elapsed);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_scene_reads_optional_inputs() {
        let dir = tempdir().unwrap();
        let sft = Raster::from_vec(vec![0u8, 1, 3, 7], 2, 2).unwrap();
        write_category_geotiff(&sft, dir.path().join("surface_type.tif")).unwrap();
        let bt = Raster::from_vec(vec![-999.0, 280.0, 281.0, 282.0], 2, 2).unwrap();
        write_geotiff(&bt, dir.path().join("bt_1080.tif"), None).unwrap();

        let scene = load_scene(dir.path(), Some(-999.0)).unwrap();
        assert_eq!(scene.surface_type().get(1, 1).unwrap(), 7);
        let band = scene.band(Channel::Bt1080).unwrap();
        assert!(!band.is_observed(0, 0));
        assert_eq!(band.get(0, 1), Some(280.0));
        assert!(scene.band(Channel::Bt850).is_err());
    }

    #[test]
    fn test_load_scene_rejects_unknown_surface_codes() {
        let dir = tempdir().unwrap();
        let sft = Raster::from_vec(vec![1u8, 9, 3, 3], 2, 2).unwrap();
        write_category_geotiff(&sft, dir.path().join("surface_type.tif")).unwrap();

        let err = load_scene(dir.path(), None).unwrap_err();
        assert!(format!("{:#}", err).contains("surface type codes"));
    }
}
