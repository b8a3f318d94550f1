//! epiglobe - epidemic dashboard data builder
//!
//! Aggregates uploaded case records (or a generated demo dataset), projects
//! a forecast from a daily history, and writes a Markdown or JSON report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad arguments, unreadable input, write failure, etc.)

use anyhow::{Context, Result};
use chrono::Utc;
use epiglobe::analysis;
use epiglobe::cli::{Args, OutputFormat};
use epiglobe::config::{Config, CONFIG_FILE_NAME};
use epiglobe::geo::globe_markers;
use epiglobe::ingest::{self, Loaded};
use epiglobe::models::{Report, ReportMetadata};
use epiglobe::report::{self, ReportOptions};
use epiglobe::synthetic;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    if let Err(e) = init_logging(&args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    info!("epiglobe v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        error!("Run failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Handle --init-config: generate a default configuration file.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        anyhow::bail!(
            "{} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the forecast horizon, seed, report tables and globe.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so a report written to stdout stays clean.
fn init_logging(args: &Args) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Run the complete build: load, aggregate, forecast, report.
fn run(args: Args) -> Result<()> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let seed = config.synthetic.seed;
    let mut rng = StdRng::seed_from_u64(seed);
    let horizon = config.forecast.horizon_days;
    let mut used_seed = false;

    // Step 1: daily history
    let (history, history_source) = match args.history {
        Some(ref path) => {
            let Loaded { items, skipped } = ingest::load_history(path, args.history_format)?;
            if skipped > 0 {
                warn!("Skipped {} unusable history rows", skipped);
            }
            (items, path.display().to_string())
        }
        None => {
            used_seed = true;
            let points = synthetic::synthetic_history(
                &mut rng,
                config.synthetic.start_date,
                config.synthetic.days,
            );
            info!(
                "Generated {} synthetic history days from {}",
                points.len(),
                config.synthetic.start_date
            );
            (points, "synthetic".to_string())
        }
    };

    // Step 2: country aggregates
    let (data, source, records_loaded, records_skipped) = match args.input {
        Some(ref path) => {
            let Loaded { items, skipped } = ingest::load_records(path, args.input_format)?;
            if items.is_empty() {
                warn!("No usable records in {}", path.display());
            }
            let data = analysis::process(&items, history, horizon);
            (data, path.display().to_string(), items.len(), skipped)
        }
        None => {
            used_seed = true;
            info!("No input given, using the demo dataset");
            let data = synthetic::mock_processed_data(&mut rng, history, horizon);
            (data, "demo dataset".to_string(), 0, 0)
        }
    };

    // Step 3: globe markers
    let markers = if config.report.include_markers {
        globe_markers(&data.countries, &config.globe)
    } else {
        Vec::new()
    };

    let report = Report {
        metadata: ReportMetadata {
            source,
            generated_at: Utc::now(),
            records_loaded,
            records_skipped,
            history_source,
            seed: used_seed.then_some(seed),
            horizon_days: horizon,
        },
        data,
        markers,
    };

    // Step 4: render and write
    let mut options = ReportOptions::from(&config.report);
    options.country = args.country.clone();

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report, &options),
    };

    if args.writes_to_stdout() {
        println!("{}", output);
        return Ok(());
    }

    let output_path = Path::new(&config.general.output);
    report::write_report(&output, output_path)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    print_summary(&report, start_time.elapsed().as_secs_f64(), output_path, args.quiet);
    Ok(())
}

fn print_summary(report: &Report, duration: f64, output_path: &Path, quiet: bool) {
    if quiet {
        return;
    }

    let global = &report.data.global;
    println!("\n📊 Summary:");
    println!("   Countries: {}", report.data.countries.len());
    println!(
        "   Cases: {} | Deaths: {} | Recovered: {}",
        global.total_cases, global.deaths, global.recovered
    );
    println!("   Vaccination rate: {:.1}%", global.vaccination_rate);
    println!(
        "   History days: {} | Forecast days: {}",
        report.data.time_series.len(),
        report.data.predictions.len()
    );
    println!("   Duration: {:.2}s", duration);
    println!("\n✅ Report saved to: {}", output_path.display());
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
