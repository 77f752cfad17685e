use anyhow::{bail, Context, Result};
use regionstat::{config::AnalysisConfig, explore, load::SourceCache, pipeline};
use std::{env, fs, path::PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

const USAGE: &str =
    "usage: regionstat <facility.csv> <population.csv> [--config cfg.yaml] [--out-dir DIR]";

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) parse args ───────────────────────────────────────────────
    let args: Vec<String> = env::args().skip(1).collect();
    let mut sources: Vec<PathBuf> = Vec::new();
    let mut config_path: Option<PathBuf> = None;
    let mut out_dir = PathBuf::from("out");

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                config_path = Some(args.get(i + 1).context("--config needs a path")?.into());
                i += 2;
            }
            "--out-dir" => {
                out_dir = args.get(i + 1).context("--out-dir needs a path")?.into();
                i += 2;
            }
            other => {
                sources.push(PathBuf::from(other));
                i += 1;
            }
        }
    }
    if sources.len() != 2 {
        bail!("{USAGE}");
    }
    let (facility_path, population_path) = (&sources[0], &sources[1]);

    // ─── 3) load config ──────────────────────────────────────────────
    let cfg = match &config_path {
        Some(path) => AnalysisConfig::from_yaml_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AnalysisConfig::default_hospital(),
    };

    // ─── 4) load sources through the session cache ───────────────────
    let mut cache = SourceCache::new();
    let facility = cache
        .get_or_load(facility_path)
        .with_context(|| format!("loading facility source {}", facility_path.display()))?;
    let population = cache
        .get_or_load(population_path)
        .with_context(|| format!("loading population source {}", population_path.display()))?;
    info!(
        facility_rows = facility.len(),
        population_rows = population.len(),
        "sources loaded"
    );
    if let Ok(types) = explore::value_counts(&facility, &cfg.facility.type_column) {
        info!(distinct_facility_types = types.len(), "facility registry profile");
    }

    // ─── 5) run the pipeline ─────────────────────────────────────────
    let report = pipeline::run(&facility, &population, &cfg)?;
    if report.diagnostics.unresolved_regions > 0 {
        warn!(
            unresolved = report.diagnostics.unresolved_regions,
            "some region labels could not be resolved"
        );
    }

    // ─── 6) write outputs ────────────────────────────────────────────
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    report.write_csv(&out_dir.join("regions.csv"))?;
    report.write_summary_json(&out_dir.join("summary.json"))?;

    info!(regions = report.rows.len(), "all done");
    Ok(())
}
