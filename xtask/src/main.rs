use anyhow::Context;
use clap::{Parser, Subcommand};
use metricgate_types::{BaselineData, ConfigFile, MetricsSnapshot};
use metricgate_validation::{
    validate_baseline_data, validate_metrics_snapshot, validate_threshold_rule,
};
use schemars::schema_for;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "xtask", about = "Repo automation for metricgate")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// (Re)generate JSON Schemas for snapshots, baselines, reports, and config.
    Schema {
        /// Output directory
        #[arg(long, default_value = "schemas")]
        out_dir: PathBuf,
    },

    /// Parse and validate every JSON/TOML fixture under a directory.
    Fixtures {
        #[arg(long, default_value = "crates/metricgate-cli/tests/fixtures")]
        dir: PathBuf,
    },

    /// Run the "usual" repo checks (fmt, clippy, test, schema, fixtures).
    Ci,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Command::Schema { out_dir } => cmd_schema(&out_dir),
        Command::Fixtures { dir } => cmd_fixtures(&dir),
        Command::Ci => cmd_ci(),
    }
}

fn cmd_ci() -> anyhow::Result<()> {
    run("cargo", ["fmt", "--all", "--", "--check"])?;
    run(
        "cargo",
        ["clippy", "--all-targets", "--all-features", "--", "-D", "warnings"],
    )?;
    run("cargo", ["test", "--workspace"])?;
    run("cargo", ["run", "-p", "xtask", "--", "schema"])?;
    run("cargo", ["run", "-p", "xtask", "--", "fixtures"])?;
    Ok(())
}

fn run<const N: usize>(bin: &str, args: [&str; N]) -> anyhow::Result<()> {
    let status = std::process::Command::new(bin)
        .args(args)
        .status()
        .with_context(|| format!("running {bin}"))?;
    if !status.success() {
        anyhow::bail!("{bin} failed: {status}");
    }
    Ok(())
}

fn cmd_schema(out_dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(out_dir).with_context(|| format!("create dir {}", out_dir.display()))?;

    write_schema(
        out_dir,
        "metricgate.snapshot.v1.schema.json",
        schema_for!(metricgate_types::MetricsSnapshot),
    )?;
    write_schema(
        out_dir,
        "metricgate.baseline.v1.schema.json",
        schema_for!(metricgate_types::BaselineData),
    )?;
    write_schema(
        out_dir,
        "metricgate.report.v1.schema.json",
        schema_for!(metricgate_types::ComparisonReport),
    )?;
    write_schema(
        out_dir,
        "metricgate.trend.v1.schema.json",
        schema_for!(metricgate_types::TrendResult),
    )?;
    write_schema(
        out_dir,
        "metricgate.config.v1.schema.json",
        schema_for!(metricgate_types::ConfigFile),
    )?;

    Ok(())
}

fn write_schema<T: serde::Serialize>(out_dir: &Path, name: &str, schema: T) -> anyhow::Result<()> {
    let path = out_dir.join(name);
    let mut json = serde_json::to_vec_pretty(&schema)?;
    json.push(b'\n');
    fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Fixtures whose name starts with `invalid_` must fail validation.
fn cmd_fixtures(dir: &Path) -> anyhow::Result<()> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("read dir {}", dir.display()))?
        .map(|e| e.map(|e| e.path()))
        .collect::<Result<_, _>>()?;
    entries.sort();

    let mut checked = 0usize;
    for path in entries {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let expect_invalid = name.starts_with("invalid_");
        let text =
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;

        let outcome = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => check_json_fixture(&text),
            Some("toml") => check_toml_fixture(&text),
            _ => continue,
        };

        match (outcome, expect_invalid) {
            (Ok(()), false) | (Err(_), true) => checked += 1,
            (Ok(()), true) => anyhow::bail!("{name}: expected validation to fail"),
            (Err(err), false) => return Err(err.context(name)),
        }
    }

    println!("checked {checked} fixtures in {}", dir.display());
    Ok(())
}

fn check_json_fixture(text: &str) -> anyhow::Result<()> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if value.get("snapshot").is_some() {
        let baseline: BaselineData = serde_json::from_value(value)?;
        validate_baseline_data(&baseline)?;
    } else {
        let snapshot: MetricsSnapshot = serde_json::from_value(value)?;
        validate_metrics_snapshot(&snapshot)?;
    }
    Ok(())
}

fn check_toml_fixture(text: &str) -> anyhow::Result<()> {
    let config: ConfigFile = toml::from_str(text)?;
    for rule in &config.rules {
        validate_threshold_rule(rule)?;
    }
    Ok(())
}
