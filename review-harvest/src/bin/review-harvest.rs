//! Command-line entry point: harvests one listing and prints the records as JSON.

use anyhow::{bail, Context};
use review_harvest::{try_harvest, HarvestConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: review-harvest [--config <file.json>] [--json-logs] <listing-url | search terms>";

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    json_logs: bool,
    input: Vec<String>,
}

fn parse_args(raw: impl IntoIterator<Item = String>) -> anyhow::Result<Option<Args>> {
    let mut args = Args::default();
    let mut iter = raw.into_iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--json-logs" => args.json_logs = true,
            "--config" => {
                let path = iter.next().context("--config requires a path")?;
                args.config = Some(PathBuf::from(path));
            }
            flag if flag.starts_with("--") => bail!("unknown flag: {flag}"),
            _ => args.input.push(arg),
        }
    }

    if args.input.is_empty() {
        bail!("missing input\n{USAGE}");
    }
    Ok(Some(args))
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(args) = parse_args(std::env::args().skip(1))? else {
        println!("{USAGE}");
        return Ok(());
    };
    init_tracing(args.json_logs);

    let config = match &args.config {
        Some(path) => HarvestConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => HarvestConfig::default(),
    };

    let input = args.input.join(" ");
    let report = try_harvest(config, &input).await?;

    println!("{}", serde_json::to_string_pretty(&report.records)?);
    Ok(())
}
