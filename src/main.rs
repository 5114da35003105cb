use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};

use feedsmith::config::Config;
use feedsmith::feed::{FeedBuilder, FeedEntry, FeedType, RenderOptions};
use feedsmith::util::write_atomic;

/// Default config file (~/.config/feedsmith/config.toml), if HOME is set.
fn default_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("feedsmith")
            .join("config.toml"),
    )
}

#[derive(Parser, Debug)]
#[command(
    name = "feedsmith",
    about = "Render an RSS/Atom feed from a JSON array of entry records"
)]
struct Args {
    /// Feed dialect: rss_0.9, rss_0.93 or atom_0.3 (default from config)
    #[arg(long, value_name = "DIALECT")]
    dialect: Option<FeedType>,

    /// Feed title
    #[arg(long)]
    title: String,

    /// Feed link (absolute URL)
    #[arg(long)]
    link: String,

    /// Feed description
    #[arg(long, default_value = "")]
    description: String,

    /// JSON file with the entry records (reads stdin when omitted)
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Write the feed to this file atomically (writes stdout when omitted)
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Config file (default ~/.config/feedsmith/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Map entry records in parallel
    #[arg(long)]
    parallel: bool,

    /// Spaces per indentation level, 0 for single-line output
    #[arg(long, value_name = "N")]
    indent: Option<usize>,
}

fn read_records(input: Option<&Path>) -> Result<Vec<serde_json::Value>> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file '{}'", path.display()))?,
        None => std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")?,
    };
    serde_json::from_str(&raw).context("Input must be a JSON array of entry records")
}

fn entry_from_record(record: serde_json::Value) -> Result<FeedEntry, serde_json::Error> {
    serde_json::from_value(record)
}

fn main() -> Result<()> {
    // Logs go to stderr so the feed on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match args.config.clone().or_else(default_config_path) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => Config::default(),
    };

    let dialect = args.dialect.unwrap_or(config.dialect);
    let options = match args.indent {
        Some(indent) => RenderOptions { indent },
        None => config.render_options(),
    };
    let builder = FeedBuilder::with_options(options);

    let records = read_records(args.input.as_deref())?;
    tracing::info!(records = records.len(), dialect = %dialect, "Building feed");

    let feed = if args.parallel || config.parallel {
        builder.build_feed_parallel(
            dialect,
            &args.title,
            &args.link,
            &args.description,
            records,
            entry_from_record,
        )
    } else {
        builder.build_feed(
            dialect,
            &args.title,
            &args.link,
            &args.description,
            records,
            entry_from_record,
        )
    }
    .context("Failed to build feed")?;

    let xml = builder.render(&feed).context("Failed to render feed")?;

    match args.output {
        Some(path) => {
            write_atomic(&path, xml.as_bytes())?;
            tracing::info!(path = %path.display(), bytes = xml.len(), "Wrote feed");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(xml.as_bytes())
                .and_then(|_| stdout.write_all(b"\n"))
                .context("Failed to write feed to stdout")?;
        }
    }

    Ok(())
}
