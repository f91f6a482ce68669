use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use yt_transcript_harvester::config::{load_dotenv, split_list, Config};
use yt_transcript_harvester::Harvester;

fn cli() -> Command {
    Command::new("YouTube Transcript Harvester")
        .version(env!("CARGO_PKG_VERSION"))
        .author("TigreRoll")
        .about("Download the transcripts of every video of one or more YouTube channels")
        .arg(
            Arg::new("api-key")
                .short('k')
                .long("api-key")
                .value_name("KEY")
                .help("YouTube Data API key (or YOUTUBE_API_KEY, also read from .env)")
        )
        .arg(
            Arg::new("channels")
                .short('c')
                .long("channels")
                .value_name("NAME")
                .help("Channel names or ids, space or comma separated (or YOUTUBE_CHANNELS)")
                .num_args(1..)
                .action(ArgAction::Append)
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Base output directory [default: data]")
        )
        .arg(
            Arg::new("workers")
                .short('w')
                .long("workers")
                .value_name("NUM")
                .help("Maximum number of transcript fetches in flight")
                .value_parser(value_parser!(usize))
        )
        .arg(
            Arg::new("languages")
                .short('l')
                .long("languages")
                .value_name("CODES")
                .help("Preferred caption languages in priority order, comma separated [default: en]")
        )
        .arg(
            Arg::new("fallback-languages")
                .long("fallback-languages")
                .value_name("CODES")
                .help("Languages tried once when no preferred language exists, comma separated")
        )
        .arg(
            Arg::new("max-results")
                .long("max-results")
                .value_name("NUM")
                .help("Stop listing a channel after this many videos")
                .value_parser(value_parser!(usize))
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Path to a TOML configuration file")
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::SetTrue)
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    // Initialize logging; RUST_LOG takes precedence over --verbose
    let default_filter = if matches.get_flag("verbose") {
        "yt_transcript_harvester=debug,info"
    } else {
        "yt_transcript_harvester=info,warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    load_dotenv();

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => Config::load().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }),
    };

    if let Some(api_key) = matches.get_one::<String>("api-key") {
        config.api.api_key = Some(api_key.clone());
    }
    if let Some(channels) = matches.get_many::<String>("channels") {
        config.api.channels = channels.flat_map(|raw| split_list(raw)).collect();
    }
    if let Some(output_dir) = matches.get_one::<String>("output-dir") {
        config.output.base_dir = PathBuf::from(output_dir);
    }
    if let Some(workers) = matches.get_one::<usize>("workers") {
        config.performance.max_concurrent_fetches = *workers;
    }
    if let Some(languages) = matches.get_one::<String>("languages") {
        config.fetch.languages = split_list(languages);
    }
    if let Some(languages) = matches.get_one::<String>("fallback-languages") {
        config.fetch.fallback_languages = split_list(languages);
    }
    if let Some(max_results) = matches.get_one::<usize>("max-results") {
        config.api.max_results = *max_results;
    }

    info!("🚀 YouTube Transcript Harvester starting...");

    let harvester = Harvester::from_config(config.clone()).map_err(|e| {
        error!("❌ {}", e);
        e
    })?;

    for line in config.summary().lines() {
        info!("{}", line);
    }

    let report = harvester.run(&config.api.channels).await;

    info!("🎉 Harvest complete!");
    info!("📊 Channels harvested: {}", report.channels.len());
    info!("📹 Videos listed: {}", report.total_videos());
    info!("✅ Transcripts saved: {}", report.total_saved());
    info!("⏭️ Skipped: {}", report.total_skipped());
    info!("❌ Failed: {}", report.total_failed());
    if !report.unresolved.is_empty() {
        warn!("⚠️ Unresolved channels: {}", report.unresolved.join(", "));
    }
    for channel in report.channels.iter().filter(|c| c.error.is_some()) {
        warn!(
            "⚠️ Channel {} skipped: {}",
            channel.name,
            channel.error.as_deref().unwrap_or_default()
        );
    }
    info!("⏱️ Total time: {:.2}s", report.total_time.as_secs_f64());

    Ok(())
}
