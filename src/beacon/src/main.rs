//! Beacon — replays a JSON-lines log of tracker calls through the normalizer
//! and prints what each collector would have received.
//!
//! ```text
//! {"op":"event","action":"play","options":{"label":"intro","value":3}}
//! {"op":"virtual_pageview","path":"/signup/step-2"}
//! {"op":"conversion_goal","action":"purchase","options":{"valueInCents":1999}}
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use beacon_core::config::{BackendKind, BeaconConfig};
use beacon_core::PageContext;
use beacon_web_sdk::sinks::{CaptureDispatcher, CaptureQueue};
use beacon_web_sdk::{Collectors, TrackCall, Tracker};
use clap::Parser;
use serde_json::json;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "beacon")]
#[command(about = "Normalize analytics calls and show what each collector receives")]
#[command(version)]
struct Cli {
    /// JSON-lines call log (default: stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Page URL; its host becomes the default event category
    #[arg(long, conflicts_with = "hostname")]
    page_url: Option<String>,

    /// Page host name (overrides config)
    #[arg(long, env = "BEACON__HOSTNAME")]
    hostname: Option<String>,

    /// Comma-separated backends in priority order: hit, legacy, goal
    #[arg(long, value_delimiter = ',')]
    backends: Option<Vec<BackendKind>>,

    /// Virtual pageview prefix (overrides config)
    #[arg(long, env = "BEACON__VIRTUAL_PREFIX")]
    virtual_prefix: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beacon=info,beacon_web_sdk=info".into()),
        )
        .with_writer(io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = BeaconConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        BeaconConfig::default()
    });

    if let Some(hostname) = cli.hostname {
        config.hostname = hostname;
    }
    if let Some(backends) = cli.backends {
        config.backends = backends;
    }
    if let Some(prefix) = cli.virtual_prefix {
        config.virtual_prefix = prefix;
    }

    let collectors = Collectors::new();
    let legacy = Arc::new(CaptureQueue::new());
    let dispatcher = Arc::new(CaptureDispatcher::new());
    let goals = Arc::new(CaptureQueue::new());
    collectors.legacy_queue.bind(legacy.clone());
    collectors.hit_dispatcher.bind(dispatcher.clone());
    collectors.goal_queue.bind(goals.clone());

    let mut tracker =
        Tracker::from_config(&config, &collectors).context("invalid tracker configuration")?;
    if let Some(ref page_url) = cli.page_url {
        tracker = tracker.with_context(PageContext::from_url(page_url)?);
    }

    info!(
        hostname = %tracker.context().hostname,
        backends = ?tracker.platforms(),
        virtual_prefix = %config.virtual_prefix,
        "Tracker ready"
    );

    let reader: Box<dyn BufRead> = match cli.input {
        Some(ref path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let (mut forwarded, mut dropped, mut malformed) = (0usize, 0usize, 0usize);
    for (index, line) in reader.lines().enumerate() {
        let line = line.context("reading call log")?;
        if line.trim().is_empty() {
            continue;
        }
        let call: TrackCall = match serde_json::from_str(&line) {
            Ok(call) => call,
            Err(e) => {
                warn!(line = index + 1, error = %e, "Skipping malformed call");
                malformed += 1;
                continue;
            }
        };
        match tracker.dispatch(&call) {
            Some(_) => forwarded += 1,
            None => dropped += 1,
        }
    }

    let hits: Vec<_> = dispatcher
        .hits()
        .into_iter()
        .map(|hit| json!({ "command": hit.command, "fields": hit.fields }))
        .collect();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for report in [
        json!({ "collector": "hit", "records": hits }),
        json!({ "collector": "legacy", "records": legacy.commands() }),
        json!({ "collector": "goal", "records": goals.commands() }),
    ] {
        writeln!(out, "{}", serde_json::to_string(&report)?)?;
    }

    info!(forwarded, dropped, malformed, "Replay complete");
    Ok(())
}
