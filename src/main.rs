//! WebHarvest CLI
//!
//! Drives one extraction session end to end: start the job, follow the
//! progress stream, and download the artifact on completion.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use webharvest::{
    ClientConfig, ExtractionClient, ProgressEvent, ScriptedSource, SessionStatus, SessionTracker,
    StageStatus,
};

/// WebHarvest extraction client
#[derive(Parser, Debug)]
#[command(name = "webharvest")]
#[command(version)]
#[command(about = "Run a web data extraction session and download the result")]
struct Args {
    /// URL of the site to extract from
    url: String,

    /// What to extract, in plain language
    #[arg(short, long)]
    requirements: String,

    /// Backend base URL
    #[arg(long, default_value = webharvest::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Where to write the artifact (defaults to the derived filename in
    /// the current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Replay a scripted demo session instead of contacting a backend
    #[arg(long)]
    simulate: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ClientConfig::new(&args.base_url)?;
    let client = if args.simulate {
        ExtractionClient::with_source(config, Arc::new(ScriptedSource::demo()))?
    } else {
        ExtractionClient::new(config)?
    };

    let session = if args.simulate {
        webharvest::SessionId::new(uuid::Uuid::new_v4().to_string())
    } else {
        client
            .start(&args.url, &args.requirements)
            .await
            .context("start request failed")?
    };
    println!("Session {session} started for {}", args.url);

    let mut subscription = client.subscribe(&session).await?;
    let mut tracker = SessionTracker::new();

    while let Some(item) = subscription.next_event().await {
        match item {
            Ok(event) => {
                tracker.apply(&event);
                render(&tracker, &event);
                if tracker.is_terminal() {
                    break;
                }
            }
            Err(e) => {
                subscription.close();
                anyhow::bail!("progress stream failed: {e}");
            }
        }
    }
    subscription.close();

    match tracker.status() {
        SessionStatus::Completed => {
            if let Some(result) = tracker.result() {
                println!(
                    "Extraction complete: {} records, {} fields, format {}",
                    result.records,
                    result.fields.map(|f| f.to_string()).unwrap_or_else(|| "?".to_string()),
                    result.format
                );
            }
            if args.simulate {
                println!("Simulated session; nothing to download");
                return Ok(());
            }
            let artifact = client.download(&session).await.context("download failed")?;
            let path = args
                .output
                .unwrap_or_else(|| PathBuf::from(&artifact.filename));
            tokio::fs::write(&path, &artifact.bytes)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Saved {} bytes to {}", artifact.bytes.len(), path.display());
        }
        SessionStatus::Failed => {
            anyhow::bail!(
                "extraction failed: {}",
                tracker.error().unwrap_or("unknown error")
            );
        }
        _ => anyhow::bail!("progress stream ended before a terminal state"),
    }

    Ok(())
}

fn render(tracker: &SessionTracker, event: &ProgressEvent) {
    if let ProgressEvent::Stage(_) = event {
        let line: Vec<String> = tracker
            .stages()
            .iter()
            .map(|s| {
                let mark = match s.status {
                    StageStatus::Pending => " ",
                    StageStatus::InProgress => ">",
                    StageStatus::Completed => "x",
                };
                format!("[{mark}] {} {:>3.0}%", s.kind.label(), s.progress)
            })
            .collect();
        println!(
            "{}  overall {:>3.0}%",
            line.join("  "),
            tracker.overall_progress()
        );
    }
}
