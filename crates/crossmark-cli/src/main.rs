//! crossmark - match prediction markets listed on two venues

mod ledger;
mod logging;
mod sources;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use crossmark_core::{EmbeddingBackend, MarketRecord, MarketSource, MatchVerifier};
use crossmark_inference::{ExternalVerifier, JudgeConfig, OllamaEmbedder};
use crossmark_matcher::{MarketMatcher, MatcherConfig, Retriever};

use ledger::MatchLedger;
use sources::{JsonFileSource, VenueFormat};

/// Find markets on two venues that resolve on the same real-world event.
#[derive(Debug, Parser)]
#[command(name = "crossmark", version, about, long_about = None)]
struct Args {
    /// Markets of the first venue (JSON array)
    #[arg(long)]
    left: PathBuf,

    /// Markets of the second venue (JSON array)
    #[arg(long)]
    right: PathBuf,

    /// Payload format of --left
    #[arg(long, value_enum, default_value_t = VenueFormat::Polymarket)]
    left_venue: VenueFormat,

    /// Payload format of --right
    #[arg(long, value_enum, default_value_t = VenueFormat::Kalshi)]
    right_venue: VenueFormat,

    /// JSONL ledger of previously reported matches
    #[arg(long, env = "CROSSMARK_LEDGER")]
    ledger: Option<PathBuf>,

    /// Write the full run report as JSON
    #[arg(long)]
    output: Option<PathBuf>,

    /// Skip the external judge; ambiguous pairs use the lexical fallback
    #[arg(long)]
    no_judge: bool,

    /// Retrieve with Ollama embeddings instead of token overlap
    #[arg(long, env = "CROSSMARK_EMBEDDINGS")]
    embeddings: bool,

    /// Debug-level logging when RUST_LOG is unset
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let _log_guard = logging::init(args.verbose);

    let config = MatcherConfig::from_env();
    config
        .validate()
        .context("invalid matcher configuration")?;
    let mut ledger = open_ledger(args.ledger.as_deref())?;

    let left = load(JsonFileSource::new(&args.left, args.left_venue)).await?;
    let right = load(JsonFileSource::new(&args.right, args.right_venue)).await?;

    let verifier: Arc<dyn MatchVerifier> = if args.no_judge {
        info!("Judge disabled, ambiguous pairs use the lexical fallback");
        Arc::new(ExternalVerifier::disabled())
    } else {
        let judge = JudgeConfig::from_env();
        judge.validate().context("invalid judge configuration")?;
        Arc::new(ExternalVerifier::new(&judge).context("cannot build judge client")?)
    };

    let matcher = match embedding_backend(args.embeddings).await {
        Some(backend) => MarketMatcher::new(
            config,
            move || Retriever::embedding(Arc::clone(&backend)),
            verifier,
        ),
        None => MarketMatcher::lexical(config, verifier),
    };

    let report = matcher.find_matches_with_report(&left, &right).await;

    let mut new_count = 0;
    for decision in &report.decisions {
        let is_new = match ledger.as_mut() {
            Some(ledger) => ledger.record(report.run_id, decision).unwrap_or_else(|e| {
                warn!(error = %e, "Failed to record match in ledger");
                true
            }),
            None => true,
        };
        if !is_new {
            continue;
        }
        new_count += 1;
        println!(
            "{:.2}  [{}]  {} <-> {}",
            decision.confidence, decision.path, decision.left.event, decision.right.event
        );
        if !decision.left.url.is_empty() || !decision.right.url.is_empty() {
            println!("      {}  |  {}", decision.left.url, decision.right.url);
        }
    }

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("cannot write report {}", path.display()))?;
    }

    let stats = report.stats;
    info!(
        run_id = %report.run_id,
        match_count = stats.accepted,
        new_matches = new_count,
        blocked = stats.blocked,
        fast_lane = stats.fast_lane,
        saved_calls = stats.saved_calls,
        ledger_entries = ledger.as_ref().map(MatchLedger::len).unwrap_or(0),
        "Done"
    );
    Ok(())
}

/// Open the ledger before any judge call is spent.
fn open_ledger(path: Option<&Path>) -> anyhow::Result<Option<MatchLedger>> {
    path.map(|path| {
        MatchLedger::open(path).with_context(|| format!("cannot open ledger {}", path.display()))
    })
    .transpose()
}

async fn load(source: JsonFileSource) -> anyhow::Result<Vec<MarketRecord>> {
    source
        .fetch_markets()
        .await
        .with_context(|| format!("cannot load {} markets", source.name()))
}

/// Pick the retrieval backend once, before the run.
async fn embedding_backend(requested: bool) -> Option<Arc<dyn EmbeddingBackend>> {
    if !requested {
        return None;
    }
    let embedder = match OllamaEmbedder::from_env() {
        Ok(embedder) => embedder,
        Err(e) => {
            warn!(error = %e, "Embedding backend misconfigured, using lexical retrieval");
            return None;
        }
    };
    if !embedder.health_check().await {
        warn!(
            model = embedder.model_name(),
            "Embedding backend unreachable, using lexical retrieval"
        );
        return None;
    }
    info!(model = embedder.model_name(), "Using embedding retrieval");
    Some(Arc::new(embedder))
}
