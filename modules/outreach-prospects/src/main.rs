use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use outreach_common::{Config, DedupKey};
use outreach_prospects::{ProspectBuild, ProspectBuilder, ProspectOptions};
use outreach_records::{MemoryRecordStore, PipelineRun, RecordStore};

/// Build outreach prospects from already-fetched scrape dumps.
#[derive(Parser)]
#[command(name = "build-prospects")]
#[command(version)]
struct Cli {
    /// Apify facebook-pages-scraper dataset (JSON object or array)
    #[arg(long)]
    pages: Vec<PathBuf>,

    /// Graph API ads_archive response (JSON)
    #[arg(long)]
    ads: Vec<PathBuf>,

    /// User the records are filed under (overrides OUTREACH_USER_ID)
    #[arg(long)]
    user_id: Option<String>,

    /// `page_id` or `ad_library_id` (overrides PAGE_DEDUP_KEY)
    #[arg(long)]
    dedup_key: Option<DedupKey>,

    /// Print build statistics alongside the prospects
    #[arg(long)]
    stats: bool,
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

async fn load_and_build(
    run: &mut PipelineRun,
    cli: &Cli,
    config: &Config,
    store: Arc<dyn RecordStore>,
) -> Result<ProspectBuild> {
    for path in &cli.ads {
        let count = run.save_ads_response(read_json(path)?).await?;
        run.log_step(
            "ads_fetched",
            "success",
            &format!("Loaded {count} ads from {}", path.display()),
            None,
        )
        .await?;
    }

    for path in &cli.pages {
        match run.save_pages(read_json(path)?).await {
            Ok(count) => {
                run.record_success();
                info!(path = %path.display(), pages = count, "Pages loaded");
            }
            Err(e) => {
                run.record_failure();
                run.log_step(
                    "page_load_error",
                    "failed",
                    &format!("Could not load pages from {}", path.display()),
                    Some(serde_json::json!({"error": e.to_string()})),
                )
                .await?;
            }
        }
    }

    let build = ProspectBuilder::new(store)
        .with_options(ProspectOptions::from(config))
        .build_with_stats(&config.user_id)
        .await?;

    run.log_step(
        "prospects_built",
        "success",
        &format!("Built {} valid prospects", build.prospects.len()),
        Some(serde_json::to_value(&build.stats)?),
    )
    .await?;
    Ok(build)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("outreach=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(user_id) = cli.user_id.clone() {
        config.user_id = user_id;
    }
    if let Some(dedup_key) = cli.dedup_key {
        config.dedup_key = dedup_key;
    }
    config.log_redacted();

    let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
    let mut run = PipelineRun::start(store.clone(), config.user_id.as_str()).await?;

    let build = match load_and_build(&mut run, &cli, &config, store).await {
        Ok(build) => build,
        Err(e) => {
            run.finish(Some(&format!("{e:#}"))).await?;
            return Err(e);
        }
    };
    run.finish(None).await?;

    let output = if cli.stats {
        serde_json::json!({ "stats": build.stats, "prospects": build.prospects })
    } else {
        serde_json::to_value(&build.prospects)?
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
