use std::sync::Arc;

use progress_core::{attempt_score, resolve_iframe_score};
use services::{AppServices, Clock, ProgressApiConfig, ProgressSource, StaticProgressSource};
use tracing_subscriber::EnvFilter;

mod args;

use args::{Args, ArgsError, Command, print_usage};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json(value: &impl serde::Serialize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn api_config(parsed: &Args) -> Result<ProgressApiConfig, Box<dyn std::error::Error>> {
    let config = match parsed.api_url.as_deref() {
        Some(url) => ProgressApiConfig::new(url, std::env::var("PROGRESS_API_TOKEN").ok())?,
        None => ProgressApiConfig::from_env()?.ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "no progress source: pass --file, --api or set PROGRESS_API_BASE_URL",
            )
        })?,
    };
    Ok(config)
}

/// `--file` wins over `--api`, which wins over the environment.
async fn build_services(
    cmd: Command,
    parsed: &Args,
) -> Result<AppServices, Box<dyn std::error::Error>> {
    let clock = Clock::default();

    // Forgetting never reads a tree, so it needs no source.
    if cmd == Command::Forget {
        let source: Arc<dyn ProgressSource> = Arc::new(StaticProgressSource::new());
        return Ok(AppServices::new_sqlite(&parsed.db_url, clock, source).await?);
    }

    if let Some(path) = parsed.file.as_deref() {
        tracing::debug!(path = %path.display(), "serving progress from file");
        let source: Arc<dyn ProgressSource> = Arc::new(StaticProgressSource::from_file(path)?);
        return Ok(AppServices::new_sqlite(&parsed.db_url, clock, source).await?);
    }

    Ok(AppServices::new_http(&parsed.db_url, clock, api_config(parsed)?).await?)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let cmd = match argv.next() {
        None => {
            print_usage();
            return Err(ArgsError::MissingFlag { flag: "<subcommand>" }.into());
        }
        Some(first) if first == "--help" || first == "-h" => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(&first).ok_or_else(|| {
            print_usage();
            ArgsError::UnknownCommand(first.clone())
        })?,
    };

    let parsed = Args::parse(&mut argv, |key| std::env::var(key).ok()).map_err(|e| {
        print_usage();
        e
    })?;

    if cmd == Command::Score {
        let scored = attempt_score(parsed.kind()?, parsed.max_score, parsed.iframe_score);
        return print_json(&scored);
    }
    if cmd == Command::IframeScore {
        return print_json(&resolve_iframe_score(parsed.iframe_score, parsed.max_score));
    }

    let learner = parsed.learner()?.clone();

    // Open + migrate SQLite here so core/services stay free of file-system concerns.
    prepare_sqlite_file(&parsed.db_url)?;

    let services = build_services(cmd, &parsed).await?;
    let progress = services.progress();

    match cmd {
        Command::Report => print_json(&progress.load_report(&learner).await?),
        Command::Resume => print_json(&progress.resume_point(&learner).await?),
        Command::View => {
            let record = progress.record_view(&learner, parsed.subconcept()?).await?;
            print_json(&serde_json::json!({
                "learnerId": record.learner_id,
                "subconceptId": record.subconcept_id,
                "viewedAt": record.viewed_at.to_rfc3339(),
            }))
        }
        Command::Rank => print_json(&progress.dashboard(&parsed.learners, parsed.rank_by).await?),
        Command::Forget => {
            progress.forget_view(&learner).await?;
            tracing::info!(%learner, "forgot last viewed subconcept");
            Ok(())
        }
        Command::Score | Command::IframeScore => Ok(()),
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
