use std::fmt;
use std::path::PathBuf;

use progress_core::model::{LearnerId, SubconceptId};
use services::RankKey;

#[derive(Debug, PartialEq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidNumber { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
    InvalidId { flag: &'static str, raw: String },
    InvalidRankKey { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required for this command"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidId { flag, raw } => write!(f, "invalid {flag} value: {raw:?}"),
            ArgsError::InvalidRankKey { raw } => {
                write!(f, "invalid --by value (score|completion|attempts): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Report,
    Resume,
    View,
    Forget,
    Rank,
    Score,
    IframeScore,
}

impl Command {
    pub fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "report" => Some(Self::Report),
            "resume" => Some(Self::Resume),
            "view" => Some(Self::View),
            "forget" => Some(Self::Forget),
            "rank" => Some(Self::Rank),
            "score" => Some(Self::Score),
            "iframe-score" => Some(Self::IframeScore),
            _ => None,
        }
    }
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  progress report --learner <id> [--file <tree.json>] [--api <url>] [--db <sqlite_url>]");
    eprintln!("  progress resume --learner <id> [--file <tree.json>] [--api <url>] [--db <sqlite_url>]");
    eprintln!("  progress view   --learner <id> --subconcept <id> [source/db options]");
    eprintln!("  progress forget --learner <id> [--db <sqlite_url>]");
    eprintln!("  progress rank   --learner <id>... [--by score|completion|attempts] [source/db options]");
    eprintln!("  progress score  --type <content type> [--max <n>] [--iframe <n>]");
    eprintln!("  progress iframe-score [--iframe <n>] [--max <n>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://progress.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PROGRESS_DB_URL, PROGRESS_LEARNER_ID, PROGRESS_API_BASE_URL, PROGRESS_API_TOKEN, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub db_url: String,
    pub api_url: Option<String>,
    pub file: Option<PathBuf>,
    pub learners: Vec<LearnerId>,
    pub subconcept: Option<SubconceptId>,
    pub kind: Option<String>,
    pub max_score: Option<f64>,
    pub iframe_score: Option<f64>,
    pub rank_by: RankKey,
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number(flag: &'static str, raw: String) -> Result<f64, ArgsError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(ArgsError::InvalidNumber { flag, raw })
}

impl Args {
    /// Parses flags after the subcommand. Environment values fill in
    /// defaults; explicit flags win.
    pub fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = env("PROGRESS_DB_URL")
            .map_or_else(|| "sqlite://progress.sqlite3".into(), normalize_sqlite_url);
        let env_learner = env("PROGRESS_LEARNER_ID").and_then(|raw| raw.parse().ok());

        let mut parsed = Self {
            db_url: String::new(),
            api_url: None,
            file: None,
            learners: Vec::new(),
            subconcept: None,
            kind: None,
            max_score: None,
            iframe_score: None,
            rank_by: RankKey::default(),
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--api" => parsed.api_url = Some(require_value(args, "--api")?),
                "--file" => parsed.file = Some(PathBuf::from(require_value(args, "--file")?)),
                "--learner" => {
                    let value = require_value(args, "--learner")?;
                    let id = value.parse().map_err(|_| ArgsError::InvalidId {
                        flag: "--learner",
                        raw: value.clone(),
                    })?;
                    parsed.learners.push(id);
                }
                "--subconcept" => {
                    let value = require_value(args, "--subconcept")?;
                    let id = value.parse().map_err(|_| ArgsError::InvalidId {
                        flag: "--subconcept",
                        raw: value.clone(),
                    })?;
                    parsed.subconcept = Some(id);
                }
                "--type" => parsed.kind = Some(require_value(args, "--type")?),
                "--max" => {
                    parsed.max_score = Some(parse_number("--max", require_value(args, "--max")?)?);
                }
                "--iframe" => {
                    parsed.iframe_score =
                        Some(parse_number("--iframe", require_value(args, "--iframe")?)?);
                }
                "--by" => {
                    let value = require_value(args, "--by")?;
                    parsed.rank_by = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidRankKey { raw: value.clone() })?;
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        if parsed.learners.is_empty() {
            parsed.learners.extend(env_learner);
        }
        parsed.db_url = db_url;
        Ok(parsed)
    }

    pub fn learner(&self) -> Result<&LearnerId, ArgsError> {
        self.learners
            .first()
            .ok_or(ArgsError::MissingFlag { flag: "--learner" })
    }

    pub fn subconcept(&self) -> Result<&SubconceptId, ArgsError> {
        self.subconcept
            .as_ref()
            .ok_or(ArgsError::MissingFlag { flag: "--subconcept" })
    }

    pub fn kind(&self) -> Result<&str, ArgsError> {
        self.kind
            .as_deref()
            .ok_or(ArgsError::MissingFlag { flag: "--type" })
    }
}

pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}
