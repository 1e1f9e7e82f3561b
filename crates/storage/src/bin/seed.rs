use std::fmt;
use std::path::PathBuf;

use assess_core::model::{Assessment, AssessmentId, Question};
use serde::Deserialize;
use storage::repository::{AssessmentRepository, Storage};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    file: Option<PathBuf>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("ASSESS_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3?mode=rwc".into());
        let mut file = std::env::var("ASSESS_SEED_FILE").ok().map(PathBuf::from);

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--file" => {
                    file = Some(PathBuf::from(require_value(&mut args, "--file")?));
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, file })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:dev.sqlite3?mode=rwc)");
    eprintln!("  --file <path>             JSON array of assessments (default: built-in sample)");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  ASSESS_DB_URL, ASSESS_SEED_FILE");
}

/// Authoring shape of the seed file.
#[derive(Debug, Deserialize)]
struct SeedAssessment {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    questions: Vec<SeedQuestion>,
}

#[derive(Debug, Deserialize)]
struct SeedQuestion {
    question: String,
    options: Vec<String>,
    answer: String,
}

impl SeedAssessment {
    fn into_assessment(self) -> Result<Assessment, assess_core::Error> {
        let questions = self
            .questions
            .into_iter()
            .map(|q| Question::new(q.question, q.options, q.answer))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Assessment::new(
            AssessmentId::new(self.id)?,
            self.title,
            self.description,
            questions,
        ))
    }
}

const SAMPLE: &str = r#"[
  {
    "id": "a1",
    "title": "General Knowledge",
    "description": "A two-question warm-up.",
    "questions": [
      { "question": "2+2?", "options": ["3", "4"], "answer": "4" },
      { "question": "Capital of France?", "options": ["Paris", "Lyon"], "answer": "Paris" }
    ]
  }
]"#;

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let raw = match &args.file {
        Some(path) => std::fs::read_to_string(path)?,
        None => SAMPLE.to_string(),
    };
    let seeds: Vec<SeedAssessment> = serde_json::from_str(&raw)?;

    let storage = Storage::sqlite(&args.db_url).await?;

    let mut seeded = 0_usize;
    for seed in seeds {
        let assessment = seed.into_assessment()?;
        for (index, question) in assessment.questions().iter().enumerate() {
            if !question.has_valid_key() {
                tracing::warn!(
                    assessment_id = %assessment.id(),
                    index,
                    "answer key is not one of the options; question can never be scored"
                );
            }
        }
        storage.assessments.upsert_assessment(&assessment).await?;
        tracing::info!(
            assessment_id = %assessment.id(),
            questions = assessment.question_count(),
            "seeded assessment"
        );
        seeded += 1;
    }

    println!("Seeded {seeded} assessment(s) into {}", args.db_url);

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
