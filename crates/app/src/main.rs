use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use assess_core::model::{AssessmentId, UserId};
use services::{
    AssessmentServices, AssessmentSession, Clock, LoadError, LocalIdentity, ServiceConfig,
    SubmitError,
};
use storage::repository::Storage;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingAssessment,
    UnknownArg(String),
    InvalidAssessmentId { raw: String },
    InvalidUserId { raw: String },
    InvalidDbUrl { raw: String },
    InvalidTimeout { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingAssessment => write!(f, "take requires an assessment id"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidAssessmentId { raw } => write!(f, "invalid assessment id: {raw:?}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid --user value: {raw:?}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidTimeout { raw } => write!(f, "invalid --timeout-secs value: {raw}"),
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

/// Whole seconds; zero is rejected.
fn parse_timeout(raw: String) -> Result<Duration, ArgsError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ArgsError::InvalidTimeout { raw }),
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- take <assessment-id> [--db <sqlite_url>] [--user <id>] [--timeout-secs <n>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:dev.sqlite3?mode=rwc");
    eprintln!("  --timeout-secs 10");
    eprintln!("  no --user: answers can be given, submitting asks you to log in");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ASSESS_DB_URL, ASSESS_USER_ID, ASSESS_TIMEOUT_SECS, RUST_LOG");
}

struct Args {
    db_url: String,
    assessment_id: AssessmentId,
    user_id: Option<UserId>,
    timeout: Duration,
}

impl Args {
    fn parse_take(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("ASSESS_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3?mode=rwc".into());
        let mut user_id = std::env::var("ASSESS_USER_ID")
            .ok()
            .and_then(|value| UserId::new(value).ok());
        let mut timeout = match std::env::var("ASSESS_TIMEOUT_SECS") {
            Ok(value) => parse_timeout(value)?,
            Err(_) => ServiceConfig::DEFAULT_TIMEOUT,
        };
        let mut assessment_id = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--user" => {
                    let value = require_value(args, "--user")?;
                    user_id = Some(
                        UserId::new(value.clone())
                            .map_err(|_| ArgsError::InvalidUserId { raw: value })?,
                    );
                }
                "--timeout-secs" => {
                    timeout = parse_timeout(require_value(args, "--timeout-secs")?)?;
                }
                _ if arg.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ if assessment_id.is_none() => {
                    assessment_id = Some(
                        AssessmentId::new(arg.clone())
                            .map_err(|_| ArgsError::InvalidAssessmentId { raw: arg })?,
                    );
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            assessment_id: assessment_id.ok_or(ArgsError::MissingAssessment)?,
            user_id,
            timeout,
        })
    }
}

type Input = Lines<BufReader<Stdin>>;

async fn prompt(input: &mut Input, text: &str) -> Result<Option<String>, std::io::Error> {
    println!("{text}");
    input.next_line().await
}

fn print_assessment(session: &AssessmentSession) {
    let assessment = session.assessment();
    println!("{}", assessment.title());
    if !assessment.description().is_empty() {
        println!("{}", assessment.description());
    }
    for (index, question) in assessment.questions().iter().enumerate() {
        println!();
        println!("{}. {}", index + 1, question.prompt());
        for (opt_index, option) in question.options().iter().enumerate() {
            let marker = if session.current().selected(index) == Some(option.as_str()) {
                "*"
            } else {
                " "
            };
            println!("   {marker} {}) {option}", opt_index + 1);
        }
    }
}

fn print_progress(session: &AssessmentSession) {
    let progress = session.progress();
    println!(
        "Answered {} of {} ({} left).",
        progress.answered, progress.total, progress.unanswered
    );
}

/// Applies a 1-based `(question, option)` pair typed by the user.
fn apply_choice(session: &mut AssessmentSession, question: usize, option: usize) -> bool {
    let Some(text) = question
        .checked_sub(1)
        .and_then(|q| session.assessment().question(q))
        .and_then(|q| option.checked_sub(1).and_then(|o| q.options().get(o)))
        .cloned()
    else {
        println!("No such question/option.");
        return false;
    };
    session.select(question - 1, text).is_ok()
}

async fn answer_all(session: &mut AssessmentSession, input: &mut Input) -> Result<(), std::io::Error> {
    for index in 0..session.assessment().question_count() {
        loop {
            let text = format!("Answer for question {} (option number, blank to skip):", index + 1);
            let Some(line) = prompt(input, &text).await? else {
                return Ok(());
            };
            let line = line.trim();
            if line.is_empty() {
                break;
            }
            match line.parse::<usize>() {
                Ok(option) => {
                    if apply_choice(session, index + 1, option) {
                        break;
                    }
                }
                Err(_) => println!("Enter one of the listed option numbers."),
            }
        }
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let args = match args.next().as_deref() {
        Some("take") => Args::parse_take(&mut args),
        Some("--help" | "-h") | None => {
            print_usage();
            return Ok(());
        }
        Some(other) => Err(ArgsError::UnknownArg(other.to_string())),
    }
    .map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let identity = Arc::new(match args.user_id {
        Some(user) => LocalIdentity::signed_in(user),
        None => LocalIdentity::anonymous(),
    });
    let config = ServiceConfig::uniform(args.timeout);
    let storage = Storage::sqlite(&args.db_url).await?;
    let services =
        AssessmentServices::new(&storage, Arc::<LocalIdentity>::clone(&identity), Clock::system(), &config);

    tracing::debug!(assessment_id = %args.assessment_id, db = %args.db_url, "starting session");
    let mut session = match services.loader().start_session(&args.assessment_id).await {
        Ok(session) => session,
        Err(LoadError::NotFound(_)) => {
            println!("Assessment not found.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    print_assessment(&session);
    println!();
    answer_all(&mut session, &mut input).await?;
    print_progress(&session);

    let submissions = services.submissions();
    loop {
        let Some(line) = prompt(
            &mut input,
            "Type `submit`, `show`, `login <user>`, or `<question> <option>` to change an answer:",
        )
        .await?
        else {
            println!("Leaving without submitting.");
            return Ok(());
        };

        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            ["submit"] => match submissions.submit_session(&mut session).await {
                Ok(receipt) => {
                    println!("Test submitted! You scored {}", receipt.score);
                    return Ok(());
                }
                Err(SubmitError::Unauthenticated) => {
                    println!("Please log in to submit your answers.");
                }
                Err(e) => println!("Error submitting answers: {e}. Your answers are kept; try again."),
            },
            ["show"] => {
                print_assessment(&session);
                print_progress(&session);
            }
            ["login", user] => match UserId::new(*user) {
                Ok(user) => identity.sign_in(user),
                Err(e) => println!("{e}"),
            },
            [question, option] => match (question.parse::<usize>(), option.parse::<usize>()) {
                (Ok(q), Ok(o)) => {
                    apply_choice(&mut session, q, o);
                }
                _ => println!("Expected two numbers."),
            },
            _ => println!("Unrecognised input."),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
