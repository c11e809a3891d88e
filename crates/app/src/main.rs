mod render;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use proficiency_core::StaticQuestionBank;
use proficiency_core::model::Choice;
use services::{
    Clock, GeminiClient, GeminiConfig, GeminiGenerator, GenerationPlan, SessionError, TestSession,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

#[derive(Debug, PartialEq, Eq)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDeadline { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDeadline { raw } => write!(f, "invalid --deadline value: {raw}"),
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--offline] [--translate] [--deadline <secs>]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --offline          use the built-in question set, no AI calls");
    eprintln!("  --translate        also show the report in Turkish");
    eprintln!("  --deadline <secs>  per-call limit for AI requests (default 45)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  GEMINI_API_KEY, PROFICIENCY_AI_BASE_URL, PROFICIENCY_AI_MODEL,");
    eprintln!("  PROFICIENCY_AI_TIMEOUT_SECS, RUST_LOG");
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    offline: bool,
    translate: bool,
    deadline: Option<Duration>,
    help: bool,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--offline" => parsed.offline = true,
                "--translate" => parsed.translate = true,
                "--deadline" => {
                    let value = require_value(&mut args, "--deadline")?;
                    let secs: u64 = value
                        .trim()
                        .parse()
                        .ok()
                        .filter(|secs| *secs > 0)
                        .ok_or_else(|| ArgsError::InvalidDeadline { raw: value.clone() })?;
                    parsed.deadline = Some(Duration::from_secs(secs));
                }
                "--help" | "-h" => parsed.help = true,
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        Ok(parsed)
    }
}

enum Input {
    Answer(Choice),
    Next,
    Previous,
    Finish,
    Quit,
    Unknown,
}

impl Input {
    fn parse(line: &str) -> Self {
        match line.trim() {
            "n" => Input::Next,
            "p" => Input::Previous,
            "f" => Input::Finish,
            "q" => Input::Quit,
            other => other
                .parse::<u8>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|n| Choice::new(n).ok())
                .map_or(Input::Unknown, Input::Answer),
        }
    }
}

async fn read_line(lines: &mut Lines<BufReader<Stdin>>) -> Result<Option<String>, std::io::Error> {
    lines.next_line().await
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    if args.help {
        print_usage();
        return Ok(());
    }

    let config = if args.offline {
        None
    } else {
        GeminiConfig::from_env()
    };
    if config.is_none() && !args.offline {
        warn!("GEMINI_API_KEY not set, running with the built-in question set");
    }
    let generator = Arc::new(GeminiGenerator::new(GeminiClient::new(config)));

    let mut plan = GenerationPlan::default();
    if let Some(deadline) = args.deadline {
        plan = plan.with_call_deadline(deadline);
    }

    // Only the embedded data can make startup fail.
    let bank = Arc::new(StaticQuestionBank::embedded()?);
    let mut session = TestSession::new(generator, bank, Clock::default()).with_plan(plan);

    println!("Preparing your English proficiency test...");
    session.generate_test().await?;
    let stats = session.statistics();
    println!(
        "{} questions ({} grammar, {} reading){}",
        stats.total,
        stats.grammar,
        stats.reading,
        if session.is_offline() {
            " · offline demo"
        } else {
            ""
        }
    );
    render::print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let Some(question) = session.current_question() else {
            return Err(SessionError::NoCurrentQuestion.into());
        };
        render::print_question(&session, question);

        let Some(line) = read_line(&mut lines).await? else {
            info!("input closed, leaving test");
            return Ok(());
        };
        match Input::parse(&line) {
            Input::Answer(choice) => {
                session.answer_question(choice)?;
                if !session.next_question() && session.is_complete() {
                    println!("All questions answered. Type f to finish.");
                }
            }
            Input::Next => {
                if !session.next_question() {
                    println!("This is the last question.");
                }
            }
            Input::Previous => {
                if !session.previous_question() {
                    println!("This is the first question.");
                }
            }
            Input::Finish => match session.finish_test().await {
                Ok(outcome) => {
                    render::print_outcome(&outcome);
                    render::print_report(&outcome.report);
                    if args.translate && !outcome.is_offline() {
                        match session.translate_report(&outcome.report).await {
                            Ok(translated) => {
                                println!();
                                println!("══════ Türkçe ══════");
                                render::print_report(&translated);
                            }
                            Err(err) => warn!(error = %err, "translation failed"),
                        }
                    }
                    return Ok(());
                }
                Err(SessionError::Incomplete { unanswered }) => {
                    println!("{unanswered} question(s) still unanswered.");
                }
                Err(err) => return Err(err.into()),
            },
            Input::Quit => return Ok(()),
            Input::Unknown => render::print_help(),
        }
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
