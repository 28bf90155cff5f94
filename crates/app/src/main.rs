use std::fmt;
use std::sync::Arc;

use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use exam_core::Clock;
use exam_core::model::{Direction, ProctorConfig, Question, Quiz, QuizId};
use providers::{HttpProviderConfig, InMemoryQuestionSource, RecordingSink};
use services::{
    EnvSignal, ExamServices, NoopFullscreen, Notification, NotificationReceiver, SessionHandle,
    UserCommand,
};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidNumber { flag: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidNumber { flag, raw } => {
                write!(f, "invalid {flag} value: {raw}")
            }
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

fn parse_number(flag: &'static str, raw: String) -> Result<u32, ArgsError> {
    raw.parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

struct Args {
    quiz_id: QuizId,
    api_url: String,
    config: ProctorConfig,
    demo: bool,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --quiz-id <id>          quiz to attempt (default 1)");
    eprintln!("  --api <url>             quiz API base URL");
    eprintln!("  --duration <secs>       countdown budget (default 120)");
    eprintln!("  --violation-limit <n>   violations before termination (default 3)");
    eprintln!("  --no-fullscreen         do not request full-screen");
    eprintln!("  --demo                  use a built-in quiz, no network");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  EXAM_API_URL, EXAM_QUIZ_ID, RUST_LOG");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut quiz_id = std::env::var("EXAM_QUIZ_ID")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map_or_else(|| QuizId::new(1), QuizId::new);
        let mut api_url = HttpProviderConfig::from_env().base_url;
        let mut config = ProctorConfig::default();
        let mut demo = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--quiz-id" => {
                    let value = require_value(args, "--quiz-id")?;
                    let parsed: u64 = value.parse().map_err(|_| ArgsError::InvalidNumber {
                        flag: "--quiz-id",
                        raw: value.clone(),
                    })?;
                    quiz_id = QuizId::new(parsed);
                }
                "--api" => {
                    api_url = require_value(args, "--api")?;
                }
                "--duration" => {
                    let value = require_value(args, "--duration")?;
                    config.total_duration_secs = parse_number("--duration", value)?;
                }
                "--violation-limit" => {
                    let value = require_value(args, "--violation-limit")?;
                    config.violation_limit = parse_number("--violation-limit", value)?;
                }
                "--no-fullscreen" => {
                    config.require_fullscreen = false;
                }
                "--demo" => {
                    demo = true;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            quiz_id,
            api_url,
            config,
            demo,
        })
    }
}

fn sample_quiz(id: QuizId) -> Quiz {
    let questions = vec![
        Question::new(
            "Which layer owns the attempt state?",
            vec![
                "The presentation layer".into(),
                "The session controller".into(),
                "The submission sink".into(),
            ],
        ),
        Question::new(
            "What happens when the countdown reaches zero?",
            vec![
                "The attempt is submitted automatically".into(),
                "The countdown restarts".into(),
                "Nothing".into(),
            ],
        ),
        Question::new(
            "How many violations end the attempt by default?",
            vec!["1".into(), "2".into(), "3".into(), "5".into()],
        ),
    ];
    let questions = questions
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .expect("built-in demo questions are valid");
    Quiz::new(id, "Demo Quiz", questions)
}

fn print_quiz(quiz: &Quiz) {
    println!("{}", quiz.title());
    for (index, question) in quiz.questions().iter().enumerate() {
        println!("  [{index}] {}", question.prompt());
        for (choice, text) in question.choices().iter().enumerate() {
            println!("      ({choice}) {text}");
        }
    }
    println!();
    println!("Commands: answer <question> <choice> | next | prev | submit");
    println!("          hide | leave-fullscreen | quit");
}

async fn print_notifications(mut notifications: NotificationReceiver) {
    while let Some(notification) = notifications.recv().await {
        match notification {
            Notification::ViolationWarning(warning) => {
                println!(
                    "Warning: {} ({}/{})",
                    warning.kind.describe(),
                    warning.count,
                    warning.limit
                );
            }
            Notification::FullscreenUnavailable => {
                println!("Fullscreen mode is required for this quiz");
            }
            Notification::Closed { reason } => match reason {
                exam_core::model::SubmitReason::ViolationLimit => {
                    println!("Quiz terminated: violation limit reached");
                }
                exam_core::model::SubmitReason::Timeout => {
                    println!("Time is up — quiz submitted");
                }
                exam_core::model::SubmitReason::Manual => {
                    println!("Quiz submitted");
                }
            },
            Notification::SubmissionRecorded { receipt } => {
                println!(
                    "Your score: {} / {} ({:.2}%)",
                    receipt.score, receipt.total_questions, receipt.percentage
                );
            }
            Notification::SubmissionFailed { .. } => {
                println!("Submission may not have reached the server");
            }
        }
    }
}

async fn read_commands(handle: SessionHandle) {
    let mut lines = BufReader::new(io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("answer") => {
                let question = parts.next().and_then(|raw| raw.parse::<usize>().ok());
                let choice = parts.next().and_then(|raw| raw.parse::<u32>().ok());
                match (question, choice) {
                    (Some(question), Some(choice)) => {
                        handle.command(UserCommand::SelectAnswer { question, choice });
                    }
                    _ => eprintln!("usage: answer <question> <choice>"),
                }
            }
            Some("next") => handle.command(UserCommand::Navigate(Direction::Next)),
            Some("prev") => handle.command(UserCommand::Navigate(Direction::Previous)),
            Some("submit") => handle.command(UserCommand::Submit),
            Some("hide") => handle.signal(EnvSignal::VisibilityHidden),
            Some("leave-fullscreen") => handle.signal(EnvSignal::FullscreenExited),
            Some("quit") => break,
            Some(other) => eprintln!("unknown command: {other}"),
            None => {}
        }
    }
    // Dropping the handle here ends the session loop.
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|err| {
        eprintln!("{err}");
        print_usage();
        err
    })?;

    let services = if args.demo {
        let source = InMemoryQuestionSource::new();
        source.insert(sample_quiz(args.quiz_id));
        ExamServices::new(
            Clock::default_clock(),
            args.config,
            Arc::new(source),
            Arc::new(RecordingSink::new()),
            Arc::new(NoopFullscreen),
        )
    } else {
        ExamServices::over_http(
            args.config,
            HttpProviderConfig::new(args.api_url),
            Arc::new(NoopFullscreen),
        )
    };

    let (mut runtime, handle, notifications) = match services.start_attempt(args.quiz_id).await {
        Ok(parts) => parts,
        Err(err) if err.is_unavailable() => {
            // Permanent display state, distinct from a terminated attempt.
            eprintln!("Quiz unavailable: {err}");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    print_quiz(runtime.controller().attempt().quiz());
    tokio::spawn(print_notifications(notifications));
    tokio::spawn(read_commands(handle));

    runtime.run().await;

    let progress = runtime.controller().progress();
    println!(
        "Attempt finished: {:?} ({} of {} answered, {} violations)",
        runtime.controller().status(),
        progress.answered,
        progress.total,
        progress.violation_count
    );
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
