use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use quiz_core::model::{QuizId, QuizItem, QuizMetadata};
use services::{
    HttpQuizSource, InMemoryQuizSource, QuizDataSource, QuizFixture, QuizServiceConfig, RunMode,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use ui::{
    ControllerTimings, PresentationHost, PulseEffect, PulseTarget, QuizApp,
    QuizNavigationController, build_app_context,
};

const PULSE_DURATION: Duration = Duration::from_millis(800);

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidQuizId { raw: String },
    InvalidItemCount { raw: String },
    InvalidPollInterval { raw: String },
    InvalidStartItem { raw: String },
    MissingItems { quiz: QuizId },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidQuizId { raw } => write!(f, "invalid --quiz-id value: {raw:?}"),
            ArgsError::InvalidItemCount { raw } => write!(f, "invalid --items value: {raw}"),
            ArgsError::InvalidPollInterval { raw } => {
                write!(f, "invalid --poll-secs value: {raw} (must be at least 1)")
            }
            ArgsError::InvalidStartItem { raw } => write!(f, "invalid --item value: {raw}"),
            ArgsError::MissingItems { quiz } => {
                write!(f, "quiz {quiz}: expected item count unknown, pass --items")
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- [--quiz-id <id>] [--items <n>] [--mode <dev|prod>] \\"
    );
    eprintln!("                      [--base-url <url>] [--fixture <file.json>] [--poll-secs <n>]");
    eprintln!("                      [--item <index>]");
    eprintln!();
    eprintln!("Without --quiz-id the question screen opens idle.");
    eprintln!("--mode dev enables browse mode: load once, never poll.");
    eprintln!("--item opens the given item instead of the one current by date.");
    eprintln!();
    eprintln!("Commands while running: n(ext), p(revious), g <index>, a(nswer), r(eload), q(uit)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_ID, QUIZ_ITEMS, QUIZ_MODE, QUIZ_ITEM, QUIZ_FIXTURE, QUIZ_POLL_INTERVAL_SECS,");
    eprintln!("  QUIZ_API_BASE_URL, QUIZ_API_TOKEN, QUIZ_API_TIMEOUT_SECS, RUST_LOG");
}

#[derive(Debug)]
struct Args {
    quiz_id: Option<QuizId>,
    items: Option<usize>,
    mode: RunMode,
    base_url: Option<String>,
    fixture: Option<PathBuf>,
    poll_interval: Option<Duration>,
    start_item: Option<i64>,
}

enum Parsed {
    Run(Args),
    Help,
}

fn parse_quiz_id(raw: String) -> Result<QuizId, ArgsError> {
    QuizId::new(raw.clone()).map_err(|_| ArgsError::InvalidQuizId { raw })
}

fn parse_items(raw: String) -> Result<usize, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidItemCount { raw })
}

fn parse_start_item(raw: String) -> Result<i64, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidStartItem { raw })
}

fn parse_poll_secs(raw: String) -> Result<Duration, ArgsError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ArgsError::InvalidPollInterval { raw }),
    }
}

impl Args {
    fn parse(args: impl Iterator<Item = String>) -> Result<Parsed, ArgsError> {
        Self::parse_with_env(args, |key| std::env::var(key).ok())
    }

    fn parse_with_env(
        mut args: impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Parsed, ArgsError> {
        let mut quiz_id = env("QUIZ_ID").map(parse_quiz_id).transpose()?;
        let mut items = env("QUIZ_ITEMS").map(parse_items).transpose()?;
        let mut mode = env("QUIZ_MODE").map_or_else(RunMode::default, |v| RunMode::parse(&v));
        let mut base_url = None;
        let mut fixture = env("QUIZ_FIXTURE").map(PathBuf::from);
        let mut poll_interval = env("QUIZ_POLL_INTERVAL_SECS")
            .map(parse_poll_secs)
            .transpose()?;
        let mut start_item = env("QUIZ_ITEM").map(parse_start_item).transpose()?;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--quiz-id" => quiz_id = Some(parse_quiz_id(require_value(&mut args, "--quiz-id")?)?),
                "--items" => items = Some(parse_items(require_value(&mut args, "--items")?)?),
                "--mode" => mode = RunMode::parse(&require_value(&mut args, "--mode")?),
                "--base-url" => base_url = Some(require_value(&mut args, "--base-url")?),
                "--fixture" => fixture = Some(PathBuf::from(require_value(&mut args, "--fixture")?)),
                "--poll-secs" => {
                    poll_interval = Some(parse_poll_secs(require_value(&mut args, "--poll-secs")?)?);
                }
                "--item" => start_item = Some(parse_start_item(require_value(&mut args, "--item")?)?),
                "--help" | "-h" => return Ok(Parsed::Help),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Parsed::Run(Self {
            quiz_id,
            items,
            mode,
            base_url,
            fixture,
            poll_interval,
            start_item,
        }))
    }

    fn metadata(&self, fixture: Option<&QuizFixture>) -> Result<Option<QuizMetadata>, ArgsError> {
        let Some(quiz_id) = &self.quiz_id else {
            return Ok(None);
        };
        if let Some(items) = self.items {
            return Ok(Some(QuizMetadata::new(quiz_id.clone(), items)));
        }
        fixture
            .and_then(|fixture| fixture.metadata_for(quiz_id))
            .cloned()
            .map(Some)
            .ok_or_else(|| ArgsError::MissingItems {
                quiz: quiz_id.clone(),
            })
    }
}

/// Line-oriented stand-in for the question screen.
struct ConsoleHost {
    animation: Duration,
}

#[async_trait]
impl PresentationHost for ConsoleHost {
    fn display_item(&self, item: Option<&QuizItem>) {
        let Some(item) = item else {
            println!("\n(no question)");
            return;
        };
        println!("\n[{}] {}", item.start_time().format("%H:%M"), item.question());
        if let Some(url) = item.image_url() {
            println!("  image: {url}");
        }
    }

    fn show_warning(&self, message: Option<&str>) {
        if let Some(message) = message {
            eprintln!("! {message}");
        }
    }

    async fn pulse(&self, target: PulseTarget, effect: PulseEffect) {
        debug!("pulse {target:?} ({:?})", effect.kind);
        tokio::time::sleep(self.animation).await;
    }

    fn navigate_to_auth(&self) {
        warn!("Backend rejected our credentials");
        eprintln!("Authentication required: set QUIZ_API_TOKEN and restart.");
    }

    fn navigate_to_answer(&self, item: &QuizItem) {
        println!("\nAnswers to: {}", item.question());
        if item.answers().is_empty() {
            println!("  (none yet)");
        }
        for (n, answer) in item.answers().iter().enumerate() {
            println!("  {}. {answer}", n + 1);
        }
    }
}

struct ConsoleApp {
    metadata: Option<QuizMetadata>,
    mode: RunMode,
    start_item: Option<i64>,
    timings: ControllerTimings,
    source: Arc<dyn QuizDataSource>,
}

impl QuizApp for ConsoleApp {
    fn quiz_metadata(&self) -> Option<QuizMetadata> {
        self.metadata.clone()
    }

    fn run_mode(&self) -> RunMode {
        self.mode
    }

    fn start_item(&self) -> Option<i64> {
        self.start_item
    }

    fn data_source(&self) -> Arc<dyn QuizDataSource> {
        Arc::clone(&self.source)
    }

    fn timings(&self) -> ControllerTimings {
        self.timings
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Next,
    Previous,
    Go(i64),
    Answer,
    Reload,
    Quit,
}

impl Command {
    fn from_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let command = match parts.next()? {
            "n" | "next" => Self::Next,
            "p" | "prev" | "previous" => Self::Previous,
            "g" | "go" => Self::Go(parts.next()?.parse().ok()?),
            "a" | "answer" => Self::Answer,
            "r" | "reload" => Self::Reload,
            "q" | "quit" | "exit" => Self::Quit,
            _ => return None,
        };
        parts.next().is_none().then_some(command)
    }
}

async fn handle(controller: &QuizNavigationController, command: Command) {
    let moved = match command {
        Command::Next => controller.go_to_next(),
        Command::Previous => controller.go_to_previous(),
        Command::Go(target) => controller.go_to_page(target),
        Command::Answer => controller.show_answer(),
        Command::Reload => {
            match controller.reload().await {
                Some(outcome) => info!("Reload finished: {outcome:?}"),
                None => eprintln!("No quiz selected."),
            }
            return;
        }
        Command::Quit => return,
    };
    if moved.is_none() {
        eprintln!("Nowhere to go.");
    }
}

async fn drive(controller: &QuizNavigationController) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(());
                };
                match Command::from_line(&line) {
                    Some(Command::Quit) => return Ok(()),
                    Some(command) => handle(controller, command).await,
                    None if line.trim().is_empty() => {}
                    None => eprintln!("unknown command: {}", line.trim()),
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                return Ok(());
            }
        }
    }
}

fn build_source(
    args: &Args,
    fixture: Option<&QuizFixture>,
) -> Result<Arc<dyn QuizDataSource>, Box<dyn std::error::Error>> {
    if let Some(fixture) = fixture {
        info!("Serving quizzes from fixture");
        return Ok(Arc::new(InMemoryQuizSource::from_fixture(fixture)));
    }
    let mut config = QuizServiceConfig::from_env();
    if let Some(base_url) = &args.base_url {
        config = config.with_base_url(base_url.clone());
    }
    info!("Reading quizzes from {}", config.base_url);
    Ok(Arc::new(HttpQuizSource::new(config)?))
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = match Args::parse(std::env::args().skip(1)).inspect_err(|e| {
        eprintln!("{e}");
        print_usage();
    })? {
        Parsed::Help => {
            print_usage();
            return Ok(());
        }
        Parsed::Run(args) => args,
    };

    let fixture = args.fixture.as_ref().map(QuizFixture::load).transpose()?;
    let metadata = args.metadata(fixture.as_ref())?;
    let source = build_source(&args, fixture.as_ref())?;

    let mut timings = ControllerTimings::default();
    if let Some(interval) = args.poll_interval {
        timings = timings.with_poll_interval(interval);
    }

    let app: Arc<dyn QuizApp> = Arc::new(ConsoleApp {
        metadata,
        mode: args.mode,
        start_item: args.start_item,
        timings,
        source,
    });
    let context = build_app_context(&app);
    match context.quiz_metadata() {
        Some(quiz) => println!(
            "Quiz {} ({} items, {:?} mode)",
            quiz.title().unwrap_or(quiz.id().as_str()),
            quiz.number_of_items(),
            context.run_mode()
        ),
        None => println!("No quiz selected."),
    }
    let host = Arc::new(ConsoleHost {
        animation: PULSE_DURATION,
    });

    let (controller, outcome) = context.launch(host).await;
    info!("Activation finished: {outcome:?}");

    let result = drive(&controller).await;
    controller.deactivate();
    result
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    pretty_env_logger::init();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
