//! Binary entrypoint for the Treasurehunt CLI.
//!
//! Commands:
//! - `init` - create a starter `config.toml`
//! - `locations` - print the seeded location list in unlock order
//! - `play` - run an interactive hunt on stdin, entering location codes by hand
//!
//! See the library crate docs for module-level details: `treasurehunt::`.
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::collections::HashSet;
use tokio::io::{AsyncBufReadExt, BufReader};

use treasurehunt::config::Config;
use treasurehunt::hunt::{
    canonical_hunt_seed, check_quiz_allowed, floor_counts, format_remaining, has_photo,
    load_locations_from_json, quiz_result, suggested_floor, CodeSource, HuntError, HuntSession,
    Location, ToastKind, VerifyOutcome, View,
};

#[derive(Parser)]
#[command(name = "treasurehunt")]
#[command(about = "Location-by-location treasure hunt engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// List the hunt locations in unlock order
    Locations,
    /// Play the hunt interactively
    Play,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            init_logging(&None, cli.verbose);
            info!("Initializing new hunt configuration");
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
        }
        Commands::Locations => {
            let config = load_config(&cli.config, cli.verbose).await;
            let locations = match &config.seed.locations_file {
                Some(path) => load_locations_from_json(path)?,
                None => canonical_hunt_seed(),
            };
            print_locations(&locations);
        }
        Commands::Play => {
            let config = load_config(&cli.config, cli.verbose).await;
            info!("Starting {} at {}", config.hunt.name, config.hunt.venue);
            play(config).await?;
        }
    }

    Ok(())
}

/// Load the config (or defaults) and start logging with it.
async fn load_config(path: &str, verbosity: u8) -> Config {
    let (config, load_error) = Config::load_or_default(path).await;
    init_logging(&Some(config.clone()), verbosity);
    if let Some(e) = load_error {
        warn!("{} (using built-in defaults)", e);
    }
    config
}

fn print_locations(locations: &[Location]) {
    for (i, location) in locations.iter().enumerate() {
        println!(
            "{}. [{}] {} ({}) - {}",
            i + 1,
            location.floor.code(),
            location.name,
            location.id,
            location.description
        );
    }
    let counts: Vec<String> = floor_counts(locations)
        .iter()
        .map(|(floor, n)| format!("{}: {}", floor.code(), n))
        .collect();
    println!("{}", counts.join("  "));
}

const PLAY_HELP: &str =
    "Commands: list | open <id> | code <text> | photo | answer <n> | map | progress | back | quit";

async fn play(config: Config) -> Result<()> {
    let mut session = HuntSession::new(config);
    let mut seen_toasts = HashSet::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    session.navigate("/");
    println!("{}", session.config().hunt.name);
    println!("{}", session.registration_step().prompt());

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "quit" || line == "exit" {
            break;
        }
        if *session.view() == View::Registration {
            handle_registration(&mut session, line);
        } else {
            handle_play_command(&mut session, line);
        }
        print_new_toasts(&session, &mut seen_toasts);
    }
    Ok(())
}

fn handle_registration(session: &mut HuntSession, line: &str) {
    if line == "back" {
        session.registration_back();
    } else {
        session.registration_input(line);
        if let Ok(Some(player)) = session.registration_next() {
            println!("Registered as {} ({})", player.name, player.id);
            print_dashboard(session);
            println!("{}", PLAY_HELP);
            return;
        }
    }
    let step = session.registration_step();
    println!("Step {}/3: {}", step.number(), step.prompt());
}

fn handle_play_command(session: &mut HuntSession, line: &str) {
    let (command, arg) = match line.split_once(' ') {
        Some((c, a)) => (c, a.trim()),
        None => (line, ""),
    };
    match command {
        "list" | "dashboard" => {
            session.navigate("/dashboard");
            print_dashboard(session);
        }
        "open" => {
            if session.open_location(arg).is_ok() {
                println!("Scan or type the code for {}", arg);
            }
        }
        "code" => match session.view().location_id().map(str::to_string) {
            Some(id) => {
                let outcome = session.submit_code(&id, arg, CodeSource::Manual);
                if let Ok(VerifyOutcome::Matched) = outcome {
                    if let Some(location) = session.state().location(&id) {
                        println!("Take a selfie: {}", location.decoration_requirement);
                    }
                    println!("Type `photo` to submit it");
                }
            }
            None => println!("Open a location first"),
        },
        "photo" => match session.view().clone() {
            View::Photo(id) => {
                let photo = format!("data:image/jpeg;base64,cli-{}", id);
                if session.submit_photo(&id, photo).is_ok() {
                    print_quiz(session, &id);
                }
            }
            _ => println!("Verify a location code first"),
        },
        "answer" => match (session.view().clone(), arg.parse::<usize>()) {
            (View::Photo(id), Ok(n)) if n >= 1 => match session.answer_quiz(&id, n - 1) {
                Ok(true) => {
                    if let Some(explanation) = session.quiz_explanation(&id) {
                        println!("{}", explanation);
                    }
                    print_dashboard(session);
                }
                Ok(false) => {}
                Err(e) => println!("{}", e),
            },
            (View::Photo(_), _) => println!("Answer with the option number"),
            _ => println!("No quiz open"),
        },
        "map" => {
            session.navigate("/map");
            let next_floor = suggested_floor(&session.state().locations);
            for (floor, stats) in session.floor_overview() {
                let mark = if floor == next_floor { "*" } else { " " };
                println!(
                    "{}{} {}: {}/{}",
                    mark,
                    floor.code(),
                    floor.label(),
                    stats.completed,
                    stats.total
                );
            }
        }
        "progress" => {
            print_location_progress(session);
            for achievement in session.achievements() {
                let mark = if achievement.unlocked { "x" } else { " " };
                println!(
                    "[{}] {} - {}",
                    mark,
                    achievement.kind.title(),
                    achievement.kind.description()
                );
            }
        }
        "back" => {
            session.navigate("/dashboard");
            print_dashboard(session);
        }
        "go" => {
            let view = session.navigate(arg);
            println!("{}", view.path());
        }
        _ => println!("{}", PLAY_HELP),
    }
}

fn print_dashboard(session: &HuntSession) {
    let Some(summary) = session.dashboard_summary() else {
        return;
    };
    println!(
        "{}: {}/{} locations ({:.0}%)",
        summary.player_name, summary.completed, summary.total, summary.percentage
    );
    let state = session.state();
    for location in &state.locations {
        println!(
            "  {:<10} {:<16} {}",
            location.status.as_str(),
            location.id,
            location.name
        );
    }
    match summary.next_location {
        Some(next) => println!("Next: {}", next),
        None if summary.finished => println!("Every location found!"),
        None => {}
    }
}

fn print_location_progress(session: &HuntSession) {
    let state = session.state();
    let Some(progress) = state.progress.as_ref() else {
        return;
    };
    for location in &state.locations {
        let photo = if has_photo(progress, &location.id) { "photo" } else { "-" };
        let quiz = match quiz_result(progress, &location.id) {
            Some(result) if result.correct => "correct",
            Some(_) => "wrong",
            None => "-",
        };
        println!("  {:<16} {:<6} {}", location.id, photo, quiz);
    }
}

fn print_quiz(session: &HuntSession, location_id: &str) {
    let state = session.state();
    let Some(location) = state.location(location_id) else {
        return;
    };
    if let Some(progress) = state.progress.as_ref() {
        let now = session.store().now();
        if let Err(HuntError::QuizLockedOut { until, .. }) =
            check_quiz_allowed(progress, location_id, now)
        {
            println!("Quiz locked for {}", format_remaining(until, now));
            return;
        }
    }
    println!("{}", location.quiz.question);
    for (i, option) in location.quiz.options.iter().enumerate() {
        println!("  {}) {}", i + 1, option);
    }
}

fn print_new_toasts(session: &HuntSession, seen: &mut HashSet<String>) {
    for toast in session.state().toasts {
        if seen.insert(toast.id.clone()) {
            let tag = match toast.kind {
                ToastKind::Success => "ok",
                ToastKind::Error => "error",
                ToastKind::Info => "info",
            };
            println!("<{}> {}", tag, toast.message);
        }
    }
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // Base level from CLI verbosity; config level applies when no -v is given
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|c| c.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });

    match log_file {
        Some(f) => {
            let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
            // Only echo to the console when attached to a terminal
            let is_tty = atty::is(atty::Stream::Stderr);
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if let Ok(mut guard) = write_mutex.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(|fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
            });
        }
    }
    let _ = builder.try_init();
}
