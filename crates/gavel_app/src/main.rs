mod logging;
mod runner;
mod session;

use std::io::BufRead;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use gavel_core::{update, AppState, AppViewModel, Effect, Msg, SearchPhase};
use gavel_engine::{ApiSettings, EngineCommand, EngineHandle};
use gavel_logging::{gavel_error, gavel_info};

use runner::EffectRunner;
use session::SessionFile;

fn main() {
    logging::initialize(logging::LogDestination::File);
    gavel_info!("gavel starting");

    let mut settings = ApiSettings::default();
    if let Ok(base_url) = std::env::var("GAVEL_API_URL") {
        settings.base_url = base_url;
    }

    let (engine, events) = match EngineHandle::new(settings) {
        Ok(pair) => pair,
        Err(err) => {
            gavel_error!("Failed to start engine: {}", err);
            eprintln!("Failed to start engine: {err}");
            return;
        }
    };

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let effect_runner = EffectRunner::new(engine.clone(), events, msg_tx.clone());
    let session = SessionFile::in_current_dir();

    // A remembered identity restores the garage on startup.
    if let Some(user) = session.load() {
        gavel_info!("Restored session for {}", user.username);
        let _ = msg_tx.send(Msg::LoggedIn { user });
    }

    let line_rx = spawn_stdin_reader();
    println!("gavel — auction listing browser. Type 'help' for commands.");

    let mut state = AppState::default();
    let mut quit = false;
    while !quit {
        let mut activity = false;

        while let Ok(msg) = msg_rx.try_recv() {
            activity = true;
            remember_identity(&session, &msg);
            state = dispatch(state, msg, &effect_runner);
        }

        while let Ok(line) = line_rx.try_recv() {
            activity = true;
            match parse_command(&line) {
                Command::Quit => {
                    quit = true;
                }
                Command::Help => print_help(),
                Command::Show => render(&state.view(Utc::now())),
                Command::Msgs(msgs) => {
                    for msg in msgs {
                        state = dispatch(state, msg, &effect_runner);
                    }
                }
                Command::Engine(command) => engine.send(command),
                Command::Unknown(input) => {
                    println!("Unknown command: {input}. Type 'help' for commands.");
                }
            }
        }

        if activity && state.phase() != SearchPhase::Loading {
            render(&state.view(Utc::now()));
        }

        if !activity {
            thread::sleep(Duration::from_millis(20));
        }
    }

    gavel_info!("gavel exiting");
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
    rx
}

/// Keeps the session file in step with identity changes before the core
/// sees them.
fn remember_identity(session: &SessionFile, msg: &Msg) {
    match msg {
        Msg::LoggedIn { user } => session.save(user),
        Msg::LoggedOut => session.clear(),
        _ => {}
    }
}

fn dispatch(state: AppState, msg: Msg, runner: &EffectRunner) -> AppState {
    let (state, effects) = update(state, msg);
    for effect in &effects {
        if matches!(effect, Effect::RequestLogin) {
            println!("Sign in first: login <email-or-username> <password>");
        }
    }
    runner.enqueue(effects);
    state
}

enum Command {
    Msgs(Vec<Msg>),
    Engine(EngineCommand),
    Show,
    Help,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb {
        "" => Command::Show,
        "search" => Command::Msgs(vec![
            Msg::QueryChanged(rest.to_string()),
            Msg::SearchSubmitted,
        ]),
        "year" => parse_year(rest),
        "keywords" => {
            let (include, exclude) = match rest.split_once(';') {
                Some((include, exclude)) => (include.trim(), exclude.trim()),
                None => (rest, ""),
            };
            Command::Msgs(vec![Msg::KeywordFilterApplied {
                include: include.to_string(),
                exclude: exclude.to_string(),
            }])
        }
        "clear-year" => Command::Msgs(vec![Msg::YearFilterCleared]),
        "clear-keywords" => Command::Msgs(vec![Msg::KeywordFilterCleared]),
        "reset" => Command::Msgs(vec![Msg::ResetRequested]),
        "toggle" if !rest.is_empty() => Command::Msgs(vec![Msg::SaveToggled {
            url: rest.to_string(),
        }]),
        "garage" | "show" => Command::Show,
        "login" => match rest.split_once(char::is_whitespace) {
            Some((name, password)) => Command::Engine(EngineCommand::Login {
                email_or_username: name.to_string(),
                password: password.trim().to_string(),
            }),
            None => Command::Unknown(line.to_string()),
        },
        "logout" => Command::Engine(EngineCommand::Logout),
        "register" => {
            let mut parts = rest.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(email), Some(username), Some(password)) => {
                    Command::Engine(EngineCommand::Register {
                        email: email.to_string(),
                        username: username.to_string(),
                        password: password.to_string(),
                    })
                }
                _ => Command::Unknown(line.to_string()),
            }
        }
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}

fn parse_year(rest: &str) -> Command {
    let mut parts = rest.split_whitespace();
    let from = parts.next().map(parse_year_bound);
    let to = parts.next().map(parse_year_bound);
    match (from, to) {
        (Some(Ok(from)), Some(Ok(to))) => Command::Msgs(vec![Msg::YearFilterApplied { from, to }]),
        (Some(Ok(from)), None) => Command::Msgs(vec![Msg::YearFilterApplied { from, to: None }]),
        _ => Command::Unknown(format!("year {rest}")),
    }
}

/// "-" leaves a bound open; anything else must be a number.
fn parse_year_bound(raw: &str) -> Result<Option<i32>, ()> {
    if raw == "-" {
        return Ok(None);
    }
    raw.parse::<i32>().map(Some).map_err(|_| ())
}

fn print_help() {
    println!("Commands:");
    println!("  search <query>                  search listings; empty query lists everything");
    println!("  year <from> <to>                filter by year range; use '-' for an open bound");
    println!("  keywords <include>;<exclude>    comma-separated keyword filter");
    println!("  clear-year / clear-keywords     drop one filter");
    println!("  reset                           clear query, results and all filters");
    println!("  toggle <url>                    save or unsave a listing");
    println!("  login <name> <password>");
    println!("  register <email> <username> <password>");
    println!("  logout");
    println!("  show                            re-render the current view");
    println!("  quit");
}

fn render(view: &AppViewModel) {
    match &view.username {
        Some(username) => println!("[signed in as {username}]"),
        None => println!("[not signed in]"),
    }

    if view.phase == SearchPhase::Loading {
        println!("Searching…");
        return;
    }

    if let Some(error) = &view.search_error {
        println!("Search failed: {error}");
    }
    if let Some(notice) = &view.notice {
        println!("{notice}");
    }

    if let Some(query) = &view.searched_query {
        let shown = if query.is_empty() { "(all)" } else { query };
        println!("Results for {shown}: {} listing(s)", view.rows.len());
    }
    for row in &view.rows {
        let saved = if row.saved { "*" } else { " " };
        let year = row
            .year
            .map(|year| year.to_string())
            .unwrap_or_else(|| "----".to_string());
        println!(
            " {saved} {year}  {:<12} {:<10} {}  {}",
            row.price_label, row.time_left, row.title, row.url
        );
    }

    if view.saved_loading {
        println!("Garage: loading…");
    } else if let Some(error) = &view.saved_error {
        println!("Garage unavailable: {error}");
    } else if !view.garage_rows.is_empty() {
        println!("Garage: {} saved listing(s)", view.garage_rows.len());
        for row in &view.garage_rows {
            println!("   {}  {}", row.title, row.url);
        }
    }
}
