use std::fs;
use std::io;
use std::path::PathBuf;

use crate::config::DraftConfig;
use crate::data::{fighters_from_value, FighterStore, JsonFileStore};
use crate::draft::{
    format_countdown, run_batch_draft, DraftEvent, DraftExport, LiveDraftSession, LiveOptions,
};
use crate::server;
use crate::server::api;
use crate::volatility::VolatilityConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Rank,
    Draft,
    Live,
    Estimate,
    Import,
}

const USAGE: &str = "usage: draftroom <serve|rank|draft|live|estimate|import>";

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("rank") => Some(Command::Rank),
        Some("draft") => Some(Command::Draft),
        Some("live") => Some(Command::Live),
        Some("estimate") => Some(Command::Estimate),
        Some("import") => Some(Command::Import),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let config = DraftConfig::load();
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(config),
        Some(Command::Rank) => handle_rank(args, &config),
        Some(Command::Draft) => handle_draft(args, &config),
        Some(Command::Live) => handle_live(args, &config),
        Some(Command::Estimate) => handle_estimate(args, &config),
        Some(Command::Import) => handle_import(args, &config),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

/// Positional arguments after the command, with `--flag [value]` pairs removed.
fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter().skip(2);
    while let Some(arg) = iter.next() {
        if arg == "--seed" {
            iter.next();
        } else if !arg.starts_with("--") {
            out.push(arg.as_str());
        }
    }
    out
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a String> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|index| args.get(index + 1))
}

fn store_for(positional: Option<&str>, config: &DraftConfig) -> JsonFileStore {
    let dir = positional
        .map(PathBuf::from)
        .unwrap_or_else(|| config.store_dir.clone());
    JsonFileStore::new(dir)
}

fn parse_f64_arg(raw: Option<&str>, name: &str) -> Option<f64> {
    let value = raw?;
    match value.parse::<f64>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            eprintln!("invalid {name} '{value}', using configured value");
            None
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T, what: &str) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize {what}: {err}");
            1
        }
    }
}

fn handle_serve(config: DraftConfig) -> i32 {
    match server::run_server(config) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_rank(args: &[String], config: &DraftConfig) -> i32 {
    let positional = positionals(args);
    let store = store_for(positional.first().copied(), config);
    let payload = api::pool_payload(&store.get_fighters());
    print_json(&payload, "pool ranking")
}

fn handle_draft(args: &[String], config: &DraftConfig) -> i32 {
    let positional = positionals(args);
    let store = store_for(positional.first().copied(), config);
    let outcome = run_batch_draft(&store.get_fighters());
    let export = DraftExport::from_slots(
        &outcome.slots,
        chrono::Utc::now(),
        config.pick_delay_secs(),
        config.start_at(),
    );

    if args.iter().any(|arg| arg == "--csv") {
        match export.write_csv(io::stdout().lock()) {
            Ok(()) => 0,
            Err(err) => {
                eprintln!("{err}");
                1
            }
        }
    } else {
        print_json(&export, "draft export")
    }
}

fn handle_estimate(args: &[String], config: &DraftConfig) -> i32 {
    let positional = positionals(args);
    let store = store_for(positional.first().copied(), config);
    let query = api::EstimateQuery {
        delay: parse_f64_arg(positional.get(1).copied(), "delay_secs").or(config.pick_delay_secs),
        start: config.start_at.clone(),
    };
    let estimate = api::estimate_payload(&store.get_fighters(), &query, chrono::Utc::now());
    println!(
        "Est. duration for {} picks: {} - est. finish {}{}",
        estimate.picks,
        estimate.duration_label,
        if estimate.starts_now { "(if start now) " } else { "" },
        estimate.finish_at.to_rfc3339()
    );
    0
}

fn handle_live(args: &[String], config: &DraftConfig) -> i32 {
    let positional = positionals(args);
    let store = store_for(positional.first().copied(), config);
    let delay = parse_f64_arg(positional.get(1).copied(), "delay_secs").or(config.pick_delay_secs);
    let options = LiveOptions::from_settings(delay, config.start_at());
    let use_override = config.use_override && !args.iter().any(|arg| arg == "--no-override");
    let seed = flag_value(args, "--seed").and_then(|raw| match raw.parse::<u64>() {
        Ok(seed) => Some(seed),
        Err(_) => {
            eprintln!("invalid seed '{raw}', using random seed");
            None
        }
    });
    let volatility = VolatilityConfig {
        seed: seed.or(config.volatility.seed),
        ..config.volatility.clone()
    };
    let fighters = store.get_fighters();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to start runtime: {err}");
            return 1;
        }
    };

    runtime.block_on(async move {
        let pick_delay_ms = options.pick_delay.as_millis() as u64;
        let session = LiveDraftSession::start(fighters, options, volatility, use_override);
        let Some(mut events) = session.take_events() else {
            eprintln!("live draft event stream unavailable");
            return 1;
        };
        let mut exit_code = 0;
        while let Some(event) = events.recv().await {
            match event {
                DraftEvent::Init(init) => {
                    println!(
                        "draft pool: {} fighters, {} teams, next pick every {}",
                        init.ranked_pool.len(),
                        init.draft_slots.len(),
                        format_countdown(pick_delay_ms)
                    );
                }
                DraftEvent::Pick(pick) => {
                    println!(
                        "#{} {} select {} ({} left){}",
                        pick.pick_number,
                        pick.slot.name,
                        pick.fighter.display_name(),
                        pick.remaining,
                        if pick.overridden { " *" } else { "" }
                    );
                }
                DraftEvent::Complete(complete) => {
                    exit_code = print_json(&complete.export, "draft export");
                }
            }
        }
        let outcome = session.finish().await;
        if !outcome.completed {
            eprintln!("live draft did not complete");
            return 1;
        }
        exit_code
    })
}

fn handle_import(args: &[String], config: &DraftConfig) -> i32 {
    let positional = positionals(args);
    let Some(path) = positional.first() else {
        eprintln!("usage: draftroom import <fighters.json> [store_dir]");
        return 2;
    };
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("import failed: failed to read '{path}': {err}");
            return 1;
        }
    };
    let value: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            eprintln!("import failed: invalid JSON: {err}");
            return 1;
        }
    };
    if !value.is_array() {
        eprintln!("import failed: expected a JSON array of fighters");
        return 1;
    }
    let fighters = fighters_from_value(&value);
    let store = store_for(positional.get(1).copied(), config);
    match store.set_fighters(&fighters) {
        Ok(()) => {
            println!(
                "import complete: fighters={}, store='{}'",
                fighters.len(),
                store.dir().display()
            );
            0
        }
        Err(err) => {
            eprintln!("import failed: {err}");
            1
        }
    }
}
