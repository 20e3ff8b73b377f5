//! calc-runner: headless driver for the damage calculator engine.
//!
//! Usage:
//!   calc-runner --ipc-mode [--config calc.json]
//!   calc-runner --import <blob> [--config calc.json]

use anyhow::Result;
use damage_calc_core::{
    CalcConfig, CommandOutcome, DamageOutcome, EngineState, PetQueueStore, StoreCommand,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcRequest {
    GetState,
    Command { command: StoreCommand },
    Calculate,
    Export,
    Import { text: String },
    Quit,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct UiState<'a> {
    state: &'a EngineState,
    occupied: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<CommandOutcome>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let config = match arg_value(&args, "--config") {
        Some(path) => CalcConfig::load(path)?,
        None => CalcConfig::default(),
    };

    let mut store = PetQueueStore::new(&config);

    if ipc_mode {
        run_ipc_loop(&mut store)?;
    } else if let Some(blob) = arg_value(&args, "--import") {
        store.import_config(blob)?;
        let outcome = store.calculate();
        print_summary(&store, &outcome);
    } else {
        println!("usage: calc-runner --ipc-mode | --import <blob> [--config FILE]");
    }

    Ok(())
}

fn run_ipc_loop(store: &mut PetQueueStore) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let request: IpcRequest = match serde_json::from_str(&buffer) {
            Ok(r) => r,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        match request {
            IpcRequest::Quit => break,
            IpcRequest::GetState => write_state(&mut stdout, store, None)?,
            IpcRequest::Command { command } => {
                let outcome = store.apply(command);
                write_state(&mut stdout, store, Some(outcome))?;
            }
            IpcRequest::Calculate => {
                let damage = store.calculate();
                write_state(&mut stdout, store, Some(CommandOutcome::Calculated { damage }))?;
            }
            IpcRequest::Export => match store.export_config() {
                Ok(text) => writeln!(stdout, "{}", serde_json::json!({ "text": text }))?,
                Err(e) => write_error(&mut stdout, &e.to_string())?,
            },
            IpcRequest::Import { text } => match store.import_config(&text) {
                Ok(()) => write_state(&mut stdout, store, None)?,
                Err(e) => {
                    log::warn!("Import rejected: {e}");
                    write_error(&mut stdout, &e.to_string())?;
                }
            },
        }
        stdout.flush()?;
    }
    Ok(())
}

fn write_state(
    out: &mut impl Write,
    store: &PetQueueStore,
    outcome: Option<CommandOutcome>,
) -> Result<()> {
    let view = UiState {
        state: store.state(),
        occupied: store.occupied_count(),
        outcome,
    };
    writeln!(out, "{}", serde_json::to_string(&view)?)?;
    Ok(())
}

fn write_error(out: &mut impl Write, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(out, "{}", err_json)?;
    out.flush()?;
    Ok(())
}

fn print_summary(store: &PetQueueStore, outcome: &DamageOutcome) {
    let state = store.state();
    println!("=== CONFIG SUMMARY ===");
    println!("  name:         {}", state.config_name);
    println!("  pets:         {}", store.occupied_count());
    println!("  valid:        {}", outcome.valid);
    println!("  per pet:      {}", outcome.per_pet_damage);
    println!("  total damage: {}", state.total_damage);

    for (slot, pet) in state.pet_queue.slots().iter().enumerate() {
        match pet {
            Some(p) => println!(
                "  [{slot}] {} race={} skills={} sub-configs={}",
                p.id,
                p.race_id,
                p.skills.len(),
                p.sub_configs.len()
            ),
            None => println!("  [{slot}] (empty)"),
        }
    }
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
