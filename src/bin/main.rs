// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use point_ledger::{ActionKind, ActionRule, Engine, RuleRegistry, UserId};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;
use std::sync::Arc;

/// Point Ledger - Process action event CSV files
///
/// Reads user action events from a CSV file and outputs point balances to
/// stdout. Signup events register the user; all events award points per the
/// rule table.
#[derive(Parser, Debug)]
#[command(name = "point-ledger")]
#[command(about = "An action point ledger that processes event CSVs", long_about = None)]
struct Args {
    /// Path to CSV file with action events
    ///
    /// Expected format: action,user
    /// Example: cargo run -- events.csv > balances.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Optional CSV file overriding point rules
    ///
    /// Expected format: action,points
    #[arg(long, value_name = "FILE")]
    rules: Option<PathBuf>,
}

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    let registry = match &args.rules {
        Some(path) => {
            let file = match File::open(path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Error opening rules file '{}': {}", path.display(), e);
                    process::exit(1);
                }
            };
            match load_rules(BufReader::new(file)) {
                Ok(registry) => registry,
                Err(e) => {
                    eprintln!("Error loading rules: {}", e);
                    process::exit(1);
                }
            }
        }
        None => RuleRegistry::with_defaults(),
    };

    // Open input file
    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    // Process events from CSV
    let engine = Engine::new(Arc::new(registry));
    if let Err(e) = process_events(&engine, BufReader::new(file)) {
        eprintln!("Error processing events: {}", e);
        process::exit(1);
    }

    // Write results to stdout
    if let Err(e) = write_balances(&engine, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Raw CSV record matching the event input format.
///
/// Fields: `action, user`
#[derive(Debug, Deserialize)]
struct EventRecord {
    action: String,
    user: u64,
}

/// Raw CSV record for a rule override.
///
/// Fields: `action, points`
#[derive(Debug, Deserialize)]
struct RuleRecord {
    action: String,
    points: i64,
}

/// Loads a rule table from a CSV reader.
///
/// Starts from the canonical defaults and replaces any rule named in the
/// file. Rows with an unrecognized action name are skipped.
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is invalid.
pub fn load_rules<R: Read>(reader: R) -> Result<RuleRegistry, csv::Error> {
    let registry = RuleRegistry::with_defaults();

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .has_headers(true)
        .from_reader(reader);

    for result in rdr.deserialize::<RuleRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(_e) => {
                #[cfg(debug_assertions)]
                eprintln!("Skipping malformed rule row: {}", _e);
                continue;
            }
        };

        match ActionKind::from_str(&record.action) {
            Ok(kind) => registry.set(ActionRule::new(kind, record.points)),
            Err(_) => {
                #[cfg(debug_assertions)]
                eprintln!("Skipping rule for unknown action '{}'", record.action);
            }
        }
    }

    Ok(registry)
}

/// Processes action events from a CSV reader.
///
/// Uses streaming parsing so arbitrarily large event files never load into
/// memory at once. Malformed rows and rejected events are skipped; `signup`
/// rows register the user, every other action requires one.
///
/// # CSV Format
///
/// Expected columns: `action, user`
/// - `action`: one of signup, add_report, delete_report, report_selected
/// - `user`: user ID (u64)
///
/// # Example
///
/// ```csv
/// action,user
/// signup,1
/// add_report,1
/// report_selected,1
/// ```
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is invalid.
/// Individual event errors are logged in debug mode but don't stop
/// processing.
pub fn process_events<R: Read>(engine: &Engine, reader: R) -> Result<(), csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All) // Handle whitespace in fields like " signup "
        .has_headers(true)
        .from_reader(reader);

    for result in rdr.deserialize::<EventRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(_e) => {
                // Skip malformed rows
                #[cfg(debug_assertions)]
                eprintln!("Skipping malformed row: {}", _e);
                continue;
            }
        };

        let Ok(kind) = ActionKind::from_str(&record.action) else {
            #[cfg(debug_assertions)]
            eprintln!("Skipping unknown action '{}'", record.action);
            continue;
        };

        let user_id = UserId(record.user);
        let outcome = match kind {
            ActionKind::Signup => engine.signup(user_id),
            _ => engine.apply(user_id, kind),
        };

        // Skip rejected events (silent failure)
        if let Err(_e) = outcome {
            #[cfg(debug_assertions)]
            eprintln!("Skipping {} for user {}: {}", kind, user_id, _e);
        }
    }

    Ok(())
}

/// Writes user point balances to a CSV writer.
///
/// # CSV Format
///
/// Columns: `user, total_points`
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_balances<W: Write>(engine: &Engine, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for account in engine.accounts() {
        wtr.serialize(account.value())?;
    }

    // Flush to ensure all data is written
    wtr.flush()?;
    Ok(())
}
