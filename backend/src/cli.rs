//! Command line configuration and the terminal frontend.

use calc_core::calculator;
use calc_core::format::format_value;
use calc_core::history::{
    CompoundInputs, HistoryRecord, HistoryStore, SimpleInputs, DEFAULT_HISTORY_FILE,
};
use calc_core::interest;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::warn;

/// Digits shown for a calculator result.
const RESULT_DIGITS: usize = 12;
/// Digits shown for interest amounts.
const MONEY_DIGITS: usize = 4;

#[derive(Debug, Parser)]
#[command(
    name = "calc-backend",
    version,
    about = "Calculator with simple/compound interest and a persisted history"
)]
pub struct Cli {
    /// Address the HTTP API listens on
    #[arg(long, env = "CALC_ADDR", default_value = "127.0.0.1:3000", global = true)]
    pub addr: SocketAddr,

    /// JSON file holding the calculation history
    #[arg(long, env = "CALC_HISTORY_FILE", default_value = DEFAULT_HISTORY_FILE, global = true)]
    pub history_file: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API (the default)
    Serve,
    /// Evaluate an arithmetic expression, e.g. `eval "2+2*3"` or `eval 50%`
    Eval {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        expr: Vec<String>,
    },
    /// Simple interest: P * R * T / 100
    Simple {
        #[arg(long, short = 'p', allow_negative_numbers = true)]
        principal: f64,
        /// Annual rate in percent
        #[arg(long, short = 'r', allow_negative_numbers = true)]
        rate: f64,
        /// Time in years
        #[arg(long, short = 't', allow_negative_numbers = true)]
        time: f64,
    },
    /// Compound interest: P * (1 + r/n)^(n*T)
    Compound {
        #[arg(long, short = 'p', allow_negative_numbers = true)]
        principal: f64,
        /// Annual rate in percent
        #[arg(long, short = 'r', allow_negative_numbers = true)]
        rate: f64,
        /// Time in years
        #[arg(long, short = 't', allow_negative_numbers = true)]
        time: f64,
        /// Compounds per year
        #[arg(long, short = 'n', default_value_t = 1, allow_negative_numbers = true)]
        n: i64,
    },
    /// Show or clear the history
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long)]
        clear: bool,
    },
}

/// Run a terminal command against the history file and print its output.
pub fn run(command: Command, history_file: &Path) -> ExitCode {
    let mut store = crate::open_history(history_file);
    match execute(command, &mut store) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}

fn record(store: &mut HistoryStore, record: HistoryRecord) {
    if let Err(e) = store.record(record) {
        warn!("Failed to save history to {}: {}", store.path().display(), e);
    }
}

/// Execute a command, returning the text to display or an error message.
pub fn execute(command: Command, store: &mut HistoryStore) -> Result<String, String> {
    match command {
        Command::Serve => Err("serve is handled by the HTTP server".to_string()),

        Command::Eval { expr } => {
            let expr = expr.join(" ");
            let expr = expr.trim();
            if expr.is_empty() {
                return Err("Empty expression".to_string());
            }
            let result = calculator::evaluate(expr)
                .map_err(|e| format!("Invalid expression: {}", e))?;
            record(
                store,
                HistoryRecord::Calc {
                    expr: expr.to_string(),
                    result,
                },
            );
            Ok(format_value(result, RESULT_DIGITS))
        }

        Command::Simple {
            principal,
            rate,
            time,
        } => {
            let result = interest::simple_interest(principal, rate, time)
                .map_err(|e| format!("Invalid inputs: {}", e))?;
            record(
                store,
                HistoryRecord::Simple {
                    inputs: SimpleInputs {
                        principal,
                        rate,
                        time,
                    },
                    result,
                },
            );
            Ok(format!(
                "Simple Interest: {}    Total: {}",
                format_value(result.si, MONEY_DIGITS),
                format_value(result.total, MONEY_DIGITS)
            ))
        }

        Command::Compound {
            principal,
            rate,
            time,
            n,
        } => {
            let result = interest::compound_interest(principal, rate, time, n)
                .map_err(|e| format!("Invalid inputs: {}", e))?;
            record(
                store,
                HistoryRecord::Compound {
                    inputs: CompoundInputs {
                        principal,
                        rate_percent: rate,
                        time,
                        n,
                    },
                    result,
                },
            );
            Ok(format!(
                "Compound Interest: {}    Total: {}",
                format_value(result.ci, MONEY_DIGITS),
                format_value(result.total, MONEY_DIGITS)
            ))
        }

        Command::History { limit, clear } => {
            if clear {
                store
                    .clear()
                    .map_err(|e| format!("Failed to clear history: {}", e))?;
                return Ok("History cleared.".to_string());
            }
            if store.history().is_empty() {
                return Ok("No history yet.".to_string());
            }
            let lines: Vec<String> = store
                .history()
                .entries()
                .take(limit)
                .map(|entry| entry.record.summary())
                .collect();
            Ok(lines.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &tempfile::TempDir) -> HistoryStore {
        HistoryStore::open(dir.path().join("calc_history.json")).unwrap()
    }

    fn eval(expr: &str) -> Command {
        Command::Eval {
            expr: vec![expr.to_string()],
        }
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["calc-backend"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.history_file, PathBuf::from("calc_history.json"));
    }

    #[test]
    fn test_cli_eval_accepts_leading_minus_and_spaces() {
        let cli = Cli::try_parse_from(["calc-backend", "eval", "-2", "**", "2"]).unwrap();
        match cli.command {
            Some(Command::Eval { expr }) => assert_eq!(expr.join(" "), "-2 ** 2"),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_eval_displays_rounded_result() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store(&dir);

        assert_eq!(execute(eval("0.1+0.2"), &mut store).unwrap(), "0.3");
        assert_eq!(execute(eval("2+2*3"), &mut store).unwrap(), "8");
        assert_eq!(store.history().len(), 2);
    }

    #[test]
    fn test_eval_error_message() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store(&dir);

        let err = execute(eval("sqrt(-1)"), &mut store).unwrap_err();
        assert_eq!(err, "Invalid expression: math domain error: sqrt of negative number");
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_interest_commands() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store(&dir);

        let simple = Command::Simple {
            principal: 1000.0,
            rate: 7.5,
            time: 1.0,
        };
        assert_eq!(
            execute(simple, &mut store).unwrap(),
            "Simple Interest: 75    Total: 1075"
        );

        let compound = Command::Compound {
            principal: 1000.0,
            rate: 10.0,
            time: 2.0,
            n: 1,
        };
        assert_eq!(
            execute(compound, &mut store).unwrap(),
            "Compound Interest: 210    Total: 1210"
        );

        let invalid = Command::Compound {
            principal: 1000.0,
            rate: 10.0,
            time: 2.0,
            n: 0,
        };
        assert!(execute(invalid, &mut store).is_err());
        assert_eq!(store.history().len(), 2);
    }

    #[test]
    fn test_history_listing_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store(&dir);

        let listing = execute(Command::History { limit: 10, clear: false }, &mut store).unwrap();
        assert_eq!(listing, "No history yet.");

        execute(eval("1+1"), &mut store).unwrap();
        execute(eval("2/3"), &mut store).unwrap();
        let listing = execute(Command::History { limit: 10, clear: false }, &mut store).unwrap();
        assert_eq!(listing, "Calc: 2/3 = 0.666667\nCalc: 1+1 = 2");

        let listing = execute(Command::History { limit: 1, clear: false }, &mut store).unwrap();
        assert_eq!(listing, "Calc: 2/3 = 0.666667");

        execute(Command::History { limit: 10, clear: true }, &mut store).unwrap();
        assert!(store.history().is_empty());
    }
}
