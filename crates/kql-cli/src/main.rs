mod commands;
mod logger;

use std::io::Read;
use std::process::ExitCode;

use clap::Parser;
use commands::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = logger::init() {
        eprintln!("warning: failed to initialise logging: {err}");
    }

    if cli.dialect != "clickhouse" {
        eprintln!(
            "error: unsupported dialect {:?} (only \"clickhouse\" is implemented)",
            cli.dialect
        );
        return ExitCode::FAILURE;
    }

    let query = match cli.query {
        Some(q) => q,
        None => {
            let mut buf = String::new();
            if let Err(err) = std::io::stdin().read_to_string(&mut buf) {
                eprintln!("error: failed to read query from stdin: {err}");
                return ExitCode::FAILURE;
            }
            buf
        }
    };

    if cli.explain {
        match kql_transpiler::plan_summary(&query) {
            Ok(stages) => println!("plan: {}", stages.join(" -> ")),
            Err(err) => {
                eprintln!("error: {err}");
                return ExitCode::FAILURE;
            }
        }
    }

    match kql_transpiler::transpile(&query) {
        Ok(sql) => {
            println!("{sql}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
