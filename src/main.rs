use std::io;
use std::process::ExitCode;

use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use expr_parser_demo::config::Startup;
use expr_parser_demo::repl::Session;
use expr_parser_demo::run_with;

fn main() -> ExitCode {
    let (config, log_level, rejected) = match Startup::from_args(std::env::args_os()) {
        Startup::Run {
            config,
            log_level,
            rejected,
        } => (config, log_level, rejected),
        Startup::Exit(e) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
    };

    // Логи идут в stderr, stdout остаётся за баннером и сессией
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if let Some(e) = rejected {
        let _ = e.print();
        warn!("ignoring command-line arguments, using defaults");
    }

    let mut session = Session::new(config);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    // Статус цикла не влияет на код выхода
    match run_with(&mut stdin.lock(), &mut stdout, &mut session) {
        Ok(status) => debug!(status, "expression loop returned"),
        Err(e) => warn!(error = %e, "failed to write banner"),
    }

    ExitCode::SUCCESS
}
