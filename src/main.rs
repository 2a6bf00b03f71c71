//! `anchornav` - table-of-contents navigation for long documentation pages

use clap::Parser;

use anchornav::cli::args::{Cli, LogFormatArg};
use anchornav::cli::commands;
use anchornav::error::ExitCode;
use anchornav::observability::{LogFormat, init_logging};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // help and version requests print to stdout and exit 0
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(ExitCode::USAGE_ERROR);
        }
    };

    if !cli.quiet {
        let format = match cli.log_format {
            LogFormatArg::Human => LogFormat::Human,
            LogFormatArg::Json => LogFormat::Json,
        };
        init_logging(format, cli.verbose, cli.color);
    }

    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\ninterrupted");
            std::process::exit(ExitCode::INTERRUPTED);
        }
    });

    match commands::dispatch(cli).await {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
