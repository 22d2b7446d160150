use clap::Parser;
use tracing_subscriber::EnvFilter;

use gh_script_install::cli::{self, Args};
use gh_script_install::error::{exit_code_for, InstallError};
use gh_script_install::installer;

#[tokio::main]
async fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // Help goes to stdout, parse errors with usage to stderr
            let _ = e.print();
            std::process::exit(cli::parse_error_exit_code(e.kind()));
        }
    };

    // Initialize tracing. Diagnostics go to stderr so stdout stays with the install script
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = installer::install(args).await {
        tracing::error!("{:#}", e);
        if e.downcast_ref::<InstallError>().is_some_and(InstallError::is_usage) {
            eprintln!("{}", cli::usage());
        }
        std::process::exit(exit_code_for(&e));
    }
}
