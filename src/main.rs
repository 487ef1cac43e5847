use clap::Parser;
use finbot::cli;
use tracing::Level;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let filter_level = if verbose { Level::DEBUG } else { Level::INFO };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(filter_level.into()))
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::time())
        .init();
}

fn main() {
    // Parse early so the verbose flag is known before logging starts
    match cli::Cli::try_parse() {
        Ok(cli) => {
            init_logging(cli.verbose);

            tracing::debug!("Verbose mode enabled");
            tracing::debug!("Starting finbot v{}", env!("CARGO_PKG_VERSION"));

            if let Err(e) = cli::run(cli) {
                eprintln!("error: {:#}", e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            use clap::error::ErrorKind;

            match e.kind() {
                ErrorKind::DisplayVersion | ErrorKind::DisplayHelp => {
                    e.print().ok();
                    std::process::exit(0);
                }
                ErrorKind::InvalidSubcommand => {
                    let message = e.to_string();
                    let command = extract_command_from_error(&message);
                    eprintln!("error: unknown command: {}", command);
                    eprintln!("\nValid commands are: serve, chat, version, help");
                    std::process::exit(1);
                }
                _ => {
                    e.print().ok();
                    std::process::exit(2);
                }
            }
        }
    }
}

fn extract_command_from_error(error_msg: &str) -> &str {
    error_msg
        .find('\'')
        .and_then(|start| {
            let rest = &error_msg[start + 1..];
            rest.find('\'').map(|end| &rest[..end])
        })
        .unwrap_or("unknown")
}
