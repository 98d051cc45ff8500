use anyhow::Result;
use quickcap::cli::{self, Command};
use quickcap::config::Config;
use quickcap::context::StandardContext;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::env;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let parsed = cli::parse_args(&args)?;

    if parsed.command == Command::Help {
        cli::print_help("quickcap");
        return Ok(());
    }

    let ctx = StandardContext::new(parsed.root.clone());
    let config = Config::load_or_default(&ctx)?;

    let level = if parsed.verbose {
        LevelFilter::Debug
    } else {
        config.log_filter()
    };
    // Logging is best-effort; a second init or a missing terminal is not fatal.
    let _ = TermLogger::init(
        level,
        ConfigBuilder::new().set_time_level(LevelFilter::Off).build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    let output = cli::run(&parsed.command, &config)?;
    println!("{}", output);
    Ok(())
}
