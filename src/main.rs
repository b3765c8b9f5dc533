use clap::{Arg, ArgAction, Command};
use std::io::IsTerminal;
use std::path::PathBuf;

mod cli;
mod commands;
mod completion;
mod config;
mod database;
mod error;
mod logging;
mod render;

use cli::{Cli, Options};
use completion::engine::DATABASE_FILENAME_SUFFIXES;
use render::OutputMode;

fn main() -> anyhow::Result<()> {
    let matches = Command::new("sqlite-cli-rust")
        .version("0.1.0")
        .about("A commandline interface to SQLite with completion nearly everywhere")
        .arg(
            Arg::new("database")
                .short('d')
                .long("database")
                .value_name("FILE")
                .help("Database file to open at startup"),
        )
        .arg(
            Arg::new("mode")
                .long("mode")
                .value_name("MODE")
                .help("Initial output mode (TABLE, LINE)")
                .default_value("TABLE"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("FILTER")
                .help("Logging filter (stderr). Also supports RUST_LOG.")
                .default_value("info"),
        )
        .arg(
            Arg::new("history")
                .long("history")
                .value_name("FILE")
                .help("Load and save line history in FILE"),
        )
        .arg(
            Arg::new("max-width")
                .long("max-width")
                .value_name("COLUMNS")
                .help("Maximum table width (defaults to $COLUMNS or 80)")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("db-suffix")
                .long("db-suffix")
                .value_name("SUFFIX")
                .help("File name suffix offered by 'use' completion (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Print results without ANSI colours")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("commands")
                .value_name("COMMANDS")
                .help("Commands separated by ';' to run instead of the interactive shell")
                .num_args(0..)
                .trailing_var_arg(true),
        )
        .get_matches();

    let log_handle = logging::init(
        matches
            .get_one::<String>("log-level")
            .map(String::as_str)
            .unwrap_or("info"),
    );

    let max_width = matches
        .get_one::<usize>("max-width")
        .copied()
        .or_else(terminal_columns)
        .unwrap_or(config::DEFAULT_MAX_WIDTH);

    let db_suffixes: Vec<String> = match matches.get_many::<String>("db-suffix") {
        Some(suffixes) => suffixes.cloned().collect(),
        None => DATABASE_FILENAME_SUFFIXES
            .iter()
            .map(|s| s.to_string())
            .collect(),
    };

    let options = Options {
        database: matches.get_one::<String>("database").map(PathBuf::from),
        mode: matches
            .get_one::<String>("mode")
            .map(|m| OutputMode::from_name(m))
            .unwrap_or_default(),
        max_width,
        db_suffixes,
        history: matches.get_one::<String>("history").map(PathBuf::from),
        color: !matches.get_flag("no-color") && std::io::stdout().is_terminal(),
    };

    let mut cli = Cli::new(options, log_handle)?;

    let commands: Vec<&String> = matches
        .get_many::<String>("commands")
        .map(|values| values.collect())
        .unwrap_or_default();

    if commands.is_empty() {
        cli.run()?;
    } else {
        let joined = commands
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        cli.run_batch(&joined)?;
    }

    Ok(())
}

fn terminal_columns() -> Option<usize> {
    std::env::var("COLUMNS").ok()?.trim().parse().ok()
}
