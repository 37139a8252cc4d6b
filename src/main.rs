use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod console;
mod error;
mod export;
mod figure;
mod plot;
mod records;

/// Generate an interactive map from a CSV file.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Input CSV filename, skips the filename prompt
    #[arg(long)]
    input: Option<String>,

    /// Output HTML filename for a single plot, skips the output prompt
    #[arg(long)]
    output: Option<String>,

    /// Field delimiter, ',' or ';'
    #[arg(long)]
    delimiter: Option<String>,

    /// Plot type: 1 scatter, 2 density, 3 lines, A all
    #[arg(long)]
    plot: Option<String>,

    /// Don't open a single plot in the browser
    #[arg(long)]
    no_show: bool,

    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let config = config::load_or_default(cli.config.as_deref())?;
    let options = app::Options {
        input: cli.input,
        output: cli.output,
        delimiter: cli.delimiter,
        plot: cli.plot,
        no_show: cli.no_show,
    };

    let mut console = console::Console::stdio();
    let result = app::run(&mut console, &options, &config);
    report(result, &mut io::stdout())
}

/// Prints a session error the user caused and ends the run normally; anything
/// else is passed on.
fn report<T>(result: Result<T>, out: &mut impl Write) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e) => match e.downcast_ref::<error::Error>() {
            Some(err) => {
                writeln!(out, "{err}")?;
                Ok(())
            }
            None => Err(e),
        },
    }
}
