//! Interactive prompts.
//!
//! All prompting goes through a [`Console`] session so the flow can be driven
//! from stdin or from a scripted buffer. Every prompt takes an optional
//! override; when one is given nothing is read.

use std::io::{self, BufRead, IsTerminal, Write};

use tracing::{debug, warn};

use crate::{plot::PlotType, records::COLUMNS};

pub const DEFAULT_CSV: &str = "import.csv";
pub const DEFAULT_DELIMITER: u8 = b',';

pub struct Console<R, W> {
    input: R,
    output: W,
    terminal: bool,
}

impl Console<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        let output = io::stdout();
        let terminal = output.is_terminal();
        Self {
            input: io::stdin().lock(),
            output,
            terminal,
        }
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// Session over arbitrary streams. [`Console::clear`] is a no-op on these.
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            terminal: false,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn clear(&mut self) -> io::Result<()> {
        if self.terminal {
            write!(self.output, "\x1b[2J\x1b[1;1H")?;
            self.output.flush()?;
        }
        Ok(())
    }

    pub fn print_header(&mut self) -> io::Result<()> {
        let title = format!(" {} v{} ", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        writeln!(self.output, "{title}")?;
        writeln!(self.output, "{}", "=".repeat(title.len()))?;
        writeln!(self.output)
    }

    pub fn print_format_info(&mut self) -> io::Result<()> {
        writeln!(self.output, "Please provide a CSV file with the following columns:")?;
        writeln!(self.output, "{}.", COLUMNS.join(", "))?;
        writeln!(self.output, "The file should ideally be comma-separated.")?;
        writeln!(self.output)
    }

    pub fn println(&mut self, line: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.output, "{line}")
    }

    /// Asks `question` and returns the answer without its line ending.
    /// End of input reads as an empty answer.
    pub fn prompt(&mut self, question: &str) -> io::Result<String> {
        writeln!(self.output)?;
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        let answer = line.trim_end_matches(['\n', '\r']).to_owned();
        debug!(question, %answer, "prompt");
        Ok(answer)
    }

    fn answer(&mut self, given: Option<&str>, question: &str) -> io::Result<String> {
        match given {
            Some(given) => Ok(given.to_owned()),
            None => self.prompt(question),
        }
    }

    pub fn csv_filename(&mut self, given: Option<&str>) -> io::Result<String> {
        let raw = self.answer(
            given,
            &format!("Input csv filename (enter for '{DEFAULT_CSV}'): "),
        )?;
        Ok(resolve_name(&raw, DEFAULT_CSV, ".csv"))
    }

    pub fn delimiter(&mut self, given: Option<&str>) -> io::Result<u8> {
        let raw = self.answer(
            given,
            "Enter the delimiter used in the CSV file (',' for comma, ';' for semicolon, default is ','): ",
        )?;
        Ok(resolve_delimiter(&raw))
    }

    pub fn plot_type(&mut self, given: Option<&str>) -> io::Result<PlotType> {
        let raw = match given {
            Some(given) => given.to_owned(),
            None => {
                writeln!(self.output)?;
                writeln!(self.output, "Choose a plot type:")?;
                for plot in [PlotType::Scatter, PlotType::Density, PlotType::Lines, PlotType::All] {
                    writeln!(self.output, "{}. {}", plot.code(), plot)?;
                }
                self.prompt("Enter the number of the plot type (default is 1): ")?
            }
        };

        let plot = PlotType::from_code(&raw);
        if !raw.is_empty() && plot.code().to_string() != raw {
            warn!(code = %raw, "unrecognized plot type, using {plot}");
        }
        Ok(plot)
    }

    pub fn html_filename(&mut self, given: Option<&str>, default: &str) -> io::Result<String> {
        let raw = self.answer(
            given,
            &format!("Output html filename (enter for '{default}'): "),
        )?;
        Ok(resolve_name(&raw, default, ".html"))
    }
}

/// Substitutes `default` for an empty answer and makes sure the name ends in `suffix`.
pub fn resolve_name(raw: &str, default: &str, suffix: &str) -> String {
    if raw.is_empty() {
        default.to_owned()
    } else if raw.ends_with(suffix) {
        raw.to_owned()
    } else {
        format!("{raw}{suffix}")
    }
}

/// Only `,` and `;` are accepted; anything else is a comma.
pub fn resolve_delimiter(raw: &str) -> u8 {
    match raw {
        ";" => b';',
        _ => DEFAULT_DELIMITER,
    }
}
