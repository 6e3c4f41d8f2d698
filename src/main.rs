use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use prefix_calc::{CalcError, Calculator, Framing};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_BRANCH"),
    "/",
    env!("GIT_HASH"),
    ")"
);

/// Evaluate arithmetic expressions written in prefix notation.
///
/// With an input file, every line of it is one expression. Without one, each
/// line typed on standard input is evaluated as soon as it is read.
#[derive(Parser, Debug)]
#[command(version = VERSION, about)]
struct Args {
    /// file to read expressions from, one per line
    input: Option<PathBuf>,

    /// file to write results to instead of standard output
    output: Option<PathBuf>,

    /// also register neg, abs, sqrt, ^, %, min, max, pi and e
    #[arg(short = 'x', long)]
    extended: bool,
}

/// Diagnostics go to stderr, and only when `RUST_LOG` asks for them
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true).with_level(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

/// io errors from the filesystem don't name the file, so add it
fn with_path(path: &Path, e: io::Error) -> io::Error {
    io::Error::new(e.kind(), format!("{}: {e}", path.display()))
}

fn run(args: &Args) -> Result<usize, CalcError> {
    let calculator = if args.extended {
        Calculator::new(prefix_calc::extended())
    } else {
        Calculator::default()
    };

    tracing::debug!(operators = ?calculator.operators().symbols(), "calculator ready");

    let mut output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path).map_err(|e| with_path(path, e))?)),
        None => Box::new(io::stdout().lock()),
    };

    match &args.input {
        Some(path) => {
            let input = BufReader::new(File::open(path).map_err(|e| with_path(path, e))?);

            calculator
                .evaluate(input, &mut output, Framing::Line)
                .map_err(|e| match e {
                    CalcError::Syntax(e) => CalcError::Syntax(e.file(path.display().to_string())),
                    e => e,
                })
        }
        None => {
            let mut count = 0;

            // every line is its own stream, so its errors say line 1 until renumbered
            for (n, line) in io::stdin().lock().lines().enumerate() {
                count += calculator
                    .evaluate(Cursor::new(line?), &mut output, Framing::Stream)
                    .map_err(|e| match e {
                        CalcError::Syntax(e) => CalcError::Syntax(e.line(n + 1).file("<stdin>".into())),
                        e => e,
                    })?;
            }

            Ok(count)
        }
    }
}

fn main() -> ExitCode {
    init_tracing();

    let args = Args::parse();

    match run(&args) {
        Ok(count) => {
            tracing::debug!(count, "done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
