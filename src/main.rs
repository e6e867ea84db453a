use anyhow::{bail, Context, Result};
use clap::Parser;
use csvinsert::{
    schema::load_column_types, ColumnTypes, ConvertError, ConvertOptions, Converter,
};
use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Convert a `;`-separated CSV file into a single SQL INSERT statement.
///
/// Any positional value left out is asked for on stdin.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input CSV file path.
    input: Option<PathBuf>,

    /// Output SQL file path (created or overwritten).
    output: Option<PathBuf>,

    /// Table name, inserted verbatim.
    table: Option<String>,

    /// Column-type descriptor (YAML, or JSON by extension).
    #[arg(long, value_name = "FILE", conflicts_with_all = ["numeric", "text_only"])]
    types: Option<PathBuf>,

    /// Columns written unquoted; replaces the default `status`, `rate`.
    #[arg(long = "numeric", value_name = "COLUMN", conflicts_with = "text_only")]
    numeric: Vec<String>,

    /// Quote every column.
    #[arg(long)]
    text_only: bool,

    /// Field separator.
    #[arg(long, default_value_t = ';')]
    delimiter: char,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // ─── init logging (stderr, so stdout only carries status lines) ───
    let default_filter = if args.debug { "debug" } else { "warn" };
    let env =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    match run(args, &mut stdin.lock(), &mut io::stdout()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

/// Prompt for whatever `args` left out, convert, and print one status line to `out`.
fn run<R: BufRead, W: Write>(args: Args, stdin: &mut R, out: &mut W) -> Result<()> {
    let options = match build_options(&args) {
        Ok(options) => options,
        Err(err) => {
            if let Some((path, cause)) = descriptor_failure(&args, &err) {
                report_failure(out, path, cause)?;
            }
            return Err(err);
        }
    };

    let input = match args.input {
        Some(p) => p,
        None => PathBuf::from(prompt(stdin, out, "Enter input CSV file path: ")?),
    };
    let output = match args.output {
        Some(p) => p,
        None => PathBuf::from(prompt(stdin, out, "Enter output SQL file path: ")?),
    };
    let table = match args.table {
        Some(t) => t,
        None => prompt(stdin, out, "Enter table name: ")?,
    };

    if !input.exists() {
        writeln!(out, "Error: Input file '{}' not found", input.display())?;
        bail!("input {} does not exist", input.display());
    }

    let converter = Converter::new(options);
    debug!(
        delimiter = %char::from(converter.options().delimiter),
        numeric = ?converter.options().column_types.numeric_columns().collect::<Vec<_>>(),
        "converting"
    );
    match converter.convert_file(&input, &output, &table) {
        Ok(report) => {
            info!(
                table = %report.table,
                rows = report.rows,
                columns = report.columns.len(),
                suspicious = report.suspicious_numeric,
                "conversion finished"
            );
            writeln!(
                out,
                "Successfully converted CSV to SQL INSERT statements. Output saved to {}",
                report.output.display()
            )?;
            Ok(())
        }
        Err(err) => {
            report_failure(out, &input, &err)?;
            Err(err).with_context(|| format!("converting {}", input.display()))
        }
    }
}

fn build_options(args: &Args) -> Result<ConvertOptions> {
    let delimiter = u8::try_from(args.delimiter)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| {
            format!(
                "delimiter {:?} must be a single ASCII character",
                args.delimiter
            )
        })?;

    let column_types = if let Some(path) = &args.types {
        load_column_types(path).context("loading column types")?
    } else if args.text_only {
        ColumnTypes::text_only()
    } else if !args.numeric.is_empty() {
        ColumnTypes::with_numeric(args.numeric.iter().cloned())
    } else {
        ColumnTypes::default()
    };

    Ok(ConvertOptions {
        delimiter,
        column_types,
    })
}

/// The descriptor path and its error, when `err` came from loading `--types`.
fn descriptor_failure<'a>(
    args: &'a Args,
    err: &'a anyhow::Error,
) -> Option<(&'a Path, &'a ConvertError)> {
    let path = args.types.as_deref()?;
    err.downcast_ref::<ConvertError>().map(|cause| (path, cause))
}

fn report_failure<W: Write>(out: &mut W, path: &Path, err: &ConvertError) -> io::Result<()> {
    match err {
        ConvertError::FileNotFound { .. } => {
            writeln!(out, "Error: File not found - {}", path.display())
        }
        other => writeln!(out, "An error occurred: {}", other),
    }
}

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> Result<String> {
    write!(out, "{}", label)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("no value given for {:?}", label.trim_end_matches(": "));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
