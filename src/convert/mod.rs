// src/convert/mod.rs
use csv::{ReaderBuilder, StringRecord};
use std::{
    fs::File,
    io::{BufReader, Read, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

use crate::error::{ConvertError, Result};
use crate::schema::{ColumnKind, ColumnTypes};

pub mod output;
pub mod sql;

use output::StagedOutput;
use sql::{STATEMENT_TERMINATOR, TUPLE_SEPARATOR};

/// Knobs for a conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Field separator of the input. `;` unless told otherwise.
    pub delimiter: u8,
    pub column_types: ColumnTypes,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            column_types: ColumnTypes::default(),
        }
    }
}

/// What a finished conversion produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Empty for in-memory conversions.
    pub output: PathBuf,
    pub table: String,
    pub columns: Vec<String>,
    pub rows: u64,
    /// Values in numeric columns that don't look like numbers (written verbatim anyway).
    pub suspicious_numeric: u64,
}

/// Turns `;`-separated records into one `INSERT` statement.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert `input` into `output`, creating or replacing it.
    ///
    /// The output only appears once the whole statement has been written; on
    /// any error an existing file at `output` is left as it was.
    #[tracing::instrument(
        level = "info",
        skip(self, input, output),
        fields(input = %input.as_ref().display(), output = %output.as_ref().display())
    )]
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
        table: &str,
    ) -> Result<Report> {
        let input = input.as_ref();
        let file = File::open(input).map_err(|e| ConvertError::open(input, e))?;
        if file.metadata().map(|m| m.is_dir()).unwrap_or(false) {
            return Err(ConvertError::FileNotFound {
                path: input.to_path_buf(),
            });
        }

        // header first, so a bad input never creates the output
        let mut rows = self.reader(BufReader::new(file));
        let columns = read_header(&mut rows)?;

        let mut staged = StagedOutput::create(output)?;
        let target = staged.target().to_path_buf();
        let mut report =
            self.write_statement(&mut rows, columns, table, staged.writer(), &target)?;
        staged.commit()?;

        report.output = target;
        info!(table = %report.table, rows = report.rows, "wrote {}", report.output.display());
        Ok(report)
    }

    /// Stream a conversion from any reader into any writer.
    pub fn convert_to_writer<R: Read, W: Write>(
        &self,
        input: R,
        table: &str,
        mut out: W,
    ) -> Result<Report> {
        let mut rows = self.reader(input);
        let columns = read_header(&mut rows)?;
        let sink = PathBuf::new();
        let report = self.write_statement(&mut rows, columns, table, &mut out, &sink)?;
        out.flush().map_err(|e| ConvertError::io(&sink, e))?;
        Ok(report)
    }

    /// In-memory convenience around [`Converter::convert_to_writer`].
    pub fn convert_str(&self, input: &str, table: &str) -> Result<String> {
        let mut buf = Vec::with_capacity(input.len() * 2);
        self.convert_to_writer(input.as_bytes(), table, &mut buf)?;
        String::from_utf8(buf).map_err(|e| ConvertError::Unknown(e.to_string()))
    }

    fn reader<R: Read>(&self, input: R) -> csv::Reader<R> {
        ReaderBuilder::new()
            .has_headers(false)
            .delimiter(self.options.delimiter)
            // field counts are checked against the header below, with row numbers
            .flexible(true)
            .from_reader(input)
    }

    fn write_statement<R: Read, W: Write + ?Sized>(
        &self,
        rows: &mut csv::Reader<R>,
        columns: Vec<String>,
        table: &str,
        out: &mut W,
        target: &Path,
    ) -> Result<Report> {
        let kinds = self.options.column_types.resolve(&columns);
        let numeric: Vec<usize> = kinds
            .iter()
            .enumerate()
            .filter(|(_, k)| **k == ColumnKind::Numeric)
            .map(|(i, _)| i)
            .collect();
        debug!(?columns, numeric = numeric.len(), "resolved column kinds");

        let io_err = |e: std::io::Error| ConvertError::io(target, e);
        let prologue = sql::insert_prologue(table, &columns);
        out.write_all(prologue.as_bytes()).map_err(io_err)?;

        let mut report = Report {
            output: PathBuf::new(),
            table: table.to_string(),
            columns,
            rows: 0,
            suspicious_numeric: 0,
        };

        let mut record = StringRecord::new();
        while rows.read_record(&mut record)? {
            // header is line 1
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(report.rows + 2);
            check_width(&record, report.columns.len(), line)?;

            for &i in &numeric {
                let raw = &record[i];
                if !sql::looks_numeric(raw) {
                    warn!(
                        line,
                        column = %report.columns[i],
                        value = raw,
                        "non-numeric value in numeric column, writing it unquoted"
                    );
                    report.suspicious_numeric += 1;
                }
            }

            if report.rows > 0 {
                out.write_all(TUPLE_SEPARATOR.as_bytes()).map_err(io_err)?;
            }
            let tuple = sql::format_tuple(record.iter(), &kinds);
            out.write_all(tuple.as_bytes()).map_err(io_err)?;
            report.rows += 1;
        }
        out.write_all(STATEMENT_TERMINATOR.as_bytes()).map_err(io_err)?;

        debug!(rows = report.rows, "statement complete");
        Ok(report)
    }
}

/// One-shot conversion with the default options (`;` separator, `status`/`rate` unquoted).
pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    table: &str,
) -> Result<Report> {
    Converter::default().convert_file(input, output, table)
}

fn read_header<R: Read>(rows: &mut csv::Reader<R>) -> Result<Vec<String>> {
    let mut record = StringRecord::new();
    if !rows.read_record(&mut record)? {
        return Err(ConvertError::MalformedInput("input has no header row".to_string()));
    }
    // blank lines are skipped by the reader, but the header must be line 1
    let line = record.position().map(|p| p.line()).unwrap_or(1);
    if line != 1 {
        return Err(ConvertError::MalformedInput(format!(
            "header row is blank (first record is on line {})",
            line
        )));
    }
    let columns: Vec<String> = record
        .iter()
        .map(|c| c.trim_start_matches('\u{feff}').to_string())
        .collect();
    if columns.iter().all(|c| c.trim().is_empty()) {
        return Err(ConvertError::MalformedInput("header row has no column names".to_string()));
    }
    Ok(columns)
}

fn check_width(record: &StringRecord, expected: usize, line: u64) -> Result<()> {
    match record.len() {
        n if n < expected => Err(ConvertError::MalformedInput(format!(
            "line {}: only {} of {} columns have a value",
            line, n, expected
        ))),
        n if n > expected => Err(ConvertError::MalformedInput(format!(
            "line {}: {} fields but the header names {} columns",
            line, n, expected
        ))),
        _ => Ok(()),
    }
}
