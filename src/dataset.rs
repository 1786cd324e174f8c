//! Training data files
//!
//! Two formats, picked by extension: `.csv` (the Kaggle export and
//! spreadsheet uploads) and JSON lines for everything else.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use csv::StringRecord;

use crate::models::{FeatureRecord, FeatureValue, TrainingRow, FEATURE_COLUMNS};

const SCORE_COLUMN: &str = "exam_score";

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("dataset I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: invalid {column} value '{value}'")]
    Field {
        line: usize,
        column: String,
        value: String,
    },

    #[error("missing column '{0}'")]
    MissingColumn(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    JsonLines,
}

impl Format {
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Format::Csv,
            _ => Format::JsonLines,
        }
    }
}

/// One row of an uploaded class list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassRow {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub features: FeatureRecord,
}

pub fn read_rows(path: &Path) -> Result<Vec<TrainingRow>, DatasetError> {
    let rows = match Format::of(path) {
        Format::Csv => read_csv(File::open(path)?)?,
        Format::JsonLines => read_jsonl(path)?,
    };
    tracing::debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Write rows to `path`, truncating any existing file.
pub fn write_rows(path: &Path, rows: &[TrainingRow]) -> Result<(), DatasetError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let writer = BufWriter::new(File::create(path)?);
    match Format::of(path) {
        Format::Csv => write_csv(writer, rows)?,
        Format::JsonLines => write_jsonl(writer, rows)?,
    }

    tracing::info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn read_jsonl(path: &Path) -> Result<Vec<TrainingRow>, DatasetError> {
    let reader = BufReader::new(File::open(path)?);
    let mut rows = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = serde_json::from_str(&line).map_err(|source| DatasetError::Parse { line: idx + 1, source })?;
        rows.push(row);
    }

    Ok(rows)
}

fn write_jsonl<W: Write>(mut writer: W, rows: &[TrainingRow]) -> Result<(), DatasetError> {
    for row in rows {
        serde_json::to_writer(&mut writer, row).map_err(io::Error::from)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// `Hours_Studied ` and `hours_studied` name the same column.
pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

/// Training rows from CSV. Columns that are not features are ignored;
/// `exam_score` is required.
pub fn read_csv<R: Read>(input: R) -> Result<Vec<TrainingRow>, DatasetError> {
    let (mut reader, headers) = csv_reader(input)?;
    let score_idx = headers
        .iter()
        .position(|h| h == SCORE_COLUMN)
        .ok_or(DatasetError::MissingColumn(SCORE_COLUMN))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = line_of(&record);
        let raw = record.get(score_idx).unwrap_or_default();
        let exam_score = raw.parse().map_err(|_| field_error(line, SCORE_COLUMN, raw))?;

        rows.push(TrainingRow {
            features: features_of(&headers, &record)?,
            exam_score,
        });
    }
    Ok(rows)
}

/// Class list from CSV: optional `first_name` / `last_name` plus any
/// feature columns.
pub fn read_class_list<R: Read>(input: R) -> Result<Vec<ClassRow>, DatasetError> {
    let (mut reader, headers) = csv_reader(input)?;
    let cell = |record: &StringRecord, name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .and_then(|idx| record.get(idx))
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(ClassRow {
            first_name: cell(&record, "first_name"),
            last_name: cell(&record, "last_name"),
            features: features_of(&headers, &record)?,
        });
    }
    Ok(rows)
}

pub fn write_csv<W: Write>(output: W, rows: &[TrainingRow]) -> Result<(), DatasetError> {
    let mut writer = csv::Writer::from_writer(output);

    let mut header = FEATURE_COLUMNS.to_vec();
    header.push(SCORE_COLUMN);
    writer.write_record(&header)?;

    for row in rows {
        let mut cells: Vec<String> = FEATURE_COLUMNS
            .iter()
            .map(|column| match row.features.value(column) {
                Some(FeatureValue::Numeric(v)) => v.map(|n| n.to_string()).unwrap_or_default(),
                Some(FeatureValue::Categorical(v)) => v.unwrap_or_default().to_string(),
                None => String::new(),
            })
            .collect();
        cells.push(row.exam_score.to_string());
        writer.write_record(&cells)?;
    }

    writer.flush()?;
    Ok(())
}

fn csv_reader<R: Read>(input: R) -> Result<(csv::Reader<R>, Vec<String>), DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);
    let headers = reader.headers()?.iter().map(normalize_header).collect();
    Ok((reader, headers))
}

fn features_of(headers: &[String], record: &StringRecord) -> Result<FeatureRecord, DatasetError> {
    let mut features = FeatureRecord::default();
    for (column, raw) in headers.iter().zip(record.iter()) {
        features
            .set_raw(column, raw)
            .map_err(|_| field_error(line_of(record), column, raw))?;
    }
    Ok(features)
}

fn line_of(record: &StringRecord) -> usize {
    record.position().map_or(0, |p| p.line() as usize)
}

fn field_error(line: usize, column: &str, value: &str) -> DatasetError {
    DatasetError::Field {
        line,
        column: column.to_string(),
        value: value.to_string(),
    }
}
