//! Batch prediction over uploaded CSV files

use std::collections::HashSet;
use std::io::Cursor;

use ndarray::Array2;
use polars::prelude::*;
use thiserror::Error;

use super::features::{Feature, FEATURE_COUNT};
use super::{Classifier, Diagnosis};

/// Column appended to every annotated file
pub const PREDICTION_COLUMN: &str = "prediction";

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Invalid CSV format: missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("{0}")]
    Processing(String),
}

impl From<PolarsError> for BatchError {
    fn from(err: PolarsError) -> Self {
        BatchError::Processing(err.to_string())
    }
}

/// Parse `content`, predict every row and return the table as CSV text with
/// a trailing `prediction` column. Passthrough columns are kept untouched.
pub fn annotate_csv(model: &dyn Classifier, content: &[u8]) -> Result<String, BatchError> {
    let mut df = read_csv(content)?;
    let columns = resolve_columns(&df)?;
    let matrix = feature_matrix(&df, &columns)?;

    let labels: Vec<&str> = model
        .predict_batch(matrix.view())
        .into_iter()
        .map(|code| Diagnosis::from_class_code(code).label())
        .collect();

    df.with_column(Series::new(PREDICTION_COLUMN.into(), labels))?;

    tracing::debug!(rows = df.height(), columns = df.width(), "Batch annotated");
    write_csv(&mut df)
}

fn read_csv(content: &[u8]) -> Result<DataFrame, BatchError> {
    let reader = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .into_reader_with_file_handle(Cursor::new(content.to_vec()));

    Ok(reader.finish()?)
}

/// Header for each feature, accepting either spelling
fn resolve_columns(df: &DataFrame) -> Result<Vec<String>, BatchError> {
    let present: HashSet<&str> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.as_str())
        .collect();

    let mut resolved = Vec::with_capacity(FEATURE_COUNT);
    let mut missing = Vec::new();

    for feature in Feature::ALL {
        match feature
            .column_spellings()
            .into_iter()
            .find(|name| present.contains(name))
        {
            Some(name) => resolved.push(name.to_string()),
            None => missing.push(feature.column_name().to_string()),
        }
    }

    if missing.is_empty() {
        Ok(resolved)
    } else {
        Err(BatchError::MissingColumns(missing))
    }
}

/// Row-major float matrix of the resolved feature columns
fn feature_matrix(df: &DataFrame, columns: &[String]) -> Result<Array2<f64>, BatchError> {
    let col_data = columns
        .iter()
        .map(|name| -> Result<Vec<f64>, BatchError> {
            let column = df.column(name)?.cast(&DataType::Float64)?;
            column
                .f64()?
                .into_iter()
                .enumerate()
                .map(|(row, value)| {
                    value.ok_or_else(|| {
                        BatchError::Processing(format!(
                            "column '{}' has a missing or non-numeric value at row {}",
                            name,
                            row + 1
                        ))
                    })
                })
                .collect()
        })
        .collect::<Result<Vec<Vec<f64>>, BatchError>>()?;

    Ok(Array2::from_shape_fn((df.height(), columns.len()), |(r, c)| col_data[c][r]))
}

fn write_csv(df: &mut DataFrame) -> Result<String, BatchError> {
    let mut buffer: Vec<u8> = Vec::new();
    CsvWriter::new(&mut buffer).finish(df)?;
    String::from_utf8(buffer).map_err(|e| BatchError::Processing(e.to_string()))
}
