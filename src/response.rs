//! Decoding of `/query` response bodies.
//!
//! A response is shaped `{"results": [{"series": [{name, columns,
//! values}]}]}`. Only the first entry of `results` is decoded; running
//! several statements in one request is out of scope and the extra result
//! sets are ignored.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value as Json;

use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    #[serde(default)]
    series: Vec<RawSeries>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSeries {
    #[serde(default)]
    name: String,
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    values: Vec<Vec<Json>>,
}

/// One row of a series: column name mapped to its JSON value.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    values: BTreeMap<String, Json>,
}

impl Row {
    /// Get a value by column name.
    pub fn get(&self, column: &str) -> Option<&Json> {
        self.values.get(column)
    }

    /// Get a column as a string slice.
    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.values.get(column).and_then(Json::as_str)
    }

    /// Get a column as f64.
    pub fn get_f64(&self, column: &str) -> Option<f64> {
        self.values.get(column).and_then(Json::as_f64)
    }

    /// Get a column as i64.
    pub fn get_i64(&self, column: &str) -> Option<i64> {
        self.values.get(column).and_then(Json::as_i64)
    }

    /// Get a column as bool.
    pub fn get_bool(&self, column: &str) -> Option<bool> {
        self.values.get(column).and_then(Json::as_bool)
    }

    /// Iterate over column/value pairs in ascending column-name order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Json)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// One named series from a query result, with a [`Row`] per returned
/// value row.
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    /// The series (measurement) name.
    pub name: String,
    /// The rows, in response order.
    pub rows: Vec<Row>,
}

/// Decode a query response body into its series.
///
/// Zips each series' `columns` against each entry of `values` to build
/// one [`Row`] per value row. A missing or empty `series` array yields an
/// empty vec. A server-side `error` on the first result surfaces as
/// [`Error::QueryFailed`] with the server's message.
pub fn decode(body: &str) -> Result<Vec<Series>> {
    let response: QueryResponse = serde_json::from_str(body)?;

    let first = match response.results.into_iter().next() {
        Some(result) => result,
        None => return Ok(Vec::new()),
    };

    if let Some(message) = first.error {
        return Err(Error::QueryFailed { message });
    }

    let series = first
        .series
        .into_iter()
        .map(|raw| Series {
            name: raw.name,
            rows: raw
                .values
                .into_iter()
                .map(|row| Row {
                    values: raw.columns.iter().cloned().zip(row).collect(),
                })
                .collect(),
        })
        .collect();

    Ok(series)
}
