//! Write inputs and the shared write capability.
//!
//! Everything that can be written (a single point, a prepared batch, or a
//! template expanded over many rows) is a [`WriteInput`] variant. Both
//! [`Client`](crate::Client) and [`Session`](crate::Session) expose the
//! same `write` surface through [`WriteSink`], which expands the input
//! once and delegates to the implementor's delivery method.

use crate::error::{Error, Result};
use crate::measurement::{Clock, Measurement, SystemClock, Timestamp};
use crate::value::FieldValue;

/// Shared name and tag set for a batch of points that differ only in
/// fields and timestamps.
///
/// # Example
///
/// ```ignore
/// use influxdb_sync::{BatchTemplate, TemplateRow, WriteInput};
///
/// let template = BatchTemplate::new("temperature")
///     .tag("location", "groningen")
///     .tag("sensor_type", "ni1000");
///
/// let input = WriteInput::template(template, vec![
///     TemplateRow::new().field("value", 21.3).timestamp(1475845863),
///     TemplateRow::new().field("value", 20.1).timestamp(1475846182),
/// ]);
/// ```
#[derive(Clone, Debug)]
pub struct BatchTemplate {
    name: String,
    tags: Vec<(String, String)>,
}

impl BatchTemplate {
    /// Create a template with the given measurement name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
        }
    }

    /// Add a tag shared by every expanded measurement.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }
}

/// One row of a template batch: its fields and an optional explicit
/// timestamp. Rows without a timestamp are stamped at expansion time.
#[derive(Clone, Debug, Default)]
pub struct TemplateRow {
    fields: Vec<(String, FieldValue)>,
    timestamp: Option<Timestamp>,
}

impl TemplateRow {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Set the row timestamp.
    pub fn timestamp(mut self, ts: impl Into<Timestamp>) -> Self {
        self.timestamp = Some(ts.into());
        self
    }
}

/// Input accepted by every write entry point.
#[derive(Clone, Debug)]
pub enum WriteInput {
    /// One measurement.
    Single(Measurement),
    /// A prepared batch, written in order.
    Batch(Vec<Measurement>),
    /// A template expanded over rows, one measurement per row.
    Template {
        /// Shared name and tags.
        template: BatchTemplate,
        /// Per-point fields and timestamps.
        rows: Vec<TemplateRow>,
    },
}

impl WriteInput {
    /// Template-batch input.
    pub fn template(template: BatchTemplate, rows: Vec<TemplateRow>) -> Self {
        WriteInput::Template { template, rows }
    }

    /// Expand into measurements, stamping template rows without an
    /// explicit timestamp from the system clock.
    pub fn into_measurements(self) -> Result<Vec<Measurement>> {
        self.into_measurements_with_clock(&SystemClock)
    }

    /// Expand into measurements with an explicit clock.
    pub fn into_measurements_with_clock(self, clock: &dyn Clock) -> Result<Vec<Measurement>> {
        match self {
            WriteInput::Single(measurement) => Ok(vec![measurement]),
            WriteInput::Batch(measurements) => Ok(measurements),
            WriteInput::Template { template, rows } => {
                if rows.is_empty() {
                    return Err(Error::InvalidInput(format!(
                        "template batch for '{}' has no rows",
                        template.name
                    )));
                }

                let mut measurements = Vec::with_capacity(rows.len());
                for (index, row) in rows.into_iter().enumerate() {
                    if row.fields.is_empty() {
                        return Err(Error::InvalidInput(format!(
                            "template row {} for '{}' has no fields",
                            index, template.name
                        )));
                    }

                    let mut measurement = Measurement::with_clock(&template.name, clock);
                    for (key, value) in &template.tags {
                        measurement = measurement.tag(key.clone(), value.clone());
                    }
                    for (key, value) in row.fields {
                        measurement = measurement.field(key, value);
                    }
                    if let Some(ts) = row.timestamp {
                        measurement = measurement.timestamp(ts);
                    }
                    measurements.push(measurement);
                }
                Ok(measurements)
            }
        }
    }
}

impl From<Measurement> for WriteInput {
    fn from(measurement: Measurement) -> Self {
        WriteInput::Single(measurement)
    }
}

impl From<Vec<Measurement>> for WriteInput {
    fn from(measurements: Vec<Measurement>) -> Self {
        WriteInput::Batch(measurements)
    }
}

/// A destination measurements can be written to.
///
/// Implementors provide [`WriteSink::deliver`]; the `write` methods expand
/// the input and delegate to it. A [`Client`](crate::Client) delivers
/// straight to its connection, a [`Session`](crate::Session) appends to
/// its buffer.
pub trait WriteSink {
    /// Accept an expanded batch along with an optional retention-policy
    /// override for this write.
    fn deliver(
        &mut self,
        batch: Vec<Measurement>,
        retention_policy: Option<String>,
    ) -> Result<()>;

    /// Write a measurement, batch, or template expansion.
    fn write(&mut self, input: impl Into<WriteInput>) -> Result<()>
    where
        Self: Sized,
    {
        let batch = input.into().into_measurements()?;
        self.deliver(batch, None)
    }

    /// Write with a retention-policy override taking precedence over any
    /// session-level or connection-level policy.
    fn write_with_retention_policy(
        &mut self,
        input: impl Into<WriteInput>,
        retention_policy: impl Into<String>,
    ) -> Result<()>
    where
        Self: Sized,
    {
        let batch = input.into().into_measurements()?;
        self.deliver(batch, Some(retention_policy.into()))
    }
}
