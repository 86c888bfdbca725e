//! The `Measurement` data point and its time source.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};

use crate::value::FieldValue;

/// A source of "now", injected into measurements that are constructed
/// without an explicit timestamp so tests can pin the instant.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// [`Clock`] backed by the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Timestamp input for a measurement: either whole seconds since the Unix
/// epoch or an explicit instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timestamp {
    /// Seconds since the Unix epoch.
    Epoch(i64),
    /// An explicit instant.
    Instant(DateTime<Utc>),
}

impl Timestamp {
    /// Resolve to an instant. Epoch inputs are whole seconds.
    pub(crate) fn to_instant(self) -> DateTime<Utc> {
        match self {
            Timestamp::Epoch(secs) => Utc
                .timestamp_opt(secs, 0)
                .single()
                .unwrap_or_else(|| DateTime::<Utc>::UNIX_EPOCH),
            Timestamp::Instant(t) => t,
        }
    }
}

impl From<i64> for Timestamp {
    fn from(secs: i64) -> Self {
        Timestamp::Epoch(secs)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(t: DateTime<Utc>) -> Self {
        Timestamp::Instant(t)
    }
}

/// One data point: a name, optional tags, one or more fields, and a
/// timestamp.
///
/// Tags are kept sorted by key; fields keep the caller's insertion order.
/// A measurement without fields cannot be encoded.
///
/// # Example
///
/// ```ignore
/// use influxdb_sync::Measurement;
///
/// let m = Measurement::new("temperature")
///     .tag("location", "groningen")
///     .field("value", 21.3)
///     .timestamp(1476107241);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    name: String,
    tags: BTreeMap<String, String>,
    fields: Vec<(String, FieldValue)>,
    timestamp: DateTime<Utc>,
}

impl Measurement {
    /// Create a new measurement stamped with the current system time.
    ///
    /// Use [`Measurement::timestamp`] to set an explicit time, or
    /// [`Measurement::with_clock`] to control the default instant.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_clock(name, &SystemClock)
    }

    /// Create a new measurement stamped from the given clock.
    pub fn with_clock(name: impl Into<String>, clock: &dyn Clock) -> Self {
        Self {
            name: name.into(),
            tags: BTreeMap::new(),
            fields: Vec::new(),
            timestamp: clock.now(),
        }
    }

    /// Add a tag. Tag keys are unique; re-adding a key replaces its value.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Add a field. Field keys are unique; re-adding a key replaces its
    /// value in place, keeping the original position.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
        self
    }

    /// Set the timestamp from epoch seconds or an explicit instant.
    pub fn timestamp(mut self, ts: impl Into<Timestamp>) -> Self {
        self.timestamp = ts.into().to_instant();
        self
    }

    /// The measurement name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tags in ascending key order.
    pub fn tags(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether the measurement carries at least one field.
    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }

    /// The timestamp as whole seconds since the Unix epoch.
    pub fn epoch_seconds(&self) -> i64 {
        self.timestamp.timestamp()
    }
}
