//! Line-protocol encoding for the InfluxDB 1.x `/write` endpoint.
//!
//! A measurement serializes to one text line:
//!
//! ```text
//! <name>[,<tag-key>=<tag-value>...] <field-key>=<field-value>[,...] <timestamp>
//! ```
//!
//! Tags are emitted in ascending key order, fields in insertion order, and
//! the timestamp is scaled to the requested precision.

use std::fmt::Write as _;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::measurement::Measurement;
use crate::value::FieldValue;

/// Timestamp precision for writes and for the query `epoch` parameter.
///
/// The wire names are `ns`, `u`, `ms`, `s`, `m`, and `h`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Precision {
    /// Nanoseconds.
    Nanoseconds,
    /// Microseconds.
    Microseconds,
    /// Milliseconds.
    Milliseconds,
    /// Seconds. The default.
    #[default]
    Seconds,
    /// Minutes.
    Minutes,
    /// Hours.
    Hours,
}

impl Precision {
    /// The wire name of this unit.
    pub fn as_str(&self) -> &'static str {
        match self {
            Precision::Nanoseconds => "ns",
            Precision::Microseconds => "u",
            Precision::Milliseconds => "ms",
            Precision::Seconds => "s",
            Precision::Minutes => "m",
            Precision::Hours => "h",
        }
    }

    /// Scale whole epoch seconds to this unit.
    ///
    /// Sub-second units multiply exactly; minutes and hours divide with
    /// floor semantics. The historical decimal approximations (0.017 for
    /// minutes, 0.000278 for hours) drift over time and are not
    /// reproduced.
    pub fn scale(&self, epoch_seconds: i64) -> i64 {
        match self {
            Precision::Nanoseconds => epoch_seconds * 1_000_000_000,
            Precision::Microseconds => epoch_seconds * 1_000_000,
            Precision::Milliseconds => epoch_seconds * 1_000,
            Precision::Seconds => epoch_seconds,
            Precision::Minutes => epoch_seconds.div_euclid(60),
            Precision::Hours => epoch_seconds.div_euclid(3600),
        }
    }
}

impl FromStr for Precision {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        match input {
            "ns" => Ok(Self::Nanoseconds),
            "u" => Ok(Self::Microseconds),
            "ms" => Ok(Self::Milliseconds),
            "s" => Ok(Self::Seconds),
            "m" => Ok(Self::Minutes),
            "h" => Ok(Self::Hours),
            _ => Err(Error::Config(format!(
                "unknown precision '{}', expected one of ns, u, ms, s, m, h",
                input
            ))),
        }
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Append `s` to `dst`, backslash-escaping every character the predicate
/// marks as special for the current position in the line.
fn push_escaped(dst: &mut String, s: &str, is_special: fn(char) -> bool) {
    for c in s.chars() {
        if is_special(c) {
            dst.push('\\');
        }
        dst.push(c);
    }
}

/// Special characters in the measurement name position.
fn special_in_name(c: char) -> bool {
    c == ',' || c == ' '
}

/// Special characters in tag keys, tag values, and field keys.
fn special_in_key(c: char) -> bool {
    c == ',' || c == '=' || c == ' '
}

/// Append a field value in its wire form: strings double-quoted with inner
/// quotes escaped, numbers and booleans verbatim.
fn push_field_value(dst: &mut String, value: &FieldValue) {
    match value {
        FieldValue::String(s) => {
            dst.push('"');
            for c in s.chars() {
                if c == '"' {
                    dst.push('\\');
                }
                dst.push(c);
            }
            dst.push('"');
        }
        FieldValue::Float(f) => {
            let v = f.into_inner();
            // Whole floats keep a trailing .0 so they stay floats on the
            // wire, distinct from integer fields.
            if v.is_finite() && v.fract() == 0.0 {
                let _ = write!(dst, "{:.1}", v);
            } else {
                let _ = write!(dst, "{}", v);
            }
        }
        FieldValue::Integer(i) => {
            let _ = write!(dst, "{}", i);
        }
        FieldValue::Bool(b) => {
            let _ = write!(dst, "{}", b);
        }
    }
}

/// Encode one measurement as a single line at the given precision.
///
/// Fails with [`Error::InvalidMeasurement`] before emitting anything when
/// the measurement has an empty name or no fields.
pub fn encode(measurement: &Measurement, precision: Precision) -> Result<String> {
    if measurement.name().is_empty() {
        return Err(Error::InvalidMeasurement(
            "measurement name must not be empty".to_string(),
        ));
    }
    if !measurement.has_fields() {
        return Err(Error::InvalidMeasurement(format!(
            "measurement '{}' has no fields",
            measurement.name()
        )));
    }

    let mut line = String::new();
    push_escaped(&mut line, measurement.name(), special_in_name);

    for (key, value) in measurement.tags() {
        line.push(',');
        push_escaped(&mut line, key, special_in_key);
        line.push('=');
        push_escaped(&mut line, value, special_in_key);
    }

    line.push(' ');
    let mut first = true;
    for (key, value) in measurement.fields() {
        if !first {
            line.push(',');
        }
        first = false;
        push_escaped(&mut line, key, special_in_key);
        line.push('=');
        push_field_value(&mut line, value);
    }

    let _ = write!(line, " {}", precision.scale(measurement.epoch_seconds()));

    Ok(line)
}

/// Encode a batch of measurements as newline-joined lines, preserving
/// input order.
pub fn encode_batch(measurements: &[Measurement], precision: Precision) -> Result<String> {
    let lines: Vec<String> = measurements
        .iter()
        .map(|m| encode(m, precision))
        .collect::<Result<_>>()?;
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point() -> Measurement {
        Measurement::new("temperature")
            .field("value", 21.3)
            .timestamp(1476107241)
    }

    #[test]
    fn test_simple_measurement() {
        let line = encode(&point(), Precision::Seconds).unwrap();
        assert_eq!(line, "temperature value=21.3 1476107241");
    }

    #[test]
    fn test_tags_sorted_by_key() {
        let m = point().tag("b", "tag").tag("a", "tag");
        let line = encode(&m, Precision::Seconds).unwrap();
        assert_eq!(line, "temperature,a=tag,b=tag value=21.3 1476107241");
    }

    #[test]
    fn test_escaped_measurement_name() {
        let m = Measurement::new("temp er,ature")
            .field("value", 21.3)
            .timestamp(1476107241);
        let line = encode(&m, Precision::Seconds).unwrap();
        assert_eq!(line, "temp\\ er\\,ature value=21.3 1476107241");
    }

    #[test]
    fn test_escaped_tags() {
        let m = point().tag("a,=b ", "a,=b ");
        let line = encode(&m, Precision::Seconds).unwrap();
        assert_eq!(
            line,
            "temperature,a\\,\\=b\\ =a\\,\\=b\\  value=21.3 1476107241"
        );
    }

    #[test]
    fn test_escaped_string_field_value() {
        let m = Measurement::new("temperature")
            .field("value", "well, a pretty nice \"temperature\"")
            .timestamp(1476107241);
        let line = encode(&m, Precision::Seconds).unwrap();
        assert_eq!(
            line,
            "temperature value=\"well, a pretty nice \\\"temperature\\\"\" 1476107241"
        );
    }

    #[test]
    fn test_escaped_field_key() {
        let m = Measurement::new("temperature")
            .field("va lue", 21.3)
            .timestamp(1476107241);
        let line = encode(&m, Precision::Seconds).unwrap();
        assert_eq!(line, "temperature va\\ lue=21.3 1476107241");
    }

    #[test]
    fn test_numeric_and_boolean_fields_unquoted() {
        let m = Measurement::new("status")
            .field("count", 42i64)
            .field("load", 0.5)
            .field("up", true)
            .timestamp(0);
        let line = encode(&m, Precision::Seconds).unwrap();
        assert_eq!(line, "status count=42,load=0.5,up=true 0");
    }

    #[test]
    fn test_whole_float_keeps_decimal_point() {
        let m = Measurement::new("temperature")
            .field("value", 25.0)
            .timestamp(1475849823);
        let line = encode(&m, Precision::Seconds).unwrap();
        assert_eq!(line, "temperature value=25.0 1475849823");
    }

    #[test]
    fn test_fields_in_insertion_order() {
        let m = Measurement::new("temperature")
            .field("upper_sensor", 23.2)
            .field("lower_sensor", 20.9)
            .timestamp(1475846182);
        let line = encode(&m, Precision::Seconds).unwrap();
        assert_eq!(
            line,
            "temperature upper_sensor=23.2,lower_sensor=20.9 1475846182"
        );
    }

    #[test]
    fn test_no_fields_rejected() {
        let m = Measurement::new("temperature").timestamp(1476107241);
        assert!(matches!(
            encode(&m, Precision::Seconds),
            Err(Error::InvalidMeasurement(_))
        ));
    }

    #[test]
    fn test_empty_name_rejected() {
        let m = Measurement::new("").field("value", 1i64);
        assert!(matches!(
            encode(&m, Precision::Seconds),
            Err(Error::InvalidMeasurement(_))
        ));
    }

    #[test]
    fn test_batch_joined_with_newlines_in_order() {
        let batch = vec![
            point().field("value", 32.1),
            point().field("value", 21.9).timestamp(1476107319),
        ];
        let body = encode_batch(&batch, Precision::Seconds).unwrap();
        assert_eq!(
            body,
            "temperature value=32.1 1476107241\ntemperature value=21.9 1476107319"
        );
    }

    #[test]
    fn test_timestamp_scaling_per_precision() {
        let secs = 1476107241i64;
        assert_eq!(Precision::Nanoseconds.scale(secs), 1_476_107_241_000_000_000);
        assert_eq!(Precision::Microseconds.scale(secs), 1_476_107_241_000_000);
        assert_eq!(Precision::Milliseconds.scale(secs), 1_476_107_241_000);
        assert_eq!(Precision::Seconds.scale(secs), 1_476_107_241);
        // Exact fractions with floor, not the drifting decimal approximations.
        assert_eq!(Precision::Minutes.scale(secs), 24_601_787);
        assert_eq!(Precision::Hours.scale(secs), 410_029);
    }

    #[test]
    fn test_scaled_timestamp_on_the_line() {
        let line = encode(&point(), Precision::Milliseconds).unwrap();
        assert_eq!(line, "temperature value=21.3 1476107241000");
    }

    #[test]
    fn test_precision_round_trip_names() {
        for name in ["ns", "u", "ms", "s", "m", "h"] {
            let p: Precision = name.parse().unwrap();
            assert_eq!(p.as_str(), name);
        }
    }

    #[test]
    fn test_unknown_precision_is_config_error() {
        let err = "not an epoch".parse::<Precision>().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_default_precision_is_seconds() {
        assert_eq!(Precision::default(), Precision::Seconds);
    }
}
