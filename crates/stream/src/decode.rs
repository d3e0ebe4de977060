use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use tview_core::{unix_seconds, DecodeError, Reading, Sample};

/// Naive date-time layouts accepted after RFC 3339 fails. Interpreted in the
/// local time zone, which is what the bundled source emits.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Decode one text frame of the form
/// `{"timestamp": "<ISO-8601>", "value": <number>}` into a [`Sample`].
pub fn decode(text: &str) -> Result<Sample, DecodeError> {
    let reading: Reading = serde_json::from_str(text)?;
    let timestamp = parse_timestamp(&reading.timestamp)?;
    Ok(Sample::new(timestamp, reading.value))
}

/// Parse an ISO-8601 timestamp into unix seconds.
///
/// Offsets (`Z`, `+02:00`) are honoured; naive values and bare dates are
/// taken as local time.
pub fn parse_timestamp(raw: &str) -> Result<f64, DecodeError> {
    let raw = raw.trim();

    if let Ok(zoned) = DateTime::parse_from_rfc3339(raw) {
        return Ok(unix_seconds(&zoned));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| DecodeError::Timestamp(raw.to_string()))?;

    // `earliest` resolves ambiguous wall-clock times; gaps (DST spring-forward)
    // have no local instant and are rejected.
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| DecodeError::Timestamp(raw.to_string()))?;

    Ok(unix_seconds(&local))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_utc_reading() {
        let sample = decode(r#"{"timestamp":"2024-05-01T12:00:00.500Z","value":42}"#).unwrap();
        assert_eq!(sample.value, 42.0);
        assert!((sample.timestamp - 1_714_564_800.5).abs() < 1e-6);
    }

    #[test]
    fn decode_offset_reading() {
        let sample = decode(r#"{"timestamp":"2024-05-01T14:00:00+02:00","value":-1.5}"#).unwrap();
        assert_eq!(sample.timestamp, 1_714_564_800.0);
        assert_eq!(sample.value, -1.5);
    }

    #[test]
    fn naive_timestamps_are_local_time() {
        let expected = Local
            .with_ymd_and_hms(2024, 5, 1, 12, 34, 56)
            .earliest()
            .unwrap()
            .timestamp() as f64;

        let millis = parse_timestamp("2024-05-01T12:34:56.789").unwrap();
        assert!((millis - (expected + 0.789)).abs() < 1e-6);
        assert_eq!(parse_timestamp("2024-05-01 12:34:56").unwrap(), expected);
    }

    #[test]
    fn bare_date_is_local_midnight() {
        let expected = Local
            .with_ymd_and_hms(2024, 5, 1, 0, 0, 0)
            .earliest()
            .unwrap()
            .timestamp() as f64;
        assert_eq!(parse_timestamp("2024-05-01").unwrap(), expected);
    }

    #[test]
    fn missing_field_is_rejected() {
        let err = decode(r#"{"timestamp":"2024-05-01T12:00:00Z"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn non_numeric_value_is_rejected() {
        let err = decode(r#"{"timestamp":"2024-05-01T12:00:00Z","value":"high"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn garbage_timestamp_is_rejected() {
        let err = decode(r#"{"timestamp":"yesterday","value":1}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Timestamp(ref t) if t == "yesterday"));
    }

    #[test]
    fn non_json_is_rejected() {
        assert!(matches!(decode("ping"), Err(DecodeError::Json(_))));
    }
}
