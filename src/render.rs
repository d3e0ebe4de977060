//! Text rendering of history snapshots: the plot, the list view and the
//! latest-value label.

use tview_core::{format_timestamp, ConnectionState, Sample};

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// One block character per value, scaled between the slice's min and max.
pub fn sparkline(values: &[f64]) -> String {
    let Some((min, max)) = bounds(values.iter().copied()) else {
        return String::new();
    };
    let span = max - min;

    values
        .iter()
        .map(|v| {
            if span <= f64::EPSILON {
                return BARS[BARS.len() / 2];
            }
            let level = ((v - min) / span * (BARS.len() - 1) as f64).round() as usize;
            BARS[level.min(BARS.len() - 1)]
        })
        .collect()
}

/// Header line plus sparkline of the newest `width` points, redrawn on every
/// batch-ready signal.
pub fn plot(samples: &[Sample], width: usize) -> String {
    let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
        return "(no data)".to_string();
    };
    let (min, max) = bounds(samples.iter().map(|s| s.value)).unwrap_or((last.value, last.value));

    let tail = &samples[samples.len().saturating_sub(width)..];
    let values: Vec<f64> = tail.iter().map(|s| s.value).collect();

    format!(
        "{} samples  {} .. {}  min {min}  max {max}  last {}\n{}",
        samples.len(),
        format_timestamp(first.timestamp),
        format_timestamp(last.timestamp),
        last.value,
        sparkline(&values),
    )
}

/// Rows for the "last N readings" list, oldest first.
pub fn list(samples: &[Sample]) -> Vec<String> {
    samples.iter().map(Sample::to_string).collect()
}

pub fn latest(sample: Option<Sample>) -> String {
    match sample {
        Some(s) => format!(
            "Latest reading:\n  time:  {}\n  value: {}",
            format_timestamp(s.timestamp),
            s.value
        ),
        None => "No readings yet.".to_string(),
    }
}

pub fn status(state: ConnectionState, stored: usize, capacity: usize, uri: Option<&str>) -> String {
    let marker = match state {
        ConnectionState::Connected    => "✔",
        ConnectionState::Connecting   => "…",
        ConnectionState::Disconnected => "✖",
    };
    let uri = uri.map(|u| format!("  {u}")).unwrap_or_default();
    format!("{marker} {state}  {stored}/{capacity} samples{uri}")
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
