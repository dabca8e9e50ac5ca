// Author: Jacques Murray

//! Compact text encoding of histogram values.
//!
//! Values are sorted and runs of equal values collapse into `value:count`,
//! so `[3, 1, 3, 3]` becomes `"1,3:3"`. A count of one is written without
//! the `:count` suffix; `"42"` and `"42:1"` mean the same thing.

use thiserror::Error;

/// Upper bound on the number of values one string may expand to.
pub const MAX_VALUES: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistogramError {
    #[error("cannot parse token #{index} {token:?}: expected 1 or 2 parts but was {parts}")]
    Parts {
        index: usize,
        token: String,
        parts: usize,
    },

    #[error("cannot parse token #{index} {token:?}: invalid value {value:?}")]
    Value {
        index: usize,
        token: String,
        value: String,
    },

    #[error("cannot parse token #{index} {token:?}: invalid count {count:?}")]
    Count {
        index: usize,
        token: String,
        count: String,
    },
}

/// Formats `values` as a comma-separated list of `value[:count]` tokens.
pub fn stringify_values(values: &[i64]) -> String {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let mut tokens = Vec::new();
    for run in sorted.chunk_by(|a, b| a == b) {
        match run.len() {
            1 => tokens.push(run[0].to_string()),
            count => tokens.push(format!("{}:{count}", run[0])),
        }
    }
    tokens.join(",")
}

/// Parses the output of [`stringify_values`] back into sorted values.
///
/// Values must be non-negative and counts at least one. The counts of all
/// tokens together may not exceed [`MAX_VALUES`].
pub fn parse_values(text: &str) -> Result<Vec<i64>, HistogramError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    let mut runs = Vec::new();
    let mut total: usize = 0;
    for (i, token) in text.split(',').enumerate() {
        let (value, count) = parse_token(i + 1, token)?;
        total = total
            .checked_add(count)
            .filter(|total| *total <= MAX_VALUES)
            .ok_or_else(|| HistogramError::Count {
                index: i + 1,
                token: token.to_string(),
                count: count.to_string(),
            })?;
        runs.push((value, count));
    }
    let mut values = Vec::with_capacity(total);
    for (value, count) in runs {
        values.extend(std::iter::repeat(value).take(count));
    }
    values.sort_unstable();
    Ok(values)
}

fn parse_token(index: usize, token: &str) -> Result<(i64, usize), HistogramError> {
    let parts: Vec<&str> = token.split(':').collect();
    if parts.len() > 2 {
        return Err(HistogramError::Parts {
            index,
            token: token.to_string(),
            parts: parts.len(),
        });
    }
    let value = parts[0]
        .parse::<i64>()
        .ok()
        .filter(|value| *value >= 0)
        .ok_or_else(|| HistogramError::Value {
            index,
            token: token.to_string(),
            value: parts[0].to_string(),
        })?;
    let count = match parts.get(1) {
        None => 1,
        Some(count) => count
            .parse::<usize>()
            .ok()
            .filter(|count| *count >= 1)
            .ok_or_else(|| HistogramError::Count {
                index,
                token: token.to_string(),
                count: count.to_string(),
            })?,
    };
    Ok((value, count))
}
