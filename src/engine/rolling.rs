//! Rolling (moving) averages over the most recent N games.

use crate::types::{GameRecord, PropError, StatLine};

/// A validated rolling-window length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingWindow(usize);

impl RollingWindow {
    pub fn new(window: usize) -> Result<Self, PropError> {
        if window < 1 {
            return Err(PropError::InvalidParameter(
                "rolling window must be >= 1".to_string(),
            ));
        }
        Ok(Self(window))
    }

    /// Accept a window that arrived as a real number (e.g. from JSON).
    /// Non-integral or sub-1 values are rejected.
    pub fn try_from_f64(window: f64) -> Result<Self, PropError> {
        if !window.is_finite() || window.fract() != 0.0 {
            return Err(PropError::InvalidParameter(format!(
                "rolling window must be an integer, got {window}"
            )));
        }
        if window < 1.0 {
            return Err(PropError::InvalidParameter(format!(
                "rolling window must be >= 1, got {window}"
            )));
        }
        Ok(Self(window as usize))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

/// Moving mean of `values`.
///
/// Index `i` is `None` while `i < window - 1`, otherwise the mean of the
/// `window` values ending at `i` inclusive.
pub fn rolling_average(values: &[f64], window: usize) -> Result<Vec<Option<f64>>, PropError> {
    let window = RollingWindow::new(window)?.get();

    Ok((0..values.len())
        .map(|i| {
            (i + 1 >= window).then(|| {
                let slice = &values[i + 1 - window..=i];
                slice.iter().sum::<f64>() / window as f64
            })
        })
        .collect())
}

/// Latest rolling average of each counting stat.
///
/// Games must be in chronological order; a stat is `None` when fewer than
/// `window` games are available.
pub fn predictive_line(games: &[GameRecord], window: usize) -> Result<StatLine, PropError> {
    let last = |f: fn(&GameRecord) -> u32| -> Result<Option<f64>, PropError> {
        let values: Vec<f64> = games.iter().map(|g| f64::from(f(g))).collect();
        Ok(rolling_average(&values, window)?.last().copied().flatten())
    };

    Ok(StatLine {
        points: last(|g| g.points)?,
        rebounds: last(|g| g.rebounds)?,
        assists: last(|g| g.assists)?,
        three_made: last(|g| g.three_made)?,
    })
}
