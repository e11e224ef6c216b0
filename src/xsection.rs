// Energy-keyed microscopic cross-section tables.

use crate::error::{TransportError, TransportResult};

/// Microscopic cross sections [barns] keyed by energy [eV].
///
/// Keys are strictly increasing; a lookup interpolates linearly between the
/// bracketing entries. One table exists per reaction channel (elastic
/// scatter and absorption) and is immutable after construction.
#[derive(Debug, Clone)]
pub struct CrossSection {
    keys: Vec<f64>,
    values: Vec<f64>,
}

impl CrossSection {
    /// Build a table from parallel key/value arrays, validating ordering.
    pub fn new(keys: Vec<f64>, values: Vec<f64>) -> TransportResult<Self> {
        if keys.len() < 2 {
            return Err(TransportError::InvalidTable(format!(
                "need at least two entries, got {}",
                keys.len()
            )));
        }
        if keys.len() != values.len() {
            return Err(TransportError::InvalidTable(format!(
                "{} keys but {} values",
                keys.len(),
                values.len()
            )));
        }
        for pair in keys.windows(2) {
            if !(pair[0] < pair[1]) {
                return Err(TransportError::InvalidTable(format!(
                    "energy keys must be strictly increasing, found {} then {}",
                    pair[0], pair[1]
                )));
            }
        }
        if keys.iter().chain(values.iter()).any(|v| !v.is_finite()) {
            return Err(TransportError::InvalidTable(
                "entries must be finite".to_string(),
            ));
        }
        Ok(Self { keys, values })
    }

    /// Two-point table holding a constant value over `[lo, hi)`.
    pub fn constant(lo: f64, hi: f64, value: f64) -> TransportResult<Self> {
        Self::new(vec![lo, hi], vec![value, value])
    }

    /// Lowest keyed energy (closed end of the valid range).
    pub fn min_key(&self) -> f64 {
        self.keys[0]
    }

    /// Highest keyed energy (open end of the valid range).
    pub fn max_key(&self) -> f64 {
        self.keys[self.keys.len() - 1]
    }

    /// Number of table entries (always at least two).
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Interpolated value at `energy`, plus the index of the bracketing
    /// interval `[keys[ix], keys[ix+1])`.
    ///
    /// The search starts at the table midpoint and steps by a width that
    /// halves each iteration, clamped to one entry, so it converges for any
    /// in-range energy without tracking a low/high pair.
    pub fn lookup(&self, energy: f64) -> TransportResult<(f64, usize)> {
        let keys = &self.keys;
        let last = keys.len() - 1;
        if !(energy >= keys[0] && energy < keys[last]) {
            return Err(TransportError::OutOfRange {
                energy,
                lo: keys[0],
                hi: keys[last],
            });
        }

        let top = (last - 1) as isize;
        let mut ind = (keys.len() as isize / 2).min(top);
        let mut width = (ind / 2).max(1);
        while energy < keys[ind as usize] || energy >= keys[ind as usize + 1] {
            ind += if energy < keys[ind as usize] { -width } else { width };
            ind = ind.clamp(0, top);
            width = (width / 2).max(1);
        }

        let ix = ind as usize;
        let t = (energy - keys[ix]) / (keys[ix + 1] - keys[ix]);
        Ok((self.values[ix] + t * (self.values[ix + 1] - self.values[ix]), ix))
    }
}
