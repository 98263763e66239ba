use std::ops::Range;

use crate::result::ForecastError;

/// Share of all rows held out for testing.
pub const TEST_FRACTION: f64 = 0.2;

/// Share of the non-test rows held out for validation (0.25 × 0.8 = 20% overall).
pub const VALIDATION_FRACTION: f64 = 0.25;

/// Chronological train / validation / test partition of a date-ordered table.
///
/// No shuffling: the test rows are always the most recent ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChronologicalSplit {
    pub train: Range<usize>,
    pub validation: Range<usize>,
    pub test: Range<usize>,
}

impl ChronologicalSplit {
    /// Split `n` rows 60/20/20. Held-out sizes are rounded up.
    ///
    /// Needs at least two rows so that both the fitting set (train + validation)
    /// and the test set are non-empty.
    pub fn new(n: usize) -> Result<Self, ForecastError> {
        let n_test = held_out(n, TEST_FRACTION);
        let rest = n - n_test;
        if n_test == 0 || rest == 0 {
            return Err(ForecastError::internal(format!(
                "insufficient history to train: {n} row(s)"
            )));
        }

        let n_validation = held_out(rest, VALIDATION_FRACTION);
        let n_train = rest - n_validation;

        Ok(Self {
            train: 0..n_train,
            validation: n_train..rest,
            test: rest..n,
        })
    }

    /// Rows the final models are fitted on: train followed by validation.
    pub fn fitting(&self) -> Range<usize> {
        self.train.start..self.validation.end
    }
}

fn held_out(n: usize, fraction: f64) -> usize {
    ((n as f64) * fraction).ceil().min(n as f64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_sixty_twenty_twenty() {
        let s = ChronologicalSplit::new(100).unwrap();
        assert_eq!(s.train, 0..60);
        assert_eq!(s.validation, 60..80);
        assert_eq!(s.test, 80..100);
        assert_eq!(s.fitting(), 0..80);
    }

    #[test]
    fn rounds_held_out_sizes_up() {
        let s = ChronologicalSplit::new(11).unwrap();
        // test = ceil(2.2) = 3, validation = ceil(8 * 0.25) = 2
        assert_eq!(s.test, 8..11);
        assert_eq!(s.validation, 6..8);
        assert_eq!(s.train, 0..6);
    }

    #[test]
    fn two_rows_is_the_minimum() {
        let s = ChronologicalSplit::new(2).unwrap();
        assert_eq!(s.fitting(), 0..1);
        assert_eq!(s.test, 1..2);

        assert!(ChronologicalSplit::new(1).is_err());
        assert!(ChronologicalSplit::new(0).is_err());
    }
}
