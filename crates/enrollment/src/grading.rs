//! Score and average value objects, and the pass/fail rule.
//!
//! All arithmetic is exact decimal arithmetic; binary floating point never
//! touches a grade.

use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use campus_core::{DomainError, DomainResult, ValueObject};

/// Lowest score accepted.
pub const MIN_SCORE: Decimal = dec!(0.00);
/// Highest score accepted.
pub const MAX_SCORE: Decimal = dec!(10.00);
/// Averages at or above this value pass.
pub const PASSING_AVERAGE: Decimal = dec!(7.00);

const GRADE_DECIMAL_PLACES: u32 = 2;

/// Enrollment status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnrollmentStatus {
    /// In progress: no average has been computed yet.
    #[default]
    Cursando,
    /// Passed: average >= 7.00.
    Aprovado,
    /// Failed: average < 7.00.
    Reprovado,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Cursando => "CURSANDO",
            EnrollmentStatus::Aprovado => "APROVADO",
            EnrollmentStatus::Reprovado => "REPROVADO",
        }
    }
}

impl core::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single score in `[0.00, 10.00]` with at most two fractional digits.
///
/// Construction is the validation boundary: once a `Score` exists the grading
/// rule can treat it as well-formed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Score(Decimal);

impl Score {
    pub fn new(value: Decimal) -> DomainResult<Self> {
        if value < MIN_SCORE || value > MAX_SCORE {
            return Err(DomainError::validation(format!(
                "score {value} must be between {MIN_SCORE} and {MAX_SCORE}"
            )));
        }
        if value.normalize().scale() > GRADE_DECIMAL_PLACES {
            return Err(DomainError::validation(format!(
                "score {value} has more than {GRADE_DECIMAL_PLACES} decimal places"
            )));
        }

        let mut value = value.normalize();
        value.rescale(GRADE_DECIMAL_PLACES);
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl ValueObject for Score {}

impl TryFrom<Decimal> for Score {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for Decimal {
    fn from(value: Score) -> Self {
        value.0
    }
}

impl FromStr for Score {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|e| DomainError::validation(format!("score '{s}': {e}")))?;
        Self::new(value)
    }
}

impl core::fmt::Display for Score {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Mean of two scores, rounded half-up to two decimal places.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Average(Decimal);

impl Average {
    /// `round_half_up((a + b) / 2, 2)`.
    pub fn of(a: Score, b: Score) -> Self {
        let raw = (a.value() + b.value()) / dec!(2);
        let mut rounded =
            raw.round_dp_with_strategy(GRADE_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(GRADE_DECIMAL_PLACES);
        Self(rounded)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_passing(&self) -> bool {
        self.0 >= PASSING_AVERAGE
    }

    /// Status implied by this average: APROVADO at or above 7.00, else REPROVADO.
    pub fn status(&self) -> EnrollmentStatus {
        if self.is_passing() {
            EnrollmentStatus::Aprovado
        } else {
            EnrollmentStatus::Reprovado
        }
    }
}

impl ValueObject for Average {}

impl core::fmt::Display for Average {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}
