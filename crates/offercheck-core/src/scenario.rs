use crate::Result;
use crate::random::{random_in_range_with, random_index_with};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Departure airports are picked from the first ten checkboxes
pub const AIRPORT_INDEX_RANGE: (i64, i64) = (1, 10);

/// The birth-year calendar shows a decade at a time
pub const BIRTH_YEAR_CHOICES: i64 = 10;
pub const BIRTH_MONTH_CHOICES: i64 = 12;
/// Every month has at least 28 days
pub const BIRTH_DAY_CHOICES: i64 = 28;

/// Which tile to pick in each view of the child birth-date calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthDatePick {
    pub year_index: usize,
    pub month_index: usize,
    pub day_index: usize,
}

impl BirthDatePick {
    pub fn random_with<R: Rng + ?Sized>(rng: &mut R) -> Result<Self> {
        Ok(Self {
            year_index: random_index_with(rng, BIRTH_YEAR_CHOICES)?,
            month_index: random_index_with(rng, BIRTH_MONTH_CHOICES)?,
            day_index: random_index_with(rng, BIRTH_DAY_CHOICES)?,
        })
    }
}

/// Randomised inputs for one run of the search-and-offer flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub airport_index: usize,
    pub destination_index: usize,
    pub birth_date: BirthDatePick,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Scenario {
    pub fn random() -> Result<Self> {
        Self::random_with(&mut rand::thread_rng())
    }

    /// Reproducible scenario for re-running a failed flow
    pub fn seeded(seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut scenario = Self::random_with(&mut rng)?;
        scenario.seed = Some(seed);
        Ok(scenario)
    }

    pub fn random_with<R: Rng + ?Sized>(rng: &mut R) -> Result<Self> {
        let (min, max) = AIRPORT_INDEX_RANGE;
        let airport_index = random_in_range_with(rng, min, max)?;

        Ok(Self {
            // Range is positive, so the cast cannot wrap
            airport_index: airport_index as usize,
            destination_index: 0,
            birth_date: BirthDatePick::random_with(rng)?,
            seed: None,
        })
    }
}
