use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, IntoStaticStr};

/// The disease state of one individual.
///
/// This is the only definition of the statuses in the crate. Iteration order (via
/// `strum::IntoEnumIterator`) is the order used by every report and count table.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumCount,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Status {
    #[default]
    Susceptible,
    Infected,
    Recovered,
    Dead,
    Vaccinated,
}

impl Status {
    /// Whether an individual in this status may receive a vaccine dose.
    #[must_use]
    pub fn is_vaccine_eligible(self) -> bool {
        matches!(self, Status::Susceptible | Status::Recovered)
    }

    /// Position of the status in iteration order, for indexing count arrays.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}
