//! Age-stratified probability tables.
//!
//! A [`ProbabilityTable`] maps the *upper bound* of each age bracket to the probability that
//! applies to that bracket. The keys partition `[0, MAX_AGE]` in ascending order, for example
//! `{50: 0.01, 60: 0.02, 70: 0.04, 80: 0.08, 100: 0.15}` reads "under 50 → 0.01, 50–59 → 0.02,
//! …, 80 and over → 0.15".
use std::collections::BTreeMap;
use std::ops::Bound;

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::error::EpiError;
use crate::individual::MAX_AGE;

/// Selects one of the three per-individual probability fields.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TargetField {
    Infection,
    Recovery,
    Death,
}

/// The infection, recovery and death probabilities of one individual.
///
/// Recovery and death are *daily* hazards (see [`crate::individual::Individual::new`]).
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Probabilities {
    pub infection: f64,
    pub recovery: f64,
    pub death: f64,
}

impl Probabilities {
    #[must_use]
    pub fn get(&self, field: TargetField) -> f64 {
        match field {
            TargetField::Infection => self.infection,
            TargetField::Recovery => self.recovery,
            TargetField::Death => self.death,
        }
    }

    pub fn get_mut(&mut self, field: TargetField) -> &mut f64 {
        match field {
            TargetField::Infection => &mut self.infection,
            TargetField::Recovery => &mut self.recovery,
            TargetField::Death => &mut self.death,
        }
    }
}

/// Maps age-bracket upper bounds to a probability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProbabilityTable(BTreeMap<u8, f64>);

impl ProbabilityTable {
    /// Builds a table from `(upper_bound, probability)` pairs and validates it.
    ///
    /// # Errors
    ///
    /// Returns `EpiError::ConfigurationError` if the table does not cover the full age range or
    /// contains a probability outside `[0, 1]`.
    pub fn from_brackets(
        brackets: impl IntoIterator<Item = (u8, f64)>,
    ) -> Result<ProbabilityTable, EpiError> {
        let table = ProbabilityTable(brackets.into_iter().collect());
        table.validate("probability")?;
        Ok(table)
    }

    /// A table with a single bracket, giving everyone the same probability.
    #[must_use]
    pub fn uniform(probability: f64) -> ProbabilityTable {
        ProbabilityTable(BTreeMap::from([(MAX_AGE, probability)]))
    }

    /// # Errors
    ///
    /// Returns `EpiError::ConfigurationError` naming the table (`name`) if it is empty, if its
    /// final bound is below `MAX_AGE`, or if a probability is outside `[0, 1]`.
    pub fn validate(&self, name: &str) -> Result<(), EpiError> {
        let Some((&last_bound, _)) = self.0.last_key_value() else {
            return Err(EpiError::ConfigurationError(format!(
                "{name} table has no age brackets"
            )));
        };
        if last_bound < MAX_AGE {
            return Err(EpiError::ConfigurationError(format!(
                "{name} table ends at age {last_bound} but must cover ages up to {MAX_AGE}"
            )));
        }
        for (bound, probability) in &self.0 {
            if !(0.0..=1.0).contains(probability) {
                return Err(EpiError::ConfigurationError(format!(
                    "{name} probability {probability} for bracket ending at {bound} is outside [0, 1]"
                )));
            }
        }
        Ok(())
    }

    /// Returns the probability of the smallest upper bound strictly greater than `age`.
    ///
    /// The last bracket includes its own bound, so on a validated table every age in
    /// `0..=MAX_AGE` resolves. An age beyond every bound of an unvalidated table resolves to 0.
    #[must_use]
    pub fn lookup(&self, age: u8) -> f64 {
        if let Some((_, &probability)) = self
            .0
            .range((Bound::Excluded(age), Bound::Unbounded))
            .next()
        {
            return probability;
        }
        match self.0.last_key_value() {
            Some((&last_bound, &probability)) if age == last_bound => probability,
            _ => 0.0,
        }
    }

    pub fn brackets(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.0.iter().map(|(&bound, &probability)| (bound, probability))
    }
}

/// The three age tables an individual's probabilities are derived from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbabilityTables {
    pub infection: ProbabilityTable,
    pub recovery: ProbabilityTable,
    pub death: ProbabilityTable,
}

impl ProbabilityTables {
    /// # Errors
    ///
    /// Returns the first `EpiError::ConfigurationError` found in any of the three tables.
    pub fn validate(&self) -> Result<(), EpiError> {
        self.infection.validate("infection")?;
        self.recovery.validate("recovery")?;
        self.death.validate("death")
    }

    /// Looks `age` up in every table. These are the *total* probabilities of the configuration,
    /// before any division by the infection length.
    #[must_use]
    pub fn lookup(&self, age: u8) -> Probabilities {
        Probabilities {
            infection: self.infection.lookup(age),
            recovery: self.recovery.lookup(age),
            death: self.death.lookup(age),
        }
    }
}

impl Default for ProbabilityTables {
    fn default() -> Self {
        let brackets = [50, 60, 70, 80, 100];
        ProbabilityTables {
            infection: ProbabilityTable(brackets.iter().map(|&b| (b, 0.1)).collect()),
            recovery: ProbabilityTable(brackets.iter().map(|&b| (b, 0.7)).collect()),
            death: ProbabilityTable(
                brackets
                    .iter()
                    .copied()
                    .zip([0.01, 0.02, 0.04, 0.08, 0.15])
                    .collect(),
            ),
        }
    }
}
