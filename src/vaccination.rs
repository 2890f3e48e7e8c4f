//! Daily vaccine allocation.
//!
//! Throughput ramps up linearly from `start_day` until it reaches `max_capacity`. Each day the
//! whole (floored) capacity is handed out among the susceptible and recovered population.
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::define_rng;
use crate::error::EpiError;
use crate::grid::Grid;
use crate::random::{
    sample_multiple_with_replacement, sample_multiple_without_replacement, RngStore,
};
use crate::status::Status;

define_rng!(pub VaccinationRng);

/// How eligible individuals are picked when there are more of them than doses.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    /// Draw `floor(capacity)` picks independently. The same individual can be picked twice, so
    /// fewer doses than the capacity may actually be delivered.
    #[default]
    WithReplacement,
    /// Draw `floor(capacity)` distinct individuals.
    WithoutReplacement,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VaccinationParameters {
    pub start_day: u32,
    /// Doses added to the daily capacity every day from `start_day` on.
    pub capacity_rate: f64,
    pub max_capacity: f64,
}

impl Default for VaccinationParameters {
    fn default() -> Self {
        VaccinationParameters {
            start_day: 20,
            capacity_rate: 0.25,
            max_capacity: 20.0,
        }
    }
}

impl VaccinationParameters {
    /// # Errors
    ///
    /// Returns `EpiError::ConfigurationError` if the rate or the ceiling is negative or not
    /// finite.
    pub fn validate(&self) -> Result<(), EpiError> {
        if !self.capacity_rate.is_finite() || self.capacity_rate < 0.0 {
            return Err(EpiError::ConfigurationError(format!(
                "vaccination capacity_rate must be a non-negative number, got {}",
                self.capacity_rate
            )));
        }
        if !self.max_capacity.is_finite() || self.max_capacity < 0.0 {
            return Err(EpiError::ConfigurationError(format!(
                "vaccination max_capacity must be a non-negative number, got {}",
                self.max_capacity
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct VaccinationAllocator {
    start_day: u32,
    capacity_rate: f64,
    max_capacity: f64,
    current_capacity: f64,
    sampling: SamplingMode,
}

impl VaccinationAllocator {
    #[must_use]
    pub fn new(parameters: &VaccinationParameters, sampling: SamplingMode) -> Self {
        VaccinationAllocator {
            start_day: parameters.start_day,
            capacity_rate: parameters.capacity_rate,
            max_capacity: parameters.max_capacity,
            current_capacity: 0.0,
            sampling,
        }
    }

    #[must_use]
    pub fn current_capacity(&self) -> f64 {
        self.current_capacity
    }

    #[must_use]
    pub fn start_day(&self) -> u32 {
        self.start_day
    }

    #[must_use]
    pub fn sampling(&self) -> SamplingMode {
        self.sampling
    }

    /// Runs one day of vaccination on `grid` and returns how many individuals were newly
    /// vaccinated. Does nothing before `start_day`.
    pub fn step(&mut self, grid: &mut Grid, current_day: u32, rngs: &mut RngStore) -> usize {
        if current_day < self.start_day {
            return 0;
        }

        self.current_capacity = (self.current_capacity + self.capacity_rate).min(self.max_capacity);

        let eligible: Vec<usize> = grid
            .cells()
            .iter()
            .enumerate()
            .filter(|(_, individual)| individual.status().is_vaccine_eligible())
            .map(|(idx, _)| idx)
            .collect();

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let doses = self.current_capacity.floor() as usize;

        let selected = if doses > eligible.len() {
            (0..eligible.len()).collect()
        } else {
            match self.sampling {
                SamplingMode::WithReplacement => rngs.sample(VaccinationRng, |rng| {
                    sample_multiple_with_replacement(rng, eligible.len(), doses)
                }),
                SamplingMode::WithoutReplacement => rngs.sample(VaccinationRng, |rng| {
                    sample_multiple_without_replacement(rng, eligible.len(), doses)
                }),
            }
        };

        let cells = grid.cells_mut();
        let mut vaccinated = 0;
        for pick in selected {
            let individual = &mut cells[eligible[pick]];
            // Repeated picks are wasted doses.
            if individual.status() != Status::Vaccinated {
                individual.set_status(Status::Vaccinated);
                vaccinated += 1;
            }
        }

        trace!(
            "day {current_day}: vaccination capacity {:.2}, {} eligible",
            self.current_capacity,
            eligible.len()
        );
        if vaccinated > 0 {
            debug!("day {current_day}: vaccinated {vaccinated} individuals");
        }
        vaccinated
    }
}
