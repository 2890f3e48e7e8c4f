//! The day-by-day driver.
//!
//! A [`Simulation`] owns the population, the vaccine allocator, the measures and the random
//! streams. Each call to [`Simulation::update`] advances one day:
//!
//! 1. vaccination is applied to the current grid,
//! 2. measures starting or ending today rescale the current grid's probabilities,
//! 3. every cell's next status is computed from the (now frozen) current grid into a second
//!    buffer,
//! 4. the buffers are swapped and the day counter is incremented.
//!
//! Because step 3 only reads the frozen grid, the order in which cells are visited does not
//! change the outcome.
use std::mem;

use log::{debug, info, trace};

use crate::define_rng;
use crate::error::EpiError;
use crate::grid::Grid;
use crate::measures::Measures;
use crate::parameters::Parameters;
use crate::random::RngStore;
use crate::status::Status;
use crate::vaccination::VaccinationAllocator;

define_rng!(pub SeedingRng);
define_rng!(pub TransitionRng);

pub struct Simulation {
    current: Grid,
    next: Grid,
    day: u32,
    vaccination: VaccinationAllocator,
    measures: Measures,
    rngs: RngStore,
    parameters: Parameters,
}

impl Simulation {
    /// Validates `parameters` and builds a fully susceptible population. Every random decision
    /// of the run derives from `seed`.
    ///
    /// # Errors
    ///
    /// Returns any error of [`Parameters::validate`].
    pub fn new(parameters: Parameters, seed: u64) -> Result<Self, EpiError> {
        parameters.validate()?;
        let measures = Measures::new(&parameters.measures, parameters.strict_measures)?;
        let vaccination = VaccinationAllocator::new(&parameters.vaccination, parameters.sampling);

        let mut rngs = RngStore::new(seed);
        let current = Grid::populate(
            parameters.grid_size.width,
            parameters.grid_size.height,
            &mut rngs,
            &parameters.probabilities,
            parameters.infection_length,
        );
        let next = current.clone();

        info!(
            "created a {}x{} population with seed {seed} and {} measures",
            current.width(),
            current.height(),
            measures.len()
        );
        Ok(Simulation {
            current,
            next,
            day: 0,
            vaccination,
            measures,
            rngs,
            parameters,
        })
    }

    /// Infects the individual at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns `EpiError::ConfigurationError` if the cell is not on the grid.
    pub fn infect(&mut self, row: usize, col: usize) -> Result<(), EpiError> {
        if row >= self.current.height() || col >= self.current.width() {
            return Err(EpiError::ConfigurationError(format!(
                "cannot infect ({row}, {col}) on a {}x{} grid",
                self.current.width(),
                self.current.height()
            )));
        }
        self.current.get_mut(row, col).set_status(Status::Infected);
        Ok(())
    }

    /// Picks `n` cells uniformly at random, with replacement, and infects them. The same cell
    /// may be picked more than once, so fewer than `n` individuals may end up infected.
    pub fn infect_randomly(&mut self, n: usize) {
        let (width, height) = (self.current.width(), self.current.height());
        for _ in 0..n {
            let row = self.rngs.sample_range(SeedingRng, 0..height);
            let col = self.rngs.sample_range(SeedingRng, 0..width);
            self.current.get_mut(row, col).set_status(Status::Infected);
        }
        debug!("randomly infected {n} cells");
    }

    /// Infects `initial_case_count` random cells.
    pub fn seed_initial_cases(&mut self) {
        self.infect_randomly(self.parameters.initial_case_count);
    }

    /// Advances the simulation by one day.
    pub fn update(&mut self) {
        let day = self.day;

        self.vaccination
            .step(&mut self.current, day, &mut self.rngs);
        self.measures.apply(&mut self.current, day);

        // The next buffer starts as a copy so it carries today's ages and probabilities.
        self.next.copy_from(&self.current);
        for (idx, individual) in self.current.cells().iter().enumerate() {
            let new_status = match individual.status() {
                Status::Infected => {
                    if self.rngs.sample_unit(TransitionRng) < individual.recovery_probability() {
                        Status::Recovered
                    } else if self.rngs.sample_unit(TransitionRng)
                        < individual.death_probability()
                    {
                        Status::Dead
                    } else {
                        continue;
                    }
                }
                Status::Susceptible => {
                    let (row, col) = self.current.coords(idx);
                    let pressure = self.current.infected_neighbors(row, col);
                    if pressure == 0 {
                        continue;
                    }
                    #[allow(clippy::cast_precision_loss)]
                    let infection = pressure as f64 * individual.infection_probability();
                    if self.rngs.sample_unit(TransitionRng) < infection {
                        Status::Infected
                    } else {
                        continue;
                    }
                }
                Status::Recovered | Status::Dead | Status::Vaccinated => continue,
            };
            self.next.cells_mut()[idx].set_status(new_status);
        }

        mem::swap(&mut self.current, &mut self.next);
        self.day += 1;
        trace!(
            "day {day} done: {} infected",
            self.current.count_status(Status::Infected)
        );
    }

    /// Calls [`Simulation::update`] `days` times.
    pub fn run(&mut self, days: u32) {
        for _ in 0..days {
            self.update();
        }
    }

    /// The number of completed days.
    #[must_use]
    pub fn current_day(&self) -> u32 {
        self.day
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.current
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    #[must_use]
    pub fn vaccination(&self) -> &VaccinationAllocator {
        &self.vaccination
    }

    #[must_use]
    pub fn measures(&self) -> &Measures {
        &self.measures
    }

    #[must_use]
    pub fn base_seed(&self) -> u64 {
        self.rngs.base_seed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::GridSize;
    use crate::probability::{ProbabilityTable, ProbabilityTables};

    fn parameters(size: usize, infection: f64, recovery: f64, death: f64) -> Parameters {
        Parameters {
            grid_size: GridSize::square(size),
            infection_length: 1,
            probabilities: ProbabilityTables {
                infection: ProbabilityTable::uniform(infection),
                recovery: ProbabilityTable::uniform(recovery),
                death: ProbabilityTable::uniform(death),
            },
            ..Parameters::default()
        }
    }

    fn statuses(simulation: &Simulation) -> Vec<Status> {
        simulation
            .grid()
            .cells()
            .iter()
            .map(|individual| individual.status())
            .collect()
    }

    #[test]
    fn new_population_is_susceptible() {
        let simulation = Simulation::new(Parameters::default(), 0).unwrap();
        assert_eq!(simulation.current_day(), 0);
        assert_eq!(simulation.grid().len(), 2500);
        assert_eq!(simulation.grid().count_status(Status::Susceptible), 2500);
    }

    #[test]
    fn new_rejects_invalid_parameters() {
        let mut parameters = Parameters::default();
        parameters.infection_length = 0;
        assert!(matches!(
            Simulation::new(parameters, 0),
            Err(EpiError::ConfigurationError(_))
        ));
    }

    #[test]
    fn infect_checks_bounds() {
        let mut simulation = Simulation::new(parameters(3, 0.1, 0.1, 0.1), 0).unwrap();
        simulation.infect(2, 2).unwrap();
        assert_eq!(simulation.grid().get(2, 2).status(), Status::Infected);
        assert!(matches!(
            simulation.infect(3, 0),
            Err(EpiError::ConfigurationError(_))
        ));
    }

    #[test]
    fn infect_randomly_is_bounded_by_n() {
        let mut simulation = Simulation::new(parameters(10, 0.1, 0.1, 0.1), 4).unwrap();
        simulation.infect_randomly(0);
        assert_eq!(simulation.grid().count_status(Status::Infected), 0);
        simulation.infect_randomly(5);
        let infected = simulation.grid().count_status(Status::Infected);
        assert!((1..=5).contains(&infected));
    }

    #[test]
    fn infect_randomly_saturates_small_grid() {
        // Positions are drawn with replacement, so asking for more cases than cells infects at
        // most every cell.
        let mut simulation = Simulation::new(parameters(2, 0.1, 0.1, 0.1), 4).unwrap();
        simulation.infect_randomly(50);
        let infected = simulation.grid().count_status(Status::Infected);
        assert!((1..=4).contains(&infected));
        assert_eq!(simulation.status_counts().total(), 4);
    }

    #[test]
    fn seed_initial_cases_uses_parameters() {
        let mut parameters = parameters(10, 0.1, 0.1, 0.1);
        parameters.initial_case_count = 1;
        let mut simulation = Simulation::new(parameters, 4).unwrap();
        simulation.seed_initial_cases();
        assert_eq!(simulation.grid().count_status(Status::Infected), 1);
    }

    #[test]
    fn update_reads_frozen_grid() {
        // A certain recovery means the center is recovered after one day, but its neighbors
        // were still exposed to it while it was infected.
        let mut simulation = Simulation::new(parameters(3, 1.0, 1.0, 0.0), 0).unwrap();
        simulation.infect(1, 1).unwrap();
        simulation.update();
        assert_eq!(simulation.grid().get(1, 1).status(), Status::Recovered);
        assert_eq!(simulation.grid().count_status(Status::Infected), 8);
        assert_eq!(simulation.current_day(), 1);
    }

    #[test]
    fn no_infection_without_pressure() {
        let mut simulation = Simulation::new(parameters(5, 1.0, 0.0, 0.0), 0).unwrap();
        simulation.run(10);
        assert_eq!(simulation.grid().count_status(Status::Susceptible), 25);
        assert_eq!(simulation.current_day(), 10);
    }

    #[test]
    fn terminal_states_do_not_change() {
        let mut simulation = Simulation::new(parameters(2, 1.0, 1.0, 1.0), 0).unwrap();
        simulation.current.get_mut(0, 0).set_status(Status::Dead);
        simulation.current.get_mut(0, 1).set_status(Status::Recovered);
        simulation.current.get_mut(1, 0).set_status(Status::Vaccinated);
        simulation.run(3);
        assert_eq!(simulation.grid().get(0, 0).status(), Status::Dead);
        assert_eq!(simulation.grid().get(0, 1).status(), Status::Recovered);
        assert_eq!(simulation.grid().get(1, 0).status(), Status::Vaccinated);
        assert_eq!(simulation.grid().get(1, 1).status(), Status::Susceptible);
    }

    #[test]
    fn same_seed_same_trajectory() {
        let run = |seed| {
            let mut simulation = Simulation::new(parameters(20, 0.2, 0.1, 0.05), seed).unwrap();
            simulation.infect_randomly(3);
            let mut trajectory = Vec::new();
            for _ in 0..30 {
                simulation.update();
                trajectory.push(statuses(&simulation));
            }
            trajectory
        };
        assert_eq!(run(17), run(17));
        assert_ne!(run(17), run(18));
    }

    #[test]
    fn vaccination_starts_on_start_day() {
        let mut parameters = parameters(5, 0.0, 0.0, 0.0);
        parameters.vaccination.start_day = 2;
        parameters.vaccination.capacity_rate = 3.0;
        let mut simulation = Simulation::new(parameters, 0).unwrap();
        simulation.run(2);
        assert_eq!(simulation.grid().count_status(Status::Vaccinated), 0);
        simulation.update();
        assert!(simulation.grid().count_status(Status::Vaccinated) > 0);
        assert!(simulation.vaccination().current_capacity() > 0.0);
    }
}
