use serde::Serialize;

use crate::define_rng;
use crate::probability::{Probabilities, ProbabilityTables, TargetField};
use crate::random::RngStore;
use crate::status::Status;

/// The oldest representable age. Probability tables must cover every age up to and including it.
pub const MAX_AGE: u8 = 100;

/// One bracket of the population's age distribution. Ages are drawn uniformly from
/// `lower..upper`, so `upper` itself is never sampled.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct AgeBracket {
    pub lower: u8,
    pub upper: u8,
    pub weight: f64,
}

impl AgeBracket {
    #[must_use]
    pub fn contains(&self, age: u8) -> bool {
        (self.lower..=self.upper).contains(&age)
    }
}

/// The fixed age distribution every population is drawn from.
pub const AGE_BRACKETS: [AgeBracket; 5] = [
    AgeBracket {
        lower: 0,
        upper: 18,
        weight: 0.22,
    },
    AgeBracket {
        lower: 19,
        upper: 29,
        weight: 0.12,
    },
    AgeBracket {
        lower: 30,
        upper: 49,
        weight: 0.31,
    },
    AgeBracket {
        lower: 50,
        upper: 69,
        weight: 0.22,
    },
    AgeBracket {
        lower: 70,
        upper: MAX_AGE,
        weight: 0.13,
    },
];

define_rng!(pub AgeRng);

/// Draws a bracket by weight, then an age uniformly inside it.
pub fn sample_age(rngs: &mut RngStore) -> u8 {
    let weights = AGE_BRACKETS.map(|bracket| bracket.weight);
    let bracket = AGE_BRACKETS[rngs.sample_weighted(AgeRng, &weights)];
    rngs.sample_range(AgeRng, bracket.lower..bracket.upper)
}

/// One cell of the grid.
///
/// `age` and the base probabilities are fixed at creation. The working probabilities start equal
/// to the base ones and are the only thing measures scale.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Individual {
    status: Status,
    age: u8,
    base: Probabilities,
    working: Probabilities,
}

impl Individual {
    /// Creates a susceptible individual with a freshly sampled age.
    ///
    /// The configured recovery and death probabilities are totals over the whole infection, so
    /// they are divided by `infection_length` to give a daily hazard. Infection stays per-day.
    pub fn new(rngs: &mut RngStore, tables: &ProbabilityTables, infection_length: u32) -> Self {
        Individual::with_age(sample_age(rngs), tables, infection_length)
    }

    /// Creates a susceptible individual of the given age.
    #[must_use]
    pub fn with_age(age: u8, tables: &ProbabilityTables, infection_length: u32) -> Self {
        let mut probabilities = tables.lookup(age);
        let days = f64::from(infection_length.max(1));
        probabilities.recovery /= days;
        probabilities.death /= days;
        Individual {
            status: Status::Susceptible,
            age,
            base: probabilities,
            working: probabilities,
        }
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    /// Sets the status without checking that the transition is legal.
    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    #[must_use]
    pub fn age(&self) -> u8 {
        self.age
    }

    /// The probabilities currently in force, including any measure scaling.
    #[must_use]
    pub fn probabilities(&self) -> &Probabilities {
        &self.working
    }

    /// The probabilities derived from age at creation.
    #[must_use]
    pub fn base_probabilities(&self) -> &Probabilities {
        &self.base
    }

    #[must_use]
    pub fn infection_probability(&self) -> f64 {
        self.working.infection
    }

    #[must_use]
    pub fn recovery_probability(&self) -> f64 {
        self.working.recovery
    }

    #[must_use]
    pub fn death_probability(&self) -> f64 {
        self.working.death
    }

    /// Multiplies one working probability by `factor`.
    pub fn scale(&mut self, field: TargetField, factor: f64) {
        *self.working.get_mut(field) *= factor;
    }

    /// Divides one working probability by `factor`, undoing a previous [`Individual::scale`].
    pub fn unscale(&mut self, field: TargetField, factor: f64) {
        *self.working.get_mut(field) /= factor;
    }
}
