//! A stochastic epidemic simulation on a fixed two-dimensional population grid
//!
//! Every cell of a `width × height` grid holds one individual with an age and a disease
//! [`Status`]. The [`Simulation`] advances the population one day at a time:
//! * susceptible individuals are infected with a probability proportional to the number of
//!   infected neighbors among their (up to) eight adjacent cells,
//! * infected individuals recover or die with age-dependent daily probabilities,
//! * from a configurable day on, a growing number of vaccine doses are handed out among the
//!   susceptible and recovered,
//! * policy measures (lockdown, social distancing, improved treatment, ventilators) scale the
//!   population's probabilities for a window of days.
//!
//! ```rust
//! use epigrid::{Parameters, Simulation, Status};
//!
//! let mut simulation = Simulation::new(Parameters::default(), 42).unwrap();
//! simulation.seed_initial_cases();
//! simulation.run(30);
//! let counts = simulation.status_counts();
//! assert_eq!(counts.total(), 50 * 50);
//! println!("{} infected on day 30", counts[Status::Infected]);
//! ```
//!
//! All randomness comes from named streams derived from the seed (see [`random`]), so a seed
//! fully determines a run. The same engine is driven from the command line by the `epigrid`
//! binary (see [`runner`]), which reads [`Parameters`] from JSON and writes a daily
//! [`report::CountsReport`].
pub mod error;
pub mod grid;
pub mod hashing;
pub mod individual;
pub mod log;
pub mod measures;
pub mod parameters;
pub mod prelude;
pub mod probability;
pub mod random;
pub mod report;
pub mod runner;
pub mod simulation;
pub mod snapshot;
pub mod status;
pub mod vaccination;

pub use crate::error::EpiError;
pub use crate::grid::Grid;
pub use crate::individual::Individual;
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::measures::{Measure, MeasureKind, Measures};
pub use crate::parameters::{GridSize, Parameters};
pub use crate::probability::{Probabilities, ProbabilityTable, ProbabilityTables, TargetField};
pub use crate::simulation::Simulation;
pub use crate::snapshot::StatusCounts;
pub use crate::status::Status;
pub use crate::vaccination::{SamplingMode, VaccinationAllocator};

// Used by `define_rng!`
pub use paste;
pub use rand;
