//! Everything needed to build, run and inspect a simulation.
//!
//! ```rust
//! use epigrid::prelude::*;
//! ```
pub use crate::define_rng;
pub use crate::error::EpiError;
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::measures::{MeasureKind, MeasureParameters, MeasuresParameters};
pub use crate::parameters::{GridSize, Parameters};
pub use crate::probability::{ProbabilityTable, ProbabilityTables, TargetField};
pub use crate::random::RngStore;
pub use crate::report::CountsReport;
pub use crate::simulation::Simulation;
pub use crate::snapshot::{Color, StatusCounts};
pub use crate::status::Status;
pub use crate::vaccination::{SamplingMode, VaccinationParameters};
