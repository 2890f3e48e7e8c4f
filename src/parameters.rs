//! The configuration bundle a [`crate::simulation::Simulation`] is built from.
//!
//! Parameters are usually read from a JSON file. Every field is optional; anything left out
//! takes the default shown below.
//!
//! ```json
//! {
//!     "grid_size": { "width": 50, "height": 50 },
//!     "initial_case_count": 2,
//!     "infection_length": 14,
//!     "duration": 100,
//!     "probabilities": {
//!         "infection": { "50": 0.1, "60": 0.1, "70": 0.1, "80": 0.1, "100": 0.1 },
//!         "recovery": { "50": 0.7, "60": 0.7, "70": 0.7, "80": 0.7, "100": 0.7 },
//!         "death": { "50": 0.01, "60": 0.02, "70": 0.04, "80": 0.08, "100": 0.15 }
//!     },
//!     "vaccination": { "start_day": 20, "capacity_rate": 0.25, "max_capacity": 20 },
//!     "measures": {
//!         "lockdown": { "enabled": true, "start_days": [30], "end_days": [60] }
//!     },
//!     "sampling": "with_replacement",
//!     "age_shading": false,
//!     "strict_measures": false
//! }
//! ```
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::error::EpiError;
use crate::measures::{Measure, MeasureKind, Measures, MeasuresParameters};
use crate::probability::ProbabilityTables;
use crate::vaccination::{SamplingMode, VaccinationParameters};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl GridSize {
    #[must_use]
    pub fn square(size: usize) -> Self {
        GridSize {
            width: size,
            height: size,
        }
    }

    /// Number of cells, or `None` if it overflows `usize`.
    #[must_use]
    pub fn cells(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }
}

impl Default for GridSize {
    fn default() -> Self {
        GridSize::square(50)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Parameters {
    pub grid_size: GridSize,
    /// Individuals infected by [`crate::simulation::Simulation::seed_initial_cases`].
    pub initial_case_count: usize,
    /// Days an infection lasts on average. Recovery and death probabilities are spread over it.
    pub infection_length: u32,
    /// Days the runner simulates.
    pub duration: u32,
    pub probabilities: ProbabilityTables,
    pub vaccination: VaccinationParameters,
    pub measures: MeasuresParameters,
    pub sampling: SamplingMode,
    /// Darken colors in the color matrix by each individual's age.
    pub age_shading: bool,
    /// Reject overlapping same-field measure windows instead of warning about them.
    pub strict_measures: bool,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            grid_size: GridSize::default(),
            initial_case_count: 2,
            infection_length: 14,
            duration: 100,
            probabilities: ProbabilityTables::default(),
            vaccination: VaccinationParameters::default(),
            measures: MeasuresParameters::default(),
            sampling: SamplingMode::default(),
            age_shading: false,
            strict_measures: false,
        }
    }
}

impl Parameters {
    /// Reads parameters from a JSON file and validates them.
    ///
    /// # Errors
    ///
    /// Returns `EpiError::IoError` if the file cannot be opened, `EpiError::JsonError` if it is
    /// not valid parameter JSON, and any error of [`Parameters::validate`].
    pub fn load(path: &Path) -> Result<Self, EpiError> {
        debug!("loading parameters from {}", path.display());
        let file = File::open(path)?;
        let parameters: Parameters = serde_json::from_reader(BufReader::new(file))?;
        parameters.validate()?;
        Ok(parameters)
    }

    /// # Errors
    ///
    /// Returns `EpiError::ConfigurationError` for the first malformed option found, or
    /// `EpiError::InvariantViolation` for overlapping same-field measures when
    /// `strict_measures` is set.
    pub fn validate(&self) -> Result<(), EpiError> {
        let GridSize { width, height } = self.grid_size;
        if width == 0 || height == 0 {
            return Err(EpiError::ConfigurationError(format!(
                "grid dimensions must be positive, got {width}x{height}"
            )));
        }
        let Some(cells) = self.grid_size.cells() else {
            return Err(EpiError::ConfigurationError(format!(
                "grid {width}x{height} is too large"
            )));
        };
        if self.initial_case_count > cells {
            return Err(EpiError::ConfigurationError(format!(
                "{} initial cases do not fit on a {width}x{height} grid",
                self.initial_case_count
            )));
        }
        if self.infection_length == 0 {
            return Err(EpiError::ConfigurationError(
                "infection_length must be at least one day".to_string(),
            ));
        }
        self.probabilities.validate()?;
        self.vaccination.validate()?;

        if self.strict_measures {
            Measures::new(&self.measures, true)?;
        } else {
            // Overlaps are only warned about, and that happens once the simulation builds them.
            for kind in MeasureKind::iter() {
                Measure::from_parameters(kind, self.measures.get(kind))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::measures::MeasureParameters;
    use crate::probability::ProbabilityTable;

    fn write_json(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn assert_configuration_error(parameters: &Parameters, needle: &str) {
        match parameters.validate() {
            Err(EpiError::ConfigurationError(message)) => {
                assert!(message.contains(needle), "{message}");
            }
            other => panic!("expected a configuration error mentioning {needle}, got {other:?}"),
        }
    }

    #[test]
    fn defaults_are_valid() {
        let parameters = Parameters::default();
        parameters.validate().unwrap();
        assert_eq!(parameters.grid_size, GridSize::square(50));
        assert_eq!(parameters.initial_case_count, 2);
        assert_eq!(parameters.infection_length, 14);
        assert_eq!(parameters.duration, 100);
        assert_eq!(parameters.sampling, SamplingMode::WithReplacement);
        assert!(!parameters.measures.lockdown.enabled);
    }

    #[test]
    fn empty_object_is_default() {
        let parameters: Parameters = serde_json::from_str("{}").unwrap();
        assert_eq!(parameters, Parameters::default());
    }

    #[test]
    fn load_partial_file() {
        let file = write_json(
            r#"{
                "grid_size": {"width": 20, "height": 10},
                "initial_case_count": 5,
                "probabilities": {"death": {"100": 0.2}},
                "vaccination": {"start_day": 3},
                "measures": {"lockdown": {"enabled": true}},
                "sampling": "without_replacement"
            }"#,
        );
        let parameters = Parameters::load(file.path()).unwrap();
        assert_eq!(parameters.grid_size.cells(), Some(200));
        assert_eq!(parameters.initial_case_count, 5);
        assert_eq!(parameters.probabilities.death, ProbabilityTable::uniform(0.2));
        assert_eq!(
            parameters.probabilities.recovery,
            ProbabilityTables::default().recovery
        );
        assert_eq!(parameters.vaccination.start_day, 3);
        assert_eq!(parameters.vaccination.max_capacity, 20.0);
        assert!(parameters.measures.lockdown.enabled);
        assert_eq!(parameters.sampling, SamplingMode::WithoutReplacement);
    }

    #[test]
    fn load_missing_file() {
        let result = Parameters::load(Path::new("does/not/exist.json"));
        assert!(matches!(result, Err(EpiError::IoError(_))));
    }

    #[test]
    fn load_rejects_unknown_fields() {
        let file = write_json(r#"{"grid_sise": {"width": 2, "height": 2}}"#);
        assert!(matches!(
            Parameters::load(file.path()),
            Err(EpiError::JsonError(_))
        ));
    }

    #[test]
    fn load_validates() {
        let file = write_json(r#"{"infection_length": 0}"#);
        assert!(matches!(
            Parameters::load(file.path()),
            Err(EpiError::ConfigurationError(_))
        ));
    }

    #[test]
    fn rejects_grid_too_large_to_count() {
        let mut parameters = Parameters::default();
        parameters.grid_size = GridSize {
            width: usize::MAX / 2,
            height: 4,
        };
        assert_configuration_error(&parameters, "is too large");

        let file = write_json(r#"{"grid_size": {"width": 9223372036854775807, "height": 4}}"#);
        assert!(matches!(
            Parameters::load(file.path()),
            Err(EpiError::ConfigurationError(_))
        ));
    }

    #[test]
    fn rejects_empty_grid() {
        let mut parameters = Parameters::default();
        parameters.grid_size = GridSize {
            width: 0,
            height: 10,
        };
        assert_configuration_error(&parameters, "grid dimensions");
    }

    #[test]
    fn rejects_too_many_initial_cases() {
        let mut parameters = Parameters::default();
        parameters.grid_size = GridSize::square(3);
        parameters.initial_case_count = 9;
        parameters.validate().unwrap();
        parameters.initial_case_count = 10;
        assert_configuration_error(&parameters, "initial cases");
    }

    #[test]
    fn rejects_short_probability_table() {
        let mut parameters = Parameters::default();
        parameters.probabilities.recovery = serde_json::from_str(r#"{"50": 0.5}"#).unwrap();
        assert_configuration_error(&parameters, "recovery");
    }

    #[test]
    fn rejects_negative_vaccination_rate() {
        let mut parameters = Parameters::default();
        parameters.vaccination.capacity_rate = -0.5;
        assert_configuration_error(&parameters, "capacity_rate");
    }

    #[test]
    fn rejects_bad_multiplier_on_enabled_measure_only() {
        let mut parameters = Parameters::default();
        parameters.measures.ventilators.multiplier = Some(-1.0);
        parameters.validate().unwrap();
        parameters.measures.ventilators.enabled = true;
        assert_configuration_error(&parameters, "ventilators");
    }

    #[test]
    fn overlapping_measures_depend_on_strictness() {
        let mut parameters = Parameters::default();
        parameters.measures.lockdown = MeasureParameters::enabled();
        parameters.measures.social_distancing = MeasureParameters::enabled();
        parameters.validate().unwrap();

        parameters.strict_measures = true;
        assert!(matches!(
            parameters.validate(),
            Err(EpiError::InvariantViolation(_))
        ));
    }
}
