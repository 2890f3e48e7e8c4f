//! The daily counts report: one CSV row per simulated day with the number of individuals in
//! each status.
use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::path::Path;

use csv::Writer;
use serde::{Deserialize, Serialize};

use crate::error::EpiError;
use crate::simulation::Simulation;
use crate::snapshot::StatusCounts;
use crate::status::Status;

/// One row of the counts report.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCounts {
    pub day: u32,
    pub susceptible: usize,
    pub infected: usize,
    pub recovered: usize,
    pub dead: usize,
    pub vaccinated: usize,
}

impl DailyCounts {
    #[must_use]
    pub fn new(day: u32, counts: &StatusCounts) -> Self {
        DailyCounts {
            day,
            susceptible: counts[Status::Susceptible],
            infected: counts[Status::Infected],
            recovered: counts[Status::Recovered],
            dead: counts[Status::Dead],
            vaccinated: counts[Status::Vaccinated],
        }
    }
}

// Checks that the path is valid. Creates the file and all parent directories if they do not
// exist.
fn generate_validate_filepath(path: &Path) -> Result<File, EpiError> {
    match path.extension().and_then(OsStr::to_str) {
        Some("csv") => {
            if let Some(parent) = path.parent() {
                create_dir_all(parent)?;
            }
            let file = File::create(path)?;
            Ok(file)
        }
        _ => Err(EpiError::ReportError(
            "Report output files must be CSVs at this time".to_string(),
        )),
    }
}

pub struct CountsReport {
    writer: Writer<File>,
    rows: usize,
}

impl CountsReport {
    /// Creates (or truncates) the report file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `EpiError::ReportError` if `path` is not a `.csv` file and `EpiError::IoError` if
    /// it cannot be created.
    pub fn create(path: &Path) -> Result<Self, EpiError> {
        let file = generate_validate_filepath(path)?;
        Ok(CountsReport {
            writer: Writer::from_writer(file),
            rows: 0,
        })
    }

    /// Writes the simulation's current day and status counts as a new row.
    ///
    /// # Errors
    ///
    /// Returns `EpiError::CSVError` or `EpiError::IoError` if the row cannot be written.
    pub fn record(&mut self, simulation: &Simulation) -> Result<(), EpiError> {
        self.write(DailyCounts::new(
            simulation.current_day(),
            &simulation.status_counts(),
        ))
    }

    /// # Errors
    ///
    /// Returns `EpiError::CSVError` or `EpiError::IoError` if the row cannot be written.
    pub fn write(&mut self, row: DailyCounts) -> Result<(), EpiError> {
        self.writer.serialize(row)?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    /// Number of rows written so far.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }
}
