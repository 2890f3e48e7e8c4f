//! Policy interventions that scale one probability field of the whole population for a while.
//!
//! A [`Measure`] multiplies every individual's working probability for its [`TargetField`] on
//! each of its start days and divides it back on each of its end days. The four standing
//! interventions only differ in data, see [`MeasureKind`].
//!
//! Two measures scaling the same field during overlapping windows compound each other, which
//! is almost never what a configuration means. [`Measures::new`] detects this: by default it
//! logs a warning (and warns again on the day the second window opens), with
//! `strict` it refuses the configuration.
use std::collections::BTreeSet;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::error::EpiError;
use crate::grid::Grid;
use crate::probability::TargetField;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MeasureKind {
    Lockdown,
    SocialDistancing,
    ImprovedTreatment,
    Ventilators,
}

impl MeasureKind {
    #[must_use]
    pub fn target(self) -> TargetField {
        match self {
            MeasureKind::Lockdown | MeasureKind::SocialDistancing => TargetField::Infection,
            MeasureKind::ImprovedTreatment => TargetField::Recovery,
            MeasureKind::Ventilators => TargetField::Death,
        }
    }

    #[must_use]
    pub fn default_multiplier(self) -> f64 {
        match self {
            MeasureKind::Lockdown => 0.25,
            MeasureKind::SocialDistancing | MeasureKind::Ventilators => 0.5,
            MeasureKind::ImprovedTreatment => 1.5,
        }
    }

    #[must_use]
    pub fn default_start_days(self) -> Vec<u32> {
        match self {
            MeasureKind::Lockdown | MeasureKind::SocialDistancing => vec![30],
            MeasureKind::ImprovedTreatment | MeasureKind::Ventilators => vec![40],
        }
    }

    /// Only a lockdown is lifted by default; the others stay in force once started.
    #[must_use]
    pub fn default_end_days(self) -> Vec<u32> {
        match self {
            MeasureKind::Lockdown => vec![60],
            _ => Vec::new(),
        }
    }
}

/// The configuration of one measure. Anything left out falls back to the kind's preset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeasureParameters {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_days: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_days: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<f64>,
}

impl MeasureParameters {
    /// An enabled measure with the kind's preset windows and multiplier.
    #[must_use]
    pub fn enabled() -> Self {
        MeasureParameters {
            enabled: true,
            ..MeasureParameters::default()
        }
    }
}

/// The configuration of all four standing measures. All are disabled by default.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeasuresParameters {
    pub lockdown: MeasureParameters,
    pub social_distancing: MeasureParameters,
    pub improved_treatment: MeasureParameters,
    pub ventilators: MeasureParameters,
}

impl MeasuresParameters {
    #[must_use]
    pub fn get(&self, kind: MeasureKind) -> &MeasureParameters {
        match kind {
            MeasureKind::Lockdown => &self.lockdown,
            MeasureKind::SocialDistancing => &self.social_distancing,
            MeasureKind::ImprovedTreatment => &self.improved_treatment,
            MeasureKind::Ventilators => &self.ventilators,
        }
    }

    pub fn get_mut(&mut self, kind: MeasureKind) -> &mut MeasureParameters {
        match kind {
            MeasureKind::Lockdown => &mut self.lockdown,
            MeasureKind::SocialDistancing => &mut self.social_distancing,
            MeasureKind::ImprovedTreatment => &mut self.improved_treatment,
            MeasureKind::Ventilators => &mut self.ventilators,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Measure {
    kind: MeasureKind,
    target: TargetField,
    multiplier: f64,
    start_days: BTreeSet<u32>,
    end_days: BTreeSet<u32>,
    // Started windows that have not ended yet.
    open_windows: u32,
}

impl Measure {
    /// # Errors
    ///
    /// Returns `EpiError::ConfigurationError` if the multiplier is not a positive, finite number.
    pub fn new(
        kind: MeasureKind,
        multiplier: f64,
        start_days: impl IntoIterator<Item = u32>,
        end_days: impl IntoIterator<Item = u32>,
    ) -> Result<Self, EpiError> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(EpiError::ConfigurationError(format!(
                "{kind} multiplier must be a positive number, got {multiplier}"
            )));
        }
        Ok(Measure {
            kind,
            target: kind.target(),
            multiplier,
            start_days: start_days.into_iter().collect(),
            end_days: end_days.into_iter().collect(),
            open_windows: 0,
        })
    }

    /// Builds the measure from its configuration, filling gaps from the kind's presets.
    /// Returns `None` for a disabled measure.
    ///
    /// # Errors
    ///
    /// Returns `EpiError::ConfigurationError` if the multiplier is not a positive, finite number.
    pub fn from_parameters(
        kind: MeasureKind,
        parameters: &MeasureParameters,
    ) -> Result<Option<Self>, EpiError> {
        if !parameters.enabled {
            return Ok(None);
        }
        let start_days = parameters
            .start_days
            .clone()
            .unwrap_or_else(|| kind.default_start_days());
        let end_days = parameters
            .end_days
            .clone()
            .unwrap_or_else(|| kind.default_end_days());
        let multiplier = parameters
            .multiplier
            .unwrap_or_else(|| kind.default_multiplier());
        Measure::new(kind, multiplier, start_days, end_days).map(Some)
    }

    #[must_use]
    pub fn kind(&self) -> MeasureKind {
        self.kind
    }

    #[must_use]
    pub fn target(&self) -> TargetField {
        self.target
    }

    #[must_use]
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.open_windows > 0
    }

    /// Number of windows open after all of `day`'s events, ignoring run-time state.
    fn open_windows_after(&self, day: u32) -> usize {
        let started = self.start_days.range(..=day).count();
        let ended = self.end_days.range(..=day).count();
        started.saturating_sub(ended)
    }

    fn event_days(&self) -> impl Iterator<Item = u32> + '_ {
        self.start_days.iter().chain(self.end_days.iter()).copied()
    }

    /// The first day on which both measures have a window open, if they scale the same field.
    #[must_use]
    pub fn first_overlap(&self, other: &Measure) -> Option<u32> {
        if self.target != other.target {
            return None;
        }
        let days: BTreeSet<u32> = self.event_days().chain(other.event_days()).collect();
        days.into_iter()
            .find(|&day| self.open_windows_after(day) > 0 && other.open_windows_after(day) > 0)
    }

    /// Applies this measure's events for `current_day` to every individual in `grid`. The start
    /// is applied before the end, so a day that is both leaves probabilities unchanged.
    ///
    /// Returns whether a window was opened today.
    pub fn apply(&mut self, grid: &mut Grid, current_day: u32) -> bool {
        let starts = self.start_days.contains(&current_day);
        let ends = self.end_days.contains(&current_day);

        if starts {
            for individual in grid.cells_mut() {
                individual.scale(self.target, self.multiplier);
            }
            self.open_windows += 1;
            debug!(
                "day {current_day}: {} started, {} probability scaled by {}",
                self.kind, self.target, self.multiplier
            );
        }
        if ends {
            for individual in grid.cells_mut() {
                individual.unscale(self.target, self.multiplier);
            }
            self.open_windows = self.open_windows.saturating_sub(1);
            debug!(
                "day {current_day}: {} ended, {} probability restored",
                self.kind, self.target
            );
        }
        starts && !ends
    }
}

/// The enabled measures of a run, applied in a fixed order every day.
#[derive(Clone, Debug, Default)]
pub struct Measures {
    measures: Vec<Measure>,
}

impl Measures {
    /// Builds the enabled measures and checks that no two of them scale the same field at the
    /// same time.
    ///
    /// # Errors
    ///
    /// Returns `EpiError::ConfigurationError` for a bad multiplier, and
    /// `EpiError::InvariantViolation` for overlapping same-field windows when `strict` is set.
    pub fn new(parameters: &MeasuresParameters, strict: bool) -> Result<Self, EpiError> {
        let mut measures = Vec::new();
        for kind in MeasureKind::iter() {
            if let Some(measure) = Measure::from_parameters(kind, parameters.get(kind))? {
                measures.push(measure);
            }
        }
        Measures::from_measures(measures, strict)
    }

    /// # Errors
    ///
    /// Returns `EpiError::InvariantViolation` for overlapping same-field windows when `strict`
    /// is set.
    pub fn from_measures(measures: Vec<Measure>, strict: bool) -> Result<Self, EpiError> {
        for (i, first) in measures.iter().enumerate() {
            for second in &measures[i + 1..] {
                if let Some(day) = first.first_overlap(second) {
                    let message = format!(
                        "{} and {} both scale the {} probability from day {day}",
                        first.kind, second.kind, first.target
                    );
                    if strict {
                        return Err(EpiError::InvariantViolation(message));
                    }
                    warn!("{message}; their multipliers will compound");
                }
            }
        }
        Ok(Measures { measures })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.measures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.measures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Measure> {
        self.measures.iter()
    }

    /// The measures with a window open right now.
    pub fn active(&self) -> impl Iterator<Item = &Measure> {
        self.measures.iter().filter(|measure| measure.is_active())
    }

    /// Applies every measure's events for `current_day`, in order.
    pub fn apply(&mut self, grid: &mut Grid, current_day: u32) {
        for i in 0..self.measures.len() {
            if !self.measures[i].apply(grid, current_day) {
                continue;
            }
            let opened = &self.measures[i];
            for other in &self.measures {
                if !std::ptr::eq(other, opened)
                    && other.is_active()
                    && other.target == opened.target
                {
                    warn!(
                        "day {current_day}: {} started while {} is already scaling the {} probability",
                        opened.kind, other.kind, opened.target
                    );
                }
            }
        }
    }
}
