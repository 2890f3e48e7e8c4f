//! Read-only projections of the population for reports, plots and renderers.
use std::ops::Index;

use serde::Serialize;
use strum::{EnumCount, IntoEnumIterator};

use crate::individual::{AgeBracket, AGE_BRACKETS};
use crate::simulation::Simulation;
use crate::status::Status;

/// An RGB triple.
pub type Color = [u8; 3];

impl Status {
    #[must_use]
    pub fn color(self) -> Color {
        match self {
            Status::Susceptible => [255, 255, 0],
            Status::Infected => [255, 0, 0],
            Status::Recovered => [0, 0, 255],
            Status::Dead => [0, 0, 0],
            Status::Vaccinated => [0, 255, 0],
        }
    }
}

/// How many individuals are in each status.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusCounts([usize; Status::COUNT]);

impl StatusCounts {
    #[must_use]
    pub fn get(&self, status: Status) -> usize {
        self.0[status.index()]
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// `(status, count)` pairs in status order.
    pub fn iter(&self) -> impl Iterator<Item = (Status, usize)> + '_ {
        Status::iter().map(|status| (status, self.get(status)))
    }
}

impl Index<Status> for StatusCounts {
    type Output = usize;

    fn index(&self, status: Status) -> &usize {
        &self.0[status.index()]
    }
}

impl Serialize for StatusCounts {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Number of sampled individuals per age bracket.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgeBracketCount {
    pub bracket: AgeBracket,
    pub count: usize,
}

impl Simulation {
    #[must_use]
    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = [0; Status::COUNT];
        for individual in self.grid().cells() {
            counts[individual.status().index()] += 1;
        }
        StatusCounts(counts)
    }

    /// The share of the population in each status, in percent.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn status_percentages(&self) -> Vec<(Status, f64)> {
        let counts = self.status_counts();
        let total = counts.total() as f64;
        counts
            .iter()
            .map(|(status, count)| (status, 100.0 * count as f64 / total))
            .collect()
    }

    /// The status of every cell, `height` rows of `width` entries.
    #[must_use]
    pub fn status_grid(&self) -> Vec<Vec<Status>> {
        let grid = self.grid();
        grid.cells()
            .chunks(grid.width())
            .map(|row| row.iter().map(|individual| individual.status()).collect())
            .collect()
    }

    /// The color of every cell, `height` rows of `width` entries.
    ///
    /// With `age_shading` enabled in the parameters, each channel is darkened by the
    /// individual's age.
    #[must_use]
    pub fn color_matrix(&self) -> Vec<Vec<Color>> {
        let age_shading = self.parameters().age_shading;
        let grid = self.grid();
        grid.cells()
            .chunks(grid.width())
            .map(|row| {
                row.iter()
                    .map(|individual| {
                        let color = individual.status().color();
                        if age_shading {
                            color.map(|channel| channel.saturating_sub(individual.age()))
                        } else {
                            color
                        }
                    })
                    .collect()
            })
            .collect()
    }

    /// How the population's ages fall into the standard brackets.
    #[must_use]
    pub fn age_distribution(&self) -> Vec<AgeBracketCount> {
        AGE_BRACKETS
            .iter()
            .map(|bracket| AgeBracketCount {
                bracket: *bracket,
                count: self
                    .grid()
                    .cells()
                    .iter()
                    .filter(|individual| bracket.contains(individual.age()))
                    .count(),
            })
            .collect()
    }
}
