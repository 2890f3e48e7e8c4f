//! Fixed-size, row-major storage for the population.
//!
//! Cells are addressed by `(row, col)` with `row < height` and `col < width`. A `Grid` knows
//! nothing about days or transitions; [`crate::simulation::Simulation`] keeps two of them and
//! swaps them every day.
use crate::individual::Individual;
use crate::probability::ProbabilityTables;
use crate::random::RngStore;
use crate::status::Status;

#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Individual>,
}

impl Grid {
    /// Wraps an existing row-major vector of cells.
    ///
    /// # Panics
    ///
    /// Panics if `cells.len() != width * height`.
    #[must_use]
    pub fn from_cells(width: usize, height: usize, cells: Vec<Individual>) -> Self {
        assert_eq!(
            cells.len(),
            width * height,
            "a {width}x{height} grid needs {} cells",
            width * height
        );
        Grid {
            width,
            height,
            cells,
        }
    }

    /// Fills a `width × height` grid with susceptible individuals of randomly sampled ages.
    pub fn populate(
        width: usize,
        height: usize,
        rngs: &mut RngStore,
        tables: &ProbabilityTables,
        infection_length: u32,
    ) -> Self {
        let cells = (0..width * height)
            .map(|_| Individual::new(rngs, tables, infection_length))
            .collect();
        Grid::from_cells(width, height, cells)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[must_use]
    pub fn index(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.height && col < self.width);
        row * self.width + col
    }

    #[must_use]
    pub fn coords(&self, idx: usize) -> (usize, usize) {
        (idx / self.width, idx % self.width)
    }

    /// # Panics
    ///
    /// Panics if `(row, col)` lies outside the grid.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> &Individual {
        assert!(row < self.height && col < self.width, "({row}, {col}) is off the grid");
        &self.cells[self.index(row, col)]
    }

    /// # Panics
    ///
    /// Panics if `(row, col)` lies outside the grid.
    pub fn get_mut(&mut self, row: usize, col: usize) -> &mut Individual {
        assert!(row < self.height && col < self.width, "({row}, {col}) is off the grid");
        let idx = self.index(row, col);
        &mut self.cells[idx]
    }

    #[must_use]
    pub fn cells(&self) -> &[Individual] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Individual] {
        &mut self.cells
    }

    /// Iterates over `(row, col, individual)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Individual)> + '_ {
        self.cells.iter().enumerate().map(|(idx, individual)| {
            let (row, col) = self.coords(idx);
            (row, col, individual)
        })
    }

    /// Overwrites every cell with the corresponding cell of `other`. Both grids must have the
    /// same shape.
    pub fn copy_from(&mut self, other: &Grid) {
        debug_assert_eq!((self.width, self.height), (other.width, other.height));
        self.cells.copy_from_slice(&other.cells);
    }

    /// The coordinates of the up-to-8 cells adjacent to `(row, col)`. Edges are clamped, there is
    /// no wraparound.
    pub fn neighbors(&self, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> {
        let rows = row.saturating_sub(1)..(row + 2).min(self.height);
        let cols = col.saturating_sub(1)..(col + 2).min(self.width);
        rows.flat_map(move |r| cols.clone().map(move |c| (r, c)))
            // Don't count self as a neighbor
            .filter(move |&(r, c)| (r, c) != (row, col))
    }

    /// The infection pressure on `(row, col)`: how many adjacent cells are infected.
    #[must_use]
    pub fn infected_neighbors(&self, row: usize, col: usize) -> usize {
        self.neighbors(row, col)
            .filter(|&(r, c)| self.cells[self.index(r, c)].status() == Status::Infected)
            .count()
    }

    pub fn count_status(&self, status: Status) -> usize {
        self.cells
            .iter()
            .filter(|individual| individual.status() == status)
            .count()
    }
}
