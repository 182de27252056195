// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! The step grid.
//!
//! An 8 x 16 grid stored sparsely: only cells that are switched on
//! exist. Each cell cycles Off -> Play -> Stop -> Off when toggled.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{NUM_ROWS, NUM_STEPS};
use crate::error::ValidationError;

/// State of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellState {
    /// Nothing happens on this step
    #[default]
    Off,
    /// Start the row's clip from its start offset
    Play,
    /// Stop the row's clip
    Stop,
}

impl CellState {
    /// The state a toggle moves to
    pub fn next(self) -> Self {
        match self {
            CellState::Off => CellState::Play,
            CellState::Play => CellState::Stop,
            CellState::Stop => CellState::Off,
        }
    }
}

/// A switched-on cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub state: CellState,
}

impl Cell {
    pub fn new(row: usize, col: usize, state: CellState) -> Self {
        Self { row, col, state }
    }
}

/// Sparse cell grid, persisted as a flat list of cells
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Cell>", into = "Vec<Cell>")]
pub struct CellGrid {
    /// Keyed by (row, col); absent means Off
    cells: BTreeMap<(usize, usize), CellState>,
}

fn check_bounds(row: usize, col: usize) -> Result<(), ValidationError> {
    if row >= NUM_ROWS {
        return Err(ValidationError::RowOutOfRange(row));
    }
    if col >= NUM_STEPS {
        return Err(ValidationError::ColumnOutOfRange(col));
    }
    Ok(())
}

impl CellGrid {
    /// Create an empty grid
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one cell through Off -> Play -> Stop -> Off.
    ///
    /// Returns the cell's new state. No other cell is touched.
    pub fn toggle(&mut self, row: usize, col: usize) -> Result<CellState, ValidationError> {
        check_bounds(row, col)?;

        let next = self.state_at(row, col).next();
        if next == CellState::Off {
            self.cells.remove(&(row, col));
        } else {
            self.cells.insert((row, col), next);
        }
        Ok(next)
    }

    /// State of one cell; out-of-range positions read as Off
    pub fn state_at(&self, row: usize, col: usize) -> CellState {
        self.cells.get(&(row, col)).copied().unwrap_or_default()
    }

    /// All switched-on cells in a column, ordered by row
    pub fn cells_at_column(&self, col: usize) -> Vec<Cell> {
        (0..NUM_ROWS)
            .filter_map(|row| {
                self.cells
                    .get(&(row, col))
                    .map(|&state| Cell::new(row, col, state))
            })
            .collect()
    }

    /// Iterate over all switched-on cells, row-major
    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells
            .iter()
            .map(|(&(row, col), &state)| Cell::new(row, col, state))
    }

    /// Number of switched-on cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Switch every cell off
    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

impl TryFrom<Vec<Cell>> for CellGrid {
    type Error = String;

    fn try_from(cells: Vec<Cell>) -> Result<Self, Self::Error> {
        let mut grid = CellGrid::new();
        for cell in cells {
            check_bounds(cell.row, cell.col).map_err(|e| e.to_string())?;
            if cell.state == CellState::Off {
                continue;
            }
            if grid.cells.insert((cell.row, cell.col), cell.state).is_some() {
                return Err(format!("duplicate cell at row {} col {}", cell.row, cell.col));
            }
        }
        Ok(grid)
    }
}

impl From<CellGrid> for Vec<Cell> {
    fn from(grid: CellGrid) -> Self {
        grid.iter().collect()
    }
}
