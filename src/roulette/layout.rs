//! Betting layout grid
//!
//! Three rows by thirteen columns. Column 0 holds the house pockets; numbers
//! run down the columns, so 1, 2, 3 share column 1 and each row is a
//! column bet.

use crate::common::traits::SpaceLookup;
use crate::common::types::{TableType, DOUBLE_ZERO, ZERO};
use std::collections::HashMap;

pub const LAYOUT_ROWS: usize = 3;
pub const LAYOUT_COLUMNS: usize = 13;

#[derive(Debug, Clone)]
pub struct Layout {
    table_type: TableType,
    grid: [[Option<String>; LAYOUT_COLUMNS]; LAYOUT_ROWS],
    positions: HashMap<String, (usize, usize)>,
}

impl Layout {
    pub fn new(table_type: TableType) -> Self {
        let mut layout = Self {
            table_type,
            grid: Default::default(),
            positions: HashMap::new(),
        };

        layout.place(ZERO.to_string(), (0, 0));
        if table_type == TableType::American {
            layout.place(DOUBLE_ZERO.to_string(), (1, 0));
        }
        for number in 1..=36usize {
            layout.place(number.to_string(), ((number - 1) % 3, (number - 1) / 3 + 1));
        }

        layout
    }

    fn place(&mut self, space: String, (row, column): (usize, usize)) {
        self.grid[row][column] = Some(space.clone());
        self.positions.insert(space, (row, column));
    }

    pub fn table_type(&self) -> TableType {
        self.table_type
    }

    /// Space printed at a grid cell, if any
    pub fn space_at(&self, row: usize, column: usize) -> Option<&str> {
        self.grid.get(row)?.get(column)?.as_deref()
    }

    /// Number of labelled cells
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl SpaceLookup for Layout {
    fn position(&self, space: &str) -> Option<(usize, usize)> {
        self.positions.get(space).copied()
    }
}
