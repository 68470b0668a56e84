//! Row placement.
//!
//! Each of the five rows has five width units. Buttons take one unit,
//! selects and text inputs take the whole row.

use crate::component::ActionRow;
use crate::error::{ComponentError, ComponentResult};

use super::Item;

/// Number of rows a message or modal can hold.
pub const MAX_ROWS: u8 = 5;
/// Width units available in one row.
pub const ROW_WIDTH: u8 = 5;
/// Maximum number of items one session can hold.
pub const MAX_ITEMS: usize = 25;

/// Tracks used width per row and assigns rows to items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowLayout {
    weights: [u8; MAX_ROWS as usize],
}

impl RowLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `item`, honouring its requested row if it has one.
    ///
    /// On success the item's rendered row is set and returned. On failure
    /// the layout is left untouched.
    pub fn place(&mut self, item: &mut Item) -> ComponentResult<u8> {
        let width = item.width();

        if let Some(row) = item.get_row() {
            if row >= MAX_ROWS {
                return Err(ComponentError::InvalidRow(row));
            }
            let weight = &mut self.weights[row as usize];
            if *weight + width > ROW_WIDTH {
                return Err(ComponentError::RowFull { row, width });
            }
            *weight += width;
            item.set_rendered_row(Some(row));
            return Ok(row);
        }

        for (row, weight) in self.weights.iter_mut().enumerate() {
            if *weight + width <= ROW_WIDTH {
                *weight += width;
                let row = row as u8;
                item.set_rendered_row(Some(row));
                return Ok(row);
            }
        }

        Err(ComponentError::HandlerFull { width })
    }

    /// Frees the width held by `item` and clears its rendered row.
    pub fn release(&mut self, item: &mut Item) {
        if let Some(row) = item.rendered_row() {
            let weight = &mut self.weights[row as usize];
            *weight = weight.saturating_sub(item.width());
            item.set_rendered_row(None);
        }
    }

    pub fn clear(&mut self) {
        self.weights = [0; MAX_ROWS as usize];
    }

    /// Width currently used in `row`.
    pub fn used(&self, row: u8) -> u8 {
        self.weights.get(row as usize).copied().unwrap_or(0)
    }
}

/// Groups items into action rows ordered by rendered row.
///
/// Items keep their relative order within a row. Empty rows are omitted.
pub fn build_rows<'a>(items: impl IntoIterator<Item = &'a Item>) -> Vec<ActionRow> {
    let mut sorted: Vec<&Item> = items.into_iter().collect();
    sorted.sort_by_key(|item| item.rendered_row().or(item.get_row()).unwrap_or(0));

    let mut rows: Vec<ActionRow> = Vec::new();
    let mut current: Option<u8> = None;
    for item in sorted {
        let row = item.rendered_row().or(item.get_row()).unwrap_or(0);
        match rows.last_mut() {
            Some(last) if current == Some(row) => last.components.push(item.to_component()),
            _ => {
                rows.push(ActionRow::new(vec![item.to_component()]));
                current = Some(row);
            }
        }
    }
    rows
}
