//! Drag-and-drop reorder computation
//!
//! Moving the item at position `from` to position `to` only renumbers the
//! contiguous range between the two positions. Items outside the range keep
//! their `display_order`.

use crate::{Error, Result};
use serde::Serialize;

/// New `display_order` for one sibling
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderUpdate {
    pub code: String,
    pub display_order: i64,
}

/// Compute the `display_order` writes for moving `items[from]` to `to`
///
/// `items` are sibling codes in their current display order. Returns an empty
/// plan when `from == to`.
pub fn reorder_plan(items: &[String], from: usize, to: usize) -> Result<Vec<OrderUpdate>> {
    if from >= items.len() || to >= items.len() {
        return Err(Error::InvalidInput(format!(
            "Reorder index out of range: from={} to={} (count {})",
            from,
            to,
            items.len()
        )));
    }

    if from == to {
        return Ok(Vec::new());
    }

    let mut plan = Vec::with_capacity(from.abs_diff(to) + 1);
    if from < to {
        // Dragging down: everything between shifts up by one
        for (i, code) in items.iter().enumerate().take(to + 1).skip(from + 1) {
            plan.push(OrderUpdate {
                code: code.clone(),
                display_order: i as i64 - 1,
            });
        }
    } else {
        // Dragging up: everything between shifts down by one
        for (i, code) in items.iter().enumerate().take(from).skip(to) {
            plan.push(OrderUpdate {
                code: code.clone(),
                display_order: i as i64 + 1,
            });
        }
    }

    plan.push(OrderUpdate {
        code: items[from].clone(),
        display_order: to as i64,
    });

    Ok(plan)
}
