//! Profit/loss log presentation.
//!
//! Records come from the bot with an open schema; columns are ordered and
//! formatted from their names.

pub mod format;
pub mod table;

pub use format::{format_cell, format_timestamp, ColumnKind, EMPTY_CELL};
pub use table::{column_label, column_order, Cell, Column, LogTable, Tone, PREFERRED_COLUMNS};
