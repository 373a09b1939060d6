//! Terminal presentation of the entry log and its derived series.

pub mod bag;
pub mod carryover;
pub mod entries;
pub mod rates;
pub mod setup;
pub mod transfer;
pub mod ui;
