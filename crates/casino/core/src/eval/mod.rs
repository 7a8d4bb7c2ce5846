//! Hand evaluation shared by the card tables.
pub mod poker;

pub use poker::*;
