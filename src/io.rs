//! CSV input and output for observation panels and analysis tables.

pub mod export;
pub mod load;
