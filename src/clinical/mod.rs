//! Code for working with TCGA clinical patient tables.

pub mod combine;
pub mod table;
