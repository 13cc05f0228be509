//! Code for building and rendering mutation landscapes.

pub mod categories;
pub mod maf;
pub mod matrix;
pub mod plot;
pub mod render;
pub mod sorting;
