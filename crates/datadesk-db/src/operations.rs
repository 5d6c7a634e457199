//! Database write and read operations.

pub mod dataframes;
pub mod unstructured;
