//! Datadesk Core - Record model shared by the connectors, the store and the index.

mod spec;
mod types;

pub use spec::{DataInfo, Specification};
pub use types::*;
