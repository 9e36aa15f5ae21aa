//! trackmart-genres library interface
//!
//! Genre analytics over the mart dataset: normalization of heterogeneous
//! genre fields, label cleaning, and ranked per-genre statistics.

pub mod field;
pub mod stats;
