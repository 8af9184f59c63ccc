// src/processing/mod.rs
//! Derived physiological metrics

pub mod stress_index;

pub use stress_index::*;
