//! Invoerformaten voor de patch-pipeline.

pub mod points;
