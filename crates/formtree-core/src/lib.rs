//! formtree-core
//!
//! Wire vocabulary for hierarchical assessment forms (LHC-Forms style JSON),
//! answer-list normalization and evaluator configuration. Pure data, no
//! evaluation logic.

pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
