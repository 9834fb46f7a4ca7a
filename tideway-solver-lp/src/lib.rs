//! `good_lp` backend for the Tideway fleet optimizer.
//!
//! This crate provides [`GoodLpSolver`], an implementation of the
//! [`MilpSolver`](tideway_core::MilpSolver) contract. The solver translates
//! the core's integer [`LinearModel`](tideway_core::LinearModel) into a
//! `good_lp` problem and solves it with the pure-Rust `microlp`
//! branch-and-bound backend.
//!
//! `microlp` has no time limit of its own, so every solve runs on a
//! dedicated worker thread and the caller waits at most
//! [`SolverSettings::time_limit`](tideway_core::SolverSettings::time_limit).
//! A worker that outlives its budget is left to finish in the background and
//! its answer is discarded. It keeps burning CPU until then, so each solver
//! caps its live workers and refuses to start a search beyond the cap.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod solver;
mod translate;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use solver::{GoodLpSolver, LpSolverConfig};
