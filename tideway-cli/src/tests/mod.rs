//! Shared test harness modules for the Tideway CLI.

use super::*;

mod helpers;
mod solve_unit;
