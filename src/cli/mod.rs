//! Native CLI support for the tspack binary.

pub mod args;
pub mod driver;

#[cfg(test)]
#[path = "tests/driver_tests.rs"]
mod driver_tests;
