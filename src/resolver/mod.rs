//! Resolution of test-wrapper files to the sources they exercise.
//!
//! A wrapper such as `test_ex2_obc_software/drivers/test_uart.c` names its
//! system under test by dropping the `test_` token and looking the result up
//! in the tree two levels above the tooling directory.

mod candidate;
mod walker;

pub use walker::{Resolver, ScanError, ScanSummary};
