//! Test suites for the cipher daemon.

mod support;
