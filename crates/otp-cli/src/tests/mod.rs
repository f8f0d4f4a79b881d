//! Unit and behavioural tests for the client entry point.

mod support;
