//! Service tests for the harness
//!
//! Registry, publisher, runner and orchestrator exercised in-process; the
//! runner tests that need a socket bind their own on 127.0.0.1.

pub mod helpers;
