//! Golden-output test harness for the `jet` interpreter.
//!
//! Fixtures are `.jet` files carrying `;OUTPUT: <text>` annotations. Each
//! fixture becomes one test that runs the interpreter on the file and checks
//! its combined stdout and stderr, line by line, against the annotations.

pub mod annotation;
pub mod case;
pub mod compare;
pub mod config;
pub mod error;
pub mod executor;
pub mod fixtures;
pub mod runner;
pub mod suite;

pub use case::TestCase;
pub use compare::compare;
pub use config::HarnessConfig;
pub use error::{
    CaseFailure, DiscoveryError, ExecutionError, FixtureReadError, LineMismatch, Mismatch,
    SuiteError,
};
pub use executor::CapturedOutput;
pub use runner::{run_tests, Report};
pub use suite::{RegisteredTest, Suite, SuiteSpec};
