//! App tester core library
//!
//! Clones embedded applications, builds, tests and statically analyses
//! them for every selected device, and records per-device, per-variant
//! results.

pub mod application;
pub mod config;
pub mod device;
pub mod error;
pub mod pipeline;
pub mod result;
pub mod runner;
pub mod split;
pub mod stages;
pub mod variants;
pub mod workspace;

pub use application::{load_applications, ApplicationSpec};
pub use config::{RunConfig, TesterConfig};
pub use device::{Device, DeviceModel, Devices};
pub use error::{Result, TesterError};
pub use pipeline::{Pipeline, RunSummary};
pub use result::{AppResult, DeviceResult, DeviceResults, Stage, Status, VariantResult};
pub use runner::{CommandOutcome, CommandRunner, ShellRunner};
pub use workspace::{SetupOutcome, Workspace};
