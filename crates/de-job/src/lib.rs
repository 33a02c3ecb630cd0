//! Job Boundary for the Drawing Engine
//!
//! This crate provides:
//! - JSON job decoding into solid and drawing specifications
//! - A RON configuration file selecting backends and policies
//! - A runner that builds, projects and exports one job

pub mod config;
pub mod error;
pub mod job;
pub mod runner;

pub use config::{DEFAULT_LOG_FILTER, JobConfig, KernelChoice, RendererChoice};
pub use error::{ConfigError, JobError, JobResult};
pub use job::{Job, JobOutput, decode_job};
pub use runner::run_job;
