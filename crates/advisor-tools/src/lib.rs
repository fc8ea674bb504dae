//! Advisor Tools - Tool registry, analyzers, and the analysis orchestrator
//!
//! This crate provides the tool system for Scale Advisor:
//! - Registry: tool registration and dispatch with a uniform result envelope
//! - Builtins: chat passthroughs, analyzers, Terraform generation, PR creation
//! - Orchestrator: the four-phase comprehensive analysis pipeline
//! - Tuning: the per-call model parameter table
//! - Fixtures: the mock cloud inventory and security posture

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builtins;
pub mod error;
pub mod fixtures;
pub mod orchestrator;
pub mod registry;
pub mod tuning;

pub use builtins::register_builtins;
pub use error::{Error, Result};
pub use orchestrator::{
    AnalysisPhaseOutput, ComprehensiveAnalysisTool, ReportSections, REPORT_HEADING,
};
pub use registry::{ContentBlock, Tool, ToolDescriptor, ToolRegistry, ToolResult};
