//! Workflow orchestration behind the command-line shell.

pub mod orchestration;
