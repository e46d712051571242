pub mod analyzer;
pub mod changelog;
pub mod cli;
pub mod config;
pub mod conventional;
pub mod domain;
pub mod error;
pub mod git;
pub mod ledger;
pub mod ui;
pub mod workspace;

pub use error::{ReleaseError, Result};
