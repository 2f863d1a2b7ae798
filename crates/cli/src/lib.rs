//! Terminal output for the geosearch command-line tool
//!
//! Provides shared CLI functionality:
//! - Status messages on stderr (stdout is reserved for results)
//! - Result listings and number formatting
//! - Progress spinners

#![warn(missing_docs)]

pub mod output;
pub mod progress;
