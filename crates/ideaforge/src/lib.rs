//! An idea refinement assistant: a model interviews you about an idea and
//! turns the conversation into a structured product report.
//!
//! The crate includes a CLI tool for using in the terminal. And you can also
//! use it as a library to bring the interview into your own host apps.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod session;

pub use session::{Interview, Session, SessionBuilder};

/// Re-exports of [`ideaforge_core`] crate.
pub mod core {
    pub use ideaforge_core::*;
}
