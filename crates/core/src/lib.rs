//! Core logic of the idea interview: prompts, model access with retries,
//! report extraction and the interview state machine.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

pub mod conversation;
pub mod error;
pub mod export;
pub mod gateway;
pub mod interview;
pub mod prompt;
pub mod report;
pub mod store;

pub use error::{Error, Result};
pub use gateway::{GatewayConfig, ModelGateway};
pub use interview::InterviewOrchestrator;
