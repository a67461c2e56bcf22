//! A provider-neutral protocol for chat-completion models.
//!
//! This crate establishes the contract between the interview pipeline
//! and the language-model providers it talks to, so that the pipeline
//! can switch between providers (or a scripted fake in tests) without
//! modifying the core codebase.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to. Retrying,
//! classification of failures and parsing of the model output all live
//! in the consumers of this crate.

#![deny(missing_docs)]

mod error;
mod provider;
mod request;
mod response;

pub use error::*;
pub use provider::*;
pub use request::*;
pub use response::*;
