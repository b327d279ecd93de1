//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`] — available LLM backends
//! - [`question::Question`] — a validated question posed to the council
//! - [`error::DomainError`] — domain-level errors

pub mod error;
pub mod model;
pub mod question;
