//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into caller-facing APIs.
//! - Keep bootstrap code decoupled from storage details.

pub mod user_service;
