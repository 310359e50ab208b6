//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Keep the (external) API layer decoupled from storage details.

pub mod dto;
pub mod study_log_service;
