//! finbot: a webhook-driven finance chat assistant
//!
//! Messages arrive over HTTP, are gated to the finance domain by a
//! model-backed classifier, optionally grounded with live web search, and
//! answered by a remote completion service.

pub mod cli;
pub mod config;
pub mod console;
pub mod gateway;
pub mod orchestrator;
pub mod providers;
pub mod search;
pub mod session;
pub mod webhook;
