//! # Toolgate Core
//!
//! Domain types, traits, and error definitions for the Toolgate permission
//! engine. This crate pulls in no runtime or I/O framework. It defines the
//! boundary between an agent runtime that wants to run tools and the engine
//! that decides whether it may.
//!
//! ## Design Philosophy
//!
//! The agent runtime only ever sees two things: a [`ToolRequest`] going in and
//! a [`PermissionDecision`] coming out. Everything between those two points
//! (risk classification, operator prompting, decision memory) lives in
//! `toolgate-permissions` and is reached through the [`PermissionHandler`]
//! trait. Operator I/O goes through the [`Console`] trait so prompts can be
//! driven from a terminal, a test script, or anything else that speaks lines.

pub mod console;
pub mod error;
pub mod request;
pub mod risk;

// Re-export key types at crate root for ergonomics
pub use console::Console;
pub use error::{ConsoleError, Error, Result};
pub use request::{PermissionDecision, PermissionHandler, ToolRequest};
pub use risk::{RiskLevel, RiskProfile, ToolCategory};
