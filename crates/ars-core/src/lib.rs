//! # ars-core
//!
//! Core types, ID generation, and error types for the research studio client.
//!
//! This crate provides the foundational types shared across all `ars` crates:
//! - Entity structs for the chat thread and backend research snapshots
//! - Status and customization enums
//! - ID prefix constants and generation helpers
//! - Wire request/response types for the research backend
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod responses;
