//! Core types for the GiftWise conversation engine
//!
//! This crate provides foundational types used across all other crates:
//! - Transcript messages and roles
//! - Persona definitions and confidence tiers
//! - Product records, platforms, and budget tiers
//! - Session metrics snapshots

pub mod message;
pub mod metrics;
pub mod persona;
pub mod product;

pub use message::{Message, MessageChoice, MessageRole};
pub use metrics::MetricsSnapshot;
pub use persona::{Confidence, Persona};
pub use product::{BudgetTier, Platform, Product};
