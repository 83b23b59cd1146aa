//! Pulsefit Core - Shared types library.
//!
//! This crate provides common types used across all Pulsefit components:
//! - `cart` - Client-side cart state and synchronization engine
//! - `cli` - Command-line tools for simulation and diagnostics
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no timers.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, statuses, and the cart data model

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
