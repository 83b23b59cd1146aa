//! Core types for Pulsefit.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod status;

pub use cart::{CartItem, CartSession};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use status::*;
