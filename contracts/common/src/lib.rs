//! Shared building blocks for the Stakeflow contracts.
//!
//! This crate provides:
//! - [`roles`]: role tags, the capabilities they grant, and their storage.
//! - [`money`]: fixed-point helpers for cent-denominated amounts and
//!   basis-point rates.
//!
//! Both modules are `no_std` friendly; the `std` feature only exists so host
//! tooling can opt into the standard library.

#![cfg_attr(not(feature = "std"), no_std)]

// ── Modules ──────────────────────────────────────────────────────────────────

pub mod money;
pub mod roles;

pub use money::*;
pub use roles::*;
