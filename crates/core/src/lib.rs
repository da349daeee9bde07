//! RocketShoes Core - Shared cart and catalog types.
//!
//! This crate provides the types used across all RocketShoes components:
//! - `cart` - Cart state machine, inventory client and snapshot storage
//! - `cli` - Command-line consumer of the cart operations
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! storage access, no HTTP clients. Every cart transition here returns a new
//! [`Cart`] value; deciding *whether* a transition is allowed (stock checks)
//! and persisting it is the job of the `rocketshoes-cart` crate.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, catalog entries, stock levels and the cart itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
