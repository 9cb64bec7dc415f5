//! Command implementations.
//!
//! Each command takes the shared [`AppState`](shine_storefront::state::AppState)
//! and prints for a human reader. The catalog lives in memory, so commands
//! that need products refresh it first.

pub mod account;
pub mod advisor;
pub mod cart;
pub mod catalog;
