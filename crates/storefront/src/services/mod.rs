//! Client-side business logic.
//!
//! # Services
//!
//! - `catalog` - In-memory product catalog and display buckets
//! - `cart` - Local cart with promo codes, totals and persistence
//! - `session` - Customer sign-in state and token lifecycle
//! - `advisor` - Grounding prompt, recommendation extraction and catalog
//!   matching for the shine advisor chat
//!
//! Each service is an explicitly constructed container; nothing here is a
//! process-wide static.

pub mod advisor;
pub mod cart;
pub mod catalog;
pub mod session;
