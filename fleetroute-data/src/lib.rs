//! External data adapters for the fleetroute engine.
//!
//! Responsibilities:
//! - Implement `fleetroute-core` strategy traits against network services.
//! - Encapsulate wire formats of those services.
//!
//! Boundaries:
//! - Do not encode planning rules (they live in `fleetroute-core` and the
//!   solver crates).
//! - Keep blocking I/O off async executors; prefer async-capable clients.
//!
//! Invariants:
//! - Thread-safe by default where feasible.
//! - No global mutable state.

#![forbid(unsafe_code)]

pub mod routing;
