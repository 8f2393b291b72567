//! # Navigation Test Suite
//!
//! Unified test crate for flows that cross component boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── coordinator_benchmarks.rs  # Queue ordering, guard chain, validator
//! └── src/
//!     └── integration/
//!         ├── flows.rs               # guards → queue → controller → persistence
//!         └── runtime.rs             # Line protocol against a real state directory
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p nav-tests
//!
//! # Benchmarks
//! cargo bench -p nav-tests
//! ```

pub mod integration;
