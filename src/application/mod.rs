//! Application layer containing the core business logic orchestration.
//!
//! This module defines the `LedgerEngine`, the only component allowed to
//! mutate wallet balances. It relies on the store's conditional update and a
//! bounded optimistic retry loop rather than on in-process locking.

pub mod engine;
