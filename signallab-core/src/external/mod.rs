//! External collaborators: execution engine, expiry calendar, margin
//! pricing, and the lot-size reference table.
//!
//! Each collaborator is a trait so the runner and tests can substitute
//! fakes; the HTTP implementations use a blocking reqwest client with a
//! fixed per-call timeout and a bounded linear-backoff retry policy.

pub mod calendar;
pub mod engine;
pub mod lot_size;
pub mod margin;
pub mod retry;
