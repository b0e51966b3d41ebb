/// Identifiers, enumerations and money rounding shared by every module.
pub mod types;

/// Account record and the business rules for moving money in and out of it.
pub mod account;

/// Untyped account drafts and money-movement commands handed over by adapters.
pub mod command;

/// Account store interface, plus "in memory" implementation behind a single lock.
pub mod store;

/// Append-only per-account transaction log, plus "in memory" implementation.
pub mod history;

/// Ledger service: coordinates the store and the log to deposit, withdraw and pay.
pub mod service;

/// CSV adapter around [`service`]. It lives here rather than in the binary
/// so that integration tests can drive it.
pub mod bin_utils;
