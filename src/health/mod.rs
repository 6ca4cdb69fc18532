//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Config
//!     → checker.rs (load_config: reset store.rs to Unknown/0)
//!
//! Active checks (active.rs):
//!     Periodic timer
//!     → one probe task per endpoint
//!     → fetcher.rs (GET, bounded by the configured timeout)
//!     → state.rs (advance streak)
//!     → store.rs (write under lock)
//!
//! Reports:
//!     HTTP request → checker.rs (report) → store.rs (snapshot copy)
//! ```
//!
//! # Design Decisions
//! - One RwLock guards the whole store; reports share the read side
//! - Read-modify-write of an entry happens under a single write lock
//! - An endpoint is never probed twice concurrently; overlapping ticks skip it
//! - Probes started before a reload never write into the reloaded store

pub mod active;
pub mod checker;
pub mod fetcher;
pub mod state;
pub mod store;

pub use checker::{CheckError, Checker};
pub use fetcher::{FetchError, Fetcher, HttpFetcher};
pub use state::{EndpointStatus, State};
pub use store::StatusStore;
