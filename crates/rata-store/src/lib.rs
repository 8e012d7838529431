//! Client-side materials store for RataTutor.
//!
//! [`MaterialsStore`] mirrors the user's active and trashed materials and
//! exposes the transitions between them. Every transition that touches the
//! server is remote-gated: local state changes only after the
//! [`MaterialsRemote`](rata_core::MaterialsRemote) call has succeeded, and it
//! is reconciled against the canonical record the server returns.

mod store;

pub mod config;
pub mod error;
pub mod events;
pub mod feedback;
#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod selectors;
pub mod state;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use events::{MaterialsChange, Subscription};
pub use feedback::{Feedback, Silent, Toast, ToastVariant};
pub use selectors::{MaterialFilter, TimeWindow};
pub use state::StoreState;
pub use store::{BulkRemoval, FetchOutcome, MaterialsStore};
