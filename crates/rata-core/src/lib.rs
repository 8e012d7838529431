//! Core types and trait definitions for the RataTutor materials client.
//!
//! This crate is deliberately free of HTTP and runtime dependencies. The store,
//! the HTTP client and the CLI all depend on it.

pub mod content;
pub mod error;
pub mod material;
pub mod remote;

pub use error::{Error, Result};
pub use material::{Material, MaterialId, MaterialPatch, MaterialStatus, NewMaterial};
pub use remote::MaterialsRemote;
