//! Shared test utilities for the object-sync workspace.
//!
//! This crate provides standardised fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only — never published.
//!
//! # Modules
//!
//! - [`store`] — [`MemoryStore`], a fully in-memory [`sync_model::ObjectStore`]
//! - [`validator`] — [`StaticValidator`], a scripted validation collaborator

pub mod store;
pub mod validator;

pub use store::MemoryStore;
pub use validator::StaticValidator;
