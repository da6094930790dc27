//! Core infrastructure for recipe execution
//!
//! Settings, versions, error types, source tables and package manifests.
//! Nothing in here touches the network.

pub mod cppstd;
pub mod error;
pub mod manifest;
pub mod output;
pub mod settings;
pub mod sources;
pub mod version;
