//! # Datakeeper Testkit
//!
//! Test utilities for Datakeeper.
//!
//! This crate provides:
//! - Test fixtures and vault helpers
//! - Property-based test generators using proptest
//! - A failure-injecting store for exercising the file saga
//! - A model-based integration harness
//! - Fuzz testing harnesses
//! - Stress testing utilities
//!
//! ## Usage
//!
//! ```rust
//! use datakeeper_testkit::prelude::*;
//! use datakeeper_core::CredentialSecret;
//!
//! with_test_vault(|vault, ctx| {
//!     let secret = CredentialSecret {
//!         name: "site".into(),
//!         login: "bob".into(),
//!         password: "pw1".into(),
//!     };
//!     vault.credentials().create(ctx, secret).unwrap();
//!     assert_eq!(vault.credentials().list(ctx).unwrap().len(), 1);
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod faults;
pub mod fixtures;
pub mod fuzz;
pub mod generators;
pub mod integration;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::faults::*;
    pub use crate::fixtures::*;
    pub use crate::fuzz::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
    pub use crate::stress::*;
}

pub use faults::*;
pub use fixtures::*;
pub use fuzz::*;
pub use generators::*;
pub use integration::*;
pub use stress::*;
