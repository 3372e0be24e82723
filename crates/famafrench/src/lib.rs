//! # famafrench
//!
//! Fama-French three-factor construction and fund exposure regressions.
//!
//! This crate provides a unified interface to the famafrench crates.
//! Individual components can be enabled via feature flags.
//!
//! ## Features
//!
//! - `full`: Enables all components
//! - `cli` (default): `full` plus the `famafrench` binary
//! - `primitives`: Core type definitions
//! - `traits`: Trait abstractions
//! - `math`: Standardization and least squares
//! - `sorts`: Size, value and 2x3 bucket sorts
//! - `model`: Factor construction and exposure regressions
//! - `utils`: CSV loaders, writers and return preparation
//!
//! ## Example
//!
//! ```rust,ignore
//! use famafrench::model::{FactorConfig, FactorSynthesizer};
//! use famafrench::utils::{DateRange, load_sort_panel};
//!
//! // Or with specific features only:
//! // [dependencies]
//! // famafrench = { version = "0.1", default-features = false, features = ["model"] }
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[cfg(feature = "primitives")]
#[doc(inline)]
pub use famafrench_primitives as primitives;
#[cfg(feature = "traits")]
#[doc(inline)]
pub use famafrench_traits as traits;
#[cfg(feature = "math")]
#[doc(inline)]
pub use famafrench_math as math;
#[cfg(feature = "sorts")]
#[doc(inline)]
pub use famafrench_sorts as sorts;
#[cfg(feature = "model")]
#[doc(inline)]
pub use famafrench_model as model;
#[cfg(feature = "utils")]
#[doc(inline)]
pub use famafrench_utils as utils;
