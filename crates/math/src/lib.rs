#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/famafrench/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod standardize;
pub use standardize::ZScore;

mod linalg;
pub use linalg::{WlsResult, generalized_least_squares, weighted_least_squares};

mod error;
pub use error::MathError;
