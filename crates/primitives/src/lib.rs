#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/famafrench/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod asset;
pub use asset::{Bar, Symbol};

mod bucket;
pub use bucket::{Bucket, BucketAssignment, HoldingPeriod};

mod factor;
pub use factor::{Factor, FactorPanel, FactorValues, Regressor};

mod exposure;
pub use exposure::{INTERCEPT, RegressionResult, TermEstimate};

mod panel;
pub use panel::SortPanel;

mod returns;
pub use returns::{ReturnObservation, ReturnSeries};

mod weights;
pub use weights::{ShareBasis, Weighting};

/// Re-export common date type.
pub type Date = chrono::NaiveDate;
