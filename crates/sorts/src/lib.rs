#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/famafrench/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod rank;

mod size;
pub use size::{SizeConfig, SizeSort};

mod value;
pub use value::{ValueConfig, ValueSort};

mod grid;
pub use grid::GridSort;

mod tracker;
pub use tracker::{holding_periods, sort_panel};

mod config;
pub use config::SortConfig;

mod error;
pub use error::SortError;
