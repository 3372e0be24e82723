#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/famafrench/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod group_returns;
pub use group_returns::GroupReturnAggregator;

mod factor_returns;
pub use factor_returns::{Construction, FactorConfig, FactorSynthesizer, grid_factors, long_short};

mod gls;
pub use gls::{GlsConfig, GlsExposureEstimator};

mod regression;
pub use regression::{CrossSectionalRegressor, RegressionConfig, Sample};

mod batch;
pub use batch::{BatchOutcome, market_returns, with_market};

mod error;
pub use error::{EntityError, ModelError};

/// Re-export commonly used types.
pub mod prelude {
    pub use famafrench_traits::{BarSource, ExposureEstimator};

    pub use super::{
        BatchOutcome, CrossSectionalRegressor, EntityError, FactorConfig, FactorSynthesizer, ModelError,
        RegressionConfig,
    };
}
