#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/famafrench/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod dates;
pub use dates::{DATE_FORMATS, DateParser, DateRange, date_stamp, date_to_days, days_to_date};

mod returns;
pub use returns::{return_observations, returns_frame, simple_returns};

mod io;
pub use io::{
    date_values, float_values, load_bars, load_sort_panel, load_stock_returns, read_csv,
    read_factor_panel, stock_returns_file_name, text_values, write_factor_panel,
    write_regression_results, write_stock_returns,
};

mod store;
pub use store::{CsvBarStore, CsvInstruments};

mod error;
pub use error::UtilsError;
