//! Search statistics and their logging.
mod search_statistics;
mod statistic_logger;
mod statistic_logging;

pub use search_statistics::*;
pub use statistic_logger::*;
pub use statistic_logging::*;
