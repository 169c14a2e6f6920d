pub mod csv_log;
pub mod rng;

pub use csv_log::{log_file_name, write_hourly_log, CsvLogError};
pub use rng::seeded_rng;
