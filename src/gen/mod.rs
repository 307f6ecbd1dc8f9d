pub mod noise_table;

pub use self::noise_table::*;
