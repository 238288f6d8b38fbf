//! Configuration parsing helpers for the CLI.

pub mod delimiter;
pub mod duration;
pub mod table_mapping;

pub use delimiter::decode_delimiter;
pub use duration::parse_duration;
pub use table_mapping::{load_table_mapping_file, parse_table_mapping};
