// Common FAT building blocks: on-disk constants, attributes and 8.3 names

pub mod attributes;
pub mod constants;
pub mod names;

pub use attributes::FatAttributes;
pub use constants::*;
pub use names::{format_83_name, parse_83_name, raw_83_name};
