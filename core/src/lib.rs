pub mod device;
pub mod error;
pub mod options;

pub use device::{ImageFile, MemoryImage, SectorSource, DEFAULT_SECTOR_SIZE};
pub use error::{ErrorKind, FatError};
pub use options::{ExtractOptions, FAT12_MAX_CLUSTERS};
