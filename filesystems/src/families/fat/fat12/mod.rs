// FAT12 read path: boot sector -> FAT + root directory -> cluster chains

pub mod boot_sector;
pub mod cluster_chain;
pub mod directory;
pub mod fat_table;
pub mod reader;

pub use boot_sector::{has_boot_signature, ExtendedBpb, Geometry};
pub use cluster_chain::ClusterChainReader;
pub use directory::{DirectoryEntry, DirectoryIndex};
pub use fat_table::{ClusterLink, FatTable};
pub use reader::{extract, extract_from_path, Fat12Reader};
