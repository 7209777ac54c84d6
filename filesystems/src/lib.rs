// Filesystem modules are organized in families
pub mod families;

#[cfg(test)]
pub mod test_helpers;

// Re-export the FAT12 reader and its building blocks
pub use families::fat::fat12::{
    extract, extract_from_path, has_boot_signature, ClusterChainReader, ClusterLink,
    DirectoryEntry, DirectoryIndex, ExtendedBpb, Fat12Reader, FatTable, Geometry,
};
pub use families::fat::common::{format_83_name, parse_83_name, raw_83_name, FatAttributes};
pub use families::fat::FatType;
