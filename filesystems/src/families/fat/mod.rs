// FAT Filesystem Family
// Only FAT12 is read; the variant check keeps FAT16/FAT32 volumes out.

pub mod common;
pub mod fat12;

use common::FAT12_MAX_CLUSTERS;

/// FAT variant, determined solely by the data cluster count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatType {
    Fat12,
    Fat16,
    Fat32,
}

impl FatType {
    pub fn from_cluster_count(clusters: u32) -> Self {
        match clusters {
            0..=FAT12_MAX_CLUSTERS => FatType::Fat12,
            4085..=65524 => FatType::Fat16,
            _ => FatType::Fat32,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FatType::Fat12 => "FAT12",
            FatType::Fat16 => "FAT16",
            FatType::Fat32 => "FAT32",
        }
    }
}

impl std::fmt::Display for FatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
