// FAT12 allocation table: packed 12-bit cluster links
//
// Two entries share three bytes. For cluster n the pair starts at byte
// n * 3 / 2; even clusters take the low 12 bits of the little-endian u16
// there, odd clusters take the high 12 bits.

use byteorder::{ByteOrder, LittleEndian};
use fatpeek_core::{FatError, SectorSource};
use log::debug;

use crate::families::fat::common::*;
use super::boot_sector::Geometry;

/// Meaning of a FAT12 entry value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterLink {
    /// 0x000
    Free,
    /// 0x001 and 0xFF0..=0xFF6
    Reserved(u16),
    /// 0xFF7
    Bad,
    /// 0xFF8..=0xFFF
    EndOfChain(u16),
    /// 0x002..=0xFEF, the next data cluster
    Next(u16),
}

impl ClusterLink {
    pub fn from_raw(value: u16) -> Self {
        match value & FAT12_ENTRY_MASK {
            FAT12_FREE => ClusterLink::Free,
            v @ FIRST_DATA_CLUSTER..=FAT12_MAX_POINTER => ClusterLink::Next(v),
            FAT12_BAD => ClusterLink::Bad,
            v @ FAT12_EOC_MIN..=FAT12_EOC => ClusterLink::EndOfChain(v),
            v => ClusterLink::Reserved(v),
        }
    }

    pub fn raw(&self) -> u16 {
        match *self {
            ClusterLink::Free => FAT12_FREE,
            ClusterLink::Reserved(v) | ClusterLink::EndOfChain(v) | ClusterLink::Next(v) => v,
            ClusterLink::Bad => FAT12_BAD,
        }
    }

    pub fn is_end_of_chain(&self) -> bool {
        matches!(self, ClusterLink::EndOfChain(_))
    }

    pub fn next_cluster(&self) -> Option<u16> {
        match *self {
            ClusterLink::Next(next) => Some(next),
            _ => None,
        }
    }
}

/// In-memory copy of the first FAT.
#[derive(Debug, Clone)]
pub struct FatTable {
    data: Vec<u8>,
}

impl FatTable {
    /// Read the first FAT copy (`sectors_per_fat` sectors after the
    /// reserved area). The source must already use the volume's sector size.
    pub fn load<S: SectorSource + ?Sized>(source: &mut S, geometry: &Geometry) -> Result<Self, FatError> {
        debug!(
            "Loading FAT: {} sector(s) at LBA {}",
            geometry.sectors_per_fat,
            geometry.fat_start_sector()
        );
        let data = source.read_sectors(geometry.fat_start_sector() as u64, geometry.sectors_per_fat as u32)?;
        Ok(Self::from_bytes(data))
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of complete 12-bit entries in the region.
    pub fn entry_count(&self) -> u32 {
        (self.data.len() as u64 * 2 / 3) as u32
    }

    fn entry_offset(&self, cluster: u16) -> Result<usize, FatError> {
        let offset = cluster as usize * 3 / 2;
        if offset + 1 >= self.data.len() {
            return Err(FatError::RangeError {
                region: "FAT",
                index: cluster as u64,
                limit: self.entry_count() as u64,
            });
        }
        Ok(offset)
    }

    /// Raw 12-bit value for any entry, including reserved entries 0 and 1.
    pub fn raw_entry(&self, cluster: u16) -> Result<u16, FatError> {
        let offset = self.entry_offset(cluster)?;
        let pair = LittleEndian::read_u16(&self.data[offset..offset + 2]);
        Ok(if cluster % 2 == 0 {
            pair & FAT12_ENTRY_MASK
        } else {
            pair >> 4
        })
    }

    /// Link stored for a data cluster. Clusters 0 and 1 are not data
    /// clusters and are rejected.
    pub fn lookup(&self, cluster: u16) -> Result<ClusterLink, FatError> {
        if cluster < FIRST_DATA_CLUSTER {
            return Err(FatError::RangeError {
                region: "FAT",
                index: cluster as u64,
                limit: self.entry_count() as u64,
            });
        }
        self.raw_entry(cluster).map(ClusterLink::from_raw)
    }

    /// Store a 12-bit value into a FAT region without touching the
    /// neighbouring entry. Used to build images in memory.
    pub fn pack_entry(region: &mut [u8], cluster: u16, value: u16) -> Result<(), FatError> {
        let offset = cluster as usize * 3 / 2;
        if offset + 1 >= region.len() {
            return Err(FatError::RangeError {
                region: "FAT",
                index: cluster as u64,
                limit: (region.len() as u64 * 2 / 3),
            });
        }

        let value = value & FAT12_ENTRY_MASK;
        let pair = LittleEndian::read_u16(&region[offset..offset + 2]);
        let packed = if cluster % 2 == 0 {
            (pair & 0xF000) | value
        } else {
            (pair & 0x000F) | (value << 4)
        };
        LittleEndian::write_u16(&mut region[offset..offset + 2], packed);
        Ok(())
    }

    /// Count free entries among data clusters `2..=max_cluster`.
    pub fn free_cluster_count(&self, max_cluster: u16) -> Result<u32, FatError> {
        let mut free = 0;
        for cluster in FIRST_DATA_CLUSTER..=max_cluster {
            if self.lookup(cluster)? == ClusterLink::Free {
                free += 1;
            }
        }
        Ok(free)
    }
}
