// FAT12 boot sector (BIOS Parameter Block) parsing and validation

use byteorder::{ByteOrder, LittleEndian};
use fatpeek_core::FatError;
use serde::Serialize;

use crate::families::fat::common::*;
use crate::families::fat::FatType;

/// Extended BPB fields, present when the extended boot signature is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtendedBpb {
    pub drive_number: u8,
    pub volume_serial: u32,
    /// Only present with the 0x29 signature
    pub volume_label: Option<String>,
    pub fs_type: Option<String>,
}

/// Volume geometry decoded from the boot sector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Geometry {
    pub oem_name: String,
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub fat_count: u8,
    pub root_entry_count: u16,
    pub total_sectors: u32,
    pub media_descriptor: u8,
    pub sectors_per_fat: u16,
    pub sectors_per_track: u16,
    pub head_count: u16,
    pub hidden_sectors: u32,
    pub extended: Option<ExtendedBpb>,
}

/// Check for the 0x55AA signature at the end of the first sector.
pub fn has_boot_signature(sector: &[u8]) -> bool {
    sector.len() >= BOOT_SIGNATURE_OFFSET + 2
        && sector[BOOT_SIGNATURE_OFFSET..BOOT_SIGNATURE_OFFSET + 2] == BOOT_SIGNATURE
}

fn trimmed_ascii(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim_end_matches([' ', '\0']).to_string()
}

impl Geometry {
    /// Decode and validate the first sector of an image.
    ///
    /// Only the fixed 62-byte layout is required; the 0x55AA signature is
    /// checked separately with [`has_boot_signature`].
    pub fn parse(sector: &[u8]) -> Result<Self, FatError> {
        if sector.len() < BOOT_SECTOR_LAYOUT_LEN {
            return Err(FatError::FormatError(format!(
                "boot sector is {} bytes, need at least {}",
                sector.len(),
                BOOT_SECTOR_LAYOUT_LEN
            )));
        }

        let total_16 = LittleEndian::read_u16(&sector[BPB_TOT_SEC16..]);
        let total_32 = LittleEndian::read_u32(&sector[BPB_TOT_SEC32..]);

        let extended = match sector[BS_BOOT_SIG] {
            sig @ (EXT_BOOT_SIG_SERIAL_ONLY | EXT_BOOT_SIG_FULL) => {
                let full = sig == EXT_BOOT_SIG_FULL;
                Some(ExtendedBpb {
                    drive_number: sector[BS_DRV_NUM],
                    volume_serial: LittleEndian::read_u32(&sector[BS_VOL_ID..]),
                    volume_label: full.then(|| trimmed_ascii(&sector[BS_VOL_LAB..BS_VOL_LAB + 11])),
                    fs_type: full.then(|| trimmed_ascii(&sector[BS_FIL_SYS_TYPE..BS_FIL_SYS_TYPE + 8])),
                })
            }
            _ => None,
        };

        let geometry = Self {
            oem_name: trimmed_ascii(&sector[BS_OEM_NAME..BS_OEM_NAME + 8]),
            bytes_per_sector: LittleEndian::read_u16(&sector[BPB_BYTES_PER_SEC..]),
            sectors_per_cluster: sector[BPB_SEC_PER_CLUS],
            reserved_sectors: LittleEndian::read_u16(&sector[BPB_RSVD_SEC_CNT..]),
            fat_count: sector[BPB_NUM_FATS],
            root_entry_count: LittleEndian::read_u16(&sector[BPB_ROOT_ENT_CNT..]),
            total_sectors: if total_16 != 0 { total_16 as u32 } else { total_32 },
            media_descriptor: sector[BPB_MEDIA],
            sectors_per_fat: LittleEndian::read_u16(&sector[BPB_FAT_SZ16..]),
            sectors_per_track: LittleEndian::read_u16(&sector[BPB_SEC_PER_TRK..]),
            head_count: LittleEndian::read_u16(&sector[BPB_NUM_HEADS..]),
            hidden_sectors: LittleEndian::read_u32(&sector[BPB_HIDD_SEC..]),
            extended,
        };

        geometry.validate()?;
        Ok(geometry)
    }

    /// Check the internal consistency of the decoded fields.
    pub fn validate(&self) -> Result<(), FatError> {
        let fail = |msg: String| -> Result<(), FatError> { Err(FatError::FormatError(msg)) };

        if self.bytes_per_sector == 0 {
            return fail("bytes per sector is zero".to_string());
        }
        if !self.bytes_per_sector.is_power_of_two()
            || !(MIN_BYTES_PER_SECTOR..=MAX_BYTES_PER_SECTOR).contains(&self.bytes_per_sector)
        {
            return fail(format!(
                "bytes per sector {} is not a power of two in {}..={}",
                self.bytes_per_sector, MIN_BYTES_PER_SECTOR, MAX_BYTES_PER_SECTOR
            ));
        }
        if self.sectors_per_cluster == 0 {
            return fail("sectors per cluster is zero".to_string());
        }
        if !self.sectors_per_cluster.is_power_of_two() {
            return fail(format!("sectors per cluster {} is not a power of two", self.sectors_per_cluster));
        }
        if self.fat_count == 0 {
            return fail("FAT count is zero".to_string());
        }
        if self.reserved_sectors == 0 {
            return fail("reserved sector count is zero".to_string());
        }
        if self.sectors_per_fat == 0 {
            return fail("sectors per FAT is zero".to_string());
        }
        if self.root_entry_count == 0 {
            return fail("root directory has no entries".to_string());
        }

        let first_data_sector = self.first_data_sector();
        if first_data_sector as u64 >= self.total_sectors as u64 {
            return fail(format!(
                "data region starts at sector {} but the volume has {} sectors",
                first_data_sector, self.total_sectors
            ));
        }

        let clusters = self.data_cluster_count();
        if clusters == 0 {
            return fail("volume has no data clusters".to_string());
        }
        let fat_type = FatType::from_cluster_count(clusters);
        if fat_type != FatType::Fat12 {
            return fail(format!("volume has {} clusters and is {}, not FAT12", clusters, fat_type));
        }

        // Every data cluster plus the two reserved ones needs a 12-bit slot
        let fat_entries = self.fat_size_bytes() as u64 * 2 / 3;
        if fat_entries < clusters as u64 + 2 {
            return fail(format!(
                "FAT holds {} entries but the volume has {} clusters",
                fat_entries, clusters
            ));
        }

        Ok(())
    }

    pub fn fat_type(&self) -> FatType {
        FatType::from_cluster_count(self.data_cluster_count())
    }

    pub fn fat_start_sector(&self) -> u32 {
        self.reserved_sectors as u32
    }

    pub fn fat_size_bytes(&self) -> usize {
        self.sectors_per_fat as usize * self.bytes_per_sector as usize
    }

    pub fn root_dir_start_sector(&self) -> u32 {
        self.reserved_sectors as u32 + self.fat_count as u32 * self.sectors_per_fat as u32
    }

    pub fn root_dir_sectors(&self) -> u32 {
        let bytes = self.root_entry_count as u32 * DIR_ENTRY_SIZE as u32;
        let bps = self.bytes_per_sector as u32;
        (bytes + bps - 1) / bps
    }

    /// First sector past the root directory, where cluster 2 begins.
    pub fn first_data_sector(&self) -> u32 {
        self.root_dir_start_sector() + self.root_dir_sectors()
    }

    pub fn cluster_size(&self) -> u32 {
        self.sectors_per_cluster as u32 * self.bytes_per_sector as u32
    }

    pub fn data_cluster_count(&self) -> u32 {
        self.total_sectors.saturating_sub(self.first_data_sector()) / self.sectors_per_cluster as u32
    }

    /// Highest addressable data cluster.
    pub fn max_cluster(&self) -> u16 {
        let last = self.data_cluster_count() + 1;
        last.min(FAT12_MAX_POINTER as u32) as u16
    }

    /// LBA of the first sector of a data cluster.
    pub fn cluster_lba(&self, cluster: u16) -> Result<u64, FatError> {
        if cluster < FIRST_DATA_CLUSTER || cluster > self.max_cluster() {
            return Err(FatError::RangeError {
                region: "data region",
                index: cluster as u64,
                limit: self.max_cluster() as u64,
            });
        }
        let offset = (cluster - FIRST_DATA_CLUSTER) as u64 * self.sectors_per_cluster as u64;
        Ok(self.first_data_sector() as u64 + offset)
    }
}
