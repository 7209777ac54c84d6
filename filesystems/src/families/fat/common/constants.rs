// FAT12 on-disk layout constants

use static_assertions::const_assert_eq;

pub use fatpeek_core::FAT12_MAX_CLUSTERS;

// Boot sector offsets (classic BIOS Parameter Block)
pub const BS_OEM_NAME: usize = 0x03;
pub const BPB_BYTES_PER_SEC: usize = 0x0B;
pub const BPB_SEC_PER_CLUS: usize = 0x0D;
pub const BPB_RSVD_SEC_CNT: usize = 0x0E;
pub const BPB_NUM_FATS: usize = 0x10;
pub const BPB_ROOT_ENT_CNT: usize = 0x11;
pub const BPB_TOT_SEC16: usize = 0x13;
pub const BPB_MEDIA: usize = 0x15;
pub const BPB_FAT_SZ16: usize = 0x16;
pub const BPB_SEC_PER_TRK: usize = 0x18;
pub const BPB_NUM_HEADS: usize = 0x1A;
pub const BPB_HIDD_SEC: usize = 0x1C;
pub const BPB_TOT_SEC32: usize = 0x20;

// Extended BPB (FAT12/FAT16 variant, starts at 36)
pub const BS_DRV_NUM: usize = 0x24;
pub const BS_BOOT_SIG: usize = 0x26;
pub const BS_VOL_ID: usize = 0x27;
pub const BS_VOL_LAB: usize = 0x2B;
pub const BS_FIL_SYS_TYPE: usize = 0x36;

/// Bytes covered by the fixed boot sector layout, through the fs type string.
pub const BOOT_SECTOR_LAYOUT_LEN: usize = 0x3E;
const_assert_eq!(BOOT_SECTOR_LAYOUT_LEN, BS_FIL_SYS_TYPE + 8);

// Extended boot signatures
pub const EXT_BOOT_SIG_SERIAL_ONLY: u8 = 0x28;
pub const EXT_BOOT_SIG_FULL: u8 = 0x29;

// Boot sector signature
pub const BOOT_SIGNATURE: [u8; 2] = [0x55, 0xAA];
pub const BOOT_SIGNATURE_OFFSET: usize = 0x1FE;

// Sector size bounds accepted by the parser
pub const MIN_BYTES_PER_SECTOR: u16 = 128;
pub const MAX_BYTES_PER_SECTOR: u16 = 4096;

// FAT12 entry values
pub const FAT12_ENTRY_MASK: u16 = 0x0FFF;
pub const FAT12_FREE: u16 = 0x000;
pub const FAT12_RESERVED: u16 = 0x001;
pub const FAT12_MAX_POINTER: u16 = 0xFEF;  // Highest valid next-cluster value
pub const FAT12_RESERVED_MIN: u16 = 0xFF0;
pub const FAT12_BAD: u16 = 0xFF7;  // Bad cluster marker
pub const FAT12_EOC_MIN: u16 = 0xFF8;  // End of chain: 0xFF8..=0xFFF
pub const FAT12_EOC: u16 = 0xFFF;

/// First cluster of the data region.
pub const FIRST_DATA_CLUSTER: u16 = 2;

// Directory entry layout (32 bytes)
pub const DIR_ENTRY_SIZE: usize = 32;
pub const DIR_NAME: usize = 0x00;
pub const DIR_NAME_LEN: usize = 11;
pub const DIR_ATTR: usize = 0x0B;
pub const DIR_CRT_TIME_TENTH: usize = 0x0D;
pub const DIR_CRT_TIME: usize = 0x0E;
pub const DIR_CRT_DATE: usize = 0x10;
pub const DIR_LST_ACC_DATE: usize = 0x12;
pub const DIR_FST_CLUS_HI: usize = 0x14;
pub const DIR_WRT_TIME: usize = 0x16;
pub const DIR_WRT_DATE: usize = 0x18;
pub const DIR_FST_CLUS_LO: usize = 0x1A;
pub const DIR_FILE_SIZE: usize = 0x1C;
const_assert_eq!(DIR_FILE_SIZE + 4, DIR_ENTRY_SIZE);

// First name byte markers
pub const DIR_ENTRY_END: u8 = 0x00;
pub const DIR_ENTRY_DELETED: u8 = 0xE5;
pub const DIR_ENTRY_KANJI_E5: u8 = 0x05;  // Stored in place of a leading 0xE5

// Media descriptors
pub const MEDIA_FLOPPY_144: u8 = 0xF0;
