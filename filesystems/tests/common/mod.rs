// Shared fixture: a 1.44 MB floppy image built in memory

use byteorder::{ByteOrder, LittleEndian};
use fatpeek_filesystems::FatTable;

pub const BYTES_PER_SECTOR: usize = 512;
pub const TOTAL_SECTORS: usize = 2880;
pub const SECTORS_PER_FAT: usize = 9;
pub const ROOT_ENTRIES: usize = 224;
pub const ROOT_DIR_SECTOR: usize = 1 + 2 * SECTORS_PER_FAT;
pub const FIRST_DATA_SECTOR: usize = ROOT_DIR_SECTOR + 14;

pub struct Floppy {
    pub image: Vec<u8>,
    fat: Vec<u8>,
    next_slot: usize,
}

impl Floppy {
    pub fn new() -> Self {
        let mut image = vec![0u8; TOTAL_SECTORS * BYTES_PER_SECTOR];
        let boot = &mut image[..BYTES_PER_SECTOR];
        boot[0..3].copy_from_slice(&[0xEB, 0x3C, 0x90]);
        boot[3..11].copy_from_slice(b"MSDOS5.0");
        LittleEndian::write_u16(&mut boot[0x0B..], BYTES_PER_SECTOR as u16);
        boot[0x0D] = 1;
        LittleEndian::write_u16(&mut boot[0x0E..], 1);
        boot[0x10] = 2;
        LittleEndian::write_u16(&mut boot[0x11..], ROOT_ENTRIES as u16);
        LittleEndian::write_u16(&mut boot[0x13..], TOTAL_SECTORS as u16);
        boot[0x15] = 0xF0;
        LittleEndian::write_u16(&mut boot[0x16..], SECTORS_PER_FAT as u16);
        LittleEndian::write_u16(&mut boot[0x18..], 18);
        LittleEndian::write_u16(&mut boot[0x1A..], 2);
        boot[0x26] = 0x29;
        LittleEndian::write_u32(&mut boot[0x27..], 0xCAFE_F00D);
        boot[0x2B..0x36].copy_from_slice(b"FLOPPY     ");
        boot[0x36..0x3E].copy_from_slice(b"FAT12   ");
        boot[510] = 0x55;
        boot[511] = 0xAA;

        let mut fat = vec![0u8; SECTORS_PER_FAT * BYTES_PER_SECTOR];
        FatTable::pack_entry(&mut fat, 0, 0xFF0).unwrap();
        FatTable::pack_entry(&mut fat, 1, 0xFFF).unwrap();

        Self { image, fat, next_slot: 0 }
    }

    pub fn link(&mut self, cluster: u16, value: u16) -> &mut Self {
        FatTable::pack_entry(&mut self.fat, cluster, value).unwrap();
        self
    }

    pub fn entry(&mut self, name: &[u8; 11], attributes: u8, first_cluster: u16, size: u32) -> &mut Self {
        let offset = ROOT_DIR_SECTOR * BYTES_PER_SECTOR + self.next_slot * 32;
        let slot = &mut self.image[offset..offset + 32];
        slot[..11].copy_from_slice(name);
        slot[11] = attributes;
        LittleEndian::write_u16(&mut slot[0x1A..], first_cluster);
        LittleEndian::write_u32(&mut slot[0x1C..], size);
        self.next_slot += 1;
        self
    }

    /// Store `data` across `clusters`, linking them into a chain.
    pub fn file(&mut self, name: &[u8; 11], clusters: &[u16], data: &[u8]) -> &mut Self {
        for (i, &cluster) in clusters.iter().enumerate() {
            let next = clusters.get(i + 1).copied().unwrap_or(0xFFF);
            self.link(cluster, next);

            let chunk_start = i * BYTES_PER_SECTOR;
            if chunk_start < data.len() {
                let chunk_end = (chunk_start + BYTES_PER_SECTOR).min(data.len());
                let offset = self.cluster_offset(cluster);
                self.image[offset..offset + chunk_end - chunk_start]
                    .copy_from_slice(&data[chunk_start..chunk_end]);
            }
        }
        self.entry(name, 0x20, clusters.first().copied().unwrap_or(0), data.len() as u32)
    }

    pub fn cluster_offset(&self, cluster: u16) -> usize {
        (FIRST_DATA_SECTOR + cluster as usize - 2) * BYTES_PER_SECTOR
    }

    pub fn build(&self) -> Vec<u8> {
        let mut image = self.image.clone();
        for copy in 0..2 {
            let offset = (1 + copy * SECTORS_PER_FAT) * BYTES_PER_SECTOR;
            image[offset..offset + self.fat.len()].copy_from_slice(&self.fat);
        }
        image
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Deterministic, non-repeating-per-sector content.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 + i / 512) as u8).collect()
}
