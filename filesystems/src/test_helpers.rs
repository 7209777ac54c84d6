// Test helpers: build small FAT12 images in memory

use crate::families::fat::common::*;
use crate::families::fat::fat12::FatTable;
use byteorder::{ByteOrder, LittleEndian};

/// Build a 32-byte directory entry.
pub fn dir_entry(name: &[u8; 11], attributes: u8, first_cluster: u16, size: u32) -> [u8; DIR_ENTRY_SIZE] {
    let mut entry = [0u8; DIR_ENTRY_SIZE];
    entry[DIR_NAME..DIR_NAME + DIR_NAME_LEN].copy_from_slice(name);
    entry[DIR_ATTR] = attributes;
    LittleEndian::write_u16(&mut entry[DIR_WRT_TIME..], 0x6000);
    LittleEndian::write_u16(&mut entry[DIR_WRT_DATE..], 0x5A21);
    LittleEndian::write_u16(&mut entry[DIR_FST_CLUS_LO..], first_cluster);
    LittleEndian::write_u32(&mut entry[DIR_FILE_SIZE..], size);
    entry
}

/// In-memory FAT12 image. Fields can be tweaked before `build`.
pub struct ImageBuilder {
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub fat_count: u8,
    pub root_entries: u16,
    pub sectors_per_fat: u16,
    pub total_sectors: u16,
    links: Vec<(u16, u16)>,
    entries: Vec<[u8; DIR_ENTRY_SIZE]>,
    clusters: Vec<(u16, Vec<u8>)>,
}

impl ImageBuilder {
    /// 64 sectors of 512 bytes, one sector per cluster, two 1-sector FATs
    /// and 16 root entries. Data starts at sector 4 (clusters 2..=61).
    pub fn small() -> Self {
        Self {
            bytes_per_sector: 512,
            sectors_per_cluster: 1,
            reserved_sectors: 1,
            fat_count: 2,
            root_entries: 16,
            sectors_per_fat: 1,
            total_sectors: 64,
            links: Vec::new(),
            entries: Vec::new(),
            clusters: Vec::new(),
        }
    }

    pub fn cluster_size(&self) -> usize {
        self.bytes_per_sector as usize * self.sectors_per_cluster as usize
    }

    pub fn link(mut self, cluster: u16, value: u16) -> Self {
        self.links.push((cluster, value));
        self
    }

    /// Link clusters in order and terminate the last one.
    pub fn chain(mut self, clusters: &[u16]) -> Self {
        for pair in clusters.windows(2) {
            self.links.push((pair[0], pair[1]));
        }
        if let Some(&last) = clusters.last() {
            self.links.push((last, FAT12_EOC));
        }
        self
    }

    pub fn file(self, name: &[u8; 11], first_cluster: u16, size: u32) -> Self {
        self.raw_entry(dir_entry(name, FatAttributes::ARCHIVE, first_cluster, size))
    }

    pub fn raw_entry(mut self, entry: [u8; DIR_ENTRY_SIZE]) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn cluster_data(mut self, cluster: u16, data: &[u8]) -> Self {
        self.clusters.push((cluster, data.to_vec()));
        self
    }

    pub fn fill_cluster(self, cluster: u16, byte: u8) -> Self {
        let data = vec![byte; self.cluster_size()];
        self.cluster_data(cluster, &data)
    }

    pub fn boot_sector(&self) -> Vec<u8> {
        let mut sector = vec![0u8; self.bytes_per_sector as usize];
        sector[0..3].copy_from_slice(&[0xEB, 0x3C, 0x90]);
        sector[BS_OEM_NAME..BS_OEM_NAME + 8].copy_from_slice(b"FATPEEK ");
        LittleEndian::write_u16(&mut sector[BPB_BYTES_PER_SEC..], self.bytes_per_sector);
        sector[BPB_SEC_PER_CLUS] = self.sectors_per_cluster;
        LittleEndian::write_u16(&mut sector[BPB_RSVD_SEC_CNT..], self.reserved_sectors);
        sector[BPB_NUM_FATS] = self.fat_count;
        LittleEndian::write_u16(&mut sector[BPB_ROOT_ENT_CNT..], self.root_entries);
        LittleEndian::write_u16(&mut sector[BPB_TOT_SEC16..], self.total_sectors);
        sector[BPB_MEDIA] = MEDIA_FLOPPY_144;
        LittleEndian::write_u16(&mut sector[BPB_FAT_SZ16..], self.sectors_per_fat);
        LittleEndian::write_u16(&mut sector[BPB_SEC_PER_TRK..], 18);
        LittleEndian::write_u16(&mut sector[BPB_NUM_HEADS..], 2);
        sector[BS_BOOT_SIG] = EXT_BOOT_SIG_FULL;
        LittleEndian::write_u32(&mut sector[BS_VOL_ID..], 0x1234_ABCD);
        sector[BS_VOL_LAB..BS_VOL_LAB + 11].copy_from_slice(b"TESTVOLUME ");
        sector[BS_FIL_SYS_TYPE..BS_FIL_SYS_TYPE + 8].copy_from_slice(b"FAT12   ");
        if sector.len() >= BOOT_SIGNATURE_OFFSET + 2 {
            sector[BOOT_SIGNATURE_OFFSET..BOOT_SIGNATURE_OFFSET + 2].copy_from_slice(&BOOT_SIGNATURE);
        }
        sector
    }

    pub fn fat_region(&self) -> Vec<u8> {
        let mut fat = vec![0u8; self.sectors_per_fat as usize * self.bytes_per_sector as usize];
        FatTable::pack_entry(&mut fat, 0, 0xF00 | MEDIA_FLOPPY_144 as u16).unwrap();
        FatTable::pack_entry(&mut fat, 1, FAT12_EOC).unwrap();
        for &(cluster, value) in &self.links {
            FatTable::pack_entry(&mut fat, cluster, value).unwrap();
        }
        fat
    }

    pub fn build(&self) -> Vec<u8> {
        let bps = self.bytes_per_sector as usize;
        let spf = self.sectors_per_fat as usize;
        let mut image = vec![0u8; self.total_sectors as usize * bps];

        image[..bps].copy_from_slice(&self.boot_sector());

        let fat = self.fat_region();
        for i in 0..self.fat_count as usize {
            let start = (self.reserved_sectors as usize + i * spf) * bps;
            image[start..start + fat.len()].copy_from_slice(&fat);
        }

        let root_sector = self.reserved_sectors as usize + self.fat_count as usize * spf;
        let root_start = root_sector * bps;
        for (i, entry) in self.entries.iter().enumerate() {
            let offset = root_start + i * DIR_ENTRY_SIZE;
            image[offset..offset + DIR_ENTRY_SIZE].copy_from_slice(entry);
        }

        let root_dir_sectors = (self.root_entries as usize * DIR_ENTRY_SIZE + bps - 1) / bps;
        let first_data_sector = root_sector + root_dir_sectors;
        for (cluster, data) in &self.clusters {
            let sector = first_data_sector + (*cluster as usize - 2) * self.sectors_per_cluster as usize;
            let offset = sector * bps;
            image[offset..offset + data.len()].copy_from_slice(data);
        }

        image
    }
}
