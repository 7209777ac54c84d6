// FAT12 root directory: fixed region between the FATs and the data area

use byteorder::{ByteOrder, LittleEndian};
use fatpeek_core::{FatError, SectorSource};
use log::debug;

use crate::families::fat::common::*;
use super::boot_sector::Geometry;

/// One 32-byte short-name directory record, copied out of the region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: [u8; DIR_NAME_LEN],
    pub attributes: FatAttributes,
    pub creation_time_tenths: u8,
    pub creation_time: u16,
    pub creation_date: u16,
    pub last_access_date: u16,
    /// Always 0 on FAT12
    pub first_cluster_high: u16,
    pub last_write_time: u16,
    pub last_write_date: u16,
    pub first_cluster_low: u16,
    pub file_size: u32,
}

impl DirectoryEntry {
    /// Decode a record. `raw` must hold at least [`DIR_ENTRY_SIZE`] bytes.
    pub fn parse(raw: &[u8]) -> Self {
        let mut name = [0u8; DIR_NAME_LEN];
        name.copy_from_slice(&raw[DIR_NAME..DIR_NAME + DIR_NAME_LEN]);

        Self {
            name,
            attributes: FatAttributes(raw[DIR_ATTR]),
            creation_time_tenths: raw[DIR_CRT_TIME_TENTH],
            creation_time: LittleEndian::read_u16(&raw[DIR_CRT_TIME..]),
            creation_date: LittleEndian::read_u16(&raw[DIR_CRT_DATE..]),
            last_access_date: LittleEndian::read_u16(&raw[DIR_LST_ACC_DATE..]),
            first_cluster_high: LittleEndian::read_u16(&raw[DIR_FST_CLUS_HI..]),
            last_write_time: LittleEndian::read_u16(&raw[DIR_WRT_TIME..]),
            last_write_date: LittleEndian::read_u16(&raw[DIR_WRT_DATE..]),
            first_cluster_low: LittleEndian::read_u16(&raw[DIR_FST_CLUS_LO..]),
            file_size: LittleEndian::read_u32(&raw[DIR_FILE_SIZE..]),
        }
    }

    /// Start of the cluster chain. FAT12 ignores the high word.
    pub fn first_cluster(&self) -> u16 {
        self.first_cluster_low
    }

    pub fn display_name(&self) -> String {
        parse_83_name(&self.name)
    }

    pub fn is_deleted(&self) -> bool {
        self.name[0] == DIR_ENTRY_DELETED
    }

    pub fn is_long_name(&self) -> bool {
        self.attributes.is_lfn()
    }

    pub fn is_volume_label(&self) -> bool {
        self.attributes.is_volume_id() && !self.attributes.is_lfn()
    }

    pub fn is_directory(&self) -> bool {
        self.attributes.is_directory()
    }

    /// Last write timestamp as (year, month, day, hour, minute, second).
    pub fn modified(&self) -> (u16, u8, u8, u8, u8, u8) {
        let date = self.last_write_date;
        let time = self.last_write_time;
        (
            1980 + (date >> 9),
            ((date >> 5) & 0x0F) as u8,
            (date & 0x1F) as u8,
            (time >> 11) as u8,
            ((time >> 5) & 0x3F) as u8,
            ((time & 0x1F) * 2) as u8,
        )
    }
}

/// Snapshot of the root directory slots up to the first terminator.
#[derive(Debug, Clone)]
pub struct DirectoryIndex {
    slots: Vec<DirectoryEntry>,
    include_deleted: bool,
}

impl DirectoryIndex {
    /// Read the root directory region. The source must already use the
    /// volume's sector size.
    pub fn load<S: SectorSource + ?Sized>(source: &mut S, geometry: &Geometry) -> Result<Self, FatError> {
        let start = geometry.root_dir_start_sector();
        let sectors = geometry.root_dir_sectors();
        debug!("Loading root directory: {} sector(s) at LBA {}", sectors, start);

        let data = source.read_sectors(start as u64, sectors)?;
        Ok(Self::from_region(&data, geometry.root_entry_count))
    }

    /// Decode at most `capacity` records, stopping at the first record whose
    /// name starts with 0x00.
    pub fn from_region(data: &[u8], capacity: u16) -> Self {
        let slots = data
            .chunks_exact(DIR_ENTRY_SIZE)
            .take(capacity as usize)
            .take_while(|raw| raw[DIR_NAME] != DIR_ENTRY_END)
            .map(DirectoryEntry::parse)
            .collect();

        Self {
            slots,
            include_deleted: false,
        }
    }

    /// Allow lookups to match entries whose name starts with 0xE5.
    pub fn include_deleted(mut self, include: bool) -> Self {
        self.include_deleted = include;
        self
    }

    /// Every slot before the terminator, including deleted, LFN and label records.
    pub fn slots(&self) -> &[DirectoryEntry] {
        &self.slots
    }

    /// Short-name entries for files and directories.
    pub fn entries(&self) -> impl Iterator<Item = &DirectoryEntry> + '_ {
        self.slots.iter().filter(move |e| self.is_candidate(e))
    }

    /// Volume label stored in the root directory, if any.
    pub fn volume_label(&self) -> Option<String> {
        self.slots
            .iter()
            .find(|e| e.is_volume_label() && !e.is_deleted())
            .map(|e| String::from_utf8_lossy(&e.name).trim_end().to_string())
    }

    fn is_candidate(&self, entry: &DirectoryEntry) -> bool {
        !entry.is_long_name()
            && !entry.is_volume_label()
            && (self.include_deleted || !entry.is_deleted())
    }

    /// Find an entry by its exact on-disk name (space padded, no dot).
    /// Comparison is byte-for-byte; callers normalize human input first.
    pub fn find_by_name(&self, name: &[u8; DIR_NAME_LEN]) -> Option<&DirectoryEntry> {
        self.entries().find(|e| &e.name == name)
    }
}
