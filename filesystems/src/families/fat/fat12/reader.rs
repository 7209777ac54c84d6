// FAT12 filesystem reader

use fatpeek_core::{ExtractOptions, FatError, ImageFile, SectorSource, DEFAULT_SECTOR_SIZE};
use log::{debug, info, warn};
use std::path::Path;

use crate::families::fat::common::{parse_83_name, DIR_NAME_LEN};
use super::boot_sector::{has_boot_signature, Geometry};
use super::cluster_chain::ClusterChainReader;
use super::directory::{DirectoryEntry, DirectoryIndex};
use super::fat_table::FatTable;

/// An opened FAT12 image: geometry, FAT and root directory are loaded once
/// and reused for every lookup.
pub struct Fat12Reader<S: SectorSource> {
    source: S,
    geometry: Geometry,
    fat: FatTable,
    directory: DirectoryIndex,
    options: ExtractOptions,
}

impl<S: SectorSource> Fat12Reader<S> {
    pub fn open(mut source: S, options: ExtractOptions) -> Result<Self, FatError> {
        info!("Opening FAT12 filesystem");

        // The boot sector always fits in the first 512 bytes
        source.set_sector_size(DEFAULT_SECTOR_SIZE);
        let boot_data = source.read_sectors(0, 1)?;
        let geometry = Geometry::parse(&boot_data)?;

        if !has_boot_signature(&boot_data) {
            if options.require_boot_signature {
                return Err(FatError::FormatError("missing 0x55AA boot signature".to_string()));
            }
            warn!("Boot sector has no 0x55AA signature, continuing");
        }

        source.set_sector_size(geometry.bytes_per_sector);

        info!("FAT12 filesystem details:");
        info!("  Bytes per sector: {}", geometry.bytes_per_sector);
        info!("  Sectors per cluster: {}", geometry.sectors_per_cluster);
        info!("  FATs: {} x {} sectors", geometry.fat_count, geometry.sectors_per_fat);
        info!("  Root entries: {}", geometry.root_entry_count);
        info!("  First data sector: {}", geometry.first_data_sector());
        info!("  Total clusters: {}", geometry.data_cluster_count());

        let fat = FatTable::load(&mut source, &geometry)?;
        let directory = DirectoryIndex::load(&mut source, &geometry)?
            .include_deleted(options.include_deleted);

        debug!("Root directory has {} slot(s) in use", directory.slots().len());

        Ok(Self {
            source,
            geometry,
            fat,
            directory,
            options,
        })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn fat(&self) -> &FatTable {
        &self.fat
    }

    pub fn directory(&self) -> &DirectoryIndex {
        &self.directory
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    pub fn entries(&self) -> impl Iterator<Item = &DirectoryEntry> + '_ {
        self.directory.entries()
    }

    fn chain_reader(&self) -> ClusterChainReader<'_> {
        ClusterChainReader::new(&self.fat, &self.geometry).with_max_steps(self.options.max_chain_clusters)
    }

    /// Find an entry by its padded on-disk name.
    pub fn find(&self, name: &[u8; DIR_NAME_LEN]) -> Result<&DirectoryEntry, FatError> {
        self.directory
            .find_by_name(name)
            .ok_or_else(|| FatError::NotFound(parse_83_name(name)))
    }

    /// Clusters occupied by an entry, in file order.
    pub fn chain_of(&self, entry: &DirectoryEntry) -> Result<Vec<u16>, FatError> {
        if entry.file_size == 0 && entry.first_cluster() == 0 {
            return Ok(Vec::new());
        }
        self.chain_reader().chain(entry.first_cluster())
    }

    pub fn read_entry(&mut self, entry: &DirectoryEntry) -> Result<Vec<u8>, FatError> {
        let reader = ClusterChainReader::new(&self.fat, &self.geometry)
            .with_max_steps(self.options.max_chain_clusters);
        reader.read(&mut self.source, entry)
    }

    /// Contents of the file with the given padded on-disk name.
    pub fn extract(&mut self, name: &[u8; DIR_NAME_LEN]) -> Result<Vec<u8>, FatError> {
        let entry = self.find(name)?.clone();
        self.read_entry(&entry)
    }

    pub fn into_source(self) -> S {
        self.source
    }
}

impl Fat12Reader<ImageFile<std::fs::File>> {
    /// Open an image file read-only.
    pub fn open_path(path: impl AsRef<Path>, options: ExtractOptions) -> Result<Self, FatError> {
        let path = path.as_ref();
        info!("Opening image {}", path.display());
        Self::open(ImageFile::open(path)?, options)
    }
}

/// One-shot extraction of a file from an image.
pub fn extract<S: SectorSource>(
    source: S,
    name: &[u8; DIR_NAME_LEN],
    options: &ExtractOptions,
) -> Result<Vec<u8>, FatError> {
    Fat12Reader::open(source, options.clone())?.extract(name)
}

/// One-shot extraction of a file from an image on disk.
pub fn extract_from_path(
    path: impl AsRef<Path>,
    name: &[u8; DIR_NAME_LEN],
    options: &ExtractOptions,
) -> Result<Vec<u8>, FatError> {
    Fat12Reader::open_path(path, options.clone())?.extract(name)
}
