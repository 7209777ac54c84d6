// FAT12 cluster chain walking and file data assembly

use fatpeek_core::{FatError, SectorSource, FAT12_MAX_CLUSTERS};
use log::{debug, trace, warn};
use std::collections::HashSet;

use crate::families::fat::common::FIRST_DATA_CLUSTER;
use super::boot_sector::Geometry;
use super::directory::DirectoryEntry;
use super::fat_table::{ClusterLink, FatTable};

/// Follows FAT links from a directory entry's first cluster and reads the
/// clusters in order.
///
/// A walk fails with [`FatError::ChainError`] instead of looping or
/// returning garbage when the FAT is corrupt: free, reserved or bad links,
/// links past the data region, revisited clusters, and chains longer than
/// the step bound are all rejected.
pub struct ClusterChainReader<'a> {
    fat: &'a FatTable,
    geometry: &'a Geometry,
    max_steps: u32,
}

impl<'a> ClusterChainReader<'a> {
    pub fn new(fat: &'a FatTable, geometry: &'a Geometry) -> Self {
        Self {
            fat,
            geometry,
            max_steps: FAT12_MAX_CLUSTERS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// No valid chain can hold more clusters than the data region has.
    fn step_limit(&self) -> u32 {
        self.max_steps.min(self.geometry.data_cluster_count())
    }

    /// Cluster indices of the chain starting at `start`, in file order.
    pub fn chain(&self, start: u16) -> Result<Vec<u16>, FatError> {
        let max_cluster = self.geometry.max_cluster();
        if start < FIRST_DATA_CLUSTER || start > max_cluster {
            return Err(FatError::ChainError(format!(
                "first cluster {} is outside the data region 2..={}",
                start, max_cluster
            )));
        }

        let limit = self.step_limit();
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = start;

        loop {
            if chain.len() as u32 >= limit {
                return Err(FatError::ChainError(format!(
                    "chain from cluster {} exceeds {} clusters",
                    start, limit
                )));
            }
            if !visited.insert(current) {
                return Err(FatError::ChainError(format!(
                    "cluster {} is revisited, chain from cluster {} is cyclic",
                    current, start
                )));
            }
            chain.push(current);

            match self.fat.lookup(current)? {
                ClusterLink::Next(next) if next > max_cluster => {
                    return Err(FatError::ChainError(format!(
                        "cluster {} links to {} past the last data cluster {}",
                        current, next, max_cluster
                    )));
                }
                ClusterLink::Next(next) => {
                    trace!("Cluster {} -> {}", current, next);
                    current = next;
                }
                ClusterLink::EndOfChain(_) => break,
                ClusterLink::Free => {
                    return Err(FatError::ChainError(format!(
                        "cluster {} links to a free entry",
                        current
                    )));
                }
                ClusterLink::Reserved(value) => {
                    return Err(FatError::ChainError(format!(
                        "cluster {} has reserved link value {:#05x}",
                        current, value
                    )));
                }
                ClusterLink::Bad => {
                    return Err(FatError::ChainError(format!("cluster {} is marked bad", current)));
                }
            }
        }

        Ok(chain)
    }

    /// Read every cluster of the chain starting at `start`. The result is a
    /// whole number of clusters; the final cluster is usually only partly
    /// used.
    pub fn read_clusters<S: SectorSource + ?Sized>(&self, source: &mut S, start: u16) -> Result<Vec<u8>, FatError> {
        let chain = self.chain(start)?;
        self.read_chain(source, &chain)
    }

    fn read_chain<S: SectorSource + ?Sized>(&self, source: &mut S, chain: &[u16]) -> Result<Vec<u8>, FatError> {
        let sectors_per_cluster = self.geometry.sectors_per_cluster as u32;

        let mut data = Vec::with_capacity(chain.len() * self.geometry.cluster_size() as usize);
        for &cluster in chain {
            let lba = self.geometry.cluster_lba(cluster)?;
            data.extend_from_slice(&source.read_sectors(lba, sectors_per_cluster)?);
        }

        Ok(data)
    }

    /// Contents of a file: exactly `entry.file_size` bytes.
    pub fn read<S: SectorSource + ?Sized>(&self, source: &mut S, entry: &DirectoryEntry) -> Result<Vec<u8>, FatError> {
        let size = entry.file_size as u64;
        if size == 0 {
            return Ok(Vec::new());
        }

        let start = entry.first_cluster();
        let chain = self.chain(start)?;
        let cluster_size = self.geometry.cluster_size() as u64;
        let capacity = chain.len() as u64 * cluster_size;
        if capacity < size {
            return Err(FatError::ChainError(format!(
                "{}: {} cluster(s) hold {} bytes but the file is {} bytes",
                entry.display_name(),
                chain.len(),
                capacity,
                size
            )));
        }

        let needed = ((size + cluster_size - 1) / cluster_size) as usize;
        if chain.len() > needed {
            warn!(
                "{}: chain has {} clusters, only {} are needed for {} bytes",
                entry.display_name(),
                chain.len(),
                needed,
                size
            );
        }

        debug!(
            "Reading {} ({} bytes) from {} cluster(s) starting at {}",
            entry.display_name(),
            size,
            chain.len(),
            start
        );

        let mut data = self.read_chain(source, &chain)?;
        data.truncate(size as usize);
        Ok(data)
    }
}
