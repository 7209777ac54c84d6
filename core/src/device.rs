use crate::FatError;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::trace;

/// Sector size assumed until the boot sector has been parsed.
pub const DEFAULT_SECTOR_SIZE: u16 = 512;

/// Random-access reads of fixed-size sectors from a backing image.
///
/// Implementations are pure transport: they never retry and report a
/// request that runs past the end of the medium as an error rather than
/// returning a partial buffer.
pub trait SectorSource {
    /// Current sector size in bytes.
    fn sector_size(&self) -> u16;

    /// Switch to the sector size declared by the boot sector.
    fn set_sector_size(&mut self, bytes: u16);

    /// Read `count` sectors starting at LBA `start`.
    ///
    /// The returned buffer is exactly `count * sector_size()` bytes long.
    fn read_sectors(&mut self, start: u64, count: u32) -> Result<Vec<u8>, FatError>;
}

impl<S: SectorSource + ?Sized> SectorSource for &mut S {
    fn sector_size(&self) -> u16 {
        (**self).sector_size()
    }

    fn set_sector_size(&mut self, bytes: u16) {
        (**self).set_sector_size(bytes)
    }

    fn read_sectors(&mut self, start: u64, count: u32) -> Result<Vec<u8>, FatError> {
        (**self).read_sectors(start, count)
    }
}

/// Byte offset and length of a sector range, rejecting arithmetic overflow.
fn sector_span(start: u64, count: u32, sector_size: u16) -> Result<(u64, usize), FatError> {
    let offset = start.checked_mul(sector_size as u64).ok_or(FatError::RangeError {
        region: "image",
        index: start,
        limit: u64::MAX / sector_size.max(1) as u64,
    })?;
    let len = count as usize * sector_size as usize;
    Ok((offset, len))
}

/// Disk image backed by any seekable reader, usually an opened file.
pub struct ImageFile<R> {
    inner: R,
    sector_size: u16,
}

impl ImageFile<File> {
    /// Open an image file read-only.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FatError> {
        let path = path.as_ref();
        trace!("Opening image {}", path.display());
        let file = File::open(path)?;
        Ok(Self::new(file))
    }
}

impl<R: Read + Seek> ImageFile<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            sector_size: DEFAULT_SECTOR_SIZE,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> SectorSource for ImageFile<R> {
    fn sector_size(&self) -> u16 {
        self.sector_size
    }

    fn set_sector_size(&mut self, bytes: u16) {
        self.sector_size = bytes;
    }

    fn read_sectors(&mut self, start: u64, count: u32) -> Result<Vec<u8>, FatError> {
        let (offset, len) = sector_span(start, count, self.sector_size)?;
        trace!("Reading {} sector(s) at LBA {} ({} bytes at {:#x})", count, start, len, offset);

        self.inner.seek(SeekFrom::Start(offset))?;

        let mut buffer = vec![0u8; len];
        let mut filled = 0;
        while filled < len {
            match self.inner.read(&mut buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if filled < len {
            return Err(FatError::ShortRead {
                offset,
                expected: len,
                actual: filled,
            });
        }

        Ok(buffer)
    }
}

/// Disk image held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryImage {
    data: Vec<u8>,
    sector_size: u16,
}

impl MemoryImage {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            sector_size: DEFAULT_SECTOR_SIZE,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl SectorSource for MemoryImage {
    fn sector_size(&self) -> u16 {
        self.sector_size
    }

    fn set_sector_size(&mut self, bytes: u16) {
        self.sector_size = bytes;
    }

    fn read_sectors(&mut self, start: u64, count: u32) -> Result<Vec<u8>, FatError> {
        let (offset, len) = sector_span(start, count, self.sector_size)?;
        let size = self.data.len() as u64;

        if offset.saturating_add(len as u64) > size {
            return Err(FatError::ShortRead {
                offset,
                expected: len,
                actual: size.saturating_sub(offset) as usize,
            });
        }

        let begin = offset as usize;
        Ok(self.data[begin..begin + len].to_vec())
    }
}
