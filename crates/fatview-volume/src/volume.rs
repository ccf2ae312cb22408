//! Volume loading and cluster-chain reading

use std::borrow::Cow;
use std::io::{self, Read};
use std::path::Path;

use fatview_core::{
    checked_multiply_u32_to_u64, validate_allocation_size, Error, Result, MAX_ALLOCATION_SIZE,
    MAX_FAT_SIZE,
};
use fatview_pipeline::MmapPipeline;
use tracing::debug;

use crate::boot::{BootSector, BOOT_SECTOR_SIZE};
use crate::entry::{DirEntry, ENTRY_SIZE};
use crate::fat::Fat;
use crate::nav::DirStack;

/// A fully loaded FAT12 volume
///
/// Holds the boot sector, the first FAT copy, the root directory, and the
/// whole data region in memory, plus the working-directory stack. The
/// image is treated as immutable; navigation mutates only the stack.
#[derive(Debug)]
pub struct Volume {
    boot: BootSector,
    fat: Fat,
    root: Vec<u8>,
    data: Vec<u8>,
    pub(crate) stack: DirStack,
}

impl Volume {
    /// Load a volume from an image file via a read-only memory mapping
    pub fn load(path: &Path) -> Result<Self> {
        let mut pipeline = MmapPipeline::open(path)?;
        Self::from_reader(&mut pipeline)
    }

    /// Load a volume from any byte stream positioned at the boot sector
    ///
    /// Reads the boot sector, all FAT copies (keeping only the first),
    /// the root directory, and the remaining sectors into the data
    /// region. Buffer sizes are validated against the limits in
    /// `fatview-core` before allocation.
    pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self> {
        let mut boot_bytes = [0u8; BOOT_SECTOR_SIZE];
        reader.read_exact(&mut boot_bytes)?;
        let boot = BootSector::from_bytes(&boot_bytes)?;

        let fat_bytes = validate_allocation_size(boot.fat_bytes()? as u64, MAX_FAT_SIZE, "FAT")?;
        let mut fat_table = vec![0u8; fat_bytes];
        reader.read_exact(&mut fat_table)?;

        // Read past the redundant copies; only the first is kept
        for _ in 1..boot.fat_count {
            io::copy(&mut reader.by_ref().take(fat_bytes as u64), &mut io::sink())?;
        }

        let root_sector_bytes = checked_multiply_u32_to_u64(
            boot.root_dir_sectors(),
            boot.bytes_per_sector as u32,
            "root directory",
        )?;
        let root_sector_bytes =
            validate_allocation_size(root_sector_bytes, MAX_ALLOCATION_SIZE, "root directory")?;
        let mut root = vec![0u8; root_sector_bytes];
        reader.read_exact(&mut root)?;
        root.truncate(boot.root_dir_bytes() as usize);

        let data_bytes = checked_multiply_u32_to_u64(
            boot.data_sectors()?,
            boot.bytes_per_sector as u32,
            "data region",
        )?;
        let data_bytes = validate_allocation_size(data_bytes, MAX_ALLOCATION_SIZE, "data region")?;
        let mut data = vec![0u8; data_bytes];
        reader.read_exact(&mut data)?;

        debug!(
            total_sectors = boot.total_sectors(),
            cluster_size = boot.cluster_size(),
            fat_count = boot.fat_count,
            root_entries = boot.max_root_entries,
            "volume loaded"
        );

        Ok(Self {
            boot,
            fat: Fat::new(fat_table),
            root,
            data,
            stack: DirStack::default(),
        })
    }

    /// The parsed boot sector
    pub fn boot(&self) -> &BootSector {
        &self.boot
    }

    /// The first FAT copy
    pub fn fat(&self) -> &Fat {
        &self.fat
    }

    /// Raw bytes of the root directory
    pub fn root_bytes(&self) -> &[u8] {
        &self.root
    }

    /// Slice of the data region holding `cluster`
    fn cluster_slice(&self, cluster: u16) -> Result<&[u8]> {
        let cluster_size = self.boot.cluster_size() as usize;
        let offset = (cluster as usize - 2) * cluster_size;
        self.data
            .get(offset..offset + cluster_size)
            .ok_or_else(|| {
                Error::invalid_image(format!("cluster {} lies outside the data region", cluster))
            })
    }

    /// Materialize the full contents behind an entry
    ///
    /// `None` is the root sentinel and borrows the preloaded root
    /// directory; everything else walks the entry's cluster chain into an
    /// owned buffer. Directories are sized by a preflight chain count,
    /// files by `file_size` — a file whose chain ends short of its
    /// declared size is an error.
    pub fn contents_of(&self, entry: Option<&DirEntry>) -> Result<Cow<'_, [u8]>> {
        let Some(entry) = entry else {
            return Ok(Cow::Borrowed(&self.root));
        };

        let cluster_size = self.boot.cluster_size() as usize;
        let total = if entry.is_directory() {
            let clusters = self.fat.chain_len(entry.first_cluster())? as u64;
            validate_allocation_size(
                clusters * cluster_size as u64,
                MAX_ALLOCATION_SIZE,
                "directory contents",
            )?
        } else {
            validate_allocation_size(entry.file_size as u64, MAX_ALLOCATION_SIZE, "file contents")?
        };

        let mut contents = Vec::with_capacity(total);
        let mut remaining = total;
        for cluster in self.fat.chain(entry.first_cluster()) {
            if remaining == 0 {
                break;
            }
            let cluster = cluster?;
            let src = self.cluster_slice(cluster)?;
            let to_read = remaining.min(cluster_size);
            contents.extend_from_slice(&src[..to_read]);
            remaining -= to_read;
        }

        if remaining > 0 {
            return Err(Error::invalid_image(format!(
                "cluster chain for {} ends {} bytes short of its size",
                entry.display_name(),
                remaining
            )));
        }

        Ok(Cow::Owned(contents))
    }

    /// Decode a directory's entries in on-disk order
    ///
    /// Skippable entries (deleted, hidden, long-filename) are dropped;
    /// iteration stops at the first unallocated slot. `None` lists the
    /// root directory.
    pub fn list_dir(&self, entry: Option<&DirEntry>) -> Result<Vec<DirEntry>> {
        if let Some(entry) = entry {
            if !entry.is_directory() {
                return Err(Error::not_a_directory(entry.display_name()));
            }
        }

        let contents = self.contents_of(entry)?;
        let mut entries = Vec::new();
        for raw in contents.chunks_exact(ENTRY_SIZE) {
            let decoded = DirEntry::from_bytes(raw)
                .ok_or_else(|| Error::invalid_image("truncated directory entry"))?;
            if decoded.is_last() {
                break;
            }
            if decoded.is_skippable() {
                continue;
            }
            entries.push(decoded);
        }
        Ok(entries)
    }

    /// Number of live entries in the root directory
    pub fn root_entry_count(&self) -> Result<u32> {
        Ok(self.list_dir(None)?.len() as u32)
    }

    /// The cluster chain behind an entry, in walk order
    pub fn chain_of(&self, entry: &DirEntry) -> Result<Vec<u16>> {
        self.fat.chain(entry.first_cluster()).collect()
    }
}
