//! Memory-mapped image access

use fatview_core::MAX_IMAGE_SIZE;
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// A read-only, memory-mapped view of a disk image.
///
/// Implements `Read + Seek` so the volume loader can consume it like any
/// other stream while reads stay copy-free until the loader's own buffers.
pub struct MmapPipeline {
    mmap: Mmap,
    position: u64,
}

impl MmapPipeline {
    /// Open an image file with memory mapping
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a regular file, exceeds
    /// [`MAX_IMAGE_SIZE`], or cannot be mapped.
    ///
    /// # Safety
    ///
    /// Uses `unsafe` for the mapping itself. The file is validated to be a
    /// regular file first, the mapping is read-only, and the file must not
    /// be truncated while the mapping is alive (caller responsibility).
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let metadata = file.metadata()?;

        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Only regular files can be memory-mapped",
            ));
        }

        if metadata.len() > MAX_IMAGE_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "Image size {} exceeds limit {}",
                    metadata.len(),
                    MAX_IMAGE_SIZE
                ),
            ));
        }

        // SAFETY: regular file, validated size, read-only private mapping.
        let mmap = unsafe { Mmap::map(&file)? };

        Ok(Self { mmap, position: 0 })
    }

    /// Get the length of the mapped image
    pub fn len(&self) -> u64 {
        self.mmap.len() as u64
    }

    /// Check if the mapped image is empty
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Get the current position
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Get remaining bytes from current position
    pub fn remaining(&self) -> u64 {
        self.len().saturating_sub(self.position)
    }

    /// Get the entire mapped image as a slice
    pub fn as_slice(&self) -> &[u8] {
        &self.mmap
    }
}

impl Read for MmapPipeline {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.remaining() as usize;
        if remaining == 0 {
            return Ok(0); // EOF
        }

        let to_read = buf.len().min(remaining);
        let start = self.position as usize;

        buf[..to_read].copy_from_slice(&self.mmap[start..start + to_read]);
        self.position += to_read as u64;

        Ok(to_read)
    }
}

impl Seek for MmapPipeline {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let new_pos = match pos {
            SeekFrom::Start(offset) => offset as i64,
            SeekFrom::End(offset) => self.len() as i64 + offset,
            SeekFrom::Current(offset) => self.position as i64 + offset,
        };

        if new_pos < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Seek before beginning of image",
            ));
        }

        self.position = new_pos as u64;
        Ok(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn image_file(bytes: usize) -> NamedTempFile {
        let mut tmpfile = NamedTempFile::new().unwrap();
        let data: Vec<u8> = (0..bytes).map(|i| i as u8).collect();
        tmpfile.write_all(&data).unwrap();
        tmpfile.flush().unwrap();
        tmpfile
    }

    #[test]
    fn test_mmap_pipeline_basic() {
        let tmpfile = image_file(100);
        let pipeline = MmapPipeline::open(tmpfile.path()).unwrap();

        assert_eq!(pipeline.len(), 100);
        assert_eq!(pipeline.position(), 0);
        assert_eq!(pipeline.remaining(), 100);
        assert!(!pipeline.is_empty());
    }

    #[test]
    fn test_mmap_pipeline_read() {
        let tmpfile = image_file(100);
        let mut pipeline = MmapPipeline::open(tmpfile.path()).unwrap();

        let mut buf = [0u8; 10];
        let n = pipeline.read(&mut buf).unwrap();
        assert_eq!(n, 10);
        assert_eq!(&buf, &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(pipeline.position(), 10);
    }

    #[test]
    fn test_mmap_pipeline_seek_and_read() {
        let tmpfile = image_file(100);
        let mut pipeline = MmapPipeline::open(tmpfile.path()).unwrap();

        pipeline.seek(SeekFrom::Start(50)).unwrap();
        let mut buf = [0u8; 5];
        pipeline.read(&mut buf).unwrap();
        assert_eq!(&buf, &[50, 51, 52, 53, 54]);

        pipeline.seek(SeekFrom::End(-2)).unwrap();
        let mut buf = [0u8; 5];
        let n = pipeline.read(&mut buf).unwrap();
        assert_eq!(n, 2);
        assert_eq!(&buf[..2], &[98, 99]);
    }

    #[test]
    fn test_mmap_pipeline_read_at_eof() {
        let tmpfile = image_file(10);
        let mut pipeline = MmapPipeline::open(tmpfile.path()).unwrap();

        pipeline.seek(SeekFrom::End(0)).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(pipeline.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_mmap_pipeline_as_slice() {
        let tmpfile = image_file(100);
        let pipeline = MmapPipeline::open(tmpfile.path()).unwrap();

        let slice = pipeline.as_slice();
        assert_eq!(slice.len(), 100);
        assert_eq!(slice[0], 0);
        assert_eq!(slice[99], 99);
    }

    #[test]
    fn test_mmap_pipeline_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(MmapPipeline::open(dir.path()).is_err());
    }
}
