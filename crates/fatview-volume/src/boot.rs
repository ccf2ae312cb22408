//! Boot-sector parsing

use fatview_core::{checked_multiply_u32_to_u64, Error, Result};

/// Size of the boot sector in bytes
pub const BOOT_SECTOR_SIZE: usize = 512;

/// Parsed FAT12 boot sector
///
/// Covers the fixed-layout fields at the start of the volume. The geometry
/// fields drive the loader; the rest are decorative and surface in the
/// `volinfo` report.
#[derive(Debug, Clone)]
pub struct BootSector {
    /// OEM name (8 bytes, space padded)
    pub oem: [u8; 8],
    /// Bytes per sector (typically 512)
    pub bytes_per_sector: u16,
    /// Sectors per cluster (power of 2)
    pub sectors_per_cluster: u8,
    /// Reserved area in sectors, including the boot sector
    pub reserved_sectors: u16,
    /// Number of FAT copies on disk
    pub fat_count: u8,
    /// Maximum entries in the root directory
    pub max_root_entries: u16,
    /// Total sectors, 16-bit field (0 when the 32-bit field is used)
    pub total_sectors_16: u16,
    /// Media descriptor byte
    pub media_descriptor: u8,
    /// Size of one FAT in sectors
    pub fat_size_sectors: u16,
    /// Sectors per track (CHS)
    pub sectors_per_track: u16,
    /// Number of heads (CHS)
    pub head_count: u16,
    /// Sectors before the start of this volume
    pub hidden_sectors: u32,
    /// Total sectors, 32-bit field (used when the 16-bit field is 0)
    pub total_sectors_32: u32,
    /// BIOS drive number
    pub drive_number: u8,
    /// Extended boot signature; 0x29 validates the three fields below
    pub extended_boot_signature: u8,
    /// Volume serial number
    pub serial_number: u32,
    /// Volume label (11 bytes, space padded)
    pub volume_label: [u8; 11],
    /// Filesystem type label (8 bytes, space padded)
    pub system_type: [u8; 8],
}

impl BootSector {
    /// Parse a boot sector from the first bytes of the image
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than 512 bytes are supplied or the
    /// geometry fields are unusable.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < BOOT_SECTOR_SIZE {
            return Err(Error::invalid_image("boot sector too short"));
        }

        let mut oem = [0u8; 8];
        oem.copy_from_slice(&bytes[3..11]);

        let bytes_per_sector = u16::from_le_bytes([bytes[11], bytes[12]]);
        let sectors_per_cluster = bytes[13];
        let reserved_sectors = u16::from_le_bytes([bytes[14], bytes[15]]);
        let fat_count = bytes[16];
        let max_root_entries = u16::from_le_bytes([bytes[17], bytes[18]]);
        let total_sectors_16 = u16::from_le_bytes([bytes[19], bytes[20]]);
        let media_descriptor = bytes[21];
        let fat_size_sectors = u16::from_le_bytes([bytes[22], bytes[23]]);
        let sectors_per_track = u16::from_le_bytes([bytes[24], bytes[25]]);
        let head_count = u16::from_le_bytes([bytes[26], bytes[27]]);
        let hidden_sectors = u32::from_le_bytes([bytes[28], bytes[29], bytes[30], bytes[31]]);
        let total_sectors_32 = u32::from_le_bytes([bytes[32], bytes[33], bytes[34], bytes[35]]);
        let drive_number = bytes[36];
        let extended_boot_signature = bytes[38];
        let serial_number = u32::from_le_bytes([bytes[39], bytes[40], bytes[41], bytes[42]]);

        let mut volume_label = [0u8; 11];
        volume_label.copy_from_slice(&bytes[43..54]);
        let mut system_type = [0u8; 8];
        system_type.copy_from_slice(&bytes[54..62]);

        if bytes_per_sector == 0 {
            return Err(Error::invalid_image("bytes_per_sector is 0"));
        }
        if sectors_per_cluster == 0 {
            return Err(Error::invalid_image("sectors_per_cluster is 0"));
        }
        if fat_count == 0 {
            return Err(Error::invalid_image("no FAT copies declared"));
        }
        if fat_size_sectors == 0 {
            return Err(Error::invalid_image("fat_size_sectors is 0"));
        }

        Ok(Self {
            oem,
            bytes_per_sector,
            sectors_per_cluster,
            reserved_sectors,
            fat_count,
            max_root_entries,
            total_sectors_16,
            media_descriptor,
            fat_size_sectors,
            sectors_per_track,
            head_count,
            hidden_sectors,
            total_sectors_32,
            drive_number,
            extended_boot_signature,
            serial_number,
            volume_label,
            system_type,
        })
    }

    /// Total sectors on the volume
    ///
    /// FAT12 normally fills in the 16-bit field and zeroes the 32-bit one;
    /// taking the larger of the two covers both encodings.
    pub fn total_sectors(&self) -> u32 {
        (self.total_sectors_16 as u32).max(self.total_sectors_32)
    }

    /// Cluster size in bytes
    pub fn cluster_size(&self) -> u32 {
        self.sectors_per_cluster as u32 * self.bytes_per_sector as u32
    }

    /// Size of one FAT copy in bytes
    pub fn fat_bytes(&self) -> Result<u32> {
        checked_multiply_u32_to_u64(
            self.fat_size_sectors as u32,
            self.bytes_per_sector as u32,
            "FAT size",
        )
        .map(|v| v as u32)
    }

    /// Size of the root directory in bytes
    pub fn root_dir_bytes(&self) -> u32 {
        self.max_root_entries as u32 * 32
    }

    /// Root directory size rounded up to whole sectors
    pub fn root_dir_sectors(&self) -> u32 {
        self.root_dir_bytes().div_ceil(self.bytes_per_sector as u32)
    }

    /// Sectors consumed before the data region: boot, FAT copies, root
    pub fn leading_sectors(&self) -> u32 {
        1 + self.fat_count as u32 * self.fat_size_sectors as u32 + self.root_dir_sectors()
    }

    /// Sectors left for the data region
    pub fn data_sectors(&self) -> Result<u32> {
        self.total_sectors()
            .checked_sub(self.leading_sectors())
            .ok_or_else(|| Error::invalid_image("volume smaller than its own metadata"))
    }

    /// OEM name with padding trimmed
    pub fn oem_name(&self) -> String {
        trim_label(&self.oem)
    }

    /// Volume label with padding trimmed
    pub fn label(&self) -> String {
        trim_label(&self.volume_label)
    }

    /// Filesystem type label with padding trimmed
    pub fn system_type_label(&self) -> String {
        trim_label(&self.system_type)
    }
}

fn trim_label(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches([' ', '\0'])
        .to_string()
}
