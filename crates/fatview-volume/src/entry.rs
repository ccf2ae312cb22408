//! 32-byte directory entry decoding

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Directory entry size in bytes
pub const ENTRY_SIZE: usize = 32;

/// Status byte marking the end of a directory
pub const STATUS_UNALLOCATED: u8 = 0x00;
/// Status byte marking a deleted entry
pub const STATUS_DELETED: u8 = 0xE5;

/// One decoded 8.3 directory entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Base name, 8 bytes space padded; byte 0 doubles as the status byte
    pub filename: [u8; 8],
    /// Extension, 3 bytes space padded
    pub extension: [u8; 3],
    /// Attribute bitmask
    pub attributes: u8,
    /// Creation time, tenths of a second part
    pub creation_time_tenths: u8,
    /// Creation time: hours 15-11, minutes 10-5, seconds/2 4-0
    pub creation_time: u16,
    /// Creation date: year-1980 15-9, month 8-5, day 4-0
    pub creation_date: u16,
    /// Last access date
    pub access_date: u16,
    /// High word of the first cluster; unused on FAT12
    pub first_cluster_high: u16,
    /// Modification time
    pub modified_time: u16,
    /// Modification date
    pub modified_date: u16,
    /// Low word of the first cluster
    pub first_cluster_low: u16,
    /// File size in bytes; 0 for directories
    pub file_size: u32,
}

impl DirEntry {
    /// Attribute: Read-only
    pub const ATTR_READ_ONLY: u8 = 0x01;
    /// Attribute: Hidden
    pub const ATTR_HIDDEN: u8 = 0x02;
    /// Attribute: System
    pub const ATTR_SYSTEM: u8 = 0x04;
    /// Attribute: Volume label
    pub const ATTR_VOLUME_LABEL: u8 = 0x08;
    /// Attribute: Directory
    pub const ATTR_DIRECTORY: u8 = 0x10;
    /// Attribute: Archive
    pub const ATTR_ARCHIVE: u8 = 0x20;
    /// Attribute combination marking a long-filename slot (exact match)
    pub const ATTR_LONG_FILENAME: u8 = 0x0F;

    /// Decode an entry from its 32 raw bytes
    ///
    /// Returns `None` only when fewer than 32 bytes are supplied; deleted
    /// and end-of-directory entries decode normally so the status
    /// predicates below can see them.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < ENTRY_SIZE {
            return None;
        }

        let mut filename = [0u8; 8];
        filename.copy_from_slice(&bytes[0..8]);
        let mut extension = [0u8; 3];
        extension.copy_from_slice(&bytes[8..11]);

        Some(Self {
            filename,
            extension,
            attributes: bytes[11],
            creation_time_tenths: bytes[13],
            creation_time: u16::from_le_bytes([bytes[14], bytes[15]]),
            creation_date: u16::from_le_bytes([bytes[16], bytes[17]]),
            access_date: u16::from_le_bytes([bytes[18], bytes[19]]),
            first_cluster_high: u16::from_le_bytes([bytes[20], bytes[21]]),
            modified_time: u16::from_le_bytes([bytes[22], bytes[23]]),
            modified_date: u16::from_le_bytes([bytes[24], bytes[25]]),
            first_cluster_low: u16::from_le_bytes([bytes[26], bytes[27]]),
            file_size: u32::from_le_bytes([bytes[28], bytes[29], bytes[30], bytes[31]]),
        })
    }

    /// Allocation status byte (first byte of the name field)
    pub fn status(&self) -> u8 {
        self.filename[0]
    }

    /// True for the 0x00 entry that terminates directory iteration
    pub fn is_last(&self) -> bool {
        self.status() == STATUS_UNALLOCATED
    }

    /// True for deleted entries
    pub fn is_deleted(&self) -> bool {
        self.status() == STATUS_DELETED
    }

    /// True for entries normal enumeration passes over:
    /// deleted, hidden, or a long-filename slot
    pub fn is_skippable(&self) -> bool {
        self.is_deleted()
            || self.attributes & Self::ATTR_HIDDEN != 0
            || self.attributes == Self::ATTR_LONG_FILENAME
    }

    pub fn is_directory(&self) -> bool {
        self.attributes & Self::ATTR_DIRECTORY != 0
    }

    pub fn is_volume_label(&self) -> bool {
        self.attributes & Self::ATTR_VOLUME_LABEL != 0
    }

    pub fn is_read_only(&self) -> bool {
        self.attributes & Self::ATTR_READ_ONLY != 0
    }

    pub fn is_hidden(&self) -> bool {
        self.attributes & Self::ATTR_HIDDEN != 0
    }

    pub fn is_system(&self) -> bool {
        self.attributes & Self::ATTR_SYSTEM != 0
    }

    pub fn is_archive(&self) -> bool {
        self.attributes & Self::ATTR_ARCHIVE != 0
    }

    /// First cluster of the entry's chain (FAT12 uses only the low word)
    pub fn first_cluster(&self) -> u16 {
        self.first_cluster_low
    }

    /// Reconstruct the lowercase 8.3 name
    ///
    /// The base name runs to the first space; a `.` and the extension are
    /// appended when the extension field is non-blank. At most 12 chars.
    pub fn display_name(&self) -> String {
        let mut name = String::with_capacity(12);
        for &b in &self.filename {
            if b == b' ' {
                break;
            }
            name.push(b.to_ascii_lowercase() as char);
        }
        if self.extension[0] != b' ' {
            name.push('.');
            for &b in &self.extension {
                if b == b' ' {
                    break;
                }
                name.push(b.to_ascii_lowercase() as char);
            }
        }
        name
    }

    /// Creation timestamp, when the stored components form a valid date
    pub fn created(&self) -> Option<NaiveDateTime> {
        decode_datetime(self.creation_time, self.creation_date)
    }

    /// Modification timestamp
    pub fn modified(&self) -> Option<NaiveDateTime> {
        decode_datetime(self.modified_time, self.modified_date)
    }

    /// Access date (FAT keeps no access time)
    pub fn accessed(&self) -> Option<NaiveDate> {
        decode_date(self.access_date).to_naive()
    }
}

/// Raw components of a packed FAT time value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawTime {
    pub hours: u16,
    pub minutes: u16,
    /// Stored in 2-second resolution, already multiplied out
    pub seconds: u16,
}

impl RawTime {
    pub fn to_naive(self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hours as u32, self.minutes as u32, self.seconds as u32)
    }
}

/// Raw components of a packed FAT date value
///
/// Months above 12 or days above 31 are representable on disk; callers
/// decide how to report them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawDate {
    pub year: u16,
    pub month: u16,
    pub day: u16,
}

impl RawDate {
    pub fn is_valid(self) -> bool {
        (1..=12).contains(&self.month) && (1..=31).contains(&self.day)
    }

    pub fn to_naive(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year as i32, self.month as u32, self.day as u32)
    }
}

/// Unpack hours/minutes/seconds from a 16-bit FAT time
pub fn decode_time(time: u16) -> RawTime {
    RawTime {
        hours: (time & 0xF800) >> 11,
        minutes: (time & 0x07E0) >> 5,
        seconds: (time & 0x001F) * 2,
    }
}

/// Unpack year/month/day from a 16-bit FAT date; years offset from 1980
pub fn decode_date(date: u16) -> RawDate {
    RawDate {
        year: 1980 + ((date & 0xFE00) >> 9),
        month: (date & 0x01E0) >> 5,
        day: date & 0x001F,
    }
}

fn decode_datetime(time: u16, date: u16) -> Option<NaiveDateTime> {
    Some(NaiveDateTime::new(
        decode_date(date).to_naive()?,
        decode_time(time).to_naive()?,
    ))
}
