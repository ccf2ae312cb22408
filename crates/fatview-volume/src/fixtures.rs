//! Byte-poked FAT12 fixture images for tests
//!
//! Geometry of a 1.44MB floppy: 512-byte sectors, 1 sector per cluster,
//! two 9-sector FATs, 224 root entries, 2880 sectors total. Cluster 2
//! starts at byte 16896.

use std::io::Cursor;

use crate::entry::DirEntry;
use crate::volume::Volume;

const SECTOR: usize = 512;
const FAT_BYTES: usize = 9 * SECTOR;
const FAT1: usize = SECTOR;
const FAT2: usize = FAT1 + FAT_BYTES;
const ROOT: usize = FAT2 + FAT_BYTES;
const DATA: usize = ROOT + 224 * 32;
const IMAGE_BYTES: usize = 2880 * SECTOR;

// fixed timestamp used on all fixture entries: 2021-05-09 14:03:30
const FIXTURE_TIME: u16 = (14 << 11) | (3 << 5) | 15;
const FIXTURE_DATE: u16 = (41 << 9) | (5 << 5) | 9;

pub(crate) struct ImageBuilder {
    bytes: Vec<u8>,
    next_root_slot: usize,
}

impl ImageBuilder {
    pub fn new() -> Self {
        let mut bytes = vec![0u8; IMAGE_BYTES];

        bytes[0..3].copy_from_slice(&[0xEB, 0x3C, 0x90]);
        bytes[3..11].copy_from_slice(b"MSWIN4.1");
        bytes[11..13].copy_from_slice(&512u16.to_le_bytes());
        bytes[13] = 1;
        bytes[14..16].copy_from_slice(&1u16.to_le_bytes());
        bytes[16] = 2;
        bytes[17..19].copy_from_slice(&224u16.to_le_bytes());
        bytes[19..21].copy_from_slice(&2880u16.to_le_bytes());
        bytes[21] = 0xF0;
        bytes[22..24].copy_from_slice(&9u16.to_le_bytes());
        bytes[24..26].copy_from_slice(&18u16.to_le_bytes());
        bytes[26..28].copy_from_slice(&2u16.to_le_bytes());
        bytes[38] = 0x29;
        bytes[43..54].copy_from_slice(b"TESTDISK   ");
        bytes[54..62].copy_from_slice(b"FAT12   ");
        bytes[510..512].copy_from_slice(&[0x55, 0xAA]);

        let mut builder = Self {
            bytes,
            next_root_slot: 0,
        };
        builder.set_fat(0, 0xFF0);
        builder.set_fat(1, 0xFFF);
        builder
    }

    /// Pack a 12-bit value into both FAT copies
    pub fn set_fat(&mut self, cluster: u16, value: u16) {
        for base in [FAT1, FAT2] {
            let offset = base + cluster as usize + cluster as usize / 2;
            if cluster & 1 == 1 {
                self.bytes[offset] = (self.bytes[offset] & 0x0F) | ((value << 4) as u8);
                self.bytes[offset + 1] = (value >> 4) as u8;
            } else {
                self.bytes[offset] = value as u8;
                self.bytes[offset + 1] =
                    (self.bytes[offset + 1] & 0xF0) | ((value >> 8) as u8 & 0x0F);
            }
        }
    }

    pub fn add_root_entry(&mut self, slot: usize, raw: [u8; 32]) {
        let offset = ROOT + slot * 32;
        self.bytes[offset..offset + 32].copy_from_slice(&raw);
        self.next_root_slot = self.next_root_slot.max(slot + 1);
    }

    pub fn push_root_entry(&mut self, raw: [u8; 32]) {
        self.add_root_entry(self.next_root_slot, raw);
    }

    pub fn write_cluster(&mut self, cluster: u16, data: &[u8]) {
        let offset = DATA + (cluster as usize - 2) * SECTOR;
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }

    pub fn volume(self) -> Volume {
        let mut cursor = Cursor::new(self.bytes);
        Volume::from_reader(&mut cursor).expect("fixture image loads")
    }
}

/// Build a raw 32-byte entry; `name` is the 11-byte padded 8.3 field
pub(crate) fn raw_entry(name: &str, attributes: u8, cluster: u16, size: u32) -> [u8; 32] {
    assert_eq!(name.len(), 11, "name must be the padded 11-byte field");
    let mut bytes = [0u8; 32];
    bytes[0..11].copy_from_slice(name.as_bytes());
    bytes[11] = attributes;
    bytes[14..16].copy_from_slice(&FIXTURE_TIME.to_le_bytes());
    bytes[16..18].copy_from_slice(&FIXTURE_DATE.to_le_bytes());
    bytes[18..20].copy_from_slice(&FIXTURE_DATE.to_le_bytes());
    bytes[22..24].copy_from_slice(&FIXTURE_TIME.to_le_bytes());
    bytes[24..26].copy_from_slice(&FIXTURE_DATE.to_le_bytes());
    bytes[26..28].copy_from_slice(&cluster.to_le_bytes());
    bytes[28..32].copy_from_slice(&size.to_le_bytes());
    bytes
}

pub(crate) fn file_entry(name: &str, cluster: u16, size: u32) -> [u8; 32] {
    raw_entry(name, DirEntry::ATTR_ARCHIVE, cluster, size)
}

pub(crate) fn dir_entry(name: &str, cluster: u16) -> [u8; 32] {
    raw_entry(name, DirEntry::ATTR_DIRECTORY, cluster, 0)
}

fn deleted_entry(name: &str) -> [u8; 32] {
    let mut bytes = raw_entry(name, DirEntry::ATTR_ARCHIVE, 0, 0);
    bytes[0] = 0xE5;
    bytes
}

fn dir_cluster(entries: &[[u8; 32]]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(entries.len() * 32);
    for entry in entries {
        bytes.extend_from_slice(entry);
    }
    bytes
}

/// The standard fixture: a volume label, files, a subtree three levels
/// deep, skippable slots, and one file with a bad cluster chain.
///
/// ```text
/// /
/// ├── hello.txt   (12 bytes, cluster 2)
/// ├── subdir/     (cluster 3)
/// │   ├── nested.txt  (7 bytes, cluster 4)
/// │   └── deep/       (cluster 8)
/// │       └── bottom/ (cluster 9)
/// ├── span.txt    (600 bytes, clusters 5-6)
/// └── broken.txt  (600 bytes, cluster 7 then 0xFF7)
/// ```
pub(crate) fn sample_builder() -> ImageBuilder {
    let mut builder = ImageBuilder::new();

    builder.push_root_entry(raw_entry(
        "TESTDISK   ",
        DirEntry::ATTR_VOLUME_LABEL,
        0,
        0,
    ));

    builder.push_root_entry(file_entry("HELLO   TXT", 2, 12));
    builder.set_fat(2, 0xFFF);
    builder.write_cluster(2, b"hello world\n");

    builder.push_root_entry(deleted_entry("GONE    TXT"));
    builder.push_root_entry(raw_entry(
        "LFNSLOT    ",
        DirEntry::ATTR_LONG_FILENAME,
        0,
        0,
    ));

    builder.push_root_entry(dir_entry("SUBDIR     ", 3));
    builder.set_fat(3, 0xFFF);
    builder.write_cluster(
        3,
        &dir_cluster(&[
            dir_entry(".          ", 3),
            dir_entry("..         ", 0),
            file_entry("NESTED  TXT", 4, 7),
            dir_entry("DEEP       ", 8),
        ]),
    );
    builder.set_fat(4, 0xFFF);
    builder.write_cluster(4, b"nested\n");
    builder.set_fat(8, 0xFFF);
    builder.write_cluster(
        8,
        &dir_cluster(&[
            dir_entry(".          ", 8),
            dir_entry("..         ", 3),
            dir_entry("BOTTOM     ", 9),
        ]),
    );
    builder.set_fat(9, 0xFFF);
    builder.write_cluster(
        9,
        &dir_cluster(&[dir_entry(".          ", 9), dir_entry("..         ", 8)]),
    );

    builder.push_root_entry(file_entry("SPAN    TXT", 5, 600));
    builder.set_fat(5, 6);
    builder.set_fat(6, 0xFFF);
    builder.write_cluster(5, &[b'A'; 512]);
    builder.write_cluster(6, &[b'B'; 512]);

    builder.push_root_entry(file_entry("BROKEN  TXT", 7, 600));
    builder.set_fat(7, 0xFF7);
    builder.write_cluster(7, &[b'X'; 512]);

    // invisible to listings
    let mut hidden = file_entry("SECRET  TXT", 0, 0);
    hidden[11] |= DirEntry::ATTR_HIDDEN;
    builder.push_root_entry(hidden);

    builder
}

pub(crate) fn sample_image() -> Vec<u8> {
    sample_builder().build()
}

pub(crate) fn sample_volume() -> Volume {
    sample_builder().volume()
}

/// A volume whose root holds `loop/`, a directory containing itself
pub(crate) fn looping_dirs_volume() -> Volume {
    let mut builder = ImageBuilder::new();
    builder.push_root_entry(dir_entry("LOOP       ", 2));
    builder.set_fat(2, 0xFFF);
    builder.write_cluster(
        2,
        &dir_cluster(&[
            dir_entry(".          ", 2),
            dir_entry("..         ", 0),
            dir_entry("LOOP       ", 2),
        ]),
    );
    builder.volume()
}

/// Fetch a root entry by display name; panics when absent
pub(crate) fn root_entry_named(volume: &Volume, name: &str) -> DirEntry {
    volume
        .list_dir(None)
        .expect("root listing")
        .into_iter()
        .find(|e| e.display_name() == name)
        .unwrap_or_else(|| panic!("no root entry named {}", name))
}
