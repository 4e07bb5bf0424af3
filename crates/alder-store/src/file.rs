//! Store file creation, validation, and schema access.

use crate::format::{SchemaSlot, SlotKind, StoreHeader, MAGIC};
use alder_common::{AlderError, Result, StoreConfig};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Handle on a store file.
///
/// `create` lays the file out from scratch; `open` validates the magic
/// and reads the header back. Schema slots are read and written in
/// place.
#[derive(Debug)]
pub struct StoreFile {
    file: File,
    header: StoreHeader,
    slot_count: usize,
}

impl StoreFile {
    /// Creates a fresh store file: magic, header, zeroed schema area,
    /// and one preallocated page. An existing file is truncated.
    pub fn create(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        if config.page_size > u16::MAX as usize {
            return Err(AlderError::ConfigError(format!(
                "page size {} exceeds the header field width",
                config.page_size
            )));
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&config.path)?;

        let header = StoreHeader {
            schema_offset: (MAGIC.len() + StoreHeader::SIZE) as u32,
            page_size: config.page_size as u16,
            flags: config.flags,
        };
        let slot_count = config.schema_slots();

        file.write_all(&MAGIC)?;
        file.write_all(&header.to_bytes())?;
        // Zero-initialized schema area and first page.
        file.write_all(&vec![0u8; slot_count * SchemaSlot::SIZE])?;
        file.write_all(&vec![0u8; config.page_size])?;
        file.flush()?;

        Ok(Self {
            file,
            header,
            slot_count,
        })
    }

    /// Opens an existing store file and validates its header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut file = OpenOptions::new().read(true).write(true).open(path)?;

        let mut magic = [0u8; MAGIC.len()];
        file.read_exact(&mut magic)
            .map_err(|_| AlderError::StoreCorrupted {
                reason: "file shorter than the magic".to_string(),
            })?;
        if magic != MAGIC {
            return Err(AlderError::BadMagic);
        }

        let mut buf = [0u8; StoreHeader::SIZE];
        file.read_exact(&mut buf)
            .map_err(|_| AlderError::StoreCorrupted {
                reason: "truncated header".to_string(),
            })?;
        let header = StoreHeader::from_bytes(&buf);

        if header.schema_offset as usize != MAGIC.len() + StoreHeader::SIZE {
            return Err(AlderError::StoreCorrupted {
                reason: format!("unexpected schema offset {}", header.schema_offset),
            });
        }
        if header.page_size < 128 {
            return Err(AlderError::StoreCorrupted {
                reason: format!("page size {} below minimum", header.page_size),
            });
        }

        let slot_count = header.page_size as usize / 128;
        let schema_end = header.schema_offset as u64 + (slot_count * SchemaSlot::SIZE) as u64;
        let len = file.seek(SeekFrom::End(0))?;
        if len < schema_end {
            return Err(AlderError::StoreCorrupted {
                reason: "schema area extends past end of file".to_string(),
            });
        }

        Ok(Self {
            file,
            header,
            slot_count,
        })
    }

    /// The validated header.
    pub fn header(&self) -> &StoreHeader {
        &self.header
    }

    /// Number of schema slots in the schema area.
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Registers a tree under `id`, writing into the slot already
    /// holding `id` or the first free one.
    pub fn register_schema(&mut self, id: u16, order: u16) -> Result<usize> {
        let mut target = None;
        for index in 0..self.slot_count {
            let slot = self.read_slot(index)?;
            match slot.kind {
                SlotKind::BTree if slot.id == id => {
                    target = Some(index);
                    break;
                }
                SlotKind::Free if target.is_none() => target = Some(index),
                _ => {}
            }
        }
        let index = target.ok_or(AlderError::SchemaFull {
            capacity: self.slot_count,
        })?;

        self.write_slot(
            index,
            &SchemaSlot {
                id,
                kind: SlotKind::BTree,
                root_offset: 0,
                order,
            },
        )?;
        Ok(index)
    }

    /// Reads the schema slot registered under `id`.
    pub fn read_schema(&mut self, id: u16) -> Result<SchemaSlot> {
        for index in 0..self.slot_count {
            let slot = self.read_slot(index)?;
            if slot.kind == SlotKind::BTree && slot.id == id {
                return Ok(slot);
            }
        }
        Err(AlderError::SchemaNotFound(id))
    }

    fn slot_offset(&self, index: usize) -> u64 {
        self.header.schema_offset as u64 + (index * SchemaSlot::SIZE) as u64
    }

    fn read_slot(&mut self, index: usize) -> Result<SchemaSlot> {
        self.file.seek(SeekFrom::Start(self.slot_offset(index)))?;
        let mut buf = [0u8; SchemaSlot::SIZE];
        self.file.read_exact(&mut buf)?;
        Ok(SchemaSlot::from_bytes(&buf))
    }

    fn write_slot(&mut self, index: usize, slot: &SchemaSlot) -> Result<()> {
        self.file.seek(SeekFrom::Start(self.slot_offset(index)))?;
        self.file.write_all(&slot.to_bytes())?;
        self.file.flush()?;
        Ok(())
    }
}
