//! In-memory storage implementation for testing and temporary indexes.

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::{Arc, Mutex};

use ahash::AHashMap;

use crate::error::{Result, SepIndexError};
use crate::storage::{Storage, StorageInput, StorageOutput};

type FileMap = Arc<Mutex<AHashMap<String, Arc<[u8]>>>>;

/// An in-memory storage implementation.
///
/// Useful for testing and for building temporary indexes in memory. Files
/// become visible to readers once their output is flushed or closed.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    /// The files stored in memory.
    files: FileMap,
}

impl MemoryStorage {
    /// Create a new memory storage.
    pub fn new() -> Self {
        MemoryStorage {
            files: Arc::new(Mutex::new(AHashMap::new())),
        }
    }

    /// Get the number of files stored.
    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    /// Get the total size of all files.
    pub fn total_size(&self) -> u64 {
        let files = self.files.lock().unwrap();
        files.values().map(|data| data.len() as u64).sum()
    }
}

impl Storage for MemoryStorage {
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>> {
        let files = self.files.lock().unwrap();
        let data = files
            .get(name)
            .ok_or_else(|| SepIndexError::storage(format!("file not found: {name}")))?;

        Ok(Box::new(MemoryInput {
            data: Arc::clone(data),
            pos: 0,
        }))
    }

    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
        Ok(Box::new(MemoryOutput {
            name: name.to_string(),
            files: Arc::clone(&self.files),
            buffer: Vec::new(),
            pos: 0,
        }))
    }

    fn file_exists(&self, name: &str) -> bool {
        self.files.lock().unwrap().contains_key(name)
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        self.files.lock().unwrap().remove(name);
        Ok(())
    }

    fn list_files(&self) -> Result<Vec<String>> {
        let files = self.files.lock().unwrap();
        let mut names: Vec<String> = files.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn file_size(&self, name: &str) -> Result<u64> {
        let files = self.files.lock().unwrap();
        let data = files
            .get(name)
            .ok_or_else(|| SepIndexError::storage(format!("file not found: {name}")))?;
        Ok(data.len() as u64)
    }
}

/// A reader over an in-memory file.
#[derive(Debug)]
struct MemoryInput {
    data: Arc<[u8]>,
    pos: u64,
}

impl Read for MemoryInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let start = (self.pos as usize).min(self.data.len());
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for MemoryInput {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let new_pos = match pos {
            SeekFrom::Start(offset) => offset as i64,
            SeekFrom::End(offset) => self.data.len() as i64 + offset,
            SeekFrom::Current(offset) => self.pos as i64 + offset,
        };
        if new_pos < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of stream",
            ));
        }
        self.pos = new_pos as u64;
        Ok(self.pos)
    }
}

impl StorageInput for MemoryInput {
    fn size(&self) -> Result<u64> {
        Ok(self.data.len() as u64)
    }

    fn clone_input(&self) -> Result<Box<dyn StorageInput>> {
        Ok(Box::new(MemoryInput {
            data: Arc::clone(&self.data),
            pos: self.pos,
        }))
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A writer into an in-memory file.
#[derive(Debug)]
struct MemoryOutput {
    name: String,
    files: FileMap,
    buffer: Vec<u8>,
    pos: u64,
}

impl MemoryOutput {
    fn install(&self) {
        let mut files = self.files.lock().unwrap();
        files.insert(self.name.clone(), Arc::from(self.buffer.as_slice()));
    }
}

impl Write for MemoryOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let pos = self.pos as usize;
        if pos < self.buffer.len() {
            let overlap = buf.len().min(self.buffer.len() - pos);
            self.buffer[pos..pos + overlap].copy_from_slice(&buf[..overlap]);
            self.buffer.extend_from_slice(&buf[overlap..]);
        } else {
            self.buffer.extend_from_slice(buf);
        }
        self.pos += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MemoryOutput {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let new_pos = match pos {
            SeekFrom::Start(offset) => offset as i64,
            SeekFrom::End(offset) => self.buffer.len() as i64 + offset,
            SeekFrom::Current(offset) => self.pos as i64 + offset,
        };
        if new_pos < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of stream",
            ));
        }
        self.pos = new_pos as u64;
        Ok(self.pos)
    }
}

impl StorageOutput for MemoryOutput {
    fn flush_and_sync(&mut self) -> Result<()> {
        self.install();
        Ok(())
    }

    fn position(&self) -> Result<u64> {
        Ok(self.pos)
    }

    fn close(&mut self) -> Result<()> {
        self.install();
        Ok(())
    }
}
