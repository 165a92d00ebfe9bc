//! File-based storage implementation.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, SepIndexError};
use crate::storage::{Storage, StorageInput, StorageOutput};

const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// A file-based storage implementation rooted at a directory.
#[derive(Debug)]
pub struct FileStorage {
    /// The root directory for storage.
    directory: PathBuf,
}

impl FileStorage {
    /// Create a new file storage in the given directory.
    pub fn new<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();

        // Create directory if it doesn't exist
        if !directory.exists() {
            std::fs::create_dir_all(&directory)
                .map_err(|e| SepIndexError::storage(format!("failed to create directory: {e}")))?;
        }

        if !directory.is_dir() {
            return Err(SepIndexError::storage(format!(
                "path is not a directory: {}",
                directory.display()
            )));
        }

        Ok(FileStorage { directory })
    }

    /// Get the full path for a file name.
    fn file_path(&self, name: &str) -> PathBuf {
        self.directory.join(name)
    }
}

impl Storage for FileStorage {
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>> {
        let path = self.file_path(name);
        let file = File::open(&path)
            .map_err(|e| SepIndexError::storage(format!("cannot open {name}: {e}")))?;
        Ok(Box::new(FileInput::new(path, file)?))
    }

    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
        let path = self.file_path(name);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| SepIndexError::storage(format!("cannot create {name}: {e}")))?;
        Ok(Box::new(FileOutput {
            writer: BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file),
            pos: 0,
        }))
    }

    fn file_exists(&self, name: &str) -> bool {
        self.file_path(name).is_file()
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        std::fs::remove_file(self.file_path(name))
            .map_err(|e| SepIndexError::storage(format!("cannot delete {name}: {e}")))
    }

    fn list_files(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.directory)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn file_size(&self, name: &str) -> Result<u64> {
        let meta = std::fs::metadata(self.file_path(name))
            .map_err(|e| SepIndexError::storage(format!("cannot stat {name}: {e}")))?;
        Ok(meta.len())
    }
}

/// A buffered reader over a file, cloneable into independent cursors.
#[derive(Debug)]
struct FileInput {
    path: PathBuf,
    reader: BufReader<File>,
    size: u64,
    pos: u64,
}

impl FileInput {
    fn new(path: PathBuf, file: File) -> Result<Self> {
        let size = file.metadata()?.len();
        Ok(FileInput {
            path,
            reader: BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file),
            size,
            pos: 0,
        })
    }
}

impl Read for FileInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for FileInput {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.pos = self.reader.seek(pos)?;
        Ok(self.pos)
    }
}

impl StorageInput for FileInput {
    fn size(&self) -> Result<u64> {
        Ok(self.size)
    }

    fn clone_input(&self) -> Result<Box<dyn StorageInput>> {
        let file = File::open(&self.path)
            .map_err(|e| SepIndexError::storage(format!("cannot reopen {:?}: {e}", self.path)))?;
        let mut input = FileInput::new(self.path.clone(), file)?;
        input.seek(SeekFrom::Start(self.pos))?;
        Ok(Box::new(input))
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A buffered writer into a file.
#[derive(Debug)]
struct FileOutput {
    writer: BufWriter<File>,
    pos: u64,
}

impl Write for FileOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.writer.write(buf)?;
        self.pos += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl Seek for FileOutput {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.pos = self.writer.seek(pos)?;
        Ok(self.pos)
    }
}

impl StorageOutput for FileOutput {
    fn flush_and_sync(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        Ok(())
    }

    fn position(&self) -> Result<u64> {
        Ok(self.pos)
    }

    fn close(&mut self) -> Result<()> {
        self.flush_and_sync()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_and_read_file() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        let mut output = storage.create_output("seg.doc").unwrap();
        output.write_all(b"postings bytes").unwrap();
        output.close().unwrap();

        let mut input = storage.open_input("seg.doc").unwrap();
        let mut buffer = Vec::new();
        input.read_to_end(&mut buffer).unwrap();
        assert_eq!(buffer, b"postings bytes");
        assert_eq!(storage.file_size("seg.doc").unwrap(), 14);
    }

    #[test]
    fn test_clone_input_preserves_position() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        let mut output = storage.create_output("seg.skp").unwrap();
        output.write_all(b"abcdef").unwrap();
        output.close().unwrap();

        let mut input = storage.open_input("seg.skp").unwrap();
        input.seek(SeekFrom::Start(3)).unwrap();

        let mut cloned = input.clone_input().unwrap();
        let mut rest = Vec::new();
        cloned.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"def");
    }

    #[test]
    fn test_position_tracking() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        let mut output = storage.create_output("seg.pyl").unwrap();
        assert_eq!(output.position().unwrap(), 0);
        output.write_all(b"xyz").unwrap();
        assert_eq!(output.position().unwrap(), 3);
        output.close().unwrap();
    }

    #[test]
    fn test_list_and_delete() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        for name in ["seg.doc", "seg.frq"] {
            let mut output = storage.create_output(name).unwrap();
            output.write_all(b"x").unwrap();
            output.close().unwrap();
        }

        assert_eq!(storage.list_files().unwrap(), vec!["seg.doc", "seg.frq"]);
        storage.delete_file("seg.frq").unwrap();
        assert!(!storage.file_exists("seg.frq"));
    }
}
