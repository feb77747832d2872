use super::{StreamFile, StreamFileRef, DEFAULT_BUFFER_SIZE};
use crate::error::VgmResult;
use log::trace;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Read window kept by a [`StdioStreamFile`]
#[derive(Debug)]
struct ReadBuffer {
    file: File,
    data: Vec<u8>,
    /// File offset of `data[0]`
    offset: u64,
    /// Number of valid bytes in `data`
    valid: usize,
}

/// Buffered byte source over a file on disk
#[derive(Debug)]
pub struct StdioStreamFile {
    path: PathBuf,
    name: String,
    size: u64,
    buffer: Mutex<ReadBuffer>,
}

impl StdioStreamFile {
    /// Open a file with the default buffer size
    pub fn open_path<P: AsRef<Path>>(path: P) -> VgmResult<Self> {
        Self::open_with_buffer(path, DEFAULT_BUFFER_SIZE)
    }

    /// Open a file keeping a read window of `buffer_size` bytes
    pub fn open_with_buffer<P: AsRef<Path>>(path: P, buffer_size: usize) -> VgmResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let size = file.metadata()?.len();

        Ok(StdioStreamFile {
            path: path.to_path_buf(),
            name: path.to_string_lossy().into_owned(),
            size,
            buffer: Mutex::new(ReadBuffer {
                file,
                data: vec![0; buffer_size.max(1)],
                offset: 0,
                valid: 0,
            }),
        })
    }

    /// Path this source was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReadBuffer {
    fn refill(&mut self, offset: u64) -> std::io::Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.offset = offset;
        self.valid = 0;
        while self.valid < self.data.len() {
            let n = self.file.read(&mut self.data[self.valid..])?;
            if n == 0 {
                break;
            }
            self.valid += n;
        }
        Ok(())
    }
}

impl StreamFile for StdioStreamFile {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> usize {
        if offset >= self.size {
            return 0;
        }
        let Ok(mut state) = self.buffer.lock() else {
            return 0;
        };

        let mut done = 0;
        let mut pos = offset;
        while done < buf.len() && pos < self.size {
            let in_window = pos >= state.offset && pos < state.offset + state.valid as u64;
            if !in_window {
                if let Err(e) = state.refill(pos) {
                    trace!("read of {} at {:#x} failed: {}", self.name, pos, e);
                    break;
                }
                if state.valid == 0 {
                    break;
                }
            }
            let start = (pos - state.offset) as usize;
            let count = (buf.len() - done).min(state.valid - start);
            buf[done..done + count].copy_from_slice(&state.data[start..start + count]);
            done += count;
            pos += count as u64;
        }
        done
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn open(&self, name: &str, buffer_size: usize) -> VgmResult<StreamFileRef> {
        let candidate = Path::new(name);
        let path = match self.path.parent() {
            Some(dir) if !candidate.is_absolute() => dir.join(candidate),
            _ => candidate.to_path_buf(),
        };
        Ok(Arc::new(StdioStreamFile::open_with_buffer(path, buffer_size)?))
    }
}
