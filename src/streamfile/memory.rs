use super::{StreamFile, StreamFileRef};
use crate::error::{VgmError, VgmResult};
use std::collections::HashMap;
use std::io;
use std::sync::Arc;

/// Byte source backed by memory.
///
/// Siblings can be registered up front so that formats that look for
/// companion files (dual-file stereo, playlists) work without a filesystem.
#[derive(Debug, Clone)]
pub struct MemoryStreamFile {
    name: String,
    data: Arc<[u8]>,
    siblings: Arc<HashMap<String, Arc<[u8]>>>,
}

impl MemoryStreamFile {
    /// Create a named in-memory source
    pub fn new(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        MemoryStreamFile {
            name: name.into(),
            data: data.into(),
            siblings: Arc::new(HashMap::new()),
        }
    }

    /// Create a set of named sources that can open each other, returning the one named `name`
    pub fn with_siblings(
        name: &str,
        files: impl IntoIterator<Item = (String, Vec<u8>)>,
    ) -> VgmResult<Self> {
        let siblings: HashMap<String, Arc<[u8]>> = files
            .into_iter()
            .map(|(n, d)| (n, Arc::from(d)))
            .collect();
        let data = siblings.get(name).cloned().ok_or_else(|| {
            VgmError::Io(io::Error::new(io::ErrorKind::NotFound, name.to_string()))
        })?;

        Ok(MemoryStreamFile {
            name: name.to_string(),
            data,
            siblings: Arc::new(siblings),
        })
    }

    /// Wrap into a shared handle
    pub fn into_ref(self) -> StreamFileRef {
        Arc::new(self)
    }
}

impl StreamFile for MemoryStreamFile {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> usize {
        let len = self.data.len() as u64;
        if offset >= len {
            return 0;
        }
        let start = offset as usize;
        let count = buf.len().min(self.data.len() - start);
        buf[..count].copy_from_slice(&self.data[start..start + count]);
        count
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn open(&self, name: &str, _buffer_size: usize) -> VgmResult<StreamFileRef> {
        let data = self.siblings.get(name).cloned().ok_or_else(|| {
            VgmError::Io(io::Error::new(io::ErrorKind::NotFound, name.to_string()))
        })?;

        Ok(Arc::new(MemoryStreamFile {
            name: name.to_string(),
            data,
            siblings: Arc::clone(&self.siblings),
        }))
    }
}
