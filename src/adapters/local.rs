use crate::domain::ports::SourceStorage;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::BufReader;

const READ_BUFFER_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }
}

impl SourceStorage for LocalStorage {
    type Reader = BufReader<File>;

    async fn open(&self, name: &str) -> Result<Self::Reader> {
        let full_path = self.base_path.join(name);
        tracing::debug!("Opening {}", full_path.display());
        let file = File::open(full_path).await?;
        Ok(BufReader::with_capacity(READ_BUFFER_SIZE, file))
    }
}
