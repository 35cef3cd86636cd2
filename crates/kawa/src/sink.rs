use std::path::{Path, PathBuf};

use tokio::{fs::File, io::AsyncWriteExt};

use crate::error::KawaResult;

/// Append-only output stream for one phase.
///
/// Bytes land in a `.dl`-suffixed temporary file; only [`StreamSink::finalize`]
/// renames it to the final name. A failed download leaves the temporary file
/// in place as a diagnostic artifact.
pub struct StreamSink {
    file: File,
    temp_path: PathBuf,
    final_path: PathBuf,
}

impl StreamSink {
    pub async fn create(final_path: impl Into<PathBuf>) -> KawaResult<Self> {
        let final_path = final_path.into();
        let temp_path = temp_path_for(&final_path);
        let file = File::create(&temp_path).await?;
        Ok(Self {
            file,
            temp_path,
            final_path,
        })
    }

    pub async fn write_all(&mut self, data: &[u8]) -> KawaResult<()> {
        self.file.write_all(data).await?;
        Ok(())
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    /// Flushes the stream and renames it to its final name.
    pub async fn finalize(mut self) -> KawaResult<PathBuf> {
        self.file.flush().await?;
        drop(self.file);
        tokio::fs::rename(&self.temp_path, &self.final_path).await?;
        Ok(self.final_path)
    }

    /// Flushes the stream but keeps the temporary name. Never renames.
    pub async fn abandon(mut self) -> KawaResult<PathBuf> {
        self.file.flush().await?;
        Ok(self.temp_path)
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".dl");
    PathBuf::from(name)
}
