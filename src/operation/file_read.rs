use async_trait::async_trait;
use log::debug;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::Operation;
use crate::error::OperationError;

/// Reads a whole file as UTF-8.
///
/// A missing file is transient and an empty file is not ready yet, so a
/// deadline policy waits for the file to appear. Permission errors are fatal.
#[derive(Debug, Clone, Default)]
pub struct FileRead;

#[async_trait]
impl Operation<PathBuf, String> for FileRead {
    async fn invoke(&self, path: &PathBuf) -> Result<String, OperationError> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) if content.is_empty() => {
                debug!("File '{}' exists but is empty", path.display());
                Err(OperationError::NotReady)
            }
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => Err(OperationError::fatal(e)),
            Err(e) => {
                debug!("Reading '{}' failed: {}", path.display(), e);
                Err(e.into())
            }
        }
    }
}
