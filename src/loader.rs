//! Decoding images off the UI thread.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::image::{LoadError, SourceFormat};
use crate::session::{LoadTicket, Session, SourceImage};

/// Where image bytes come from.
#[derive(Debug, Clone)]
pub enum LoadInput {
    Path(PathBuf),
    /// Dropped data that is already in memory.
    Bytes { name: String, bytes: Arc<[u8]> },
}

impl LoadInput {
    fn name_path(&self) -> &Path {
        match self {
            LoadInput::Path(path) => path,
            LoadInput::Bytes { name, .. } => Path::new(name),
        }
    }
}

/// A decode running on a background thread.
pub struct PendingLoad {
    ticket: LoadTicket,
    handle: JoinHandle<Result<SourceImage, LoadError>>,
}

/// Validates the type and starts decoding.
///
/// Unsupported types are rejected here, before the session is touched.
pub fn start_load(
    session: &mut Session,
    input: LoadInput,
    declared_mime: Option<&str>,
) -> Result<PendingLoad, LoadError> {
    let format = SourceFormat::detect(input.name_path(), declared_mime)
        .inspect_err(|_| log::warn!("rejected {}", input.name_path().display()))?;
    let ticket = session.begin_load();
    log::info!("loading {} as {format:?}", input.name_path().display());
    let handle = std::thread::spawn(move || match input {
        LoadInput::Path(path) => SourceImage::open(&path, format),
        LoadInput::Bytes { name, bytes } => SourceImage::decode(name, &bytes, format),
    });
    Ok(PendingLoad { ticket, handle })
}

impl PendingLoad {
    /// Returns the outcome once the thread is done, otherwise gives `self` back.
    pub fn poll(self) -> Result<(LoadTicket, Result<SourceImage, LoadError>), Self> {
        if self.handle.is_finished() {
            Ok(self.wait())
        } else {
            Err(self)
        }
    }

    /// Blocks until the decode finishes.
    pub fn wait(self) -> (LoadTicket, Result<SourceImage, LoadError>) {
        let result = self
            .handle
            .join()
            .unwrap_or_else(|_| Err(LoadError::Decode("decoder thread panicked".to_string())));
        (self.ticket, result)
    }
}
