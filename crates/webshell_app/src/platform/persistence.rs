use std::path::Path;

use webshell_core::Bundle;
use webshell_engine::AtomicFileWriter;
use webshell_logging::{shell_error, shell_info, shell_warn};

/// The host's saved-instance bundle, kept as RON next to the working directory.
pub(crate) struct BundleFile {
    writer: AtomicFileWriter,
}

impl BundleFile {
    pub(crate) fn new(path: &Path) -> Self {
        Self {
            writer: AtomicFileWriter::new(path),
        }
    }

    pub(crate) fn load(&self) -> Option<Bundle> {
        let path = self.writer.path();
        let bytes = match self.writer.read() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(err) => {
                shell_warn!("Failed to read saved state from {:?}: {}", path, err);
                return None;
            }
        };
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => {
                shell_warn!("Saved state at {:?} is not UTF-8: {}", path, err);
                return None;
            }
        };

        match ron::from_str::<Bundle>(&text) {
            Ok(bundle) => {
                shell_info!("Loaded saved state from {:?}", path);
                Some(bundle)
            }
            Err(err) => {
                shell_warn!("Failed to parse saved state from {:?}: {}", path, err);
                None
            }
        }
    }

    pub(crate) fn save(&self, bundle: &Bundle) {
        let pretty = ron::ser::PrettyConfig::new();
        let content = match ron::ser::to_string_pretty(bundle, pretty) {
            Ok(text) => text,
            Err(err) => {
                shell_error!("Failed to serialize saved state: {}", err);
                return;
            }
        };

        if let Err(err) = self.writer.write(content.as_bytes()) {
            shell_error!(
                "Failed to write saved state to {:?}: {}",
                self.writer.path(),
                err
            );
        }
    }

    /// A clean exit leaves nothing to restore on the next start.
    pub(crate) fn clear(&self) {
        let path = self.writer.path();
        match std::fs::remove_file(path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => shell_warn!("Failed to remove saved state {:?}: {}", path, err),
        }
    }
}
