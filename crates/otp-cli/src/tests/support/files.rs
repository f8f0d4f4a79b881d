//! Temporary plaintext and key files.

use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// A plaintext file and a key file in a private temporary directory.
pub(in crate::tests) struct PadFiles {
    _dir: TempDir,
    pub(in crate::tests) plaintext: PathBuf,
    pub(in crate::tests) key: PathBuf,
}

impl PadFiles {
    pub(in crate::tests) fn new(plaintext: &str, key: &str) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let plaintext_path = dir.path().join("plaintext");
        let key_path = dir.path().join("key");
        fs::write(&plaintext_path, plaintext).expect("write plaintext");
        fs::write(&key_path, key).expect("write key");
        Self {
            _dir: dir,
            plaintext: plaintext_path,
            key: key_path,
        }
    }

    /// Positional arguments for a run against `port`.
    pub(in crate::tests) fn args(&self, port: u16) -> Vec<OsString> {
        vec![
            self.plaintext.clone().into_os_string(),
            self.key.clone().into_os_string(),
            OsString::from(port.to_string()),
        ]
    }
}
