//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into
//! services. Binaries read environment variables; the core never does so
//! during request handling, which keeps behaviour consistent across
//! multi-threaded runtimes and test harnesses.

use std::path::{Path, PathBuf};

use crate::constants::RECORDS_DIR_NAME;
use crate::error::{RecordError, RecordResult};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig` rooted at the given data directory.
    pub fn new(data_dir: PathBuf) -> RecordResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(RecordError::InvalidInput(
                "data directory cannot be empty".into(),
            ));
        }

        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Directory holding the sharded per-record storage.
    pub fn records_dir(&self) -> PathBuf {
        self.data_dir.join(RECORDS_DIR_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_empty_data_dir() {
        let err = CoreConfig::new(PathBuf::new()).expect_err("empty dir should be rejected");
        assert!(matches!(err, RecordError::InvalidInput(_)));
    }

    #[test]
    fn records_dir_is_nested_under_data_dir() {
        let cfg = CoreConfig::new(PathBuf::from("/tmp/crs")).expect("config should be accepted");
        assert_eq!(cfg.records_dir(), PathBuf::from("/tmp/crs/records"));
    }
}
