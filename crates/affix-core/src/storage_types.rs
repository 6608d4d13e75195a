use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::ConfigurationError;

/// Storage backend kinds
///
/// Defined in core because it is named by configuration as well as by the
/// storage crate's factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
    S3,
}

impl FromStr for StorageBackend {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "filesystem" | "local" => Ok(StorageBackend::Local),
            "s3" | "object-store" | "object_store" => Ok(StorageBackend::S3),
            _ => Err(ConfigurationError::UnknownStorage(s.to_string())),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::Local => write!(f, "filesystem"),
            StorageBackend::S3 => write!(f, "s3"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("filesystem".parse::<StorageBackend>().unwrap(), StorageBackend::Local);
        assert_eq!("Local".parse::<StorageBackend>().unwrap(), StorageBackend::Local);
        assert_eq!("s3".parse::<StorageBackend>().unwrap(), StorageBackend::S3);
        assert_eq!("object-store".parse::<StorageBackend>().unwrap(), StorageBackend::S3);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "ftp".parse::<StorageBackend>().unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownStorage(kind) if kind == "ftp"));
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for backend in [StorageBackend::Local, StorageBackend::S3] {
            assert_eq!(backend.to_string().parse::<StorageBackend>().unwrap(), backend);
        }
    }
}
