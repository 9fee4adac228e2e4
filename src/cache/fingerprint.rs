//! Archive content fingerprints
//!
//! Same bytes = same fingerprint = same version directory.

use crate::error::{CacheError, CacheResult};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Hash a file's contents using SHA256, returning the full lowercase hex digest
pub fn hash_file(path: &Path) -> CacheResult<String> {
    let file = File::open(path)
        .map_err(|e| CacheError::io(format!("opening {} for hashing", path.display()), e))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];

    loop {
        let n = reader
            .read(&mut buffer)
            .map_err(|e| CacheError::io(format!("hashing {}", path.display()), e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn hash_deterministic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plugin.zip");
        fs::write(&path, b"test content").unwrap();

        let hash1 = hash_file(&path).unwrap();
        let hash2 = hash_file(&path).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn hash_known_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.zip");
        fs::write(&path, b"").unwrap();

        assert_eq!(
            hash_file(&path).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn hash_ignores_file_name() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.zip");
        let b = dir.path().join("b.zip");
        fs::write(&a, b"same bytes").unwrap();
        fs::write(&b, b"same bytes").unwrap();

        assert_eq!(hash_file(&a).unwrap(), hash_file(&b).unwrap());
    }

    #[test]
    fn hash_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(hash_file(&dir.path().join("absent.zip")).is_err());
    }
}
