use std::path::PathBuf;
use tempfile::TempDir;

/// Write `content` to a profile inside a fresh temporary directory.
/// The caller must hold onto `TempDir` to keep the file alive.
pub fn write_profile(content: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coverage.out");
    std::fs::write(&path, content).unwrap();
    (dir, path)
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}
