//! Citation and acknowledgement text for the test instruments.
//!
//! The reference text is read once per process. Reads of the citation file
//! are serialized through a mutex; if the file cannot be read the text
//! bundled at build time is used.

use lazy_static::lazy_static;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Environment variable pointing at an alternate citation file.
pub const CITATION_ENV: &str = "SATKIT_CITATION";

/// Acknowledgement for data produced by the test instruments.
pub const ACKNOWLEDGEMENTS: &str =
    "Test instruments provided through the satkit project. https://github.com/satkit/satkit";

const BUNDLED: &str = include_str!("../citation.txt");

lazy_static! {
    static ref FILE_LOCK: Mutex<()> = Mutex::new(());
    static ref REFERENCES: String = read_references(citation_path());
}

fn citation_path() -> Option<PathBuf> {
    std::env::var_os(CITATION_ENV).map(PathBuf::from)
}

fn read_references(path: Option<PathBuf>) -> String {
    // A poisoned lock only means another reader panicked
    let _guard = FILE_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    match path {
        Some(path) => match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                log::warn!(
                    "unable to read citation file {}: {}; using bundled text",
                    path.display(),
                    e
                );
                BUNDLED.to_string()
            }
        },
        None => BUNDLED.to_string(),
    }
}

/// Reference text, initialized on first use.
pub fn references() -> &'static str {
    REFERENCES.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_references_stable() {
        let a = references();
        let b = references();
        assert!(!a.is_empty());
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_unreadable_file_falls_back() {
        let text = read_references(Some(PathBuf::from("/no/such/citation.txt")));
        assert_eq!(text, BUNDLED);
    }

    #[test]
    fn test_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Custom reference").unwrap();
        let text = read_references(Some(file.path().to_path_buf()));
        assert_eq!(text, "Custom reference");
    }
}
