use std::io;
use std::path::Path;

use tracing::{debug, warn};

/// Outcome of loading the product ID allow-list.
///
/// A file that cannot be read is a soft failure: the run proceeds with an
/// empty allow-list and exports zero products. The distinct `Missing`
/// outcome keeps "no file yet" apart from "file present but empty" so the
/// caller can log the right thing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexRead {
    Missing,
    Loaded { lines: Vec<String> },
}

impl IndexRead {
    pub fn lines(&self) -> &[String] {
        match self {
            IndexRead::Missing => &[],
            IndexRead::Loaded { lines } => lines,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, IndexRead::Missing)
    }
}

/// Read the allow-list fresh from disk, one ID per line.
///
/// Lines are kept verbatim. IDs are matched by exact string equality against
/// the catalog later, so trimming or parsing here would change which products
/// survive. Never fails the caller: an unreadable file logs a warning and
/// comes back `Missing`. Callers must not cache the result across attempts;
/// the retry loop depends on re-reading the file every time.
pub fn read_index(path: &Path) -> IndexRead {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(
                path = %path.display(),
                "index file missing, continuing with an empty allow-list"
            );
            return IndexRead::Missing;
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "could not read index file, continuing with an empty allow-list"
            );
            return IndexRead::Missing;
        }
    };

    let lines: Vec<String> = raw.lines().map(str::to_owned).collect();
    debug!(path = %path.display(), count = lines.len(), "read product index");
    IndexRead::Loaded { lines }
}
