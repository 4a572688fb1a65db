//! Discovery of candidate raw scan files over local directory trees (§4.6, §6's
//! `localdirectory`/`includesubdirs_local` flags). The FTP counterpart is an external
//! collaborator outside this crate's scope (§1); only local discovery is implemented
//! here. Discovery returns every file under the root — the authoritative
//! acquisition-time filter against `fromdate`/`todate` is applied downstream, once the
//! raw-scan reader has actually parsed each file's sky-spectrum timestamp, since the
//! on-disk filename convention is not part of the external format contract this crate
//! is allowed to assume.

use std::path::{Path, PathBuf};

use crate::result::{Error, Result};

/// List candidate scan files under `root`. When `recurse` is true, subdirectories are
/// visited as well (mirrors `includesubdirs_local=1`); otherwise only `root` itself is
/// scanned. Hidden files (dotfiles) are skipped. Results are sorted so that discovery
/// order is deterministic across runs on the same filesystem.
pub fn discover_local_files(root: &Path, recurse: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(root, recurse, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(dir: &Path, recurse: bool, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|source| Error::Io { path: dir.display().to_string(), source })?;

    for entry in entries {
        let entry = entry.map_err(|source| Error::Io { path: dir.display().to_string(), source })?;
        let path = entry.path();
        let is_hidden = path.file_name().and_then(|n| n.to_str()).map(|n| n.starts_with('.')).unwrap_or(false);
        if is_hidden {
            continue;
        }

        if path.is_dir() {
            if recurse {
                walk(&path, recurse, files)?;
            }
        } else {
            files.push(path);
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn non_recursive_discovery_skips_subdirectories() {
        let dir = std::env::temp_dir().join(format!("novac-data-test-{}", std::process::id()));
        let sub = dir.join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(dir.join("a.pak"), b"x").unwrap();
        fs::write(sub.join("b.pak"), b"x").unwrap();
        fs::write(dir.join(".hidden"), b"x").unwrap();

        let shallow = discover_local_files(&dir, false).unwrap();
        assert_eq!(shallow, vec![dir.join("a.pak")]);

        let deep = discover_local_files(&dir, true).unwrap();
        assert_eq!(deep.len(), 2);

        fs::remove_dir_all(&dir).unwrap();
    }
}
