use crate::backup::archive::Archiver;
use crate::backup::result_error::result::Result;
use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;

/// Writes the source directory as a tar stream rooted at the directory's own name.
///
/// Symlinks are stored as links, matching what [`tree_size`](super::tree_size) counts.
#[derive(Clone, Debug, Default)]
pub struct TarArchiver;

impl Archiver for TarArchiver {
    fn archive(&self, src_dir: &Path, out: &mut dyn Write) -> Result<()> {
        let root = src_dir.file_name().unwrap_or(OsStr::new("."));
        let mut writer = tar::Builder::new(out);
        writer.follow_symlinks(false);

        tracing::debug!("Archiving {:?} as {:?}", src_dir, root);
        writer.append_dir_all(root, src_dir)?;
        writer.into_inner()?.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::io::Read;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn entries(bytes: &[u8]) -> BTreeMap<PathBuf, Vec<u8>> {
        let mut archive = tar::Archive::new(bytes);
        archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap())
            .filter(|e| e.header().entry_type().is_file())
            .map(|mut e| {
                let path = e.path().unwrap().into_owned();
                let mut content = Vec::new();
                e.read_to_end(&mut content).unwrap();
                (path, content)
            })
            .collect()
    }

    #[test]
    fn test_archive_contains_tree_under_root_name() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("photos");
        std::fs::create_dir_all(src.join("2024/summer")).unwrap();
        std::fs::write(src.join("index.txt"), b"index").unwrap();
        std::fs::write(src.join("2024/summer/beach.raw"), vec![7u8; 4096]).unwrap();

        let mut out = Vec::new();
        TarArchiver.archive(&src, &mut out).unwrap();

        let files = entries(&out);
        assert_eq!(files.len(), 2);
        assert_eq!(files[&PathBuf::from("photos/index.txt")], b"index");
        assert_eq!(
            files[&PathBuf::from("photos/2024/summer/beach.raw")],
            vec![7u8; 4096]
        );
    }

    #[test]
    fn test_archive_keeps_empty_directories() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        std::fs::create_dir_all(src.join("empty")).unwrap();

        let mut out = Vec::new();
        TarArchiver.archive(&src, &mut out).unwrap();

        let mut archive = tar::Archive::new(out.as_slice());
        let dirs: Vec<PathBuf> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap())
            .filter(|e| e.header().entry_type().is_dir())
            .map(|e| e.path().unwrap().into_owned())
            .collect();
        assert!(dirs.iter().any(|d| d.ends_with("src/empty")));
    }

    #[test]
    fn test_archive_missing_source_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut out = Vec::new();
        assert!(TarArchiver
            .archive(&temp_dir.path().join("missing"), &mut out)
            .is_err());
    }
}
