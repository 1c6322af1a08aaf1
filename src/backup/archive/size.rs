use crate::backup::result_error::result::Result;
use std::path::Path;
use walkdir::WalkDir;

/// Total byte size of the regular files under `src_dir`.
///
/// Walks the tree the way [`TarArchiver`](super::TarArchiver) does: symlinks
/// are not followed and count as zero bytes.
pub fn tree_size<P: AsRef<Path>>(src_dir: P) -> Result<u64> {
    let mut total = 0u64;
    for entry in WalkDir::new(src_dir).follow_links(false) {
        let entry = entry?;
        if entry.file_type().is_file() {
            total += entry.metadata()?.len();
        }
    }
    tracing::debug!("Source tree holds {} bytes", total);
    Ok(total)
}
