use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Writes `content` to a sibling temp file, fsyncs it, then renames it over `path`.
/// Readers observe either the previous content or the new content, never a mix.
pub fn atomic_write_file(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = parent_of(path)?;
    let tmp_path = sibling_tmp_path(parent, path);

    {
        let mut file = fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&tmp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
    }

    fs::rename(&tmp_path, path)?;
    sync_parent_dir(parent)?;
    Ok(())
}

/// Copies `source` to `target` through a temp file in the target directory, so a
/// half-copied file never appears under its final name. The source's permissions are
/// kept, read-only included; the temp file is removed when any step fails.
pub fn copy_file_durable(source: &Path, target: &Path) -> std::io::Result<u64> {
    let parent = parent_of(target)?;
    let tmp_path = sibling_tmp_path(parent, target);
    let copied = fs::copy(source, &tmp_path)
        .and_then(|bytes| fs::File::open(&tmp_path)?.sync_all().map(|()| bytes))
        .and_then(|bytes| fs::rename(&tmp_path, target).map(|()| bytes));
    if copied.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    copied
}

pub fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

fn parent_of(path: &Path) -> std::io::Result<&Path> {
    path.parent()
        .ok_or_else(|| std::io::Error::other("path has no parent"))
}

fn sibling_tmp_path(parent: &Path, path: &Path) -> PathBuf {
    let tmp_name = format!(
        ".{}.tmp-{}-{}",
        path.file_name().and_then(|v| v.to_str()).unwrap_or("state"),
        std::process::id(),
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0),
    );
    parent.join(tmp_name)
}

#[cfg(unix)]
fn sync_parent_dir(parent: &Path) -> std::io::Result<()> {
    fs::File::open(parent)?.sync_all()
}

#[cfg(not(unix))]
fn sync_parent_dir(_parent: &Path) -> std::io::Result<()> {
    Ok(())
}
