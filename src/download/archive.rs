//! ZIP packaging of downloaded posts.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};

/// Archive every file under `src_dir` into a ZIP at `dest`.
///
/// Entry names are relative to `src_dir` and use `/` separators. Runs on the
/// blocking pool.
pub async fn zip_directory(src_dir: &Path, dest: &Path) -> Result<u64> {
    let src_dir = src_dir.to_path_buf();
    let dest = dest.to_path_buf();

    tokio::task::spawn_blocking(move || write_zip(&src_dir, &dest))
        .await
        .map_err(|e| Error::Archive(format!("archive task failed: {}", e)))?
}

fn write_zip(src_dir: &Path, dest: &Path) -> Result<u64> {
    let mut files = Vec::new();
    collect_files(src_dir, &mut files)?;
    files.sort();

    let mut writer = ZipWriter::new(BufWriter::new(File::create(dest)?));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in &files {
        let name = entry_name(src_dir, path)?;
        writer.start_file(name, options)?;
        let mut input = File::open(path)?;
        io::copy(&mut input, &mut writer)?;
    }

    writer.finish()?;

    let size = std::fs::metadata(dest)?.len();
    tracing::debug!(
        "Archived {} file(s) into {} ({} bytes)",
        files.len(),
        dest.display(),
        size
    );

    Ok(size)
}

/// Recursively collect regular files.
fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_files(&entry.path(), out)?;
        } else if file_type.is_file() {
            out.push(entry.path());
        }
    }
    Ok(())
}

/// ZIP entry name of `path` relative to `root`.
fn entry_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| Error::Archive(format!("{} is outside the archive root", path.display())))?;

    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[tokio::test]
    async fn test_zip_directory_contents() {
        let src = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("b.jpg"), b"bee").unwrap();
        std::fs::write(src.path().join("a.txt"), b"caption").unwrap();
        std::fs::create_dir(src.path().join("sub")).unwrap();
        std::fs::write(src.path().join("sub/c.mp4"), b"video").unwrap();

        let out = tempfile::tempdir().unwrap();
        let dest = out.path().join("post.zip");
        let size = zip_directory(src.path(), &dest).await.unwrap();
        assert!(size > 0);

        let mut archive = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["a.txt", "b.jpg", "sub/c.mp4"]);

        let mut content = String::new();
        archive
            .by_name("sub/c.mp4")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "video");
    }

    #[tokio::test]
    async fn test_zip_empty_directory() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let dest = out.path().join("empty.zip");

        zip_directory(src.path(), &dest).await.unwrap();
        let archive = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        assert_eq!(archive.len(), 0);
    }

    #[tokio::test]
    async fn test_zip_missing_source() {
        let out = tempfile::tempdir().unwrap();
        let result = zip_directory(Path::new("/nonexistent/dir"), &out.path().join("x.zip")).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
