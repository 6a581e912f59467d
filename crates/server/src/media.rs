use log::{info, warn};
use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};
use tokio::{fs, io::AsyncWriteExt};

const FALLBACK_NAME: &str = "upload";

/// Uploaded files on local disk, addressed by paths relative to the media root
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `bytes` under `dir` and returns the stored relative path
    ///
    /// Taken names get a numeric suffix (`notes_1.pdf`, `notes_2.pdf`, ...);
    /// files are created exclusively, so concurrent uploads never overwrite each other.
    pub async fn save(&self, dir: &str, file_name: &str, bytes: &[u8]) -> io::Result<String> {
        let target_dir = self.root.join(dir);
        fs::create_dir_all(&target_dir).await?;

        let clean = sanitize_file_name(file_name);
        let (stem, extension) = match clean.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem.to_owned(), format!(".{ext}")),
            _ => (clean.clone(), String::new()),
        };

        for attempt in 0u32.. {
            let name = match attempt {
                0 => format!("{stem}{extension}"),
                n => format!("{stem}_{n}{extension}"),
            };

            let opened = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(target_dir.join(&name))
                .await;

            match opened {
                Ok(mut file) => {
                    file.write_all(bytes).await?;
                    file.flush().await?;

                    let relative = format!("{dir}/{name}");
                    info!("Stored upload {relative} ({} bytes)", bytes.len());
                    return Ok(relative);
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(err),
            }
        }

        Err(io::Error::other("no free file name"))
    }

    /// Removes a stored file; a file that is already gone is not an error
    pub async fn remove(&self, relative: &str) -> io::Result<()> {
        match fs::remove_file(self.root.join(relative)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!("Upload {relative} was already removed");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

/// Last path component of `name`, restricted to a portable character set
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let clean: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();

    let clean = clean.trim_matches('.');
    if clean.is_empty() {
        FALLBACK_NAME.to_owned()
    } else {
        clean.to_owned()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\docs\\my notes.pdf"), "my_notes.pdf");
        assert_eq!(sanitize_file_name("..."), "upload");
        assert_eq!(sanitize_file_name("résumé.txt"), "rsum.txt");
    }

    #[tokio::test]
    async fn test_save_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path());

        let first = storage.save("files", "notes.pdf", b"one").await.unwrap();
        let second = storage.save("files", "notes.pdf", b"two").await.unwrap();

        assert_eq!(first, "files/notes.pdf");
        assert_eq!(second, "files/notes_1.pdf");
        assert_eq!(std::fs::read(dir.path().join(&first)).unwrap(), b"one");
        assert_eq!(std::fs::read(dir.path().join(&second)).unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_remove_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path());

        let path = storage.save("images", "cat.png", b"png").await.unwrap();
        storage.remove(&path).await.unwrap();
        storage.remove(&path).await.unwrap();

        assert!(!dir.path().join(&path).exists());
    }
}
