use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::Path;
use tokio::fs;

/// 直接讀寫本機檔案系統；輸出檔寫在來源檔旁邊
#[derive(Debug, Clone, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(path).await?)
    }

    async fn write_file(&self, path: &Path, data: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, data).await?;
        Ok(())
    }

    async fn remove_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).await?;
        Ok(())
    }

    async fn file_size(&self, path: &Path) -> Result<u64> {
        Ok(fs::metadata(path).await?.len())
    }

    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    async fn is_writable_dir(&self, path: &Path) -> bool {
        match fs::metadata(path).await {
            Ok(meta) if meta.is_dir() => can_write(path, &meta),
            _ => false,
        }
    }

    async fn is_same_file(&self, a: &Path, b: &Path) -> Result<bool> {
        let (a, b) = (a.to_path_buf(), b.to_path_buf());
        let same = tokio::task::spawn_blocking(move || same_file::is_same_file(a, b)).await??;
        Ok(same)
    }
}

/// 依目前使用者的實際權限判斷 (不只看權限位元)
#[cfg(unix)]
fn can_write(path: &Path, _meta: &std::fs::Metadata) -> bool {
    use nix::unistd::{access, AccessFlags};
    access(path, AccessFlags::W_OK).is_ok()
}

#[cfg(not(unix))]
fn can_write(_path: &Path, meta: &std::fs::Metadata) -> bool {
    !meta.permissions().readonly()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_read_size_remove() {
        let temp = TempDir::new().unwrap();
        let storage = LocalStorage::new();
        let path = temp.path().join("nested/out.bin");

        storage.write_file(&path, b"hello").await.unwrap();
        assert!(storage.exists(&path).await);
        assert_eq!(storage.read_file(&path).await.unwrap(), b"hello");
        assert_eq!(storage.file_size(&path).await.unwrap(), 5);

        storage.remove_file(&path).await.unwrap();
        assert!(!storage.exists(&path).await);
    }

    #[test]
    fn test_is_writable_dir() {
        let temp = TempDir::new().unwrap();
        let storage = LocalStorage::new();
        let file = temp.path().join("file.txt");
        std::fs::write(&file, b"x").unwrap();

        tokio_test::block_on(async {
            assert!(storage.is_writable_dir(temp.path()).await);
            assert!(!storage.is_writable_dir(&file).await);
            assert!(!storage.is_writable_dir(&temp.path().join("missing")).await);
        });
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_is_writable_dir_checks_effective_access() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let locked = temp.path().join("locked");
        std::fs::create_dir(&locked).unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o555)).unwrap();

        // root 仍然可以寫入
        let expected = nix::unistd::geteuid().is_root();
        assert_eq!(LocalStorage::new().is_writable_dir(&locked).await, expected);

        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[tokio::test]
    async fn test_is_same_file_follows_identity() {
        let temp = TempDir::new().unwrap();
        let storage = LocalStorage::new();
        let a = temp.path().join("a.jpg");
        let b = temp.path().join("b.jpg");
        let linked = temp.path().join("linked.jpg");
        std::fs::write(&a, b"a").unwrap();
        std::fs::write(&b, b"b").unwrap();
        std::fs::hard_link(&a, &linked).unwrap();

        assert!(storage.is_same_file(&a, &a).await.unwrap());
        assert!(storage.is_same_file(&a, &linked).await.unwrap());
        assert!(!storage.is_same_file(&a, &b).await.unwrap());
        assert!(storage.is_same_file(&a, &temp.path().join("gone.jpg")).await.is_err());
    }
}
