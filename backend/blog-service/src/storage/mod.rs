/// Object storage for featured images
///
/// Images are stored under `<owner-id>/<random-uuid>.<ext>` in one bucket and
/// served from a public URL.
use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;

pub mod s3;

pub use s3::S3ObjectStorage;

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` at `path`
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    /// Public URL of the object at `path`
    fn public_url(&self, path: &str) -> String;

    async fn delete(&self, path: &str) -> Result<()>;

    /// Readiness check; backends without one report healthy
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// Fresh object path for an image owned by `owner`
pub fn object_path(owner: Uuid, extension: &str) -> String {
    format!("{}/{}.{}", owner, Uuid::new_v4(), extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_path_layout() {
        let owner = Uuid::new_v4();
        let path = object_path(owner, "png");

        let (dir, file) = path.split_once('/').unwrap();
        assert_eq!(dir, owner.to_string());
        let (stem, ext) = file.rsplit_once('.').unwrap();
        assert!(Uuid::parse_str(stem).is_ok());
        assert_eq!(ext, "png");
    }

    #[test]
    fn test_object_paths_are_unique() {
        let owner = Uuid::new_v4();
        assert_ne!(object_path(owner, "jpg"), object_path(owner, "jpg"));
    }
}
