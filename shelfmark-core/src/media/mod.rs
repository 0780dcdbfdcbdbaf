//! Cover-image storage over an [`object_store`] backend.
//!
//! Blob names are fully qualified with a fresh UUID so caller-supplied
//! filenames can never collide with (and silently overwrite) an unrelated
//! cover.

use std::sync::Arc;

use bytes::Bytes;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload, parse_url};
use tracing::warn;
use url::Url;
use uuid::Uuid;

use crate::{CatalogError, Result};

pub mod sniff;

pub use sniff::detect_content_type;

/// Uploads, serves and deletes one cover image per book.
#[derive(Clone)]
pub struct CoverStore {
    store: Arc<dyn ObjectStore>,
    prefix: ObjectPath,
    public_base_url: String,
}

impl std::fmt::Debug for CoverStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoverStore")
            .field("prefix", &self.prefix)
            .field("public_base_url", &self.public_base_url)
            .finish_non_exhaustive()
    }
}

impl CoverStore {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        prefix: ObjectPath,
        public_base_url: impl Into<String>,
    ) -> Self {
        let public_base_url = public_base_url.into();
        Self {
            store,
            prefix,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build a store from a backend URL such as `file:///var/lib/shelfmark/covers`
    /// or `s3://bucket/covers`.
    pub fn from_url(store_url: &str, public_base_url: impl Into<String>) -> Result<Self> {
        let url = Url::parse(store_url)
            .map_err(|e| CatalogError::InvalidInput(format!("bad blob store url: {}", e)))?;
        let (store, prefix) = parse_url(&url)?;
        Ok(Self::new(Arc::from(store), prefix, public_base_url))
    }

    /// Store the bytes under a unique name and return the public URL.
    pub async fn upload(&self, data: Bytes, suggested_name: &str) -> Result<String> {
        let name = format!("{}_{}", Uuid::new_v4(), sanitize_name(suggested_name));
        let path = self.prefix.child(name.as_str());

        self.store.put(&path, PutPayload::from(data)).await?;

        Ok(format!("{}/{}", self.public_base_url, name))
    }

    /// Remove the object a URL points at. Malformed URLs and already-missing
    /// objects both resolve to `false`; deletion is called speculatively
    /// before overwrites and must never propagate an error.
    pub async fn delete(&self, url: &str) -> bool {
        let name = object_name_from_url(url);
        if name.is_empty() {
            return false;
        }

        match self.store.delete(&self.prefix.child(name.as_str())).await {
            Ok(()) => true,
            Err(object_store::Error::NotFound { .. }) => false,
            Err(e) => {
                warn!(url, error = %e, "cover deletion failed");
                false
            }
        }
    }

    /// Fetch the object a URL points at.
    pub async fn download(&self, url: &str) -> Result<Bytes> {
        let name = object_name_from_url(url);
        if name.is_empty() {
            return Err(CatalogError::InvalidReference(url.to_string()));
        }
        self.get(&name).await
    }

    /// Fetch an object by its bare name (used by the cover-serving route).
    pub async fn get(&self, name: &str) -> Result<Bytes> {
        let result = self.store.get(&self.prefix.child(name)).await?;
        Ok(result.bytes().await?)
    }

    /// Whether the object a URL points at currently exists.
    pub async fn exists(&self, url: &str) -> Result<bool> {
        let name = object_name_from_url(url);
        if name.is_empty() {
            return Ok(false);
        }

        match self.store.head(&self.prefix.child(name.as_str())).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Extract the trailing path segment of a cover URL. Returns an empty
/// string for empty or unparsable input, never an error.
pub fn object_name_from_url(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }

    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };

    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default()
        .to_string()
}

/// Keep object names to a conservative character set; anything else
/// becomes a dash.
fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "cover".to_string()
    } else {
        cleaned
    }
}
