//! Renderable loading
//!
//! The loader is the boundary to whatever actually decodes meshes and builds
//! views. [`SourceLoader`] fetches the raw bytes behind a source and hands
//! them over as an opaque [`Renderable`].

use crate::{AssetSource, LoadError};
use std::future::Future;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::pin::Pin;

/// Boxed future returned by [`RenderableLoader`] methods.
pub type LoadFuture<'a> = Pin<Box<dyn Future<Output = Result<Renderable, LoadError>> + Send + 'a>>;

/// Kind of renderable produced by a load
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RenderableKind {
    Model,
    View,
}

/// Loaded, GPU-ready resource (opaque to the placement code)
#[derive(Debug, Clone, PartialEq)]
pub struct Renderable {
    kind: RenderableKind,
    source: String,
    data: Vec<u8>,
    clip_count: usize,
}

impl Renderable {
    pub fn model(source: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            kind: RenderableKind::Model,
            source: source.into(),
            data,
            clip_count: 0,
        }
    }

    pub fn view(layout: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            kind: RenderableKind::View,
            source: layout.into(),
            data,
            clip_count: 0,
        }
    }

    /// Number of animation clips carried by the model.
    pub fn with_clips(mut self, clip_count: usize) -> Self {
        self.clip_count = clip_count;
        self
    }

    pub fn kind(&self) -> RenderableKind {
        self.kind
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clip_count(&self) -> usize {
        self.clip_count
    }
}

/// Produces renderables for asset sources.
pub trait RenderableLoader: Send + Sync {
    fn load_model<'a>(&'a self, uri: &'a str) -> LoadFuture<'a>;

    fn load_view<'a>(&'a self, layout: &'a str) -> LoadFuture<'a>;

    fn load<'a>(&'a self, source: &'a AssetSource) -> LoadFuture<'a> {
        match source {
            AssetSource::Model(uri) => self.load_model(uri),
            AssetSource::View(layout) => self.load_view(layout),
        }
    }
}

/// Loader backed by HTTP and the local filesystem.
///
/// Model URIs may end in `#clips=N` to declare how many animation clips the
/// model carries. Views are JSON layout files under `layout_dir`.
pub struct SourceLoader {
    layout_dir: PathBuf,
}

impl SourceLoader {
    pub fn new(layout_dir: impl Into<PathBuf>) -> Self {
        Self {
            layout_dir: layout_dir.into(),
        }
    }

    pub fn layout_dir(&self) -> &Path {
        &self.layout_dir
    }
}

impl RenderableLoader for SourceLoader {
    fn load_model<'a>(&'a self, uri: &'a str) -> LoadFuture<'a> {
        Box::pin(async move {
            let (location, clip_count) = split_clip_fragment(uri)?;
            let data = fetch_bytes(location).await?;
            if data.is_empty() {
                return Err(LoadError::Decode {
                    location: location.to_string(),
                    reason: "model is empty".into(),
                });
            }
            Ok(Renderable::model(location, data).with_clips(clip_count))
        })
    }

    fn load_view<'a>(&'a self, layout: &'a str) -> LoadFuture<'a> {
        Box::pin(async move {
            let path = self.layout_dir.join(format!("{layout}.json"));
            let location = path.display().to_string();
            let data = read_file(&path, &location).await?;
            serde_json::from_slice::<serde_json::Value>(&data).map_err(|e| LoadError::Decode {
                location,
                reason: e.to_string(),
            })?;
            Ok(Renderable::view(layout, data))
        })
    }
}

fn split_clip_fragment(uri: &str) -> Result<(&str, usize), LoadError> {
    let Some((location, fragment)) = uri.split_once('#') else {
        return Ok((uri, 0));
    };
    let count = fragment
        .strip_prefix("clips=")
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| LoadError::Decode {
            location: uri.to_string(),
            reason: format!("unrecognised fragment '#{fragment}'"),
        })?;
    Ok((location, count))
}

/// Fetch the bytes behind a location.
///
/// `http://` and `https://` go through a blocking HTTP client on the
/// blocking pool; `file://` and anything else is read from disk.
pub async fn fetch_bytes(location: &str) -> Result<Vec<u8>, LoadError> {
    if location.starts_with("http://") || location.starts_with("https://") {
        let url = location.to_string();
        return tokio::task::spawn_blocking(move || http_get(&url))
            .await
            .map_err(|e| LoadError::Http {
                url: location.to_string(),
                reason: e.to_string(),
            })?;
    }

    let path = location.strip_prefix("file://").unwrap_or(location);
    read_file(Path::new(path), location).await
}

async fn read_file(path: &Path, location: &str) -> Result<Vec<u8>, LoadError> {
    tokio::fs::read(path).await.map_err(|e| LoadError::Io {
        location: location.to_string(),
        reason: e.to_string(),
    })
}

fn http_get(url: &str) -> Result<Vec<u8>, LoadError> {
    let http_error = |reason: String| LoadError::Http {
        url: url.to_string(),
        reason,
    };

    let response = ureq::get(url).call().map_err(|e| match e {
        ureq::Error::Status(code, _) => http_error(format!("HTTP {code}")),
        ureq::Error::Transport(t) => http_error(t.to_string()),
    })?;

    let mut data = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut data)
        .map_err(|e| http_error(e.to_string()))?;
    Ok(data)
}
