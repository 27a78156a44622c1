//! Marker Asset Pipeline
//!
//! Manifest decoding, asynchronous renderable loading, and the per-session
//! asset registry.

pub mod descriptor;
pub mod error;
pub mod handle;
pub mod loader;
pub mod manifest;
pub mod registry;

pub use descriptor::{AssetDescriptor, AssetId, AssetSource, Offset};
pub use error::{AssetError, LoadError, ManifestError};
pub use handle::{LoadCompleter, LoadHandle, LoadState};
pub use loader::{LoadFuture, Renderable, RenderableKind, RenderableLoader, SourceLoader};
pub use manifest::{AssetKind, Manifest};
pub use registry::{AssetRegistry, RegistryEntry};
