use crate::AssetId;
use std::time::Duration;
use thiserror::Error;

/// Registry lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("asset '{0}' is not registered")]
    NotFound(AssetId),
}

/// Why a renderable load ended in the failed state.
///
/// Cloneable so every holder of a handle can observe the same failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("cannot read '{location}': {reason}")]
    Io { location: String, reason: String },

    #[error("request for '{url}' failed: {reason}")]
    Http { url: String, reason: String },

    #[error("'{location}' is not a usable renderable: {reason}")]
    Decode { location: String, reason: String },

    #[error("load did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("load was dropped before it finished")]
    Abandoned,
}

/// Failures while obtaining or decoding the asset manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("cannot fetch manifest from '{location}'")]
    Fetch {
        location: String,
        #[source]
        source: LoadError,
    },

    #[error("manifest is not valid: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("manifest lists no assets")]
    Empty,
}
