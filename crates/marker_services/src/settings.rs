//! Settings management

use marker_asset::{AssetDescriptor, AssetId, AssetKind, AssetSource, Offset};
use marker_core::math::{Pose, Vec3};
use marker_scene::TrackedImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings are not valid: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub manifest: ManifestSettings,
    pub loading: LoadingSettings,
    pub tracking: TrackingSettings,
    /// Assets placed in addition to the manifest's
    pub builtin_assets: Vec<BuiltinAsset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestSettings {
    /// `https://`, `file://` or a plain path
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingSettings {
    pub timeout_ms: u64,
    pub layout_dir: PathBuf,
}

impl Default for ManifestSettings {
    fn default() -> Self {
        Self {
            url: "https://storage.googleapis.com/arbio/ar-assets-config.json".into(),
        }
    }
}

impl Default for LoadingSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            layout_dir: PathBuf::from("layouts"),
        }
    }
}

impl LoadingSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Simulated tracking feed used by the runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingSettings {
    pub image_name: String,
    pub center: [f32; 3],
    pub extent_x: f32,
    pub extent_z: f32,
    /// Number of pose updates before the feed closes
    pub updates: u32,
    pub interval_ms: u64,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            image_name: "west_stand".into(),
            center: [0.0, 0.0, -1.0],
            extent_x: 0.5,
            extent_z: 0.5,
            updates: 3,
            interval_ms: 500,
        }
    }
}

impl TrackingSettings {
    pub fn image(&self) -> TrackedImage {
        TrackedImage {
            name: self.image_name.clone(),
            center_pose: Pose::from_translation(Vec3::from_array(self.center)),
            extent_x: self.extent_x,
            extent_z: self.extent_z,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Offset of a built-in asset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OffsetSetting {
    Fixed { position: [f32; 3] },
    ExtentScaled { factor: [f32; 3] },
}

impl From<OffsetSetting> for Offset {
    fn from(setting: OffsetSetting) -> Self {
        match setting {
            OffsetSetting::Fixed { position } => Offset::Fixed(Vec3::from_array(position)),
            OffsetSetting::ExtentScaled { factor } => Offset::ExtentScaled(Vec3::from_array(factor)),
        }
    }
}

/// Asset configured locally rather than listed in the manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinAsset {
    pub id: AssetId,
    pub source: String,
    #[serde(default)]
    pub kind: AssetKind,
    pub offset: OffsetSetting,
    #[serde(default)]
    pub animate: bool,
}

impl BuiltinAsset {
    pub fn descriptor(&self) -> AssetDescriptor {
        let source = match self.kind {
            AssetKind::Model => AssetSource::Model(self.source.clone()),
            AssetKind::View => AssetSource::View(self.source.clone()),
        };
        AssetDescriptor {
            id: self.id.clone(),
            source,
            offset: self.offset.into(),
            animate: self.animate,
        }
    }
}

const UPPER_LEFT_CORNER: OffsetSetting = OffsetSetting::ExtentScaled {
    factor: [-0.5, 0.0, -0.5],
};

impl Default for Settings {
    fn default() -> Self {
        Self {
            manifest: ManifestSettings::default(),
            loading: LoadingSettings::default(),
            tracking: TrackingSettings::default(),
            builtin_assets: vec![
                BuiltinAsset {
                    id: "cesium_man".into(),
                    source: "assets/CesiumMan.sfb".into(),
                    kind: AssetKind::Model,
                    offset: UPPER_LEFT_CORNER,
                    animate: false,
                },
                BuiltinAsset {
                    id: "andy_dance".into(),
                    source: "assets/andy_dance.sfb#clips=1".into(),
                    kind: AssetKind::Model,
                    offset: OffsetSetting::Fixed {
                        position: [0.0, 0.0, 0.0],
                    },
                    animate: true,
                },
                BuiltinAsset {
                    id: "rat_genome".into(),
                    source: "rat_genome".into(),
                    kind: AssetKind::View,
                    offset: UPPER_LEFT_CORNER,
                    animate: false,
                },
            ],
        }
    }
}

impl Settings {
    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_the_lobby_setup() {
        let settings = Settings::default();
        assert_eq!(settings.loading.timeout(), Duration::from_secs(30));
        assert_eq!(settings.builtin_assets.len(), 3);

        let andy = settings.builtin_assets[1].descriptor();
        assert!(andy.animate);
        assert_eq!(andy.offset, Offset::Fixed(Vec3::ZERO));

        let rat = settings.builtin_assets[2].descriptor();
        assert_eq!(rat.source, AssetSource::View("rat_genome".into()));
        assert_eq!(rat.offset, Offset::ExtentScaled(Vec3::new(-0.5, 0.0, -0.5)));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let settings = Settings::from_json(
            r#"{ "manifest": { "url": "file:///srv/lobby.json" }, "builtin_assets": [] }"#,
        )
        .unwrap();
        assert_eq!(settings.manifest.url, "file:///srv/lobby.json");
        assert!(settings.builtin_assets.is_empty());
        assert_eq!(settings.tracking.updates, 3);
    }

    #[test]
    fn partial_section_keeps_its_other_keys() {
        let settings = Settings::from_json(
            r#"{ "loading": { "timeout_ms": 250 }, "tracking": { "updates": 7 } }"#,
        )
        .unwrap();
        assert_eq!(settings.loading.timeout(), Duration::from_millis(250));
        assert_eq!(settings.loading.layout_dir, PathBuf::from("layouts"));
        assert_eq!(settings.tracking.updates, 7);
        assert_eq!(settings.tracking.image_name, "west_stand");
        assert_eq!(settings.tracking.interval(), Duration::from_millis(500));
    }

    #[test]
    fn builtin_asset_parses_offset_modes() {
        let settings = Settings::from_json(
            r#"{ "builtin_assets": [
                { "id": "protein", "source": "protein.sfb",
                  "offset": { "mode": "extent_scaled", "factor": [-0.5, 0.0, -0.5] } },
                { "id": "oven", "source": "oven.sfb", "animate": true,
                  "offset": { "mode": "fixed", "position": [-11.5, 0.0, -5.0] } }
            ] }"#,
        )
        .unwrap();

        let oven = settings.builtin_assets[1].descriptor();
        assert_eq!(oven.offset, Offset::Fixed(Vec3::new(-11.5, 0.0, -5.0)));
        assert!(oven.animate);
        assert_eq!(settings.builtin_assets[0].kind, AssetKind::Model);
    }

    #[test]
    fn load_reads_file_and_reports_missing_ones() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marker.json");
        std::fs::write(&path, r#"{ "loading": { "timeout_ms": 250, "layout_dir": "ui" } }"#)
            .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.loading.timeout(), Duration::from_millis(250));
        assert_eq!(settings.loading.layout_dir, PathBuf::from("ui"));

        let err = Settings::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }

    #[test]
    fn tracking_settings_build_an_image() {
        let image = Settings::default().tracking.image();
        assert_eq!(image.name, "west_stand");
        assert_eq!(image.center_pose.position, Vec3::new(0.0, 0.0, -1.0));
    }
}
