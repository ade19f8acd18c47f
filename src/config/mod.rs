use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{MAX_SCALE, MIN_SCALE};

/// System set for config loading (other plugins can run after this)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigLoaded;

/// Who is using the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Places annotations and enters marks
    #[default]
    Grader,
    /// Views their own graded sheets read-only
    Student,
}

/// Where answer sheets, assignments, annotations and marks live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreConfig {
    File { root: PathBuf },
    Http { base_url: String },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::File {
            root: crate::paths::default_store_dir(),
        }
    }
}

fn default_pages_dir() -> PathBuf {
    crate::paths::default_pages_dir()
}

fn default_scale() -> f32 {
    1.0
}

/// Application configuration persisted to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfigData {
    #[serde(default)]
    pub role: Role,

    #[serde(default)]
    pub grader_id: String,

    #[serde(default)]
    pub student_id: String,

    /// Exam whose answer sheets are listed
    #[serde(default)]
    pub exam_id: String,

    #[serde(default)]
    pub store: StoreConfig,

    /// Root of the pre-rendered page images (one directory per document)
    #[serde(default = "default_pages_dir")]
    pub pages_dir: PathBuf,

    /// Render scale a freshly opened sheet starts at
    #[serde(default = "default_scale")]
    pub default_scale: f32,

    /// Last opened answer sheet (highlighted in the sheet list, not auto-opened)
    #[serde(default)]
    pub last_sheet_id: Option<String>,
}

impl Default for AppConfigData {
    fn default() -> Self {
        Self {
            role: Role::default(),
            grader_id: String::new(),
            student_id: String::new(),
            exam_id: String::new(),
            store: StoreConfig::default(),
            pages_dir: default_pages_dir(),
            default_scale: default_scale(),
            last_sheet_id: None,
        }
    }
}

impl AppConfigData {
    /// Identity of the current user for their role.
    pub fn user_id(&self) -> &str {
        match self.role {
            Role::Grader => &self.grader_id,
            Role::Student => &self.student_id,
        }
    }

    /// Starting scale, forced into the supported zoom range.
    pub fn start_scale(&self) -> f32 {
        if self.default_scale.is_finite() {
            self.default_scale.clamp(MIN_SCALE, MAX_SCALE)
        } else {
            default_scale()
        }
    }
}

/// Runtime configuration resource
#[derive(Resource)]
pub struct AppConfig {
    /// The persisted configuration data
    pub data: AppConfigData,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Whether config needs to be saved (dirty flag)
    pub dirty: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: AppConfigData::default(),
            config_path: get_config_path(),
            dirty: false,
        }
    }
}

/// Resource for the "page images missing" warning dialog
#[derive(Resource, Default)]
pub struct MissingPagesWarning {
    pub show: bool,
    pub path: Option<PathBuf>,
}

/// Resource to notify user when config was reset to defaults
#[derive(Resource, Default)]
pub struct ConfigResetNotification {
    /// Whether to show the notification dialog
    pub show: bool,
    /// The reason for the reset (parse error, read error, etc.)
    pub reason: Option<String>,
}

/// Message to trigger config save
#[derive(Message)]
pub struct SaveConfigRequest;

/// Message to remember the last opened answer sheet
#[derive(Message)]
pub struct UpdateLastSheetRequest {
    pub sheet_id: String,
}

/// Get the path to the config file (platform-appropriate location)
fn get_config_path() -> PathBuf {
    crate::paths::config_file()
}

/// Result of loading config from disk
struct LoadConfigResult {
    data: AppConfigData,
    /// Error message if config was reset to defaults due to an error
    reset_reason: Option<String>,
}

fn parse_config(json: &str) -> Result<AppConfigData, String> {
    serde_json::from_str(json).map_err(|e| format!("Configuration file was corrupted: {}", e))
}

/// Load configuration from disk
fn load_config(config_path: &std::path::Path) -> LoadConfigResult {
    let (data, reset_reason) = if config_path.exists() {
        match std::fs::read_to_string(config_path) {
            Ok(json) => match parse_config(&json) {
                Ok(data) => {
                    info!("Loaded config from {:?}", config_path);
                    (data, None)
                }
                Err(reason) => {
                    warn!("Failed to parse config file: {}", reason);
                    (AppConfigData::default(), Some(reason))
                }
            },
            Err(e) => {
                warn!("Failed to read config file: {}", e);
                (
                    AppConfigData::default(),
                    Some(format!("Could not read configuration file: {}", e)),
                )
            }
        }
    } else {
        info!("No config file found, using defaults");
        (AppConfigData::default(), None)
    };

    LoadConfigResult { data, reset_reason }
}

/// Save configuration to disk
fn save_config(config: &AppConfig) {
    match serde_json::to_string_pretty(&config.data) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&config.config_path, json) {
                error!("Failed to save config: {}", e);
            } else {
                info!("Config saved to {:?}", config.config_path);
            }
        }
        Err(e) => {
            error!("Failed to serialize config: {}", e);
        }
    }
}

/// Startup system to load config from disk into the existing resource
fn load_config_system(
    mut config: ResMut<AppConfig>,
    mut reset_notification: ResMut<ConfigResetNotification>,
) {
    let result = load_config(&config.config_path);
    config.data = result.data;
    config.dirty = false;

    // Set notification if config was reset due to an error
    if let Some(reason) = result.reset_reason {
        reset_notification.show = true;
        reset_notification.reason = Some(reason);
    }
}

/// Startup system to check that the page image root exists
fn check_pages_dir_exists(config: Res<AppConfig>, mut warning: ResMut<MissingPagesWarning>) {
    let path = &config.data.pages_dir;
    if !path.exists() {
        warning.show = true;
        warning.path = Some(path.clone());
        info!("Page image directory does not exist: {:?}", path);
    }
}

/// System to save config when requested
fn save_config_system(
    mut events: MessageReader<SaveConfigRequest>,
    mut config: ResMut<AppConfig>,
) {
    for _ in events.read() {
        if config.dirty {
            save_config(&config);
            config.dirty = false;
        }
    }
}

/// System to update the last opened sheet
fn update_last_sheet_system(
    mut events: MessageReader<UpdateLastSheetRequest>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        if config.data.last_sheet_id.as_deref() == Some(event.sheet_id.as_str()) {
            continue;
        }
        config.data.last_sheet_id = Some(event.sheet_id.clone());
        config.dirty = true;
        save_events.write(SaveConfigRequest);
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AppConfig>()
            .init_resource::<MissingPagesWarning>()
            .init_resource::<ConfigResetNotification>()
            .add_message::<SaveConfigRequest>()
            .add_message::<UpdateLastSheetRequest>()
            .add_systems(
                Startup,
                (load_config_system, check_pages_dir_exists)
                    .chain()
                    .in_set(ConfigLoaded),
            )
            .add_systems(
                Update,
                (
                    save_config_system.run_if(on_message::<SaveConfigRequest>),
                    update_last_sheet_system.run_if(on_message::<UpdateLastSheetRequest>),
                ),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_data_default() {
        let data = AppConfigData::default();
        assert_eq!(data.role, Role::Grader);
        assert!(data.last_sheet_id.is_none());
        assert_eq!(data.default_scale, 1.0);
        assert!(matches!(data.store, StoreConfig::File { .. }));
    }

    #[test]
    fn test_app_config_data_serialization() {
        let data = AppConfigData {
            role: Role::Student,
            grader_id: String::new(),
            student_id: "stu-42".to_string(),
            exam_id: "midterm".to_string(),
            store: StoreConfig::Http {
                base_url: "https://grading.example.edu/api".to_string(),
            },
            pages_dir: PathBuf::from("/srv/pages"),
            default_scale: 1.5,
            last_sheet_id: Some("sheet-7".to_string()),
        };

        let json = serde_json::to_string(&data).unwrap();
        let parsed: AppConfigData = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.role, Role::Student);
        assert_eq!(parsed.user_id(), "stu-42");
        assert_eq!(parsed.store, data.store);
        assert_eq!(parsed.pages_dir, data.pages_dir);
        assert_eq!(parsed.last_sheet_id, data.last_sheet_id);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let parsed = parse_config(r#"{"role":"grader","grader_id":"g1"}"#).unwrap();
        assert_eq!(parsed.user_id(), "g1");
        assert_eq!(parsed.default_scale, 1.0);
        assert_eq!(parsed.pages_dir, default_pages_dir());
    }

    #[test]
    fn test_store_config_json_shape() {
        let parsed =
            parse_config(r#"{"store":{"kind":"file","root":"/data/grading"}}"#).unwrap();
        assert_eq!(
            parsed.store,
            StoreConfig::File {
                root: PathBuf::from("/data/grading")
            }
        );
    }

    #[test]
    fn test_corrupt_config_reports_reason() {
        let err = parse_config("{ not json").unwrap_err();
        assert!(err.contains("corrupted"));
    }

    #[test]
    fn test_start_scale_is_clamped() {
        let mut data = AppConfigData {
            default_scale: 10.0,
            ..Default::default()
        };
        assert_eq!(data.start_scale(), MAX_SCALE);
        data.default_scale = f32::NAN;
        assert_eq!(data.start_scale(), 1.0);
    }

    #[test]
    fn test_load_config_from_corrupt_file_resets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "[]").unwrap();
        let result = load_config(&path);
        assert!(result.reset_reason.is_some());
        assert_eq!(result.data.role, Role::Grader);
    }

    #[test]
    fn test_missing_pages_warning_default() {
        let warning = MissingPagesWarning::default();
        assert!(!warning.show);
        assert!(warning.path.is_none());
    }
}
