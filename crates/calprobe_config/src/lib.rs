use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod models;
pub use models::*;

/// Prefix for environment overrides, e.g. `CALPROBE__GCAL__KEY_PATH`.
pub const ENV_PREFIX: &str = "CALPROBE";

/// Standard variable pointing at a service-account key file.
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the `.env` file into the process environment, once.
///
/// `DOTENV_OVERRIDE` selects a different file. Returns the path that was used.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

/// Directory holding `default.toml` and the per-environment overlays.
///
/// `CALPROBE_CONFIG_DIR` wins; otherwise `config/` at the workspace root.
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = env::var("CALPROBE_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .nth(2) // crates/calprobe_config -> workspace root
        .unwrap_or(manifest_dir)
        .join("config")
}

/// Loads the configuration from [`config_dir`], the `RUN_ENV` overlay and
/// `CALPROBE__*` environment variables.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();
    load_config_from(&config_dir())
}

/// Loads the configuration layered from `dir/default`, `dir/{RUN_ENV}` and
/// the environment. Missing files are skipped.
pub fn load_config_from(dir: &Path) -> Result<AppConfig, ConfigError> {
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());

    let default_path = dir.join("default");
    let env_path = dir.join(&run_env);
    debug!(
        "Loading config from {} and {}",
        default_path.display(),
        env_path.display()
    );

    let config = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    config.try_deserialize()
}

impl GcalConfig {
    /// The configured key path, or the one named by `GOOGLE_APPLICATION_CREDENTIALS`.
    pub fn resolved_key_path(&self) -> Option<String> {
        self.key_path
            .clone()
            .or_else(|| env::var(CREDENTIALS_ENV).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_when_no_files_exist() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(dir.path()).expect("empty dir should load");

        assert!(config.gcal.is_none());
        assert_eq!(config.fixture.summary, "테스트 이벤트");
        assert_eq!(config.fixture.description, "이벤트 설명");
        assert_eq!(config.fixture.location, "A회의실");
        assert_eq!(config.fixture.start_offset_hours, 24);
        assert_eq!(config.fixture.duration_minutes, 60);
        assert_eq!(config.fixture.default_time_zone, "UTC");
    }

    #[test]
    fn test_default_toml_is_read() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            r#"
[gcal]
key_path = "/secrets/service_account.json"

[fixture]
location = "C회의실"
"#,
        )
        .unwrap();

        let config = load_config_from(dir.path()).unwrap();
        let gcal = config.gcal.expect("gcal section should be present");

        assert_eq!(gcal.key_path.as_deref(), Some("/secrets/service_account.json"));
        assert_eq!(gcal.calendar_id, "primary");
        assert_eq!(gcal.scopes, vec![CALENDAR_SCOPE.to_string()]);
        assert!(gcal.subject.is_none());
        assert_eq!(config.fixture.location, "C회의실");
        assert_eq!(config.fixture.summary, "테스트 이벤트");
    }

    #[test]
    fn test_configured_key_path_wins() {
        let gcal = GcalConfig {
            key_path: Some("from-config.json".to_string()),
            ..Default::default()
        };
        assert_eq!(gcal.resolved_key_path().as_deref(), Some("from-config.json"));
    }

    #[test]
    fn test_config_dir_points_at_workspace_config() {
        if env::var("CALPROBE_CONFIG_DIR").is_ok() {
            return;
        }
        let dir = config_dir();
        assert!(dir.ends_with("config"));
        assert!(dir.parent().unwrap().join("crates").is_dir());
    }
}
