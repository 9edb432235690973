//! Top-level duesync configuration.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::{Deserialize, Serialize};

use crate::config::NotionConfig;
use crate::error::{DueSyncError, DueSyncResult};

const ENV_PREFIX: &str = "DUESYNC";

fn default_timezone() -> String {
    "UTC".to_string()
}

/// `DUESYNC_FEEDS=a,b`, `DUESYNC_NOTION__TOKEN=...`: a single `_` after the
/// prefix, `__` between nested keys.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("feeds")
        .try_parsing(true)
}

/// Everything a sync run needs besides the clock.
///
/// Sources, lowest precedence first:
/// 1. `~/.config/duesync/config.toml`
/// 2. the file passed with `--config`
/// 3. `DUESYNC_*` environment variables (`DUESYNC_NOTION__TOKEN`,
///    `DUESYNC_FEEDS=url1,url2`, ...), including those from a `.env` file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// ICS subscription URLs (`https://` or `webcal://`)
    pub feeds: Vec<String>,

    /// IANA timezone used for all-day and floating feed times
    #[serde(default = "default_timezone")]
    pub timezone: String,

    pub notion: NotionConfig,

    /// Tracked subject codes mapped to their subcategory page id
    #[serde(default)]
    pub subjects: BTreeMap<String, String>,
}

impl SyncConfig {
    pub fn config_path() -> DueSyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| DueSyncError::Config("Could not determine config directory".into()))?
            .join("duesync");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default config file, an optional explicit file and the
    /// environment.
    pub fn load(explicit: Option<&Path>) -> DueSyncResult<Self> {
        dotenvy::dotenv().ok();

        let mut builder = Config::builder()
            .add_source(File::from(Self::config_path()?).required(false));

        if let Some(path) = explicit {
            let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
            builder = builder.add_source(File::from(PathBuf::from(expanded)).required(true));
        }

        Self::build(builder.add_source(environment()))
    }

    /// Load from a single TOML file, ignoring the environment.
    pub fn from_file(path: &Path) -> DueSyncResult<Self> {
        Self::build(Config::builder().add_source(File::from(path.to_path_buf()).required(true)))
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> DueSyncResult<Self> {
        let config: SyncConfig = builder
            .build()
            .map_err(|e| DueSyncError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| DueSyncError::Config(e.to_string()))?;

        config.validated()
    }

    /// Check required values and canonicalize subject codes.
    ///
    /// Subject codes are upper-cased because the config loader lower-cases
    /// map keys.
    fn validated(mut self) -> DueSyncResult<Self> {
        self.feeds.retain(|url| !url.trim().is_empty());
        if self.feeds.is_empty() {
            return Err(DueSyncError::Config("At least one feed URL is required".into()));
        }
        if self.notion.token.trim().is_empty() {
            return Err(DueSyncError::Config("notion.token is required".into()));
        }
        if self.notion.database_id.trim().is_empty() {
            return Err(DueSyncError::Config("notion.database_id is required".into()));
        }
        self.tz()?;

        self.subjects = self
            .subjects
            .into_iter()
            .map(|(code, page)| (code.to_uppercase(), page))
            .collect();

        if self.subjects.is_empty() {
            tracing::warn!("no subjects configured; every event will be excluded");
        }

        Ok(self)
    }

    pub fn tz(&self) -> DueSyncResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| DueSyncError::Config(format!("Unknown timezone '{}'", self.timezone)))
    }

    /// Subject codes whose events get mirrored.
    pub fn accepted_subjects(&self) -> BTreeSet<String> {
        self.subjects.keys().cloned().collect()
    }

    /// Create a config file with all options commented out.
    pub fn create_default_config(path: &Path) -> DueSyncResult<()> {
        let contents = "\
# duesync configuration

# Calendar subscriptions to mirror (https:// or webcal://):
# feeds = [\"webcal://lms.example.edu/calendar/export.ics\"]

# Timezone for all-day and floating event times:
# timezone = \"Pacific/Auckland\"

# [notion]
# token = \"secret_...\"
# database_id = \"...\"
# category_id = \"...\"

# [notion.properties]
# title = \"Name\"
# due = \"End Date\"
# join_key = \"ics_uid\"
# category = \"Category\"
# subcategory = \"Subcategory\"

# Tracked subjects and their subcategory page ids:
# [subjects]
# COSC262 = \"...\"
";

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DueSyncError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn test_from_file_reads_all_sections() {
        let file = write_config(
            r#"
feeds = ["webcal://lms.example/a.ics", "https://lms.example/b.ics"]
timezone = "Pacific/Auckland"

[notion]
token = "secret_abc"
database_id = "db-1"
category_id = "cat-1"

[notion.properties]
due = "Due"

[subjects]
COSC262 = "page-262"
seng201 = "page-201"
"#,
        );

        let config = SyncConfig::from_file(file.path()).expect("Should load");

        assert_eq!(config.feeds.len(), 2);
        assert_eq!(config.tz().unwrap(), chrono_tz::Pacific::Auckland);
        assert_eq!(config.notion.database_id, "db-1");
        assert_eq!(config.notion.category_id.as_deref(), Some("cat-1"));
        assert_eq!(config.notion.properties.due, "Due");
        assert_eq!(config.notion.properties.title, "Name");
        assert_eq!(
            config.accepted_subjects(),
            BTreeSet::from(["COSC262".to_string(), "SENG201".to_string()])
        );
        assert_eq!(config.subjects.get("SENG201").map(String::as_str), Some("page-201"));
    }

    fn env_vars(vars: &[(&str, &str)]) -> config::Map<String, String> {
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_environment_reads_single_underscore_prefix() {
        let vars = env_vars(&[
            ("DUESYNC_FEEDS", "https://a.example/x.ics,webcal://b.example/y.ics"),
            ("DUESYNC_TIMEZONE", "Pacific/Auckland"),
            ("DUESYNC_NOTION__TOKEN", "secret_env"),
            ("DUESYNC_NOTION__DATABASE_ID", "db-env"),
            ("DUESYNC_SUBJECTS__COSC262", "page-262"),
            ("OTHER_FEEDS", "https://ignored.example/z.ics"),
        ]);

        let config = SyncConfig::build(
            Config::builder().add_source(environment().source(Some(vars))),
        )
        .expect("Should load from environment");

        assert_eq!(
            config.feeds,
            vec!["https://a.example/x.ics", "webcal://b.example/y.ics"]
        );
        assert_eq!(config.tz().unwrap(), chrono_tz::Pacific::Auckland);
        assert_eq!(config.notion.token, "secret_env");
        assert_eq!(config.notion.database_id, "db-env");
        assert_eq!(config.accepted_subjects(), BTreeSet::from(["COSC262".to_string()]));
    }

    #[test]
    fn test_environment_overrides_file_values() {
        let file = write_config(
            r#"
feeds = ["https://lms.example/a.ics"]

[notion]
token = "secret_file"
database_id = "db-1"
"#,
        );
        let vars = env_vars(&[("DUESYNC_NOTION__TOKEN", "secret_env")]);

        let config = SyncConfig::build(
            Config::builder()
                .add_source(File::from(file.path().to_path_buf()))
                .add_source(environment().source(Some(vars))),
        )
        .expect("Should load");

        assert_eq!(config.notion.token, "secret_env");
        assert_eq!(config.feeds, vec!["https://lms.example/a.ics"]);
    }

    #[test]
    fn test_from_file_defaults_timezone_and_properties() {
        let file = write_config(
            r#"
feeds = ["https://lms.example/a.ics"]

[notion]
token = "secret_abc"
database_id = "db-1"
"#,
        );

        let config = SyncConfig::from_file(file.path()).expect("Should load");
        assert_eq!(config.tz().unwrap(), Tz::UTC);
        assert_eq!(config.notion.properties, crate::config::PropertyNames::default());
        assert!(config.notion.category_id.is_none());
        assert!(config.accepted_subjects().is_empty());
    }

    #[test]
    fn test_from_file_requires_feeds() {
        let file = write_config(
            r#"
feeds = []

[notion]
token = "secret_abc"
database_id = "db-1"
"#,
        );

        let err = SyncConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("feed"), "unexpected error: {err}");
    }

    #[test]
    fn test_from_file_rejects_unknown_timezone() {
        let file = write_config(
            r#"
feeds = ["https://lms.example/a.ics"]
timezone = "Mars/Olympus_Mons"

[notion]
token = "secret_abc"
database_id = "db-1"
"#,
        );

        let err = SyncConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus_Mons"), "unexpected error: {err}");
    }

    #[test]
    fn test_debug_output_redacts_token() {
        let file = write_config(
            r#"
feeds = ["https://lms.example/a.ics"]

[notion]
token = "secret_abc"
database_id = "db-1"
"#,
        );

        let config = SyncConfig::from_file(file.path()).expect("Should load");
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret_abc"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_create_default_config_writes_commented_template() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested/config.toml");

        SyncConfig::create_default_config(&path).expect("Should write");

        let contents = std::fs::read_to_string(&path).expect("Should read");
        assert!(contents.starts_with("# duesync configuration"));
        assert!(contents.lines().all(|l| l.is_empty() || l.starts_with('#')));
    }
}
