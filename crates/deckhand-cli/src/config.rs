//! Optional `deckhand.toml` and the layering of flags, environment and file
//! values into [`ConvertOptions`].

use deckhand_convert::{CollisionPolicy, ConvertOptions, ValidationPolicy};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "deckhand.toml";

/// Values a config file may provide. Flags and environment variables win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub files: Vec<PathBuf>,
    pub distro: Option<String>,
    pub output_dir: Option<String>,
    #[serde(default)]
    pub strict_validation: bool,
    #[serde(default)]
    pub reject_collisions: bool,
}

impl FileConfig {
    /// Read `explicit`, or `deckhand.toml` in the working directory when it
    /// exists. An explicit path that cannot be read is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, String> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let contents = fs::read_to_string(&path)
            .map_err(|e| format!("failed to read config {}: {e}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| format!("invalid config {}: {e}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }
}

/// What the command line (flags or their environment variables) provided.
#[derive(Debug, Clone, Default)]
pub struct ConvertArgs {
    pub files: Vec<PathBuf>,
    pub distro: Option<String>,
    pub output_dir: Option<String>,
    pub strict_validation: bool,
    pub reject_collisions: bool,
}

/// Command line over config file over defaults.
pub fn resolve_options(args: ConvertArgs, file: FileConfig) -> ConvertOptions {
    let defaults = ConvertOptions::default();
    let files = if args.files.is_empty() {
        file.files
    } else {
        args.files
    };
    let validation = if args.strict_validation || file.strict_validation {
        ValidationPolicy::Strict
    } else {
        ValidationPolicy::Report
    };
    let collisions = if args.reject_collisions || file.reject_collisions {
        CollisionPolicy::Reject
    } else {
        CollisionPolicy::Overwrite
    };
    ConvertOptions {
        files,
        distro: args.distro.or(file.distro).unwrap_or(defaults.distro),
        output_dir: args
            .output_dir
            .or(file.output_dir)
            .unwrap_or(defaults.output_dir),
        validation,
        collisions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(label: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "deckhand-cli-config-{label}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        path
    }

    #[test]
    fn parses_kebab_case_file() {
        let config: FileConfig = toml::from_str(
            r#"
files = ["app.yaml"]
distro = "openshift"
output-dir = "out"
strict-validation = true
"#,
        )
        .unwrap();
        assert_eq!(config.files, vec![PathBuf::from("app.yaml")]);
        assert_eq!(config.distro.as_deref(), Some("openshift"));
        assert_eq!(config.output_dir.as_deref(), Some("out"));
        assert!(config.strict_validation);
        assert!(!config.reject_collisions);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<FileConfig>("distribution = \"openshift\"").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = temp_dir("missing");
        let err = FileConfig::load(Some(&dir.join("nope.toml"))).unwrap_err();
        assert!(err.contains("failed to read config"), "{err}");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn explicit_file_is_loaded() {
        let dir = temp_dir("explicit");
        let path = dir.join("custom.toml");
        fs::write(&path, "distro = \"openshift\"\n").unwrap();
        let config = FileConfig::load(Some(&path)).unwrap();
        assert_eq!(config.distro.as_deref(), Some("openshift"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn command_line_wins_over_file() {
        let options = resolve_options(
            ConvertArgs {
                files: vec![PathBuf::from("cli.yaml")],
                distro: Some("kubernetes".into()),
                ..ConvertArgs::default()
            },
            FileConfig {
                files: vec![PathBuf::from("file.yaml")],
                distro: Some("openshift".into()),
                output_dir: Some("out".into()),
                ..FileConfig::default()
            },
        );
        assert_eq!(options.files, vec![PathBuf::from("cli.yaml")]);
        assert_eq!(options.distro, "kubernetes");
        assert_eq!(options.output_dir, "out");
    }

    #[test]
    fn defaults_fill_the_rest() {
        let options = resolve_options(ConvertArgs::default(), FileConfig::default());
        assert!(options.files.is_empty());
        assert_eq!(options.distro, "kubernetes");
        assert_eq!(options.output_dir, "-");
        assert_eq!(options.validation, ValidationPolicy::Report);
        assert_eq!(options.collisions, CollisionPolicy::Overwrite);
    }
}
