use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Tooling tree scanned when no root is given.
pub const DEFAULT_ROOT: &str = "test_ex2_obc_software";
/// Test-naming prefix stripped from a wrapper's path to name the file under test.
pub const DEFAULT_PREFIX_TOKEN: &str = "test_";
/// Substring that marks a visited file as a C source worth resolving.
pub const DEFAULT_MARKER: &str = ".c";
/// Levels between the tooling directory and the source tree it mirrors.
pub const DEFAULT_ASCENT: usize = 2;

const CONFIG_FILE_NAME: &str = "sut_deps.yaml";

pub fn get_config_file_path(working_dir: &Path) -> PathBuf {
    working_dir.join(CONFIG_FILE_NAME)
}

/// How many occurrences of the prefix token are removed from a visited path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrefixRemoval {
    #[default]
    All,
    First,
}

impl PrefixRemoval {
    /// Removes `token` from the raw bytes of a path. Working on bytes keeps
    /// file names that are not valid UTF-8 intact.
    pub fn apply(self, path: &[u8], token: &[u8]) -> Vec<u8> {
        if token.is_empty() {
            return path.to_vec();
        }
        let limit = match self {
            PrefixRemoval::All => usize::MAX,
            PrefixRemoval::First => 1,
        };

        let mut stripped = Vec::with_capacity(path.len());
        let mut rest = path;
        let mut removed = 0;
        while removed < limit {
            let Some(at) = rest.windows(token.len()).position(|window| window == token) else {
                break;
            };
            stripped.extend_from_slice(&rest[..at]);
            rest = &rest[at + token.len()..];
            removed += 1;
        }
        stripped.extend_from_slice(rest);
        stripped
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    pub root: PathBuf,
    pub prefix_token: String,
    pub marker: String,
    pub ascent: usize,
    pub prefix_removal: PrefixRemoval,
    pub sort_entries: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            prefix_token: DEFAULT_PREFIX_TOKEN.to_string(),
            marker: DEFAULT_MARKER.to_string(),
            ascent: DEFAULT_ASCENT,
            prefix_removal: PrefixRemoval::default(),
            sort_entries: false,
        }
    }
}

/// Values read from a config file. Unset fields leave the defaults alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub root: Option<PathBuf>,
    pub prefix_token: Option<String>,
    pub marker: Option<String>,
    pub ascent: Option<usize>,
    pub prefix_removal: Option<PrefixRemoval>,
    pub sort_entries: Option<bool>,
}

impl ResolverConfig {
    /// Builds the config from the defaults and the YAML file, if any.
    ///
    /// With `explicit_path` unset the file in `working_dir` is optional. A path
    /// given explicitly must exist.
    pub fn load(working_dir: &Path, explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let overrides = match explicit_path {
            Some(path) => ConfigOverrides::from_path(&working_dir.join(path))?,
            None => {
                let path = get_config_file_path(working_dir);
                if path.is_file() {
                    ConfigOverrides::from_path(&path)?
                } else {
                    debug!("No config file at {}, using defaults", path.display());
                    ConfigOverrides::default()
                }
            }
        };

        let mut config = Self::default();
        config.apply(overrides);
        Ok(config)
    }

    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(root) = overrides.root {
            self.root = root;
        }
        if let Some(prefix_token) = overrides.prefix_token {
            self.prefix_token = prefix_token;
        }
        if let Some(marker) = overrides.marker {
            self.marker = marker;
        }
        if let Some(ascent) = overrides.ascent {
            self.ascent = ascent;
        }
        if let Some(prefix_removal) = overrides.prefix_removal {
            self.prefix_removal = prefix_removal;
        }
        if let Some(sort_entries) = overrides.sort_entries {
            self.sort_entries = sort_entries;
        }
    }
}

impl ConfigOverrides {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        debug!("Reading config file: {}", path.display());
        let contents = std::fs::read_to_string(path).context(ReadSnafu {
            file_path: path.display().to_string(),
        })?;
        debug!("Successfully read config file: {} bytes", contents.len());
        contents.as_str().try_into()
    }

    fn parse_from_yaml(top_level: &LinkedHashMap<Yaml, Yaml>) -> Result<Self, ConfigError> {
        let mut overrides = Self::default();

        for (key, value) in top_level {
            let Yaml::Value(Scalar::String(key)) = key else {
                debug!("Skipping non-string config key: {:?}", key);
                continue;
            };
            let key: &str = key;

            match key {
                "root" => overrides.root = Some(PathBuf::from(expect_string(key, value)?)),
                "prefix" => overrides.prefix_token = Some(expect_string(key, value)?),
                "marker" => {
                    let marker = expect_string(key, value)?;
                    ensure!(
                        !marker.is_empty(),
                        InvalidValueSnafu {
                            key: key.to_string(),
                            expected: "a non-empty string",
                        }
                    );
                    overrides.marker = Some(marker);
                }
                "ascent" => {
                    let Yaml::Value(Scalar::Integer(ascent)) = value else {
                        return InvalidValueSnafu {
                            key: key.to_string(),
                            expected: "a non-negative integer",
                        }
                        .fail();
                    };
                    let ascent = usize::try_from(*ascent).ok().context(InvalidValueSnafu {
                        key: key.to_string(),
                        expected: "a non-negative integer",
                    })?;
                    overrides.ascent = Some(ascent);
                }
                "prefix_removal" => {
                    let removal = match expect_string(key, value)?.as_str() {
                        "all" => PrefixRemoval::All,
                        "first" => PrefixRemoval::First,
                        _ => {
                            return InvalidValueSnafu {
                                key: key.to_string(),
                                expected: "'all' or 'first'",
                            }
                            .fail();
                        }
                    };
                    overrides.prefix_removal = Some(removal);
                }
                "sorted" => {
                    let Yaml::Value(Scalar::Boolean(sorted)) = value else {
                        return InvalidValueSnafu {
                            key: key.to_string(),
                            expected: "a boolean",
                        }
                        .fail();
                    };
                    overrides.sort_entries = Some(*sorted);
                }
                other => debug!("Ignoring unknown config key '{}'", other),
            }
        }

        Ok(overrides)
    }
}

fn expect_string(key: &str, value: &Yaml) -> Result<String, ConfigError> {
    value.as_str().map(str::to_string).context(InvalidValueSnafu {
        key: key.to_string(),
        expected: "a string",
    })
}

impl TryFrom<&str> for ConfigOverrides {
    type Error = ConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents =
            Yaml::load_from_str(contents).map_err(|e| ConfigError::ParseError { source: e })?;
        let document = documents.first().ok_or(ConfigError::MalformedConfig)?;

        let top_level = document.as_mapping().ok_or(ConfigError::TopLevelNotMap)?;

        Self::parse_from_yaml(top_level)
    }
}

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted config file"))]
    MalformedConfig,
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Config key '{}' should be {}", key, expected))]
    InvalidValue { key: String, expected: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_the_obc_test_layout() {
        let config = ResolverConfig::default();
        assert_eq!(config.root, PathBuf::from("test_ex2_obc_software"));
        assert_eq!(config.prefix_token, "test_");
        assert_eq!(config.marker, ".c");
        assert_eq!(config.ascent, 2);
        assert_eq!(config.prefix_removal, PrefixRemoval::All);
        assert!(!config.sort_entries);
    }

    #[test]
    fn prefix_removal_all_strips_every_occurrence() {
        let stripped = PrefixRemoval::All.apply(b"test_obc/drivers/test_uart.c", b"test_");
        assert_eq!(stripped, b"obc/drivers/uart.c");
    }

    #[test]
    fn prefix_removal_first_strips_one_occurrence() {
        let stripped = PrefixRemoval::First.apply(b"test_obc/drivers/test_uart.c", b"test_");
        assert_eq!(stripped, b"obc/drivers/test_uart.c");
    }

    #[test]
    fn empty_prefix_token_leaves_path_alone() {
        assert_eq!(PrefixRemoval::All.apply(b"a/b.c", b""), b"a/b.c");
    }

    #[test]
    fn prefix_removal_keeps_invalid_utf8_bytes() {
        let stripped = PrefixRemoval::All.apply(b"test_dir/test_\xffname.c", b"test_");
        assert_eq!(stripped, b"dir/\xffname.c");
    }

    #[test]
    fn prefix_removal_handles_adjacent_tokens() {
        assert_eq!(PrefixRemoval::All.apply(b"test_test_x.c", b"test_"), b"x.c");
        assert_eq!(PrefixRemoval::First.apply(b"test_test_x.c", b"test_"), b"test_x.c");
    }

    #[test]
    fn config_returns_error_on_nonexistent_explicit_file() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let result = ResolverConfig::load(dir.path(), Some(Path::new("missing.yaml")));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn config_uses_defaults_without_a_file() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = ResolverConfig::load(dir.path(), None).expect("Defaults should load");
        assert_eq!(config, ResolverConfig::default());
    }

    #[test]
    fn config_reads_default_file_from_working_dir() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(
            dir.path().join("sut_deps.yaml"),
            "root: test_other\nascent: 1\nsorted: true\n",
        )
        .expect("Failed to write config");

        let config = ResolverConfig::load(dir.path(), None).expect("Config should load");
        assert_eq!(config.root, PathBuf::from("test_other"));
        assert_eq!(config.ascent, 1);
        assert!(config.sort_entries);
        assert_eq!(config.marker, ".c");
    }

    #[test]
    fn config_returns_error_on_invalid_yaml() {
        let result: Result<ConfigOverrides, _> = "invalid: yaml: content: [unclosed".try_into();
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn config_returns_error_on_empty_file() {
        let result: Result<ConfigOverrides, _> = "".try_into();
        assert!(matches!(result, Err(ConfigError::MalformedConfig)));
    }

    #[test]
    fn config_returns_error_when_top_level_is_not_map() {
        let result: Result<ConfigOverrides, _> = "- item1\n- item2".try_into();
        assert!(matches!(result, Err(ConfigError::TopLevelNotMap)));
    }

    #[test]
    fn config_rejects_negative_ascent() {
        let result: Result<ConfigOverrides, _> = "ascent: -1".try_into();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "ascent"
        ));
    }

    #[test]
    fn config_rejects_unknown_prefix_removal() {
        let result: Result<ConfigOverrides, _> = "prefix_removal: sometimes".try_into();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "prefix_removal"
        ));
    }

    #[test]
    fn config_rejects_empty_marker() {
        let result: Result<ConfigOverrides, _> = "marker: ''".try_into();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn config_ignores_unknown_keys() {
        let result: Result<ConfigOverrides, _> = "unrelated: value\nprefix: spec_".try_into();
        let overrides = result.expect("Unknown keys should be ignored");
        assert_eq!(overrides.prefix_token.as_deref(), Some("spec_"));
        assert_eq!(overrides.root, None);
    }

    #[test]
    fn config_parses_every_recognized_key() {
        let yaml = r#"
root: "tools/test_tree"
prefix: "t_"
marker: ".h"
ascent: 3
prefix_removal: first
sorted: false
"#;
        let overrides: ConfigOverrides = yaml.try_into().expect("Config should parse");
        assert_eq!(
            overrides,
            ConfigOverrides {
                root: Some(PathBuf::from("tools/test_tree")),
                prefix_token: Some("t_".to_string()),
                marker: Some(".h".to_string()),
                ascent: Some(3),
                prefix_removal: Some(PrefixRemoval::First),
                sort_entries: Some(false),
            }
        );
    }
}
