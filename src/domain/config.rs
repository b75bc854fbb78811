use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for a question sheet.
///
/// Controls the placeholder titles given to new items, the marker appended to
/// duplicated items, and where the sheet data lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Title given to newly added topics.
    pub new_topic_title: String,

    /// Title given to newly added subtopics.
    pub new_subtopic_title: String,

    /// Title given to newly added questions.
    pub new_question_title: String,

    /// Appended to the title of a duplicated topic or subtopic.
    ///
    /// For example, duplicating 'Arrays' with the default suffix yields
    /// 'Arrays (Copy)'.
    pub copy_suffix: String,

    /// File name of the sheet data, relative to the sheet root.
    data_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            new_topic_title: default_topic_title(),
            new_subtopic_title: default_subtopic_title(),
            new_question_title: default_question_title(),
            copy_suffix: default_copy_suffix(),
            data_file: default_data_file(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the file name of the sheet data.
    #[must_use]
    pub fn data_file(&self) -> &str {
        &self.data_file
    }

    /// Sets the file name of the sheet data.
    ///
    /// Empty names are ignored. Returns `true` if the name was changed.
    pub fn set_data_file(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if name.trim().is_empty() || name == self.data_file {
            false
        } else {
            self.data_file = name;
            true
        }
    }
}

fn default_topic_title() -> String {
    "New Topic".to_string()
}

fn default_subtopic_title() -> String {
    "New Sub-Topic".to_string()
}

fn default_question_title() -> String {
    "New Question".to_string()
}

fn default_copy_suffix() -> String {
    " (Copy)".to_string()
}

fn default_data_file() -> String {
    "sheet.json".to_string()
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_topic_title")]
        new_topic_title: String,

        #[serde(default = "default_subtopic_title")]
        new_subtopic_title: String,

        #[serde(default = "default_question_title")]
        new_question_title: String,

        /// Kept verbatim, so leading whitespace is significant.
        #[serde(default = "default_copy_suffix")]
        copy_suffix: String,

        #[serde(default = "default_data_file")]
        data_file: String,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                new_topic_title,
                new_subtopic_title,
                new_question_title,
                copy_suffix,
                data_file,
            } => Self {
                new_topic_title,
                new_subtopic_title,
                new_question_title,
                copy_suffix,
                data_file,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            new_topic_title: config.new_topic_title,
            new_subtopic_title: config.new_subtopic_title,
            new_question_title: config.new_question_title,
            copy_suffix: config.copy_suffix,
            data_file: config.data_file,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"_version = "1"
new_topic_title = "Untitled"
copy_suffix = " copy"
data_file = "questions.json"
"#,
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.new_topic_title, "Untitled");
        assert_eq!(config.new_subtopic_title, "New Sub-Topic");
        assert_eq!(config.copy_suffix, " copy");
        assert_eq!(config.data_file(), "questions.json");
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nnew_topic_title = 3\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn version_tag_alone_yields_defaults() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");

        let mut config = Config::default();
        config.copy_suffix = " [dup]".to_string();
        assert!(config.set_data_file("other.json"));
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn blank_data_file_is_ignored() {
        let mut config = Config::default();
        assert!(!config.set_data_file("  "));
        assert_eq!(config.data_file(), "sheet.json");
    }
}
