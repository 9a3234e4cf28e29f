use serde::Deserialize;

/// What to do when a mapping repeats a key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateKeyPolicy {
    /// Reject the document.
    #[default]
    Error,
    /// Keep the first position and the last value.
    LastWins,
}

/// Options for reading a document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ReadOptions {
    /// Maximum number of alias expansions that refer to a list or tree.
    pub max_non_scalar_aliases: usize,
    pub duplicate_keys: DuplicateKeyPolicy,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            max_non_scalar_aliases: 50,
            duplicate_keys: DuplicateKeyPolicy::Error,
        }
    }
}

/// Options for writing a document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct WriteOptions {
    /// Spaces per nesting level for block mappings.
    pub indent: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_kebab_case_with_defaults() {
        let options: ReadOptions =
            serde_json::from_str(r#"{"duplicate-keys": "last-wins"}"#).expect("valid options");
        assert_eq!(options.duplicate_keys, DuplicateKeyPolicy::LastWins);
        assert_eq!(options.max_non_scalar_aliases, 50);
    }

    #[test]
    fn rejects_unknown_fields() {
        let result = serde_json::from_str::<WriteOptions>(r#"{"indnet": 4}"#);
        assert!(result.is_err());
    }
}
