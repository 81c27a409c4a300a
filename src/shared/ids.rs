use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

const COPY_SUFFIX_BYTES: usize = 4;

pub fn validate_slug(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err("report slug must be non-empty".to_string());
    }
    if value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    {
        return Ok(());
    }
    Err(format!(
        "report slug `{value}` must use only ASCII letters, digits, '-' or '_'"
    ))
}

/// Report identifier, doubling as the directory and file-name key for every artifact
/// of the report, so it is restricted to path-safe characters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ReportSlug(String);

impl ReportSlug {
    pub fn parse(raw: &str) -> Result<Self, String> {
        validate_slug(raw)?;
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<source>_copy_<8 hex>`; the suffix comes from the OS random source.
    pub fn copy_of(source: &str) -> Result<Self, String> {
        let mut bytes = [0_u8; COPY_SUFFIX_BYTES];
        getrandom::getrandom(&mut bytes)
            .map_err(|err| format!("failed to generate copy slug randomness: {err}"))?;
        let suffix = bytes
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect::<String>();
        Self::parse(&format!("{source}_copy_{suffix}"))
    }
}

impl std::fmt::Display for ReportSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::borrow::Borrow<str> for ReportSlug {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for ReportSlug {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl<'de> Deserialize<'de> for ReportSlug {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(D::Error::custom)
    }
}
