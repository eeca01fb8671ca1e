mod parse;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use crate::graph::UNKNOWN_DOMAIN;

pub use parse::parse_manifest;

/// One document of the library. Every field is optional on the wire; the builder decides
/// what to do with incomplete records.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ResourceRecord {
    pub fn usable_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }

    pub fn domain_or_unknown(&self) -> &str {
        self.domain
            .as_deref()
            .filter(|domain| !domain.trim().is_empty())
            .unwrap_or(UNKNOWN_DOMAIN)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone, Debug)]
pub struct Manifest {
    pub records: Vec<ResourceRecord>,
    /// Entries that were not record-shaped JSON and were dropped while parsing.
    pub malformed_entries: usize,
}

pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    let manifest = parse_manifest(&raw)
        .with_context(|| format!("failed to parse manifest {}", path.display()))?;

    if manifest.malformed_entries > 0 {
        warn!(
            malformed = manifest.malformed_entries,
            path = %path.display(),
            "dropped malformed manifest entries"
        );
    }
    info!(
        records = manifest.records.len(),
        path = %path.display(),
        "loaded manifest"
    );

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_ids_are_not_usable() {
        let record = ResourceRecord {
            id: Some("   ".to_owned()),
            ..ResourceRecord::default()
        };
        assert_eq!(record.usable_id(), None);
    }

    #[test]
    fn blank_domain_maps_to_unknown() {
        let record = ResourceRecord {
            domain: Some(String::new()),
            ..ResourceRecord::default()
        };
        assert_eq!(record.domain_or_unknown(), UNKNOWN_DOMAIN);
    }

    #[test]
    fn null_tags_deserialize_as_empty() {
        let record: ResourceRecord =
            serde_json::from_str(r#"{"id":"a","tags":null,"type":"guide"}"#).unwrap();
        assert!(record.tags.is_empty());
        assert_eq!(record.kind.as_deref(), Some("guide"));
    }

    #[test]
    fn load_reports_missing_file_path() {
        let error = load_manifest(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(format!("{error:#}").contains("/definitely/not/here.json"));
    }
}
