use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{Manifest, ResourceRecord};

/// Accepts three snapshot shapes: a bare array of records, an object with a `resources`
/// array, or an object keyed by record id. Entries that do not deserialize are counted and
/// dropped instead of failing the whole load. Records keep their file order in every shape.
pub fn parse_manifest(raw: &str) -> Result<Manifest> {
    let parsed: Value = serde_json::from_str(raw).context("invalid manifest JSON")?;

    match parsed {
        Value::Array(entries) => Ok(parse_entries(entries)),
        Value::Object(mut object) => {
            if let Some(resources) = object.remove("resources") {
                let Value::Array(entries) = resources else {
                    return Err(anyhow!("manifest `resources` must be an array"));
                };
                return Ok(parse_entries(entries));
            }

            Ok(parse_keyed_entries(object))
        }
        _ => Err(anyhow!(
            "unexpected manifest JSON type; expected an array or object of records"
        )),
    }
}

fn parse_entries(entries: Vec<Value>) -> Manifest {
    let mut records = Vec::with_capacity(entries.len());
    let mut malformed_entries = 0usize;

    for entry in entries {
        match ResourceRecord::deserialize(entry) {
            Ok(record) => records.push(record),
            Err(_) => malformed_entries += 1,
        }
    }

    Manifest {
        records,
        malformed_entries,
    }
}

fn parse_keyed_entries(object: Map<String, Value>) -> Manifest {
    let mut records = Vec::with_capacity(object.len());
    let mut malformed_entries = 0usize;

    for (key, value) in object {
        if key == "version" {
            continue;
        }

        match ResourceRecord::deserialize(value) {
            Ok(mut record) => {
                if record.usable_id().is_none() {
                    record.id = Some(key);
                }
                records.push(record);
            }
            Err(_) => malformed_entries += 1,
        }
    }

    Manifest {
        records,
        malformed_entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_array() {
        let manifest = parse_manifest(
            r#"[
                {"id":"a","title":"A","domain":"Web","tags":["react"]},
                {"id":"b","domain":"Cloud"}
            ]"#,
        )
        .unwrap();

        assert_eq!(manifest.records.len(), 2);
        assert_eq!(manifest.records[0].tags, vec!["react".to_owned()]);
        assert_eq!(manifest.malformed_entries, 0);
    }

    #[test]
    fn counts_entries_that_are_not_records() {
        let manifest =
            parse_manifest(r#"[{"id":"a"}, 42, "text", {"id":"b","tags":"not-a-list"}]"#).unwrap();

        assert_eq!(manifest.records.len(), 1);
        assert_eq!(manifest.malformed_entries, 3);
    }

    #[test]
    fn parses_resources_wrapper() {
        let manifest = parse_manifest(r#"{"resources":[{"id":"a"}]}"#).unwrap();
        assert_eq!(manifest.records.len(), 1);

        assert!(parse_manifest(r#"{"resources":{"id":"a"}}"#).is_err());
    }

    #[test]
    fn keyed_object_fills_missing_ids_from_keys() {
        let manifest =
            parse_manifest(r#"{"version":2,"DOC-1":{"title":"One"},"DOC-2":{"id":"own"}}"#).unwrap();
        let mut ids = manifest
            .records
            .iter()
            .filter_map(|record| record.id.as_deref())
            .collect::<Vec<_>>();
        ids.sort_unstable();

        assert_eq!(ids, vec!["DOC-1", "own"]);
    }

    #[test]
    fn keyed_object_keeps_file_order() {
        let manifest = parse_manifest(
            r#"{"zeta":{"domain":"Web"},"alpha":{"domain":"Cloud"},"mid":{"domain":"Data"}}"#,
        )
        .unwrap();
        let ids = manifest
            .records
            .iter()
            .filter_map(|record| record.id.as_deref())
            .collect::<Vec<_>>();

        assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn rejects_scalars_and_bad_json() {
        assert!(parse_manifest("3").is_err());
        assert!(parse_manifest("{not json").is_err());
    }

    #[test]
    fn empty_array_is_valid() {
        let manifest = parse_manifest("[]").unwrap();
        assert!(manifest.records.is_empty());
    }
}
