//! Merge a local override catalog onto the project catalog.
//!
//! # Merge Rules
//!
//! - Mappings are merged recursively
//! - Lists of named items (`packages`, `backends`, `setup`) are merged by
//!   `name`: an overlay item replaces the base item with the same name,
//!   new names are appended
//! - Other lists are replaced entirely
//! - Null values in the overlay delete the key from the base
//! - Scalars in the overlay replace scalars in the base

use serde_yaml::Value;

/// Deep merge `overlay` onto `base`.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            let mut result = base_map.clone();

            for (key, overlay_value) in overlay_map {
                if overlay_value.is_null() {
                    result.remove(key);
                } else if let Some(base_value) = base_map.get(key) {
                    result.insert(key.clone(), deep_merge(base_value, overlay_value));
                } else {
                    result.insert(key.clone(), overlay_value.clone());
                }
            }

            Value::Mapping(result)
        }

        (Value::Sequence(base_seq), Value::Sequence(overlay_seq))
            if is_named_list(base_seq) && is_named_list(overlay_seq) =>
        {
            let mut result = base_seq.clone();
            for item in overlay_seq {
                match result.iter_mut().find(|b| item_name(b) == item_name(item)) {
                    Some(existing) => *existing = deep_merge(existing, item),
                    None => result.push(item.clone()),
                }
            }
            Value::Sequence(result)
        }

        (_, overlay) => overlay.clone(),
    }
}

fn item_name(item: &Value) -> Option<&str> {
    item.get("name").and_then(Value::as_str)
}

fn is_named_list(seq: &[Value]) -> bool {
    !seq.is_empty() && seq.iter().all(|item| item_name(item).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn settings_fields_override() {
        let base = yaml("settings:\n  retries: 1\n  retry_delay_ms: 100\n");
        let overlay = yaml("settings:\n  retries: 3\n");
        let merged = deep_merge(&base, &overlay);
        assert_eq!(merged["settings"]["retries"], yaml("3"));
        assert_eq!(merged["settings"]["retry_delay_ms"], yaml("100"));
    }

    #[test]
    fn packages_replaced_by_name() {
        let base = yaml(
            r#"
packages:
  - name: git
    min_version: "2.30"
  - name: jq
    min_version: "1.6"
"#,
        );
        let overlay = yaml(
            r#"
packages:
  - name: jq
    min_version: "1.7"
  - name: node
    min_version: "20"
"#,
        );
        let merged = deep_merge(&base, &overlay);
        let packages = merged["packages"].as_sequence().unwrap();
        let names: Vec<_> = packages.iter().filter_map(item_name).collect();
        assert_eq!(names, vec!["git", "jq", "node"]);
        assert_eq!(packages[1]["min_version"], yaml("\"1.7\""));
    }

    #[test]
    fn plain_lists_are_replaced() {
        let base = yaml("codes: [1, 2]\n");
        let overlay = yaml("codes: [3]\n");
        assert_eq!(deep_merge(&base, &overlay)["codes"], yaml("[3]"));
    }

    #[test]
    fn null_deletes_key() {
        let base = yaml("app_name: Workstation\nsettings:\n  retries: 2\n");
        let overlay = yaml("app_name: ~\n");
        let merged = deep_merge(&base, &overlay);
        assert!(merged.get("app_name").is_none());
        assert!(merged.get("settings").is_some());
    }
}
