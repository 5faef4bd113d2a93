//! Config validation: unknown-key detection with Levenshtein suggestions.
//!
//! The raw TOML is first parsed into `toml::Value` and its key tree compared
//! against the known field names, emitting "did you mean?" warnings. Normal
//! serde deserialization follows. Warnings never reject a config.

use std::collections::HashSet;

/// A non-fatal config warning (typo, unknown section).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, ", did you mean '{s}'?")?;
        }
        Ok(())
    }
}

/// Maximum edit distance for a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

// ============================================================================
// Known Config Keys
// ============================================================================

/// Every valid dotted key path of `AdvisorConfig`.
///
/// Kept in step with the structs in advisor_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    [
        // [training]
        "training",
        "training.samples",
        "training.seed",
        "training.test_fraction",
        "training.train_on_start",
        // [forest]
        "forest",
        "forest.n_trees",
        "forest.max_depth",
        "forest.min_samples_split",
        "forest.max_features",
        // [server]
        "server",
        "server.addr",
    ]
    .into_iter()
    .collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Collect every dotted key path of a `toml::Value` tree.
///
/// `{ a = { b = 1, c = 2 } }` yields `["a", "a.b", "a.c"]`.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() { k.clone() } else { format!("{prefix}.{k}") };
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
            keys.push(path);
        }
    }
    keys
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Closest known key within [`MAX_SUGGESTION_DISTANCE`] edits, if any.
///
/// Ties resolve to the alphabetically first key so output is stable.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (levenshtein(unknown, k), k))
        .filter(|&(dist, _)| dist <= MAX_SUGGESTION_DISTANCE)
        .min()
        .map(|(_, k)| k.to_string())
}

/// Warnings for every unknown key in a raw TOML document.
///
/// Unparseable input yields no warnings; serde reports it afterwards.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    let mut found = walk_toml_keys(&value, "");
    found.sort();

    found
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("seed", "seed"), 0);
        assert_eq!(levenshtein("n_tres", "n_trees"), 1);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = "[forest]\nn_trees = 10\n[server]\naddr = \"x\"\n".parse().unwrap();
        let keys = walk_toml_keys(&toml, "");
        for k in ["forest", "forest.n_trees", "server", "server.addr"] {
            assert!(keys.contains(&k.to_string()), "missing {k}");
        }
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let warnings = validate_unknown_keys("[forest]\nn_tress = 10\n");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "forest.n_tress");
        assert_eq!(warnings[0].suggestion.as_deref(), Some("forest.n_trees"));
        assert!(warnings[0].to_string().contains("did you mean 'forest.n_trees'"));
    }

    #[test]
    fn test_valid_keys_produce_zero_warnings() {
        let toml_str = r#"
[training]
samples = 1000
seed = 1
test_fraction = 0.25
train_on_start = false

[forest]
n_trees = 10
max_depth = 5
min_samples_split = 2
max_features = 3

[server]
addr = "127.0.0.1:3000"
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert!(warnings.is_empty(), "Expected 0 warnings, got: {warnings:?}");
    }

    #[test]
    fn test_unknown_section_warns_without_suggestion() {
        let warnings = validate_unknown_keys("[database]\nurl = \"postgres://\"\n");
        assert!(warnings.iter().any(|w| w.field == "database"));
        assert!(warnings.iter().any(|w| w.field == "database.url" && w.suggestion.is_none()));
    }

    #[test]
    fn test_garbage_toml_yields_no_warnings() {
        assert!(validate_unknown_keys("[[[ not toml").is_empty());
    }
}
