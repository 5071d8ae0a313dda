//! Union of an existing file with freshly rendered content.
//!
//! JSON and TOML files are merged structurally, flat text line by line.
//! Nested formats with no structural merge here (XML, YAML, brace-delimited
//! build scripts) are never combined: appending lines after their closing
//! element would produce a broken file. The existing side always wins on
//! conflicts, and a union that adds nothing yields [`Action::Skip`] so the
//! user's bytes are never rewritten just to reformat them.

use std::collections::HashSet;
use std::path::Path;

use crate::merge::Action;
use crate::render::file::is_binary;

pub fn combine(path: &Path, existing: &[u8], incoming: &[u8]) -> Action {
    if is_binary(existing) || is_binary(incoming) {
        tracing::warn!(path = %path.display(), "binary file cannot be combined, keeping existing");
        return Action::Skip;
    }

    let (Ok(existing), Ok(incoming)) = (std::str::from_utf8(existing), std::str::from_utf8(incoming))
    else {
        tracing::warn!(path = %path.display(), "file is not UTF-8, keeping existing");
        return Action::Skip;
    };

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());

    let combined = match extension.as_deref() {
        Some("json") => combine_json(path, existing, incoming),
        Some("toml") => combine_toml(path, existing, incoming),
        _ if is_nested_format(path, extension.as_deref()) => {
            tracing::warn!(
                path = %path.display(),
                "nested format cannot be combined line by line, keeping existing"
            );
            None
        }
        _ => union_lines(existing, incoming),
    };

    match combined {
        Some(content) => Action::Write(content.into_bytes()),
        None => Action::Skip,
    }
}

const NESTED_EXTENSIONS: &[&str] = &[
    "xml", "xsd", "xsl", "xslt", "pom", "html", "htm", "xhtml", "svg", "yaml", "yml", "groovy",
    "gradle", "kts", "java", "kt", "js", "ts", "jsx", "tsx", "css", "scss",
];

const NESTED_FILE_NAMES: &[&str] = &["Jenkinsfile", "Dockerfile", "Containerfile"];

/// Formats where appended lines land outside the document's root structure.
fn is_nested_format(path: &Path, extension: Option<&str>) -> bool {
    if extension.is_some_and(|ext| NESTED_EXTENSIONS.contains(&ext)) {
        return true;
    }
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| {
            NESTED_FILE_NAMES
                .iter()
                .any(|nested| name == *nested || name.starts_with(&format!("{nested}.")))
        })
}

fn combine_json(path: &Path, existing: &str, incoming: &str) -> Option<String> {
    let parsed = serde_json::from_str::<serde_json::Value>(existing)
        .and_then(|e| serde_json::from_str::<serde_json::Value>(incoming).map(|i| (e, i)));
    let (current, incoming) = match parsed {
        Ok(pair) => pair,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "invalid JSON, keeping existing");
            return None;
        }
    };

    let mut merged = current.clone();
    union_json(&mut merged, incoming);
    if merged == current {
        return None;
    }

    match serde_json::to_string_pretty(&merged) {
        Ok(mut out) => {
            out.push('\n');
            Some(out)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot serialize JSON, keeping existing");
            None
        }
    }
}

fn union_json(existing: &mut serde_json::Value, incoming: serde_json::Value) {
    use serde_json::Value;

    match (existing, incoming) {
        (Value::Object(current), Value::Object(new)) => {
            for (key, value) in new {
                match current.get_mut(&key) {
                    Some(slot) => union_json(slot, value),
                    None => {
                        current.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(current), Value::Array(new)) => {
            for value in new {
                if !current.contains(&value) {
                    current.push(value);
                }
            }
        }
        // Scalars and mismatched types: the existing value wins.
        _ => {}
    }
}

fn combine_toml(path: &Path, existing: &str, incoming: &str) -> Option<String> {
    let parsed = existing
        .parse::<toml::Table>()
        .and_then(|e| incoming.parse::<toml::Table>().map(|i| (e, i)));
    let (current, incoming) = match parsed {
        Ok(pair) => pair,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "invalid TOML, keeping existing");
            return None;
        }
    };

    let current = toml::Value::Table(current);
    let mut merged = current.clone();
    union_toml(&mut merged, toml::Value::Table(incoming));
    if merged == current {
        return None;
    }

    match toml::to_string_pretty(&merged) {
        Ok(out) => Some(out),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot serialize TOML, keeping existing");
            None
        }
    }
}

fn union_toml(existing: &mut toml::Value, incoming: toml::Value) {
    use toml::Value;

    match (existing, incoming) {
        (Value::Table(current), Value::Table(new)) => {
            for (key, value) in new {
                match current.get_mut(&key) {
                    Some(slot) => union_toml(slot, value),
                    None => {
                        current.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(current), Value::Array(new)) => {
            for value in new {
                if !current.contains(&value) {
                    current.push(value);
                }
            }
        }
        _ => {}
    }
}

/// Append the incoming lines the existing text lacks.
///
/// Lines compare with trailing whitespace trimmed; blank lines are never
/// appended.
fn union_lines(existing: &str, incoming: &str) -> Option<String> {
    let present: HashSet<&str> = existing.lines().map(str::trim_end).collect();
    let mut queued = HashSet::new();
    let mut added = Vec::new();

    for line in incoming.lines() {
        let key = line.trim_end();
        if key.trim().is_empty() || present.contains(key) || !queued.insert(key) {
            continue;
        }
        added.push(key);
    }

    if added.is_empty() {
        return None;
    }

    let mut out = existing.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    for line in added {
        out.push_str(line);
        out.push('\n');
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(action: Action) -> String {
        match action {
            Action::Write(bytes) => String::from_utf8(bytes).unwrap(),
            Action::Skip => panic!("expected a write"),
        }
    }

    #[test]
    fn text_appends_missing_lines_in_order() {
        let out = combine(
            Path::new(".editorconfig"),
            b"root = true\n[*]\nindent_style = tab\n",
            b"root = true\n[*]\ncharset = utf-8\nend_of_line = lf\n",
        );
        assert_eq!(
            written(out),
            "root = true\n[*]\nindent_style = tab\ncharset = utf-8\nend_of_line = lf\n"
        );
    }

    #[test]
    fn text_without_trailing_newline_gets_one() {
        let out = combine(Path::new("notes.txt"), b"first", b"second\n");
        assert_eq!(written(out), "first\nsecond\n");
    }

    #[test]
    fn text_union_is_idempotent() {
        let first = written(combine(Path::new("a.txt"), b"a\n", b"a\nb\n\nb\n"));
        assert_eq!(first, "a\nb\n");
        let second = combine(Path::new("a.txt"), first.as_bytes(), b"a\nb\n\nb\n");
        assert_eq!(second, Action::Skip);
    }

    #[test]
    fn json_adds_keys_and_keeps_user_values() {
        let existing = br#"{"name": "mine", "scripts": {"build": "mvn package"}, "tags": ["a"]}"#;
        let incoming = br#"{"name": "template", "scripts": {"test": "mvn test"}, "tags": ["a", "b"]}"#;

        let out = written(combine(Path::new("package.json"), existing, incoming));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["name"], "mine");
        assert_eq!(value["scripts"]["build"], "mvn package");
        assert_eq!(value["scripts"]["test"], "mvn test");
        assert_eq!(value["tags"], serde_json::json!(["a", "b"]));
        assert!(out.ends_with("}\n"));
    }

    #[test]
    fn json_with_nothing_new_is_skipped() {
        let existing = b"{\n    \"name\":   \"mine\"\n}";
        let out = combine(Path::new("package.json"), existing, br#"{"name": "other"}"#);
        assert_eq!(out, Action::Skip);
    }

    #[test]
    fn invalid_json_keeps_existing() {
        let out = combine(Path::new("package.json"), b"{ not json", br#"{"a": 1}"#);
        assert_eq!(out, Action::Skip);
    }

    #[test]
    fn toml_adds_missing_tables() {
        let existing = b"[server]\nport = 9090\n";
        let incoming = b"[server]\nport = 8080\nhost = \"0.0.0.0\"\n\n[logging]\nlevel = \"info\"\n";

        let out = written(combine(Path::new("app.toml"), existing, incoming));
        let table: toml::Table = out.parse().unwrap();
        assert_eq!(table["server"]["port"].as_integer(), Some(9090));
        assert_eq!(table["server"]["host"].as_str(), Some("0.0.0.0"));
        assert_eq!(table["logging"]["level"].as_str(), Some("info"));
    }

    #[test]
    fn shipped_settings_xml_is_not_combined() {
        let user = b"<?xml version=\"1.0\"?>\n<settings>\n  <servers/>\n</settings>\n";
        let template = include_bytes!("../../templates/devon4j/files/settings.xml.tera");

        let action = combine(Path::new("settings.xml"), user, template);
        assert_eq!(action, Action::Skip);
    }

    #[test]
    fn nested_build_scripts_are_not_combined() {
        for name in ["Jenkinsfile", "Dockerfile", "openshift.yaml", "build.gradle"] {
            let action = combine(Path::new(name), b"pipeline {\n}\n", b"pipeline {\n  agent any\n}\n");
            assert_eq!(action, Action::Skip, "{name}");
        }
    }

    #[test]
    fn flat_ignore_files_are_still_combined() {
        let out = combine(Path::new(".dockerignore"), b"*\n", b"*\n!target/*.jar\n");
        assert_eq!(written(out), "*\n!target/*.jar\n");
    }

    #[test]
    fn binary_content_is_never_combined() {
        let binary: Vec<u8> = (0..=255).collect();
        assert_eq!(combine(Path::new("logo.png"), &binary, b"text"), Action::Skip);
    }
}
