use std::collections::HashSet;

use crate::error::{GraftError, Result};
use crate::tree::Tree;

pub const IGNORE_FILE: &str = ".gitignore";

/// Source of ignore-file entries for a list of ecosystem tags.
pub trait IgnoreRules {
    fn entries(&self, tags: &[String]) -> Result<Vec<String>>;
}

/// Offline rule table for the ecosystems the generated projects use.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinIgnoreRules;

impl BuiltinIgnoreRules {
    fn table(tag: &str) -> Option<&'static [&'static str]> {
        let entries: &'static [&'static str] = match tag {
            "java" => &[
                "*.class",
                "*.log",
                "*.ctxt",
                ".mtj.tmp/",
                "*.war",
                "*.nar",
                "*.ear",
                "hs_err_pid*",
                "replay_pid*",
            ],
            "maven" => &[
                "target/",
                "pom.xml.tag",
                "pom.xml.releaseBackup",
                "pom.xml.versionsBackup",
                "pom.xml.next",
                "release.properties",
                "dependency-reduced-pom.xml",
                "buildNumber.properties",
                ".mvn/timing.properties",
                ".mvn/wrapper/maven-wrapper.jar",
            ],
            "eclipse" => &[
                ".metadata",
                "bin/",
                "tmp/",
                "*.tmp",
                "*.bak",
                "*.swp",
                "*~.nib",
                "local.properties",
                ".settings/",
                ".loadpath",
                ".recommenders",
                ".project",
                ".classpath",
                ".factorypath",
            ],
            "intellij" => &[
                ".idea/**/workspace.xml",
                ".idea/**/tasks.xml",
                ".idea/**/usage.statistics.xml",
                ".idea/**/dictionaries",
                ".idea/**/shelf",
                "out/",
                "*.iws",
                ".idea_modules/",
            ],
            "intellij+all" => &[".idea/"],
            "intellij+iml" => &["*.iml", "modules.xml", ".idea/misc.xml", "*.ipr"],
            "visualstudiocode" => &[
                ".vscode/*",
                "!.vscode/settings.json",
                "!.vscode/tasks.json",
                "!.vscode/launch.json",
                "!.vscode/extensions.json",
                ".history/",
            ],
            _ => return None,
        };
        Some(entries)
    }
}

impl IgnoreRules for BuiltinIgnoreRules {
    fn entries(&self, tags: &[String]) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for tag in tags {
            let tag = tag.trim().to_ascii_lowercase();
            let table = Self::table(&tag).ok_or(GraftError::UnknownIgnoreTag { tag })?;
            for entry in table {
                if seen.insert(*entry) {
                    entries.push(entry.to_string());
                }
            }
        }
        Ok(entries)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreOutcome {
    Created { entries: usize },
    Appended { entries: usize },
    UpToDate,
}

/// Make sure `.gitignore` carries every entry for `tags`, appending only what is missing.
///
/// Existing bytes are kept exactly as they are, whatever their encoding; new
/// entries only ever go after them.
pub fn ensure(
    mut tree: Tree,
    rules: &dyn IgnoreRules,
    tags: &[String],
) -> Result<(Tree, IgnoreOutcome)> {
    let entries = rules.entries(tags)?;
    let header = format!("# Added by graft ({})", tags.join(", "));

    let Some(existing) = tree.read(IGNORE_FILE).map(<[u8]>::to_vec) else {
        let mut content = header;
        content.push('\n');
        for entry in &entries {
            content.push_str(entry);
            content.push('\n');
        }
        tree.write(IGNORE_FILE, content.into_bytes())?;
        return Ok((tree, IgnoreOutcome::Created {
            entries: entries.len(),
        }));
    };

    let missing: Vec<&String> = {
        // Lossy decoding is only used for lookup; entries are ASCII.
        let text = String::from_utf8_lossy(&existing);
        let present: HashSet<&str> = text.lines().map(str::trim).collect();
        entries
            .iter()
            .filter(|e| !present.contains(e.as_str()))
            .collect()
    };

    if missing.is_empty() {
        return Ok((tree, IgnoreOutcome::UpToDate));
    }

    let mut content = existing;
    if !content.is_empty() {
        if !content.ends_with(b"\n") {
            content.push(b'\n');
        }
        content.push(b'\n');
    }
    content.extend_from_slice(header.as_bytes());
    content.push(b'\n');
    for entry in &missing {
        content.extend_from_slice(entry.as_bytes());
        content.push(b'\n');
    }
    let count = missing.len();
    tree.write(IGNORE_FILE, content)?;

    Ok((tree, IgnoreOutcome::Appended { entries: count }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    fn gitignore(tree: &Tree) -> String {
        String::from_utf8(tree.read(IGNORE_FILE).unwrap().to_vec()).unwrap()
    }

    #[test]
    fn creates_ignore_file() {
        let (tree, outcome) =
            ensure(Tree::new(), &BuiltinIgnoreRules, &tags(&["maven"])).unwrap();
        assert_eq!(outcome, IgnoreOutcome::Created { entries: 10 });
        let content = gitignore(&tree);
        assert!(content.starts_with("# Added by graft (maven)\ntarget/\n"));
    }

    #[test]
    fn appends_only_missing_entries() {
        let tree = Tree::from_files([(IGNORE_FILE, b"target/\n*.iml\n".to_vec())]).unwrap();
        let (tree, outcome) =
            ensure(tree, &BuiltinIgnoreRules, &tags(&["intellij+iml"])).unwrap();
        assert_eq!(outcome, IgnoreOutcome::Appended { entries: 3 });

        let content = gitignore(&tree);
        assert!(content.starts_with("target/\n*.iml\n\n# Added by graft (intellij+iml)\n"));
        assert_eq!(content.matches("*.iml").count(), 1);
    }

    #[test]
    fn non_utf8_bytes_survive_append() {
        let original = b"# caf\xe9\n*.class\n".to_vec();
        let tree = Tree::from_files([(IGNORE_FILE, original.clone())]).unwrap();
        let (tree, outcome) = ensure(tree, &BuiltinIgnoreRules, &tags(&["java"])).unwrap();

        assert_eq!(outcome, IgnoreOutcome::Appended { entries: 8 });
        let content = tree.read(IGNORE_FILE).unwrap();
        assert!(content.starts_with(&original));
        assert!(content[original.len()..].starts_with(b"\n# Added by graft (java)\n*.log\n"));
    }

    #[test]
    fn missing_trailing_newline_is_completed() {
        let tree = Tree::from_files([(IGNORE_FILE, b"target/".to_vec())]).unwrap();
        let (tree, _) = ensure(tree, &BuiltinIgnoreRules, &tags(&["intellij+all"])).unwrap();
        assert_eq!(
            gitignore(&tree),
            "target/\n\n# Added by graft (intellij+all)\n.idea/\n"
        );
    }

    #[test]
    fn second_run_is_up_to_date() {
        let all = tags(&["java", "maven", "eclipse", "intellij", "intellij+all", "intellij+iml", "visualstudiocode"]);
        let (tree, _) = ensure(Tree::new(), &BuiltinIgnoreRules, &all).unwrap();
        let before = gitignore(&tree);
        let (tree, outcome) = ensure(tree, &BuiltinIgnoreRules, &all).unwrap();
        assert_eq!(outcome, IgnoreOutcome::UpToDate);
        assert_eq!(gitignore(&tree), before);
    }

    #[test]
    fn overlapping_tags_do_not_duplicate() {
        let entries = BuiltinIgnoreRules
            .entries(&tags(&["maven", "maven", "MAVEN"]))
            .unwrap();
        assert_eq!(entries.len(), 10);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = BuiltinIgnoreRules.entries(&tags(&["cobol"])).unwrap_err();
        assert!(matches!(err, GraftError::UnknownIgnoreTag { tag } if tag == "cobol"));
    }
}
