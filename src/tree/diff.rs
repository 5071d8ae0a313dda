use std::path::Path;

use similar::TextDiff;

use crate::tree::Tree;

/// A staged change relative to the tree as it was loaded.
pub struct Change<'a> {
    pub path: &'a Path,
    pub before: Option<&'a [u8]>,
    pub after: &'a [u8],
}

impl Change<'_> {
    pub fn is_create(&self) -> bool {
        self.before.is_none()
    }
}

/// Every path staged in `after`, paired with its content in `before`.
pub fn changes<'a>(before: &'a Tree, after: &'a Tree) -> Vec<Change<'a>> {
    after
        .staged()
        .filter_map(|path| {
            let content = after.read(path)?;
            Some(Change {
                path,
                before: before.read(path),
                after: content,
            })
        })
        .collect()
}

pub fn unified_diff(old: &str, new: &str, path: &Path) -> String {
    let diff = TextDiff::from_lines(old, new);
    let mut output = String::new();

    output.push_str(&format!(
        "--- a/{}\n+++ b/{}\n",
        path.display(),
        path.display()
    ));

    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        output.push_str(&format!("{hunk}"));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_pair_staged_paths_with_previous_content() {
        let before = Tree::from_files([("pom.xml", b"old".to_vec())]).unwrap();
        let mut after = before.clone();
        after.write("pom.xml", b"new".to_vec()).unwrap();
        after.write("README.md", b"hi".to_vec()).unwrap();

        let changes = changes(&before, &after);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].path, Path::new("README.md"));
        assert!(changes[0].is_create());
        assert_eq!(changes[1].before, Some(&b"old"[..]));
    }

    #[test]
    fn unified_diff_marks_added_lines() {
        let diff = unified_diff("a\nb\n", "a\nb\nc\n", Path::new("f.txt"));
        assert!(diff.starts_with("--- a/f.txt\n+++ b/f.txt\n"));
        assert!(diff.contains("+c"));
    }
}
