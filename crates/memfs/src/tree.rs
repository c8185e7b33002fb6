//! Box-drawing rendering of the whole namespace.
//!
//! ```text
//! /memories
//! ├─┬ projects/
//! │ └── plan.md
//! └── notes.md
//! ```

use std::collections::BTreeMap;

use crate::error::Result;
use crate::fs::FS;
use crate::path::PATH_SEPARATOR;

/// A directory or file in the rendered tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeNode {
    /// Children keyed by name; an empty map marks a file
    pub children: BTreeMap<String, TreeNode>,
}

impl TreeNode {
    /// Build a tree from paths relative to the root, e.g. `projects/plan.md`
    pub fn from_relative_paths<'a, I>(paths: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut root = TreeNode::default();
        for path in paths {
            let mut node = &mut root;
            for segment in path.split(PATH_SEPARATOR).filter(|s| !s.is_empty()) {
                node = node.children.entry(segment.to_string()).or_default();
            }
        }
        root
    }

    pub fn is_dir(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Format `root` under the heading `label`
pub fn format_tree(label: &str, root: &TreeNode) -> String {
    let mut output = String::from(label);
    output.push('\n');
    if root.children.is_empty() {
        output.push_str("(empty)\n");
    }
    format_children(&mut output, root, "");
    output
}

fn format_children(output: &mut String, node: &TreeNode, prefix: &str) {
    let count = node.children.len();
    for (index, (name, child)) in node.children.iter().enumerate() {
        let is_last = index + 1 == count;
        let (connector, continuation) = match (child.is_dir(), is_last) {
            (false, true) => ("└──", ' '),
            (false, false) => ("├──", '│'),
            (true, true) => ("└─┬", ' '),
            (true, false) => ("├─┬", '│'),
        };

        output.push_str(prefix);
        output.push_str(connector);
        output.push(' ');
        output.push_str(name);
        if child.is_dir() {
            output.push(PATH_SEPARATOR);
        }
        output.push('\n');

        if child.is_dir() {
            let nested = format!("{prefix}{continuation} ");
            format_children(output, child, &nested);
        }
    }
}

impl FS {
    /// Render every file in the namespace as a tree rooted at the namespace root
    pub async fn tree(&self) -> Result<String> {
        let paths = self.get_all_paths().await?;
        let root = self.root_path();
        let relative = paths
            .iter()
            .filter_map(|path| path.strip_prefix(root))
            .map(|rest| rest.trim_start_matches(PATH_SEPARATOR));
        Ok(format_tree(root, &TreeNode::from_relative_paths(relative)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_tree() {
        let root = TreeNode::from_relative_paths(["b.md", "a.md"]);
        let output = format_tree("/memories", &root);
        assert_eq!(output, "/memories\n├── a.md\n└── b.md\n");
    }

    #[test]
    fn test_nested_tree() {
        let root =
            TreeNode::from_relative_paths(["projects/plan.md", "projects/x/y.md", "notes.md"]);
        let output = format_tree("/memories", &root);
        assert!(output.contains("├── notes.md"));
        assert!(output.contains("└─┬ projects/"));
        assert!(output.contains("  ├── plan.md"));
        assert!(output.contains("  └─┬ x/"));
        assert!(output.contains("    └── y.md"));
    }

    #[test]
    fn test_continuation_bar() {
        let root = TreeNode::from_relative_paths(["a/one.md", "b.md"]);
        let output = format_tree("/m", &root);
        assert!(output.contains("├─┬ a/"));
        assert!(output.contains("│ └── one.md"));
        assert!(output.contains("└── b.md"));
    }

    #[test]
    fn test_empty_tree() {
        let output = format_tree("/memories", &TreeNode::default());
        assert_eq!(output, "/memories\n(empty)\n");
    }
}
