//! Project background handed to the prose narrator.
//!
//! Each configured file contributes its `## Background` section when it has
//! one, otherwise its whole text. Contributions are capped at
//! [`MAX_EXCERPT_CHARS`] characters so a large README cannot crowd out the
//! report in the prompt.

use std::path::{Path, PathBuf};

pub const MAX_EXCERPT_CHARS: usize = 1000;

const BACKGROUND_HEADING: &str = "## Background";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextExcerpt {
    /// Path as configured.
    pub source: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectContext {
    pub excerpts: Vec<ContextExcerpt>,
}

impl ProjectContext {
    /// Read every file in `paths`, resolving relative ones against `base`.
    /// Unreadable or empty files are skipped with a warning.
    pub fn load(paths: &[PathBuf], base: &Path) -> Self {
        let mut excerpts = Vec::new();
        for path in paths {
            let full = base.join(path);
            match std::fs::read_to_string(&full) {
                Ok(doc) => {
                    let text = excerpt(&doc);
                    if text.is_empty() {
                        tracing::warn!(path = %full.display(), "context file is empty, skipping");
                        continue;
                    }
                    tracing::debug!(path = %full.display(), chars = text.chars().count(), "loaded project context");
                    excerpts.push(ContextExcerpt {
                        source: path.display().to_string(),
                        text,
                    });
                }
                Err(e) => {
                    tracing::warn!(path = %full.display(), error = %e, "cannot read context file, skipping");
                }
            }
        }
        Self { excerpts }
    }

    pub fn is_empty(&self) -> bool {
        self.excerpts.is_empty()
    }

    /// All excerpts as one prompt block, `None` when there are none.
    pub fn render(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let blocks: Vec<String> = self
            .excerpts
            .iter()
            .map(|e| format!("From {}:\n{}", e.source, e.text))
            .collect();
        Some(blocks.join("\n\n"))
    }
}

/// The `## Background` section of a markdown document, heading included,
/// up to the next heading.
pub fn background_section(doc: &str) -> Option<&str> {
    let start = doc.find(BACKGROUND_HEADING)?;
    let body = start + BACKGROUND_HEADING.len();
    let end = doc[body..].find("\n#").map_or(doc.len(), |i| body + i);
    Some(doc[start..end].trim())
}

fn excerpt(doc: &str) -> String {
    let text = background_section(doc).unwrap_or_else(|| doc.trim());
    truncate_chars(text, MAX_EXCERPT_CHARS).to_string()
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const README: &str = "\
# Firmware

Intro paragraph.

## Background
This repository holds the boot ROM for the JU and EIP targets.

## Definition of Done (DoD)
- everything
";

    #[test]
    fn background_section_stops_at_next_heading() {
        let section = background_section(README).unwrap();
        assert!(section.starts_with("## Background"));
        assert!(section.contains("JU and EIP targets"));
        assert!(!section.contains("Definition of Done"));
    }

    #[test]
    fn background_section_runs_to_end_of_document() {
        let doc = "## Background\nlast section";
        assert_eq!(background_section(doc), Some("## Background\nlast section"));
        assert!(background_section("# Title\nno background").is_none());
    }

    #[test]
    fn files_without_background_contribute_whole_text() {
        assert_eq!(excerpt("  internal notes only \n"), "internal notes only");
    }

    #[test]
    fn excerpts_are_capped_on_char_boundaries() {
        let long = "é".repeat(MAX_EXCERPT_CHARS + 50);
        let e = excerpt(&long);
        assert_eq!(e.chars().count(), MAX_EXCERPT_CHARS);
    }

    #[test]
    fn load_reads_relative_paths_and_skips_missing() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("README.md"), README).unwrap();
        std::fs::write(dir.path().join("non-public.md"), "Customer is ACME.").unwrap();
        std::fs::write(dir.path().join("blank.md"), "  \n").unwrap();

        let ctx = ProjectContext::load(
            &[
                PathBuf::from("README.md"),
                PathBuf::from("missing.md"),
                PathBuf::from("blank.md"),
                PathBuf::from("non-public.md"),
            ],
            dir.path(),
        );
        assert_eq!(ctx.excerpts.len(), 2);
        assert_eq!(ctx.excerpts[0].source, "README.md");
        assert_eq!(ctx.excerpts[1].text, "Customer is ACME.");

        let rendered = ctx.render().unwrap();
        assert!(rendered.starts_with("From README.md:\n## Background"));
        assert!(rendered.contains("From non-public.md:\nCustomer is ACME."));
    }

    #[test]
    fn empty_context_renders_nothing() {
        assert!(ProjectContext::default().render().is_none());
        assert!(ProjectContext::load(&[], Path::new(".")).is_empty());
    }
}
