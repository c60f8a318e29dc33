use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// The closed taxonomy of Definition-of-Done checklists a ticket can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    GeneralFeature,
    Release,
    BugFix,
    VerificationBringUp,
    ToolUpdate,
    Rma,
    Investigation,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[
            Category::GeneralFeature,
            Category::Release,
            Category::BugFix,
            Category::VerificationBringUp,
            Category::ToolUpdate,
            Category::Rma,
            Category::Investigation,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::GeneralFeature => "general_feature",
            Category::Release => "release",
            Category::BugFix => "bug_fix",
            Category::VerificationBringUp => "verification_bring_up",
            Category::ToolUpdate => "tool_update",
            Category::Rma => "rma",
            Category::Investigation => "investigation",
        }
    }

    /// Human-facing name used in the "Ticket Type" section of the report.
    pub fn label(self) -> &'static str {
        match self {
            Category::GeneralFeature => "General feature development",
            Category::Release => "Release (ROM/FW)",
            Category::BugFix => "Bug Fix",
            Category::VerificationBringUp => "Verification and Bring-up",
            Category::ToolUpdate => "Tool Update",
            Category::Rma => "RMA",
            Category::Investigation => "Investigation/Concept Work",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Tri-state verdict outcome. `Indeterminate` means there was nothing to
/// inspect, which is distinct from inspecting and finding nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Satisfied,
    Unsatisfied,
    Indeterminate,
}

impl Outcome {
    pub fn all() -> &'static [Outcome] {
        &[Outcome::Satisfied, Outcome::Unsatisfied, Outcome::Indeterminate]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Satisfied => "satisfied",
            Outcome::Unsatisfied => "unsatisfied",
            Outcome::Indeterminate => "indeterminate",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            Outcome::Satisfied => "Satisfied",
            Outcome::Unsatisfied => "Unsatisfied",
            Outcome::Indeterminate => "Indeterminate",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AttachmentKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Log,
    Screenshot,
    TestResult,
    ReleaseNotes,
    Document,
    Measurement,
    Archive,
    Other,
}

const TEST_TOKENS: &[&str] = &["test", "tests", "junit", "pytest", "testreport", "results"];
const LOG_TOKENS: &[&str] = &["log", "logs", "trace", "dump", "console", "uart"];
const MEASUREMENT_TOKENS: &[&str] = &["measurement", "measurements", "meas", "scope", "characterization"];
const ARCHIVE_EXTS: &[&str] = &["zip", "tar", "gz", "tgz", "7z", "bz2", "xz"];
const DOCUMENT_EXTS: &[&str] = &["pdf", "doc", "docx", "md", "odt", "rtf", "xlsx", "pptx"];

impl AttachmentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AttachmentKind::Log => "log",
            AttachmentKind::Screenshot => "screenshot",
            AttachmentKind::TestResult => "test_result",
            AttachmentKind::ReleaseNotes => "release_notes",
            AttachmentKind::Document => "document",
            AttachmentKind::Measurement => "measurement",
            AttachmentKind::Archive => "archive",
            AttachmentKind::Other => "other",
        }
    }

    /// Infer the kind of an attachment from its file name and MIME type.
    ///
    /// Name tokens win over the MIME type, so `release-notes.pdf` is release
    /// notes rather than a generic document.
    pub fn infer(name: &str, mime: &str) -> AttachmentKind {
        let lower = name.to_ascii_lowercase();
        let tokens: Vec<&str> = lower
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();
        let has = |set: &[&str]| tokens.iter().any(|t| set.contains(t));
        let ext = lower.rsplit_once('.').map(|(_, e)| e).unwrap_or("");
        let mime = mime.to_ascii_lowercase();

        if lower.contains("release") && (lower.contains("note") || tokens.contains(&"changelog")) {
            AttachmentKind::ReleaseNotes
        } else if has(TEST_TOKENS) {
            AttachmentKind::TestResult
        } else if mime.starts_with("image/") {
            AttachmentKind::Screenshot
        } else if ext == "log" || has(LOG_TOKENS) {
            AttachmentKind::Log
        } else if ext == "csv" || has(MEASUREMENT_TOKENS) {
            AttachmentKind::Measurement
        } else if ARCHIVE_EXTS.contains(&ext) {
            AttachmentKind::Archive
        } else if DOCUMENT_EXTS.contains(&ext) || ext == "txt" {
            AttachmentKind::Document
        } else {
            AttachmentKind::Other
        }
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// LinkKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Blocks,
    BlockedBy,
    CausedBy,
    Causes,
    Duplicates,
    Clones,
    Release,
    Tests,
    RelatesTo,
    Other,
}

impl LinkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkKind::Blocks => "blocks",
            LinkKind::BlockedBy => "blocked_by",
            LinkKind::CausedBy => "caused_by",
            LinkKind::Causes => "causes",
            LinkKind::Duplicates => "duplicates",
            LinkKind::Clones => "clones",
            LinkKind::Release => "release",
            LinkKind::Tests => "tests",
            LinkKind::RelatesTo => "relates_to",
            LinkKind::Other => "other",
        }
    }

    /// Map a tracker link relation label ("is blocked by", "causes", ...) to a kind.
    pub fn from_relation(relation: &str) -> LinkKind {
        let r = relation.trim().to_ascii_lowercase();
        if r.contains("release") {
            LinkKind::Release
        } else if r == "is blocked by" {
            LinkKind::BlockedBy
        } else if r == "blocks" {
            LinkKind::Blocks
        } else if r == "is caused by" || r == "caused by" {
            LinkKind::CausedBy
        } else if r == "causes" {
            LinkKind::Causes
        } else if r.contains("duplicate") {
            LinkKind::Duplicates
        } else if r.contains("clone") {
            LinkKind::Clones
        } else if r == "tests" || r == "is tested by" {
            LinkKind::Tests
        } else if r == "relates to" {
            LinkKind::RelatesTo
        } else {
            LinkKind::Other
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TextField
// ---------------------------------------------------------------------------

/// Free-text fields a phrase signal can search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    Description,
    Comments,
    /// Description first, then comments.
    Any,
}

impl TextField {
    pub fn as_str(self) -> &'static str {
        match self {
            TextField::Description => "description",
            TextField::Comments => "comments",
            TextField::Any => "description or comments",
        }
    }
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_str_roundtrip() {
        for &c in Category::all() {
            let parsed: Category = c.as_str().parse().unwrap();
            assert_eq!(parsed, c);
        }
        assert!("chore".parse::<Category>().is_err());
    }

    #[test]
    fn category_serializes_snake_case() {
        let json = serde_json::to_string(&Category::VerificationBringUp).unwrap();
        assert_eq!(json, "\"verification_bring_up\"");
    }

    #[test]
    fn attachment_kind_from_name() {
        assert_eq!(AttachmentKind::infer("crash.log", ""), AttachmentKind::Log);
        assert_eq!(AttachmentKind::infer("uart_capture.txt", "text/plain"), AttachmentKind::Log);
        assert_eq!(AttachmentKind::infer("screen.png", "image/png"), AttachmentKind::Screenshot);
        assert_eq!(AttachmentKind::infer("junit-report.xml", ""), AttachmentKind::TestResult);
        assert_eq!(AttachmentKind::infer("Release_Notes_v2.pdf", ""), AttachmentKind::ReleaseNotes);
        assert_eq!(AttachmentKind::infer("meas_board3.csv", ""), AttachmentKind::Measurement);
        assert_eq!(AttachmentKind::infer("dump.tar.gz", ""), AttachmentKind::Log);
        assert_eq!(AttachmentKind::infer("sources.zip", ""), AttachmentKind::Archive);
        assert_eq!(AttachmentKind::infer("design.docx", ""), AttachmentKind::Document);
        assert_eq!(AttachmentKind::infer("blob.bin", ""), AttachmentKind::Other);
    }

    #[test]
    fn latest_is_not_a_test_token() {
        assert_eq!(AttachmentKind::infer("latest.log", ""), AttachmentKind::Log);
    }

    #[test]
    fn link_kind_from_relation() {
        assert_eq!(LinkKind::from_relation("is blocked by"), LinkKind::BlockedBy);
        assert_eq!(LinkKind::from_relation("Blocks"), LinkKind::Blocks);
        assert_eq!(LinkKind::from_relation("is caused by"), LinkKind::CausedBy);
        assert_eq!(LinkKind::from_relation("is duplicated by"), LinkKind::Duplicates);
        assert_eq!(LinkKind::from_relation("is part of release"), LinkKind::Release);
        assert_eq!(LinkKind::from_relation("relates to"), LinkKind::RelatesTo);
        assert_eq!(LinkKind::from_relation("mentions"), LinkKind::Other);
    }
}
