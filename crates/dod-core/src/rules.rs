use crate::classifier::Rule;
use crate::ticket::TicketSnapshot;
use crate::types::{Category, LinkKind};
use regex::Regex;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Type label lookup
// ---------------------------------------------------------------------------

/// Map an explicit tracker issue type to a category. Generic types such as
/// "Task" or "Sub-task" carry no signal and return `None`.
pub fn label_category(label: &str) -> Option<Category> {
    match label.trim().to_ascii_lowercase().as_str() {
        "bug" | "defect" | "bug fix" | "bugfix" => Some(Category::BugFix),
        "rma" | "return" | "customer return" => Some(Category::Rma),
        "release" | "rom release" | "fw release" | "firmware release" => Some(Category::Release),
        "investigation" | "spike" | "concept" | "concept work" | "research" => {
            Some(Category::Investigation)
        }
        "tool" | "tool update" | "tooling" => Some(Category::ToolUpdate),
        "verification" | "bring-up" | "bringup" | "bring up" | "validation" => {
            Some(Category::VerificationBringUp)
        }
        "story" | "feature" | "new feature" | "improvement" | "epic" => {
            Some(Category::GeneralFeature)
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Keyword sets
// ---------------------------------------------------------------------------

const RELEASE_WORDS: &[&str] = &[
    "release", "tape-out", "tapeout", "rom", "rom code", "firmware release", "release candidate",
];
const RMA_WORDS: &[&str] = &["rma", "customer return", "returned unit", "field return"];
const BUG_WORDS: &[&str] = &[
    "bug", "crash", "crashes", "regression", "fix", "fixes", "error", "defect", "hang", "hangs",
];
const BRING_UP_WORDS: &[&str] = &["bring-up", "bringup", "bring up", "verification", "characterization"];
const TOOL_WORDS: &[&str] = &["tool", "tools", "toolchain", "compiler", "sdk update", "script update"];
const INVESTIGATION_WORDS: &[&str] = &[
    "investigate", "investigation", "analysis", "concept", "spike", "feasibility", "evaluate",
];

static RELEASE_RE: OnceLock<Regex> = OnceLock::new();
static RMA_RE: OnceLock<Regex> = OnceLock::new();
static BUG_RE: OnceLock<Regex> = OnceLock::new();
static BRING_UP_RE: OnceLock<Regex> = OnceLock::new();
static TOOL_RE: OnceLock<Regex> = OnceLock::new();
static INVESTIGATION_RE: OnceLock<Regex> = OnceLock::new();

fn word_regex(words: &[&str]) -> Regex {
    let alternation: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternation.join("|"))).unwrap()
}

// ---------------------------------------------------------------------------
// Condition helpers
// ---------------------------------------------------------------------------

fn label_is(t: &TicketSnapshot, category: Category) -> bool {
    t.type_label
        .as_deref()
        .and_then(label_category)
        .map(|c| c == category)
        .unwrap_or(false)
}

fn mentions(t: &TicketSnapshot, cell: &'static OnceLock<Regex>, words: &[&str]) -> bool {
    let re = cell.get_or_init(|| word_regex(words));
    re.is_match(&t.summary) || re.is_match(&t.description)
}

fn has_link(t: &TicketSnapshot, kind: LinkKind) -> bool {
    t.links_of(kind).next().is_some()
}

// ---------------------------------------------------------------------------
// Default rules (priority-ordered)
// ---------------------------------------------------------------------------

pub fn default_rules() -> Vec<Rule> {
    vec![
        // 1. Explicit type label, one rule per category
        Rule {
            id: "label_bug_fix",
            condition: |t| label_is(t, Category::BugFix),
            category: Category::BugFix,
        },
        Rule {
            id: "label_rma",
            condition: |t| label_is(t, Category::Rma),
            category: Category::Rma,
        },
        Rule {
            id: "label_release",
            condition: |t| label_is(t, Category::Release),
            category: Category::Release,
        },
        Rule {
            id: "label_investigation",
            condition: |t| label_is(t, Category::Investigation),
            category: Category::Investigation,
        },
        Rule {
            id: "label_tool_update",
            condition: |t| label_is(t, Category::ToolUpdate),
            category: Category::ToolUpdate,
        },
        Rule {
            id: "label_verification_bring_up",
            condition: |t| label_is(t, Category::VerificationBringUp),
            category: Category::VerificationBringUp,
        },
        Rule {
            id: "label_general_feature",
            condition: |t| label_is(t, Category::GeneralFeature),
            category: Category::GeneralFeature,
        },
        // 2. Release wording or a release link
        Rule {
            id: "release_keywords",
            condition: |t| mentions(t, &RELEASE_RE, RELEASE_WORDS) || has_link(t, LinkKind::Release),
            category: Category::Release,
        },
        // 3. Returned hardware
        Rule {
            id: "rma_keywords",
            condition: |t| mentions(t, &RMA_RE, RMA_WORDS),
            category: Category::Rma,
        },
        // 4. Defect wording or a "caused by" link
        Rule {
            id: "bug_keywords",
            condition: |t| mentions(t, &BUG_RE, BUG_WORDS) || has_link(t, LinkKind::CausedBy),
            category: Category::BugFix,
        },
        // 5. Bring-up and verification campaigns
        Rule {
            id: "bring_up_keywords",
            condition: |t| mentions(t, &BRING_UP_RE, BRING_UP_WORDS),
            category: Category::VerificationBringUp,
        },
        // 6. Tooling changes
        Rule {
            id: "tool_keywords",
            condition: |t| mentions(t, &TOOL_RE, TOOL_WORDS),
            category: Category::ToolUpdate,
        },
        // 7. Generic investigation wording is the weakest signal
        Rule {
            id: "investigation_keywords",
            condition: |t| mentions(t, &INVESTIGATION_RE, INVESTIGATION_WORDS),
            category: Category::Investigation,
        },
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
