//! The Definition-of-Done rule catalog.
//!
//! One ordered checklist per [`Category`]. Each [`CriterionDescriptor`] names
//! the evidence signals that demonstrate it, how to test it, and when it is
//! done. The catalog is compiled in and versioned by [`CATALOG_VERSION`];
//! every analysis records the version that produced its verdicts.

use crate::types::{AttachmentKind, Category, LinkKind, TextField};
use serde::Serialize;

/// Bump whenever a criterion, signal or phrase list changes.
pub const CATALOG_VERSION: &str = "2025.2";

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalSource {
    /// Presence of an attachment of one of these kinds.
    Attachment { kinds: &'static [AttachmentKind] },
    /// Presence of one of these lowercase phrases in a text field.
    Phrase {
        field: TextField,
        phrases: &'static [&'static str],
    },
    /// Presence of a linked ticket of this kind.
    Link { kind: LinkKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EvidenceSignal {
    pub source: SignalSource,
    /// e.g. "presence of test-result attachment"
    pub description: &'static str,
}

const fn attachment(kinds: &'static [AttachmentKind], description: &'static str) -> EvidenceSignal {
    EvidenceSignal {
        source: SignalSource::Attachment { kinds },
        description,
    }
}

const fn phrase(
    field: TextField,
    phrases: &'static [&'static str],
    description: &'static str,
) -> EvidenceSignal {
    EvidenceSignal {
        source: SignalSource::Phrase { field, phrases },
        description,
    }
}

const fn link(kind: LinkKind, description: &'static str) -> EvidenceSignal {
    EvidenceSignal {
        source: SignalSource::Link { kind },
        description,
    }
}

// ---------------------------------------------------------------------------
// CriterionDescriptor
// ---------------------------------------------------------------------------

/// How the signals of one criterion combine into a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    /// One matching signal is enough.
    Any,
    /// Every signal must match.
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CriterionDescriptor {
    pub id: &'static str,
    pub category: Category,
    /// 1-based position within the category's checklist.
    pub ordinal: u32,
    pub text: &'static str,
    pub requirement: Requirement,
    pub signals: &'static [EvidenceSignal],
    pub testing_method: &'static str,
    pub done_when: &'static str,
}

macro_rules! criterion {
    (
        id: $id:expr,
        category: $cat:expr,
        ordinal: $ord:expr,
        text: $text:expr,
        requirement: $req:expr,
        signals: [$($sig:expr),+ $(,)?],
        testing_method: $tm:expr,
        done_when: $dw:expr $(,)?
    ) => {
        CriterionDescriptor {
            id: $id,
            category: $cat,
            ordinal: $ord,
            text: $text,
            requirement: $req,
            signals: &[$($sig),+],
            testing_method: $tm,
            done_when: $dw,
        }
    };
    (
        id: $id:expr,
        category: $cat:expr,
        ordinal: $ord:expr,
        text: $text:expr,
        signals: [$($sig:expr),+ $(,)?],
        testing_method: $tm:expr,
        done_when: $dw:expr $(,)?
    ) => {
        criterion! {
            id: $id,
            category: $cat,
            ordinal: $ord,
            text: $text,
            requirement: Requirement::Any,
            signals: [$($sig),+],
            testing_method: $tm,
            done_when: $dw,
        }
    };
}

// ---------------------------------------------------------------------------
// Checklists
// ---------------------------------------------------------------------------

use crate::types::AttachmentKind as A;
use crate::types::Category as C;
use crate::types::TextField as F;

static GENERAL_FEATURE: &[CriterionDescriptor] = &[
    criterion! {
        id: "general_feature.requirements",
        category: C::GeneralFeature,
        ordinal: 1,
        text: "Requirements and scope documented",
        signals: [
            phrase(F::Description, &["requirement", "acceptance criteria", "scope", "user story", "as a "],
                "requirements or scope text in the description"),
            attachment(&[A::Document], "presence of a specification document attachment"),
        ],
        testing_method: "Review the ticket description against the stated requirements",
        done_when: "The expected behaviour and scope are written down on the ticket",
    },
    criterion! {
        id: "general_feature.review",
        category: C::GeneralFeature,
        ordinal: 2,
        text: "Implementation reviewed",
        signals: [
            phrase(F::Comments, &["code review", "reviewed", "pull request", "merge request", "approved"],
                "review record in the comments"),
        ],
        testing_method: "Check the linked pull/merge request for an approving review",
        done_when: "At least one reviewer has approved the change",
    },
    criterion! {
        id: "general_feature.tests",
        category: C::GeneralFeature,
        ordinal: 3,
        text: "Tests added and passing",
        signals: [
            attachment(&[A::TestResult], "presence of test-result attachment"),
            phrase(F::Comments, &["tests pass", "test added", "tests added", "unit test", "ci green", "passing"],
                "test evidence in the comments"),
        ],
        testing_method: "Run the automated test suite covering the new feature",
        done_when: "New tests exist for the feature and the suite passes",
    },
    criterion! {
        id: "general_feature.docs",
        category: C::GeneralFeature,
        ordinal: 4,
        text: "Documentation updated",
        signals: [
            phrase(F::Comments, &["documentation", "docs updated", "readme", "confluence", "user guide"],
                "documentation update noted in the comments"),
        ],
        testing_method: "Inspect the user-facing documentation for the new behaviour",
        done_when: "Documentation describes the feature as shipped",
    },
];

static RELEASE: &[CriterionDescriptor] = &[
    criterion! {
        id: "release.scope",
        category: C::Release,
        ordinal: 1,
        text: "Release scope defined",
        signals: [
            link(LinkKind::Release, "presence of linked release ticket"),
            link(LinkKind::RelatesTo, "presence of related tickets"),
            phrase(F::Description, &["scope", "includes", "included", "content of the release"],
                "release scope text in the description"),
        ],
        testing_method: "Compare the linked tickets with the planned release content",
        done_when: "Every change shipped in the release is linked or listed",
    },
    criterion! {
        id: "release.notes",
        category: C::Release,
        ordinal: 2,
        text: "Release notes updated",
        signals: [
            attachment(&[A::ReleaseNotes], "presence of release-notes attachment"),
            phrase(F::Comments, &["release notes", "changelog"], "release notes mentioned in the comments"),
        ],
        testing_method: "Open the release notes and check them against the release scope",
        done_when: "Release notes list every change and known issue",
    },
    criterion! {
        id: "release.version",
        category: C::Release,
        ordinal: 3,
        text: "Version tagged",
        signals: [
            phrase(F::Any, &["tagged", "tag:", "version"], "version or tag reference"),
        ],
        testing_method: "Verify the tag exists in the repository and matches the build",
        done_when: "The released binary is traceable to a tagged version",
    },
    criterion! {
        id: "release.verification",
        category: C::Release,
        ordinal: 4,
        text: "Release artifacts verified",
        signals: [
            attachment(&[A::TestResult], "presence of test-result attachment"),
            phrase(F::Comments, &["verified", "regression passed", "sanity check", "smoke test"],
                "verification noted in the comments"),
        ],
        testing_method: "Run the release regression suite on the final artifacts",
        done_when: "Regression results for the release artifacts are attached and green",
    },
];

static BUG_FIX: &[CriterionDescriptor] = &[
    criterion! {
        id: "bug_fix.reproduced",
        category: C::BugFix,
        ordinal: 1,
        text: "Issue reproduced",
        signals: [
            attachment(&[A::Log, A::Screenshot], "presence of log or screenshot attachment"),
            phrase(F::Any, &["steps to reproduce", "reproduced", "reproducible", "repro"],
                "reproduction steps in the ticket text"),
        ],
        testing_method: "Follow the documented reproduction steps on the affected version",
        done_when: "The failure is reproducible from the information on the ticket",
    },
    criterion! {
        id: "bug_fix.root_cause",
        category: C::BugFix,
        ordinal: 2,
        text: "Root cause identified",
        signals: [
            phrase(F::Any, &["root cause", "root-cause", "caused by"], "presence of root-cause text"),
        ],
        testing_method: "Review the root-cause explanation against the code change",
        done_when: "The ticket states why the defect occurred",
    },
    criterion! {
        id: "bug_fix.fix_verified",
        category: C::BugFix,
        ordinal: 3,
        text: "Fix verified",
        signals: [
            phrase(F::Comments, &["verified", "fix confirmed", "no longer reproduces", "retested"],
                "fix verification in the comments"),
            link(LinkKind::Tests, "presence of linked test ticket"),
        ],
        testing_method: "Re-run the reproduction steps on a build containing the fix",
        done_when: "The failure no longer occurs with the fix applied",
    },
    criterion! {
        id: "bug_fix.test_case",
        category: C::BugFix,
        ordinal: 4,
        text: "Test case added",
        signals: [
            attachment(&[A::TestResult], "presence of test-result attachment"),
            phrase(F::Comments, &["test added", "test case", "unit test", "regression test"],
                "new test mentioned in the comments"),
        ],
        testing_method: "Run the new regression test against the fixed and unfixed code",
        done_when: "A test that fails without the fix and passes with it is in the suite",
    },
];

static VERIFICATION_BRING_UP: &[CriterionDescriptor] = &[
    criterion! {
        id: "verification_bring_up.plan",
        category: C::VerificationBringUp,
        ordinal: 1,
        text: "Test plan defined",
        signals: [
            phrase(F::Description, &["test plan", "verification plan", "test cases", "procedure"],
                "test plan in the description"),
            attachment(&[A::Document], "presence of test plan document"),
        ],
        testing_method: "Review the plan for coverage of every feature under bring-up",
        done_when: "A plan lists every test to be executed and its pass criteria",
    },
    criterion! {
        id: "verification_bring_up.results",
        category: C::VerificationBringUp,
        ordinal: 2,
        text: "Measurement results attached",
        signals: [
            attachment(&[A::Measurement, A::TestResult], "presence of measurement or test-result attachment"),
        ],
        testing_method: "Compare the attached measurements with the pass criteria in the plan",
        done_when: "Results for every planned test are attached",
    },
    criterion! {
        id: "verification_bring_up.deviations",
        category: C::VerificationBringUp,
        ordinal: 3,
        text: "Deviations documented",
        signals: [
            phrase(F::Comments, &["deviation", "out of spec", "open issue", "workaround", "no deviations"],
                "deviation report in the comments"),
            link(LinkKind::Causes, "presence of linked defect tickets"),
        ],
        testing_method: "Check every failed measurement has a deviation note or defect ticket",
        done_when: "All deviations are explained or tracked",
    },
    criterion! {
        id: "verification_bring_up.sign_off",
        category: C::VerificationBringUp,
        ordinal: 4,
        text: "Sign-off recorded",
        signals: [
            phrase(F::Comments, &["sign-off", "signed off", "approved", "accepted"], "sign-off in the comments"),
        ],
        testing_method: "Confirm the responsible engineer recorded a sign-off",
        done_when: "The bring-up is formally accepted",
    },
];

static TOOL_UPDATE: &[CriterionDescriptor] = &[
    criterion! {
        id: "tool_update.change",
        category: C::ToolUpdate,
        ordinal: 1,
        text: "Change and new version described",
        signals: [
            phrase(F::Description, &["version", "upgrade", "update to", "changelog"],
                "version change in the description"),
            attachment(&[A::ReleaseNotes], "presence of upstream release notes"),
        ],
        testing_method: "Compare the installed tool version with the one stated on the ticket",
        done_when: "The old and new versions and the reason for the update are recorded",
    },
    criterion! {
        id: "tool_update.compatibility",
        category: C::ToolUpdate,
        ordinal: 2,
        text: "Backward compatibility checked",
        signals: [
            phrase(F::Any, &["backward compatible", "backwards compatible", "compatibility", "breaking change", "migration"],
                "compatibility assessment in the ticket text"),
        ],
        testing_method: "Build existing projects with the updated tool",
        done_when: "Existing projects build and run unchanged, or migration steps are documented",
    },
    criterion! {
        id: "tool_update.tested",
        category: C::ToolUpdate,
        ordinal: 3,
        text: "Tool tested in the target workflow",
        signals: [
            attachment(&[A::TestResult, A::Log], "presence of test-result or build log attachment"),
            phrase(F::Comments, &["tested", "verified", "ci green", "build passes"], "test evidence in the comments"),
        ],
        testing_method: "Run the CI pipeline with the updated tool",
        done_when: "The pipeline passes with the new tool version",
    },
    criterion! {
        id: "tool_update.communicated",
        category: C::ToolUpdate,
        ordinal: 4,
        text: "Users notified and documentation updated",
        signals: [
            phrase(F::Comments, &["announced", "notified", "documentation", "wiki", "readme"],
                "announcement in the comments"),
        ],
        testing_method: "Check the team channel and setup documentation for the update notice",
        done_when: "Users know about the update and setup docs reference the new version",
    },
];

static RMA: &[CriterionDescriptor] = &[
    criterion! {
        id: "rma.failure_description",
        category: C::Rma,
        ordinal: 1,
        text: "Failure described with customer data",
        requirement: Requirement::All,
        signals: [
            phrase(F::Description, &["serial", "customer", "failure", "symptom"],
                "failure description in the description"),
            attachment(&[A::Log, A::Screenshot], "presence of customer log or screenshot"),
        ],
        testing_method: "Check the returned unit's serial number and the customer's failure report",
        done_when: "The failure mode and affected units are identified with supporting data",
    },
    criterion! {
        id: "rma.analysis",
        category: C::Rma,
        ordinal: 2,
        text: "Failure analysis performed",
        signals: [
            attachment(&[A::Measurement, A::Document], "presence of failure-analysis report"),
            phrase(F::Comments, &["failure analysis", "fa report", "x-ray", "analysis shows"],
                "failure analysis in the comments"),
        ],
        testing_method: "Review the failure-analysis report for the returned unit",
        done_when: "The analysis confirms or rejects the reported failure",
    },
    criterion! {
        id: "rma.corrective_action",
        category: C::Rma,
        ordinal: 3,
        text: "Root cause and corrective action documented",
        requirement: Requirement::All,
        signals: [
            phrase(F::Any, &["root cause", "root-cause"], "presence of root-cause text"),
            phrase(F::Any, &["corrective action", "containment", "8d", "countermeasure"],
                "presence of corrective-action text"),
        ],
        testing_method: "Check the corrective action addresses the documented root cause",
        done_when: "Root cause and corrective action are both recorded",
    },
    criterion! {
        id: "rma.customer_report",
        category: C::Rma,
        ordinal: 4,
        text: "Customer report delivered",
        signals: [
            phrase(F::Comments, &["report sent", "customer informed", "8d report", "report delivered"],
                "customer report noted in the comments"),
        ],
        testing_method: "Confirm the customer acknowledged the report",
        done_when: "The customer has received the analysis report",
    },
];

static INVESTIGATION: &[CriterionDescriptor] = &[
    criterion! {
        id: "investigation.question",
        category: C::Investigation,
        ordinal: 1,
        text: "Question and scope defined",
        signals: [
            phrase(F::Description, &["question", "goal", "scope", "hypothesis", "investigate"],
                "question or goal in the description"),
        ],
        testing_method: "Read the description and restate the question being answered",
        done_when: "The investigation has a stated question and boundaries",
    },
    criterion! {
        id: "investigation.findings",
        category: C::Investigation,
        ordinal: 2,
        text: "Findings documented",
        signals: [
            attachment(&[A::Document, A::Measurement, A::Log], "presence of findings document or data"),
            phrase(F::Comments, &["findings", "results", "observed", "measured"], "findings in the comments"),
        ],
        testing_method: "Review the recorded findings for supporting data",
        done_when: "Findings are recorded on the ticket with their data",
    },
    criterion! {
        id: "investigation.conclusion",
        category: C::Investigation,
        ordinal: 3,
        text: "Conclusion or recommendation recorded",
        signals: [
            phrase(F::Any, &["conclusion", "recommend", "proposal", "decision", "next steps"],
                "conclusion or recommendation in the ticket text"),
        ],
        testing_method: "Check the conclusion answers the stated question",
        done_when: "A clear recommendation or decision is recorded",
    },
    criterion! {
        id: "investigation.follow_up",
        category: C::Investigation,
        ordinal: 4,
        text: "Follow-up tickets created",
        signals: [
            link(LinkKind::Causes, "presence of linked follow-up tickets"),
            link(LinkKind::RelatesTo, "presence of related tickets"),
            phrase(F::Comments, &["follow-up", "follow up", "no further action"], "follow-up noted in the comments"),
        ],
        testing_method: "Check every recommended action is tracked by a ticket",
        done_when: "Recommended work is captured in linked tickets",
    },
];

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Ordered checklist for `category`. Never empty.
pub fn criteria_for(category: Category) -> &'static [CriterionDescriptor] {
    match category {
        Category::GeneralFeature => GENERAL_FEATURE,
        Category::Release => RELEASE,
        Category::BugFix => BUG_FIX,
        Category::VerificationBringUp => VERIFICATION_BRING_UP,
        Category::ToolUpdate => TOOL_UPDATE,
        Category::Rma => RMA,
        Category::Investigation => INVESTIGATION,
    }
}

pub fn all_criteria() -> impl Iterator<Item = &'static CriterionDescriptor> {
    Category::all().iter().flat_map(|&c| criteria_for(c).iter())
}

pub fn find(id: &str) -> Option<&'static CriterionDescriptor> {
    all_criteria().find(|c| c.id == id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_category_has_criteria() {
        for &c in Category::all() {
            assert!(!criteria_for(c).is_empty(), "empty checklist for {c}");
        }
    }

    #[test]
    fn ordinals_are_contiguous_from_one() {
        for &c in Category::all() {
            let ordinals: Vec<u32> = criteria_for(c).iter().map(|d| d.ordinal).collect();
            let expected: Vec<u32> = (1..=ordinals.len() as u32).collect();
            assert_eq!(ordinals, expected, "ordinals out of order for {c}");
        }
    }

    #[test]
    fn criteria_belong_to_their_category() {
        for &c in Category::all() {
            for d in criteria_for(c) {
                assert_eq!(d.category, c, "{} listed under {c}", d.id);
                assert!(
                    d.id.starts_with(&format!("{}.", c.as_str())),
                    "id {} not prefixed with {c}",
                    d.id
                );
            }
        }
    }

    #[test]
    fn ids_are_unique() {
        let mut seen = HashSet::new();
        for d in all_criteria() {
            assert!(seen.insert(d.id), "duplicate id {}", d.id);
        }
    }

    #[test]
    fn every_criterion_has_signals_and_templates() {
        for d in all_criteria() {
            assert!(!d.signals.is_empty(), "{} has no signals", d.id);
            assert!(!d.testing_method.is_empty(), "{} has no testing method", d.id);
            assert!(!d.done_when.is_empty(), "{} has no done-when", d.id);
        }
    }

    #[test]
    fn phrases_are_lowercase_and_non_empty() {
        for d in all_criteria() {
            for s in d.signals {
                if let SignalSource::Phrase { phrases, .. } = s.source {
                    assert!(!phrases.is_empty(), "{} has an empty phrase list", d.id);
                    for p in phrases {
                        assert!(!p.trim().is_empty());
                        assert_eq!(*p, p.to_lowercase(), "phrase '{p}' in {} is not lowercase", d.id);
                    }
                }
            }
        }
    }

    #[test]
    fn attachment_kinds_are_owned_by_one_criterion_per_category() {
        for &c in Category::all() {
            let mut owner: Vec<(AttachmentKind, &str)> = Vec::new();
            for d in criteria_for(c) {
                for s in d.signals {
                    let SignalSource::Attachment { kinds } = s.source else {
                        continue;
                    };
                    for &k in kinds {
                        if let Some((_, other)) = owner.iter().find(|(o, id)| *o == k && *id != d.id) {
                            panic!("{k} attachments count for both {other} and {}", d.id);
                        }
                        owner.push((k, d.id));
                    }
                }
            }
        }
    }

    #[test]
    fn find_by_id() {
        let d = find("bug_fix.root_cause").unwrap();
        assert_eq!(d.category, Category::BugFix);
        assert_eq!(d.text, "Root cause identified");
        assert!(find("bug_fix.nonexistent").is_none());
    }

    #[test]
    fn descriptor_serializes_signal_tags() {
        let d = find("release.notes").unwrap();
        let json = serde_json::to_string(d).unwrap();
        assert!(json.contains("\"type\":\"attachment\""));
        assert!(json.contains("\"release_notes\""));
    }
}
