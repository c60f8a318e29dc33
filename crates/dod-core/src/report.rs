use crate::catalog::{CriterionDescriptor, CATALOG_VERSION};
use crate::classifier::Classification;
use crate::evaluator::Verdict;
use crate::types::{Category, Outcome};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptanceCriterion {
    pub criterion: &'static str,
    pub title: &'static str,
    pub testing_method: &'static str,
    pub done_when: &'static str,
    pub status: Outcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingKind {
    /// No classification rule fired; the category is a default.
    LowConfidenceClassification,
    /// The fields a criterion inspects are empty.
    NoEvidenceSource,
    /// The fields were inspected and held no matching evidence.
    NoMatchingEvidence,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingItem {
    pub kind: MissingKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criterion: Option<&'static str>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrativeEntry {
    pub criterion: &'static str,
    pub text: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrativeGroup {
    pub outcome: Outcome,
    pub entries: Vec<NarrativeEntry>,
}

/// Terminal artifact of one analysis. Contains nothing time- or
/// environment-dependent: identical input serializes identically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub ticket: String,
    /// Parent epic as `KEY - summary`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub catalog_version: &'static str,
    pub classification: Classification,
    pub verdicts: Vec<Verdict>,
    pub acceptance_criteria: Vec<AcceptanceCriterion>,
    /// Always three groups: satisfied, unsatisfied, indeterminate.
    pub narrative: Vec<NarrativeGroup>,
    pub missing_information: Vec<MissingItem>,
}

impl AnalysisResult {
    pub fn category(&self) -> Category {
        self.classification.category
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.verdicts.iter().filter(|v| v.outcome == outcome).count()
    }

    pub fn verdict(&self, criterion: &str) -> Option<&Verdict> {
        self.verdicts.iter().find(|v| v.descriptor.id == criterion)
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

fn signal_summary(d: &CriterionDescriptor) -> String {
    let parts: Vec<&str> = d.signals.iter().map(|s| s.description).collect();
    let joiner = match d.requirement {
        crate::catalog::Requirement::Any => " or ",
        crate::catalog::Requirement::All => " and ",
    };
    parts.join(joiner)
}

fn low_confidence_item(category: Category) -> MissingItem {
    MissingItem {
        kind: MissingKind::LowConfidenceClassification,
        criterion: None,
        message: format!(
            "Ticket type could not be determined from the issue type, summary or description; \
             assumed '{}'. Set an explicit issue type to select the right checklist.",
            category.label()
        ),
    }
}

fn missing_for(v: &Verdict) -> Option<MissingItem> {
    let d = v.descriptor;
    match v.outcome {
        Outcome::Satisfied => None,
        Outcome::Indeterminate => Some(MissingItem {
            kind: MissingKind::NoEvidenceSource,
            criterion: Some(d.id),
            message: format!(
                "{}: nothing on the ticket to verify it (needs {})",
                d.text,
                signal_summary(d)
            ),
        }),
        Outcome::Unsatisfied => Some(MissingItem {
            kind: MissingKind::NoMatchingEvidence,
            criterion: Some(d.id),
            message: format!("{}: no evidence found (looked for {})", d.text, signal_summary(d)),
        }),
    }
}

// ---------------------------------------------------------------------------
// Synthesis
// ---------------------------------------------------------------------------

/// Turn a classification and its verdicts into the final report.
///
/// Verdicts for criteria outside the classified category are dropped.
pub fn synthesize(
    ticket: &str,
    classification: Classification,
    mut verdicts: Vec<Verdict>,
) -> AnalysisResult {
    verdicts.retain(|v| {
        let keep = v.descriptor.category == classification.category;
        if !keep {
            tracing::warn!(
                ticket,
                criterion = v.descriptor.id,
                category = %classification.category,
                "dropping verdict from another category"
            );
        }
        keep
    });

    let acceptance_criteria = verdicts
        .iter()
        .map(|v| AcceptanceCriterion {
            criterion: v.descriptor.id,
            title: v.descriptor.text,
            testing_method: v.descriptor.testing_method,
            done_when: v.descriptor.done_when,
            status: v.outcome,
        })
        .collect();

    let narrative = Outcome::all()
        .iter()
        .map(|&outcome| NarrativeGroup {
            outcome,
            entries: verdicts
                .iter()
                .filter(|v| v.outcome == outcome)
                .map(|v| NarrativeEntry {
                    criterion: v.descriptor.id,
                    text: v.descriptor.text,
                    evidence: v.evidence.as_ref().map(|e| e.to_string()),
                })
                .collect(),
        })
        .collect();

    let mut missing_information = Vec::new();
    if classification.low_confidence {
        missing_information.push(low_confidence_item(classification.category));
    }
    missing_information.extend(verdicts.iter().filter_map(missing_for));

    AnalysisResult {
        ticket: ticket.to_string(),
        parent: None,
        catalog_version: CATALOG_VERSION,
        classification,
        verdicts,
        acceptance_criteria,
        narrative,
        missing_information,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
