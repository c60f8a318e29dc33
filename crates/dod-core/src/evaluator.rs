use crate::catalog::{criteria_for, CriterionDescriptor, EvidenceSignal, Requirement, SignalSource};
use crate::ticket::TicketSnapshot;
use crate::types::{Category, Outcome, TextField};
use serde::{Serialize, Serializer};
use std::fmt;

// ---------------------------------------------------------------------------
// Evidence
// ---------------------------------------------------------------------------

/// Where on the ticket a satisfied criterion found its evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Evidence {
    Description,
    /// `index` is 1-based in snapshot comment order.
    Comment { index: usize, author: Option<String> },
    /// `index` is 1-based in snapshot attachment order.
    Attachment { index: usize, name: String },
    Link { key: String, relation: String },
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evidence::Description => f.write_str("description"),
            Evidence::Comment {
                index,
                author: Some(author),
            } => write!(f, "comment[{index}] by {author}"),
            Evidence::Comment { index, author: None } => write!(f, "comment[{index}]"),
            Evidence::Attachment { index, name } => write!(f, "attachment[{index}] {name}"),
            Evidence::Link { key, relation } => write!(f, "link {relation} {key}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    #[serde(rename = "criterion", serialize_with = "serialize_criterion")]
    pub descriptor: &'static CriterionDescriptor,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Evidence>,
}

#[derive(Serialize)]
struct CriterionRef {
    id: &'static str,
    ordinal: u32,
    text: &'static str,
}

fn serialize_criterion<S: Serializer>(
    d: &&'static CriterionDescriptor,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    CriterionRef {
        id: d.id,
        ordinal: d.ordinal,
        text: d.text,
    }
    .serialize(s)
}

// ---------------------------------------------------------------------------
// Signal probes
// ---------------------------------------------------------------------------

/// Result of looking for one signal on the ticket.
#[derive(Debug, Clone, PartialEq)]
enum Probe {
    Matched(Evidence),
    /// Something was there to search but nothing matched.
    Missed,
    /// Nothing to search.
    Empty,
}

fn contains_any(text: &str, phrases: &[&str]) -> bool {
    let lower = text.to_lowercase();
    phrases.iter().any(|p| lower.contains(p))
}

fn probe(signal: &EvidenceSignal, ticket: &TicketSnapshot) -> Probe {
    match signal.source {
        SignalSource::Attachment { kinds } => ticket
            .attachments_of(kinds)
            .next()
            .map(|(i, a)| {
                Probe::Matched(Evidence::Attachment {
                    index: i + 1,
                    name: a.name.clone(),
                })
            })
            .unwrap_or(Probe::Empty),
        SignalSource::Phrase { field, phrases } => {
            let mut searched = false;
            if matches!(field, TextField::Description | TextField::Any)
                && !ticket.description.is_empty()
            {
                searched = true;
                if contains_any(&ticket.description, phrases) {
                    return Probe::Matched(Evidence::Description);
                }
            }
            if matches!(field, TextField::Comments | TextField::Any) {
                for (i, c) in ticket.comments.iter().enumerate() {
                    searched = true;
                    if contains_any(&c.body, phrases) {
                        return Probe::Matched(Evidence::Comment {
                            index: i + 1,
                            author: c.author.clone(),
                        });
                    }
                }
            }
            if searched {
                Probe::Missed
            } else {
                Probe::Empty
            }
        }
        SignalSource::Link { kind } => ticket
            .links_of(kind)
            .next()
            .map(|l| {
                Probe::Matched(Evidence::Link {
                    key: l.key.clone(),
                    relation: l.relation.clone(),
                })
            })
            .unwrap_or(Probe::Empty),
    }
}

fn combine(requirement: Requirement, probes: Vec<Probe>) -> (Outcome, Option<Evidence>) {
    let any_missed = probes.iter().any(|p| *p == Probe::Missed);
    let all_matched = probes.iter().all(|p| matches!(p, Probe::Matched(_)));
    let first_evidence = probes.into_iter().find_map(|p| match p {
        Probe::Matched(e) => Some(e),
        _ => None,
    });

    let satisfied = match requirement {
        Requirement::Any => first_evidence.is_some(),
        Requirement::All => all_matched,
    };

    if satisfied {
        (Outcome::Satisfied, first_evidence)
    } else if any_missed {
        (Outcome::Unsatisfied, None)
    } else {
        (Outcome::Indeterminate, None)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Evaluate a single criterion. Depends only on the descriptor and the ticket.
pub fn evaluate_criterion(descriptor: &'static CriterionDescriptor, ticket: &TicketSnapshot) -> Verdict {
    let probes: Vec<Probe> = descriptor.signals.iter().map(|s| probe(s, ticket)).collect();
    tracing::trace!(criterion = descriptor.id, ?probes, "probed signals");
    let (outcome, evidence) = combine(descriptor.requirement, probes);
    tracing::debug!(criterion = descriptor.id, %outcome, "evaluated");
    Verdict {
        descriptor,
        outcome,
        evidence,
    }
}

/// One verdict per checklist item of `category`, in ordinal order.
pub fn evaluate(category: Category, ticket: &TicketSnapshot) -> Vec<Verdict> {
    criteria_for(category)
        .iter()
        .map(|d| evaluate_criterion(d, ticket))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
