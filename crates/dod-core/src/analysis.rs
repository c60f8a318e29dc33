use crate::classifier::Classifier;
use crate::error::Result;
use crate::evaluator::evaluate;
use crate::key::TicketKey;
use crate::report::{synthesize, AnalysisResult};
use crate::source::TicketSource;
use crate::ticket::TicketSnapshot;

/// Fetch `key` and analyze it. Retrieval errors propagate; nothing is
/// produced for a ticket that could not be read.
pub fn analyze_ticket(source: &dyn TicketSource, key: &TicketKey) -> Result<AnalysisResult> {
    let mut raw = source.fetch(key)?;
    if raw.key.trim().is_empty() {
        raw.key = key.to_string();
    }
    Ok(analyze(&TicketSnapshot::from_raw(raw)))
}

/// Run the full pipeline on one snapshot: classify, evaluate the category's
/// checklist, synthesize the report.
pub fn analyze(ticket: &TicketSnapshot) -> AnalysisResult {
    analyze_with(&Classifier::default(), ticket)
}

pub fn analyze_with(classifier: &Classifier, ticket: &TicketSnapshot) -> AnalysisResult {
    let classification = classifier.classify(ticket);
    let verdicts = evaluate(classification.category, ticket);
    let mut result = synthesize(&ticket.key, classification, verdicts);
    result.parent = ticket.parent_label();
    result
}
