//! Plain-text report rendering and the optional narrator hook.

use crate::error::Result;
use crate::report::AnalysisResult;
use crate::types::Outcome;
use std::fmt::Write;

pub const SEPARATOR_WIDTH: usize = 50;

pub const SECTIONS: [&str; 4] = [
    "Ticket Type",
    "DoD Analysis",
    "Proposed Acceptance Criteria",
    "Missing Information",
];

/// Produces the prose body of the DoD Analysis section.
///
/// Implementations may be slow or unavailable; [`compose`] falls back to the
/// templated narrative on any error.
pub trait Narrator {
    fn narrate(&self, result: &AnalysisResult) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub text: String,
    /// True when the DoD Analysis section came from a narrator.
    pub polished: bool,
}

fn separator() -> String {
    "=".repeat(SEPARATOR_WIDTH)
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "**{title}:**");
}

/// Templated DoD Analysis body: verdicts grouped by outcome.
pub fn templated_narrative(result: &AnalysisResult) -> String {
    let mut out = String::new();
    for group in &result.narrative {
        let _ = writeln!(out, "{} ({}):", group.outcome.heading(), group.entries.len());
        if group.entries.is_empty() {
            out.push_str("  - none\n");
        }
        for entry in &group.entries {
            match (&group.outcome, &entry.evidence) {
                (Outcome::Satisfied, Some(evidence)) => {
                    let _ = writeln!(out, "  - {} (evidence: {evidence})", entry.text);
                }
                _ => {
                    let _ = writeln!(out, "  - {}", entry.text);
                }
            }
        }
    }
    out
}

/// Render the four-section console report.
///
/// `narrative_override` replaces the templated DoD Analysis body when set.
pub fn render_report(result: &AnalysisResult, narrative_override: Option<&str>) -> String {
    let mut out = String::new();
    let sep = separator();

    let _ = writeln!(out, "{sep}");
    let _ = writeln!(out, "Analysis of {}", result.ticket);
    let _ = writeln!(out, "{sep}");

    heading(&mut out, SECTIONS[0]);
    let _ = write!(out, "{}", result.category().label());
    if result.classification.low_confidence {
        out.push_str(" (low confidence)");
    }
    let _ = writeln!(
        out,
        " [rule: {}, catalog {}]",
        result.classification.rule, result.catalog_version
    );
    out.push('\n');

    heading(&mut out, SECTIONS[1]);
    match narrative_override {
        Some(text) => {
            out.push_str(text.trim_end());
            out.push('\n');
        }
        None => out.push_str(&templated_narrative(result)),
    }
    out.push('\n');

    heading(&mut out, SECTIONS[2]);
    for (i, ac) in result.acceptance_criteria.iter().enumerate() {
        let _ = writeln!(out, "{}. {} [{}]", i + 1, ac.title, ac.status);
        let _ = writeln!(out, "   - Testing method: {}", ac.testing_method);
        let _ = writeln!(out, "   - Done when: {}", ac.done_when);
    }
    out.push('\n');

    heading(&mut out, SECTIONS[3]);
    if result.missing_information.is_empty() {
        out.push_str("- None\n");
    }
    for item in &result.missing_information {
        let _ = writeln!(out, "- {}", item.message);
    }

    let _ = writeln!(out, "{sep}");
    out
}

/// Render with an optional narrator, falling back to the templated text.
pub fn compose(result: &AnalysisResult, narrator: Option<&dyn Narrator>) -> RenderedReport {
    let Some(narrator) = narrator else {
        return RenderedReport {
            text: render_report(result, None),
            polished: false,
        };
    };

    match narrator.narrate(result) {
        Ok(prose) if !prose.trim().is_empty() => RenderedReport {
            text: render_report(result, Some(&prose)),
            polished: true,
        },
        Ok(_) => {
            tracing::warn!(ticket = %result.ticket, "narrator returned empty text, using templated analysis");
            RenderedReport {
                text: render_report(result, None),
                polished: false,
            }
        }
        Err(e) => {
            tracing::warn!(ticket = %result.ticket, error = %e, "narrator failed, using templated analysis");
            RenderedReport {
                text: render_report(result, None),
                polished: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::error::DodError;
    use crate::ticket::{RawAttachment, RawTicket, TicketSnapshot};

    fn result() -> AnalysisResult {
        analyze(&TicketSnapshot::from_raw(RawTicket {
            key: "ES-1281".into(),
            issue_type: Some("Bug".into()),
            description: Some("root cause: null pointer".into()),
            attachments: vec![RawAttachment {
                filename: "boot.log".into(),
                mime_type: None,
            }],
            ..Default::default()
        }))
    }

    struct Fixed(&'static str);

    impl Narrator for Fixed {
        fn narrate(&self, _: &AnalysisResult) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Down;

    impl Narrator for Down {
        fn narrate(&self, _: &AnalysisResult) -> Result<String> {
            Err(DodError::FormattingBackendUnavailable("connection refused".into()))
        }
    }

    #[test]
    fn sections_appear_in_order() {
        let text = render_report(&result(), None);
        let positions: Vec<usize> = SECTIONS
            .iter()
            .map(|s| text.find(&format!("**{s}:**")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(text.starts_with(&"=".repeat(50)));
        assert!(text.contains("Analysis of ES-1281"));
        assert!(text.trim_end().ends_with(&"=".repeat(50)));
    }

    #[test]
    fn ticket_type_line_names_rule_and_catalog() {
        let text = render_report(&result(), None);
        assert!(text.contains("Bug Fix [rule: label_bug_fix, catalog 2025.2]"));
        assert!(!text.contains("low confidence"));
    }

    #[test]
    fn acceptance_criteria_are_numbered_with_methods() {
        let text = render_report(&result(), None);
        assert!(text.contains("2. Root cause identified [satisfied]"));
        assert!(text.contains("   - Testing method: "));
        assert!(text.contains("   - Done when: "));
    }

    #[test]
    fn templated_narrative_cites_evidence() {
        let text = templated_narrative(&result());
        assert!(text.contains("Satisfied (2):"));
        assert!(text.contains("Root cause identified (evidence: description)"));
        assert!(text.contains("Issue reproduced (evidence: attachment[1] boot.log)"));
    }

    #[test]
    fn narrator_text_replaces_analysis_body() {
        let r = compose(&result(), Some(&Fixed("The fix is well documented.")));
        assert!(r.polished);
        assert!(r.text.contains("The fix is well documented."));
        assert!(!r.text.contains("Satisfied (2):"));
        assert!(r.text.contains("**Proposed Acceptance Criteria:**"));
    }

    #[test]
    fn failing_narrator_falls_back() {
        let r = compose(&result(), Some(&Down));
        assert!(!r.polished);
        assert_eq!(r.text, render_report(&result(), None));
    }

    #[test]
    fn empty_narration_falls_back() {
        let r = compose(&result(), Some(&Fixed("   ")));
        assert!(!r.polished);
    }

    #[test]
    fn no_narrator_is_templated() {
        let r = compose(&result(), None);
        assert!(!r.polished);
        assert!(r.text.contains("Satisfied (2):"));
    }
}
