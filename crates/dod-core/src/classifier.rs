use crate::rules::default_rules;
use crate::ticket::TicketSnapshot;
use crate::types::Category;
use serde::{Deserialize, Serialize};

/// Rule id recorded when no rule fires.
pub const FALLBACK_RULE: &str = "fallback_general_feature";

// ---------------------------------------------------------------------------
// Classification (output)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: Category,
    /// Id of the rule that produced the category.
    pub rule: String,
    /// Set when no rule fired and the category is the default.
    pub low_confidence: bool,
}

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// A fn-pointer rule. No heap allocation.
pub struct Rule {
    pub id: &'static str,
    pub condition: fn(&TicketSnapshot) -> bool,
    pub category: Category,
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

pub struct Classifier {
    rules: Vec<Rule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl Classifier {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Assign exactly one category. Rules are tried in order and the first
    /// match wins; with no match the ticket is a low-confidence general
    /// feature.
    pub fn classify(&self, ticket: &TicketSnapshot) -> Classification {
        for rule in &self.rules {
            if (rule.condition)(ticket) {
                tracing::debug!(ticket = %ticket.key, rule = rule.id, category = %rule.category, "classified");
                return Classification {
                    category: rule.category,
                    rule: rule.id.to_string(),
                    low_confidence: false,
                };
            }
        }

        tracing::debug!(ticket = %ticket.key, "no classification rule fired, using fallback");
        Classification {
            category: Category::GeneralFeature,
            rule: FALLBACK_RULE.to_string(),
            low_confidence: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::RawTicket;

    fn snapshot(description: &str) -> TicketSnapshot {
        TicketSnapshot::from_raw(RawTicket {
            key: "ES-1".into(),
            description: Some(description.into()),
            ..Default::default()
        })
    }

    #[test]
    fn empty_rule_set_falls_back() {
        let c = Classifier::new(Vec::new()).classify(&snapshot("anything"));
        assert_eq!(c.category, Category::GeneralFeature);
        assert_eq!(c.rule, FALLBACK_RULE);
        assert!(c.low_confidence);
    }

    #[test]
    fn first_matching_rule_wins() {
        let rules = vec![
            Rule {
                id: "never",
                condition: |_| false,
                category: Category::Rma,
            },
            Rule {
                id: "first",
                condition: |t| t.description.contains("x"),
                category: Category::ToolUpdate,
            },
            Rule {
                id: "second",
                condition: |_| true,
                category: Category::Release,
            },
        ];
        let c = Classifier::new(rules).classify(&snapshot("x"));
        assert_eq!(c.category, Category::ToolUpdate);
        assert_eq!(c.rule, "first");
        assert!(!c.low_confidence);
    }

    #[test]
    fn classification_json_shape() {
        let c = Classifier::default().classify(&snapshot(""));
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("\"category\":\"general_feature\""));
        assert!(json.contains("\"low_confidence\":true"));
    }
}
