use crate::types::{AttachmentKind, LinkKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// RawTicket (input from a ticket source)
// ---------------------------------------------------------------------------

/// A ticket as delivered by a [`TicketSource`](crate::source::TicketSource),
/// before any normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTicket {
    pub key: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub issue_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub parent_summary: Option<String>,
    #[serde(default)]
    pub comments: Vec<RawComment>,
    #[serde(default)]
    pub attachments: Vec<RawAttachment>,
    #[serde(default)]
    pub links: Vec<RawLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawComment {
    #[serde(default)]
    pub author: Option<String>,
    pub body: String,
    #[serde(default)]
    pub created: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAttachment {
    pub filename: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLink {
    /// Relation as seen from this ticket, e.g. "is blocked by".
    pub relation: String,
    pub key: String,
}

// ---------------------------------------------------------------------------
// TicketSnapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub author: Option<String>,
    pub body: String,
    pub created: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attachment {
    pub name: String,
    pub mime_type: String,
    pub kind: AttachmentKind,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct LinkRef {
    pub key: String,
    pub relation: String,
    pub kind: LinkKind,
}

/// Normalized, read-only view of one ticket. Built once per analysis run by
/// [`TicketSnapshot::from_raw`]; everything derived from it lives elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketSnapshot {
    pub key: String,
    pub summary: String,
    pub type_label: Option<String>,
    pub description: String,
    pub status: Option<String>,
    pub parent: Option<String>,
    pub parent_summary: Option<String>,
    pub comments: Vec<Comment>,
    pub attachments: Vec<Attachment>,
    pub links: BTreeSet<LinkRef>,
}

impl TicketSnapshot {
    pub fn from_raw(raw: RawTicket) -> Self {
        let mut comments: Vec<Comment> = raw
            .comments
            .into_iter()
            .filter(|c| !c.body.trim().is_empty())
            .map(|c| Comment {
                author: non_blank(c.author),
                body: c.body.trim().to_string(),
                created: c.created.as_deref().and_then(parse_timestamp),
            })
            .collect();
        // Undated comments keep their relative order after the dated ones.
        comments.sort_by_key(|c| (c.created.is_none(), c.created));

        let attachments = raw
            .attachments
            .into_iter()
            .filter(|a| !a.filename.trim().is_empty())
            .map(|a| {
                let name = a.filename.trim().to_string();
                let mime_type = non_blank(a.mime_type).unwrap_or_else(|| {
                    mime_guess::from_path(&name)
                        .first_raw()
                        .unwrap_or("application/octet-stream")
                        .to_string()
                });
                let kind = AttachmentKind::infer(&name, &mime_type);
                Attachment {
                    name,
                    mime_type,
                    kind,
                }
            })
            .collect();

        let links = raw
            .links
            .into_iter()
            .filter(|l| !l.key.trim().is_empty())
            .map(|l| LinkRef {
                key: l.key.trim().to_string(),
                kind: LinkKind::from_relation(&l.relation),
                relation: l.relation.trim().to_ascii_lowercase(),
            })
            .collect();

        TicketSnapshot {
            key: raw.key.trim().to_string(),
            summary: raw.summary.trim().to_string(),
            type_label: non_blank(raw.issue_type),
            description: raw.description.unwrap_or_default().trim().to_string(),
            status: non_blank(raw.status),
            parent_summary: raw.parent.as_ref().and(non_blank(raw.parent_summary)),
            parent: non_blank(raw.parent),
            comments,
            attachments,
            links,
        }
    }

    /// Parent ticket as `KEY - summary`, or just the key when the summary
    /// is unknown.
    pub fn parent_label(&self) -> Option<String> {
        let key = self.parent.as_deref()?;
        Some(match &self.parent_summary {
            Some(summary) => format!("{key} - {summary}"),
            None => key.to_string(),
        })
    }

    pub fn attachments_of<'a>(
        &'a self,
        kinds: &'a [AttachmentKind],
    ) -> impl Iterator<Item = (usize, &'a Attachment)> + 'a {
        self.attachments
            .iter()
            .enumerate()
            .filter(move |(_, a)| kinds.contains(&a.kind))
    }

    pub fn links_of(&self, kind: LinkKind) -> impl Iterator<Item = &LinkRef> + '_ {
        self.links.iter().filter(move |l| l.kind == kind)
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Accepts RFC 3339 and the tracker's `2024-03-01T10:15:00.000+0000` form.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawTicket {
        RawTicket {
            key: " ES-1 ".into(),
            summary: "Crash on boot".into(),
            issue_type: Some("  Bug ".into()),
            description: Some("  root cause: null pointer \n".into()),
            status: Some("".into()),
            ..Default::default()
        }
    }

    #[test]
    fn trims_fields_and_drops_blanks() {
        let snap = TicketSnapshot::from_raw(raw());
        assert_eq!(snap.key, "ES-1");
        assert_eq!(snap.type_label.as_deref(), Some("Bug"));
        assert_eq!(snap.description, "root cause: null pointer");
        assert!(snap.status.is_none());
    }

    #[test]
    fn parent_label_includes_summary_when_known() {
        let mut r = raw();
        assert!(TicketSnapshot::from_raw(r.clone()).parent_label().is_none());

        r.parent = Some("ES-1200".into());
        assert_eq!(
            TicketSnapshot::from_raw(r.clone()).parent_label().as_deref(),
            Some("ES-1200")
        );

        r.parent_summary = Some(" Platform bring-up ".into());
        assert_eq!(
            TicketSnapshot::from_raw(r).parent_label().as_deref(),
            Some("ES-1200 - Platform bring-up")
        );
    }

    #[test]
    fn missing_description_is_empty() {
        let mut r = raw();
        r.description = None;
        assert_eq!(TicketSnapshot::from_raw(r).description, "");
    }

    #[test]
    fn comments_sorted_by_creation_and_blank_dropped() {
        let mut r = raw();
        r.comments = vec![
            RawComment {
                author: Some("b".into()),
                body: "second".into(),
                created: Some("2024-03-02T10:00:00.000+0000".into()),
            },
            RawComment {
                author: None,
                body: "   ".into(),
                created: None,
            },
            RawComment {
                author: None,
                body: "undated".into(),
                created: None,
            },
            RawComment {
                author: Some("a".into()),
                body: "first".into(),
                created: Some("2024-03-01T10:00:00Z".into()),
            },
        ];
        let snap = TicketSnapshot::from_raw(r);
        let bodies: Vec<&str> = snap.comments.iter().map(|c| c.body.as_str()).collect();
        assert_eq!(bodies, ["first", "second", "undated"]);
    }

    #[test]
    fn attachment_mime_guessed_when_missing() {
        let mut r = raw();
        r.attachments = vec![
            RawAttachment {
                filename: "screen.png".into(),
                mime_type: None,
            },
            RawAttachment {
                filename: "boot.log".into(),
                mime_type: Some("text/plain".into()),
            },
        ];
        let snap = TicketSnapshot::from_raw(r);
        assert_eq!(snap.attachments[0].mime_type, "image/png");
        assert_eq!(snap.attachments[0].kind, AttachmentKind::Screenshot);
        assert_eq!(snap.attachments[1].kind, AttachmentKind::Log);
    }

    #[test]
    fn links_deduplicated_and_ordered() {
        let mut r = raw();
        r.links = vec![
            RawLink {
                relation: "relates to".into(),
                key: "ES-9".into(),
            },
            RawLink {
                relation: "Is Caused By".into(),
                key: "ES-3".into(),
            },
            RawLink {
                relation: "relates to".into(),
                key: "ES-9".into(),
            },
        ];
        let snap = TicketSnapshot::from_raw(r);
        let keys: Vec<&str> = snap.links.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, ["ES-3", "ES-9"]);
        assert_eq!(snap.links_of(LinkKind::CausedBy).count(), 1);
    }

    #[test]
    fn timestamp_formats() {
        assert!(parse_timestamp("2024-03-01T10:15:00.000+0000").is_some());
        assert!(parse_timestamp("2024-03-01T10:15:00+01:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
