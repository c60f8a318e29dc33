//! Jira REST v2 ticket source.
//!
//! Issues are read with one `GET /rest/api/2/issue/{key}` that asks only for
//! the fields the analysis needs; comments are posted with
//! `POST /rest/api/2/issue/{key}/comment`. Authentication is HTTP basic with
//! the account e-mail and an API token.

use crate::config::TrackerCredentials;
use crate::error::{DodError, Result};
use crate::key::TicketKey;
use crate::source::TicketSource;
use crate::ticket::{RawAttachment, RawComment, RawLink, RawTicket};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

pub const ISSUE_FIELDS: &str =
    "summary,description,issuetype,status,comment,attachment,issuelinks,parent";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct IssueResponse {
    key: String,
    #[serde(default)]
    fields: IssueFields,
}

#[derive(Debug, Default, Deserialize)]
struct IssueFields {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    issuetype: Option<Named>,
    #[serde(default)]
    status: Option<Named>,
    #[serde(default)]
    comment: Option<CommentPage>,
    #[serde(default)]
    attachment: Vec<WireAttachment>,
    #[serde(default)]
    issuelinks: Vec<WireLink>,
    #[serde(default)]
    parent: Option<ParentRef>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct CommentPage {
    #[serde(default)]
    comments: Vec<WireComment>,
}

#[derive(Debug, Deserialize)]
struct WireComment {
    #[serde(default)]
    author: Option<Author>,
    #[serde(default)]
    body: String,
    #[serde(default)]
    created: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Author {
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAttachment {
    filename: String,
    #[serde(default)]
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireLink {
    #[serde(rename = "type")]
    link_type: LinkType,
    #[serde(default)]
    inward_issue: Option<IssueRef>,
    #[serde(default)]
    outward_issue: Option<IssueRef>,
}

#[derive(Debug, Deserialize)]
struct LinkType {
    #[serde(default)]
    inward: String,
    #[serde(default)]
    outward: String,
}

#[derive(Debug, Deserialize)]
struct IssueRef {
    key: String,
}

/// The parent comes back with a trimmed-down `fields` object.
#[derive(Debug, Deserialize)]
struct ParentRef {
    key: String,
    #[serde(default)]
    fields: Option<ParentFields>,
}

#[derive(Debug, Deserialize)]
struct ParentFields {
    #[serde(default)]
    summary: Option<String>,
}

impl From<IssueResponse> for RawTicket {
    fn from(issue: IssueResponse) -> Self {
        let f = issue.fields;
        let links = f
            .issuelinks
            .into_iter()
            .filter_map(|l| match (l.inward_issue, l.outward_issue) {
                (Some(other), _) => Some(RawLink {
                    relation: l.link_type.inward,
                    key: other.key,
                }),
                (None, Some(other)) => Some(RawLink {
                    relation: l.link_type.outward,
                    key: other.key,
                }),
                (None, None) => None,
            })
            .collect();

        RawTicket {
            key: issue.key,
            summary: f.summary.unwrap_or_default(),
            issue_type: f.issuetype.map(|t| t.name),
            description: f.description,
            status: f.status.map(|s| s.name),
            parent_summary: f
                .parent
                .as_ref()
                .and_then(|p| p.fields.as_ref())
                .and_then(|pf| pf.summary.clone()),
            parent: f.parent.map(|p| p.key),
            comments: f
                .comment
                .unwrap_or_default()
                .comments
                .into_iter()
                .map(|c| RawComment {
                    author: c.author.and_then(|a| a.display_name),
                    body: c.body,
                    created: c.created,
                })
                .collect(),
            attachments: f
                .attachment
                .into_iter()
                .map(|a| RawAttachment {
                    filename: a.filename,
                    mime_type: a.mime_type,
                })
                .collect(),
            links,
        }
    }
}

// ---------------------------------------------------------------------------
// JiraClient
// ---------------------------------------------------------------------------

pub struct JiraClient {
    http: Client,
    server: String,
    email: String,
    token: String,
}

impl JiraClient {
    pub fn new(creds: &TrackerCredentials) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(creds.timeout_seconds))
            .user_agent(concat!("dod/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            server: creds.server.trim_end_matches('/').to_string(),
            email: creds.email.clone(),
            token: creds.token.clone(),
        })
    }

    fn issue_url(&self, key: &TicketKey) -> String {
        format!("{}/rest/api/2/issue/{}", self.server, key)
    }

    fn check(key: &TicketKey, resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().unwrap_or_default();
        tracing::debug!(ticket = %key, %status, body = %body, "tracker request failed");
        match status {
            StatusCode::NOT_FOUND => Err(DodError::TicketNotFound(key.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(
                DodError::AuthenticationFailure(format!("HTTP {status} while reading {key}")),
            ),
            _ => Err(DodError::Tracker(format!("HTTP {status} for {key}"))),
        }
    }
}

impl TicketSource for JiraClient {
    fn fetch(&self, key: &TicketKey) -> Result<RawTicket> {
        tracing::info!(ticket = %key, server = %self.server, "fetching ticket");
        let resp = self
            .http
            .get(self.issue_url(key))
            .query(&[("fields", ISSUE_FIELDS)])
            .basic_auth(&self.email, Some(&self.token))
            .header("Accept", "application/json")
            .send()?;
        let issue: IssueResponse = Self::check(key, resp)?
            .json()
            .map_err(|e| DodError::Tracker(format!("unreadable response for {key}: {e}")))?;
        Ok(issue.into())
    }

    fn add_comment(&self, key: &TicketKey, body: &str) -> Result<()> {
        tracing::info!(ticket = %key, "posting comment");
        let resp = self
            .http
            .post(format!("{}/comment", self.issue_url(key)))
            .basic_auth(&self.email, Some(&self.token))
            .json(&serde_json::json!({ "body": body }))
            .send()?;
        Self::check(key, resp)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
