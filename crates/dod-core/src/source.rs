use crate::error::{DodError, Result};
use crate::key::TicketKey;
use crate::ticket::RawTicket;
use std::cell::RefCell;
use std::collections::HashMap;

/// Where tickets come from. Implemented by [`JiraClient`](crate::jira::JiraClient).
pub trait TicketSource {
    fn fetch(&self, key: &TicketKey) -> Result<RawTicket>;

    /// Post `body` as a new comment on the ticket.
    fn add_comment(&self, key: &TicketKey, body: &str) -> Result<()>;
}

/// In-memory source for tests and offline use. Posted comments are recorded,
/// not applied to the stored tickets.
#[derive(Debug, Default)]
pub struct MemorySource {
    tickets: HashMap<String, RawTicket>,
    posted: RefCell<Vec<(String, String)>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ticket: RawTicket) {
        self.tickets.insert(ticket.key.clone(), ticket);
    }

    pub fn posted(&self) -> Vec<(String, String)> {
        self.posted.borrow().clone()
    }
}

impl TicketSource for MemorySource {
    fn fetch(&self, key: &TicketKey) -> Result<RawTicket> {
        self.tickets
            .get(key.as_str())
            .cloned()
            .ok_or_else(|| DodError::TicketNotFound(key.to_string()))
    }

    fn add_comment(&self, key: &TicketKey, body: &str) -> Result<()> {
        if !self.tickets.contains_key(key.as_str()) {
            return Err(DodError::TicketNotFound(key.to_string()));
        }
        self.posted
            .borrow_mut()
            .push((key.to_string(), body.to_string()));
        Ok(())
    }
}
