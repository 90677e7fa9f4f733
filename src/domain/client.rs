use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::types::{
    ClientId, ClientName, CompanyName, EmailAddress, PhoneNumber, WorkspaceId,
};

text_enum!(
    /// Position of a client in the relationship lifecycle.
    ClientStatus {
        Lead => "lead",
        Active => "active",
        Paused => "paused",
        Churned => "churned",
    }
);

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Client {
    pub id: ClientId,
    pub workspace_id: WorkspaceId,
    pub name: ClientName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub company: Option<CompanyName>,
    pub status: ClientStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewClient {
    pub workspace_id: WorkspaceId,
    pub name: ClientName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub company: Option<CompanyName>,
    pub status: ClientStatus,
    pub notes: Option<String>,
}

impl NewClient {
    #[must_use]
    pub fn new(
        workspace_id: WorkspaceId,
        name: ClientName,
        email: Option<EmailAddress>,
        phone: Option<PhoneNumber>,
        company: Option<CompanyName>,
        status: ClientStatus,
        notes: Option<String>,
    ) -> Self {
        Self {
            workspace_id,
            name,
            email,
            phone,
            company,
            status,
            notes: clean_notes(notes),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateClient {
    pub name: ClientName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub company: Option<CompanyName>,
    pub status: ClientStatus,
    pub notes: Option<String>,
}

impl UpdateClient {
    #[must_use]
    pub fn new(
        name: ClientName,
        email: Option<EmailAddress>,
        phone: Option<PhoneNumber>,
        company: Option<CompanyName>,
        status: ClientStatus,
        notes: Option<String>,
    ) -> Self {
        Self {
            name,
            email,
            phone,
            company,
            status,
            notes: clean_notes(notes),
        }
    }
}

/// Free-form notes are sanitized and dropped when blank.
fn clean_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|s| ammonia::clean(&s).trim().to_string())
        .filter(|s| !s.is_empty())
}
