//! Diesel models for clients and their team assignments.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::client::{
    Client as DomainClient, ClientStatus, NewClient as DomainNewClient,
    UpdateClient as DomainUpdateClient,
};
use crate::domain::types::{
    ClientId, ClientName, CompanyName, EmailAddress, PhoneNumber, TypeConstraintError,
    WorkspaceId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::clients)]
/// Diesel model for [`crate::domain::client::Client`].
pub struct Client {
    pub id: i32,
    pub workspace_id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::clients)]
pub struct NewClient<'a> {
    pub workspace_id: i32,
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub company: Option<&'a str>,
    pub status: &'a str,
    pub notes: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::clients)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateClient<'a> {
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub company: Option<&'a str>,
    pub status: &'a str,
    pub notes: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable, Queryable)]
#[diesel(table_name = crate::schema::client_team)]
pub struct ClientTeam {
    pub client_id: i32,
    pub member_id: i32,
}

impl TryFrom<Client> for DomainClient {
    type Error = TypeConstraintError;

    fn try_from(client: Client) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ClientId::new(client.id)?,
            workspace_id: WorkspaceId::new(client.workspace_id)?,
            name: ClientName::new(client.name)?,
            email: client.email.map(EmailAddress::new).transpose()?,
            phone: client.phone.map(PhoneNumber::new).transpose()?,
            company: client.company.map(CompanyName::new).transpose()?,
            status: ClientStatus::try_from(client.status.as_str())?,
            notes: client.notes,
            created_at: client.created_at,
            updated_at: client.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewClient> for NewClient<'a> {
    fn from(client: &'a DomainNewClient) -> Self {
        Self {
            workspace_id: client.workspace_id.get(),
            name: client.name.as_str(),
            email: client.email.as_ref().map(EmailAddress::as_str),
            phone: client.phone.as_ref().map(PhoneNumber::as_str),
            company: client.company.as_ref().map(CompanyName::as_str),
            status: client.status.as_str(),
            notes: client.notes.as_deref(),
        }
    }
}

impl<'a> UpdateClient<'a> {
    pub fn from_domain(client: &'a DomainUpdateClient, updated_at: NaiveDateTime) -> Self {
        Self {
            name: client.name.as_str(),
            email: client.email.as_ref().map(EmailAddress::as_str),
            phone: client.phone.as_ref().map(PhoneNumber::as_str),
            company: client.company.as_ref().map(CompanyName::as_str),
            status: client.status.as_str(),
            notes: client.notes.as_deref(),
            updated_at,
        }
    }
}
