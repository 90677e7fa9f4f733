use serde::Deserialize;
use validator::Validate;

use crate::domain::client::{ClientStatus, NewClient, UpdateClient};
use crate::domain::types::{
    ClientName, CompanyName, EmailAddress, PhoneNumber, TeamMemberId, WorkspaceId,
};
use crate::forms::{FormError, non_blank};

/// Body of client create and update requests.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ClientForm {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub status: Option<ClientStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

pub struct ClientPayload {
    pub name: ClientName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub company: Option<CompanyName>,
    pub status: ClientStatus,
    pub notes: Option<String>,
}

impl TryFrom<ClientForm> for ClientPayload {
    type Error = FormError;

    fn try_from(form: ClientForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let name = ClientName::new(form.name).map_err(|_| FormError::InvalidName)?;
        let email = non_blank(form.email)
            .map(EmailAddress::new)
            .transpose()
            .map_err(|_| FormError::InvalidEmail)?;
        let phone = non_blank(form.phone)
            .map(PhoneNumber::new)
            .transpose()
            .map_err(|_| FormError::InvalidPhoneNumber)?;
        let company = non_blank(form.company).map(CompanyName::new).transpose()?;

        Ok(Self {
            name,
            email,
            phone,
            company,
            status: form.status.unwrap_or(ClientStatus::Lead),
            notes: form.notes,
        })
    }
}

impl ClientPayload {
    pub fn into_new(self, workspace_id: WorkspaceId) -> NewClient {
        NewClient::new(
            workspace_id,
            self.name,
            self.email,
            self.phone,
            self.company,
            self.status,
            self.notes,
        )
    }

    pub fn into_update(self) -> UpdateClient {
        UpdateClient::new(
            self.name,
            self.email,
            self.phone,
            self.company,
            self.status,
            self.notes,
        )
    }
}

/// Several clients created in one request.
#[derive(Debug, Deserialize)]
pub struct BulkClientsForm {
    pub clients: Vec<ClientForm>,
}

#[derive(Debug, Deserialize)]
pub struct AssignTeamForm {
    #[serde(default)]
    pub member_ids: Vec<i32>,
}

pub struct AssignTeamPayload {
    pub member_ids: Vec<TeamMemberId>,
}

impl TryFrom<AssignTeamForm> for AssignTeamPayload {
    type Error = FormError;

    fn try_from(form: AssignTeamForm) -> Result<Self, Self::Error> {
        let mut member_ids = form
            .member_ids
            .into_iter()
            .map(|id| TeamMemberId::new(id).map_err(|_| FormError::InvalidId))
            .collect::<Result<Vec<_>, _>>()?;
        member_ids.sort_unstable();
        member_ids.dedup();
        Ok(Self { member_ids })
    }
}

/// Query string of the client list.
#[derive(Debug, Default, Deserialize)]
pub struct ClientsQuery {
    pub search: Option<String>,
    pub status: Option<ClientStatus>,
    pub page: Option<usize>,
}
