//! Reader/writer traits over the agency dataset and their Diesel implementation.
//!
//! Every tenant-owned lookup takes the caller's [`WorkspaceId`]; a row that
//! belongs to another workspace is reported exactly like a missing one.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::db::{DbConnection, DbPool};
use crate::domain::campaign::{Campaign, CampaignStatus, NewCampaign};
use crate::domain::client::{Client, ClientStatus, NewClient, UpdateClient};
use crate::domain::deliverable::{
    Deliverable, DeliverableStatus, NewDeliverable, UpdateDeliverable,
};
use crate::domain::invitation::{Invitation, NewInvitation};
use crate::domain::invoice::{Invoice, InvoiceItem, InvoiceStatus, NewInvoice, PaymentMethod};
use crate::domain::messaging::{
    Channel, ChannelMember, ChannelSummary, Message, MessageDraft, NewChannel, NewMessage,
};
use crate::domain::package::{NewPackageAllocation, PackageAllocation};
use crate::domain::team_member::{NewTeamMember, TeamMember, UpdateTeamMember};
use crate::domain::types::{
    CampaignId, ChannelId, ClientId, DeliverableId, EmailAddress, InvitationId, InvoiceId,
    MessageBody, MessageId, PositiveAmount, TeamMemberId, WorkspaceId, WorkspaceName,
};
use crate::domain::wallet::{ClientWallet, WalletMovement, WalletTransaction};
use crate::domain::workspace::Workspace;
use crate::repository::errors::RepositoryResult;

pub mod campaign;
pub mod client;
pub mod deliverable;
pub mod errors;
pub mod invoice;
pub mod messaging;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod team;
pub mod wallet;
pub mod workspace;

/// Diesel-backed repository shared by every trait below.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        i64::try_from((self.page.max(1) - 1) * self.per_page).unwrap_or(i64::MAX)
    }

    pub fn limit(&self) -> i64 {
        i64::try_from(self.per_page).unwrap_or(i64::MAX)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientListQuery {
    pub workspace_id: WorkspaceId,
    pub search: Option<String>,
    pub status: Option<ClientStatus>,
    /// Restricts the list to clients assigned to this member.
    pub member_id: Option<TeamMemberId>,
    pub pagination: Option<Pagination>,
}

impl ClientListQuery {
    pub fn new(workspace_id: WorkspaceId) -> Self {
        Self {
            workspace_id,
            search: None,
            status: None,
            member_id: None,
            pagination: None,
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn status(mut self, status: ClientStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn member(mut self, member_id: TeamMemberId) -> Self {
        self.member_id = Some(member_id);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeliverableListQuery {
    pub workspace_id: WorkspaceId,
    pub client_id: Option<ClientId>,
    pub assignee_id: Option<TeamMemberId>,
    pub status: Option<DeliverableStatus>,
    /// Only deliverables of clients assigned to this member.
    pub visible_to: Option<TeamMemberId>,
}

impl DeliverableListQuery {
    pub fn new(workspace_id: WorkspaceId) -> Self {
        Self {
            workspace_id,
            client_id: None,
            assignee_id: None,
            status: None,
            visible_to: None,
        }
    }

    pub fn client(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn assignee(mut self, member_id: TeamMemberId) -> Self {
        self.assignee_id = Some(member_id);
        self
    }

    pub fn status(mut self, status: DeliverableStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn visible_to(mut self, member_id: TeamMemberId) -> Self {
        self.visible_to = Some(member_id);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CampaignListQuery {
    pub workspace_id: WorkspaceId,
    pub client_id: Option<ClientId>,
    pub status: Option<CampaignStatus>,
}

impl CampaignListQuery {
    pub fn new(workspace_id: WorkspaceId) -> Self {
        Self {
            workspace_id,
            client_id: None,
            status: None,
        }
    }

    pub fn client(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn status(mut self, status: CampaignStatus) -> Self {
        self.status = Some(status);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceListQuery {
    pub workspace_id: WorkspaceId,
    pub client_id: Option<ClientId>,
    pub status: Option<InvoiceStatus>,
}

impl InvoiceListQuery {
    pub fn new(workspace_id: WorkspaceId) -> Self {
        Self {
            workspace_id,
            client_id: None,
            status: None,
        }
    }

    pub fn client(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn status(mut self, status: InvoiceStatus) -> Self {
        self.status = Some(status);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionListQuery {
    pub client_id: ClientId,
    pub pagination: Option<Pagination>,
}

impl TransactionListQuery {
    pub fn new(client_id: ClientId) -> Self {
        Self {
            client_id,
            pagination: None,
        }
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageListQuery {
    pub channel_id: ChannelId,
    /// Only messages older than this one.
    pub before: Option<MessageId>,
    pub limit: usize,
}

impl MessageListQuery {
    pub fn new(channel_id: ChannelId, limit: usize) -> Self {
        Self {
            channel_id,
            before: None,
            limit,
        }
    }

    pub fn before(mut self, message_id: MessageId) -> Self {
        self.before = Some(message_id);
        self
    }
}

/// What an offboarding migration moved to the new owner.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct MigrationReport {
    pub deliverables: usize,
    pub clients: usize,
}

pub trait WorkspaceReader {
    fn get_workspace(&self, id: WorkspaceId) -> RepositoryResult<Option<Workspace>>;
}

pub trait WorkspaceWriter {
    /// Returns the workspace, inserting it under `default_name` when missing.
    fn ensure_workspace(
        &self,
        id: WorkspaceId,
        default_name: &WorkspaceName,
    ) -> RepositoryResult<Workspace>;
    fn rename_workspace(&self, id: WorkspaceId, name: &WorkspaceName)
    -> RepositoryResult<Workspace>;
}

pub trait ClientReader {
    fn get_client_by_id(
        &self,
        id: ClientId,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<Option<Client>>;
    fn get_client_by_email(
        &self,
        email: &EmailAddress,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<Option<Client>>;
    fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)>;
    fn list_client_team(&self, client_id: ClientId) -> RepositoryResult<Vec<TeamMember>>;
    fn is_client_assigned(
        &self,
        client_id: ClientId,
        member_id: TeamMemberId,
    ) -> RepositoryResult<bool>;
}

pub trait ClientWriter {
    fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client>;
    fn create_clients(&self, new_clients: &[NewClient]) -> RepositoryResult<usize>;
    fn update_client(
        &self,
        id: ClientId,
        workspace_id: WorkspaceId,
        updates: &UpdateClient,
    ) -> RepositoryResult<Client>;
    fn delete_client(&self, id: ClientId, workspace_id: WorkspaceId) -> RepositoryResult<()>;
    /// Replaces the set of members assigned to the client.
    fn assign_client_team(
        &self,
        client_id: ClientId,
        member_ids: &[TeamMemberId],
    ) -> RepositoryResult<usize>;
}

pub trait TeamReader {
    fn get_member_by_id(
        &self,
        id: TeamMemberId,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<Option<TeamMember>>;
    fn get_member_by_email(
        &self,
        email: &EmailAddress,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<Option<TeamMember>>;
    fn list_members(&self, workspace_id: WorkspaceId) -> RepositoryResult<Vec<TeamMember>>;
}

pub trait TeamWriter {
    /// Inserts the member or refreshes the name of an existing one.
    fn sync_member(&self, member: &NewTeamMember) -> RepositoryResult<TeamMember>;
    /// Inserts the member or reactivates it with the given role.
    fn activate_member(&self, member: &NewTeamMember) -> RepositoryResult<TeamMember>;
    fn update_member(
        &self,
        id: TeamMemberId,
        workspace_id: WorkspaceId,
        updates: &UpdateTeamMember,
    ) -> RepositoryResult<TeamMember>;
    /// Moves open deliverables and client assignments, then deactivates `from`.
    fn migrate_member(
        &self,
        workspace_id: WorkspaceId,
        from: TeamMemberId,
        to: TeamMemberId,
    ) -> RepositoryResult<MigrationReport>;
}

pub trait InvitationReader {
    fn get_invitation_by_token(&self, token: &str) -> RepositoryResult<Option<Invitation>>;
    fn list_pending_invitations(
        &self,
        workspace_id: WorkspaceId,
        now: NaiveDateTime,
    ) -> RepositoryResult<Vec<Invitation>>;
}

pub trait InvitationWriter {
    /// Stores the invitation, replacing any pending one for the same email.
    fn create_invitation(&self, invitation: &NewInvitation) -> RepositoryResult<Invitation>;
    /// Marks the invitation accepted and activates the member atomically.
    fn accept_invitation(
        &self,
        id: InvitationId,
        member: &NewTeamMember,
        now: NaiveDateTime,
    ) -> RepositoryResult<TeamMember>;
    fn delete_invitation(&self, id: InvitationId, workspace_id: WorkspaceId)
    -> RepositoryResult<()>;
}

pub trait DeliverableReader {
    fn get_deliverable_by_id(
        &self,
        id: DeliverableId,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<Option<Deliverable>>;
    fn list_deliverables(&self, query: DeliverableListQuery) -> RepositoryResult<Vec<Deliverable>>;
    fn list_package_allocations(
        &self,
        client_id: ClientId,
    ) -> RepositoryResult<Vec<PackageAllocation>>;
}

pub trait DeliverableWriter {
    fn create_deliverable(&self, deliverable: &NewDeliverable) -> RepositoryResult<Deliverable>;
    fn update_deliverable(
        &self,
        id: DeliverableId,
        workspace_id: WorkspaceId,
        updates: &UpdateDeliverable,
    ) -> RepositoryResult<Deliverable>;
    fn delete_deliverable(&self, id: DeliverableId, workspace_id: WorkspaceId)
    -> RepositoryResult<()>;
    /// Changes the column and applies the package usage change in one transaction.
    fn move_deliverable(
        &self,
        id: DeliverableId,
        workspace_id: WorkspaceId,
        status: DeliverableStatus,
        now: NaiveDateTime,
    ) -> RepositoryResult<Deliverable>;
    fn set_package_allocation(
        &self,
        allocation: &NewPackageAllocation,
    ) -> RepositoryResult<PackageAllocation>;
}

pub trait CampaignReader {
    fn get_campaign_by_id(
        &self,
        id: CampaignId,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<Option<Campaign>>;
    fn list_campaigns(&self, query: CampaignListQuery) -> RepositoryResult<Vec<Campaign>>;
}

pub trait CampaignWriter {
    fn create_campaign(&self, campaign: &NewCampaign) -> RepositoryResult<Campaign>;
    fn update_campaign_status(
        &self,
        id: CampaignId,
        workspace_id: WorkspaceId,
        status: CampaignStatus,
    ) -> RepositoryResult<Campaign>;
    fn record_campaign_spend(
        &self,
        id: CampaignId,
        workspace_id: WorkspaceId,
        amount: PositiveAmount,
    ) -> RepositoryResult<Campaign>;
}

pub trait WalletReader {
    fn get_wallet(&self, client_id: ClientId) -> RepositoryResult<Option<ClientWallet>>;
    fn list_wallets(&self, workspace_id: WorkspaceId) -> RepositoryResult<Vec<ClientWallet>>;
    /// Newest first.
    fn list_wallet_transactions(
        &self,
        query: TransactionListQuery,
    ) -> RepositoryResult<(usize, Vec<WalletTransaction>)>;
}

pub trait WalletWriter {
    /// Appends a ledger row and updates the stored balance atomically.
    fn apply_wallet_movement(
        &self,
        workspace_id: WorkspaceId,
        movement: &WalletMovement,
        now: NaiveDateTime,
    ) -> RepositoryResult<WalletTransaction>;
}

pub trait InvoiceReader {
    fn get_invoice_by_id(
        &self,
        id: InvoiceId,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<Option<Invoice>>;
    fn list_invoice_items(&self, invoice_id: InvoiceId) -> RepositoryResult<Vec<InvoiceItem>>;
    fn list_invoices(&self, query: InvoiceListQuery) -> RepositoryResult<Vec<Invoice>>;
}

pub trait InvoiceWriter {
    /// Numbers the invoice within its workspace and stores it with its items.
    fn create_invoice(&self, invoice: &NewInvoice) -> RepositoryResult<Invoice>;
    fn set_invoice_status(
        &self,
        id: InvoiceId,
        workspace_id: WorkspaceId,
        status: InvoiceStatus,
    ) -> RepositoryResult<Invoice>;
    /// Marks the invoice paid, debiting the wallet first when asked to.
    fn pay_invoice(
        &self,
        id: InvoiceId,
        workspace_id: WorkspaceId,
        method: PaymentMethod,
        now: NaiveDateTime,
    ) -> RepositoryResult<Invoice>;
    /// Flags sent invoices past due; `None` sweeps every workspace.
    fn mark_overdue_invoices(
        &self,
        workspace_id: Option<WorkspaceId>,
        today: NaiveDate,
    ) -> RepositoryResult<usize>;
}

pub trait MessagingReader {
    fn get_channel_by_id(
        &self,
        id: ChannelId,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<Option<Channel>>;
    fn find_direct_channel(
        &self,
        workspace_id: WorkspaceId,
        name: &str,
    ) -> RepositoryResult<Option<Channel>>;
    fn list_member_channels(
        &self,
        workspace_id: WorkspaceId,
        member_id: TeamMemberId,
    ) -> RepositoryResult<Vec<ChannelSummary>>;
    fn get_channel_member(
        &self,
        channel_id: ChannelId,
        member_id: TeamMemberId,
    ) -> RepositoryResult<Option<ChannelMember>>;
    fn list_channel_members(&self, channel_id: ChannelId) -> RepositoryResult<Vec<ChannelMember>>;
    fn get_message_by_id(
        &self,
        id: MessageId,
        channel_id: ChannelId,
    ) -> RepositoryResult<Option<Message>>;
    /// Newest first.
    fn list_messages(&self, query: MessageListQuery) -> RepositoryResult<Vec<Message>>;
    fn get_draft(
        &self,
        channel_id: ChannelId,
        member_id: TeamMemberId,
    ) -> RepositoryResult<Option<MessageDraft>>;
}

pub trait MessagingWriter {
    /// Creates the channel together with its initial members.
    fn create_channel(&self, channel: &NewChannel) -> RepositoryResult<Channel>;
    fn add_channel_member(
        &self,
        channel_id: ChannelId,
        member_id: TeamMemberId,
    ) -> RepositoryResult<()>;
    fn remove_channel_member(
        &self,
        channel_id: ChannelId,
        member_id: TeamMemberId,
    ) -> RepositoryResult<()>;
    /// Stores the message and clears the author's draft for the channel.
    fn create_message(&self, message: &NewMessage, now: NaiveDateTime)
    -> RepositoryResult<Message>;
    fn edit_message(
        &self,
        id: MessageId,
        body: &MessageBody,
        now: NaiveDateTime,
    ) -> RepositoryResult<Message>;
    fn delete_message(&self, id: MessageId, now: NaiveDateTime) -> RepositoryResult<Message>;
    /// Moves the cursor forward; returns `false` when it was already past `message_id`.
    fn advance_read_cursor(
        &self,
        channel_id: ChannelId,
        member_id: TeamMemberId,
        message_id: MessageId,
    ) -> RepositoryResult<bool>;
    fn save_draft(
        &self,
        channel_id: ChannelId,
        member_id: TeamMemberId,
        body: &str,
        now: NaiveDateTime,
    ) -> RepositoryResult<MessageDraft>;
    fn delete_draft(&self, channel_id: ChannelId, member_id: TeamMemberId)
    -> RepositoryResult<()>;
}
