//! Mock repository implementing every reader/writer trait, for service tests.

use chrono::{NaiveDate, NaiveDateTime};
use mockall::mock;

use crate::domain::campaign::{Campaign, CampaignStatus, NewCampaign};
use crate::domain::client::{Client, NewClient, UpdateClient};
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
use crate::repository::{
    CampaignListQuery, CampaignReader, CampaignWriter, ClientListQuery, ClientReader,
    ClientWriter, DeliverableListQuery, DeliverableReader, DeliverableWriter, InvitationReader,
    InvitationWriter, InvoiceListQuery, InvoiceReader, InvoiceWriter, MessageListQuery,
    MessagingReader, MessagingWriter, MigrationReport, TeamReader, TeamWriter,
    TransactionListQuery, WalletReader, WalletWriter, WorkspaceReader, WorkspaceWriter,
};

mock! {
    pub Repository {}

    impl WorkspaceReader for Repository {
        fn get_workspace(&self, id: WorkspaceId) -> RepositoryResult<Option<Workspace>>;
    }

    impl WorkspaceWriter for Repository {
        fn ensure_workspace(
            &self,
            id: WorkspaceId,
            default_name: &WorkspaceName,
        ) -> RepositoryResult<Workspace>;
        fn rename_workspace(
            &self,
            id: WorkspaceId,
            name: &WorkspaceName,
        ) -> RepositoryResult<Workspace>;
    }

    impl ClientReader for Repository {
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

    impl ClientWriter for Repository {
        fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client>;
        fn create_clients(&self, new_clients: &[NewClient]) -> RepositoryResult<usize>;
        fn update_client(
            &self,
            id: ClientId,
            workspace_id: WorkspaceId,
            updates: &UpdateClient,
        ) -> RepositoryResult<Client>;
        fn delete_client(&self, id: ClientId, workspace_id: WorkspaceId) -> RepositoryResult<()>;
        fn assign_client_team(
            &self,
            client_id: ClientId,
            member_ids: &[TeamMemberId],
        ) -> RepositoryResult<usize>;
    }

    impl TeamReader for Repository {
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

    impl TeamWriter for Repository {
        fn sync_member(&self, member: &NewTeamMember) -> RepositoryResult<TeamMember>;
        fn activate_member(&self, member: &NewTeamMember) -> RepositoryResult<TeamMember>;
        fn update_member(
            &self,
            id: TeamMemberId,
            workspace_id: WorkspaceId,
            updates: &UpdateTeamMember,
        ) -> RepositoryResult<TeamMember>;
        fn migrate_member(
            &self,
            workspace_id: WorkspaceId,
            from: TeamMemberId,
            to: TeamMemberId,
        ) -> RepositoryResult<MigrationReport>;
    }

    impl InvitationReader for Repository {
        fn get_invitation_by_token(&self, token: &str) -> RepositoryResult<Option<Invitation>>;
        fn list_pending_invitations(
            &self,
            workspace_id: WorkspaceId,
            now: NaiveDateTime,
        ) -> RepositoryResult<Vec<Invitation>>;
    }

    impl InvitationWriter for Repository {
        fn create_invitation(&self, invitation: &NewInvitation) -> RepositoryResult<Invitation>;
        fn accept_invitation(
            &self,
            id: InvitationId,
            member: &NewTeamMember,
            now: NaiveDateTime,
        ) -> RepositoryResult<TeamMember>;
        fn delete_invitation(
            &self,
            id: InvitationId,
            workspace_id: WorkspaceId,
        ) -> RepositoryResult<()>;
    }

    impl DeliverableReader for Repository {
        fn get_deliverable_by_id(
            &self,
            id: DeliverableId,
            workspace_id: WorkspaceId,
        ) -> RepositoryResult<Option<Deliverable>>;
        fn list_deliverables(
            &self,
            query: DeliverableListQuery,
        ) -> RepositoryResult<Vec<Deliverable>>;
        fn list_package_allocations(
            &self,
            client_id: ClientId,
        ) -> RepositoryResult<Vec<PackageAllocation>>;
    }

    impl DeliverableWriter for Repository {
        fn create_deliverable(&self, deliverable: &NewDeliverable) -> RepositoryResult<Deliverable>;
        fn update_deliverable(
            &self,
            id: DeliverableId,
            workspace_id: WorkspaceId,
            updates: &UpdateDeliverable,
        ) -> RepositoryResult<Deliverable>;
        fn delete_deliverable(
            &self,
            id: DeliverableId,
            workspace_id: WorkspaceId,
        ) -> RepositoryResult<()>;
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

    impl CampaignReader for Repository {
        fn get_campaign_by_id(
            &self,
            id: CampaignId,
            workspace_id: WorkspaceId,
        ) -> RepositoryResult<Option<Campaign>>;
        fn list_campaigns(&self, query: CampaignListQuery) -> RepositoryResult<Vec<Campaign>>;
    }

    impl CampaignWriter for Repository {
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

    impl WalletReader for Repository {
        fn get_wallet(&self, client_id: ClientId) -> RepositoryResult<Option<ClientWallet>>;
        fn list_wallets(&self, workspace_id: WorkspaceId) -> RepositoryResult<Vec<ClientWallet>>;
        fn list_wallet_transactions(
            &self,
            query: TransactionListQuery,
        ) -> RepositoryResult<(usize, Vec<WalletTransaction>)>;
    }

    impl WalletWriter for Repository {
        fn apply_wallet_movement(
            &self,
            workspace_id: WorkspaceId,
            movement: &WalletMovement,
            now: NaiveDateTime,
        ) -> RepositoryResult<WalletTransaction>;
    }

    impl InvoiceReader for Repository {
        fn get_invoice_by_id(
            &self,
            id: InvoiceId,
            workspace_id: WorkspaceId,
        ) -> RepositoryResult<Option<Invoice>>;
        fn list_invoice_items(&self, invoice_id: InvoiceId) -> RepositoryResult<Vec<InvoiceItem>>;
        fn list_invoices(&self, query: InvoiceListQuery) -> RepositoryResult<Vec<Invoice>>;
    }

    impl InvoiceWriter for Repository {
        fn create_invoice(&self, invoice: &NewInvoice) -> RepositoryResult<Invoice>;
        fn set_invoice_status(
            &self,
            id: InvoiceId,
            workspace_id: WorkspaceId,
            status: InvoiceStatus,
        ) -> RepositoryResult<Invoice>;
        fn pay_invoice(
            &self,
            id: InvoiceId,
            workspace_id: WorkspaceId,
            method: PaymentMethod,
            now: NaiveDateTime,
        ) -> RepositoryResult<Invoice>;
        fn mark_overdue_invoices(
            &self,
            workspace_id: Option<WorkspaceId>,
            today: NaiveDate,
        ) -> RepositoryResult<usize>;
    }

    impl MessagingReader for Repository {
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
        fn list_channel_members(
            &self,
            channel_id: ChannelId,
        ) -> RepositoryResult<Vec<ChannelMember>>;
        fn get_message_by_id(
            &self,
            id: MessageId,
            channel_id: ChannelId,
        ) -> RepositoryResult<Option<Message>>;
        fn list_messages(&self, query: MessageListQuery) -> RepositoryResult<Vec<Message>>;
        fn get_draft(
            &self,
            channel_id: ChannelId,
            member_id: TeamMemberId,
        ) -> RepositoryResult<Option<MessageDraft>>;
    }

    impl MessagingWriter for Repository {
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
        fn create_message(
            &self,
            message: &NewMessage,
            now: NaiveDateTime,
        ) -> RepositoryResult<Message>;
        fn edit_message(
            &self,
            id: MessageId,
            body: &MessageBody,
            now: NaiveDateTime,
        ) -> RepositoryResult<Message>;
        fn delete_message(&self, id: MessageId, now: NaiveDateTime) -> RepositoryResult<Message>;
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
        fn delete_draft(
            &self,
            channel_id: ChannelId,
            member_id: TeamMemberId,
        ) -> RepositoryResult<()>;
    }
}
