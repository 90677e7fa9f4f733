//! Team members, invitations and offboarding migration.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel::upsert::excluded;

use crate::domain::deliverable::DeliverableStatus;
use crate::domain::invitation::{Invitation, NewInvitation};
use crate::domain::team_member::{NewTeamMember, TeamMember, UpdateTeamMember};
use crate::domain::types::{EmailAddress, InvitationId, TeamMemberId, WorkspaceId};
use crate::models::client::ClientTeam as DbClientTeam;
use crate::models::team_member::{
    Invitation as DbInvitation, NewInvitation as DbNewInvitation,
    NewTeamMember as DbNewTeamMember, TeamMember as DbTeamMember,
    UpdateTeamMember as DbUpdateTeamMember,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    DieselRepository, InvitationReader, InvitationWriter, MigrationReport, TeamReader, TeamWriter,
};

fn activate(conn: &mut SqliteConnection, member: &NewTeamMember) -> RepositoryResult<TeamMember> {
    use crate::schema::team_members;

    let row = diesel::insert_into(team_members::table)
        .values(&DbNewTeamMember::from(member))
        .on_conflict((team_members::workspace_id, team_members::email))
        .do_update()
        .set((
            team_members::name.eq(excluded(team_members::name)),
            team_members::role.eq(excluded(team_members::role)),
            team_members::is_active.eq(true),
        ))
        .get_result::<DbTeamMember>(conn)?;
    Ok(TeamMember::try_from(row)?)
}

impl TeamReader for DieselRepository {
    fn get_member_by_id(
        &self,
        id: TeamMemberId,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<Option<TeamMember>> {
        use crate::schema::team_members;

        let mut conn = self.conn()?;
        let row = team_members::table
            .filter(team_members::id.eq(id.get()))
            .filter(team_members::workspace_id.eq(workspace_id.get()))
            .first::<DbTeamMember>(&mut conn)
            .optional()?;

        row.map(TeamMember::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn get_member_by_email(
        &self,
        email: &EmailAddress,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<Option<TeamMember>> {
        use crate::schema::team_members;

        let mut conn = self.conn()?;
        let row = team_members::table
            .filter(team_members::email.eq(email.as_str()))
            .filter(team_members::workspace_id.eq(workspace_id.get()))
            .first::<DbTeamMember>(&mut conn)
            .optional()?;

        row.map(TeamMember::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_members(&self, workspace_id: WorkspaceId) -> RepositoryResult<Vec<TeamMember>> {
        use crate::schema::team_members;

        let mut conn = self.conn()?;
        let rows = team_members::table
            .filter(team_members::workspace_id.eq(workspace_id.get()))
            .order((team_members::name.asc(), team_members::id.asc()))
            .load::<DbTeamMember>(&mut conn)?;

        rows.into_iter()
            .map(|row| TeamMember::try_from(row).map_err(RepositoryError::from))
            .collect()
    }
}

impl TeamWriter for DieselRepository {
    fn sync_member(&self, member: &NewTeamMember) -> RepositoryResult<TeamMember> {
        use crate::schema::team_members;

        let mut conn = self.conn()?;
        let row = diesel::insert_into(team_members::table)
            .values(&DbNewTeamMember::from(member))
            .on_conflict((team_members::workspace_id, team_members::email))
            .do_update()
            .set(team_members::name.eq(excluded(team_members::name)))
            .get_result::<DbTeamMember>(&mut conn)?;
        Ok(TeamMember::try_from(row)?)
    }

    fn activate_member(&self, member: &NewTeamMember) -> RepositoryResult<TeamMember> {
        let mut conn = self.conn()?;
        activate(&mut conn, member)
    }

    fn update_member(
        &self,
        id: TeamMemberId,
        workspace_id: WorkspaceId,
        updates: &UpdateTeamMember,
    ) -> RepositoryResult<TeamMember> {
        use crate::schema::team_members;

        let mut conn = self.conn()?;
        let row = diesel::update(
            team_members::table
                .filter(team_members::id.eq(id.get()))
                .filter(team_members::workspace_id.eq(workspace_id.get())),
        )
        .set(&DbUpdateTeamMember::from(updates))
        .get_result::<DbTeamMember>(&mut conn)?;
        Ok(TeamMember::try_from(row)?)
    }

    fn migrate_member(
        &self,
        workspace_id: WorkspaceId,
        from: TeamMemberId,
        to: TeamMemberId,
    ) -> RepositoryResult<MigrationReport> {
        use crate::schema::{client_team, deliverables, team_members};

        let mut conn = self.conn()?;
        conn.immediate_transaction::<MigrationReport, RepositoryError, _>(|conn| {
            let deliverables_moved = diesel::update(
                deliverables::table
                    .filter(deliverables::workspace_id.eq(workspace_id.get()))
                    .filter(deliverables::assignee_id.eq(from.get()))
                    .filter(deliverables::status.ne(DeliverableStatus::Delivered.as_str())),
            )
            .set(deliverables::assignee_id.eq(to.get()))
            .execute(conn)?;

            let client_ids = client_team::table
                .filter(client_team::member_id.eq(from.get()))
                .select(client_team::client_id)
                .load::<i32>(conn)?;

            let rows: Vec<DbClientTeam> = client_ids
                .iter()
                .map(|client_id| DbClientTeam {
                    client_id: *client_id,
                    member_id: to.get(),
                })
                .collect();
            for row in &rows {
                diesel::insert_into(client_team::table)
                    .values(row)
                    .on_conflict_do_nothing()
                    .execute(conn)?;
            }
            diesel::delete(client_team::table.filter(client_team::member_id.eq(from.get())))
                .execute(conn)?;

            let deactivated = diesel::update(
                team_members::table
                    .filter(team_members::id.eq(from.get()))
                    .filter(team_members::workspace_id.eq(workspace_id.get())),
            )
            .set(team_members::is_active.eq(false))
            .execute(conn)?;
            if deactivated == 0 {
                return Err(RepositoryError::NotFound);
            }

            Ok(MigrationReport {
                deliverables: deliverables_moved,
                clients: client_ids.len(),
            })
        })
    }
}

impl InvitationReader for DieselRepository {
    fn get_invitation_by_token(&self, token: &str) -> RepositoryResult<Option<Invitation>> {
        use crate::schema::invitations;

        let mut conn = self.conn()?;
        let row = invitations::table
            .filter(invitations::token.eq(token))
            .first::<DbInvitation>(&mut conn)
            .optional()?;

        row.map(Invitation::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_pending_invitations(
        &self,
        workspace_id: WorkspaceId,
        now: NaiveDateTime,
    ) -> RepositoryResult<Vec<Invitation>> {
        use crate::schema::invitations;

        let mut conn = self.conn()?;
        let rows = invitations::table
            .filter(invitations::workspace_id.eq(workspace_id.get()))
            .filter(invitations::accepted_at.is_null())
            .filter(invitations::expires_at.gt(now))
            .order(invitations::created_at.desc())
            .load::<DbInvitation>(&mut conn)?;

        rows.into_iter()
            .map(|row| Invitation::try_from(row).map_err(RepositoryError::from))
            .collect()
    }
}

impl InvitationWriter for DieselRepository {
    fn create_invitation(&self, invitation: &NewInvitation) -> RepositoryResult<Invitation> {
        use crate::schema::invitations;

        let mut conn = self.conn()?;
        conn.transaction::<Invitation, RepositoryError, _>(|conn| {
            diesel::delete(
                invitations::table
                    .filter(invitations::workspace_id.eq(invitation.workspace_id.get()))
                    .filter(invitations::email.eq(invitation.email.as_str()))
                    .filter(invitations::accepted_at.is_null()),
            )
            .execute(conn)?;

            let row = diesel::insert_into(invitations::table)
                .values(&DbNewInvitation::from(invitation))
                .get_result::<DbInvitation>(conn)?;
            Ok(Invitation::try_from(row)?)
        })
    }

    fn accept_invitation(
        &self,
        id: InvitationId,
        member: &NewTeamMember,
        now: NaiveDateTime,
    ) -> RepositoryResult<TeamMember> {
        use crate::schema::invitations;

        let mut conn = self.conn()?;
        conn.immediate_transaction::<TeamMember, RepositoryError, _>(|conn| {
            let accepted = diesel::update(
                invitations::table
                    .filter(invitations::id.eq(id.get()))
                    .filter(invitations::accepted_at.is_null())
                    .filter(invitations::expires_at.gt(now)),
            )
            .set(invitations::accepted_at.eq(now))
            .execute(conn)?;

            if accepted == 0 {
                return Err(RepositoryError::Conflict(
                    "invitation is no longer pending".to_string(),
                ));
            }

            activate(conn, member)
        })
    }

    fn delete_invitation(
        &self,
        id: InvitationId,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<()> {
        use crate::schema::invitations;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            invitations::table
                .filter(invitations::id.eq(id.get()))
                .filter(invitations::workspace_id.eq(workspace_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
