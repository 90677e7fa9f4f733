use chrono::Utc;
use diesel::prelude::*;

use crate::domain::client::{Client, NewClient, UpdateClient};
use crate::domain::team_member::TeamMember;
use crate::domain::types::{ClientId, EmailAddress, TeamMemberId, WorkspaceId};
use crate::models::client::{
    Client as DbClient, ClientTeam as DbClientTeam, NewClient as DbNewClient,
    UpdateClient as DbUpdateClient,
};
use crate::models::team_member::TeamMember as DbTeamMember;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{ClientListQuery, ClientReader, ClientWriter, DieselRepository};

fn into_domain(rows: Vec<DbClient>) -> RepositoryResult<Vec<Client>> {
    rows.into_iter()
        .map(|row| Client::try_from(row).map_err(RepositoryError::from))
        .collect()
}

impl ClientReader for DieselRepository {
    fn get_client_by_id(
        &self,
        id: ClientId,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<Option<Client>> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let row = clients::table
            .filter(clients::id.eq(id.get()))
            .filter(clients::workspace_id.eq(workspace_id.get()))
            .first::<DbClient>(&mut conn)
            .optional()?;

        row.map(Client::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn get_client_by_email(
        &self,
        email: &EmailAddress,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<Option<Client>> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let row = clients::table
            .filter(clients::email.eq(email.as_str()))
            .filter(clients::workspace_id.eq(workspace_id.get()))
            .order(clients::id.asc())
            .first::<DbClient>(&mut conn)
            .optional()?;

        row.map(Client::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)> {
        use crate::schema::{client_team, clients};

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = clients::table
                .filter(clients::workspace_id.eq(query.workspace_id.get()))
                .into_boxed::<diesel::sqlite::Sqlite>();

            if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
                let pattern = format!("%{term}%");
                items = items.filter(
                    clients::name
                        .like(pattern.clone())
                        .or(clients::email.like(pattern.clone()))
                        .or(clients::phone.like(pattern.clone()))
                        .or(clients::company.like(pattern)),
                );
            }

            if let Some(status) = query.status {
                items = items.filter(clients::status.eq(status.as_str()));
            }

            if let Some(member_id) = query.member_id {
                let assigned = client_team::table
                    .filter(client_team::member_id.eq(member_id.get()))
                    .select(client_team::client_id);
                items = items.filter(clients::id.eq_any(assigned));
            }

            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)?;

        let mut items = query_builder().order((clients::name.asc(), clients::id.asc()));
        if let Some(pagination) = &query.pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }

        let rows = items.load::<DbClient>(&mut conn)?;
        Ok((usize::try_from(total).unwrap_or_default(), into_domain(rows)?))
    }

    fn list_client_team(&self, client_id: ClientId) -> RepositoryResult<Vec<TeamMember>> {
        use crate::schema::{client_team, team_members};

        let mut conn = self.conn()?;
        let rows = team_members::table
            .inner_join(client_team::table)
            .filter(client_team::client_id.eq(client_id.get()))
            .select(DbTeamMember::as_select())
            .order(team_members::name.asc())
            .load::<DbTeamMember>(&mut conn)?;

        rows.into_iter()
            .map(|row| TeamMember::try_from(row).map_err(RepositoryError::from))
            .collect()
    }

    fn is_client_assigned(
        &self,
        client_id: ClientId,
        member_id: TeamMemberId,
    ) -> RepositoryResult<bool> {
        use crate::schema::client_team;

        let mut conn = self.conn()?;
        let count = client_team::table
            .filter(client_team::client_id.eq(client_id.get()))
            .filter(client_team::member_id.eq(member_id.get()))
            .count()
            .get_result::<i64>(&mut conn)?;
        Ok(count > 0)
    }
}

impl ClientWriter for DieselRepository {
    fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let row = diesel::insert_into(clients::table)
            .values(&DbNewClient::from(new_client))
            .get_result::<DbClient>(&mut conn)?;
        Ok(Client::try_from(row)?)
    }

    fn create_clients(&self, new_clients: &[NewClient]) -> RepositoryResult<usize> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let rows: Vec<DbNewClient> = new_clients.iter().map(DbNewClient::from).collect();

        conn.transaction::<usize, RepositoryError, _>(|conn| {
            let mut inserted = 0;
            for row in &rows {
                inserted += diesel::insert_into(clients::table)
                    .values(row)
                    .execute(conn)?;
            }
            Ok(inserted)
        })
    }

    fn update_client(
        &self,
        id: ClientId,
        workspace_id: WorkspaceId,
        updates: &UpdateClient,
    ) -> RepositoryResult<Client> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let changes = DbUpdateClient::from_domain(updates, Utc::now().naive_utc());
        let row = diesel::update(
            clients::table
                .filter(clients::id.eq(id.get()))
                .filter(clients::workspace_id.eq(workspace_id.get())),
        )
        .set(&changes)
        .get_result::<DbClient>(&mut conn)?;
        Ok(Client::try_from(row)?)
    }

    fn delete_client(&self, id: ClientId, workspace_id: WorkspaceId) -> RepositoryResult<()> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        // Dependent rows go through ON DELETE CASCADE.
        let deleted = diesel::delete(
            clients::table
                .filter(clients::id.eq(id.get()))
                .filter(clients::workspace_id.eq(workspace_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn assign_client_team(
        &self,
        client_id: ClientId,
        member_ids: &[TeamMemberId],
    ) -> RepositoryResult<usize> {
        use crate::schema::client_team;

        let mut conn = self.conn()?;
        let mut rows: Vec<DbClientTeam> = member_ids
            .iter()
            .map(|member_id| DbClientTeam {
                client_id: client_id.get(),
                member_id: member_id.get(),
            })
            .collect();
        rows.sort_by_key(|row| row.member_id);
        rows.dedup_by_key(|row| row.member_id);

        conn.transaction::<usize, RepositoryError, _>(|conn| {
            diesel::delete(client_team::table.filter(client_team::client_id.eq(client_id.get())))
                .execute(conn)?;

            if rows.is_empty() {
                return Ok(0);
            }
            let inserted = diesel::insert_into(client_team::table)
                .values(&rows)
                .execute(conn)?;
            Ok(inserted)
        })
    }
}
