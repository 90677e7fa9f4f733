use diesel::prelude::*;

use crate::domain::types::{WorkspaceId, WorkspaceName};
use crate::domain::workspace::Workspace;
use crate::models::workspace::{NewWorkspace as DbNewWorkspace, Workspace as DbWorkspace};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, WorkspaceReader, WorkspaceWriter};

impl WorkspaceReader for DieselRepository {
    fn get_workspace(&self, id: WorkspaceId) -> RepositoryResult<Option<Workspace>> {
        use crate::schema::workspaces;

        let mut conn = self.conn()?;
        let row = workspaces::table
            .find(id.get())
            .first::<DbWorkspace>(&mut conn)
            .optional()?;

        row.map(Workspace::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }
}

impl WorkspaceWriter for DieselRepository {
    fn ensure_workspace(
        &self,
        id: WorkspaceId,
        default_name: &WorkspaceName,
    ) -> RepositoryResult<Workspace> {
        use crate::schema::workspaces;

        let mut conn = self.conn()?;
        diesel::insert_into(workspaces::table)
            .values(&DbNewWorkspace {
                id: id.get(),
                name: default_name.as_str(),
            })
            .on_conflict(workspaces::id)
            .do_nothing()
            .execute(&mut conn)?;

        let row = workspaces::table
            .find(id.get())
            .first::<DbWorkspace>(&mut conn)?;
        Ok(Workspace::try_from(row)?)
    }

    fn rename_workspace(
        &self,
        id: WorkspaceId,
        name: &WorkspaceName,
    ) -> RepositoryResult<Workspace> {
        use crate::schema::workspaces;

        let mut conn = self.conn()?;
        let row = diesel::update(workspaces::table.find(id.get()))
            .set(workspaces::name.eq(name.as_str()))
            .get_result::<DbWorkspace>(&mut conn)?;
        Ok(Workspace::try_from(row)?)
    }
}
