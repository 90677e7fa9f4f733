//! Diesel models for workspaces.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{TypeConstraintError, WorkspaceId, WorkspaceName};
use crate::domain::workspace::Workspace as DomainWorkspace;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::workspaces)]
pub struct Workspace {
    pub id: i32,
    pub name: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::workspaces)]
pub struct NewWorkspace<'a> {
    pub id: i32,
    pub name: &'a str,
}

impl TryFrom<Workspace> for DomainWorkspace {
    type Error = TypeConstraintError;

    fn try_from(workspace: Workspace) -> Result<Self, Self::Error> {
        Ok(Self {
            id: WorkspaceId::new(workspace.id)?,
            name: WorkspaceName::new(workspace.name)?,
            created_at: workspace.created_at,
        })
    }
}
