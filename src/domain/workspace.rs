use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::types::{WorkspaceId, WorkspaceName};

/// Name given to a workspace the first time one of its users shows up.
pub const DEFAULT_WORKSPACE_NAME: &str = "My agency";

/// Tenant partition of the shared dataset.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: WorkspaceName,
    pub created_at: NaiveDateTime,
}
