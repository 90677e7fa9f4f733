//! Deliverables, kanban moves and package usage.

use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

use crate::domain::deliverable::{
    Deliverable, DeliverableStatus, NewDeliverable, UpdateDeliverable, UsageChange,
};
use crate::domain::package::{NewPackageAllocation, PackageAllocation};
use crate::domain::types::{ClientId, DeliverableId, WorkspaceId};
use crate::models::deliverable::{
    Deliverable as DbDeliverable, NewDeliverable as DbNewDeliverable,
    PackageAllocation as DbPackageAllocation, UpdateDeliverable as DbUpdateDeliverable,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    DeliverableListQuery, DeliverableReader, DeliverableWriter, DieselRepository,
};

impl DeliverableReader for DieselRepository {
    fn get_deliverable_by_id(
        &self,
        id: DeliverableId,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<Option<Deliverable>> {
        use crate::schema::deliverables;

        let mut conn = self.conn()?;
        let row = deliverables::table
            .filter(deliverables::id.eq(id.get()))
            .filter(deliverables::workspace_id.eq(workspace_id.get()))
            .first::<DbDeliverable>(&mut conn)
            .optional()?;

        row.map(Deliverable::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_deliverables(&self, query: DeliverableListQuery) -> RepositoryResult<Vec<Deliverable>> {
        use crate::schema::{client_team, deliverables};

        let mut conn = self.conn()?;
        let mut items = deliverables::table
            .filter(deliverables::workspace_id.eq(query.workspace_id.get()))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(client_id) = query.client_id {
            items = items.filter(deliverables::client_id.eq(client_id.get()));
        }
        if let Some(assignee_id) = query.assignee_id {
            items = items.filter(deliverables::assignee_id.eq(assignee_id.get()));
        }
        if let Some(status) = query.status {
            items = items.filter(deliverables::status.eq(status.as_str()));
        }
        if let Some(member_id) = query.visible_to {
            let assigned = client_team::table
                .filter(client_team::member_id.eq(member_id.get()))
                .select(client_team::client_id);
            items = items.filter(deliverables::client_id.eq_any(assigned));
        }

        let rows = items
            .order(deliverables::id.asc())
            .load::<DbDeliverable>(&mut conn)?;

        rows.into_iter()
            .map(|row| Deliverable::try_from(row).map_err(RepositoryError::from))
            .collect()
    }

    fn list_package_allocations(
        &self,
        client_id: ClientId,
    ) -> RepositoryResult<Vec<PackageAllocation>> {
        use crate::schema::package_allocations;

        let mut conn = self.conn()?;
        let rows = package_allocations::table
            .filter(package_allocations::client_id.eq(client_id.get()))
            .order(package_allocations::kind.asc())
            .load::<DbPackageAllocation>(&mut conn)?;

        rows.into_iter()
            .map(|row| PackageAllocation::try_from(row).map_err(RepositoryError::from))
            .collect()
    }
}

impl DeliverableWriter for DieselRepository {
    fn create_deliverable(&self, deliverable: &NewDeliverable) -> RepositoryResult<Deliverable> {
        use crate::schema::deliverables;

        let mut conn = self.conn()?;
        let row = diesel::insert_into(deliverables::table)
            .values(&DbNewDeliverable::from(deliverable))
            .get_result::<DbDeliverable>(&mut conn)?;
        Ok(Deliverable::try_from(row)?)
    }

    fn update_deliverable(
        &self,
        id: DeliverableId,
        workspace_id: WorkspaceId,
        updates: &UpdateDeliverable,
    ) -> RepositoryResult<Deliverable> {
        use crate::schema::deliverables;

        let mut conn = self.conn()?;
        conn.immediate_transaction::<Deliverable, RepositoryError, _>(|conn| {
            let row = deliverables::table
                .filter(deliverables::id.eq(id.get()))
                .filter(deliverables::workspace_id.eq(workspace_id.get()))
                .first::<DbDeliverable>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;
            let current = Deliverable::try_from(row)?;

            // The consumed unit belongs to the kind it was delivered as.
            if current.status == DeliverableStatus::Delivered && current.kind != updates.kind {
                return Err(RepositoryError::Conflict(format!(
                    "deliverable {} is delivered as {}; reopen it before changing its kind",
                    current.id, current.kind
                )));
            }

            let changes = DbUpdateDeliverable::from_domain(updates, Utc::now().naive_utc());
            let row = diesel::update(deliverables::table.find(id.get()))
                .set(&changes)
                .get_result::<DbDeliverable>(conn)?;
            Ok(Deliverable::try_from(row)?)
        })
    }

    fn delete_deliverable(
        &self,
        id: DeliverableId,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<()> {
        use crate::schema::deliverables;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            deliverables::table
                .filter(deliverables::id.eq(id.get()))
                .filter(deliverables::workspace_id.eq(workspace_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn move_deliverable(
        &self,
        id: DeliverableId,
        workspace_id: WorkspaceId,
        status: DeliverableStatus,
        now: NaiveDateTime,
    ) -> RepositoryResult<Deliverable> {
        use crate::schema::{deliverables, package_allocations};

        let mut conn = self.conn()?;
        conn.immediate_transaction::<Deliverable, RepositoryError, _>(|conn| {
            let row = deliverables::table
                .filter(deliverables::id.eq(id.get()))
                .filter(deliverables::workspace_id.eq(workspace_id.get()))
                .first::<DbDeliverable>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;
            let current = Deliverable::try_from(row)?;

            let change = UsageChange::for_move(current.status, status);
            if change != UsageChange::Unchanged {
                let allocation = package_allocations::table
                    .find((current.client_id.get(), current.kind.as_str()))
                    .first::<DbPackageAllocation>(conn)
                    .optional()?
                    .map(PackageAllocation::try_from)
                    .transpose()?;

                // Kinds without an allocation are not tracked.
                if let Some(allocation) = allocation {
                    let updated = match change {
                        UsageChange::Consume => allocation.consume_one().ok_or_else(|| {
                            RepositoryError::PackageExhausted {
                                kind: current.kind.to_string(),
                            }
                        })?,
                        _ => allocation.restore_one(),
                    };
                    diesel::update(
                        package_allocations::table
                            .find((current.client_id.get(), current.kind.as_str())),
                    )
                    .set(package_allocations::used.eq(updated.used))
                    .execute(conn)?;
                }
            }

            let completed_at = match status {
                DeliverableStatus::Delivered => Some(current.completed_at.unwrap_or(now)),
                _ => None,
            };

            let row = diesel::update(deliverables::table.find(id.get()))
                .set((
                    deliverables::status.eq(status.as_str()),
                    deliverables::completed_at.eq(completed_at),
                    deliverables::updated_at.eq(now),
                ))
                .get_result::<DbDeliverable>(conn)?;
            Ok(Deliverable::try_from(row)?)
        })
    }

    fn set_package_allocation(
        &self,
        allocation: &NewPackageAllocation,
    ) -> RepositoryResult<PackageAllocation> {
        use crate::schema::package_allocations;

        let mut conn = self.conn()?;
        conn.immediate_transaction::<PackageAllocation, RepositoryError, _>(|conn| {
            let key = (allocation.client_id.get(), allocation.kind.as_str());
            let existing = package_allocations::table
                .find(key)
                .first::<DbPackageAllocation>(conn)
                .optional()?;

            let row = match existing {
                Some(existing) => {
                    if allocation.allocated < existing.used {
                        return Err(RepositoryError::Conflict(format!(
                            "allocation {} is below the {} units already used",
                            allocation.allocated, existing.used
                        )));
                    }
                    diesel::update(package_allocations::table.find(key))
                        .set(package_allocations::allocated.eq(allocation.allocated))
                        .get_result::<DbPackageAllocation>(conn)?
                }
                None => diesel::insert_into(package_allocations::table)
                    .values(&DbPackageAllocation {
                        client_id: allocation.client_id.get(),
                        kind: allocation.kind.as_str().to_string(),
                        allocated: allocation.allocated,
                        used: 0,
                    })
                    .get_result::<DbPackageAllocation>(conn)?,
            };

            Ok(PackageAllocation::try_from(row)?)
        })
    }
}
