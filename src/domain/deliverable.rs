//! Deliverables and the kanban pipeline they move through.

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::domain::types::{
    CampaignId, ClientId, DeliverableId, DeliverableTitle, TeamMemberId, WorkspaceId,
};

text_enum!(
    /// Type of creative work; package allocations are tracked per kind.
    DeliverableKind {
        Design => "design",
        Video => "video",
        Copy => "copy",
        Other => "other",
    }
);

text_enum!(
    /// Kanban column, in pipeline order.
    DeliverableStatus {
        Backlog => "backlog",
        InProgress => "in_progress",
        Review => "review",
        Approved => "approved",
        Delivered => "delivered",
    }
);

impl DeliverableStatus {
    /// Anything not yet delivered still counts towards workload.
    pub fn is_open(self) -> bool {
        self != DeliverableStatus::Delivered
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Deliverable {
    pub id: DeliverableId,
    pub workspace_id: WorkspaceId,
    pub client_id: ClientId,
    pub campaign_id: Option<CampaignId>,
    pub assignee_id: Option<TeamMemberId>,
    pub title: DeliverableTitle,
    pub kind: DeliverableKind,
    pub status: DeliverableStatus,
    pub due_date: Option<NaiveDate>,
    pub completed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Deliverable {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status.is_open() && self.due_date.is_some_and(|due| due < today)
    }

    /// Open and due between `today` and `today + days`, both inclusive.
    pub fn is_due_within(&self, today: NaiveDate, days: u64) -> bool {
        let Some(due) = self.due_date else {
            return false;
        };
        let horizon = today.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX);
        self.status.is_open() && due >= today && due <= horizon
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewDeliverable {
    pub workspace_id: WorkspaceId,
    pub client_id: ClientId,
    pub campaign_id: Option<CampaignId>,
    pub assignee_id: Option<TeamMemberId>,
    pub title: DeliverableTitle,
    pub kind: DeliverableKind,
    pub due_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateDeliverable {
    pub campaign_id: Option<CampaignId>,
    pub assignee_id: Option<TeamMemberId>,
    pub title: DeliverableTitle,
    pub kind: DeliverableKind,
    pub due_date: Option<NaiveDate>,
}

/// Effect a status move has on the client's package usage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UsageChange {
    Consume,
    Restore,
    Unchanged,
}

impl UsageChange {
    pub fn for_move(from: DeliverableStatus, to: DeliverableStatus) -> Self {
        use DeliverableStatus::Delivered;
        match (from == Delivered, to == Delivered) {
            (false, true) => UsageChange::Consume,
            (true, false) => UsageChange::Restore,
            _ => UsageChange::Unchanged,
        }
    }
}

/// One column of the kanban board.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct KanbanColumn {
    pub status: DeliverableStatus,
    pub deliverables: Vec<Deliverable>,
}

/// Groups deliverables into the five pipeline columns.
///
/// Columns are always present, even when empty. Inside a column cards are
/// ordered by due date (undated last), then by id.
pub fn build_board(deliverables: Vec<Deliverable>) -> Vec<KanbanColumn> {
    let mut columns: Vec<KanbanColumn> = DeliverableStatus::ALL
        .iter()
        .map(|status| KanbanColumn {
            status: *status,
            deliverables: Vec::new(),
        })
        .collect();

    for deliverable in deliverables {
        if let Some(column) = columns.iter_mut().find(|c| c.status == deliverable.status) {
            column.deliverables.push(deliverable);
        }
    }

    for column in &mut columns {
        column
            .deliverables
            .sort_by_key(|d| (d.due_date.is_none(), d.due_date, d.id));
    }

    columns
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;

    pub(crate) fn sample(id: i32, status: DeliverableStatus, due: Option<NaiveDate>) -> Deliverable {
        let now = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Deliverable {
            id: DeliverableId::new(id).unwrap(),
            workspace_id: WorkspaceId::new(1).unwrap(),
            client_id: ClientId::new(1).unwrap(),
            campaign_id: None,
            assignee_id: None,
            title: DeliverableTitle::new(format!("Card {id}")).unwrap(),
            kind: DeliverableKind::Design,
            status,
            due_date: due,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    #[test]
    fn usage_change_only_on_crossing_delivered() {
        use DeliverableStatus::*;
        assert_eq!(UsageChange::for_move(Approved, Delivered), UsageChange::Consume);
        assert_eq!(UsageChange::for_move(Backlog, Delivered), UsageChange::Consume);
        assert_eq!(UsageChange::for_move(Delivered, Review), UsageChange::Restore);
        assert_eq!(UsageChange::for_move(Delivered, Delivered), UsageChange::Unchanged);
        assert_eq!(UsageChange::for_move(Backlog, Review), UsageChange::Unchanged);
    }

    #[test]
    fn board_has_every_column_sorted_by_due_date() {
        let board = build_board(vec![
            sample(1, DeliverableStatus::Review, None),
            sample(2, DeliverableStatus::Review, Some(date(10))),
            sample(3, DeliverableStatus::Review, Some(date(5))),
            sample(4, DeliverableStatus::Delivered, Some(date(1))),
        ]);

        assert_eq!(board.len(), 5);
        assert!(board[0].deliverables.is_empty());
        let review: Vec<i32> = board[2].deliverables.iter().map(|d| d.id.get()).collect();
        assert_eq!(review, vec![3, 2, 1]);
        assert_eq!(board[4].deliverables.len(), 1);
    }

    #[test]
    fn overdue_and_due_soon_ignore_delivered_cards() {
        let today = date(10);
        assert!(sample(1, DeliverableStatus::InProgress, Some(date(9))).is_overdue(today));
        assert!(!sample(2, DeliverableStatus::Delivered, Some(date(9))).is_overdue(today));
        assert!(!sample(3, DeliverableStatus::InProgress, None).is_overdue(today));

        assert!(sample(4, DeliverableStatus::Backlog, Some(date(17))).is_due_within(today, 7));
        assert!(!sample(5, DeliverableStatus::Backlog, Some(date(18))).is_due_within(today, 7));
        assert!(!sample(6, DeliverableStatus::Backlog, Some(date(9))).is_due_within(today, 7));
    }
}
