//! Pending new-hire overlay: which open new-staff tickets belong to which
//! manager.

use std::collections::HashMap;

use tracing::debug;

use crate::model::{EmployeeId, NewStaffRequest, Ticket, TicketRequest};

/// A field that may name the manager a new-hire request reports to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ManagerField {
    /// `metadata.reportingManagerId`
    ReportingManagerId,
    /// `metadata.managerId`
    ManagerId,
    /// the ticket's assignee
    AssigneeId,
}

/// Lookup order for [`associated_manager`]. The first field that carries a
/// value decides the association, even when a later field would name a
/// different manager.
pub const MANAGER_LOOKUP_ORDER: [ManagerField; 3] = [
    ManagerField::ReportingManagerId,
    ManagerField::ManagerId,
    ManagerField::AssigneeId,
];

impl ManagerField {
    fn read(self, ticket: &Ticket, request: &NewStaffRequest) -> Option<EmployeeId> {
        match self {
            ManagerField::ReportingManagerId => request.reporting_manager_id,
            ManagerField::ManagerId => request.manager_id,
            ManagerField::AssigneeId => ticket.assignee_id,
        }
    }
}

/// The new-staff record of a ticket that is still pending (not closed).
pub fn pending_new_staff(ticket: &Ticket) -> Option<&NewStaffRequest> {
    match &ticket.request {
        TicketRequest::NewStaff(request) if !ticket.is_closed() => Some(request),
        _ => None,
    }
}

/// Manager a pending new-hire ticket is associated with, if any.
pub fn associated_manager(ticket: &Ticket) -> Option<EmployeeId> {
    let request = pending_new_staff(ticket)?;
    MANAGER_LOOKUP_ORDER
        .iter()
        .find_map(|field| field.read(ticket, request))
}

pub fn pending_requests_for(tickets: &[Ticket], manager_id: EmployeeId) -> Vec<&Ticket> {
    tickets
        .iter()
        .filter(|ticket| associated_manager(ticket) == Some(manager_id))
        .collect()
}

/// Pending new-hire tickets grouped by associated manager, input order kept
/// within each group.
#[derive(Debug, Default)]
pub struct PendingIndex<'a> {
    by_manager: HashMap<EmployeeId, Vec<&'a Ticket>>,
}

impl<'a> PendingIndex<'a> {
    pub fn build(tickets: &'a [Ticket]) -> Self {
        let mut by_manager: HashMap<EmployeeId, Vec<&'a Ticket>> = HashMap::new();
        for ticket in tickets {
            if pending_new_staff(ticket).is_none() {
                continue;
            }
            match associated_manager(ticket) {
                Some(manager_id) => by_manager.entry(manager_id).or_default().push(ticket),
                None => debug!(ticket_id = ticket.id, "new staff request names no manager"),
            }
        }
        Self { by_manager }
    }

    pub fn for_manager(&self, manager_id: EmployeeId) -> &[&'a Ticket] {
        self.by_manager
            .get(&manager_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.by_manager.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SystemAccessRequest, TicketStatus};

    fn new_staff(id: i32, status: TicketStatus, request: NewStaffRequest) -> Ticket {
        Ticket::new(id, "New hire", status, TicketRequest::NewStaff(request))
    }

    fn reporting_to(manager_id: EmployeeId) -> NewStaffRequest {
        NewStaffRequest {
            reporting_manager_id: Some(manager_id),
            ..NewStaffRequest::default()
        }
    }

    #[test]
    fn open_request_matches_only_its_manager() {
        let tickets = vec![new_staff(1, TicketStatus::Open, reporting_to(7))];
        assert_eq!(pending_requests_for(&tickets, 7).len(), 1);
        assert!(pending_requests_for(&tickets, 8).is_empty());
    }

    #[test]
    fn closed_request_matches_nobody() {
        let tickets = vec![new_staff(1, TicketStatus::Closed, reporting_to(7))];
        assert!(pending_requests_for(&tickets, 7).is_empty());
        assert!(PendingIndex::build(&tickets).is_empty());
    }

    #[test]
    fn in_progress_counts_as_pending() {
        let tickets = vec![new_staff(1, TicketStatus::InProgress, reporting_to(7))];
        assert_eq!(pending_requests_for(&tickets, 7).len(), 1);
    }

    #[test]
    fn first_present_field_wins() {
        let mut ticket = new_staff(
            1,
            TicketStatus::Open,
            NewStaffRequest {
                reporting_manager_id: None,
                manager_id: Some(4),
                ..NewStaffRequest::default()
            },
        );
        ticket.assignee_id = Some(9);
        assert_eq!(associated_manager(&ticket), Some(4));

        let tickets = vec![ticket];
        assert!(pending_requests_for(&tickets, 9).is_empty());
    }

    #[test]
    fn assignee_is_the_last_resort() {
        let mut ticket = new_staff(1, TicketStatus::Open, NewStaffRequest::default());
        assert_eq!(associated_manager(&ticket), None);
        ticket.assignee_id = Some(9);
        assert_eq!(associated_manager(&ticket), Some(9));
    }

    #[test]
    fn other_request_kinds_are_ignored() {
        let mut ticket = Ticket::new(
            1,
            "VPN",
            TicketStatus::Open,
            TicketRequest::SystemAccess(SystemAccessRequest::default()),
        );
        ticket.assignee_id = Some(7);
        let tickets = vec![ticket];
        assert!(pending_requests_for(&tickets, 7).is_empty());
    }

    #[test]
    fn index_groups_by_manager_in_input_order() {
        let tickets = vec![
            new_staff(1, TicketStatus::Open, reporting_to(7)),
            new_staff(2, TicketStatus::Open, reporting_to(8)),
            new_staff(3, TicketStatus::Open, reporting_to(7)),
            new_staff(4, TicketStatus::Open, NewStaffRequest::default()),
        ];
        let index = PendingIndex::build(&tickets);
        let ids: Vec<i32> = index.for_manager(7).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(index.for_manager(8).len(), 1);
        assert!(index.for_manager(42).is_empty());
    }
}
