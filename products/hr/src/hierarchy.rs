//! Manager → direct-reports trees built from a flat employee list.
//!
//! Manager references are untrusted: an id that points nowhere promotes the
//! employee to a root, and a cycle is cut where the descent would re-enter an
//! ancestor. Employees that are only reachable through a cycle are promoted
//! to roots after the regular pass, so [`build_forest`] places every employee
//! exactly once. A chain deeper than [`MAX_CHAIN_DEPTH`] is cut the same way
//! and continues as its own root.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::warn;

use crate::model::{Employee, EmployeeId, Ticket};
use crate::overlay::PendingIndex;

/// Levels held by one tree. Every walk over a [`ManagerNode`] recurses per
/// level, so this bounds stack use for arbitrary input.
pub const MAX_CHAIN_DEPTH: usize = 256;

#[derive(Clone, Debug, PartialEq)]
pub struct ManagerNode {
    pub employee: Employee,
    pub reports: Vec<ManagerNode>,
    /// Open new-staff tickets associated with this employee as manager.
    pub pending_requests: Vec<Ticket>,
}

impl ManagerNode {
    pub fn id(&self) -> EmployeeId {
        self.employee.id
    }

    pub fn has_reports(&self) -> bool {
        !self.reports.is_empty()
    }

    /// Nodes in this subtree, the node itself included.
    pub fn size(&self) -> usize {
        1 + self.reports.iter().map(ManagerNode::size).sum::<usize>()
    }

    pub fn find(&self, id: EmployeeId) -> Option<&ManagerNode> {
        if self.id() == id {
            return Some(self);
        }
        self.reports.iter().find_map(|node| node.find(id))
    }
}

/// Forest rooted at every employee without a resolvable manager. Roots and
/// reports keep input order; continuations of over-deep chains follow the
/// tree they were cut from.
pub fn build_forest(employees: &[Employee], tickets: &[Ticket]) -> Vec<ManagerNode> {
    let mut builder = TreeBuilder::new(employees, tickets);
    let mut roots = Vec::new();

    for index in 0..employees.len() {
        if builder.is_unplaced(index) && builder.is_root(index) {
            roots.push(builder.grow(index));
            builder.grow_overflow(&mut roots);
        }
    }

    for index in 0..employees.len() {
        if !builder.is_unplaced(index) {
            continue;
        }
        let employee = &employees[index];
        warn!(
            employee_id = employee.id,
            manager_id = ?employee.manager_id,
            "manager chain loops back on itself; promoting employee to root"
        );
        roots.push(builder.grow(index));
        builder.grow_overflow(&mut roots);
    }

    roots
}

/// Tree rooted at `manager_id`, or an empty list when no such employee
/// exists. Levels past [`MAX_CHAIN_DEPTH`] are left out.
pub fn build_single_manager_tree(
    employees: &[Employee],
    tickets: &[Ticket],
    manager_id: EmployeeId,
) -> Vec<ManagerNode> {
    let Some(index) = employees.iter().position(|e| e.id == manager_id) else {
        return Vec::new();
    };
    let mut builder = TreeBuilder::new(employees, tickets);
    vec![builder.grow(index)]
}

pub fn find_node(forest: &[ManagerNode], id: EmployeeId) -> Option<&ManagerNode> {
    forest.iter().find_map(|node| node.find(id))
}

pub fn count_nodes(forest: &[ManagerNode]) -> usize {
    forest.iter().map(ManagerNode::size).sum()
}

/// Distance from the root of the tree holding `id`; roots are at depth 0.
pub fn depth_of(forest: &[ManagerNode], id: EmployeeId) -> Option<usize> {
    fn walk(node: &ManagerNode, id: EmployeeId, depth: usize) -> Option<usize> {
        if node.id() == id {
            return Some(depth);
        }
        node.reports
            .iter()
            .find_map(|child| walk(child, id, depth + 1))
    }
    forest.iter().find_map(|root| walk(root, id, 0))
}

struct TreeBuilder<'a> {
    employees: &'a [Employee],
    /// False for every record after the first with the same id.
    first_record: Vec<bool>,
    known: HashSet<EmployeeId>,
    reports: HashMap<EmployeeId, Vec<usize>>,
    pending: PendingIndex<'a>,
    placed: HashSet<EmployeeId>,
    overflow: VecDeque<usize>,
}

impl<'a> TreeBuilder<'a> {
    fn new(employees: &'a [Employee], tickets: &'a [Ticket]) -> Self {
        let mut known = HashSet::with_capacity(employees.len());
        let mut first_record = Vec::with_capacity(employees.len());
        for employee in employees {
            let first = known.insert(employee.id);
            if !first {
                warn!(employee_id = employee.id, "duplicate employee id; later record ignored");
            }
            first_record.push(first);
        }

        let mut reports: HashMap<EmployeeId, Vec<usize>> = HashMap::new();
        for (index, employee) in employees.iter().enumerate() {
            if !first_record[index] {
                continue;
            }
            if let Some(manager_id) = employee.manager_id.filter(|id| known.contains(id)) {
                reports.entry(manager_id).or_default().push(index);
            }
        }

        Self {
            employees,
            first_record,
            known,
            reports,
            pending: PendingIndex::build(tickets),
            placed: HashSet::new(),
            overflow: VecDeque::new(),
        }
    }

    fn is_unplaced(&self, index: usize) -> bool {
        self.first_record[index] && !self.placed.contains(&self.employees[index].id)
    }

    fn is_root(&self, index: usize) -> bool {
        match self.employees[index].manager_id {
            None => true,
            Some(manager_id) => !self.known.contains(&manager_id),
        }
    }

    fn grow(&mut self, index: usize) -> ManagerNode {
        let mut path = HashSet::new();
        self.grow_at(index, 0, &mut path)
    }

    /// Roots for every chain cut at the depth limit, including cuts made
    /// while growing those roots.
    fn grow_overflow(&mut self, roots: &mut Vec<ManagerNode>) {
        while let Some(index) = self.overflow.pop_front() {
            if self.is_unplaced(index) {
                roots.push(self.grow(index));
            }
        }
    }

    fn grow_at(
        &mut self,
        index: usize,
        depth: usize,
        path: &mut HashSet<EmployeeId>,
    ) -> ManagerNode {
        let employees = self.employees;
        let employee = &employees[index];
        self.placed.insert(employee.id);
        path.insert(employee.id);

        let children = self.reports.get(&employee.id).cloned().unwrap_or_default();
        let mut reports = Vec::with_capacity(children.len());
        for child in children {
            let child_id = employees[child].id;
            if path.contains(&child_id) {
                warn!(
                    employee_id = child_id,
                    manager_id = employee.id,
                    "manager cycle truncated"
                );
                continue;
            }
            if self.placed.contains(&child_id) {
                continue;
            }
            if depth + 1 >= MAX_CHAIN_DEPTH {
                warn!(
                    employee_id = child_id,
                    manager_id = employee.id,
                    max_depth = MAX_CHAIN_DEPTH,
                    "management chain too deep; cut here"
                );
                self.overflow.push_back(child);
                continue;
            }
            reports.push(self.grow_at(child, depth + 1, path));
        }

        path.remove(&employee.id);
        ManagerNode {
            employee: employee.clone(),
            reports,
            pending_requests: self
                .pending
                .for_manager(employee.id)
                .iter()
                .map(|ticket| (*ticket).clone())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewStaffRequest, TicketRequest, TicketStatus};

    fn staff(id: EmployeeId) -> Employee {
        Employee::new(id, "Staff", &id.to_string())
    }

    fn ids(nodes: &[ManagerNode]) -> Vec<EmployeeId> {
        nodes.iter().map(ManagerNode::id).collect()
    }

    fn all_ids(forest: &[ManagerNode]) -> Vec<EmployeeId> {
        fn collect(node: &ManagerNode, out: &mut Vec<EmployeeId>) {
            out.push(node.id());
            for child in &node.reports {
                collect(child, out);
            }
        }
        let mut out = Vec::new();
        for root in forest {
            collect(root, &mut out);
        }
        out.sort_unstable();
        out
    }

    fn hire_request(id: i32, manager_id: EmployeeId, status: TicketStatus) -> Ticket {
        Ticket::new(
            id,
            "Hire",
            status,
            TicketRequest::NewStaff(NewStaffRequest {
                reporting_manager_id: Some(manager_id),
                ..NewStaffRequest::default()
            }),
        )
    }

    #[test]
    fn chain_builds_single_path() {
        let employees = vec![staff(1), staff(2).reporting_to(1), staff(3).reporting_to(2)];
        let forest = build_forest(&employees, &[]);
        assert_eq!(ids(&forest), vec![1]);
        assert_eq!(ids(&forest[0].reports), vec![2]);
        assert_eq!(ids(&forest[0].reports[0].reports), vec![3]);
        assert!(forest[0].reports[0].reports[0].reports.is_empty());
    }

    #[test]
    fn acyclic_list_places_everyone_once() {
        let employees = vec![
            staff(5).reporting_to(1),
            staff(1),
            staff(2).reporting_to(1),
            staff(9),
            staff(3).reporting_to(2),
            staff(4).reporting_to(9),
        ];
        let forest = build_forest(&employees, &[]);
        assert_eq!(ids(&forest), vec![1, 9]);
        assert_eq!(ids(&forest[0].reports), vec![5, 2]);
        assert_eq!(all_ids(&forest), vec![1, 2, 3, 4, 5, 9]);
        assert_eq!(count_nodes(&forest), employees.len());
    }

    #[test]
    fn dangling_manager_becomes_root() {
        let employees = vec![staff(1), staff(2).reporting_to(404)];
        let forest = build_forest(&employees, &[]);
        assert_eq!(ids(&forest), vec![1, 2]);
    }

    #[test]
    fn two_cycle_terminates_with_each_member_once() {
        let employees = vec![staff(1).reporting_to(2), staff(2).reporting_to(1)];
        let forest = build_forest(&employees, &[]);
        assert_eq!(ids(&forest), vec![1]);
        assert_eq!(ids(&forest[0].reports), vec![2]);
        assert!(forest[0].reports[0].reports.is_empty());
        assert_eq!(all_ids(&forest), vec![1, 2]);
    }

    #[test]
    fn cycle_hanging_off_nothing_does_not_swallow_other_trees() {
        let employees = vec![
            staff(1),
            staff(2).reporting_to(1),
            staff(3).reporting_to(5),
            staff(4).reporting_to(3),
            staff(5).reporting_to(4),
            staff(6).reporting_to(5),
        ];
        let forest = build_forest(&employees, &[]);
        assert_eq!(ids(&forest), vec![1, 3]);
        assert_eq!(all_ids(&forest), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(depth_of(&forest, 6), Some(3));
    }

    #[test]
    fn self_managed_employee_is_promoted() {
        let employees = vec![staff(1).reporting_to(1), staff(2).reporting_to(1)];
        let forest = build_forest(&employees, &[]);
        assert_eq!(ids(&forest), vec![1]);
        assert_eq!(ids(&forest[0].reports), vec![2]);
    }

    #[test]
    fn duplicate_ids_are_placed_once() {
        let employees = vec![staff(1), staff(1)];
        let forest = build_forest(&employees, &[]);
        assert_eq!(ids(&forest), vec![1]);
    }

    #[test]
    fn earliest_duplicate_record_wins() {
        let employees = vec![
            Employee::new(2, "First", "Record").reporting_to(5),
            Employee::new(2, "Later", "Record"),
            staff(5).reporting_to(2),
        ];
        let forest = build_forest(&employees, &[]);
        assert_eq!(all_ids(&forest), vec![2, 5]);
        let placed = find_node(&forest, 2).expect("id 2 placed");
        assert_eq!(placed.employee.first_name.as_deref(), Some("First"));
        assert_eq!(placed.employee.manager_id, Some(5));
    }

    fn long_chain(len: i32) -> Vec<Employee> {
        (1..=len)
            .map(|id| if id == 1 { staff(id) } else { staff(id).reporting_to(id - 1) })
            .collect()
    }

    #[test]
    fn deep_chain_is_split_into_bounded_trees() {
        let employees = long_chain(10_000);
        let forest = build_forest(&employees, &[]);
        assert_eq!(count_nodes(&forest), 10_000);
        assert_eq!(forest.len(), 40);
        assert_eq!(forest[0].id(), 1);
        assert_eq!(forest[1].id(), MAX_CHAIN_DEPTH as EmployeeId + 1);
        assert_eq!(depth_of(&forest, 256), Some(MAX_CHAIN_DEPTH - 1));
        assert_eq!(depth_of(&forest, 257), Some(0));
        assert_eq!(depth_of(&forest, 10_000), Some(10_000 % MAX_CHAIN_DEPTH - 1));
    }

    #[test]
    fn deep_reversed_chain_keeps_everyone() {
        let mut employees = long_chain(3_000);
        employees.reverse();
        let forest = build_forest(&employees, &[]);
        assert_eq!(count_nodes(&forest), 3_000);
        assert_eq!(forest[0].id(), 1);
        assert_eq!(forest[0].size(), MAX_CHAIN_DEPTH);
    }

    #[test]
    fn deep_cycle_terminates() {
        let mut employees = long_chain(1_000);
        employees[0].manager_id = Some(1_000);
        let forest = build_forest(&employees, &[]);
        assert_eq!(count_nodes(&forest), 1_000);
    }

    #[test]
    fn single_manager_tree_stops_at_depth_limit() {
        let employees = long_chain(1_000);
        let tree = build_single_manager_tree(&employees, &[], 1);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].size(), MAX_CHAIN_DEPTH);
    }

    #[test]
    fn single_manager_tree_roots_at_requested_id() {
        let employees = vec![staff(1), staff(2).reporting_to(1), staff(3).reporting_to(2)];
        let tree = build_single_manager_tree(&employees, &[], 2);
        assert_eq!(ids(&tree), vec![2]);
        assert_eq!(ids(&tree[0].reports), vec![3]);
    }

    #[test]
    fn single_manager_tree_for_unknown_id_is_empty() {
        let employees = vec![staff(1)];
        assert!(build_single_manager_tree(&employees, &[], 7).is_empty());
    }

    #[test]
    fn single_manager_tree_survives_cycle() {
        let employees = vec![staff(1).reporting_to(2), staff(2).reporting_to(1)];
        let tree = build_single_manager_tree(&employees, &[], 1);
        assert_eq!(tree[0].size(), 2);
    }

    #[test]
    fn pending_requests_attach_to_matching_manager() {
        let employees = vec![staff(7), staff(8).reporting_to(7)];
        let tickets = vec![
            hire_request(1, 7, TicketStatus::Open),
            hire_request(2, 7, TicketStatus::Closed),
            hire_request(3, 99, TicketStatus::Open),
        ];
        let forest = build_forest(&employees, &tickets);
        let pending: Vec<i32> = forest[0].pending_requests.iter().map(|t| t.id).collect();
        assert_eq!(pending, vec![1]);
        let report = find_node(&forest, 8).expect("report placed");
        assert!(report.pending_requests.is_empty());
    }
}
