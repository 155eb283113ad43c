//! Expand/collapse state for rendering an org chart. The state belongs to the
//! view; the tree builders never read or write it.

use std::collections::HashMap;

use crate::hierarchy::ManagerNode;
use crate::model::EmployeeId;

/// Employee id → expanded flag. Ids without an entry are collapsed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpandState {
    expanded: HashMap<EmployeeId, bool>,
}

impl ExpandState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_expanded(root: EmployeeId) -> Self {
        let mut state = Self::new();
        state.set(root, true);
        state
    }

    pub fn is_expanded(&self, id: EmployeeId) -> bool {
        self.expanded.get(&id).copied().unwrap_or(false)
    }

    pub fn set(&mut self, id: EmployeeId, expanded: bool) {
        self.expanded.insert(id, expanded);
    }

    /// Flip one node and return its new state.
    pub fn toggle(&mut self, id: EmployeeId) -> bool {
        let next = !self.is_expanded(id);
        self.set(id, next);
        next
    }

    pub fn expand_all(&mut self, forest: &[ManagerNode]) {
        for node in forest {
            if node.has_reports() {
                self.set(node.id(), true);
                self.expand_all(&node.reports);
            }
        }
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }
}

impl FromIterator<EmployeeId> for ExpandState {
    fn from_iter<I: IntoIterator<Item = EmployeeId>>(iter: I) -> Self {
        Self {
            expanded: iter.into_iter().map(|id| (id, true)).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibleRow {
    pub depth: usize,
    pub employee_id: EmployeeId,
    pub name: String,
    pub has_reports: bool,
    pub expanded: bool,
    pub pending_count: usize,
}

/// Depth-first rows of everything currently visible: roots always, reports
/// only beneath expanded nodes.
pub fn visible_rows(forest: &[ManagerNode], state: &ExpandState) -> Vec<VisibleRow> {
    let mut rows = Vec::new();
    push_rows(forest, state, 0, &mut rows);
    rows
}

fn push_rows(nodes: &[ManagerNode], state: &ExpandState, depth: usize, rows: &mut Vec<VisibleRow>) {
    for node in nodes {
        let expanded = node.has_reports() && state.is_expanded(node.id());
        rows.push(VisibleRow {
            depth,
            employee_id: node.id(),
            name: node.employee.full_name(),
            has_reports: node.has_reports(),
            expanded,
            pending_count: node.pending_requests.len(),
        });
        if expanded {
            push_rows(&node.reports, state, depth + 1, rows);
        }
    }
}
