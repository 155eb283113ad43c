//! HR vertical slice.
//!
//! Pure data shaping over already-fetched collections: the org hierarchy
//! (with the pending new-hire overlay and view state) and the profile merge
//! of a session user with its employee record. [`service`] sequences the
//! collaborator lookups around them.

pub mod error;
pub mod hierarchy;
pub mod model;
pub mod overlay;
pub mod profile;
pub mod provider;
pub mod service;
pub mod view;

pub use error::{HrError, HrResult};
pub use hierarchy::{
    build_forest, build_single_manager_tree, count_nodes, depth_of, find_node, ManagerNode,
    MAX_CHAIN_DEPTH,
};
pub use model::{
    Employee, EmployeeId, EmployeeStatus, NewStaffRequest, ProfileChangeRequest,
    SessionUser, SystemAccessRequest, Ticket, TicketKind, TicketRequest, TicketStatus,
};
pub use overlay::{
    associated_manager, pending_requests_for, ManagerField, PendingIndex, MANAGER_LOOKUP_ORDER,
};
pub use profile::{reconcile, resolve_employee_id, ProfileData};
pub use provider::{EmployeeDirectory, SessionSource, TicketSource};
pub use view::{visible_rows, ExpandState, VisibleRow};
