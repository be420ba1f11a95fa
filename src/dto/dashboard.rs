//! Numbers shown on the role-scoped dashboard cards.

use serde::Serialize;

use crate::dto::StatusCount;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum DashboardStats {
    Admin {
        customers: usize,
        requests: Vec<StatusCount>,
        open_tasks: usize,
        unassigned_tasks: usize,
        running_executions: usize,
        failed_executions: usize,
    },
    Employee {
        assigned_customers: usize,
        new_requests: usize,
        my_requests_in_progress: usize,
        my_open_tasks: usize,
        unassigned_tasks: usize,
    },
    Customer {
        tickets: Vec<StatusCount>,
        open_tickets: usize,
    },
}
