//! Student records shown on the dashboard and the figures derived from them.

use crate::api::{ApiClient, ApiResult, Student};
use std::collections::BTreeMap;

pub const RECENT_LIMIT: usize = 5;
pub const UNKNOWN_DEPARTMENT: &str = "Unknown";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashboardStats {
    pub total: usize,
    /// Student count per department, alphabetical.
    pub departments: BTreeMap<String, usize>,
    /// The last students in listing order, newest last.
    pub recent: Vec<Student>,
}

impl DashboardStats {
    pub fn from_students(students: &[Student]) -> Self {
        let mut departments = BTreeMap::new();
        for student in students {
            let name = student
                .department
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .unwrap_or(UNKNOWN_DEPARTMENT);
            *departments.entry(name.to_string()).or_insert(0) += 1;
        }

        let skip = students.len().saturating_sub(RECENT_LIMIT);
        Self {
            total: students.len(),
            departments,
            recent: students[skip..].to_vec(),
        }
    }

    pub fn busiest_department(&self) -> usize {
        self.departments.values().copied().max().unwrap_or(0)
    }

    /// Bar width as a percentage of the largest department.
    pub fn bar_percent(&self, count: usize) -> u32 {
        match self.busiest_department() {
            0 => 0,
            max => ((count * 100) / max) as u32,
        }
    }

    /// Share of all students, rounded to the nearest percent.
    pub fn share_percent(&self, count: usize) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((count * 100 + self.total / 2) / self.total) as u32
    }
}

/// Checks the token, then fetches the student list. A 401 from either
/// call surfaces as [`crate::api::ApiError::Unauthorized`].
pub async fn load_dashboard(client: &ApiClient) -> ApiResult<DashboardStats> {
    client.check_auth().await?;
    let students = client.students().await?;
    tracing::info!(count = students.len(), "loaded dashboard data");
    Ok(DashboardStats::from_students(&students))
}
