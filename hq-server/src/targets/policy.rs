//! Department target policy table
//!
//! Daily thresholds per department, kept as data so evaluation stays a
//! single generic pass instead of per-department branches. Departments
//! absent from the table have no daily target at all.

/// Which business-record table a department's count target draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountSource {
    TruckerOnboarding,
    DeliveryOrder,
}

/// Per-department daily thresholds.
#[derive(Debug, Clone, Copy)]
pub struct TargetPolicy {
    pub department: &'static str,
    /// Minimum call talk time for the day, in hours
    pub min_talk_hours: f64,
    /// Minimum business records created on the day
    pub min_count: i64,
    pub count_source: CountSource,
    /// Noun used in status messages ("trucker onboardings short by 2")
    pub count_label: &'static str,
}

pub const POLICIES: &[TargetPolicy] = &[
    TargetPolicy {
        department: "CMT",
        min_talk_hours: 1.5,
        min_count: 4,
        count_source: CountSource::TruckerOnboarding,
        count_label: "trucker onboardings",
    },
    TargetPolicy {
        department: "Sales",
        min_talk_hours: 3.0,
        min_count: 1,
        count_source: CountSource::DeliveryOrder,
        count_label: "delivery orders",
    },
];

pub fn policy_for(department: &str) -> Option<&'static TargetPolicy> {
    POLICIES.iter().find(|p| p.department == department)
}
