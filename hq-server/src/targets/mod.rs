//! Daily target domain
//!
//! Policy table, per-day evaluation, and the department/monthly
//! rollups built on top of it.

pub mod evaluator;
pub mod policy;
pub mod report;

pub use evaluator::{EmployeeTargetReport, TargetStatus, evaluate_day, submit_reason};
pub use policy::{CountSource, TargetPolicy, policy_for};
pub use report::{DepartmentStatus, DepartmentSummary, MonthlyProgress};
