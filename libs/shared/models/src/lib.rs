pub mod error;
pub mod metrics;
pub mod patient;
pub mod role;
pub mod shift;
pub mod triage;

pub use error::AppError;
pub use metrics::{HourlyMetrics, UtilitySummary};
pub use patient::{Event, EventKind, Patient};
pub use role::{Role, RoleClass, StaffGroup};
pub use shift::{ShiftCatalog, ShiftDefinition, ShiftKind};
pub use triage::{TriageClassifierVariant, TriageLevel};
