//! Pure domain models: folders, the budget period and the owning user record.
//! No I/O, no CLI, no storage.

pub mod common;
pub mod folder;
pub mod period;
pub mod user;

pub use common::{Displayable, NamedEntity};
pub use folder::{Folder, FolderId};
pub use period::{BudgetPeriod, PeriodDates, PeriodState};
pub use user::{UserFields, UserId, UserRecord};
