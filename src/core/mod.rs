//! Business logic: the folder ledger, the budget period, onboarding and summaries.
//! Depends on `domain` and the `store`/`auth` seams; no terminal I/O.

pub mod ledger;
pub mod onboarding;
pub mod period;
pub mod summary;
pub mod time;
pub mod validate;

pub use ledger::{BudgetLedger, FolderUpdate, LedgerSnapshot};
pub use onboarding::{entry_route, register_account, EntryRoute};
pub use period::{PeriodInput, PeriodManager};
pub use summary::{FolderSummary, ProfileSummary, SummaryService};
pub use time::{Clock, ManualClock, SystemClock};
