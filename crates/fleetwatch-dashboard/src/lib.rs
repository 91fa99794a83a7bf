pub mod cache;
pub mod notify;
pub mod projector;
pub mod report;
pub mod signals;
pub mod state;

pub use cache::{LocalCache, PatchError};
pub use notify::{NotificationLevel, Notifier, TracingNotifier};
pub use projector::{Action, ActionKind, StateProjector};
pub use report::{Exported, ReportError, ReportFormat};
pub use signals::{FilterStatus, LoadingFlag, Signal};
pub use state::{AppState, Projection};
