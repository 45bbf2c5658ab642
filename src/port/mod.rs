//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!     ┌──────────────┤  Domain + Port          ├──────────────┐
//!     │              └─────────────────────────┘              │
//!     ▼                                                       ▼
//! ┌─────────┐                                          ┌───────────┐
//! │  Store  │                                          │ Messenger │
//! │ Adapter │                                          │  Adapter  │
//! └─────────┘                                          └───────────┘
//! ```

pub mod outbound;

pub use outbound::messenger::Messenger;
pub use outbound::store::{
    BackupStore, FollowUpStore, HealthProbe, InterviewStore, NotificationStore, RecruiterStore,
    Repository, TemplateStore, UserStore,
};
