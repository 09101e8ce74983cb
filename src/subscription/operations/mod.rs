//! Subscription Lifecycle Operations
//!
//! One use case per transition. Every use case validates against the
//! current aggregate state, commits through the unit of work and fires
//! notification hooks only after the commit succeeds.

pub mod close;
pub mod create;
pub mod delete;
pub mod events;
pub mod pause;
pub mod process;
pub mod resume;
pub mod transfer;
pub mod update;

pub use close::{CloseSubscriptionCommand, CloseSubscriptionUseCase};
pub use create::{CreateSubscriptionCommand, CreateSubscriptionUseCase};
pub use delete::{DeleteSubscriptionCommand, DeleteSubscriptionUseCase};
pub use events::{
    SubscriptionClosed, SubscriptionCreated, SubscriptionDeleted, SubscriptionPaused,
    SubscriptionProcessed, SubscriptionResumed, SubscriptionTransferred, SubscriptionUpdated,
};
pub use pause::{PauseSubscriptionCommand, PauseSubscriptionUseCase};
pub use process::{ProcessDecision, ProcessSubscriptionCommand, ProcessSubscriptionUseCase};
pub use resume::{ResumeSubscriptionCommand, ResumeSubscriptionUseCase};
pub use transfer::{TransferSubscriptionCommand, TransferSubscriptionUseCase};
pub use update::{UpdateSubscriptionCommand, UpdateSubscriptionUseCase};
