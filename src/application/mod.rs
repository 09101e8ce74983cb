//! Application Reference Data
//!
//! Read-only view of applications, owned by an external collaborator.

pub mod entity;
pub mod repository;

pub use entity::{
    Application, ApplicationKind, ApplicationSettings, ApplicationStatus, OAuthClientSettings,
    SimpleAppSettings,
};
pub use repository::{ApplicationDirectory, ApplicationRepository};
