//! Domain layer for the jobsift engine.
//!
//! This module contains the core domain types, independent of the HTTP
//! transport and of any rendering concerns.
//!
//! # Organization
//!
//! - [`error`]: Error types, the user-facing [`ErrorInfo`] projection and result alias
//! - [`facets`]: Facet enums and the fixed-shape [`FacetSelection`] record
//! - [`listing`]: Job listings and per-job application status entries
//! - [`notice`]: Transient notifications for banners and toasts

pub mod error;
pub mod facets;
pub mod listing;
pub mod notice;

pub use error::{ErrorInfo, ErrorKind, JobsiftError, Result};
pub use facets::{ContractType, ExperienceLevel, FacetName, FacetSelection, FacetValue, WorkModality};
pub use listing::{
    ApplicationRecord, ApplicationState, ApplicationStatus, ApplicationStatusEntry, JobListing,
    SalaryRange,
};
pub use notice::{Notice, NoticeSender, NOTICE_CAPACITY};
