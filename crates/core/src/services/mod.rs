//! Business logic services.

#![allow(missing_docs)]

pub mod filter;
pub mod identity_events;
pub mod report;
pub mod testimonial;
pub mod user;

pub use filter::ReportFilter;
pub use identity_events::{IdentityEvent, IdentityEventService, verify_webhook_signature};
pub use report::{CreateReportInput, ReportService, ReportStatus, UpdateReportInput};
pub use testimonial::Testimonial;
pub use user::{UpdateProfileInput, UserService};
