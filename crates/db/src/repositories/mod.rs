//! Database repositories.

pub mod report;
pub mod user;

pub use report::ReportRepository;
pub use user::UserRepository;
