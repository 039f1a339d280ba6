pub mod assignments;
pub mod auth;
pub mod files;
pub mod stats;
pub mod submissions;
pub mod system;

pub use assignments::AssignmentService;
pub use auth::AuthService;
pub use files::FileService;
pub use stats::StatsService;
pub use submissions::SubmissionService;
pub use system::SystemService;
