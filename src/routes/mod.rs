pub mod assignments;

pub mod auth;

pub mod files;

pub mod stats;

pub mod submissions;

pub mod system;

pub use assignments::configure_assignment_routes;
pub use auth::configure_auth_routes;
pub use files::configure_file_routes;
pub use stats::configure_stats_routes;
pub use submissions::configure_submission_routes;
pub use system::configure_system_routes;
