pub mod admin;

pub mod assignments;

pub mod auth;

pub mod courses;

pub mod files;

pub mod materials;

pub mod profile;

pub use admin::configure_admin_routes;
pub use assignments::configure_assignment_routes;
pub use auth::configure_auth_routes;
pub use courses::configure_course_routes;
pub use files::configure_file_routes;
pub use materials::configure_material_routes;
pub use profile::configure_profile_routes;
