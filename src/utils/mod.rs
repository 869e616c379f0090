pub mod file_magic;
pub mod multipart;
pub mod parameter_error_handler;
pub mod password;
pub mod session;
pub mod sql;
pub mod upload;
pub mod validate;

pub use file_magic::validate_magic_bytes;
pub use parameter_error_handler::{json_error_handler, path_error_handler, query_error_handler};
pub use sql::escape_like_pattern;
