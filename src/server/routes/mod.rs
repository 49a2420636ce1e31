//! HTTP route handlers
//!
//! - analyze_routes: `POST /analyze` and `POST /analyze-file`

pub mod analyze_routes;

pub use analyze_routes::{analyze_file_handler, analyze_handler};
