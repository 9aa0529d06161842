//! Static file serving for the shared directory.

use std::path::Path;

use tower_http::services::ServeDir;

/// Create the file service for `root`.
///
/// Directories with an `index.html` serve that file. Paths escaping the root
/// are rejected by `ServeDir`.
pub fn create_static_service(root: &Path) -> ServeDir {
    ServeDir::new(root).append_index_html_on_directories(true)
}
