//! Document-root preflight checks run by the CLI before launch.
//!
//! The session manager itself assumes a ready directory; ensuring a landing
//! page exists is a caller concern and lives here.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::Result;

/// Index file names recognized by the PHP built-in server.
const INDEX_CANDIDATES: [&str; 2] = ["index.php", "index.html"];

/// Minimal landing page written when the document root has no index file.
const LANDING_PAGE: &str = "\
<!DOCTYPE html>
<html>
<head>
    <meta charset=\"utf-8\">
    <title>Development Server</title>
</head>
<body>
    <p>It works. Served by <?php echo 'PHP ' . PHP_VERSION; ?>.</p>
    <p>Replace this <code>index.php</code> with your own entry point.</p>
</body>
</html>
";

/// Ensure `document_root` has an index file, writing a minimal `index.php`
/// when it has none. Returns the path of the created file, or `None` if an
/// index was already present.
///
/// # Errors
///
/// Returns `AppError::Io` if the landing page cannot be written.
pub fn ensure_landing_page(document_root: &Path) -> Result<Option<PathBuf>> {
    let has_index = INDEX_CANDIDATES
        .iter()
        .any(|name| document_root.join(name).is_file());
    if has_index {
        return Ok(None);
    }

    let target = document_root.join("index.php");
    fs::write(&target, LANDING_PAGE)?;
    info!(path = %target.display(), "created landing page");
    Ok(Some(target))
}
