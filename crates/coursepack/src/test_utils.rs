//! Shared helpers for tests in this crate and downstream consumers.

use std::sync::Arc;

use crate::manifest::{Category, Manifest, ManifestEntry};

/// Macro to initialize tracing for tests
///
/// Usage:
/// - `init_test_tracing!()` - uses DEBUG level (default)
/// - `init_test_tracing!(INFO)` - uses specified level
#[macro_export]
macro_rules! init_test_tracing {
    () => {
        init_test_tracing!(DEBUG);
    };
    ($level:ident) => {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::$level)
            .with_test_writer()
            .try_init();
    };
}

/// Build a throwaway manifest whose entries all point at the given files.
#[inline]
pub fn manifest_from_files(course: &str, files: &[&str]) -> Arc<Manifest> {
    Arc::new(Manifest {
        course: course.to_string(),
        origin: None,
        documents: files
            .iter()
            .enumerate()
            .map(|(i, file)| ManifestEntry {
                id: format!("doc{}", i + 1),
                title: file.to_string(),
                file: file.to_string(),
                category: Category::Other,
                chapter: None,
            })
            .collect(),
    })
}

// Re-export the macro
pub use crate::init_test_tracing;
