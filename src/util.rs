use std::path::Path;

/// Render `path` relative to `base` when possible, for corpus-relative
/// progress lines and diagnostics.
pub fn display_path(path: &Path, base: Option<&Path>) -> String {
    if let Some(base) = base {
        if let Ok(relative) = path.strip_prefix(base) {
            return relative.display().to_string();
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::display_path;
    use std::path::Path;

    #[test]
    fn paths_under_the_base_render_relative() {
        let base = Path::new("/corpus");
        assert_eq!(
            display_path(Path::new("/corpus/sub/a.ipynb"), Some(base)),
            "sub/a.ipynb"
        );
    }

    #[test]
    fn paths_outside_the_base_render_as_is() {
        let base = Path::new("/corpus");
        assert_eq!(
            display_path(Path::new("/elsewhere/a.ipynb"), Some(base)),
            "/elsewhere/a.ipynb"
        );
        assert_eq!(display_path(Path::new("a.ipynb"), None), "a.ipynb");
    }
}
