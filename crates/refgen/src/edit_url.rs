//! Edit-link composition.

/// Compose an edit link for a relative source path.
///
/// `edit_uri_template` takes precedence and has `{path}` substituted
/// with `src_path`. Otherwise `src_path` is joined onto `edit_uri`,
/// inserting a `/` when the base lacks one. Returns `None` when
/// neither is configured.
#[must_use]
pub fn edit_url(
    edit_uri: Option<&str>,
    edit_uri_template: Option<&str>,
    src_path: &str,
) -> Option<String> {
    if let Some(template) = edit_uri_template {
        return Some(template.replace("{path}", src_path));
    }
    edit_uri.map(|base| {
        if base.is_empty() || base.ends_with('/') {
            format!("{base}{src_path}")
        } else {
            format!("{base}/{src_path}")
        }
    })
}
