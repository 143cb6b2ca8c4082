use log::trace;
use path_clean::PathClean;
use std::path::{Component, Path, PathBuf};

/// Display label for `path`: relative to `base` when both share a root,
/// otherwise the path as given.
pub(crate) fn label(path: &Path, base: &Path) -> String {
    let relative = std::path::absolute(path).ok().and_then(|abs| relative_to(&abs.clean(), base));
    match relative {
        Some(rel) => {
            trace!("Labeled {} as {}", path.display(), rel.display());
            rel.to_string_lossy().to_string()
        }
        None => path.to_string_lossy().to_string(),
    }
}

/// Relative path leading from directory `base` to `target`.
fn relative_to(target: &Path, base: &Path) -> Option<PathBuf> {
    let target: Vec<Component<'_>> = target.components().collect();
    let base: Vec<Component<'_>> = base.components().collect();
    if target.first() != base.first() {
        return None;
    }

    let common = target.iter().zip(&base).take_while(|(t, b)| t == b).count();
    let mut relative = PathBuf::new();
    for _ in common..base.len() {
        relative.push("..");
    }
    for component in &target[common..] {
        relative.push(component.as_os_str());
    }
    if relative.as_os_str().is_empty() { Some(PathBuf::from(".")) } else { Some(relative) }
}
