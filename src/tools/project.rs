//! Project-container inference and lookup.
//!
//! Generated files are grouped into per-project subdirectories of the
//! workspace ("project containers"). The destination for a new file is
//! chosen by [`infer_destination`], a best-effort heuristic:
//!
//! 1. an explicit location phrase in the originating request
//!    ("save in location: demos") always wins;
//! 2. otherwise a keyword classifier over the filename and content maps to
//!    a fixed project-type taxonomy;
//! 3. otherwise, if the extension family is recognizable, a generic
//!    container is used.
//!
//! A caller-supplied path that already contains a directory separator is
//! honored literally and never re-routed — the inference only applies to
//! bare filenames.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

/// Generic container for files that match no project type.
pub const DEFAULT_CONTAINER: &str = "projects";

/// Keyword → container taxonomy. Checked in order against the lowercased
/// filename first, then the lowercased content; first hit wins.
const PROJECT_TYPES: &[(&str, &str)] = &[
    ("todo", "todo_app"),
    ("calculator", "calculator_app"),
    ("weather", "weather_app"),
    ("blog", "blog_app"),
    ("portfolio", "portfolio_app"),
    ("ecommerce", "ecommerce_app"),
    ("shop", "ecommerce_app"),
    ("dashboard", "dashboard_app"),
    ("chat", "chat_app"),
    ("game", "game_app"),
    ("landing", "landing_page"),
];

/// Extension families that still get a container when no keyword matches.
const WEB_EXTENSIONS: &[&str] = &["html", "htm", "css", "js", "jsx", "ts", "tsx"];
const PYTHON_EXTENSIONS: &[&str] = &["py"];

fn location_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // "save in location: X", "save it in folder X", "put in directory: X"
        Regex::new(r"(?i)(?:save|put|place|store)\s+(?:it\s+|the\s+file\s+)?in\s+(?:location|folder|directory)\s*:?\s*([\w./-]+)")
            .expect("invalid location regex")
    })
}

/// Extract an explicit destination folder from the free-text request.
#[must_use]
pub fn explicit_location(request: &str) -> Option<String> {
    location_pattern()
        .captures(request)
        .map(|caps| caps[1].trim_end_matches('/').to_owned())
        .filter(|loc| !loc.is_empty())
}

/// Classify a file into a project container.
///
/// Returns `None` when the file should stay at the workspace root: either
/// no signal matched, or the extension family is not one we group.
#[must_use]
pub fn classify(filename: &str, content: &str) -> Option<&'static str> {
    let name = filename.to_lowercase();
    let body = content.to_lowercase();

    for (keyword, container) in PROJECT_TYPES {
        if name.contains(keyword) || body.contains(keyword) {
            return Some(container);
        }
    }

    let extension = Path::new(&name)
        .extension()
        .and_then(|e| e.to_str())?;

    if WEB_EXTENSIONS.contains(&extension) {
        return Some("web_app");
    }
    if PYTHON_EXTENSIONS.contains(&extension) {
        return Some("python_project");
    }

    None
}

/// Decide the destination subfolder for a new bare filename.
///
/// Pure function: explicit request phrase > keyword taxonomy > generic
/// container for recognizable extensions > `None` (workspace root).
/// Documented heuristic — callers override it by passing a path that
/// already contains a separator.
#[must_use]
pub fn infer_destination(filename: &str, content: &str, request: &str) -> Option<PathBuf> {
    if let Some(location) = explicit_location(request) {
        return Some(PathBuf::from(location));
    }

    match classify(filename, content) {
        Some(container) => Some(PathBuf::from(container)),
        None => {
            // Recognizable extension but no project signal: generic container.
            let has_known_extension = Path::new(filename)
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| {
                    matches!(
                        ext.to_lowercase().as_str(),
                        "py" | "html" | "htm" | "css" | "js" | "jsx" | "ts" | "tsx"
                            | "rs" | "go" | "java" | "c" | "cpp" | "rb" | "php"
                            | "json" | "md" | "txt"
                    )
                });
            has_known_extension.then(|| PathBuf::from(DEFAULT_CONTAINER))
        }
    }
}

/// Resolve a path that may live inside a project container.
///
/// Search order: the literal path, then one level into the default
/// container, then one level into every top-level directory of the
/// workspace. Returns the first existing match.
#[must_use]
pub fn resolve_existing(workspace: &Path, file_path: &str) -> Option<PathBuf> {
    let literal = workspace.join(file_path);
    if literal.exists() {
        return Some(literal);
    }

    let in_default = workspace.join(DEFAULT_CONTAINER).join(file_path);
    if in_default.exists() {
        return Some(in_default);
    }

    let entries = std::fs::read_dir(workspace).ok()?;
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_ok_and(|ft| ft.is_dir()))
        .map(|e| e.path())
        .collect();
    // Deterministic search order.
    dirs.sort();

    for dir in dirs {
        let candidate = dir.join(file_path);
        if candidate.exists() {
            return Some(candidate);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_location_phrase_wins() {
        let dest = infer_destination("todo.py", "", "save in location: demos/misc");
        assert_eq!(dest, Some(PathBuf::from("demos/misc")));

        let dest = infer_destination("x.py", "", "please put it in folder scratch");
        assert_eq!(dest, Some(PathBuf::from("scratch")));
    }

    #[test]
    fn keyword_classifier_maps_to_taxonomy() {
        assert_eq!(classify("todo.py", ""), Some("todo_app"));
        assert_eq!(classify("main.py", "# a simple calculator"), Some("calculator_app"));
        assert_eq!(classify("index.html", "<h1>My Blog</h1>"), Some("blog_app"));
        assert_eq!(classify("app.js", "const socket = chatServer()"), Some("chat_app"));
    }

    #[test]
    fn extension_families_fall_back_to_generic_containers() {
        assert_eq!(classify("index.html", ""), Some("web_app"));
        assert_eq!(classify("script.py", ""), Some("python_project"));
        assert_eq!(classify("README", ""), None);
    }

    #[test]
    fn unmatched_known_extension_goes_to_default_container() {
        let dest = infer_destination("notes.md", "", "");
        assert_eq!(dest, Some(PathBuf::from(DEFAULT_CONTAINER)));
    }

    #[test]
    fn unknown_extension_stays_at_root() {
        assert_eq!(infer_destination("Makefile", "", ""), None);
    }
}
