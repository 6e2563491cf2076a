//! Navigation outcomes and protected-path classification.

use serde::{Deserialize, Serialize};

/// Result of evaluating a navigation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Navigation {
    /// Continue to the requested path.
    Proceed,
    /// Go to `to` instead. With `replace`, the denied entry is dropped from
    /// history so back-navigation cannot return to it.
    Redirect { to: String, replace: bool },
}

impl Navigation {
    pub fn redirect(to: impl Into<String>, replace: bool) -> Self {
        Self::Redirect {
            to: to.into(),
            replace,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }
}

/// Strips the query string and fragment from a navigation target.
pub fn route_path(target: &str) -> &str {
    let end = target.find(['?', '#']).unwrap_or(target.len());
    &target[..end]
}

/// Whether `path` equals one of `roots` or lies beneath one on a segment
/// boundary (`/dashboard` covers `/dashboard/settings`, not `/dashboards`).
pub fn is_protected_path<S: AsRef<str>>(path: &str, roots: &[S]) -> bool {
    let path = route_path(path);
    roots.iter().any(|root| {
        let root = root.as_ref().trim_end_matches('/');
        if root.is_empty() {
            return true;
        }
        path == root
            || path
                .strip_prefix(root)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOTS: &[&str] = &["/dashboard"];

    #[test]
    fn test_exact_and_nested_paths_are_protected() {
        assert!(is_protected_path("/dashboard", ROOTS));
        assert!(is_protected_path("/dashboard/", ROOTS));
        assert!(is_protected_path("/dashboard/settings", ROOTS));
        assert!(is_protected_path("/dashboard/cohorts/42", ROOTS));
    }

    #[test]
    fn test_unrelated_paths_are_public() {
        assert!(!is_protected_path("/", ROOTS));
        assert!(!is_protected_path("/about", ROOTS));
        assert!(!is_protected_path("/dashboards", ROOTS));
        assert!(!is_protected_path("/public/dashboard", ROOTS));
    }

    #[test]
    fn test_query_and_fragment_are_ignored() {
        assert!(is_protected_path("/dashboard?tab=samples", ROOTS));
        assert!(is_protected_path("/dashboard#top", ROOTS));
        assert!(!is_protected_path("/about?next=/dashboard", ROOTS));
        assert_eq!(route_path("/a/b?c=d#e"), "/a/b");
    }

    #[test]
    fn test_trailing_slash_on_root() {
        assert!(is_protected_path("/dashboard/x", &["/dashboard/"]));
    }

    #[test]
    fn test_no_roots_protects_nothing() {
        let roots: [&str; 0] = [];
        assert!(!is_protected_path("/dashboard", &roots));
    }
}
