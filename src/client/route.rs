use std::borrow::Cow;

use crate::identity::{Role, SignInArea};

pub const ADMIN_SIGN_IN: &str = "/signin/admin";
pub const USER_SIGN_IN: &str = "/signin/user";

// Shared landing for super admins and admins.
pub const ADMIN_LANDING: &str = "/admin/dashboard";

pub fn sign_in_route(area: SignInArea) -> &'static str {
    match area {
        SignInArea::Admin => ADMIN_SIGN_IN,
        SignInArea::User => USER_SIGN_IN,
    }
}

/// Route a principal lands on right after signing in.
pub fn landing_route(role: Role) -> String {
    if role.is_administrative() {
        ADMIN_LANDING.to_owned()
    } else {
        format!("/{}/dashboard", role.as_str().to_lowercase())
    }
}

/// Canonical spelling of a navigation path.
///
/// Query and fragment are dropped, percent escapes decoded, ASCII lowercased
/// and empty, `.` and `..` segments resolved. The result always starts with `/`.
pub fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let decoded = urlencoding::decode(path).unwrap_or(Cow::Borrowed(path));

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    format!("/{}", segments.join("/")).to_ascii_lowercase()
}

/// Whether `path` is `prefix` itself or lies below it.
///
/// Matching is segment exact, `/administer` is not below `/admin`.
pub(crate) fn is_under(path: &str, prefix: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landing_routes() {
        assert_eq!(landing_route(Role::SuperAdmin), "/admin/dashboard");
        assert_eq!(landing_route(Role::Admin), "/admin/dashboard");
        assert_eq!(landing_route(Role::Hr), "/hr/dashboard");
        assert_eq!(landing_route(Role::Manager), "/manager/dashboard");
        assert_eq!(landing_route(Role::Employee), "/employee/dashboard");
    }

    #[test]
    fn prefix_matching() {
        assert!(is_under("/admin", "/admin"));
        assert!(is_under("/admin/", "/admin"));
        assert!(is_under("/admin/settings/users", "/admin"));
        assert!(is_under("/admin?tab=2", "/admin"));
        assert!(!is_under("/administer", "/admin"));
        assert!(!is_under("/hr", "/admin"));
        assert!(!is_under("/", "/admin"));
    }

    #[test]
    fn normalize_paths() {
        let cases = [
            ("/admin/dashboard", "/admin/dashboard"),
            ("/ADMIN/Dashboard", "/admin/dashboard"),
            ("//admin//dashboard/", "/admin/dashboard"),
            ("/./admin", "/admin"),
            ("/hr/../admin", "/admin"),
            ("/../../admin", "/admin"),
            ("admin/dashboard", "/admin/dashboard"),
            ("\\admin\\dashboard", "/admin/dashboard"),
            ("/%61dmin?tab=1#top", "/admin"),
            ("", "/"),
        ];
        for (raw, want) in cases {
            assert_eq!(normalize(raw), want, "{:?}", raw);
        }
    }
}
