//! Route guard.
//!
//! A pure decision over the session snapshot and a page's requirements.

use crate::AuthSnapshot;

pub const UNAUTHORIZED_ROUTE: &str = "/unauthorized";
pub const DASHBOARD_ROUTE: &str = "/dashboard";

/// What a page demands of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequirements {
    pub require_auth: bool,
    pub require_admin: bool,
    /// Where unmet requirements send the user. Defaults to `/unauthorized`.
    pub redirect_to: Option<String>,
}

impl Default for RouteRequirements {
    fn default() -> Self {
        Self {
            require_auth: true,
            require_admin: true,
            redirect_to: None,
        }
    }
}

impl RouteRequirements {
    /// Requirements of an admin-only page.
    pub fn admin() -> Self {
        Self::default()
    }

    /// Requirements of a public page such as login.
    pub fn public() -> Self {
        Self {
            require_auth: false,
            require_admin: false,
            redirect_to: None,
        }
    }
}

/// Outcome of the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    ShowLoading,
    Redirect(String),
    Render,
}

pub fn decide(requirements: &RouteRequirements, snapshot: &AuthSnapshot) -> GuardDecision {
    if snapshot.loading {
        return GuardDecision::ShowLoading;
    }

    let unmet = || {
        GuardDecision::Redirect(
            requirements
                .redirect_to
                .clone()
                .unwrap_or_else(|| UNAUTHORIZED_ROUTE.to_string()),
        )
    };

    if requirements.require_auth && !snapshot.is_authenticated {
        return unmet();
    }

    if requirements.require_admin && snapshot.is_authenticated && !snapshot.is_admin {
        return unmet();
    }

    if !requirements.require_auth && snapshot.is_authenticated && snapshot.is_admin {
        return GuardDecision::Redirect(DASHBOARD_ROUTE.to_string());
    }

    if !requirements.require_auth
        && snapshot.is_authenticated
        && !snapshot.is_admin
        && requirements.require_admin
    {
        return GuardDecision::Redirect(UNAUTHORIZED_ROUTE.to_string());
    }

    GuardDecision::Render
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(loading: bool, is_authenticated: bool, is_admin: bool) -> AuthSnapshot {
        AuthSnapshot {
            loading,
            is_authenticated,
            is_admin,
            user: None,
        }
    }

    fn redirect(to: &str) -> GuardDecision {
        GuardDecision::Redirect(to.to_string())
    }

    #[test]
    fn test_loading_always_shows_loading() {
        for requirements in [RouteRequirements::admin(), RouteRequirements::public()] {
            assert_eq!(
                decide(&requirements, &snapshot(true, true, true)),
                GuardDecision::ShowLoading
            );
        }
    }

    #[test]
    fn test_admin_page() {
        let page = RouteRequirements::admin();
        assert_eq!(decide(&page, &snapshot(false, false, false)), redirect(UNAUTHORIZED_ROUTE));
        assert_eq!(decide(&page, &snapshot(false, true, false)), redirect(UNAUTHORIZED_ROUTE));
        assert_eq!(decide(&page, &snapshot(false, true, true)), GuardDecision::Render);
    }

    #[test]
    fn test_custom_redirect() {
        let page = RouteRequirements {
            redirect_to: Some("/login".to_string()),
            ..RouteRequirements::admin()
        };
        assert_eq!(decide(&page, &snapshot(false, false, false)), redirect("/login"));
        assert_eq!(decide(&page, &snapshot(false, true, false)), redirect("/login"));
    }

    #[test]
    fn test_authenticated_page_without_admin() {
        let page = RouteRequirements {
            require_admin: false,
            ..RouteRequirements::default()
        };
        assert_eq!(decide(&page, &snapshot(false, true, false)), GuardDecision::Render);
        assert_eq!(decide(&page, &snapshot(false, false, false)), redirect(UNAUTHORIZED_ROUTE));
    }

    #[test]
    fn test_public_page() {
        let page = RouteRequirements::public();
        assert_eq!(decide(&page, &snapshot(false, false, false)), GuardDecision::Render);
        assert_eq!(decide(&page, &snapshot(false, true, true)), redirect(DASHBOARD_ROUTE));
        assert_eq!(decide(&page, &snapshot(false, true, false)), GuardDecision::Render);
    }

    #[test]
    fn test_public_page_that_still_wants_admin() {
        let page = RouteRequirements {
            require_auth: false,
            require_admin: true,
            redirect_to: Some("/login".to_string()),
        };
        assert_eq!(decide(&page, &snapshot(false, false, false)), GuardDecision::Render);
        assert_eq!(decide(&page, &snapshot(false, true, false)), redirect("/login"));
        assert_eq!(decide(&page, &snapshot(false, true, true)), redirect(DASHBOARD_ROUTE));
    }
}
