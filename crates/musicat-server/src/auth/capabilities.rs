//! Role to capability mapping, checked once per request by
//! [`require_capability`](super::middleware::require_capability).

use musicat_db::entities::user::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    GenerateReports,
    ViewAdminStats,
    ModerateComments,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::GenerateReports => "generate_reports",
            Capability::ViewAdminStats => "view_admin_stats",
            Capability::ModerateComments => "moderate_comments",
        }
    }
}

/// Everything a role may do beyond acting on its own content.
pub fn capabilities(role: UserRole) -> &'static [Capability] {
    match role {
        UserRole::Admin => &[
            Capability::GenerateReports,
            Capability::ViewAdminStats,
            Capability::ModerateComments,
        ],
        UserRole::Moderator => &[Capability::ModerateComments],
        UserRole::User => &[],
    }
}

pub fn has_capability(role: UserRole, capability: Capability) -> bool {
    capabilities(role).contains(&capability)
}

/// Parse the role carried in a token claim.
pub fn parse_role(role: &str) -> Option<UserRole> {
    match role {
        "admin" => Some(UserRole::Admin),
        "moderator" => Some(UserRole::Moderator),
        "user" => Some(UserRole::User),
        _ => None,
    }
}
