use rocket::http::Method;
use rocket::request::FromParam;
use serde::{Deserialize, Serialize};

/// Every named group of documents the site persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Projects,
    Posts,
    Videos,
    Certificates,
    Jobs,
    Reviews,
    Qas,
    Messages,
    Newsletter,
    Settings,
    Admin,
}

impl Collection {
    pub const ALL: [Collection; 11] = [
        Collection::Projects,
        Collection::Posts,
        Collection::Videos,
        Collection::Certificates,
        Collection::Jobs,
        Collection::Reviews,
        Collection::Qas,
        Collection::Messages,
        Collection::Newsletter,
        Collection::Settings,
        Collection::Admin,
    ];

    /// Collections served by the generic per-collection handlers.
    /// Settings and admin have dedicated routes.
    pub const CONTENT: [Collection; 9] = [
        Collection::Projects,
        Collection::Posts,
        Collection::Videos,
        Collection::Certificates,
        Collection::Jobs,
        Collection::Reviews,
        Collection::Qas,
        Collection::Messages,
        Collection::Newsletter,
    ];

    /// Database collection / file name, also the `/api/<name>` path segment.
    pub fn name(self) -> &'static str {
        match self {
            Collection::Projects => "projects",
            Collection::Posts => "posts",
            Collection::Videos => "videos",
            Collection::Certificates => "certificates",
            Collection::Jobs => "jobs",
            Collection::Reviews => "reviews",
            Collection::Qas => "qas",
            Collection::Messages => "messages",
            Collection::Newsletter => "newsletter",
            Collection::Settings => "settings",
            Collection::Admin => "admin",
        }
    }

    /// Singular noun used by the edge API for single-document responses.
    pub fn singular(self) -> &'static str {
        match self {
            Collection::Projects => "project",
            Collection::Posts => "post",
            Collection::Videos => "video",
            Collection::Certificates => "certificate",
            Collection::Jobs => "job",
            Collection::Reviews => "review",
            Collection::Qas => "qa",
            Collection::Messages => "message",
            Collection::Newsletter => "subscription",
            Collection::Settings => "settings",
            Collection::Admin => "admin",
        }
    }

    /// Human label for "<Label> not found" errors.
    pub fn label(self) -> &'static str {
        match self {
            Collection::Projects => "Project",
            Collection::Posts => "Post",
            Collection::Videos => "Video",
            Collection::Certificates => "Certificate",
            Collection::Jobs => "Job",
            Collection::Reviews => "Review",
            Collection::Qas => "Q&A",
            Collection::Messages => "Message",
            Collection::Newsletter => "Subscription",
            Collection::Settings => "Settings",
            Collection::Admin => "Admin",
        }
    }

    /// Key prefix in the key-value store, e.g. `project:` + id.
    pub fn kv_prefix(self) -> String {
        format!("{}:", self.singular())
    }

    /// Path segment of the edge API. Q&As live under `/qa` there.
    pub fn edge_name(self) -> &'static str {
        match self {
            Collection::Qas => "qa",
            other => other.name(),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::CONTENT.into_iter().find(|c| c.name() == name)
    }

    /// Any collection a path segment may name. Settings resolves too so
    /// that verbs it does not serve answer 405 rather than 404.
    fn from_path(name: &str, path_name: fn(Collection) -> &'static str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .filter(|c| *c != Collection::Admin)
            .find(|c| path_name(*c) == name)
    }

    /// Verbs the collection's handler accepts (besides OPTIONS).
    pub fn allows(self, method: Method) -> bool {
        match self {
            Collection::Certificates | Collection::Reviews | Collection::Newsletter => {
                matches!(method, Method::Get | Method::Post | Method::Delete)
            }
            Collection::Settings => matches!(method, Method::Get | Method::Put),
            Collection::Admin => false,
            _ => matches!(
                method,
                Method::Get | Method::Post | Method::Put | Method::Delete
            ),
        }
    }

    /// Value of the `Access-Control-Allow-Methods` header for this handler.
    pub fn allow_header(self) -> String {
        let mut verbs: Vec<&str> = [Method::Get, Method::Post, Method::Put, Method::Delete]
            .into_iter()
            .filter(|m| self.allows(*m))
            .map(|m| m.as_str())
            .collect();
        verbs.push("OPTIONS");
        verbs.join(", ")
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// `/api/<collection>` path parameter.
#[derive(Debug, Clone, Copy)]
pub struct ApiCollection(pub Collection);

impl<'a> FromParam<'a> for ApiCollection {
    type Error = &'a str;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        Collection::from_path(param, Collection::name)
            .map(ApiCollection)
            .ok_or(param)
    }
}

/// `/edge/<collection>` path parameter. The edge API has no newsletter:
/// subscriptions only go through `/api/newsletter`.
#[derive(Debug, Clone, Copy)]
pub struct EdgeCollection(pub Collection);

impl<'a> FromParam<'a> for EdgeCollection {
    type Error = &'a str;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        Collection::from_path(param, Collection::edge_name)
            .filter(|c| *c != Collection::Newsletter)
            .map(EdgeCollection)
            .ok_or(param)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_for_content_collections() {
        for c in Collection::CONTENT {
            assert_eq!(Collection::from_name(c.name()), Some(c));
            if c != Collection::Newsletter {
                assert_eq!(EdgeCollection::from_param(c.edge_name()).map(|e| e.0), Ok(c));
            }
        }
    }

    #[test]
    fn settings_and_admin_are_not_generic_routes() {
        assert_eq!(Collection::from_name("settings"), None);
        assert_eq!(Collection::from_name("admin"), None);
        assert_eq!(Collection::from_name("nope"), None);
    }

    #[test]
    fn path_params_resolve_settings_but_not_admin() {
        assert_eq!(
            ApiCollection::from_param("settings").map(|c| c.0),
            Ok(Collection::Settings)
        );
        assert_eq!(
            EdgeCollection::from_param("qa").map(|c| c.0),
            Ok(Collection::Qas)
        );
        assert!(ApiCollection::from_param("admin").is_err());
        assert!(EdgeCollection::from_param("qas").is_err());
        assert!(EdgeCollection::from_param("newsletter").is_err());
    }

    #[test]
    fn qas_use_qa_on_the_edge() {
        assert_eq!(Collection::Qas.edge_name(), "qa");
        assert_eq!(Collection::Qas.kv_prefix(), "qa:");
        assert_eq!(Collection::Projects.kv_prefix(), "project:");
    }

    #[test]
    fn certificates_and_reviews_reject_put() {
        assert!(!Collection::Certificates.allows(Method::Put));
        assert!(!Collection::Reviews.allows(Method::Put));
        assert!(Collection::Projects.allows(Method::Put));
        assert_eq!(
            Collection::Certificates.allow_header(),
            "GET, POST, DELETE, OPTIONS"
        );
        assert_eq!(
            Collection::Videos.allow_header(),
            "GET, POST, PUT, DELETE, OPTIONS"
        );
    }
}
