use std::collections::HashSet;
use axum::http::Method;
use tracing::debug;
use crate::core::domain::{Configuration, SecurityPolicy};
use crate::core::library::{LibraryError, LibraryResult, Principal, Role};

pub const API_KEY_HEADER: &str = "X-API-Key";

// A single entry of the authorization table. Pattern segments written as
// {name} match any one path segment.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessRule {
    pub method: Method,
    pub pattern: &'static str,
    pub role: Role,
}

impl AccessRule {
    pub fn new(method: Method, pattern: &'static str, role: Role) -> Self {
        Self { method, pattern, role }
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        if self.method != *method {
            return false;
        }
        let expected: Vec<&str> = segments(self.pattern).collect();
        let actual: Vec<&str> = segments(path).collect();
        expected.len() == actual.len() && expected.iter().zip(actual.iter()).all(|(e, a)| {
            (e.starts_with('{') && e.ends_with('}') && !a.is_empty()) || e == a
        })
    }
}

fn segments(path: &str) -> impl Iterator<Item=&str> {
    path.trim_end_matches('/').split('/').skip(1)
}

#[derive(Debug, Clone)]
pub struct AuthorizationPolicy {
    rules: Vec<AccessRule>,
}

impl AuthorizationPolicy {
    pub fn new(rules: Vec<AccessRule>) -> Self {
        Self { rules }
    }

    pub fn for_policy(policy: SecurityPolicy) -> Self {
        let write_role = match policy {
            SecurityPolicy::AdminWrites => Role::Admin,
            SecurityPolicy::Open => Role::Any,
        };
        Self::new(vec![
            AccessRule::new(Method::GET, "/health", Role::Any),
            AccessRule::new(Method::GET, "/v1/books", Role::Any),
            AccessRule::new(Method::GET, "/v1/books/by-title", Role::Any),
            AccessRule::new(Method::GET, "/v1/books/by-isbn", Role::Any),
            AccessRule::new(Method::GET, "/v1/books/{id}", Role::Any),
            AccessRule::new(Method::POST, "/v1/books", write_role),
            AccessRule::new(Method::PUT, "/v1/books/{id}", write_role),
            AccessRule::new(Method::DELETE, "/v1/books/{id}", write_role),
            AccessRule::new(Method::GET, "/v1/authors", Role::Any),
            AccessRule::new(Method::GET, "/v1/authors/{id}", Role::Any),
            AccessRule::new(Method::POST, "/v1/authors", write_role),
            AccessRule::new(Method::PUT, "/v1/authors/{id}", write_role),
            AccessRule::new(Method::DELETE, "/v1/authors/{id}", write_role),
        ])
    }

    // role of the first matching rule, None when no rule covers the request
    pub fn required_role(&self, method: &Method, path: &str) -> Option<Role> {
        self.rules.iter().find(|r| r.matches(method, path)).map(|r| r.role)
    }

    pub fn authorize(&self, method: &Method, path: &str, principal: Principal) -> LibraryResult<()> {
        match self.required_role(method, path) {
            Some(role) if principal.satisfies(role) => Ok(()),
            Some(role) => {
                debug!(method = %method, path = %path, principal = %principal, role = %role, "access denied");
                Err(LibraryError::access_denied(
                    format!("{} {} requires {} role", method, path, role).as_str(), Some(role.to_string())))
            }
            None => {
                debug!(method = %method, path = %path, "no access rule");
                Err(LibraryError::access_denied(
                    format!("{} {} is not allowed", method, path).as_str(), None))
            }
        }
    }
}

// API keys that identify callers
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    admin: HashSet<String>,
    user: HashSet<String>,
}

impl ApiKeys {
    pub fn new(admin: &[String], user: &[String]) -> Self {
        Self {
            admin: admin.iter().cloned().collect(),
            user: user.iter().cloned().collect(),
        }
    }

    pub fn from_config(config: &Configuration) -> Self {
        Self::new(&config.admin_keys, &config.user_keys)
    }

    pub fn resolve(&self, key: Option<&str>) -> Principal {
        match key {
            Some(k) if self.admin.contains(k) => Principal::Admin,
            Some(k) if self.user.contains(k) => Principal::User,
            _ => Principal::Anonymous,
        }
    }
}
