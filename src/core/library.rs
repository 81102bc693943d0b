use std::fmt;
use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("{message}")]
    NotFound {
        message: String,
    },
    // Raised when a unique field (e.g. isbn) already belongs to another record or
    // when a delete is refused because other records still reference the entity.
    #[error("{message}")]
    Conflict {
        message: String,
    },
    #[error("{message} {reason_code:?}")]
    Validation {
        message: String,
        reason_code: Option<String>,
    },
    #[error("{message} {reason_code:?}")]
    AccessDenied {
        message: String,
        reason_code: Option<String>,
    },
    // Storage or cache could not be reached; retryable tells the caller whether
    // the same request may succeed later.
    #[error("{message} {reason_code:?} {retryable}")]
    Unavailable {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    #[error("{message}")]
    Serialization {
        message: String,
    },
    #[error("{message} {reason_code:?}")]
    Runtime {
        message: String,
        reason_code: Option<String>,
    },
}

impl LibraryError {
    pub fn not_found(message: &str) -> LibraryError {
        LibraryError::NotFound { message: message.to_string() }
    }

    /// Builds the not-found error for a lookup of `label` by `field`,
    /// e.g. `Book with isbn: 978-0 not found.`
    pub fn entity_not_found(label: &str, field: &str, value: &dyn Display) -> LibraryError {
        LibraryError::not_found(format!("{} with {}: {} not found.", label, field, value).as_str())
    }

    pub fn conflict(message: &str) -> LibraryError {
        LibraryError::Conflict { message: message.to_string() }
    }

    pub fn validation(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Validation { message: message.to_string(), reason_code }
    }

    pub fn access_denied(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::AccessDenied { message: message.to_string(), reason_code }
    }

    pub fn unavailable(message: &str, reason_code: Option<String>, retryable: bool) -> LibraryError {
        LibraryError::Unavailable { message: message.to_string(), reason_code, retryable }
    }

    pub fn database_or_unavailable(message: &str, reason: Option<String>, retryable: bool) -> LibraryError {
        if retryable {
            LibraryError::unavailable(
                format!("database unavailable error {:?} {:?}", message, reason).as_str(), reason, true)
        } else if let Some(ref reason_val) = reason {
            if reason_val.as_str().contains("404") {
                LibraryError::not_found(
                    format!("not found error {:?} {:?}", message, reason).as_str())
            } else if reason_val.as_str().contains("400") {
                LibraryError::validation(
                    format!("rejected request error {:?} {:?}", message, reason).as_str(), reason)
            } else {
                LibraryError::unavailable(
                    format!("database error {:?} {:?}", message, reason).as_str(), reason, false)
            }
        } else {
            LibraryError::unavailable(
                format!("database error {:?} {:?}", message, reason).as_str(), reason, false)
        }
    }

    pub fn serialization(message: &str) -> LibraryError {
        LibraryError::Serialization { message: message.to_string() }
    }

    pub fn runtime(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Runtime { message: message.to_string(), reason_code }
    }

    pub fn retryable(&self) -> bool {
        match self {
            LibraryError::NotFound { .. } => { false }
            LibraryError::Conflict { .. } => { false }
            LibraryError::Validation { .. } => { false }
            LibraryError::AccessDenied { .. } => { false }
            LibraryError::Unavailable { retryable, .. } => { *retryable }
            LibraryError::Serialization { .. } => { false }
            LibraryError::Runtime { .. } => { false }
        }
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        LibraryError::serialization(
            format!("serde json parsing {:?}", err).as_str())
    }
}

impl From<String> for LibraryError {
    fn from(err: String) -> Self {
        LibraryError::serialization(
            format!("serde parsing {:?}", err).as_str())
    }
}

impl From<redis::RedisError> for LibraryError {
    fn from(err: redis::RedisError) -> Self {
        let retryable = err.is_io_error() || err.is_timeout() || err.is_connection_dropped();
        LibraryError::unavailable(
            format!("cache error {}", err).as_str(), Some(format!("{:?}", err.kind())), retryable)
    }
}

/// A specialized Result type for the library services and repositories.
pub type LibraryResult<T> = Result<T, LibraryError>;

// One page of a collection in primary-key order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    // records of this page
    pub items: Vec<T>,
    // size of the whole collection
    pub total_elements: usize,
    pub total_pages: usize,
    // zero-based page number
    pub page_number: usize,
    pub page_size: usize,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total_elements: usize, page_number: usize, page_size: usize) -> Self {
        let total_pages = if page_size == 0 { 0 } else { (total_elements + page_size - 1) / page_size };
        PaginatedResult {
            items,
            total_elements,
            total_pages,
            page_number,
            page_size,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> PaginatedResult<U> {
        PaginatedResult {
            items: self.items.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            page_number: self.page_number,
            page_size: self.page_size,
        }
    }
}

// Role required by an access rule
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Role {
    Any,
    Authenticated,
    Admin,
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Any" => Role::Any,
            "Authenticated" => Role::Authenticated,
            "Admin" => Role::Admin,
            _ => Role::Admin,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Role::Any => write!(f, "Any"),
            Role::Authenticated => write!(f, "Authenticated"),
            Role::Admin => write!(f, "Admin"),
        }
    }
}

// Caller identity resolved from the request
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Principal {
    Anonymous,
    User,
    Admin,
}

impl Principal {
    pub fn satisfies(&self, role: Role) -> bool {
        match role {
            Role::Any => true,
            Role::Authenticated => *self != Principal::Anonymous,
            Role::Admin => *self == Principal::Admin,
        }
    }
}

impl From<String> for Principal {
    fn from(s: String) -> Self {
        match s.as_str() {
            "User" => Principal::User,
            "Admin" => Principal::Admin,
            _ => Principal::Anonymous,
        }
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Principal::Anonymous => write!(f, "Anonymous"),
            Principal::User => write!(f, "User"),
            Principal::Admin => write!(f, "Admin"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::library::{LibraryError, PaginatedResult, Principal, Role};

    #[tokio::test]
    async fn test_should_create_not_found_error() {
        assert!(matches!(LibraryError::not_found("test"), LibraryError::NotFound{ message: _ }));
        let err = LibraryError::entity_not_found("Book", "id", &7);
        assert_eq!("Book with id: 7 not found.", err.to_string());
    }

    #[tokio::test]
    async fn test_should_create_conflict_error() {
        assert!(matches!(LibraryError::conflict("test"), LibraryError::Conflict{ message: _ }));
    }

    #[tokio::test]
    async fn test_should_create_validation_error() {
        assert!(matches!(LibraryError::validation("test", None), LibraryError::Validation{ message: _, reason_code: _ }));
    }

    #[tokio::test]
    async fn test_should_create_access_error() {
        assert!(matches!(LibraryError::access_denied("test", None), LibraryError::AccessDenied{ message: _, reason_code: _ }));
    }

    #[tokio::test]
    async fn test_should_create_unavailable_error() {
        assert!(matches!(LibraryError::unavailable("test", None, false), LibraryError::Unavailable{ message: _, reason_code: _, retryable: _ }));
    }

    #[tokio::test]
    async fn test_should_create_serialization_error() {
        assert!(matches!(LibraryError::serialization("test"), LibraryError::Serialization{ message: _ }));
    }

    #[tokio::test]
    async fn test_should_create_runtime_error() {
        assert!(matches!(LibraryError::runtime("test", None), LibraryError::Runtime{ message: _, reason_code: _ }));
    }

    #[tokio::test]
    async fn test_should_create_database_or_unavailable_error() {
        assert!(matches!(LibraryError::database_or_unavailable("test", None, true), LibraryError::Unavailable{ message: _, reason_code: _, retryable: true }));
        assert!(matches!(LibraryError::database_or_unavailable("test", Some("404".to_string()), false), LibraryError::NotFound{ message: _ }));
        assert!(matches!(LibraryError::database_or_unavailable("test", Some("400".to_string()), false), LibraryError::Validation{ message: _, reason_code: _ }));
        assert!(matches!(LibraryError::database_or_unavailable("test", Some("500".to_string()), false), LibraryError::Unavailable{ message: _, reason_code: _, retryable: false }));
        assert!(matches!(LibraryError::database_or_unavailable("test", None, false), LibraryError::Unavailable{ message: _, reason_code: _, retryable: false }));
    }

    #[tokio::test]
    async fn test_should_create_retryable_error() {
        assert!(!LibraryError::not_found("test").retryable());
        assert!(!LibraryError::conflict("test").retryable());
        assert!(!LibraryError::validation("test", None).retryable());
        assert!(!LibraryError::access_denied("test", None).retryable());
        assert!(!LibraryError::unavailable("test", None, false).retryable());
        assert!(LibraryError::unavailable("test", None, true).retryable());
        assert!(!LibraryError::serialization("test").retryable());
        assert!(!LibraryError::runtime("test", None).retryable());
    }

    #[tokio::test]
    async fn test_should_compute_total_pages() {
        let page = PaginatedResult::new(vec![1, 2], 12, 0, 5);
        assert_eq!(3, page.total_pages);
        let empty: PaginatedResult<i32> = PaginatedResult::new(vec![], 0, 0, 10);
        assert_eq!(0, empty.total_pages);
        let mapped = page.map(|i| i * 10);
        assert_eq!(vec![10, 20], mapped.items);
        assert_eq!(12, mapped.total_elements);
    }

    #[tokio::test]
    async fn test_should_format_roles() {
        for role in vec![Role::Any, Role::Authenticated, Role::Admin] {
            assert_eq!(role, Role::from(role.to_string()));
        }
        assert_eq!(Role::Admin, Role::from("bogus".to_string()));
    }

    #[tokio::test]
    async fn test_should_match_principal_to_role() {
        assert!(Principal::Anonymous.satisfies(Role::Any));
        assert!(!Principal::Anonymous.satisfies(Role::Authenticated));
        assert!(Principal::User.satisfies(Role::Authenticated));
        assert!(!Principal::User.satisfies(Role::Admin));
        assert!(Principal::Admin.satisfies(Role::Admin));
        for principal in vec![Principal::Anonymous, Principal::User, Principal::Admin] {
            assert_eq!(principal, Principal::from(principal.to_string()));
        }
    }
}
