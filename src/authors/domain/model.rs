use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::core::domain::{AuditInfo, Entity, Identifiable};

// AuthorEntity is a writer of catalog books; the books themselves point back
// to the author through their author_id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub firstname: String,
    pub lastname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<NaiveDate>,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit: Option<AuditInfo>,
}

impl AuthorEntity {
    pub fn new(firstname: &str, lastname: &str, birthdate: Option<NaiveDate>, country: &str) -> Self {
        Self {
            id: None,
            firstname: firstname.to_string(),
            lastname: lastname.to_string(),
            birthdate,
            country: country.to_string(),
            audit: None,
        }
    }
}

impl Identifiable for AuthorEntity {
    type Id = i64;

    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl Entity for AuthorEntity {
    const NAME: &'static str = "author";
    const LABEL: &'static str = "Author";

    fn audit(&self) -> Option<AuditInfo> {
        self.audit
    }

    fn assign(&mut self, id: i64, audit: AuditInfo) {
        self.id = Some(id);
        self.audit = Some(audit);
    }

    fn lookup_field(&self, field: &str) -> Option<String> {
        match field {
            "firstname" => Some(self.firstname.clone()),
            "lastname" => Some(self.lastname.clone()),
            "country" => Some(self.country.clone()),
            _ => None,
        }
    }
}
