use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use crate::authors::domain::model::AuthorEntity;
use crate::books::dto::{BookDto, opt_date};

// AuthorDto is the representation of an author returned by the catalog API,
// books are only filled in when a single author is read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorDto {
    pub id: i64,
    pub firstname: String,
    pub lastname: String,
    pub birthdate: Option<NaiveDate>,
    pub country: String,
    #[serde(default, with = "opt_date")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, with = "opt_date")]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub books: Option<Vec<BookDto>>,
}

impl AuthorDto {
    pub fn with_books(mut self, books: Vec<BookDto>) -> Self {
        self.books = Some(books);
        self
    }
}

impl From<AuthorEntity> for AuthorDto {
    fn from(other: AuthorEntity) -> Self {
        AuthorDto {
            id: other.id.unwrap_or_default(),
            firstname: other.firstname,
            lastname: other.lastname,
            birthdate: other.birthdate,
            country: other.country,
            created_at: other.audit.map(|a| a.created_at),
            updated_at: other.audit.map(|a| a.updated_at),
            books: None,
        }
    }
}

// Request body of author create and update
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthorPayload {
    pub firstname: String,
    pub lastname: String,
    #[serde(default)]
    pub birthdate: Option<NaiveDate>,
    #[serde(default)]
    pub country: String,
}

impl AuthorPayload {
    pub fn build_author(&self, id: Option<i64>) -> AuthorEntity {
        let mut author = AuthorEntity::new(self.firstname.as_str(), self.lastname.as_str(),
                                           self.birthdate, self.country.as_str());
        author.id = id;
        author
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;
    use crate::authors::dto::{AuthorDto, AuthorPayload};
    use crate::books::domain::model::BookEntity;
    use crate::books::dto::BookDto;

    #[tokio::test]
    async fn test_should_parse_author_payload() {
        let payload: AuthorPayload = serde_json::from_str(
            r#"{"firstname":"Jane","lastname":"Austen","birthdate":"1775-12-16","country":"United Kingdom"}"#)
            .expect("should parse payload");
        let author = payload.build_author(None);
        assert_eq!(NaiveDate::from_ymd_opt(1775, 12, 16), author.birthdate);
        assert_eq!("United Kingdom", author.country);
    }

    #[tokio::test]
    async fn test_should_attach_books() {
        let payload: AuthorPayload = serde_json::from_str(r#"{"firstname":"Jane","lastname":"Austen"}"#)
            .expect("should parse payload");
        let dto = AuthorDto::from(payload.build_author(Some(2)));
        let json = serde_json::to_value(&dto).expect("should serialize");
        assert!(json.get("books").is_none());

        let mut book = BookEntity::new("Emma", "ISBN1", BigDecimal::from(1), Some(2));
        book.id = Some(1);
        let dto = dto.with_books(vec![BookDto::from(book)]);
        let json = serde_json::to_value(&dto).expect("should serialize");
        assert_eq!(1, json["books"].as_array().map(|b| b.len()).unwrap_or_default());
        assert_eq!(2, json["id"]);
    }
}
