use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::books::domain::model::BookEntity;

// BookDto is the representation of a book returned by the catalog API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDto {
    pub id: i64,
    pub title: String,
    pub isbn: String,
    pub price: BigDecimal,
    pub author_id: Option<i64>,
    #[serde(default, with = "opt_date")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, with = "opt_date")]
    pub updated_at: Option<NaiveDateTime>,
}

impl From<BookEntity> for BookDto {
    fn from(other: BookEntity) -> Self {
        BookDto {
            id: other.id.unwrap_or_default(),
            title: other.title,
            isbn: other.isbn,
            price: other.price,
            author_id: other.author_id,
            created_at: other.audit.map(|a| a.created_at),
            updated_at: other.audit.map(|a| a.updated_at),
        }
    }
}

// Request body of book create and update
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookPayload {
    pub title: String,
    pub isbn: String,
    pub price: BigDecimal,
    #[serde(default)]
    pub author_id: Option<i64>,
}

impl BookPayload {
    pub fn build_book(&self, id: Option<i64>) -> BookEntity {
        let mut book = BookEntity::new(self.title.as_str(), self.isbn.as_str(), self.price.clone(), self.author_id);
        book.id = id;
        book
    }
}

pub(crate) mod opt_date {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde::de::Error;
    use crate::utils::date::DATE_FMT;

    pub fn serialize<S: Serializer>(time: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => serializer.serialize_some(&t.format(DATE_FMT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error> {
        let str_time: Option<String> = Deserialize::deserialize(deserializer)?;
        str_time.map(|s| NaiveDateTime::parse_from_str(&s, DATE_FMT).map_err(D::Error::custom)).transpose()
    }
}
