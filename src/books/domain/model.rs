use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use crate::core::domain::{AuditInfo, Entity, Identifiable};

// BookEntity is a catalog title identified by its isbn and optionally written
// by one author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    pub isbn: String,
    pub price: BigDecimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit: Option<AuditInfo>,
}

impl BookEntity {
    pub fn new(title: &str, isbn: &str, price: BigDecimal, author_id: Option<i64>) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            isbn: isbn.to_string(),
            price,
            author_id,
            audit: None,
        }
    }

    /// Lookup keys live under their own namespace so a title or isbn such as
    /// "1" never collides with the id key `book:1`.
    pub fn isbn_key(isbn: &str) -> String {
        format!("book:isbn:{}", isbn)
    }

    /// Namespaced like [`BookEntity::isbn_key`].
    pub fn title_key(title: &str) -> String {
        format!("book:title:{}", title)
    }
}

impl Identifiable for BookEntity {
    type Id = i64;

    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl Entity for BookEntity {
    const NAME: &'static str = "book";
    const LABEL: &'static str = "Book";

    fn audit(&self) -> Option<AuditInfo> {
        self.audit
    }

    fn assign(&mut self, id: i64, audit: AuditInfo) {
        self.id = Some(id);
        self.audit = Some(audit);
    }

    fn unique_fields() -> &'static [&'static str] {
        &["isbn"]
    }

    fn lookup_field(&self, field: &str) -> Option<String> {
        match field {
            "isbn" => Some(self.isbn.clone()),
            "title" => Some(self.title.clone()),
            "author_id" => self.author_id.map(|id| id.to_string()),
            _ => None,
        }
    }

    fn lookup_prefixes() -> Vec<String> {
        vec![BookEntity::isbn_key(""), BookEntity::title_key("")]
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;
    use crate::books::domain::model::BookEntity;
    use crate::core::domain::Entity;
    use crate::core::repository::memory_repository::MemoryRepository;
    use crate::core::service::EntityService;

    #[tokio::test]
    async fn test_should_build_books() {
        let book = BookEntity::new("Book1", "ISBN1", BigDecimal::from(2500), Some(1));
        assert_eq!("ISBN1", book.isbn.as_str());
        assert_eq!(Some("Book1".to_string()), book.lookup_field("title"));
        assert_eq!(Some("1".to_string()), book.lookup_field("author_id"));
        assert_eq!(None, book.lookup_field("price"));
        assert_eq!(vec!["book:isbn:".to_string(), "book:title:".to_string()], BookEntity::lookup_prefixes());
    }

    #[tokio::test]
    async fn test_should_keep_lookup_keys_apart_from_id_keys() {
        let id_key = EntityService::<BookEntity, MemoryRepository<BookEntity>>::id_key(1);
        assert_eq!("book:1", id_key);
        assert_eq!("book:title:1", BookEntity::title_key("1"));
        assert_eq!("book:isbn:1", BookEntity::isbn_key("1"));
        assert_ne!(id_key, BookEntity::title_key("1"));
        assert!(!id_key.starts_with(BookEntity::title_key("").as_str()));
    }

    #[tokio::test]
    async fn test_should_omit_missing_fields_in_json() {
        let book = BookEntity::new("Book1", "ISBN1", BigDecimal::from(370), None);
        let json = serde_json::to_value(&book).expect("should serialize");
        assert!(json.get("id").is_none());
        assert!(json.get("author_id").is_none());
        let loaded: BookEntity = serde_json::from_value(json).expect("should deserialize");
        assert_eq!(book, loaded);
    }
}
