use std::collections::HashMap;
use std::marker::PhantomData;
use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{AttributeValue, Delete, Put, ReturnValue, TransactWriteItem};
use chrono::Utc;
use tracing::debug;
use crate::core::domain::{AuditInfo, Entity};
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::EntityStore;
use crate::utils::ddb::{item_to_value, parse_item, parse_number_attribute, SEQUENCES_PK, SEQUENCES_TABLE, UNIQUE_KEYS_PK, UNIQUE_KEYS_TABLE};

// DynamoDB store keyed by a numeric id. Ids come from an atomic counter in the
// sequences table and unique fields are guarded by items in the unique keys
// table that are written in the same transaction as the record.
#[derive(Debug)]
pub struct DDBRepository<T: Entity<Id=i64>> {
    client: Client,
    table_name: String,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity<Id=i64>> DDBRepository<T> {
    pub fn new(client: Client, table_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            _entity: PhantomData,
        }
    }

    fn guard_key(field: &str, value: &str) -> String {
        format!("{}:{}#{}", T::NAME, field, value)
    }

    async fn next_id(&self) -> LibraryResult<i64> {
        let out = self.client
            .update_item()
            .table_name(SEQUENCES_TABLE)
            .key(SEQUENCES_PK, AttributeValue::S(T::NAME.to_string()))
            .update_expression("ADD next_id :one")
            .expression_attribute_values(":one", AttributeValue::N("1".to_string()))
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await?;
        out.attributes()
            .and_then(|attrs| parse_number_attribute("next_id", attrs))
            .ok_or_else(|| LibraryError::runtime(
                format!("failed to allocate {} id", T::NAME).as_str(), None))
    }

    async fn owner_of(&self, field: &str, value: &str) -> LibraryResult<Option<i64>> {
        let out = self.client
            .get_item()
            .table_name(UNIQUE_KEYS_TABLE)
            .key(UNIQUE_KEYS_PK, AttributeValue::S(Self::guard_key(field, value)))
            .consistent_read(true)
            .send()
            .await?;
        Ok(out.item().and_then(|item| parse_number_attribute("owner_id", item)))
    }

    fn put_guard(&self, field: &str, value: &str, owner_id: i64) -> TransactWriteItem {
        TransactWriteItem::builder()
            .put(Put::builder()
                .table_name(UNIQUE_KEYS_TABLE)
                .item(UNIQUE_KEYS_PK, AttributeValue::S(Self::guard_key(field, value)))
                .item("owner_id", AttributeValue::N(owner_id.to_string()))
                .condition_expression("attribute_not_exists(unique_key) OR owner_id = :owner")
                .expression_attribute_values(":owner", AttributeValue::N(owner_id.to_string()))
                .build())
            .build()
    }

    fn delete_guard(&self, field: &str, value: &str) -> TransactWriteItem {
        TransactWriteItem::builder()
            .delete(Delete::builder()
                .table_name(UNIQUE_KEYS_TABLE)
                .key(UNIQUE_KEYS_PK, AttributeValue::S(Self::guard_key(field, value)))
                .build())
            .build()
    }
}

fn to_item<T: Entity>(entity: &T) -> LibraryResult<HashMap<String, AttributeValue>> {
    let val = serde_json::to_value(entity)?;
    Ok(parse_item(val)?)
}

fn from_item<T: Entity>(item: &HashMap<String, AttributeValue>) -> LibraryResult<T> {
    Ok(serde_json::from_value(item_to_value(item))?)
}

#[async_trait]
impl<T: Entity<Id=i64>> EntityStore<T> for DDBRepository<T> {
    async fn get_by_id(&self, id: i64) -> LibraryResult<Option<T>> {
        let table_name: &str = self.table_name.as_ref();
        let out = self.client
            .get_item()
            .table_name(table_name)
            .key("id", AttributeValue::N(id.to_string()))
            .consistent_read(true)
            .send()
            .await?;
        match out.item() {
            Some(item) => Ok(Some(from_item(item)?)),
            None => Ok(None),
        }
    }

    async fn get_by_unique_field(&self, field: &str, value: &str) -> LibraryResult<Option<T>> {
        if T::unique_fields().contains(&field) {
            return match self.owner_of(field, value).await? {
                Some(id) => self.get_by_id(id).await,
                None => Ok(None),
            };
        }
        let all = self.get_all().await?;
        Ok(all.into_iter().find(|e| e.lookup_field(field).as_deref() == Some(value)))
    }

    async fn get_page(&self, page_number: usize, page_size: usize) -> LibraryResult<(Vec<T>, usize)> {
        let all = self.get_all().await?;
        let total = all.len();
        let skip = page_number.checked_mul(page_size).unwrap_or(usize::MAX);
        Ok((all.into_iter().skip(skip).take(page_size).collect(), total))
    }

    async fn get_all(&self) -> LibraryResult<Vec<T>> {
        let table_name: &str = self.table_name.as_ref();
        let mut records: Vec<T> = vec![];
        let mut exclusive_start_key = None;
        loop {
            let out = self.client
                .scan()
                .table_name(table_name)
                .consistent_read(true)
                .set_exclusive_start_key(exclusive_start_key)
                .send()
                .await?;
            for item in out.items().unwrap_or_default() {
                records.push(from_item(item)?);
            }
            match out.last_evaluated_key() {
                Some(key) => exclusive_start_key = Some(key.clone()),
                None => break,
            }
        }
        records.sort_by_key(|e| e.id());
        Ok(records)
    }

    async fn upsert(&self, entity: &T) -> LibraryResult<T> {
        let now = Utc::now().naive_utc();
        let table_name: &str = self.table_name.as_ref();
        let existing = match entity.id() {
            Some(id) => self.get_by_id(id).await?,
            None => None,
        };
        let mut saved = entity.clone();
        match existing.as_ref().and_then(|e| e.id().map(|id| (id, e.audit()))) {
            Some((id, audit)) => {
                saved.assign(id, audit.map(|a| a.touch(now)).unwrap_or_else(|| AuditInfo::new(now)));
            }
            None => {
                saved.assign(self.next_id().await?, AuditInfo::new(now));
            }
        }
        let id = saved.id().ok_or_else(|| LibraryError::runtime("saved entity without id", None))?;

        let mut request = self.client
            .transact_write_items()
            .transact_items(TransactWriteItem::builder()
                .put(Put::builder()
                    .table_name(table_name)
                    .set_item(Some(to_item(&saved)?))
                    .build())
                .build());
        for field in T::unique_fields() {
            let new_value = saved.lookup_field(field);
            let old_value = existing.as_ref().and_then(|e| e.lookup_field(field));
            if let Some(ref value) = new_value {
                request = request.transact_items(self.put_guard(field, value, id));
            }
            if let Some(value) = old_value {
                if new_value.as_deref() != Some(value.as_str()) {
                    request = request.transact_items(self.delete_guard(field, &value));
                }
            }
        }
        request.send().await.map_err(|err| match LibraryError::from(err) {
            LibraryError::Conflict { .. } => LibraryError::conflict(
                format!("{} with one of {:?} already exists.", T::LABEL, T::unique_fields()).as_str()),
            other => other,
        })?;
        debug!(entity = T::NAME, id = id, "stored");
        Ok(saved)
    }

    async fn exists_by_id(&self, id: i64) -> LibraryResult<bool> {
        Ok(self.get_by_id(id).await?.is_some())
    }

    async fn delete_by_id(&self, id: i64) -> LibraryResult<()> {
        let table_name: &str = self.table_name.as_ref();
        let existing = match self.get_by_id(id).await? {
            Some(e) => e,
            None => return Ok(()),
        };
        let mut request = self.client
            .transact_write_items()
            .transact_items(TransactWriteItem::builder()
                .delete(Delete::builder()
                    .table_name(table_name)
                    .key("id", AttributeValue::N(id.to_string()))
                    .build())
                .build());
        for field in T::unique_fields() {
            if let Some(value) = existing.lookup_field(field) {
                request = request.transact_items(self.delete_guard(field, &value));
            }
        }
        request.send().await?;
        Ok(())
    }
}
