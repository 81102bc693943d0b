use std::collections::HashMap;
use std::time::Duration;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::{Credentials, Region};
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::create_table::CreateTableError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::scan::ScanError;
use aws_sdk_dynamodb::operation::transact_write_items::TransactWriteItemsError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::{AttributeDefinition, AttributeValue, KeySchemaElement, KeyType, ProvisionedThroughput, ScalarAttributeType, TableStatus};
use serde_json::{Map, Number, Value};
use tracing::{debug, info, warn};
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::RepositoryStore;

// table holding one atomic counter per entity name
pub const SEQUENCES_TABLE: &str = "sequences";
pub const SEQUENCES_PK: &str = "sequence_name";
// table holding one guard item per unique field value
pub const UNIQUE_KEYS_TABLE: &str = "unique_keys";
pub const UNIQUE_KEYS_PK: &str = "unique_key";

pub async fn create_table(client: &Client,
                          table_name: &str, pk: &str,
                          pk_type: ScalarAttributeType) -> LibraryResult<()> {
    match client
        .create_table()
        .table_name(table_name)
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name(pk)
                .key_type(KeyType::Hash)
                .build(),
        )
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name(pk)
                .attribute_type(pk_type)
                .build(),
        )
        .provisioned_throughput(
            ProvisionedThroughput::builder()
                .read_capacity_units(10)
                .write_capacity_units(10)
                .build(),
        )
        .send()
        .await
    {
        Ok(_k) => {
            wait_until_table_status_is_not(client, table_name, TableStatus::Creating).await;
            info!(table = %table_name, "created table");
            Ok(())
        }
        Err(err) if table_in_use(&err) => {
            debug!(table = %table_name, "table already exists");
            Ok(())
        }
        Err(err) => {
            Err(LibraryError::database_or_unavailable(format!("failed to create {} table due to {}",
                                                              table_name, err).as_str(), None, false))
        }
    }
}

fn table_in_use(err: &SdkError<CreateTableError>) -> bool {
    matches!(err, SdkError::ServiceError(ctx) if matches!(ctx.err(), CreateTableError::ResourceInUseException(_)))
}

// creates the entity table along with the shared sequences and unique key tables,
// tables that already exist are left alone
pub async fn create_entity_tables(client: &Client, table_name: &str) {
    let tables = [
        (table_name, "id", ScalarAttributeType::N),
        (SEQUENCES_TABLE, SEQUENCES_PK, ScalarAttributeType::S),
        (UNIQUE_KEYS_TABLE, UNIQUE_KEYS_PK, ScalarAttributeType::S),
    ];
    for (table, pk, pk_type) in tables {
        if let Err(err) = create_table(client, table, pk, pk_type).await {
            warn!(table = %table, error = %err, "failed to create table");
        }
    }
}

pub async fn delete_table(client: &Client, table_name: &str) -> LibraryResult<()> {
    match client.delete_table().table_name(table_name).send().await {
        Ok(_k) => {
            wait_until_table_status_is_not(client, table_name, TableStatus::Deleting).await;
            Ok(())
        }
        Err(err) => {
            Err(LibraryError::database_or_unavailable(format!("failed to delete {} table due to {}",
                                                              table_name, err).as_str(), None, false))
        }
    }
}

async fn wait_until_table_status_is_not(client: &Client, table_name: &str, other_status: TableStatus) {
    for _i in 0..30 {
        match describe_table(client, table_name).await {
            Ok(status) => {
                if status != other_status {
                    return;
                }
            }
            Err(_err) => {}
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

async fn describe_table(client: &Client, table_name: &str) -> LibraryResult<TableStatus> {
    match client
        .describe_table()
        .table_name(table_name)
        .send()
        .await
    {
        Ok(out) => {
            if let Some(table) = out.table() {
                if let Some(status) = table.table_status() {
                    return Ok(status.clone());
                }
            }
            Err(LibraryError::runtime(format!("failed to describe {} table",
                                              table_name).as_str(), None))
        }
        Err(err) => {
            Err(LibraryError::database_or_unavailable(format!("failed to describe {} table due to {}",
                                                              table_name, err).as_str(), None, false))
        }
    }
}

pub fn parse_item(value: Value) -> Result<HashMap<String, AttributeValue>, String> {
    match value_to_item(value) {
        AttributeValue::M(map) => Ok(map),
        other => Err(format!("failed to parse{:?}", other)),
    }
}

pub fn parse_number_attribute(name: &str, map: &HashMap<String, AttributeValue>) -> Option<i64> {
    if let Some(AttributeValue::N(str)) = map.get(name) {
        if let Ok(n) = str.parse::<i64>() {
            return Some(n);
        }
    }
    None
}

fn value_to_item(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s),
        Value::Array(a) => AttributeValue::L(a.into_iter().map(value_to_item).collect()),
        Value::Object(o) => {
            AttributeValue::M(o.into_iter().map(|(k, v)| (k, value_to_item(v))).collect())
        }
    }
}

pub fn item_to_value(item: &HashMap<String, AttributeValue>) -> Value {
    let map: Map<String, Value> = item.iter()
        .map(|(k, v)| (k.clone(), attribute_to_value(v)))
        .collect();
    Value::Object(map)
}

fn attribute_to_value(attr: &AttributeValue) -> Value {
    match attr {
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::N(n) => number_to_value(n),
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::L(l) => Value::Array(l.iter().map(attribute_to_value).collect()),
        AttributeValue::M(m) => item_to_value(m),
        AttributeValue::Ss(ss) => Value::Array(ss.iter().map(|s| Value::String(s.clone())).collect()),
        AttributeValue::Ns(ns) => Value::Array(ns.iter().map(|n| number_to_value(n)).collect()),
        _ => Value::Null,
    }
}

fn number_to_value(n: &str) -> Value {
    if let Ok(i) = n.parse::<i64>() {
        return Value::Number(Number::from(i));
    }
    n.parse::<f64>().ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(n.to_string()))
}

// helper method to build db-client, local store points to the given endpoint
pub async fn build_db_client(store: RepositoryStore, endpoint: &str) -> Client {
    match store {
        RepositoryStore::LocalDynamoDB => {
            // See https://docs.aws.amazon.com/sdk-for-rust/latest/dg/dynamodb-local.html
            let dynamodb_local_config = aws_sdk_dynamodb::Config::builder()
                .region(Region::new("local"))
                .credentials_provider(
                    Credentials::new("AKIDLOCALSTACK", "localstacksecret", None, None, "faked"))
                .endpoint_url(endpoint)
                .build();
            Client::from_conf(dynamodb_local_config)
        }
        _ => {
            //Get config from environment.
            let config = aws_config::load_from_env().await;
            //Create the DynamoDB client.
            Client::new(&config)
        }
    }
}

impl From<SdkError<UpdateItemError>> for LibraryError {
    fn from(err: SdkError<UpdateItemError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

impl From<SdkError<GetItemError>> for LibraryError {
    fn from(err: SdkError<GetItemError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

impl From<SdkError<ScanError>> for LibraryError {
    fn from(err: SdkError<ScanError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

impl From<SdkError<TransactWriteItemsError>> for LibraryError {
    fn from(err: SdkError<TransactWriteItemsError>) -> Self {
        // a failed condition on a unique key guard cancels the whole transaction
        if let SdkError::ServiceError(ctx) = &err {
            if matches!(ctx.err(), TransactWriteItemsError::TransactionCanceledException(_)) {
                return LibraryError::conflict(format!("transaction canceled {:?}", ctx.err()).as_str());
            }
        }
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

fn retryable_sdk_error<T>(err: &SdkError<T>) -> (bool, Option<String>) {
    match err {
        SdkError::ConstructionFailure(_) => { (false, Some("ConstructionFailure".to_string())) }
        SdkError::TimeoutError(_) => { (true, Some("TimeoutError".to_string())) }
        SdkError::DispatchFailure(_) => { (true, Some("DispatchFailure".to_string())) }
        SdkError::ResponseError { .. } => { (true, Some("ResponseError".to_string())) }
        SdkError::ServiceError(ctx) => {
            (ctx.raw().http().status().is_server_error() || has_exceeded_limit(ctx.raw().http().body().bytes()), Some(ctx.raw().http().status().to_string()))
        }
        _ => { (true, Some("Unknown".to_string())) }
    }
}

// throughput and request limit errors carry "...ceeded" in their body
fn has_exceeded_limit(opts: Option<&[u8]>) -> bool {
    opts.map(|b| b.windows(6).any(|w| w == b"ceeded")).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::types::AttributeValue;
    use serde_json::json;
    use aws_sdk_dynamodb::types::ScalarAttributeType;
    use crate::core::repository::RepositoryStore;
    use crate::utils::ddb::{build_db_client, create_table, delete_table, has_exceeded_limit, item_to_value, parse_item, parse_number_attribute};

    #[tokio::test]
    async fn test_should_convert_json_to_item_and_back() {
        let value = json!({
            "id": 3,
            "title": "Emma",
            "price": "12.50",
            "tags": ["a", "b"],
            "audit": {"created_at": "2024-01-01T00:00:00"},
            "rating": 4.5,
        });
        let item = parse_item(value.clone()).expect("should parse item");
        assert_eq!(Some(&AttributeValue::N("3".to_string())), item.get("id"));
        assert_eq!(Some(3), parse_number_attribute("id", &item));
        assert_eq!(value, item_to_value(&item));
    }

    // needs DynamoDB local listening on localhost:8000
    #[tokio::test]
    #[ignore]
    async fn test_should_accept_existing_table() {
        let client = build_db_client(RepositoryStore::LocalDynamoDB, "http://localhost:8000").await;
        let _ = delete_table(&client, "existing_table").await;
        create_table(&client, "existing_table", "id", ScalarAttributeType::N).await.expect("should create table");
        create_table(&client, "existing_table", "id", ScalarAttributeType::N).await.expect("should accept existing table");
    }

    #[tokio::test]
    async fn test_should_reject_non_object_item() {
        assert!(parse_item(json!("text")).is_err());
    }

    #[tokio::test]
    async fn test_should_detect_exceeded_limit() {
        assert!(has_exceeded_limit(Some(b"ProvisionedThroughputExceeded".as_slice())));
        assert!(!has_exceeded_limit(Some(b"abc".as_slice())));
        assert!(!has_exceeded_limit(None));
    }
}
