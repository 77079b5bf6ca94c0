//! DynamoDB-backed table store.

use crate::error::StoreError;
use crate::item::{AttributeValue, Condition, Item, Key};
use crate::store::{Page, PutRequest, QueryRequest, ScanRequest, TableStore, UpdateRequest};
use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::{Credentials, Region};
use aws_sdk_dynamodb::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::types::{AttributeValue as DynamoValue, ReturnValue};
use lifetracker_config::StorageConfig;
use log::{debug, info};
use std::collections::HashMap;

type DynamoItem = HashMap<String, DynamoValue>;

/// Table store talking to DynamoDB through the AWS SDK.
#[derive(Debug, Clone)]
pub struct DynamoDbTableStore {
    client: Client,
}

impl DynamoDbTableStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the storage settings.
    ///
    /// Static credentials are used when configured; otherwise the default
    /// provider chain applies.
    pub async fn from_config(storage: &StorageConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(storage.region.clone()));
        if let Some(endpoint) = &storage.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        if let Some(credentials) = &storage.credentials {
            loader = loader.credentials_provider(Credentials::new(
                credentials.access_key_id.clone(),
                credentials.secret_access_key.clone(),
                credentials.session_token.clone(),
                None,
                "lifetracker-config",
            ));
        }
        let sdk_config = loader.load().await;
        info!(
            "configured dynamodb client (region={}, endpoint={})",
            storage.region,
            storage.endpoint_url.as_deref().unwrap_or("default")
        );
        Self::new(Client::new(&sdk_config))
    }
}

/// Placeholder names and values collected while rendering expressions.
#[derive(Default)]
struct Expression {
    names: HashMap<String, String>,
    values: HashMap<String, DynamoValue>,
}

impl Expression {
    fn name(&mut self, attribute: &str) -> String {
        let placeholder = format!("#n{}", self.names.len());
        self.names.insert(placeholder.clone(), attribute.to_string());
        placeholder
    }

    fn value(&mut self, value: &AttributeValue) -> String {
        let placeholder = format!(":v{}", self.values.len());
        self.values.insert(placeholder.clone(), to_dynamo(value));
        placeholder
    }

    fn condition(&mut self, condition: &Condition) -> String {
        let name = self.name(condition.attribute());
        match condition {
            Condition::Equals { value, .. } => format!("{name} = {}", self.value(value)),
            Condition::AtLeast { value, .. } => format!("{name} >= {}", self.value(value)),
            Condition::AtMost { value, .. } => format!("{name} <= {}", self.value(value)),
            Condition::Contains { value, .. } => {
                format!("contains({name}, {})", self.value(&AttributeValue::S(value.clone())))
            }
        }
    }

    fn filter(&mut self, conditions: &[Condition]) -> Option<String> {
        if conditions.is_empty() {
            return None;
        }
        let parts: Vec<String> = conditions.iter().map(|c| self.condition(c)).collect();
        Some(parts.join(" AND "))
    }

    fn into_parts(
        self,
    ) -> (
        Option<HashMap<String, String>>,
        Option<HashMap<String, DynamoValue>>,
    ) {
        let names = (!self.names.is_empty()).then_some(self.names);
        let values = (!self.values.is_empty()).then_some(self.values);
        (names, values)
    }
}

fn to_dynamo(value: &AttributeValue) -> DynamoValue {
    match value {
        AttributeValue::S(text) => DynamoValue::S(text.clone()),
        AttributeValue::N(number) => DynamoValue::N(number.clone()),
        AttributeValue::Bool(flag) => DynamoValue::Bool(*flag),
        AttributeValue::Null => DynamoValue::Null(true),
    }
}

fn to_dynamo_item(item: &Item) -> DynamoItem {
    item.iter()
        .map(|(name, value)| (name.clone(), to_dynamo(value)))
        .collect()
}

fn from_dynamo_item(table: &str, operation: &'static str, item: DynamoItem) -> Result<Item, StoreError> {
    item.into_iter()
        .map(|(name, value)| {
            let value = match value {
                DynamoValue::S(text) => AttributeValue::S(text),
                DynamoValue::N(number) => AttributeValue::N(number),
                DynamoValue::Bool(flag) => AttributeValue::Bool(flag),
                DynamoValue::Null(_) => AttributeValue::Null,
                other => {
                    return Err(StoreError::Backend {
                        table: table.to_string(),
                        operation,
                        message: format!("attribute `{name}` has unsupported type {other:?}"),
                    });
                }
            };
            Ok((name, value))
        })
        .collect()
}

/// Text DynamoDB uses when a query names an index the table lacks.
const MISSING_INDEX_MESSAGE: &str = "does not have the specified index";

fn page_limit(limit: Option<usize>) -> Option<i32> {
    limit.map(|limit| i32::try_from(limit).unwrap_or(i32::MAX))
}

/// Map a service error code onto the store taxonomy.
fn classify(
    table: &str,
    operation: &'static str,
    index: Option<&str>,
    code: Option<&str>,
    message: &str,
) -> StoreError {
    let table_name = table.to_string();
    let message_text = message.to_string();
    match code {
        Some("ResourceNotFoundException") => StoreError::TableNotFound { table: table_name },
        Some("ValidationException")
            if index.is_some() && message.contains(MISSING_INDEX_MESSAGE) =>
        {
            StoreError::IndexNotFound {
                table: table_name,
                index: index.unwrap_or_default().to_string(),
            }
        }
        Some("ConditionalCheckFailedException") => StoreError::ConditionFailed { table: table_name },
        Some(
            "ProvisionedThroughputExceededException"
            | "ThrottlingException"
            | "RequestLimitExceeded",
        ) => StoreError::Throttled {
            table: table_name,
            operation,
            message: message_text,
        },
        Some("AccessDeniedException" | "UnrecognizedClientException") => StoreError::AccessDenied {
            table: table_name,
            operation,
            message: message_text,
        },
        _ => StoreError::Backend {
            table: table_name,
            operation,
            message: message_text,
        },
    }
}

fn map_sdk_error<E, R>(
    table: &str,
    operation: &'static str,
    index: Option<&str>,
    err: SdkError<E, R>,
) -> StoreError
where
    E: ProvideErrorMetadata,
{
    match &err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => StoreError::Connectivity {
            table: table.to_string(),
            operation,
            message: "request did not reach the service".to_string(),
        },
        _ => {
            let code = err.code().map(str::to_string);
            let message = err
                .message()
                .map(str::to_string)
                .or_else(|| code.clone())
                .unwrap_or_else(|| "unknown service error".to_string());
            classify(table, operation, index, code.as_deref(), &message)
        }
    }
}

#[async_trait]
impl TableStore for DynamoDbTableStore {
    async fn get_item(
        &self,
        table: &str,
        key: &Key,
        consistent: bool,
    ) -> Result<Option<Item>, StoreError> {
        let output = self
            .client
            .get_item()
            .table_name(table)
            .key(key.attribute.clone(), DynamoValue::S(key.value.clone()))
            .consistent_read(consistent)
            .send()
            .await
            .map_err(|err| map_sdk_error(table, "GetItem", None, err))?;
        output
            .item
            .map(|item| from_dynamo_item(table, "GetItem", item))
            .transpose()
    }

    async fn put_item(&self, table: &str, request: PutRequest) -> Result<(), StoreError> {
        let mut builder = self
            .client
            .put_item()
            .table_name(table)
            .set_item(Some(to_dynamo_item(&request.item)));
        if let Some(attribute) = &request.require_absent {
            builder = builder
                .condition_expression("attribute_not_exists(#k)")
                .expression_attribute_names("#k", attribute.clone());
        }
        builder
            .send()
            .await
            .map_err(|err| map_sdk_error(table, "PutItem", None, err))?;
        debug!("put item (table={table})");
        Ok(())
    }

    async fn update_item(&self, table: &str, request: UpdateRequest) -> Result<Item, StoreError> {
        let mut expression = Expression::default();
        let mut assignments = Vec::new();
        for (attribute, value) in &request.set {
            let name = expression.name(attribute);
            let value = expression.value(value);
            assignments.push(format!("{name} = {value}"));
        }
        let removals: Vec<String> = request
            .remove
            .iter()
            .map(|attribute| expression.name(attribute))
            .collect();

        let mut clauses = Vec::new();
        if !assignments.is_empty() {
            clauses.push(format!("SET {}", assignments.join(", ")));
        }
        if !removals.is_empty() {
            clauses.push(format!("REMOVE {}", removals.join(", ")));
        }
        let update_expression = (!clauses.is_empty()).then(|| clauses.join(" "));
        let (names, values) = expression.into_parts();

        let output = self
            .client
            .update_item()
            .table_name(table)
            .key(request.key.attribute.clone(), DynamoValue::S(request.key.value.clone()))
            .set_update_expression(update_expression)
            .set_expression_attribute_names(names)
            .set_expression_attribute_values(values)
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|err| map_sdk_error(table, "UpdateItem", None, err))?;
        match output.attributes {
            Some(attributes) => from_dynamo_item(table, "UpdateItem", attributes),
            None => {
                let mut item = Item::new();
                item.insert(request.key.attribute, AttributeValue::S(request.key.value));
                Ok(item)
            }
        }
    }

    async fn query(&self, table: &str, request: &QueryRequest) -> Result<Page, StoreError> {
        let mut expression = Expression::default();
        let key_condition = expression.condition(&Condition::equals(
            request.key.attribute.clone(),
            request.key.value.clone(),
        ));
        let filter = expression.filter(&request.filter);
        let (names, values) = expression.into_parts();
        let output = self
            .client
            .query()
            .table_name(table)
            .index_name(request.index.clone())
            .key_condition_expression(key_condition)
            .set_filter_expression(filter)
            .set_expression_attribute_names(names)
            .set_expression_attribute_values(values)
            .set_limit(page_limit(request.limit))
            .consistent_read(request.consistent)
            .set_exclusive_start_key(request.start_key.as_ref().map(to_dynamo_item))
            .send()
            .await
            .map_err(|err| map_sdk_error(table, "Query", Some(&request.index), err))?;
        let items = output
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| from_dynamo_item(table, "Query", item))
            .collect::<Result<Vec<_>, _>>()?;
        let last_evaluated_key = output
            .last_evaluated_key
            .map(|key| from_dynamo_item(table, "Query", key))
            .transpose()?;
        Ok(Page {
            items,
            last_evaluated_key,
        })
    }

    async fn scan(&self, table: &str, request: &ScanRequest) -> Result<Page, StoreError> {
        let mut expression = Expression::default();
        let filter = expression.filter(&request.filter);
        let (names, values) = expression.into_parts();
        let output = self
            .client
            .scan()
            .table_name(table)
            .set_filter_expression(filter)
            .set_expression_attribute_names(names)
            .set_expression_attribute_values(values)
            .set_limit(page_limit(request.limit))
            .consistent_read(request.consistent)
            .set_exclusive_start_key(request.start_key.as_ref().map(to_dynamo_item))
            .send()
            .await
            .map_err(|err| map_sdk_error(table, "Scan", None, err))?;
        let items = output
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| from_dynamo_item(table, "Scan", item))
            .collect::<Result<Vec<_>, _>>()?;
        let last_evaluated_key = output
            .last_evaluated_key
            .map(|key| from_dynamo_item(table, "Scan", key))
            .transpose()?;
        Ok(Page {
            items,
            last_evaluated_key,
        })
    }
}
