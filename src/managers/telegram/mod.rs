pub mod context;
pub mod fields;
pub mod operation;
pub mod reply_markup;
pub mod request;
pub mod response;
pub mod schema;
pub mod send_and_wait;
pub mod upload;

use self::context::NodeContext;
use self::fields::FieldMerger;
use self::operation::{MessageOperation, Operation};
use self::request::RequestBuilder;
use self::schema::parameter_default;
use crate::errors::NodeError;
use crate::services::binary_store::BinaryStore;
use crate::services::items::{Item, OutputItem};
use crate::services::logger::Logger;
use crate::services::parameters::{FieldReader, ParameterSource};
use crate::services::transport::TelegramTransport;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Completed {
        items: Vec<OutputItem>,
    },
    /// The execution is parked until the host's resume webhook fires or
    /// `wait_till` passes. Input items are handed back unchanged.
    Waiting {
        #[serde(rename = "waitTill")]
        wait_till: DateTime<Utc>,
        items: Vec<Item>,
    },
}

impl ExecutionOutcome {
    pub fn completed_items(&self) -> Option<&[OutputItem]> {
        match self {
            ExecutionOutcome::Completed { items } => Some(items),
            ExecutionOutcome::Waiting { .. } => None,
        }
    }
}

pub struct TelegramNode {
    logger: Logger,
    transport: Arc<dyn TelegramTransport>,
    store: Arc<dyn BinaryStore>,
}

impl TelegramNode {
    pub fn new(
        logger: Logger,
        transport: Arc<dyn TelegramTransport>,
        store: Arc<dyn BinaryStore>,
    ) -> Self {
        Self {
            logger: logger.child("node"),
            transport,
            store,
        }
    }

    pub async fn execute(
        &self,
        items: &[Item],
        params: &dyn ParameterSource,
        context: &NodeContext,
    ) -> Result<ExecutionOutcome, NodeError> {
        let first = FieldReader::new(params, 0).with_defaults(parameter_default);
        let resource = first.string("resource")?;
        let operation = first.string("operation")?;
        let binary_data = first.bool_or("binaryData", false)?;

        let merger = FieldMerger::new(context, &self.logger);
        let builder = RequestBuilder::new(merger, binary_data);

        if resource == "message" && operation == "sendAndWait" {
            return self.send_and_wait(items, &builder, &first).await;
        }

        self.logger.info(
            "Executing Telegram operation",
            Some(&serde_json::json!({
                "resource": resource,
                "operation": operation,
                "items": items.len(),
                "binary_data": binary_data,
            })),
        );

        let mut output = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let reader = first.at(index);
            match self
                .execute_item(&builder, &resource, &operation, item, &reader)
                .await
            {
                Ok(mut mapped) => output.append(&mut mapped),
                Err(err) => {
                    let err = err.at_item(index);
                    if !context.continue_on_fail {
                        self.logger.error(
                            "Item failed",
                            Some(&serde_json::json!({ "item": index, "error": err })),
                        );
                        return Err(err);
                    }
                    self.logger.warn(
                        "Item failed, continuing",
                        Some(&serde_json::json!({ "item": index, "error": err })),
                    );
                    output.push(OutputItem::failure(index, err.display_message()));
                }
            }
        }
        Ok(ExecutionOutcome::Completed { items: output })
    }

    async fn execute_item(
        &self,
        builder: &RequestBuilder<'_>,
        resource: &str,
        operation: &str,
        item: &Item,
        reader: &FieldReader<'_>,
    ) -> Result<Vec<OutputItem>, NodeError> {
        let operation = Operation::parse(resource, operation)?;
        let mut spec = builder.build(operation, reader)?;
        if builder.binary_data() {
            if let Some(kind) = operation.media_kind() {
                let body = std::mem::take(&mut spec.body);
                let form =
                    upload::build_multipart(body, item, reader, kind, self.store.as_ref()).await?;
                spec.multipart = Some(form);
            }
        }
        let payload = self.transport.call(spec).await?;
        response::map_response(operation, payload, reader, self.transport.as_ref()).await
    }

    async fn send_and_wait(
        &self,
        items: &[Item],
        builder: &RequestBuilder<'_>,
        reader: &FieldReader<'_>,
    ) -> Result<ExecutionOutcome, NodeError> {
        let operation = Operation::Message(MessageOperation::SendAndWait);
        let wait_till = send_and_wait::wait_till(reader, Utc::now())?;
        let spec = builder.build(operation, reader)?;
        self.transport.call(spec).await?;
        self.logger.info(
            "Waiting for a response",
            Some(&serde_json::json!({ "wait_till": wait_till.to_rfc3339() })),
        );
        Ok(ExecutionOutcome::Waiting {
            wait_till,
            items: items.to_vec(),
        })
    }
}
