use super::context::NodeContext;
use super::operation::{MessageOperation, Operation};
use super::reply_markup::ReplyMarkup;
use super::schema::{self, Collection, FieldUse, VisibilityContext};
use crate::constants::{attribution, node as node_constants};
use crate::errors::NodeError;
use crate::services::logger::Logger;
use crate::services::parameters::FieldReader;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static URL_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(https?|ftp|file)://\S+|www\.\S+|\S+\.\S+").expect("url heuristic regex")
});

pub struct FieldMerger<'a> {
    pub context: &'a NodeContext,
    pub logger: &'a Logger,
}

impl<'a> FieldMerger<'a> {
    pub fn new(context: &'a NodeContext, logger: &'a Logger) -> Self {
        Self { context, logger }
    }

    pub fn merge(
        &self,
        body: &mut Map<String, Value>,
        reader: &FieldReader<'_>,
        operation: Operation,
        binary_data: bool,
    ) -> Result<(), NodeError> {
        let visibility = VisibilityContext {
            operation,
            binary_data,
        };
        let mut sent = Map::new();
        let mut consumed = Map::new();
        let mut dropped = Vec::new();
        for (name, value) in reader.collection("additionalFields")? {
            match schema::rule(&name, &visibility) {
                Some(rule) if rule.usage == FieldUse::Consumed => {
                    consumed.insert(name, value);
                }
                Some(rule) if rule.collection == Collection::Pin && !is_set(&value) => {}
                Some(_) => {
                    sent.insert(name, value);
                }
                None => dropped.push(name),
            }
        }
        if !dropped.is_empty() {
            self.logger.debug(
                "Ignoring fields not shown for this operation",
                Some(&serde_json::json!({
                    "operation": operation.to_string(),
                    "item": reader.index(),
                    "fields": dropped,
                })),
            );
        }

        if operation == Operation::Message(MessageOperation::SendMessage) {
            self.apply_send_message_rules(body, &mut sent, &consumed);
        }
        body.extend(sent);

        let choices = schema::reply_markup_choices(operation);
        if !choices.is_empty() {
            if let Some(markup) = ReplyMarkup::from_parameters(reader, choices)?.to_value()? {
                body.insert("reply_markup".to_string(), markup);
            }
        }
        Ok(())
    }

    fn apply_send_message_rules(
        &self,
        body: &mut Map<String, Value>,
        sent: &mut Map<String, Value>,
        consumed: &Map<String, Value>,
    ) {
        let append = consumed
            .get("appendAttribution")
            .and_then(Value::as_bool)
            .unwrap_or_else(|| self.context.at_least(1.1));

        let parse_mode_set = sent
            .get("parse_mode")
            .and_then(Value::as_str)
            .map(|mode| !mode.is_empty())
            .unwrap_or(false);
        if !parse_mode_set {
            sent.insert(
                "parse_mode".to_string(),
                Value::from(node_constants::DEFAULT_PARSE_MODE),
            );
        }

        let text = body
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let explicit_preview = sent
            .get("disable_web_page_preview")
            .and_then(Value::as_bool)
            .filter(|_| self.context.at_least(1.2));
        let preview_disabled = explicit_preview.unwrap_or_else(|| !URL_LIKE.is_match(&text));
        if preview_disabled || explicit_preview.is_some() {
            body.insert(
                "link_preview_options".to_string(),
                serde_json::json!({ "is_disabled": preview_disabled }),
            );
        }

        if append && self.context.attribution_allowed {
            let mode = sent.get("parse_mode").and_then(Value::as_str).unwrap_or("");
            if let Some(suffix) = attribution_suffix(mode, self.context.instance_id.as_deref()) {
                body.insert("text".to_string(), Value::String(format!("{}{}", text, suffix)));
            }
        }
    }
}

fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        _ => true,
    }
}

pub fn attribution_link(instance_id: Option<&str>) -> String {
    match instance_id.filter(|id| !id.is_empty()) {
        Some(id) => format!("{}_{}", attribution::LINK_BASE, id),
        None => attribution::LINK_BASE.to_string(),
    }
}

/// Attribution suffix in the message's parse mode; plain-text modes get none.
pub fn attribution_suffix(parse_mode: &str, instance_id: Option<&str>) -> Option<String> {
    let link = attribution_link(instance_id);
    match parse_mode {
        "Markdown" | "MarkdownV2" => Some(format!(
            "\n\n_{}_[{}]({})",
            attribution::TEXT,
            attribution::LABEL,
            link
        )),
        "HTML" => Some(format!(
            "\n\n<em>{}</em><a href=\"{}\" target=\"_blank\">{}</a>",
            attribution::TEXT,
            link,
            attribution::LABEL
        )),
        _ => None,
    }
}
