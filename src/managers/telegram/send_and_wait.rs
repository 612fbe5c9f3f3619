use super::context::NodeContext;
use super::fields::attribution_suffix;
use crate::constants::send_and_wait as constants;
use crate::errors::NodeError;
use crate::services::parameters::FieldReader;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseButton {
    pub label: String,
    pub url: String,
}

pub fn build_body(
    reader: &FieldReader<'_>,
    context: &NodeContext,
) -> Result<Map<String, Value>, NodeError> {
    let chat_id = reader.string("chatId")?;
    let mut text = reader.string("message")?;
    let options = reader.collection("options")?;

    let append = options
        .get("appendAttribution")
        .and_then(Value::as_bool)
        .unwrap_or(true);
    if append && context.attribution_allowed {
        if let Some(suffix) = attribution_suffix("Markdown", context.instance_id.as_deref()) {
            text.push_str(&suffix);
        }
    }

    let buttons: Vec<Value> = response_buttons(reader, context)?
        .into_iter()
        .map(|button| serde_json::json!({ "text": button.label, "url": button.url }))
        .collect();

    let mut body = Map::new();
    body.insert("chat_id".to_string(), Value::String(chat_id));
    body.insert("text".to_string(), Value::String(text));
    body.insert("disable_web_page_preview".to_string(), Value::Bool(true));
    body.insert("parse_mode".to_string(), Value::from("Markdown"));
    body.insert(
        "reply_markup".to_string(),
        serde_json::json!({ "inline_keyboard": [buttons] }),
    );
    Ok(body)
}

fn resume_base(context: &NodeContext) -> Result<Url, NodeError> {
    let raw = context
        .resume_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| {
            NodeError::configuration("Send and wait needs the execution's resume URL")
                .with_hint("The host must pass resumeUrl in the node context.")
        })?;
    let joined = match context.node_id.as_deref().filter(|id| !id.is_empty()) {
        Some(node_id) => format!("{}/{}", raw.trim_end_matches('/'), node_id),
        None => raw.to_string(),
    };
    Url::parse(&joined)
        .map_err(|err| NodeError::configuration(format!("Invalid resume URL: {}", err)))
}

pub fn response_buttons(
    reader: &FieldReader<'_>,
    context: &NodeContext,
) -> Result<Vec<ResponseButton>, NodeError> {
    let base = resume_base(context)?;
    let response_type = reader.string_or("responseType", "approval")?;
    if response_type != "approval" {
        let options = reader.collection("options")?;
        let label = options
            .get("messageButtonLabel")
            .and_then(Value::as_str)
            .filter(|label| !label.is_empty())
            .unwrap_or(constants::DEFAULT_RESPOND_LABEL);
        return Ok(vec![ResponseButton {
            label: label.to_string(),
            url: base.to_string(),
        }]);
    }

    let approval = reader.collection("approvalOptions.values")?;
    let label = |key: &str, fallback: &str| {
        approval
            .get(key)
            .and_then(Value::as_str)
            .filter(|label| !label.is_empty())
            .unwrap_or(fallback)
            .to_string()
    };
    let with_answer = |approved: bool| {
        let mut url = base.clone();
        url.query_pairs_mut()
            .append_pair("approved", if approved { "true" } else { "false" });
        url.to_string()
    };

    let mut buttons = vec![ResponseButton {
        label: label("approveLabel", constants::DEFAULT_APPROVE_LABEL),
        url: with_answer(true),
    }];
    let double = approval.get("approvalType").and_then(Value::as_str) == Some("double");
    if double {
        buttons.push(ResponseButton {
            label: label("disapproveLabel", constants::DEFAULT_DISAPPROVE_LABEL),
            url: with_answer(false),
        });
    }
    Ok(buttons)
}

fn limit_error(reason: impl Into<String>) -> NodeError {
    NodeError::configuration("Could not configure Limit Wait Time").with_description(reason)
}

fn wait_indefinitely() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(constants::WAIT_INDEFINITELY)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
}

/// Instant the execution resumes on its own if nobody answers.
pub fn wait_till(reader: &FieldReader<'_>, now: DateTime<Utc>) -> Result<DateTime<Utc>, NodeError> {
    let limit = reader.collection("options.limitWaitTime.values")?;
    if limit.is_empty() {
        return Ok(wait_indefinitely());
    }
    let limit_type = limit
        .get("limitType")
        .and_then(Value::as_str)
        .unwrap_or("afterTimeInterval");
    if limit_type == "afterTimeInterval" {
        let amount = match limit.get("resumeAmount") {
            None => 1.0,
            Some(value) => value
                .as_f64()
                .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
                .ok_or_else(|| limit_error("resumeAmount must be a number"))?,
        };
        let unit = limit
            .get("resumeUnit")
            .and_then(Value::as_str)
            .unwrap_or("hours");
        let unit_seconds = match unit {
            "seconds" => 1.0,
            "minutes" => 60.0,
            "hours" => 3_600.0,
            "days" => 86_400.0,
            other => return Err(limit_error(format!("Unknown resume unit '{}'", other))),
        };
        let millis = amount * unit_seconds * 1_000.0;
        if !millis.is_finite() || millis < 0.0 {
            return Err(limit_error("Invalid date format"));
        }
        return now
            .checked_add_signed(Duration::milliseconds(millis as i64))
            .ok_or_else(|| limit_error("Invalid date format"));
    }
    limit
        .get("maxDateAndTime")
        .and_then(Value::as_str)
        .and_then(parse_instant)
        .ok_or_else(|| limit_error("Invalid date format"))
}
