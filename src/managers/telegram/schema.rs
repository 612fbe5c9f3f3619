use super::operation::{Operation, Resource};
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

static PARAMETER_DEFAULTS: Lazy<HashMap<&'static str, Value>> = Lazy::new(|| {
    let entries: Vec<(&'static str, Value)> = vec![
        ("resource", Value::from("message")),
        ("operation", Value::from("sendMessage")),
        ("binaryData", Value::Bool(false)),
        ("binaryPropertyName", Value::from("data")),
        ("download", Value::Bool(true)),
        ("messageType", Value::from("message")),
        ("file", Value::from("")),
        ("action", Value::from("typing")),
        ("last_name", Value::from("")),
        ("vcard", Value::from("")),
        ("latitude", Value::from(0.0)),
        ("longitude", Value::from(0.0)),
        ("type", Value::from("regular")),
        ("is_anonymous", Value::Bool(true)),
        ("allows_multiple_answers", Value::Bool(false)),
        ("correct_option_id", Value::from(0)),
        ("explanation", Value::from("")),
        ("open_period", Value::from(0)),
        ("close_date", Value::from(0)),
        ("is_closed", Value::Bool(false)),
        ("replyMarkup", Value::from("none")),
        ("specifyKeyboard", Value::from("ui")),
        ("keyboardJson", Value::from("")),
        ("responseType", Value::from("approval")),
    ];
    entries.into_iter().collect()
});

pub fn parameter_default(name: &str) -> Option<Value> {
    PARAMETER_DEFAULTS.get(name).cloned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Message,
    Callback,
    Pin,
}

/// Fields that steer the node itself are consumed and never reach the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldUse {
    Sent,
    Consumed,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldRule {
    pub collection: Collection,
    pub name: &'static str,
    pub usage: FieldUse,
    #[serde(skip)]
    show: Option<&'static [&'static str]>,
    #[serde(skip)]
    hide: &'static [&'static str],
    #[serde(skip)]
    requires_binary: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct VisibilityContext {
    pub operation: Operation,
    pub binary_data: bool,
}

impl FieldRule {
    pub fn is_visible(&self, ctx: &VisibilityContext) -> bool {
        if collection_for(ctx.operation) != Some(self.collection) {
            return false;
        }
        let name = ctx.operation.name();
        if let Some(show) = self.show {
            if !show.contains(&name) {
                return false;
            }
        }
        if self.hide.contains(&name) {
            return false;
        }
        !self.requires_binary || ctx.binary_data
    }
}

const fn sent(
    name: &'static str,
    show: Option<&'static [&'static str]>,
    hide: &'static [&'static str],
) -> FieldRule {
    FieldRule {
        collection: Collection::Message,
        name,
        usage: FieldUse::Sent,
        show,
        hide,
        requires_binary: false,
    }
}

const fn in_collection(collection: Collection, name: &'static str) -> FieldRule {
    FieldRule {
        collection,
        name,
        usage: FieldUse::Sent,
        show: None,
        hide: &[],
        requires_binary: false,
    }
}

const CAPTIONED: &[&str] = &[
    "sendAnimation",
    "sendAudio",
    "sendDocument",
    "sendPhoto",
    "sendVideo",
];
const TIMED: &[&str] = &["sendAnimation", "sendAudio", "sendVideo"];
const SIZED: &[&str] = &["sendAnimation", "sendVideo"];
const FILE_CARRYING: &[&str] = &[
    "sendAnimation",
    "sendAudio",
    "sendDocument",
    "sendPhoto",
    "sendVideo",
    "sendSticker",
];
const PARSED: &[&str] = &[
    "editMessageText",
    "sendAnimation",
    "sendAudio",
    "sendMessage",
    "sendPhoto",
    "sendVideo",
    "sendDocument",
];
const THREADED: &[&str] = &[
    "sendAnimation",
    "sendAudio",
    "sendDocument",
    "sendLocation",
    "sendMediaGroup",
    "sendMessage",
    "sendContact",
    "sendPhoto",
    "sendSticker",
    "sendVideo",
];
const THUMBNAILED: &[&str] = &["sendAnimation", "sendAudio", "sendDocument", "sendVideo"];
const NOT_EDIT: &[&str] = &["editMessageText"];

pub static FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        collection: Collection::Message,
        name: "appendAttribution",
        usage: FieldUse::Consumed,
        show: Some(&["sendMessage"]),
        hide: &[],
        requires_binary: false,
    },
    sent("caption", Some(CAPTIONED), &[]),
    sent("disable_notification", None, NOT_EDIT),
    sent(
        "disable_web_page_preview",
        Some(&["editMessageText", "sendMessage"]),
        &[],
    ),
    sent("duration", Some(TIMED), &[]),
    FieldRule {
        collection: Collection::Message,
        name: "fileName",
        usage: FieldUse::Consumed,
        show: Some(FILE_CARRYING),
        hide: &[],
        requires_binary: true,
    },
    sent("height", Some(SIZED), &[]),
    sent("parse_mode", Some(PARSED), &[]),
    sent("performer", Some(&["sendAudio"]), &[]),
    sent("reply_to_message_id", None, NOT_EDIT),
    sent("message_thread_id", Some(THREADED), &[]),
    sent("title", Some(&["sendAudio"]), &[]),
    sent("thumb", Some(THUMBNAILED), &[]),
    sent("width", Some(SIZED), &[]),
    in_collection(Collection::Callback, "cache_time"),
    in_collection(Collection::Callback, "show_alert"),
    in_collection(Collection::Callback, "text"),
    in_collection(Collection::Callback, "url"),
    in_collection(Collection::Pin, "disable_notification"),
];

const MESSAGE_FIELD_OPERATIONS: &[&str] = &[
    "editMessageText",
    "sendAnimation",
    "sendAudio",
    "sendContact",
    "sendDocument",
    "sendLocation",
    "sendMessage",
    "sendMediaGroup",
    "sendPhoto",
    "sendPoll",
    "sendSticker",
    "sendVideo",
];

pub fn collection_for(operation: Operation) -> Option<Collection> {
    match operation.resource() {
        Resource::Callback => Some(Collection::Callback),
        Resource::Message if operation.name() == "pinChatMessage" => Some(Collection::Pin),
        Resource::Message if MESSAGE_FIELD_OPERATIONS.contains(&operation.name()) => {
            Some(Collection::Message)
        }
        _ => None,
    }
}

pub fn rule(name: &str, ctx: &VisibilityContext) -> Option<&'static FieldRule> {
    FIELD_RULES
        .iter()
        .find(|rule| rule.name == name && rule.is_visible(ctx))
}

pub fn visible_fields(ctx: &VisibilityContext) -> Vec<&'static FieldRule> {
    FIELD_RULES
        .iter()
        .filter(|rule| rule.is_visible(ctx))
        .collect()
}

pub fn reply_markup_choices(operation: Operation) -> &'static [&'static str] {
    const ALL: &[&str] = &[
        "none",
        "forceReply",
        "inlineKeyboard",
        "replyKeyboard",
        "replyKeyboardRemove",
    ];
    match operation.name() {
        "editMessageText" => &["none", "inlineKeyboard"],
        "sendAnimation" | "sendAudio" | "sendContact" | "sendDocument" | "sendLocation"
        | "sendMessage" | "sendPhoto" | "sendPoll" | "sendSticker" | "sendVideo"
            if operation.resource() == Resource::Message =>
        {
            ALL
        }
        _ => &[],
    }
}
