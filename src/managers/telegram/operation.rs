use crate::errors::NodeError;
use crate::utils::tool_errors::{unknown_operation_error, unknown_resource_error};
use serde::Serialize;
use std::fmt;

pub const RESOURCES: &[&str] = &["chat", "callback", "file", "message"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    Chat,
    Callback,
    File,
    Message,
}

impl Resource {
    pub fn parse(raw: &str) -> Result<Self, NodeError> {
        match raw {
            "chat" => Ok(Resource::Chat),
            "callback" => Ok(Resource::Callback),
            "file" => Ok(Resource::File),
            "message" => Ok(Resource::Message),
            _ => Err(unknown_resource_error(raw, RESOURCES)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Chat => "chat",
            Resource::Callback => "callback",
            Resource::File => "file",
            Resource::Message => "message",
        }
    }

    pub fn operations(self) -> &'static [&'static str] {
        match self {
            Resource::Chat => &[
                "get",
                "administrators",
                "member",
                "leave",
                "setDescription",
                "setTitle",
            ],
            Resource::Callback => &["answerQuery", "answerInlineQuery"],
            Resource::File => &["get"],
            Resource::Message => &[
                "deleteMessage",
                "editMessageText",
                "pinChatMessage",
                "sendAnimation",
                "sendAudio",
                "sendChatAction",
                "sendContact",
                "sendDocument",
                "sendLocation",
                "sendMediaGroup",
                "sendMessage",
                "sendAndWait",
                "sendPhoto",
                "sendPoll",
                "sendSticker",
                "sendVideo",
                "unpinChatMessage",
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatOperation {
    Get,
    Administrators,
    Member,
    Leave,
    SetDescription,
    SetTitle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackOperation {
    AnswerQuery,
    AnswerInlineQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileOperation {
    Get,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Animation,
    Audio,
    Document,
    Photo,
    Sticker,
    Video,
}

impl MediaKind {
    pub const ALL: [MediaKind; 6] = [
        MediaKind::Animation,
        MediaKind::Audio,
        MediaKind::Document,
        MediaKind::Photo,
        MediaKind::Sticker,
        MediaKind::Video,
    ];

    pub fn field(self) -> &'static str {
        match self {
            MediaKind::Animation => "animation",
            MediaKind::Audio => "audio",
            MediaKind::Document => "document",
            MediaKind::Photo => "photo",
            MediaKind::Sticker => "sticker",
            MediaKind::Video => "video",
        }
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            MediaKind::Animation => "sendAnimation",
            MediaKind::Audio => "sendAudio",
            MediaKind::Document => "sendDocument",
            MediaKind::Photo => "sendPhoto",
            MediaKind::Sticker => "sendSticker",
            MediaKind::Video => "sendVideo",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageOperation {
    DeleteMessage,
    EditMessageText,
    PinChatMessage,
    UnpinChatMessage,
    SendMedia(MediaKind),
    SendChatAction,
    SendContact,
    SendLocation,
    SendMediaGroup,
    SendMessage,
    SendAndWait,
    SendPoll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Chat(ChatOperation),
    Callback(CallbackOperation),
    File(FileOperation),
    Message(MessageOperation),
}

impl Operation {
    pub fn parse(resource: &str, operation: &str) -> Result<Self, NodeError> {
        let resource_kind = Resource::parse(resource)?;
        let parsed = match resource_kind {
            Resource::Chat => match operation {
                "get" => Some(ChatOperation::Get),
                "administrators" => Some(ChatOperation::Administrators),
                "member" => Some(ChatOperation::Member),
                "leave" => Some(ChatOperation::Leave),
                "setDescription" => Some(ChatOperation::SetDescription),
                "setTitle" => Some(ChatOperation::SetTitle),
                _ => None,
            }
            .map(Operation::Chat),
            Resource::Callback => match operation {
                "answerQuery" => Some(CallbackOperation::AnswerQuery),
                "answerInlineQuery" => Some(CallbackOperation::AnswerInlineQuery),
                _ => None,
            }
            .map(Operation::Callback),
            Resource::File => match operation {
                "get" => Some(FileOperation::Get),
                _ => None,
            }
            .map(Operation::File),
            Resource::Message => parse_message_operation(operation).map(Operation::Message),
        };
        parsed.ok_or_else(|| {
            unknown_operation_error(resource, operation, resource_kind.operations())
        })
    }

    pub fn resource(self) -> Resource {
        match self {
            Operation::Chat(_) => Resource::Chat,
            Operation::Callback(_) => Resource::Callback,
            Operation::File(_) => Resource::File,
            Operation::Message(_) => Resource::Message,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::Chat(op) => match op {
                ChatOperation::Get => "get",
                ChatOperation::Administrators => "administrators",
                ChatOperation::Member => "member",
                ChatOperation::Leave => "leave",
                ChatOperation::SetDescription => "setDescription",
                ChatOperation::SetTitle => "setTitle",
            },
            Operation::Callback(CallbackOperation::AnswerQuery) => "answerQuery",
            Operation::Callback(CallbackOperation::AnswerInlineQuery) => "answerInlineQuery",
            Operation::File(FileOperation::Get) => "get",
            Operation::Message(op) => match op {
                MessageOperation::DeleteMessage => "deleteMessage",
                MessageOperation::EditMessageText => "editMessageText",
                MessageOperation::PinChatMessage => "pinChatMessage",
                MessageOperation::UnpinChatMessage => "unpinChatMessage",
                MessageOperation::SendMedia(kind) => kind.endpoint(),
                MessageOperation::SendChatAction => "sendChatAction",
                MessageOperation::SendContact => "sendContact",
                MessageOperation::SendLocation => "sendLocation",
                MessageOperation::SendMediaGroup => "sendMediaGroup",
                MessageOperation::SendMessage => "sendMessage",
                MessageOperation::SendAndWait => "sendAndWait",
                MessageOperation::SendPoll => "sendPoll",
            },
        }
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            Operation::Chat(op) => match op {
                ChatOperation::Get => "getChat",
                ChatOperation::Administrators => "getChatAdministrators",
                ChatOperation::Member => "getChatMember",
                ChatOperation::Leave => "leaveChat",
                ChatOperation::SetDescription => "setChatDescription",
                ChatOperation::SetTitle => "setChatTitle",
            },
            Operation::Callback(CallbackOperation::AnswerQuery) => "answerCallbackQuery",
            Operation::Callback(CallbackOperation::AnswerInlineQuery) => "answerInlineQuery",
            Operation::File(FileOperation::Get) => "getFile",
            Operation::Message(MessageOperation::SendAndWait) => "sendMessage",
            Operation::Message(_) => self.name(),
        }
    }

    pub fn media_kind(self) -> Option<MediaKind> {
        match self {
            Operation::Message(MessageOperation::SendMedia(kind)) => Some(kind),
            _ => None,
        }
    }
}

fn parse_message_operation(operation: &str) -> Option<MessageOperation> {
    if let Some(kind) = MediaKind::ALL
        .iter()
        .copied()
        .find(|kind| kind.endpoint() == operation)
    {
        return Some(MessageOperation::SendMedia(kind));
    }
    let op = match operation {
        "deleteMessage" => MessageOperation::DeleteMessage,
        "editMessageText" => MessageOperation::EditMessageText,
        "pinChatMessage" => MessageOperation::PinChatMessage,
        "unpinChatMessage" => MessageOperation::UnpinChatMessage,
        "sendChatAction" => MessageOperation::SendChatAction,
        "sendContact" => MessageOperation::SendContact,
        "sendLocation" => MessageOperation::SendLocation,
        "sendMediaGroup" => MessageOperation::SendMediaGroup,
        "sendMessage" => MessageOperation::SendMessage,
        "sendAndWait" => MessageOperation::SendAndWait,
        "sendPoll" => MessageOperation::SendPoll,
        _ => return None,
    };
    Some(op)
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource().as_str(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::NodeErrorKind;

    #[test]
    fn every_listed_operation_parses_and_round_trips() {
        for resource in RESOURCES {
            let kind = Resource::parse(resource).unwrap();
            for name in kind.operations() {
                let op = Operation::parse(resource, name).unwrap();
                assert_eq!(op.name(), *name);
                assert_eq!(op.resource(), kind);
            }
        }
    }

    #[test]
    fn endpoints_follow_bot_api_names() {
        let op = Operation::parse("chat", "administrators").unwrap();
        assert_eq!(op.endpoint(), "getChatAdministrators");
        let op = Operation::parse("callback", "answerQuery").unwrap();
        assert_eq!(op.endpoint(), "answerCallbackQuery");
        let op = Operation::parse("message", "sendAndWait").unwrap();
        assert_eq!(op.endpoint(), "sendMessage");
        let op = Operation::parse("message", "sendSticker").unwrap();
        assert_eq!(op.media_kind().map(MediaKind::field), Some("sticker"));
    }

    #[test]
    fn unknown_resource_and_operation_are_distinct_errors() {
        let err = Operation::parse("bot", "info").unwrap_err();
        assert_eq!(err.kind, NodeErrorKind::UnknownResource);
        assert_eq!(err.message, "The resource \"bot\" is not known!");

        let err = Operation::parse("message", "sendMesage").unwrap_err();
        assert_eq!(err.kind, NodeErrorKind::UnknownOperation);
        assert!(err.hint.unwrap().contains("sendMessage"));
    }
}
