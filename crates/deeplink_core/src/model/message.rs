//! Boundary message shapes exchanged with the hub process.
//!
//! # Responsibility
//! - Define outbound registration/deregistration intents.
//! - Define and validate inbound back-channel notifications.
//!
//! # Invariants
//! - `handlerType` is the lowercase discriminator `internal|extension`.
//! - Extension-typed messages always carry `extensionId`; internal ones never do.
//! - Inbound `params` default to empty when absent and must map strings to strings.
//! - Unknown extra fields on inbound messages are ignored.

use crate::model::handler_id::HandlerId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Identity of a dynamically loaded extension.
pub type ExtensionId = String;

/// Parameter bag parsed by the hub from a matched URL.
pub type RouteParams = BTreeMap<String, String>;

const FIELD_HANDLER_TYPE: &str = "handlerType";
const FIELD_HANDLER_ID: &str = "handlerId";
const FIELD_EXTENSION_ID: &str = "extensionId";
const FIELD_PARAMS: &str = "params";

/// Owner class of a registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerType {
    /// Registered by the application itself.
    Internal,
    /// Registered on behalf of one extension.
    Extension,
}

impl HandlerType {
    /// Stable wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::Extension => "extension",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "internal" => Some(Self::Internal),
            "extension" => Some(Self::Extension),
            _ => None,
        }
    }
}

impl Display for HandlerType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outbound "this id maps to this path schema" message.
///
/// Sent once per registration, fire-and-forget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "handlerType", rename_all = "lowercase")]
pub enum RegistrationIntent {
    #[serde(rename_all = "camelCase")]
    Internal {
        handler_id: HandlerId,
        path_schema: String,
    },
    #[serde(rename_all = "camelCase")]
    Extension {
        extension_id: ExtensionId,
        handler_id: HandlerId,
        path_schema: String,
    },
}

impl RegistrationIntent {
    pub fn handler_type(&self) -> HandlerType {
        match self {
            Self::Internal { .. } => HandlerType::Internal,
            Self::Extension { .. } => HandlerType::Extension,
        }
    }

    pub fn handler_id(&self) -> &HandlerId {
        match self {
            Self::Internal { handler_id, .. } | Self::Extension { handler_id, .. } => handler_id,
        }
    }

    pub fn path_schema(&self) -> &str {
        match self {
            Self::Internal { path_schema, .. } | Self::Extension { path_schema, .. } => {
                path_schema
            }
        }
    }
}

/// Outbound "forget every handler of this extension" message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeregistrationIntent {
    pub extension_id: ExtensionId,
}

/// Inbound notification for one matched URL invocation.
///
/// Transient: consumed by the dispatcher and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "handlerType", rename_all = "lowercase")]
pub enum BackChannelNotification {
    #[serde(rename_all = "camelCase")]
    Internal {
        handler_id: HandlerId,
        params: RouteParams,
    },
    #[serde(rename_all = "camelCase")]
    Extension {
        extension_id: ExtensionId,
        handler_id: HandlerId,
        params: RouteParams,
    },
}

impl BackChannelNotification {
    /// Validates a raw channel payload against the notification shape.
    ///
    /// # Errors
    /// - `NotAnObject` when the payload is not a JSON object.
    /// - `MissingField` when `handlerType`, `handlerId` or (for extension
    ///   messages) `extensionId` is absent or null.
    /// - `UnknownHandlerType` when `handlerType` is not `internal|extension`.
    /// - `InvalidField` when a present field has the wrong JSON type.
    pub fn from_value(raw: &Value) -> Result<Self, NotificationShapeError> {
        let object = raw.as_object().ok_or(NotificationShapeError::NotAnObject)?;

        let handler_type = required_str(object, FIELD_HANDLER_TYPE)?;
        let handler_type = HandlerType::parse(handler_type)
            .ok_or_else(|| NotificationShapeError::UnknownHandlerType(handler_type.to_string()))?;
        let handler_id = HandlerId::from_wire(required_str(object, FIELD_HANDLER_ID)?);
        let params = parse_params(object.get(FIELD_PARAMS))?;

        match handler_type {
            HandlerType::Internal => Ok(Self::Internal { handler_id, params }),
            HandlerType::Extension => Ok(Self::Extension {
                extension_id: required_str(object, FIELD_EXTENSION_ID)?.to_string(),
                handler_id,
                params,
            }),
        }
    }

    pub fn handler_type(&self) -> HandlerType {
        match self {
            Self::Internal { .. } => HandlerType::Internal,
            Self::Extension { .. } => HandlerType::Extension,
        }
    }

    pub fn handler_id(&self) -> &HandlerId {
        match self {
            Self::Internal { handler_id, .. } | Self::Extension { handler_id, .. } => handler_id,
        }
    }

    pub fn params(&self) -> &RouteParams {
        match self {
            Self::Internal { params, .. } | Self::Extension { params, .. } => params,
        }
    }
}

fn required_str<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, NotificationShapeError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(NotificationShapeError::MissingField(field)),
        Some(Value::String(value)) => Ok(value.as_str()),
        Some(_) => Err(NotificationShapeError::InvalidField {
            field,
            reason: "expected a string",
        }),
    }
}

fn parse_params(raw: Option<&Value>) -> Result<RouteParams, NotificationShapeError> {
    let object = match raw {
        None | Some(Value::Null) => return Ok(RouteParams::new()),
        Some(Value::Object(object)) => object,
        Some(_) => {
            return Err(NotificationShapeError::InvalidField {
                field: FIELD_PARAMS,
                reason: "expected an object",
            })
        }
    };

    let mut params = RouteParams::new();
    for (key, value) in object {
        let Value::String(value) = value else {
            return Err(NotificationShapeError::InvalidField {
                field: FIELD_PARAMS,
                reason: "expected string values",
            });
        };
        params.insert(key.clone(), value.clone());
    }
    Ok(params)
}

/// Shape violations of an inbound back-channel payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationShapeError {
    NotAnObject,
    MissingField(&'static str),
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },
    UnknownHandlerType(String),
}

impl Display for NotificationShapeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "notification payload must be an object"),
            Self::MissingField(field) => write!(f, "notification field `{field}` is missing"),
            Self::InvalidField { field, reason } => {
                write!(f, "notification field `{field}` is invalid: {reason}")
            }
            Self::UnknownHandlerType(value) => {
                write!(f, "notification handlerType is unsupported: {value}")
            }
        }
    }
}

impl Error for NotificationShapeError {}
