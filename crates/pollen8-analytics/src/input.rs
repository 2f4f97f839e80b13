//! Decoding of loosely-typed JSON payloads into calculator inputs.
//!
//! Every shape error surfaces as [`Pollen8Error::InvalidInput`] before any
//! calculation runs.

use pollen8_core::{Connection, InviteLink, Pollen8Error, Result, User, Validate};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// Export of one user's profile and connections.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Snapshot {
    pub user: User,
    pub connections: Vec<Connection>,
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn reject(argument: &str, expected: &str, value: &Value) -> Pollen8Error {
    warn!(argument, expected, found = kind(value), "rejecting input");
    Pollen8Error::invalid_input(format!(
        "{} must be {}, got {}",
        argument,
        expected,
        kind(value)
    ))
}

fn decode_as<T: DeserializeOwned>(argument: &str, value: &Value) -> Result<T> {
    T::deserialize(value)
        .map_err(|e| Pollen8Error::invalid_input(format!("{}: {}", argument, e)))
}

fn check<T: Validate>(argument: &str, item: &T) -> Result<()> {
    item.validate()
        .map_err(|e| Pollen8Error::invalid_input(format!("{}: {}", argument, e)))
}

pub fn decode_connections(value: &Value) -> Result<Vec<Connection>> {
    let items = value
        .as_array()
        .ok_or_else(|| reject("connections", "an array", value))?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let argument = format!("connections[{}]", i);
            if !item.is_object() {
                return Err(reject(&argument, "an object", item));
            }
            let connection: Connection = decode_as(&argument, item)?;
            check(&argument, &connection)?;
            Ok(connection)
        })
        .collect()
}

/// Accepts JSON numbers only; numeric strings such as `"5"` are rejected.
pub fn decode_count(argument: &str, value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| reject(argument, "a number", value))
}

pub fn decode_user(value: &Value) -> Result<User> {
    if !value.is_object() {
        return Err(reject("user", "an object", value));
    }
    let user: User = decode_as("user", value)?;
    check("user", &user)?;
    Ok(user)
}

pub fn decode_snapshot(value: &Value) -> Result<Snapshot> {
    if !value.is_object() {
        return Err(reject("snapshot", "an object", value));
    }
    Ok(Snapshot {
        user: decode_user(&value["user"])?,
        connections: decode_connections(&value["connections"])?,
    })
}

pub fn decode_invite(value: &Value) -> Result<InviteLink> {
    if !value.is_object() {
        return Err(reject("invite", "an object", value));
    }
    let link: InviteLink = decode_as("invite", value)?;
    check("invite", &link)?;
    Ok(link)
}
