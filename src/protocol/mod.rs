//! Subset of the multiworld server protocol.
//!
//! Every frame is a JSON array of command objects tagged by `cmd`. Only the
//! commands this bridge reacts to are modelled; the rest parse as
//! [`ServerPacket::Other`] and are ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const GAME_NAME: &str = "Untitled Goose Game";
pub const DEATH_LINK_TAG: &str = "DeathLink";
/// Receive own items, starting inventory and remote items.
pub const ITEMS_HANDLING_ALL: u8 = 0b111;
pub const CLIENT_STATUS_GOAL: u8 = 30;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame is not a JSON array: {0}")]
    NotAnArray(#[source] serde_json::Error),
    #[error("bad {cmd} command: {source}")]
    BadCommand {
        cmd: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("encode failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("item index {index} with {count} items is out of range")]
    IndexOutOfRange { index: u64, count: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkItem {
    pub item: i64,
    #[serde(default)]
    pub location: i64,
    #[serde(default)]
    pub player: i64,
    #[serde(default)]
    pub flags: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrintPart {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "cmd")]
pub enum ServerPacket {
    RoomInfo {
        #[serde(default)]
        seed_name: Option<String>,
    },
    Connected {
        #[serde(default)]
        slot: i64,
        #[serde(default)]
        checked_locations: Vec<i64>,
        #[serde(default)]
        slot_data: Value,
    },
    ConnectionRefused {
        #[serde(default)]
        errors: Vec<String>,
    },
    ReceivedItems {
        index: u64,
        items: Vec<NetworkItem>,
    },
    RoomUpdate {
        #[serde(default)]
        checked_locations: Vec<i64>,
    },
    #[serde(rename = "PrintJSON")]
    PrintJson {
        #[serde(default)]
        data: Vec<PrintPart>,
    },
    Bounced {
        #[serde(default)]
        tags: Vec<String>,
        #[serde(default)]
        data: Value,
    },
    #[serde(other)]
    Other,
}

impl ServerPacket {
    /// Concatenated text of a `PrintJSON` message.
    pub fn print_text(&self) -> Option<String> {
        match self {
            ServerPacket::PrintJson { data } => {
                Some(data.iter().map(|p| p.text.as_str()).collect())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub class: &'static str,
}

impl Default for NetworkVersion {
    fn default() -> Self {
        Self {
            major: 0,
            minor: 5,
            build: 1,
            class: "Version",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "cmd")]
pub enum ClientPacket {
    Connect {
        password: String,
        game: String,
        name: String,
        uuid: String,
        version: NetworkVersion,
        items_handling: u8,
        tags: Vec<String>,
        slot_data: bool,
    },
    LocationChecks {
        locations: Vec<i64>,
    },
    StatusUpdate {
        status: u8,
    },
    Bounce {
        tags: Vec<String>,
        data: Value,
    },
}

impl ClientPacket {
    pub fn connect(slot: &str, password: Option<&str>, death_link: bool) -> Self {
        let mut tags = Vec::new();
        if death_link {
            tags.push(DEATH_LINK_TAG.to_string());
        }
        ClientPacket::Connect {
            password: password.unwrap_or_default().to_string(),
            game: GAME_NAME.to_string(),
            name: slot.to_string(),
            uuid: uuid::Uuid::new_v4().to_string(),
            version: NetworkVersion::default(),
            items_handling: ITEMS_HANDLING_ALL,
            tags,
            slot_data: true,
        }
    }

    pub fn goal_complete() -> Self {
        ClientPacket::StatusUpdate {
            status: CLIENT_STATUS_GOAL,
        }
    }

    pub fn death_link(source: &str, cause: &str) -> Self {
        let time = chrono::Utc::now().timestamp_millis() as f64 / 1000.0;
        ClientPacket::Bounce {
            tags: vec![DEATH_LINK_TAG.to_string()],
            data: serde_json::json!({ "time": time, "cause": cause, "source": source }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClientPacket::Connect { .. } => "Connect",
            ClientPacket::LocationChecks { .. } => "LocationChecks",
            ClientPacket::StatusUpdate { .. } => "StatusUpdate",
            ClientPacket::Bounce { .. } => "Bounce",
        }
    }
}

/// Encode one outbound command as a single-element frame (no newline).
pub fn encode(packet: &ClientPacket) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(&[packet])?)
}

/// Parse one frame. A malformed command is returned as an error in its slot
/// without affecting the others.
pub fn parse_frame(frame: &str) -> Result<Vec<Result<ServerPacket, ProtocolError>>, ProtocolError> {
    let raw: Vec<Value> = serde_json::from_str(frame).map_err(ProtocolError::NotAnArray)?;
    Ok(raw
        .into_iter()
        .map(|value| {
            let cmd = value
                .get("cmd")
                .and_then(Value::as_str)
                .unwrap_or("?")
                .to_string();
            serde_json::from_value(value).map_err(|source| ProtocolError::BadCommand { cmd, source })
        })
        .collect())
}

/// `include_npc_souls` / `include_prop_souls` from slot data; absent means enabled.
pub fn slot_option(slot_data: &Value, key: &str) -> bool {
    match slot_data.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().map(|v| v != 0).unwrap_or(true),
        _ => true,
    }
}

/// Whether a bounce carries the death link tag.
pub fn is_death_link(tags: &[String]) -> bool {
    tags.iter().any(|t| t == DEATH_LINK_TAG)
}
