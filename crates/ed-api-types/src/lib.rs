//! Wire types for the engagement-dashboard reporting endpoints.
//!
//! Both the terminal section and the `edash` CLI talk to the same two
//! read-only endpoints; the records here are the single definition of what
//! those endpoints send and accept.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Path of the message-origin breakdown endpoint.
pub const ORIGIN_PATH: &str = "/api/v1/engagement-dashboard/messages/origin";

/// Path of the top-five channels endpoint.
pub const TOP_CHANNELS_PATH: &str =
    "/api/v1/engagement-dashboard/messages/top-five-popular-channels";

// ── Room type ──

/// Where a message was sent, as encoded by the chat server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    /// `d`: direct message.
    #[serde(rename = "d")]
    Direct,
    /// `c`: private channel.
    #[serde(rename = "c")]
    Private,
    /// `p`: public channel.
    #[serde(rename = "p")]
    Public,
    /// Any other code the server may report (livechat, discussions, ...).
    /// Written back out as `?`, matching [`RoomType::code`].
    #[serde(rename = "?", other)]
    Unknown,
}

impl RoomType {
    /// The three origins shown by the section, in slice order.
    pub const ORIGINS: [RoomType; 3] = [RoomType::Direct, RoomType::Private, RoomType::Public];

    /// Single-letter wire code (`?` for unknown types).
    pub fn code(self) -> &'static str {
        match self {
            RoomType::Direct => "d",
            RoomType::Private => "c",
            RoomType::Public => "p",
            RoomType::Unknown => "?",
        }
    }
}

// ── Request parameters ──

/// Query parameters accepted by both endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodParams {
    #[serde(serialize_with = "iso_millis")]
    pub start: DateTime<Utc>,
    #[serde(serialize_with = "iso_millis")]
    pub end: DateTime<Utc>,
}

impl PeriodParams {
    /// `start` rendered the way the server expects it (`2020-01-01T00:00:00.000Z`).
    pub fn start_iso(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn end_iso(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

fn iso_millis<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

// ── Response payloads ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOrigin {
    #[serde(rename = "t", alias = "type")]
    pub room_type: RoomType,
    #[serde(alias = "messageCount")]
    pub messages: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OriginsResponse {
    #[serde(default)]
    pub origins: Vec<RawOrigin>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawChannel {
    #[serde(rename = "t", alias = "type")]
    pub room_type: RoomType,
    #[serde(alias = "messageCount")]
    pub messages: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub usernames: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TopChannelsResponse {
    #[serde(default)]
    pub channels: Vec<RawChannel>,
}
