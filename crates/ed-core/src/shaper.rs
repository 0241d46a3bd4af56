//! Reshapes the two raw endpoint payloads into what the section renders:
//! a three-slice origin breakdown and a ranked channel table.

use ed_api_types::{OriginsResponse, RawChannel, RawOrigin, RoomType, TopChannelsResponse};
use serde::Serialize;

/// Joins the participants of an unnamed direct conversation.
pub const USERNAME_SEPARATOR: &str = " × ";

// ---------------------------------------------------------------------------
// OriginBreakdown
// ---------------------------------------------------------------------------

/// Message counts per origin. Origins the server did not report count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OriginBreakdown {
    #[serde(rename = "d")]
    pub direct: u64,
    #[serde(rename = "c")]
    pub private: u64,
    #[serde(rename = "p")]
    pub public: u64,
}

impl OriginBreakdown {
    /// Fold the origin list keyed by room type. A repeated type overwrites
    /// the earlier count; unknown types are ignored.
    pub fn from_origins(origins: &[RawOrigin]) -> Self {
        origins.iter().fold(Self::default(), |mut acc, origin| {
            match origin.room_type {
                RoomType::Direct => acc.direct = origin.messages,
                RoomType::Private => acc.private = origin.messages,
                RoomType::Public => acc.public = origin.messages,
                RoomType::Unknown => {}
            }
            acc
        })
    }

    pub fn get(&self, room_type: RoomType) -> u64 {
        match room_type {
            RoomType::Direct => self.direct,
            RoomType::Private => self.private,
            RoomType::Public => self.public,
            RoomType::Unknown => 0,
        }
    }

    /// Sum of the three origins, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.direct
            .saturating_add(self.private)
            .saturating_add(self.public)
    }

    /// The pie slices in display order (direct, private, public).
    pub fn slices(&self) -> [PieSlice; 3] {
        RoomType::ORIGINS.map(|room_type| PieSlice {
            room_type,
            label: origin_label(room_type),
            color: origin_color(room_type),
            value: self.get(room_type),
        })
    }
}

/// One labelled, coloured slice of the origin pie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PieSlice {
    #[serde(rename = "id")]
    pub room_type: RoomType,
    pub label: &'static str,
    pub color: &'static str,
    pub value: u64,
}

impl PieSlice {
    /// Share of `total` in percent, 0 for an empty pie, never above 100.
    pub fn percent_of(&self, total: u64) -> f64 {
        if total == 0 {
            0.0
        } else {
            (self.value as f64 * 100.0 / total as f64).min(100.0)
        }
    }
}

pub fn origin_label(room_type: RoomType) -> &'static str {
    match room_type {
        RoomType::Direct => "Private chats",
        RoomType::Private => "Private channels",
        RoomType::Public => "Public channels",
        RoomType::Unknown => "Other",
    }
}

/// Hex colour of the slice / legend entry.
pub fn origin_color(room_type: RoomType) -> &'static str {
    match room_type {
        RoomType::Direct => "#FFD031",
        RoomType::Private => "#2DE0A5",
        RoomType::Public => "#1D74F5",
        RoomType::Unknown => "#9EA2A8",
    }
}

// ---------------------------------------------------------------------------
// Ranked table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRankEntry {
    pub rank: usize,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub display_name: String,
    pub message_count: u64,
}

/// Glyph standing in for the table's type icon.
pub fn type_glyph(room_type: RoomType) -> &'static str {
    match room_type {
        RoomType::Direct => "@",
        RoomType::Private => "*",
        RoomType::Public => "#",
        RoomType::Unknown => "?",
    }
}

/// Channel name when present, otherwise the participants joined by `" × "`.
pub fn display_name(channel: &RawChannel) -> String {
    match channel.name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => channel.usernames.join(USERNAME_SEPARATOR),
    }
}

/// Rank entries in the order the server sent them, starting at 1.
pub fn rank_channels(channels: &[RawChannel]) -> Vec<ChannelRankEntry> {
    channels
        .iter()
        .enumerate()
        .map(|(i, channel)| ChannelRankEntry {
            rank: i + 1,
            room_type: channel.room_type,
            display_name: display_name(channel),
            message_count: channel.messages,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// SectionView
// ---------------------------------------------------------------------------

/// What the section can show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SectionView {
    /// At least one payload has not arrived yet.
    Loading,
    /// Both payloads arrived but no channel had traffic in the period.
    Empty { origins: OriginBreakdown },
    Loaded {
        origins: OriginBreakdown,
        channels: Vec<ChannelRankEntry>,
    },
}

impl SectionView {
    pub fn is_loading(&self) -> bool {
        matches!(self, SectionView::Loading)
    }

    pub fn state_name(&self) -> &'static str {
        match self {
            SectionView::Loading => "loading",
            SectionView::Empty { .. } => "empty",
            SectionView::Loaded { .. } => "loaded",
        }
    }

    pub fn origins(&self) -> Option<&OriginBreakdown> {
        match self {
            SectionView::Loading => None,
            SectionView::Empty { origins } | SectionView::Loaded { origins, .. } => Some(origins),
        }
    }

    /// Ranked rows; `Some(&[])` for the empty state.
    pub fn channels(&self) -> Option<&[ChannelRankEntry]> {
        match self {
            SectionView::Loading => None,
            SectionView::Empty { .. } => Some(&[][..]),
            SectionView::Loaded { channels, .. } => Some(channels),
        }
    }
}

/// Combine the two payloads. Either one missing yields [`SectionView::Loading`].
pub fn shape(
    origins: Option<&OriginsResponse>,
    channels: Option<&TopChannelsResponse>,
) -> SectionView {
    let (Some(origins), Some(channels)) = (origins, channels) else {
        return SectionView::Loading;
    };

    let breakdown = OriginBreakdown::from_origins(&origins.origins);
    if channels.channels.is_empty() {
        return SectionView::Empty {
            origins: breakdown,
        };
    }

    SectionView::Loaded {
        origins: breakdown,
        channels: rank_channels(&channels.channels),
    }
}
