//! Request-generation tagging for the section's two fetches.
//!
//! Every period change bumps the generation. Fetches carry the ticket they
//! were issued with, and only results for the current generation are stored,
//! so a slow response for an old period can never replace data for the
//! period the user is looking at now.

use std::fmt;

use ed_api_types::{OriginsResponse, TopChannelsResponse};
use serde::Serialize;

use crate::period::{DateRange, PeriodSelection};
use crate::shaper::{self, SectionView};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Generation(u64);

impl Generation {
    pub fn get(self) -> u64 {
        self.0
    }

    pub fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// What a fetch was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FetchTicket {
    pub generation: Generation,
    pub period: PeriodSelection,
}

impl FetchTicket {
    /// Resolve the ticket's period against the current local time.
    pub fn range(&self) -> DateRange {
        self.period.resolve()
    }
}

// ---------------------------------------------------------------------------
// FetchTracker
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct FetchTracker {
    period: PeriodSelection,
    generation: Generation,
}

impl FetchTracker {
    pub fn new(period: PeriodSelection) -> Self {
        Self {
            period,
            generation: Generation::default(),
        }
    }

    pub fn period(&self) -> PeriodSelection {
        self.period
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn ticket(&self) -> FetchTicket {
        FetchTicket {
            generation: self.generation,
            period: self.period,
        }
    }

    /// Switch period. Returns `true` (and bumps the generation) only when the
    /// selection actually changed.
    pub fn select(&mut self, period: PeriodSelection) -> bool {
        if period == self.period {
            return false;
        }
        self.period = period;
        self.generation = self.generation.next();
        true
    }

    pub fn accepts(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation
    }
}

// ---------------------------------------------------------------------------
// SectionState
// ---------------------------------------------------------------------------

/// Latest payloads for the current period plus the tracker guarding them.
#[derive(Debug, Clone, Default)]
pub struct SectionState {
    tracker: FetchTracker,
    origins: Option<OriginsResponse>,
    channels: Option<TopChannelsResponse>,
}

impl SectionState {
    pub fn new(period: PeriodSelection) -> Self {
        Self {
            tracker: FetchTracker::new(period),
            origins: None,
            channels: None,
        }
    }

    pub fn period(&self) -> PeriodSelection {
        self.tracker.period()
    }

    pub fn generation(&self) -> Generation {
        self.tracker.generation()
    }

    pub fn ticket(&self) -> FetchTicket {
        self.tracker.ticket()
    }

    /// Change period; a real change drops both payloads so the section goes
    /// back to loading instead of showing the previous period's numbers.
    pub fn select(&mut self, period: PeriodSelection) -> bool {
        if !self.tracker.select(period) {
            return false;
        }
        self.origins = None;
        self.channels = None;
        tracing::debug!(
            period = %period,
            generation = %self.tracker.generation(),
            "period changed, section reset"
        );
        true
    }

    pub fn apply_origins(&mut self, ticket: &FetchTicket, origins: OriginsResponse) -> bool {
        if !self.tracker.accepts(ticket) {
            tracing::debug!(
                stale = %ticket.generation,
                current = %self.tracker.generation(),
                "dropping stale origin breakdown"
            );
            return false;
        }
        self.origins = Some(origins);
        true
    }

    pub fn apply_channels(&mut self, ticket: &FetchTicket, channels: TopChannelsResponse) -> bool {
        if !self.tracker.accepts(ticket) {
            tracing::debug!(
                stale = %ticket.generation,
                current = %self.tracker.generation(),
                "dropping stale top channels"
            );
            return false;
        }
        self.channels = Some(channels);
        true
    }

    pub fn view(&self) -> SectionView {
        shaper::shape(self.origins.as_ref(), self.channels.as_ref())
    }
}
