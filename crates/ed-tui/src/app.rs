use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use ed_api_types::{OriginsResponse, RawChannel, RawOrigin, RoomType, TopChannelsResponse};
use ed_core::generation::{FetchTicket, SectionState};
use ed_core::period::{DateRange, PeriodSelection};
use ed_core::shaper::SectionView;

use crate::api_client::SectionFetch;

/// Section heading shown above the breakdown.
pub const SECTION_TITLE: &str = "Where are messages being sent?";

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    pub section: SectionState,
    /// Range of the most recent fetch (or of the selection when nothing
    /// has been fetched for it yet).
    pub range: DateRange,
    pub should_quit: bool,
    pub show_help: bool,
    pub offline: bool,
    pub last_error: Option<String>,
    pub last_updated: Option<DateTime<Local>>,

    /// Ticket the fetch worker should pick up next.
    pending: Option<FetchTicket>,
}

impl App {
    pub fn new(offline: bool, period: PeriodSelection) -> Self {
        let mut app = Self {
            section: SectionState::new(period),
            range: period.resolve(),
            should_quit: false,
            show_help: false,
            offline,
            last_error: None,
            last_updated: None,
            pending: None,
        };
        if offline {
            app.load_demo();
        }
        app
    }

    pub fn period(&self) -> PeriodSelection {
        self.section.period()
    }

    pub fn view(&self) -> SectionView {
        self.section.view()
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        // Help modal intercepts Esc and ?
        if self.show_help {
            match key.code {
                KeyCode::Char('?') | KeyCode::Esc => self.show_help = false,
                _ => {}
            }
            return;
        }

        match key.code {
            // Quit
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }

            // Period selection: 1-3
            KeyCode::Char(c @ '1'..='3') => {
                let idx = (c as usize) - ('1' as usize);
                self.select_period(PeriodSelection::ALL[idx]);
            }

            // Cycle
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => {
                self.select_period(self.period().next());
            }
            KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => {
                self.select_period(self.period().prev());
            }

            // Help
            KeyCode::Char('?') => self.show_help = true,

            KeyCode::Char('r') => self.request_refresh(),

            _ => {}
        }
    }

    /// Switch period. A real change resets the section to loading and queues
    /// a fetch for the new generation.
    pub fn select_period(&mut self, period: PeriodSelection) {
        if !self.section.select(period) {
            return;
        }
        self.range = period.resolve();
        self.last_error = None;
        if self.offline {
            self.load_demo();
        } else {
            self.pending = Some(self.section.ticket());
        }
    }

    /// Re-fetch the current period without changing generation.
    pub fn request_refresh(&mut self) {
        if self.offline {
            self.load_demo();
        } else {
            self.pending = Some(self.section.ticket());
        }
    }

    /// Hand the queued ticket (if any) to the caller.
    pub fn take_request(&mut self) -> Option<FetchTicket> {
        self.pending.take()
    }

    /// Apply a worker result. Returns `false` when it was issued for a
    /// period that is no longer selected.
    pub fn apply_fetch(&mut self, fetch: SectionFetch) -> bool {
        let SectionFetch {
            ticket,
            range,
            origins,
            channels,
        } = fetch;

        if ticket.generation != self.section.generation() {
            tracing::debug!(
                stale = %ticket.generation,
                current = %self.section.generation(),
                "ignoring fetch for superseded period"
            );
            return false;
        }

        let mut errors = Vec::new();
        match origins {
            Ok(origins) => {
                self.section.apply_origins(&ticket, origins);
            }
            Err(e) => errors.push(e.to_string()),
        }
        match channels {
            Ok(channels) => {
                self.section.apply_channels(&ticket, channels);
            }
            Err(e) => errors.push(e.to_string()),
        }

        self.range = range;
        if errors.is_empty() {
            self.last_error = None;
            self.last_updated = Some(Local::now());
        } else {
            for e in &errors {
                tracing::warn!(error = %e, period = %ticket.period, "section fetch failed");
            }
            self.last_error = Some(errors.join("; "));
        }
        true
    }

    fn load_demo(&mut self) {
        let ticket = self.section.ticket();
        let factor = demo_factor(ticket.period);
        self.section.apply_origins(&ticket, demo_origins(factor));
        self.section.apply_channels(&ticket, demo_channels(factor));
        self.last_updated = Some(Local::now());
    }
}

// ---------------------------------------------------------------------------
// Demo data (offline mode)
// ---------------------------------------------------------------------------

fn demo_factor(period: PeriodSelection) -> u64 {
    match period {
        PeriodSelection::Last7 => 1,
        PeriodSelection::Last30 => 4,
        PeriodSelection::Last90 => 11,
    }
}

fn demo_origins(factor: u64) -> OriginsResponse {
    OriginsResponse {
        origins: vec![
            RawOrigin { room_type: RoomType::Direct, messages: 412 * factor },
            RawOrigin { room_type: RoomType::Private, messages: 268 * factor },
            RawOrigin { room_type: RoomType::Public, messages: 735 * factor },
        ],
    }
}

fn demo_channels(factor: u64) -> TopChannelsResponse {
    let named = |room_type, messages: u64, name: &str| RawChannel {
        room_type,
        messages: messages * factor,
        name: Some(name.into()),
        usernames: Vec::new(),
    };
    let direct = |messages: u64, users: &[&str]| RawChannel {
        room_type: RoomType::Direct,
        messages: messages * factor,
        name: None,
        usernames: users.iter().map(|u| u.to_string()).collect(),
    };

    TopChannelsResponse {
        channels: vec![
            named(RoomType::Public, 320, "general"),
            direct(188, &["alice", "bob"]),
            named(RoomType::Private, 141, "release-team"),
            named(RoomType::Public, 97, "random"),
            direct(64, &["carol", "dave"]),
        ],
    }
}
