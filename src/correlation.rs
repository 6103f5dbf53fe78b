//! Pending correlation slots for discovery-then-act intents.
//!
//! Each kind holds at most one slot. A write replaces whatever was pending:
//! the latest request wins and the superseded one is never resolved. The
//! broadcast handler matches a slot against incoming data and takes it under
//! the same lock, so a request written mid-match is never consumed.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;

/// Target of a "trigger the slide labeled X" request, waiting for the playlist
/// listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlideByLabelSlot {
    pub playlist_name: String,
    pub presentation_name: String,
    pub slide_label: String,
}

/// Target of a "trigger slide N of group G" request, waiting for the
/// presentation detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSlideSlot {
    /// One or more group names separated by `|`.
    pub group_name: String,
    pub slide_number_text: String,
    pub presentation_path: String,
}

impl GroupSlideSlot {
    pub fn group_alternatives(&self) -> impl Iterator<Item = &str> {
        self.group_name
            .split('|')
            .map(str::trim)
            .filter(|g| !g.is_empty())
    }
}

/// Second stage of a slide-by-label request: the presentation was found in
/// the playlists and its detail requested; waiting for the slide list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelLookup {
    pub presentation_path: String,
    pub slide_label: String,
}

/// A slide-by-label request in either stage. `located` is set once the
/// playlist listing has placed the presentation. Both stages share one slot,
/// so a new request replaces either.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LabelRequest {
    slot: SlideByLabelSlot,
    located: Option<String>,
}

impl LabelRequest {
    fn lookup(&self) -> Option<LabelLookup> {
        self.located.as_ref().map(|path| LabelLookup {
            presentation_path: path.clone(),
            slide_label: self.slot.slide_label.clone(),
        })
    }
}

#[derive(Debug)]
struct Pending<T> {
    slot: T,
    written_at: Instant,
}

impl<T> Pending<T> {
    fn new(slot: T) -> Self {
        Self {
            slot,
            written_at: Instant::now(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CorrelationStore {
    slide_by_label: Mutex<Option<Pending<LabelRequest>>>,
    group_slide: Mutex<Option<Pending<GroupSlideSlot>>>,
}

/// Snapshot of both slots, for inspection surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct PendingCorrelation {
    pub slide_by_label: Option<SlideByLabelSlot>,
    pub label_lookup: Option<LabelLookup>,
    pub group_slide: Option<GroupSlideSlot>,
}

/// Take the pending value when `matches` accepts it, all under one lock.
fn take_if<T, R>(
    cell: &Mutex<Option<Pending<T>>>,
    select: impl FnOnce(&T) -> Option<R>,
    matches: impl FnOnce(&R) -> bool,
) -> Option<R> {
    let mut guard = cell.lock();
    let taken = guard
        .as_ref()
        .and_then(|p| select(&p.slot))
        .filter(|v| matches(v));
    if taken.is_some() {
        *guard = None;
    }
    taken
}

impl CorrelationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a slide-by-label slot, replacing a request in either stage.
    /// Returns the slot it superseded, if any.
    pub fn write_slide_by_label(&self, slot: SlideByLabelSlot) -> Option<SlideByLabelSlot> {
        let request = LabelRequest {
            slot,
            located: None,
        };
        let previous = self.slide_by_label.lock().replace(Pending::new(request));
        previous.map(|p| p.slot.slot)
    }

    /// The slide-by-label request still waiting for the playlist listing.
    pub fn slide_by_label(&self) -> Option<SlideByLabelSlot> {
        let guard = self.slide_by_label.lock();
        let request = &guard.as_ref()?.slot;
        request.located.is_none().then(|| request.slot.clone())
    }

    /// The slide-by-label request waiting for the presentation detail.
    pub fn label_lookup(&self) -> Option<LabelLookup> {
        self.slide_by_label.lock().as_ref()?.slot.lookup()
    }

    /// Move `expected` to its second stage once its presentation is located.
    /// Returns false when `expected` was superseded in the meantime.
    pub fn advance_slide_by_label_if(
        &self,
        expected: &SlideByLabelSlot,
        presentation_path: String,
    ) -> bool {
        let mut guard = self.slide_by_label.lock();
        match guard.as_mut() {
            Some(p) if p.slot.located.is_none() && p.slot.slot == *expected => {
                p.slot.located = Some(presentation_path);
                true
            }
            _ => false,
        }
    }

    /// Take the second-stage lookup if `matches` accepts it.
    pub fn take_label_lookup_if(
        &self,
        matches: impl FnOnce(&LabelLookup) -> bool,
    ) -> Option<LabelLookup> {
        take_if(&self.slide_by_label, LabelRequest::lookup, matches)
    }

    /// Store a group-slide slot. Returns the slot it superseded, if any.
    pub fn write_group_slide(&self, slot: GroupSlideSlot) -> Option<GroupSlideSlot> {
        let previous = self.group_slide.lock().replace(Pending::new(slot));
        previous.map(|p| p.slot)
    }

    pub fn group_slide(&self) -> Option<GroupSlideSlot> {
        self.group_slide.lock().as_ref().map(|p| p.slot.clone())
    }

    /// Take the group-slide slot if `matches` accepts it.
    pub fn take_group_slide_if(
        &self,
        matches: impl FnOnce(&GroupSlideSlot) -> bool,
    ) -> Option<GroupSlideSlot> {
        take_if(&self.group_slide, |slot| Some(slot.clone()), matches)
    }

    /// Drop slots that have been pending longer than `max_age`. Returns how
    /// many were dropped.
    pub fn expire_older_than(&self, max_age: Duration) -> usize {
        let mut dropped = 0;
        {
            let mut guard = self.slide_by_label.lock();
            if guard.as_ref().is_some_and(|p| p.written_at.elapsed() > max_age) {
                *guard = None;
                dropped += 1;
            }
        }
        {
            let mut guard = self.group_slide.lock();
            if guard.as_ref().is_some_and(|p| p.written_at.elapsed() > max_age) {
                *guard = None;
                dropped += 1;
            }
        }
        dropped
    }

    pub fn snapshot(&self) -> PendingCorrelation {
        PendingCorrelation {
            slide_by_label: self.slide_by_label(),
            label_lookup: self.label_lookup(),
            group_slide: self.group_slide(),
        }
    }
}
