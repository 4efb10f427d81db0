//! Message list reducer for one open chat.
//!
//! Seeded from history page 0, then kept live from the chat-scoped stream.
//! Older pages are pulled on demand; the cursor only moves backward in time
//! and stops once a short page shows the history is exhausted. Everything is
//! cached in memory until the view is closed.

use tracing::{debug, trace};

use parley_shared::models::Message;
use parley_shared::protocol::ChatEvent;
use parley_shared::types::{ChatId, UserId};

use crate::timeline::Timeline;
use crate::{Applied, Phase};

#[derive(Debug)]
pub struct MessageListView {
    chat_id: ChatId,
    me: Option<UserId>,
    phase: Phase,
    timeline: Timeline,
    pending: Vec<ChatEvent>,
    page_size: u32,
    next_page: u32,
    exhausted: bool,
}

impl MessageListView {
    pub fn new(chat_id: ChatId, me: Option<UserId>, page_size: u32) -> Self {
        Self {
            chat_id,
            me,
            phase: Phase::Unopened,
            timeline: Timeline::new(),
            pending: Vec::new(),
            page_size: page_size.max(1),
            next_page: 0,
            exhausted: false,
        }
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Every older page has been fetched.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    /// Cached messages, oldest first.
    pub fn messages(&self) -> Vec<Message> {
        self.timeline.to_vec()
    }

    pub fn begin_loading(&mut self) {
        if self.phase == Phase::Closed {
            return;
        }
        self.phase = Phase::Loading;
        self.pending.clear();
    }

    /// Replace the cache with history page 0, go live and replay buffered
    /// events. Messages addressed to another chat are dropped.
    pub fn seed_first_page(&mut self, page: Vec<Message>) -> Vec<Applied> {
        if self.phase == Phase::Closed {
            return Vec::new();
        }

        self.timeline.clear();
        self.exhausted = (page.len() as u32) < self.page_size;
        self.next_page = 1;
        for message in page {
            if message.chat_id == self.chat_id {
                self.timeline.insert(message);
            }
        }

        self.phase = Phase::Live;
        let pending = std::mem::take(&mut self.pending);
        debug!(
            chat_id = %self.chat_id,
            messages = self.timeline.len(),
            replayed = pending.len(),
            exhausted = self.exhausted,
            "message list seeded"
        );

        let mut outcomes = Vec::with_capacity(pending.len());
        for event in pending {
            let outcome = self.apply_live(event);
            outcomes.push(outcome);
            if outcome == Applied::ChatRemoved {
                break;
            }
        }
        outcomes
    }

    /// Feed one stream event through the phase machine. Events for other
    /// chats are ignored.
    pub fn apply(&mut self, event: ChatEvent) -> Applied {
        if event.chat_id() != self.chat_id {
            return Applied::Unchanged;
        }
        match self.phase {
            Phase::Unopened | Phase::Closed => Applied::Unchanged,
            Phase::Loading => {
                trace!(chat_id = %self.chat_id, event = event.name(), "buffering message event");
                self.pending.push(event);
                Applied::Buffered
            }
            Phase::Live => self.apply_live(event),
        }
    }

    /// The page to fetch next, or `None` when nothing older is left or the
    /// view is not live.
    pub fn next_page_request(&self) -> Option<u32> {
        if self.phase != Phase::Live || self.exhausted {
            return None;
        }
        Some(self.next_page)
    }

    /// Merge an older page. Pages other than the one requested next (e.g.
    /// answers that raced a reseed) are discarded.
    pub fn absorb_page(&mut self, page: u32, messages: Vec<Message>) -> Applied {
        if self.next_page_request() != Some(page) {
            debug!(chat_id = %self.chat_id, page, "discarding stale page");
            return Applied::Unchanged;
        }

        self.next_page += 1;
        if (messages.len() as u32) < self.page_size {
            self.exhausted = true;
        }

        let mut changed = false;
        for message in messages {
            if message.chat_id == self.chat_id {
                changed |= self.timeline.insert(message);
            }
        }
        if changed || self.exhausted {
            Applied::Changed
        } else {
            Applied::Unchanged
        }
    }

    /// Stream lost: rebuild from a fresh first page.
    pub fn invalidate(&mut self) {
        self.begin_loading();
    }

    /// Release the cache and any buffered events.
    pub fn close(&mut self) {
        self.phase = Phase::Closed;
        self.timeline.clear();
        self.pending.clear();
    }

    fn apply_live(&mut self, event: ChatEvent) -> Applied {
        let changed = match event {
            ChatEvent::MessageSent(message) => self.timeline.insert(message),
            ChatEvent::MessageUpdated(message) => self.timeline.replace(message),
            ChatEvent::MessageDeleted { message_id, .. } => {
                self.timeline.remove(message_id).is_some()
            }
            ChatEvent::ChatDeleted { .. } => return self.removed(),
            ChatEvent::LeftChat { user_id, .. }
            | ChatEvent::DeleteChatParticipant { user_id, .. }
                if Some(user_id) == self.me =>
            {
                return self.removed()
            }
            _ => false,
        };
        if changed {
            Applied::Changed
        } else {
            Applied::Unchanged
        }
    }

    fn removed(&mut self) -> Applied {
        debug!(chat_id = %self.chat_id, "chat no longer available");
        self.close();
        Applied::ChatRemoved
    }
}
