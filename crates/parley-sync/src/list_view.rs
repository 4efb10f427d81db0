//! Chat list reducer.
//!
//! Holds every chat the session can see with its last message and unread
//! counter, and folds [`ChatEvent`]s from the global stream into it. Events
//! that arrive while the initial `get_chats` is in flight are buffered and
//! replayed in arrival order once the snapshot is seeded.

use std::collections::HashMap;

use tracing::{debug, trace};

use parley_shared::models::{Chat, Message};
use parley_shared::protocol::ChatEvent;
use parley_shared::types::{ChatId, MessageId, UserId};

use crate::timeline::Timeline;
use crate::{Applied, Phase};

/// Messages kept per chat for dedup and delete fallback.
const RECENT_TAIL: usize = 32;

#[derive(Debug, Default)]
pub struct ChatListView {
    phase: Phase,
    me: Option<UserId>,
    chats: HashMap<ChatId, Chat>,
    /// Newest messages seen per chat, at most [`RECENT_TAIL`] each.
    recent: HashMap<ChatId, Timeline>,
    /// Order key of the newest message evicted from `recent`. Anything at
    /// or below it counts as already seen.
    floor: HashMap<ChatId, (i64, MessageId)>,
    open_chat: Option<ChatId>,
    pending: Vec<ChatEvent>,
    /// Newest message per chat covered by the seeded snapshot. Only
    /// consulted while replaying buffered events.
    watermark: HashMap<ChatId, (i64, MessageId)>,
    /// Messages for chats not in the list yet, replayed when the chat shows up.
    orphans: HashMap<ChatId, Vec<Message>>,
}

impl ChatListView {
    pub fn new(me: Option<UserId>) -> Self {
        Self {
            me,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn open_chat(&self) -> Option<ChatId> {
        self.open_chat
    }

    pub fn get(&self, chat_id: ChatId) -> Option<&Chat> {
        self.chats.get(&chat_id)
    }

    pub fn len(&self) -> usize {
        self.chats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chats.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Chats ordered by most recent activity. Chats without messages sort
    /// last, newest id first.
    pub fn chats(&self) -> Vec<Chat> {
        let mut chats: Vec<Chat> = self.chats.values().cloned().collect();
        chats.sort_by(|a, b| {
            let a_key = a.last_message.as_ref().map(Message::order_key);
            let b_key = b.last_message.as_ref().map(Message::order_key);
            b_key.cmp(&a_key).then(b.id.cmp(&a.id))
        });
        chats
    }

    /// Start (or restart) the initial fetch. Stream events are buffered from
    /// here until [`seed`](Self::seed). Chats already shown stay visible.
    pub fn begin_loading(&mut self) {
        if self.phase == Phase::Closed {
            return;
        }
        self.phase = Phase::Loading;
        self.pending.clear();
    }

    /// Replace local state with a fresh `get_chats` snapshot, go live and
    /// replay everything buffered meanwhile. Returns the outcome of each
    /// replayed event.
    pub fn seed(&mut self, chats: Vec<Chat>) -> Vec<Applied> {
        if self.phase == Phase::Closed {
            return Vec::new();
        }

        self.chats.clear();
        self.recent.clear();
        self.floor.clear();
        self.watermark.clear();
        self.orphans.clear();
        for mut chat in chats {
            if Some(chat.id) == self.open_chat {
                chat.unread_messages_count = 0;
            }
            if let Some(last) = &chat.last_message {
                self.watermark.insert(chat.id, last.order_key());
            }
            self.remember(&chat);
            self.chats.insert(chat.id, chat);
        }

        self.phase = Phase::Live;
        let pending = std::mem::take(&mut self.pending);
        debug!(
            chats = self.chats.len(),
            replayed = pending.len(),
            "chat list seeded"
        );
        let outcomes = pending.into_iter().map(|e| self.apply_live(e)).collect();
        self.watermark.clear();
        outcomes
    }

    /// Feed one stream event through the phase machine.
    pub fn apply(&mut self, event: ChatEvent) -> Applied {
        match self.phase {
            Phase::Unopened | Phase::Closed => Applied::Unchanged,
            Phase::Loading => {
                trace!(event = event.name(), "buffering chat event");
                self.pending.push(event);
                Applied::Buffered
            }
            Phase::Live => self.apply_live(event),
        }
    }

    /// Insert a chat fetched out of band (e.g. after [`Applied::UnknownChat`]
    /// or [`Applied::StaleChat`]).
    /// Messages held for it are applied on top.
    pub fn upsert_chat(&mut self, chat: Chat) -> Applied {
        if self.phase != Phase::Live {
            return Applied::Unchanged;
        }
        self.upsert(chat)
    }

    /// Give up on a chat that could not be resolved.
    pub fn forget_orphans(&mut self, chat_id: ChatId) -> usize {
        self.orphans.remove(&chat_id).map_or(0, |held| held.len())
    }

    /// Mark `chat_id` as the chat on screen and clear its unread counter.
    pub fn set_open_chat(&mut self, chat_id: Option<ChatId>) -> bool {
        let mut changed = self.open_chat != chat_id;
        self.open_chat = chat_id;
        if let Some(chat) = chat_id.and_then(|id| self.chats.get_mut(&id)) {
            if chat.unread_messages_count != 0 {
                chat.unread_messages_count = 0;
                changed = true;
            }
        }
        changed
    }

    /// Stream lost: state may be stale until the next [`seed`](Self::seed).
    pub fn invalidate(&mut self) {
        self.begin_loading();
    }

    pub fn close(&mut self) {
        self.phase = Phase::Closed;
        self.chats.clear();
        self.recent.clear();
        self.floor.clear();
        self.pending.clear();
        self.watermark.clear();
        self.orphans.clear();
        self.open_chat = None;
    }

    fn remember(&mut self, chat: &Chat) {
        let timeline = self.recent.entry(chat.id).or_default();
        if let Some(last) = &chat.last_message {
            if !timeline.insert(last.clone()) {
                timeline.replace(last.clone());
            }
        }
        self.trim_recent(chat.id);
    }

    /// Record a new message. Returns `false` if it was seen before.
    fn record(&mut self, message: &Message) -> bool {
        let chat_id = message.chat_id;
        if self
            .floor
            .get(&chat_id)
            .is_some_and(|floor| message.order_key() <= *floor)
        {
            return false;
        }
        if !self.recent.entry(chat_id).or_default().insert(message.clone()) {
            return false;
        }
        self.trim_recent(chat_id);
        true
    }

    fn trim_recent(&mut self, chat_id: ChatId) {
        let Some(timeline) = self.recent.get_mut(&chat_id) else {
            return;
        };
        while timeline.len() > RECENT_TAIL {
            let Some(evicted) = timeline.pop_oldest() else {
                break;
            };
            let key = evicted.order_key();
            let floor = self.floor.entry(chat_id).or_insert(key);
            *floor = (*floor).max(key);
        }
    }

    #[cfg(test)]
    fn recent_len(&self, chat_id: ChatId) -> usize {
        self.recent.get(&chat_id).map_or(0, Timeline::len)
    }

    fn apply_live(&mut self, event: ChatEvent) -> Applied {
        let chat_id = event.chat_id();
        match event {
            ChatEvent::MessageSent(message) => self.message_sent(message),

            ChatEvent::MessageUpdated(message) => {
                let Some(chat) = self.chats.get_mut(&chat_id) else {
                    return Applied::Unchanged;
                };
                let mut changed = self
                    .recent
                    .get_mut(&chat_id)
                    .is_some_and(|t| t.replace(message.clone()));
                if let Some(last) = chat.last_message.as_mut() {
                    if last.id == message.id && *last != message {
                        *last = message;
                        changed = true;
                    }
                }
                changed_if(changed)
            }

            ChatEvent::MessageDeleted { message_id, .. } => {
                let Some(chat) = self.chats.get_mut(&chat_id) else {
                    return Applied::Unchanged;
                };
                let timeline = self.recent.entry(chat_id).or_default();
                let removed = timeline.remove(message_id).is_some();
                if chat.last_message.as_ref().map(|m| m.id) != Some(message_id) {
                    return changed_if(removed);
                }
                chat.last_message = timeline.newest().cloned();
                if chat.last_message.is_some() {
                    Applied::Changed
                } else {
                    debug!(chat_id = %chat_id, "last message deleted, chat is stale");
                    Applied::StaleChat(chat_id)
                }
            }

            ChatEvent::ChatCreated(chat) | ChatEvent::ChatUpdated(chat) => self.upsert(chat),

            ChatEvent::ChatDeleted { .. } => changed_if(self.remove_chat(chat_id)),

            ChatEvent::LeftChat { user_id, .. }
            | ChatEvent::DeleteChatParticipant { user_id, .. } => {
                if Some(user_id) == self.me {
                    return changed_if(self.remove_chat(chat_id));
                }
                let Some(chat) = self.chats.get_mut(&chat_id) else {
                    return Applied::Unchanged;
                };
                if !chat.remove_participant(user_id) {
                    return Applied::Unchanged;
                }
                if chat.participants.is_empty() {
                    self.remove_chat(chat_id);
                }
                Applied::Changed
            }

            ChatEvent::AddChatParticipants { participants, .. } => {
                match self.chats.get_mut(&chat_id) {
                    Some(chat) => changed_if(chat.upsert_participants(&participants)),
                    None => Applied::Unchanged,
                }
            }
        }
    }

    fn message_sent(&mut self, message: Message) -> Applied {
        let chat_id = message.chat_id;
        if !self.chats.contains_key(&chat_id) {
            self.orphans.entry(chat_id).or_default().push(message);
            return Applied::UnknownChat(chat_id);
        }
        if !self.record(&message) {
            return Applied::Unchanged;
        }
        let Some(chat) = self.chats.get_mut(&chat_id) else {
            return Applied::Unchanged;
        };

        let already_counted = self
            .watermark
            .get(&chat_id)
            .is_some_and(|mark| message.order_key() <= *mark);
        if self.open_chat != Some(chat_id) && !already_counted {
            chat.unread_messages_count = chat.unread_messages_count.saturating_add(1);
        }

        let newer = chat
            .last_message
            .as_ref()
            .map_or(true, |last| message.is_newer_than(last));
        if newer {
            chat.last_message = Some(message);
        }
        Applied::Changed
    }

    fn upsert(&mut self, mut incoming: Chat) -> Applied {
        let chat_id = incoming.id;
        self.remember(&incoming);

        let Some(existing) = self.chats.get(&chat_id) else {
            if Some(chat_id) == self.open_chat {
                incoming.unread_messages_count = 0;
            }
            self.chats.insert(chat_id, incoming);
            for message in self.orphans.remove(&chat_id).unwrap_or_default() {
                self.message_sent(message);
            }
            return Applied::Changed;
        };

        // Keep whichever last message is newer and the local unread counter.
        let keep_last = match (&existing.last_message, &incoming.last_message) {
            (Some(old), Some(new)) => old.is_newer_than(new),
            (Some(_), None) => true,
            _ => false,
        };
        if keep_last {
            incoming.last_message = existing.last_message.clone();
        }
        incoming.unread_messages_count = existing.unread_messages_count;

        if *existing == incoming {
            return Applied::Unchanged;
        }
        self.chats.insert(chat_id, incoming);
        Applied::Changed
    }

    fn remove_chat(&mut self, chat_id: ChatId) -> bool {
        self.recent.remove(&chat_id);
        self.floor.remove(&chat_id);
        let removed = self.chats.remove(&chat_id).is_some();
        if removed {
            debug!(chat_id = %chat_id, "chat removed from list");
        }
        removed
    }
}

fn changed_if(changed: bool) -> Applied {
    if changed {
        Applied::Changed
    } else {
        Applied::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{chat, message, participant, sent, ME};
    use proptest::prelude::*;

    fn live(chats: Vec<Chat>) -> ChatListView {
        let mut view = ChatListView::new(Some(ME));
        view.begin_loading();
        view.seed(chats);
        view
    }

    #[test]
    fn test_message_sent_sets_last_message() {
        let mut view = live(vec![chat(1, &[1, 2])]);
        assert_eq!(view.apply(sent(10, 1, 100)), Applied::Changed);

        let chat = view.get(ChatId(1)).unwrap();
        assert_eq!(chat.last_message.as_ref().unwrap().id, MessageId(10));
        assert_eq!(chat.unread_messages_count, 1);
    }

    #[test]
    fn test_older_message_does_not_replace_last() {
        let mut view = live(vec![chat(1, &[1, 2])]);
        view.apply(sent(10, 1, 100));
        view.apply(sent(9, 1, 50));

        let chat = view.get(ChatId(1)).unwrap();
        assert_eq!(chat.last_message.as_ref().unwrap().id, MessageId(10));
        assert_eq!(chat.unread_messages_count, 2);
    }

    #[test]
    fn test_open_chat_does_not_count_unread() {
        let mut seeded = chat(1, &[1, 2]);
        seeded.unread_messages_count = 3;
        let mut view = live(vec![seeded, chat(2, &[1, 3])]);

        assert!(view.set_open_chat(Some(ChatId(1))));
        assert_eq!(view.get(ChatId(1)).unwrap().unread_messages_count, 0);

        view.apply(sent(10, 1, 100));
        view.apply(sent(11, 2, 101));
        assert_eq!(view.get(ChatId(1)).unwrap().unread_messages_count, 0);
        assert_eq!(view.get(ChatId(2)).unwrap().unread_messages_count, 1);
    }

    #[test]
    fn test_events_buffer_while_loading() {
        let mut view = ChatListView::new(Some(ME));
        assert_eq!(view.apply(sent(10, 1, 100)), Applied::Unchanged);

        view.begin_loading();
        assert_eq!(view.apply(sent(10, 1, 100)), Applied::Buffered);
        assert_eq!(view.apply(sent(11, 1, 110)), Applied::Buffered);
        assert_eq!(view.pending_len(), 2);
        assert!(view.is_empty());

        let outcomes = view.seed(vec![chat(1, &[1, 2])]);
        assert_eq!(outcomes, vec![Applied::Changed, Applied::Changed]);
        assert_eq!(view.phase(), Phase::Live);
        assert_eq!(
            view.get(ChatId(1)).unwrap().last_message.as_ref().unwrap().id,
            MessageId(11)
        );
    }

    #[test]
    fn test_replay_skips_messages_already_in_snapshot() {
        let mut seeded = chat(1, &[1, 2]);
        seeded.last_message = Some(message(11, 1, 110));
        seeded.unread_messages_count = 2;

        let mut view = ChatListView::new(Some(ME));
        view.begin_loading();
        view.apply(sent(10, 1, 100));
        view.apply(sent(11, 1, 110));
        view.apply(sent(12, 1, 120));
        let outcomes = view.seed(vec![seeded]);

        // 10 is older than the snapshot, 11 is its last message, 12 is new.
        assert_eq!(
            outcomes,
            vec![Applied::Changed, Applied::Unchanged, Applied::Changed]
        );
        let chat = view.get(ChatId(1)).unwrap();
        assert_eq!(chat.unread_messages_count, 3);
        assert_eq!(chat.last_message.as_ref().unwrap().id, MessageId(12));

        // Past the replay, older ids count again.
        view.apply(sent(5, 1, 10));
        assert_eq!(view.get(ChatId(1)).unwrap().unread_messages_count, 4);
    }

    #[test]
    fn test_message_sent_for_unknown_chat_is_reported() {
        let mut view = live(vec![]);
        assert_eq!(view.apply(sent(10, 7, 100)), Applied::UnknownChat(ChatId(7)));
        assert_eq!(view.apply(sent(11, 7, 110)), Applied::UnknownChat(ChatId(7)));
        assert_eq!(view.apply(sent(5, 8, 50)), Applied::UnknownChat(ChatId(8)));

        // Held messages land once the chat is known.
        assert_eq!(view.upsert_chat(chat(7, &[1, 2])), Applied::Changed);
        let resolved = view.get(ChatId(7)).unwrap();
        assert_eq!(resolved.unread_messages_count, 2);
        assert_eq!(resolved.last_message.as_ref().unwrap().id, MessageId(11));
        assert_eq!(view.apply(sent(10, 7, 100)), Applied::Unchanged);

        assert_eq!(view.forget_orphans(ChatId(8)), 1);
        assert_eq!(view.forget_orphans(ChatId(8)), 0);
    }

    #[test]
    fn test_chat_created_picks_up_held_messages() {
        let mut view = live(vec![]);
        view.apply(sent(10, 7, 100));
        assert_eq!(
            view.apply(ChatEvent::ChatCreated(chat(7, &[1, 2]))),
            Applied::Changed
        );
        assert_eq!(
            view.get(ChatId(7)).unwrap().last_message.as_ref().unwrap().id,
            MessageId(10)
        );
    }

    #[test]
    fn test_message_updated_replaces_known_only() {
        let mut view = live(vec![chat(1, &[1, 2])]);
        view.apply(sent(10, 1, 100));

        let mut edited = message(10, 1, 100);
        edited.text = Some("edited".into());
        assert_eq!(
            view.apply(ChatEvent::MessageUpdated(edited.clone())),
            Applied::Changed
        );
        assert_eq!(
            view.get(ChatId(1)).unwrap().last_message.as_ref().unwrap().text,
            Some("edited".into())
        );

        assert_eq!(
            view.apply(ChatEvent::MessageUpdated(message(99, 1, 5))),
            Applied::Unchanged
        );
        assert_eq!(
            view.apply(ChatEvent::MessageUpdated(message(10, 42, 100))),
            Applied::Unchanged
        );
    }

    #[test]
    fn test_deleting_last_message_falls_back_to_next_newest() {
        let mut view = live(vec![chat(1, &[1, 2])]);
        view.apply(sent(10, 1, 100));
        view.apply(sent(11, 1, 110));

        let delete = |id| ChatEvent::MessageDeleted {
            chat_id: ChatId(1),
            message_id: MessageId(id),
        };
        assert_eq!(view.apply(delete(11)), Applied::Changed);
        assert_eq!(
            view.get(ChatId(1)).unwrap().last_message.as_ref().unwrap().id,
            MessageId(10)
        );
        assert_eq!(view.apply(delete(10)), Applied::StaleChat(ChatId(1)));
        assert!(view.get(ChatId(1)).unwrap().last_message.is_none());
        assert_eq!(view.apply(delete(10)), Applied::Unchanged);
    }

    #[test]
    fn test_deleting_seeded_last_message_marks_chat_stale() {
        let mut seeded = chat(1, &[1, 2]);
        seeded.last_message = Some(message(11, 1, 110));
        let mut view = live(vec![seeded]);

        let outcome = view.apply(ChatEvent::MessageDeleted {
            chat_id: ChatId(1),
            message_id: MessageId(11),
        });
        assert_eq!(outcome, Applied::StaleChat(ChatId(1)));
        assert!(view.get(ChatId(1)).unwrap().last_message.is_none());

        // The refetched chat brings the server's last message back.
        let mut refetched = chat(1, &[1, 2]);
        refetched.last_message = Some(message(10, 1, 100));
        assert_eq!(view.upsert_chat(refetched), Applied::Changed);
        assert_eq!(
            view.get(ChatId(1)).unwrap().last_message.as_ref().unwrap().id,
            MessageId(10)
        );
    }

    #[test]
    fn test_deleting_seeded_last_message_uses_cached_successor() {
        let mut seeded = chat(1, &[1, 2]);
        seeded.last_message = Some(message(11, 1, 110));
        let mut view = live(vec![seeded]);
        view.apply(sent(12, 1, 120));

        let delete = |id| ChatEvent::MessageDeleted {
            chat_id: ChatId(1),
            message_id: MessageId(id),
        };
        assert_eq!(view.apply(delete(12)), Applied::Changed);
        assert_eq!(
            view.get(ChatId(1)).unwrap().last_message.as_ref().unwrap().id,
            MessageId(11)
        );
        assert_eq!(view.apply(delete(11)), Applied::StaleChat(ChatId(1)));
    }

    #[test]
    fn test_recent_messages_are_bounded_per_chat() {
        let mut view = live(vec![chat(1, &[1, 2])]);
        for id in 1..=200 {
            view.apply(sent(id, 1, id * 10));
        }
        assert_eq!(view.recent_len(ChatId(1)), RECENT_TAIL);
        assert_eq!(view.get(ChatId(1)).unwrap().unread_messages_count, 200);

        // Redelivery of an evicted message is still a duplicate.
        assert_eq!(view.apply(sent(3, 1, 30)), Applied::Unchanged);
        assert_eq!(view.apply(sent(199, 1, 1990)), Applied::Unchanged);
        assert_eq!(view.get(ChatId(1)).unwrap().unread_messages_count, 200);
        assert_eq!(view.recent_len(ChatId(1)), RECENT_TAIL);
    }

    #[test]
    fn test_chat_deleted_for_unknown_chat_is_noop() {
        let mut view = live(vec![chat(1, &[1, 2])]);
        let before = view.chats();
        assert_eq!(
            view.apply(ChatEvent::ChatDeleted { chat_id: ChatId(9) }),
            Applied::Unchanged
        );
        assert_eq!(view.chats(), before);

        assert_eq!(
            view.apply(ChatEvent::ChatDeleted { chat_id: ChatId(1) }),
            Applied::Changed
        );
        assert!(view.is_empty());
    }

    #[test]
    fn test_chat_updated_keeps_newer_last_message_and_unread() {
        let mut view = live(vec![chat(1, &[1, 2, 3])]);
        view.apply(sent(10, 1, 100));

        let mut renamed = chat(1, &[1, 2, 3]);
        renamed.name = Some("Team".into());
        renamed.last_message = Some(message(4, 1, 40));
        assert_eq!(view.apply(ChatEvent::ChatUpdated(renamed)), Applied::Changed);

        let chat = view.get(ChatId(1)).unwrap();
        assert_eq!(chat.name.as_deref(), Some("Team"));
        assert_eq!(chat.last_message.as_ref().unwrap().id, MessageId(10));
        assert_eq!(chat.unread_messages_count, 1);
    }

    #[test]
    fn test_participant_events_touch_only_their_chat() {
        let mut view = live(vec![chat(1, &[1, 2, 3]), chat(2, &[1, 2, 3])]);

        assert_eq!(
            view.apply(ChatEvent::LeftChat {
                chat_id: ChatId(1),
                user_id: UserId(3)
            }),
            Applied::Changed
        );
        assert_eq!(view.get(ChatId(1)).unwrap().participants.len(), 2);
        assert_eq!(view.get(ChatId(2)).unwrap().participants.len(), 3);

        assert_eq!(
            view.apply(ChatEvent::AddChatParticipants {
                chat_id: ChatId(2),
                participants: vec![participant(4)],
            }),
            Applied::Changed
        );
        assert_eq!(view.get(ChatId(1)).unwrap().participants.len(), 2);
        assert_eq!(view.get(ChatId(2)).unwrap().participants.len(), 4);

        // Removing me drops the chat entirely.
        assert_eq!(
            view.apply(ChatEvent::DeleteChatParticipant {
                chat_id: ChatId(2),
                user_id: ME
            }),
            Applied::Changed
        );
        assert!(view.get(ChatId(2)).is_none());
    }

    #[test]
    fn test_chats_sorted_by_recency() {
        let mut view = live(vec![chat(1, &[1, 2]), chat(2, &[1, 3]), chat(3, &[1, 4])]);
        view.apply(sent(10, 2, 100));
        view.apply(sent(11, 1, 200));

        let ids: Vec<i64> = view.chats().iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_closed_view_discards_everything() {
        let mut view = live(vec![chat(1, &[1, 2])]);
        view.close();
        assert_eq!(view.phase(), Phase::Closed);
        assert_eq!(view.apply(sent(10, 1, 100)), Applied::Unchanged);
        view.begin_loading();
        assert_eq!(view.phase(), Phase::Closed);
        assert!(view.seed(vec![chat(1, &[1, 2])]).is_empty());
        assert!(view.is_empty());
    }

    proptest! {
        #[test]
        fn prop_unread_counts_each_distinct_message_once(
            ids in proptest::collection::vec(1i64..40, 0..60),
            open in proptest::option::of(1i64..3),
        ) {
            let mut view = live(vec![chat(1, &[1, 2]), chat(2, &[1, 3])]);
            view.set_open_chat(open.map(ChatId));

            let mut expected: HashMap<ChatId, u32> = HashMap::new();
            let mut seen = std::collections::HashSet::new();
            for id in &ids {
                let chat_id = 1 + id % 2;
                view.apply(sent(*id, chat_id, id * 10));
                if seen.insert(*id) && Some(chat_id) != open {
                    *expected.entry(ChatId(chat_id)).or_default() += 1;
                }
            }

            for chat_id in [ChatId(1), ChatId(2)] {
                prop_assert_eq!(
                    view.get(chat_id).unwrap().unread_messages_count,
                    expected.get(&chat_id).copied().unwrap_or(0)
                );
            }
        }

        #[test]
        fn prop_duplicate_delivery_is_idempotent(
            ops in proptest::collection::vec((0u8..3, 1i64..20), 0..60),
        ) {
            let events: Vec<ChatEvent> = ops
                .iter()
                .map(|(op, id)| match op {
                    0 => sent(*id, 1, id * 10),
                    1 => {
                        let mut m = message(*id, 1, id * 10);
                        m.text = Some(format!("edit {id}"));
                        ChatEvent::MessageUpdated(m)
                    }
                    _ => ChatEvent::MessageDeleted {
                        chat_id: ChatId(1),
                        message_id: MessageId(*id),
                    },
                })
                .collect();

            let mut once = live(vec![chat(1, &[1, 2])]);
            let mut twice = live(vec![chat(1, &[1, 2])]);
            for event in &events {
                once.apply(event.clone());
                twice.apply(event.clone());
                twice.apply(event.clone());
            }
            prop_assert_eq!(once.chats(), twice.chats());
        }
    }
}
