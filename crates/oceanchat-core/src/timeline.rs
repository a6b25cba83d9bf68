use oceanchat_api::Message;

/// The locally held, append-ordered message list for the current session.
///
/// Entries are only ever appended; switching sessions replaces the whole
/// sequence. Each replacement bumps `epoch`, which lets a send that started
/// against an earlier view detect that the view is gone before it writes
/// its completion into the wrong conversation.
#[derive(Debug, Default)]
pub struct MessageTimeline {
    messages: Vec<Message>,
    epoch: u64,
}

impl MessageTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wholesale replacement, used on session switch.
    pub fn replace(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        self.epoch += 1;
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.epoch += 1;
    }

    /// Append the user's message ahead of backend confirmation and return
    /// its provisional id. The entry stays even if the send later fails.
    pub fn append_optimistic(&mut self, content: &str) -> String {
        let message = Message::user_local(content);
        let id = message.id.clone();
        self.messages.push(message);
        id
    }

    /// Append the assistant reply exactly as the backend returned it.
    pub fn append_from_server(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Append a synthetic assistant message describing a send failure. This
    /// is the only user-visible signal of the failure.
    pub fn append_error(&mut self, text: &str) {
        self.messages.push(Message::error_local(text));
    }

    /// Content of the earliest entry, the input to title derivation.
    pub fn first_content(&self) -> Option<&str> {
        self.messages.first().map(|m| m.content.as_str())
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oceanchat_api::MessageRole;

    fn server_reply(content: &str) -> Message {
        Message {
            id: "m2".into(),
            role: MessageRole::Assistant,
            content: content.into(),
            attachments: Vec::new(),
            model: Some("gpt-x".into()),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn appends_preserve_conversation_order() {
        let mut timeline = MessageTimeline::new();
        timeline.append_optimistic("first");
        timeline.append_from_server(server_reply("Hi!"));
        timeline.append_error("Error: API 500: boom");

        let contents: Vec<_> = timeline.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "Hi!", "Error: API 500: boom"]);
    }

    #[test]
    fn optimistic_entries_carry_provisional_ids() {
        let mut timeline = MessageTimeline::new();
        let id = timeline.append_optimistic("hello");
        assert!(id.starts_with("temp_"));
        let entry = &timeline.messages()[0];
        assert_eq!(entry.id, id);
        assert_eq!(entry.role, MessageRole::User);
        assert!(entry.attachments.is_empty());
    }

    #[test]
    fn error_entries_use_assistant_role_and_error_ids() {
        let mut timeline = MessageTimeline::new();
        timeline.append_error("Error: API 500: boom");
        let entry = &timeline.messages()[0];
        assert!(entry.id.starts_with("err_"));
        assert_eq!(entry.role, MessageRole::Assistant);
    }

    #[test]
    fn replacement_bumps_the_epoch_but_appends_do_not() {
        let mut timeline = MessageTimeline::new();
        let start = timeline.epoch();

        timeline.append_optimistic("hello");
        timeline.append_error("Error: nope");
        assert_eq!(timeline.epoch(), start);

        timeline.replace(Vec::new());
        assert_eq!(timeline.epoch(), start + 1);

        timeline.clear();
        assert_eq!(timeline.epoch(), start + 2);
    }

    #[test]
    fn first_content_reads_the_earliest_entry() {
        let mut timeline = MessageTimeline::new();
        assert_eq!(timeline.first_content(), None);
        timeline.append_optimistic("opening line");
        timeline.append_optimistic("second line");
        assert_eq!(timeline.first_content(), Some("opening line"));
    }
}
