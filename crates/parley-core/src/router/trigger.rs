//! Trigger detection
//!
//! Direct messages always trigger. In group channels the bot must be
//! mentioned or the message must start with the command prefix.

/// Kind of channel an event arrived in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// One-to-one conversation with the bot
    Direct,
    /// Any shared channel (guild text, thread, group DM)
    Group,
}

/// A message received from the transport
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundEvent {
    /// Transport message id, used to thread replies
    pub message_id: String,
    /// Author identity
    pub author_id: String,
    /// Channel the message was posted in
    pub channel_id: String,
    /// Raw text content
    pub content: String,
    /// Ids of users mentioned in the message
    pub mentions: Vec<String>,
}

impl InboundEvent {
    /// Whether `user_id` is among the mentioned users
    #[must_use]
    pub fn mentions_user(&self, user_id: &str) -> bool {
        self.mentions.iter().any(|m| m == user_id)
    }
}

/// Decide whether `event` triggers a turn and extract the text to answer.
///
/// Returns `None` when the bot should stay quiet. Direct-message content is
/// returned as is; mention and prefix activation are stripped and the rest
/// is trimmed.
#[must_use]
pub fn detect_trigger(
    event: &InboundEvent,
    kind: ChannelKind,
    bot_id: &str,
    prefix: &str,
) -> Option<String> {
    if kind == ChannelKind::Direct {
        return Some(event.content.clone());
    }

    if event.mentions_user(bot_id) {
        let stripped = strip_mentions(&event.content, bot_id);
        return Some(stripped.trim().to_string());
    }

    event
        .content
        .strip_prefix(prefix)
        .map(|rest| rest.trim().to_string())
}

fn strip_mentions(content: &str, bot_id: &str) -> String {
    content
        .replace(&format!("<@{bot_id}>"), "")
        .replace(&format!("<@!{bot_id}>"), "")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT: &str = "999";

    fn event(content: &str, mentions: &[&str]) -> InboundEvent {
        InboundEvent {
            message_id: "m1".to_string(),
            author_id: "42".to_string(),
            channel_id: "c1".to_string(),
            content: content.to_string(),
            mentions: mentions.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[test]
    fn test_direct_message_always_triggers() {
        let out = detect_trigger(&event("hello", &[]), ChannelKind::Direct, BOT, "!");
        assert_eq!(out.as_deref(), Some("hello"));
    }

    #[test]
    fn test_direct_message_keeps_prefix() {
        let out = detect_trigger(&event("!hello", &[]), ChannelKind::Direct, BOT, "!");
        assert_eq!(out.as_deref(), Some("!hello"));
    }

    #[test]
    fn test_group_plain_message_ignored() {
        assert_eq!(
            detect_trigger(&event("hello", &[]), ChannelKind::Group, BOT, "!"),
            None
        );
    }

    #[test]
    fn test_group_prefix_triggers() {
        let out = detect_trigger(&event("!hello", &[]), ChannelKind::Group, BOT, "!");
        assert_eq!(out.as_deref(), Some("hello"));
    }

    #[test]
    fn test_group_multichar_prefix() {
        let out = detect_trigger(&event("?ask  what time", &[]), ChannelKind::Group, BOT, "?ask");
        assert_eq!(out.as_deref(), Some("what time"));
    }

    #[test]
    fn test_group_mention_triggers() {
        let out = detect_trigger(&event("<@999> hello", &[BOT]), ChannelKind::Group, BOT, "!");
        assert_eq!(out.as_deref(), Some("hello"));
    }

    #[test]
    fn test_nickname_mention_stripped() {
        let out = detect_trigger(
            &event("<@!999> hi <@999>", &[BOT]),
            ChannelKind::Group,
            BOT,
            "!",
        );
        assert_eq!(out.as_deref(), Some("hi"));
    }

    #[test]
    fn test_other_user_mention_kept() {
        let out = detect_trigger(
            &event("<@999> ask <@123> about it", &["123", BOT]),
            ChannelKind::Group,
            BOT,
            "!",
        );
        assert_eq!(out.as_deref(), Some("ask <@123> about it"));
    }

    #[test]
    fn test_mention_of_someone_else_ignored() {
        assert_eq!(
            detect_trigger(&event("<@123> hello", &["123"]), ChannelKind::Group, BOT, "!"),
            None
        );
    }

    #[test]
    fn test_bare_mention_yields_empty() {
        let out = detect_trigger(&event("<@999>", &[BOT]), ChannelKind::Group, BOT, "!");
        assert_eq!(out.as_deref(), Some(""));
    }
}
