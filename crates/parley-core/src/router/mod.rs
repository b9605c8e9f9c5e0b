//! Router - from inbound event to delivered reply
//!
//! One call to [`MessageRouter::handle`] covers a whole turn:
//! filtering, trigger detection, context assembly with memory, the engine
//! call, persistence and chunked delivery. Failures after the engine call
//! are logged and never undo the persisted turn.

mod split;
mod transport;
mod trigger;

pub use split::split_message;
pub use transport::Transport;
pub use trigger::{detect_trigger, ChannelKind, InboundEvent};

#[cfg(test)]
pub use transport::MockTransport;

use crate::engine::{ChatOptions, ChatOutcome, Engine};
use crate::session::SessionCache;
use parley_llm::Message;
use parley_memory::MemoryStore;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Default transport message size limit, in characters
pub const DEFAULT_REPLY_LIMIT: usize = 2000;

/// Router settings
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Activation prefix in group channels
    pub prefix: String,
    /// Base system prompt combined with rendered memory
    pub system_prompt: String,
    /// Maximum characters per outbound message
    pub reply_limit: usize,
    /// Sent when the engine returns an empty reply
    pub empty_placeholder: String,
    /// Prepended to the sanitized error when the engine fails
    pub error_notice: String,
    /// Generation options passed to every engine call
    pub chat_options: ChatOptions,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            prefix: "!".to_string(),
            system_prompt: String::new(),
            reply_limit: DEFAULT_REPLY_LIMIT,
            empty_placeholder: "(no response)".to_string(),
            error_notice: "An error occurred: ".to_string(),
            chat_options: ChatOptions::default(),
        }
    }
}

/// How a single inbound event was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Authored by the bot itself
    SelfMessage,
    /// Channel kind could not be resolved
    UnknownChannel,
    /// No DM, mention or prefix
    NotTriggered,
    /// Nothing left after stripping activation
    EmptyContent,
    /// Engine failed; the user got an error notice
    EngineFailed,
    /// Reply delivered in this many parts (some sends may have failed)
    Replied {
        /// Number of parts attempted
        parts: usize,
    },
}

/// Routes inbound events through sessions, memory and the engine
pub struct MessageRouter {
    config: RouterConfig,
    sessions: Arc<SessionCache>,
    memory: Arc<MemoryStore>,
    engine: Arc<dyn Engine>,
}

impl MessageRouter {
    /// Create a router
    pub fn new(
        config: RouterConfig,
        sessions: Arc<SessionCache>,
        memory: Arc<MemoryStore>,
        engine: Arc<dyn Engine>,
    ) -> Self {
        Self {
            config,
            sessions,
            memory,
            engine,
        }
    }

    /// Process one inbound event to completion
    #[instrument(
        skip(self, transport, event),
        fields(message_id = %event.message_id, user_id = %event.author_id)
    )]
    pub async fn handle(&self, transport: &dyn Transport, event: InboundEvent) -> Outcome {
        let bot_id = transport.bot_user_id();
        if event.author_id == bot_id {
            return Outcome::SelfMessage;
        }

        let kind = match transport.channel_kind(&event.channel_id).await {
            Ok(kind) => kind,
            Err(e) => {
                debug!(channel_id = %event.channel_id, error = %e, "Could not resolve channel");
                return Outcome::UnknownChannel;
            }
        };

        let Some(content) = detect_trigger(&event, kind, &bot_id, &self.config.prefix) else {
            return Outcome::NotTriggered;
        };
        if content.trim().is_empty() {
            return Outcome::EmptyContent;
        }

        if let Err(e) = transport.send_typing(&event.channel_id).await {
            debug!(error = %e, "Typing indicator failed");
        }

        let user_id = event.author_id.as_str();
        let session = self.sessions.get(user_id).await;
        let mut history = session.lock().await;
        history.push(Message::user(content));

        let context = self.assemble_context(user_id, &history).await;
        debug!(messages = context.len(), ?kind, "Calling engine");

        let ChatOutcome {
            reply,
            messages,
            usage,
        } = match self
            .engine
            .chat(user_id, context, &self.config.chat_options)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Engine call failed");
                let notice = format!("{}{}", self.config.error_notice, e.user_message());
                if let Err(e) = transport.send_message(&event.channel_id, &notice).await {
                    warn!(error = %e, "Failed to send error notice");
                }
                return Outcome::EngineFailed;
            }
        };

        let mut updated = messages;
        if updated.first().is_some_and(Message::is_system) {
            updated.remove(0);
        }
        *history = updated;

        if let Err(e) = self.sessions.save(user_id, &history).await {
            warn!(error = %e, "Failed to save session");
        }

        let reply = if reply.is_empty() {
            self.config.empty_placeholder.clone()
        } else {
            reply
        };

        let parts = split_message(&reply, self.config.reply_limit);
        for part in &parts {
            if let Err(e) = transport
                .send_reply(&event.channel_id, &event.message_id, part)
                .await
            {
                warn!(error = %e, "Failed to send reply part");
            }
        }

        info!(
            parts = parts.len(),
            total_tokens = usage.total_tokens,
            "Reply delivered"
        );
        Outcome::Replied { parts: parts.len() }
    }

    async fn assemble_context(&self, user_id: &str, history: &[Message]) -> Vec<Message> {
        let mut context = Vec::with_capacity(history.len() + 1);
        match self.memory.render(user_id).await {
            Ok(block) if !block.is_empty() => {
                context.push(Message::system(format!(
                    "{}{}",
                    self.config.system_prompt, block
                )));
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Failed to render memory, continuing without it"),
        }
        context.extend(history.iter().cloned());
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MockEngine;
    use crate::error::{Error, Result};
    use crate::session::{FileSessionStore, SessionStore};
    use parley_llm::MessageRole;
    use std::sync::Mutex as StdMutex;
    use tempfile::TempDir;

    const BOT: &str = "999";
    const USER: &str = "42";

    #[derive(Debug, Clone, PartialEq)]
    enum Sent {
        Typing,
        Message(String),
        Reply { to: String, text: String },
    }

    struct RecordingTransport {
        kind: ChannelKind,
        fail_replies: bool,
        sent: StdMutex<Vec<Sent>>,
    }

    impl RecordingTransport {
        fn new(kind: ChannelKind) -> Self {
            Self {
                kind,
                fail_replies: false,
                sent: StdMutex::new(Vec::new()),
            }
        }

        fn sent(&self) -> Vec<Sent> {
            self.sent.lock().unwrap().clone()
        }

        fn replies(&self) -> Vec<String> {
            self.sent()
                .into_iter()
                .filter_map(|s| match s {
                    Sent::Reply { text, .. } => Some(text),
                    _ => None,
                })
                .collect()
        }
    }

    #[async_trait::async_trait]
    impl Transport for RecordingTransport {
        fn bot_user_id(&self) -> String {
            BOT.to_string()
        }

        async fn channel_kind(&self, _channel_id: &str) -> Result<ChannelKind> {
            Ok(self.kind)
        }

        async fn send_typing(&self, _channel_id: &str) -> Result<()> {
            self.sent.lock().unwrap().push(Sent::Typing);
            Ok(())
        }

        async fn send_message(&self, _channel_id: &str, text: &str) -> Result<()> {
            self.sent.lock().unwrap().push(Sent::Message(text.to_string()));
            Ok(())
        }

        async fn send_reply(&self, _channel_id: &str, reply_to: &str, text: &str) -> Result<()> {
            self.sent.lock().unwrap().push(Sent::Reply {
                to: reply_to.to_string(),
                text: text.to_string(),
            });
            if self.fail_replies {
                return Err(Error::Transport("gateway closed".to_string()));
            }
            Ok(())
        }
    }

    struct Harness {
        dir: TempDir,
        memory: Arc<MemoryStore>,
        sessions: Arc<SessionCache>,
        store: Arc<FileSessionStore>,
    }

    impl Harness {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let store = Arc::new(FileSessionStore::new(dir.path()));
            Self {
                memory: Arc::new(MemoryStore::new(dir.path())),
                sessions: Arc::new(SessionCache::new(store.clone())),
                store,
                dir,
            }
        }

        fn router(&self, engine: MockEngine) -> MessageRouter {
            let config = RouterConfig {
                system_prompt: "You are Parley.".to_string(),
                ..Default::default()
            };
            MessageRouter::new(
                config,
                self.sessions.clone(),
                self.memory.clone(),
                Arc::new(engine),
            )
        }
    }

    fn event(content: &str, mentions: &[&str]) -> InboundEvent {
        InboundEvent {
            message_id: "m1".to_string(),
            author_id: USER.to_string(),
            channel_id: "c1".to_string(),
            content: content.to_string(),
            mentions: mentions.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Engine that answers `reply` and records the context it was given
    fn replying_engine(reply: &str, seen: Arc<StdMutex<Vec<Vec<Message>>>>) -> MockEngine {
        let reply = reply.to_string();
        let mut engine = MockEngine::new();
        engine
            .expect_chat()
            .returning(move |_user_id, mut messages, _options| {
                seen.lock().unwrap().push(messages.clone());
                messages.push(Message::assistant(reply.clone()));
                Ok(ChatOutcome {
                    reply: reply.clone(),
                    messages,
                    usage: Default::default(),
                })
            });
        engine
    }

    fn silent_engine() -> MockEngine {
        let mut engine = MockEngine::new();
        engine.expect_chat().never();
        engine
    }

    #[tokio::test]
    async fn test_direct_message_round_trip() {
        let h = Harness::new();
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let router = h.router(replying_engine("hi!", seen.clone()));
        let transport = RecordingTransport::new(ChannelKind::Direct);

        let outcome = router.handle(&transport, event("hello", &[])).await;

        assert_eq!(outcome, Outcome::Replied { parts: 1 });
        assert_eq!(
            transport.sent(),
            vec![
                Sent::Typing,
                Sent::Reply {
                    to: "m1".to_string(),
                    text: "hi!".to_string()
                }
            ]
        );
        assert_eq!(seen.lock().unwrap()[0], vec![Message::user("hello")]);
        assert_eq!(
            h.store.load(USER).await.unwrap(),
            vec![Message::user("hello"), Message::assistant("hi!")]
        );
    }

    #[tokio::test]
    async fn test_self_message_ignored() {
        let h = Harness::new();
        let router = h.router(silent_engine());
        let mut transport = MockTransport::new();
        transport.expect_bot_user_id().return_const(USER.to_string());
        transport.expect_channel_kind().never();
        transport.expect_send_typing().never();

        let outcome = router.handle(&transport, event("hello", &[])).await;
        assert_eq!(outcome, Outcome::SelfMessage);
    }

    #[tokio::test]
    async fn test_unknown_channel_ignored() {
        let h = Harness::new();
        let router = h.router(silent_engine());
        let mut transport = MockTransport::new();
        transport.expect_bot_user_id().return_const(BOT.to_string());
        transport
            .expect_channel_kind()
            .returning(|_| Err(Error::Transport("unknown channel".to_string())));
        transport.expect_send_typing().never();

        let outcome = router.handle(&transport, event("hello", &[])).await;
        assert_eq!(outcome, Outcome::UnknownChannel);
    }

    #[tokio::test]
    async fn test_group_without_trigger_ignored() {
        let h = Harness::new();
        let router = h.router(silent_engine());
        let transport = RecordingTransport::new(ChannelKind::Group);

        let outcome = router.handle(&transport, event("hello", &[])).await;
        assert_eq!(outcome, Outcome::NotTriggered);
        assert!(transport.sent().is_empty());
        assert!(!h.sessions.contains(USER).await);
    }

    #[tokio::test]
    async fn test_group_prefix_strips_activation() {
        let h = Harness::new();
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let router = h.router(replying_engine("ok", seen.clone()));
        let transport = RecordingTransport::new(ChannelKind::Group);

        router.handle(&transport, event("!hello", &[])).await;
        assert_eq!(seen.lock().unwrap()[0], vec![Message::user("hello")]);
    }

    #[tokio::test]
    async fn test_group_mention_strips_activation() {
        let h = Harness::new();
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let router = h.router(replying_engine("ok", seen.clone()));
        let transport = RecordingTransport::new(ChannelKind::Group);

        router.handle(&transport, event("<@999> hello", &[BOT])).await;
        assert_eq!(seen.lock().unwrap()[0], vec![Message::user("hello")]);
    }

    #[tokio::test]
    async fn test_empty_after_strip_ignored() {
        let h = Harness::new();
        let router = h.router(silent_engine());
        let transport = RecordingTransport::new(ChannelKind::Group);

        let outcome = router.handle(&transport, event("!   ", &[])).await;
        assert_eq!(outcome, Outcome::EmptyContent);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_whitespace_only_direct_message_ignored() {
        let h = Harness::new();
        let router = h.router(silent_engine());
        let transport = RecordingTransport::new(ChannelKind::Direct);

        let outcome = router.handle(&transport, event(" \n\t ", &[])).await;
        assert_eq!(outcome, Outcome::EmptyContent);
        assert!(transport.sent().is_empty());
        assert!(h.store.load(USER).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_memory_prepended_but_not_persisted() {
        let h = Harness::new();
        h.memory.set(USER, "favorite_color", "blue").await.unwrap();
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let router = h.router(replying_engine("blue it is", seen.clone()));
        let transport = RecordingTransport::new(ChannelKind::Direct);

        router.handle(&transport, event("what color?", &[])).await;

        let context = seen.lock().unwrap()[0].clone();
        assert_eq!(context.len(), 2);
        assert_eq!(context[0].role, MessageRole::System);
        assert!(context[0].content.starts_with("You are Parley."));
        assert!(context[0].content.contains("favorite_color: blue"));

        let persisted = h.store.load(USER).await.unwrap();
        assert!(persisted.iter().all(|m| !m.is_system()));
        assert_eq!(persisted.len(), 2);

        let resident = h.sessions.get(USER).await;
        assert!(resident.lock().await.iter().all(|m| !m.is_system()));
    }

    #[tokio::test]
    async fn test_unreadable_memory_does_not_block_turn() {
        let h = Harness::new();
        std::fs::create_dir_all(h.memory.dir()).unwrap();
        std::fs::write(h.memory.dir().join("42.json"), "not json").unwrap();
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let router = h.router(replying_engine("still here", seen.clone()));
        let transport = RecordingTransport::new(ChannelKind::Direct);

        let outcome = router.handle(&transport, event("hello", &[])).await;
        assert_eq!(outcome, Outcome::Replied { parts: 1 });
        assert_eq!(seen.lock().unwrap()[0], vec![Message::user("hello")]);
    }

    #[tokio::test]
    async fn test_engine_failure_sends_notice_and_skips_save() {
        let h = Harness::new();
        let mut engine = MockEngine::new();
        engine
            .expect_chat()
            .times(1)
            .returning(|_, _, _| Err(Error::Llm(parley_llm::Error::RateLimit)));
        let router = h.router(engine);
        let transport = RecordingTransport::new(ChannelKind::Direct);

        let outcome = router.handle(&transport, event("hello", &[])).await;

        assert_eq!(outcome, Outcome::EngineFailed);
        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        match &sent[1] {
            Sent::Message(text) => {
                assert!(text.starts_with("An error occurred: "));
                assert!(text.contains("rate limit"));
            }
            other => panic!("expected error notice, got {other:?}"),
        }

        // The user message stays resident but never reaches disk
        let resident = h.sessions.get(USER).await;
        assert_eq!(*resident.lock().await, vec![Message::user("hello")]);
        assert!(!h.store.path_for(USER).exists());
    }

    #[tokio::test]
    async fn test_empty_reply_placeholder() {
        let h = Harness::new();
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let router = h.router(replying_engine("", seen));
        let transport = RecordingTransport::new(ChannelKind::Direct);

        router.handle(&transport, event("hello", &[])).await;
        assert_eq!(transport.replies(), vec!["(no response)".to_string()]);
    }

    #[tokio::test]
    async fn test_long_reply_split() {
        let h = Harness::new();
        let long = format!("{}\n{}", "a".repeat(1500), "b".repeat(1500));
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let router = h.router(replying_engine(&long, seen));
        let transport = RecordingTransport::new(ChannelKind::Direct);

        let outcome = router.handle(&transport, event("essay please", &[])).await;

        assert_eq!(outcome, Outcome::Replied { parts: 2 });
        let replies = transport.replies();
        assert_eq!(replies[0].chars().count(), 1501);
        assert_eq!(replies.concat(), long);
    }

    #[tokio::test]
    async fn test_send_failure_keeps_persisted_turn() {
        let h = Harness::new();
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let router = h.router(replying_engine("hi", seen));
        let mut transport = RecordingTransport::new(ChannelKind::Direct);
        transport.fail_replies = true;

        let outcome = router.handle(&transport, event("hello", &[])).await;
        assert_eq!(outcome, Outcome::Replied { parts: 1 });
        assert_eq!(h.store.load(USER).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_save_failure_still_replies() {
        let h = Harness::new();
        // A file where the sessions directory should be
        std::fs::write(h.dir.path().join(crate::session::SESSIONS_DIR), "").unwrap();
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let router = h.router(replying_engine("hi", seen));
        let transport = RecordingTransport::new(ChannelKind::Direct);

        let outcome = router.handle(&transport, event("hello", &[])).await;
        assert_eq!(outcome, Outcome::Replied { parts: 1 });
        assert_eq!(transport.replies(), vec!["hi".to_string()]);
    }

    #[tokio::test]
    async fn test_history_accumulates_across_turns() {
        let h = Harness::new();
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let router = h.router(replying_engine("ok", seen.clone()));
        let transport = RecordingTransport::new(ChannelKind::Direct);

        router.handle(&transport, event("one", &[])).await;
        router.handle(&transport, event("two", &[])).await;

        let second = seen.lock().unwrap()[1].clone();
        assert_eq!(
            second,
            vec![
                Message::user("one"),
                Message::assistant("ok"),
                Message::user("two")
            ]
        );
    }
}
