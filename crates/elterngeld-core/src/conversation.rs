//! Message store
//!
//! The conversation is the only owner of messages. Every mutation is
//! synchronous and visible to the next read, so layout code can measure right
//! after a commit without waiting for anything.

use crate::message::{Message, MessageId, Role};
use serde::Serialize;
use thiserror::Error;

/// Misuse of the message store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    #[error("conversation is empty")]
    Empty,

    #[error("last message is a {0:?} message, expected the assistant placeholder")]
    LastNotAssistant(Role),
}

/// Ordered log of turns; insertion order is display order
#[derive(Debug, Clone, Default, Serialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user message and an empty assistant placeholder as one step.
    ///
    /// Readers never observe the user message without its placeholder.
    pub fn append_pair(&mut self, user_text: impl Into<String>) -> (MessageId, MessageId) {
        let user = Message::user(user_text);
        let assistant = Message::assistant(String::new());
        let ids = (user.id.clone(), assistant.id.clone());

        self.messages.reserve(2);
        self.messages.extend([user, assistant]);

        tracing::debug!(user_id = %ids.0, assistant_id = %ids.1, "Appended message pair");
        ids
    }

    /// Replace the content of the last message, which must be an assistant message
    pub fn mutate_last(&mut self, content: impl Into<String>) -> Result<(), ConversationError> {
        let last = self.last_assistant_mut()?;
        last.content = content.into();
        Ok(())
    }

    /// Attach follow-up suggestions to the last assistant message
    pub fn set_last_suggestions(
        &mut self,
        suggestions: Vec<String>,
    ) -> Result<(), ConversationError> {
        let last = self.last_assistant_mut()?;
        last.suggestions = Some(suggestions);
        Ok(())
    }

    /// Remove and return the most recent message
    pub fn truncate_last(&mut self) -> Option<Message> {
        self.messages.pop()
    }

    /// Drop every message
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    /// Suggestions offered below the latest answer
    pub fn suggestions(&self) -> &[String] {
        self.messages
            .last()
            .filter(|m| m.is_assistant())
            .and_then(|m| m.suggestions.as_deref())
            .unwrap_or(&[])
    }

    fn last_assistant_mut(&mut self) -> Result<&mut Message, ConversationError> {
        let last = self.messages.last_mut().ok_or(ConversationError::Empty)?;
        if last.role != Role::Assistant {
            return Err(ConversationError::LastNotAssistant(last.role));
        }
        Ok(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_pair_is_user_then_empty_assistant() {
        let mut conversation = Conversation::new();
        let (user_id, assistant_id) = conversation.append_pair("hi");

        assert_eq!(conversation.len(), 2);
        let [user, assistant] = conversation.messages() else {
            panic!("expected exactly two messages");
        };
        assert_eq!(user.id, user_id);
        assert_eq!(user.role, Role::User);
        assert_eq!(user.content, "hi");
        assert_eq!(assistant.id, assistant_id);
        assert_eq!(assistant.role, Role::Assistant);
        assert_eq!(assistant.content, "");
        assert_ne!(user_id, assistant_id);
    }

    #[test]
    fn test_mutate_last_replaces_placeholder_content() {
        let mut conversation = Conversation::new();
        conversation.append_pair("hi");

        conversation.mutate_last("Hel").unwrap();
        conversation.mutate_last("Hello").unwrap();

        assert_eq!(conversation.last().unwrap().content, "Hello");
        assert_eq!(conversation.messages()[0].content, "hi");
    }

    #[test]
    fn test_mutate_last_rejects_user_message() {
        let mut conversation = Conversation::new();
        conversation.append_pair("hi");
        conversation.truncate_last();

        let err = conversation.mutate_last("oops").unwrap_err();
        assert_eq!(err, ConversationError::LastNotAssistant(Role::User));
        assert_eq!(conversation.last().unwrap().content, "hi");
    }

    #[test]
    fn test_mutate_last_on_empty_conversation() {
        let mut conversation = Conversation::new();
        assert_eq!(
            conversation.mutate_last("x").unwrap_err(),
            ConversationError::Empty
        );
    }

    #[test]
    fn test_suggestions_follow_last_assistant() {
        let mut conversation = Conversation::new();
        conversation.append_pair("Am I eligible?");
        assert!(conversation.suggestions().is_empty());

        conversation
            .set_last_suggestions(vec!["How much?".into(), "How long?".into()])
            .unwrap();
        assert_eq!(conversation.suggestions(), ["How much?", "How long?"]);

        conversation.append_pair("How much?");
        assert!(conversation.suggestions().is_empty());
    }

    #[test]
    fn test_clear_and_get() {
        let mut conversation = Conversation::new();
        let (user_id, _) = conversation.append_pair("hi");
        assert_eq!(conversation.get(&user_id).unwrap().content, "hi");

        conversation.clear();
        assert!(conversation.is_empty());
        assert!(conversation.get(&user_id).is_none());
    }
}
