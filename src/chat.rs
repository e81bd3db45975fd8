//! Chat widget: an opening message, then one reply per user message.

use std::cell::Cell;

use crate::{
    api::{ApiClient, ApiTransport},
    error::CatalogError,
    html::{escape, markdown_to_html},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    Ai,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub author: Author,
    /// Markdown source.
    pub text: String,
    /// Set for locally generated failure notices.
    pub is_error: bool,
}

impl ChatMessage {
    pub fn ai(text: impl Into<String>) -> Self {
        ChatMessage {
            author: Author::Ai,
            text: text.into(),
            is_error: false,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        ChatMessage {
            author: Author::User,
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        ChatMessage {
            author: Author::Ai,
            text: text.into(),
            is_error: true,
        }
    }

    pub fn to_html(&self) -> String {
        let (outer, inner) = match self.author {
            Author::Ai => ("from-ai", "ai"),
            Author::User => ("from-user", "user"),
        };
        let class = if self.is_error {
            format!("message {inner} error")
        } else {
            format!("message {inner}")
        };
        let mut body = String::new();
        if markdown_to_html(&self.text, &mut body).is_err() {
            body = escape(&self.text);
        }
        format!("<div class=\"{outer}\"><div class=\"{class}\">{body}</div></div>")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChatState {
    /// Opening message not received yet; input disabled.
    #[default]
    Idle,
    /// Input enabled.
    Ready,
    /// A message is in flight; input disabled.
    AwaitingReply,
}

pub trait ChatSurface {
    fn append_message(&self, message: &ChatMessage);
    fn set_input_enabled(&self, enabled: bool);
    /// Empties the input box once a message has been accepted for sending.
    fn clear_input(&self) {}
    fn scroll_to_bottom(&self) {}
}

pub struct ChatWidget<T, S> {
    client: ApiClient<T>,
    surface: S,
    state: Cell<ChatState>,
}

fn failure_text(err: &CatalogError, context: &str) -> String {
    match err {
        CatalogError::Status(500) => format!("Server error while {context}."),
        CatalogError::Server { error, .. } => error.clone(),
        _ => "Unexpected error occurred.".to_string(),
    }
}

impl<T: ApiTransport, S: ChatSurface> ChatWidget<T, S> {
    pub fn new(client: ApiClient<T>, surface: S) -> Self {
        ChatWidget {
            client,
            surface,
            state: Cell::new(ChatState::Idle),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn state(&self) -> ChatState {
        self.state.get()
    }

    fn set_state(&self, state: ChatState) {
        self.state.set(state);
        self.surface.set_input_enabled(state == ChatState::Ready);
    }

    /// Fetches the opening message and enables input. On failure the input stays disabled.
    pub async fn init(&self) -> Result<(), CatalogError> {
        self.set_state(ChatState::Idle);
        match self.client.chat_init().await {
            Ok(reply) => {
                tracing::debug!("Received opening message");
                self.surface.append_message(&ChatMessage::ai(reply.response));
                self.set_state(ChatState::Ready);
                Ok(())
            }
            Err(err) => {
                tracing::error!("Error initializing chat: {err}");
                self.surface.append_message(&ChatMessage::error(failure_text(
                    &err,
                    "initializing chat",
                )));
                Err(err)
            }
        }
    }

    /// Sends one message. The user's text is shown before the request goes out, and input is
    /// re-enabled when the exchange ends, whether or not a reply arrived.
    ///
    /// A rejected or blank message leaves the input box untouched.
    pub async fn send(&self, input: &str) -> Result<(), CatalogError> {
        if self.state.get() != ChatState::Ready {
            return Err(CatalogError::Command(
                "chat input is disabled until the current exchange completes".to_string(),
            ));
        }
        if input.trim().is_empty() {
            return Ok(());
        }

        self.surface.clear_input();
        self.surface.append_message(&ChatMessage::user(input));
        self.surface.scroll_to_bottom();
        self.set_state(ChatState::AwaitingReply);

        let result = self.client.chat_message(input).await;
        let outcome = match result {
            Ok(reply) => {
                self.surface.append_message(&ChatMessage::ai(reply.response));
                Ok(())
            }
            Err(err) => {
                tracing::error!("Error sending chat message: {err}");
                self.surface.append_message(&ChatMessage::error(failure_text(
                    &err,
                    "sending the message",
                )));
                Err(err)
            }
        };
        self.surface.scroll_to_bottom();
        self.set_state(ChatState::Ready);
        outcome
    }
}
