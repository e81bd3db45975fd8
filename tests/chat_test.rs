//! Chat widget: opening message, exchanges, and input re-enabling.

mod common;

use std::{cell::RefCell, future::Future, rc::Rc};

use common::{MockTransport, RecordingSurface};
use futures::channel::oneshot;
use http::StatusCode;
use libcat::{
    api::{ApiClient, ApiRequest, ApiTransport, HttpResponse},
    chat::{Author, ChatState, ChatWidget},
    CatalogError,
};
use serde_json::json;
use test_log::test;

/// Holds the first `/api/chat/message` request until the gate opens.
#[derive(Clone)]
struct GatedTransport {
    inner: MockTransport,
    gate: Rc<RefCell<Option<oneshot::Receiver<()>>>>,
}

impl ApiTransport for GatedTransport {
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<HttpResponse, CatalogError>> {
        let gate = if request.route() == "/api/chat/message" {
            self.gate.borrow_mut().take()
        } else {
            None
        };
        let inner = self.inner.clone();
        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            inner.send(request).await
        }
    }
}

#[test(tokio::test)]
async fn test_init_enables_input() {
    let transport = MockTransport::new();
    transport.json("/api/chat/init", json!({"response": "Hello! Ask me about books."}));
    let widget = ChatWidget::new(transport.client(), RecordingSurface::default());

    widget.init().await.unwrap();

    assert_eq!(widget.state(), ChatState::Ready);
    assert!(widget.surface().input_is_enabled());
    let messages = widget.surface().messages.borrow();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].author, Author::Ai);
}

#[test(tokio::test)]
async fn test_failed_init_keeps_input_disabled() {
    let transport = MockTransport::new();
    transport.status("/api/chat/init", StatusCode::INTERNAL_SERVER_ERROR, json!({}));
    let widget = ChatWidget::new(transport.client(), RecordingSurface::default());

    assert!(widget.init().await.is_err());

    assert_eq!(widget.state(), ChatState::Idle);
    assert!(!widget.surface().input_is_enabled());
    assert!(widget.surface().messages.borrow()[0].is_error);
    assert!(widget.send("anyone there?").await.is_err());
    assert_eq!(transport.count("/api/chat/message"), 0);
}

#[test(tokio::test)]
async fn test_exchange_appends_user_then_reply() {
    let transport = MockTransport::new();
    transport
        .json("/api/chat/init", json!({"response": "Hi"}))
        .json("/api/chat/message", json!({"response": "Dune is available."}));
    let widget = ChatWidget::new(transport.client(), RecordingSurface::default());
    widget.init().await.unwrap();

    widget.send("Is Dune available?").await.unwrap();

    let messages = widget.surface().messages.borrow();
    let authors: Vec<_> = messages.iter().map(|m| m.author).collect();
    assert_eq!(authors, vec![Author::Ai, Author::User, Author::Ai]);
    assert_eq!(messages[2].text, "Dune is available.");
    assert_eq!(
        transport.requests()[1].path,
        "/api/chat/message?message=Is+Dune+available%3F"
    );
    assert_eq!(
        *widget.surface().input_enabled.borrow(),
        vec![false, true, false, true]
    );
    assert_eq!(widget.surface().input_clears.get(), 1);
}

#[test(tokio::test)]
async fn test_failed_send_reenables_input() {
    let transport = MockTransport::new();
    transport
        .json("/api/chat/init", json!({"response": "Hi"}))
        .offline("/api/chat/message");
    let widget = ChatWidget::new(transport.client(), RecordingSurface::default());
    widget.init().await.unwrap();

    assert!(widget.send("hello").await.is_err());

    assert_eq!(widget.state(), ChatState::Ready);
    assert!(widget.surface().input_is_enabled());
    let messages = widget.surface().messages.borrow();
    assert_eq!(messages.len(), 3);
    assert!(messages[2].is_error);
}

#[test(tokio::test)]
async fn test_blank_input_is_ignored() {
    let transport = MockTransport::new();
    transport.json("/api/chat/init", json!({"response": "Hi"}));
    let widget = ChatWidget::new(transport.client(), RecordingSurface::default());
    widget.init().await.unwrap();

    widget.send("   ").await.unwrap();

    assert_eq!(transport.count("/api/chat/message"), 0);
    assert_eq!(widget.surface().messages.borrow().len(), 1);
}

#[test(tokio::test)]
async fn test_send_before_init_keeps_typed_text() {
    let transport = MockTransport::new();
    let widget = ChatWidget::new(transport.client(), RecordingSurface::default());

    assert!(widget.send("Is Dune available?").await.is_err());

    assert_eq!(widget.surface().input_clears.get(), 0);
    assert!(widget.surface().messages.borrow().is_empty());
    assert!(transport.requests().is_empty());
}

#[test(tokio::test)]
async fn test_send_while_awaiting_reply_keeps_typed_text() {
    let inner = MockTransport::new();
    inner
        .json("/api/chat/init", json!({"response": "Hi"}))
        .json("/api/chat/message", json!({"response": "Dune is available."}));
    let (open, gate) = oneshot::channel();
    let transport = GatedTransport {
        inner: inner.clone(),
        gate: Rc::new(RefCell::new(Some(gate))),
    };
    let widget = ChatWidget::new(ApiClient::new(transport), RecordingSurface::default());
    widget.init().await.unwrap();

    let (first, second) = futures::join!(widget.send("Is Dune available?"), async {
        assert_eq!(widget.state(), ChatState::AwaitingReply);
        let early = widget.send("And Emma?").await;
        let _ = open.send(());
        early
    });

    assert!(first.is_ok());
    assert!(second.is_err());
    assert_eq!(widget.surface().input_clears.get(), 1);
    assert_eq!(inner.count("/api/chat/message"), 1);
    let authors: Vec<_> = widget
        .surface()
        .messages
        .borrow()
        .iter()
        .map(|m| m.author)
        .collect();
    assert_eq!(authors, vec![Author::Ai, Author::User, Author::Ai]);
    assert_eq!(widget.state(), ChatState::Ready);
}
