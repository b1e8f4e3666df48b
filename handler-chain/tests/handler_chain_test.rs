//! Integration tests for [`handler_chain::HandlerChain`].
//!
//! Covers: handler before/after order, handler before stopping the chain, Reply stopping the chain
//! and being passed to handler after, multiple handlers executed in order (before first→last,
//! after last→first), callback dispatch, and recipient-unreachable errors being swallowed.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use gptbot_core::{
    BotError, CallbackQuery, Chat, Handler, HandlerResponse, Message, User,
};
use handler_chain::HandlerChain;

fn create_test_message(content: &str) -> Message {
    Message {
        id: "test_message_id".to_string(),
        content: content.to_string(),
        user: User {
            id: 123,
            username: Some("test_user".to_string()),
            first_name: Some("Test".to_string()),
            last_name: None,
        },
        chat: Chat {
            id: 456,
            chat_type: "private".to_string(),
        },
    }
}

/// **Test: Handler before and after run; handle runs once.**
///
/// **Setup:** One handler (counts before/after), one handler (counts handle).
/// **Action:** `chain.handle(&message)`.
/// **Expected:** before_count=1, handle_count=1, after_count=1; response is Continue.
#[tokio::test]
async fn test_handler_chain_with_handler() {
    let before_count = Arc::new(AtomicUsize::new(0));
    let after_count = Arc::new(AtomicUsize::new(0));
    let handle_count = Arc::new(AtomicUsize::new(0));

    let before_after_handler = Arc::new(TestBeforeAfterHandler::new(before_count.clone(), after_count.clone()));
    let handle_only = Arc::new(TestHandler::new(handle_count.clone()));

    let chain = HandlerChain::new()
        .add_handler(before_after_handler)
        .add_handler(handle_only);

    let message = create_test_message("test");
    chain.handle(&message).await.unwrap();

    assert_eq!(before_count.load(Ordering::SeqCst), 1);
    assert_eq!(handle_count.load(Ordering::SeqCst), 1);
    assert_eq!(after_count.load(Ordering::SeqCst), 1);
}

/// **Test: Handler before returns false stops the chain; handle is not run.**
///
/// **Setup:** One blocking handler (before returns false), one handler.
/// **Action:** `chain.handle(&message)`.
/// **Expected:** result is Stop; handle_count=0.
#[tokio::test]
async fn test_handler_stops_chain() {
    struct BlockingHandler;

    #[async_trait::async_trait]
    impl Handler for BlockingHandler {
        async fn before(&self, _message: &Message) -> gptbot_core::Result<bool> {
            Ok(false)
        }
    }

    let handle_count = Arc::new(AtomicUsize::new(0));
    let handler = Arc::new(TestHandler::new(handle_count.clone()));

    let chain = HandlerChain::new()
        .add_handler(Arc::new(BlockingHandler))
        .add_handler(handler);

    let message = create_test_message("test");
    let result = chain.handle(&message).await.unwrap();

    assert_eq!(result, HandlerResponse::Stop);
    assert_eq!(handle_count.load(Ordering::SeqCst), 0);
}

/// **Test: Handler returns Reply; chain stops and Reply is passed to handler after.**
///
/// **Setup:** One handler that in after() asserts Reply content; one handler that returns Reply("AI reply.").
/// **Action:** `chain.handle(&message)`.
/// **Expected:** result is Reply("AI reply."); after_count=1 and handler sees the reply text.
#[tokio::test]
async fn test_handler_reply_stops_chain_and_passes_to_after() {
    struct ReplyHandler;

    #[async_trait::async_trait]
    impl Handler for ReplyHandler {
        async fn handle(&self, _message: &Message) -> gptbot_core::Result<HandlerResponse> {
            Ok(HandlerResponse::Reply("AI reply.".to_string()))
        }
    }

    let after_count = Arc::new(AtomicUsize::new(0));

    struct CaptureResponseHandler {
        after_count: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Handler for CaptureResponseHandler {
        async fn before(&self, _message: &Message) -> gptbot_core::Result<bool> {
            Ok(true)
        }

        async fn after(&self, _message: &Message, response: &HandlerResponse) -> gptbot_core::Result<()> {
            self.after_count.fetch_add(1, Ordering::SeqCst);
            if let HandlerResponse::Reply(text) = response {
                assert_eq!(text, "AI reply.");
            }
            Ok(())
        }
    }

    let chain = HandlerChain::new()
        .add_handler(Arc::new(CaptureResponseHandler {
            after_count: after_count.clone(),
        }))
        .add_handler(Arc::new(ReplyHandler));

    let message = create_test_message("test");
    let result = chain.handle(&message).await.unwrap();

    assert_eq!(result, HandlerResponse::Reply("AI reply.".to_string()));
    assert_eq!(after_count.load(Ordering::SeqCst), 1);
}

/// **Test: Multiple handlers run before in order (first, second), after in reverse (second, first).**
///
/// **Setup:** Two handlers that push "before_NAME" and "after_NAME" to a shared vec.
/// **Action:** `chain.handle(&message)` (handle phase returns Continue).
/// **Expected:** Order is before_first, before_second, after_second, after_first.
#[tokio::test]
async fn test_multiple_handlers_executed_in_order() {
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));

    struct OrderHandler {
        name: String,
        order: Arc<std::sync::Mutex<Vec<String>>>,
    }

    #[async_trait::async_trait]
    impl Handler for OrderHandler {
        async fn before(&self, _message: &Message) -> gptbot_core::Result<bool> {
            self.order.lock().unwrap().push(format!("before_{}", self.name));
            Ok(true)
        }

        async fn after(&self, _message: &Message, _response: &HandlerResponse) -> gptbot_core::Result<()> {
            self.order.lock().unwrap().push(format!("after_{}", self.name));
            Ok(())
        }
    }

    let chain = HandlerChain::new()
        .add_handler(Arc::new(OrderHandler {
            name: "first".to_string(),
            order: order.clone(),
        }))
        .add_handler(Arc::new(OrderHandler {
            name: "second".to_string(),
            order: order.clone(),
        }));

    let message = create_test_message("test");
    chain.handle(&message).await.unwrap();

    let executed = order.lock().unwrap();
    assert_eq!(
        *executed,
        vec![
            "before_first",
            "before_second",
            "after_second",
            "after_first"
        ]
    );
}

/// **Test: A recipient-unreachable error ends the update as Stop instead of failing.**
///
/// **Setup:** One handler whose handle returns RecipientUnreachable.
/// **Action:** `chain.handle(&message)`.
/// **Expected:** Ok(Stop); other errors still propagate.
#[tokio::test]
async fn test_recipient_unreachable_is_swallowed() {
    struct BlockedHandler;

    #[async_trait::async_trait]
    impl Handler for BlockedHandler {
        async fn handle(&self, message: &Message) -> gptbot_core::Result<HandlerResponse> {
            if message.content == "blocked" {
                Err(BotError::RecipientUnreachable("bot was blocked by the user".to_string()))
            } else {
                Err(BotError::Bot("network down".to_string()))
            }
        }
    }

    let chain = HandlerChain::new().add_handler(Arc::new(BlockedHandler));

    let result = chain.handle(&create_test_message("blocked")).await.unwrap();
    assert_eq!(result, HandlerResponse::Stop);

    let err = chain.handle(&create_test_message("other")).await.unwrap_err();
    assert!(matches!(err, BotError::Bot(_)));
}

/// **Test: Callbacks go to handlers in order until one claims them.**
///
/// **Setup:** A handler ignoring callbacks, then one claiming `model_` callbacks.
/// **Action:** `chain.handle_callback(&query)` for a matching and a non-matching query.
/// **Expected:** Stop for the matching one, Continue otherwise.
#[tokio::test]
async fn test_callback_dispatch() {
    struct ModelCallbackHandler {
        seen: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Handler for ModelCallbackHandler {
        async fn handle_callback(
            &self,
            query: &CallbackQuery,
        ) -> gptbot_core::Result<HandlerResponse> {
            self.seen.fetch_add(1, Ordering::SeqCst);
            if query.data.starts_with("model_") {
                Ok(HandlerResponse::Stop)
            } else {
                Ok(HandlerResponse::Continue)
            }
        }
    }

    let seen = Arc::new(AtomicUsize::new(0));
    let chain = HandlerChain::new()
        .add_handler(Arc::new(TestHandler::new(Arc::new(AtomicUsize::new(0)))))
        .add_handler(Arc::new(ModelCallbackHandler { seen: seen.clone() }));

    let query = |data: &str| CallbackQuery {
        id: "cb1".to_string(),
        user: create_test_message("x").user,
        chat: None,
        message_id: None,
        data: data.to_string(),
    };

    assert_eq!(
        chain.handle_callback(&query("model_flux")).await.unwrap(),
        HandlerResponse::Stop
    );
    assert_eq!(
        chain.handle_callback(&query("unknown")).await.unwrap(),
        HandlerResponse::Continue
    );
    assert_eq!(seen.load(Ordering::SeqCst), 2);
}

// --- Helpers used by tests ---

struct TestBeforeAfterHandler {
    before_count: Arc<AtomicUsize>,
    after_count: Arc<AtomicUsize>,
}

impl TestBeforeAfterHandler {
    fn new(before_count: Arc<AtomicUsize>, after_count: Arc<AtomicUsize>) -> Self {
        Self { before_count, after_count }
    }
}

#[async_trait::async_trait]
impl Handler for TestBeforeAfterHandler {
    async fn before(&self, _message: &Message) -> gptbot_core::Result<bool> {
        self.before_count.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn after(&self, _message: &Message, _response: &HandlerResponse) -> gptbot_core::Result<()> {
        self.after_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct TestHandler {
    handle_count: Arc<AtomicUsize>,
}

impl TestHandler {
    fn new(handle_count: Arc<AtomicUsize>) -> Self {
        Self { handle_count }
    }
}

#[async_trait::async_trait]
impl Handler for TestHandler {
    async fn handle(&self, _message: &Message) -> gptbot_core::Result<HandlerResponse> {
        self.handle_count.fetch_add(1, Ordering::SeqCst);
        Ok(HandlerResponse::Continue)
    }
}
