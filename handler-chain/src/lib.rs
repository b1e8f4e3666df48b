//! # Handler chain
//!
//! Runs a sequence of handlers for each update. For messages: every handler's `before` in order
//! (any `false` stops the chain), then `handle` until one returns Stop or Reply, then every
//! `after` in reverse order. For callback queries: `handle_callback` until one returns Stop or
//! Reply.
//!
//! A [`BotError::RecipientUnreachable`] from any handler ends the update quietly: it is logged
//! at warn and reported as Stop, so a user who blocked the bot never surfaces as a failure.

use gptbot_core::{BotError, CallbackQuery, Handler, HandlerResponse, Message, Result};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Ordered list of handlers shared by all updates.
#[derive(Clone, Default)]
pub struct HandlerChain {
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler (runs in order; first Stop/Reply ends handler phase).
    pub fn add_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs before, handle and after phases for one message. Returns first Stop or Reply, or Continue.
    #[instrument(skip(self, message), fields(user_id = message.user.id, chat_id = message.chat.id))]
    pub async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let result = self.run_message(message).await;
        swallow_unreachable(result, message.user.id)
    }

    /// Offers a pressed inline button to each handler until one claims it.
    #[instrument(skip(self, query), fields(user_id = query.user.id, data = %query.data))]
    pub async fn handle_callback(&self, query: &CallbackQuery) -> Result<HandlerResponse> {
        let result = self.run_callback(query).await;
        swallow_unreachable(result, query.user.id)
    }

    async fn run_message(&self, message: &Message) -> Result<HandlerResponse> {
        info!(message_id = %message.id, "step: handler_chain started");

        for handler in &self.handlers {
            if !handler.before(message).await? {
                info!(
                    handler = %std::any::type_name_of_val(handler.as_ref()),
                    "step: handler before returned false, chain stopped"
                );
                return Ok(HandlerResponse::Stop);
            }
        }

        let mut final_response = HandlerResponse::Continue;
        for handler in &self.handlers {
            let handler_name = std::any::type_name_of_val(handler.as_ref());
            let response = handler.handle(message).await?;
            debug!(handler = %handler_name, response = ?response, "Handler processed");
            if matches!(response, HandlerResponse::Stop | HandlerResponse::Reply(_)) {
                info!(handler = %handler_name, "step: handler chain stopped by handler");
                final_response = response;
                break;
            }
        }

        for handler in self.handlers.iter().rev() {
            handler.after(message, &final_response).await?;
        }

        info!(message_id = %message.id, "step: handler_chain finished");
        Ok(final_response)
    }

    async fn run_callback(&self, query: &CallbackQuery) -> Result<HandlerResponse> {
        for handler in &self.handlers {
            let response = handler.handle_callback(query).await?;
            if matches!(response, HandlerResponse::Stop | HandlerResponse::Reply(_)) {
                debug!(
                    handler = %std::any::type_name_of_val(handler.as_ref()),
                    "Callback handled"
                );
                return Ok(response);
            }
        }
        debug!("No handler claimed the callback");
        Ok(HandlerResponse::Continue)
    }
}

fn swallow_unreachable(result: Result<HandlerResponse>, user_id: i64) -> Result<HandlerResponse> {
    match result {
        Err(e @ BotError::RecipientUnreachable(_)) => {
            warn!(user_id, error = %e, "Recipient unreachable, update dropped");
            Ok(HandlerResponse::Stop)
        }
        other => other,
    }
}

// Unit/integration tests live in tests/handler_chain_test.rs
