//! Dispatcher runner: converts teloxide messages and callback queries to core types and hands
//! them to the [`HandlerChain`].

use anyhow::Result;
use gptbot_core::{ToCoreCallback, ToCoreMessage};
use handler_chain::HandlerChain;
use teloxide::prelude::*;
use tracing::{error, info, instrument};

use super::adapters::{TelegramCallbackWrapper, TelegramMessageWrapper};

/// Starts long polling and runs until Ctrl-C.
///
/// Each update is processed on its own task so a long streaming reply never blocks button
/// presses or other chats.
#[instrument(skip(bot, handler_chain))]
pub async fn run_dispatcher(bot: teloxide::Bot, handler_chain: HandlerChain) -> Result<()> {
    if let Ok(me) = bot.get_me().await {
        info!(username = ?me.user.username, "Bot identity resolved");
    }

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(on_message))
        .branch(Update::filter_callback_query().endpoint(on_callback_query));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![handler_chain])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Dispatcher stopped");
    Ok(())
}

async fn on_message(msg: teloxide::types::Message, chain: HandlerChain) -> ResponseResult<()> {
    let core_msg = TelegramMessageWrapper(&msg).to_core();
    if msg.text().is_none() {
        info!(
            user_id = core_msg.user.id,
            chat_id = core_msg.chat.id,
            "Received non-text message, ignored"
        );
        return Ok(());
    }
    info!(
        user_id = core_msg.user.id,
        chat_id = core_msg.chat.id,
        message_content = %core_msg.content,
        "Received message"
    );

    tokio::spawn(async move {
        if let Err(e) = chain.handle(&core_msg).await {
            error!(error = %e, user_id = core_msg.user.id, "Handler chain failed");
        }
    });
    Ok(())
}

async fn on_callback_query(
    query: teloxide::types::CallbackQuery,
    chain: HandlerChain,
) -> ResponseResult<()> {
    let core_query = TelegramCallbackWrapper(&query).to_core();
    info!(
        user_id = core_query.user.id,
        data = %core_query.data,
        "Received callback query"
    );

    tokio::spawn(async move {
        if let Err(e) = chain.handle_callback(&core_query).await {
            error!(error = %e, user_id = core_query.user.id, "Callback handling failed");
        }
    });
    Ok(())
}
