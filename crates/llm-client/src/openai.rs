//! OpenAI-compatible chat completion provider built on async-openai.

use crate::chunk::RawChunk;
use crate::error::ProviderError;
use crate::options::{SharedHttpClient, TransportOptions};
use crate::provider::{ChatProvider, RawChunkStream};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, CreateChatCompletionStreamResponse,
    },
    Client,
};
use async_trait::async_trait;
use futures::StreamExt;
use prompt::{ChatMessage, MessageRole};
use std::sync::Arc;
use tracing::{info, instrument};

/// Masks an API key/token for safe logging: shows first 7 chars + "***" + last 4 chars.
/// If length <= 11, returns "***" to avoid leaking any part of the key.
pub fn mask_token(token: &str) -> String {
    let len = token.len();
    if len <= 11 || !token.is_ascii() {
        return "***".to_string();
    }
    format!("{}***{}", &token[..7], &token[len - 4..])
}

/// Streams chat completions from an OpenAI-compatible endpoint (`{base_url}/chat/completions`).
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    name: String,
    api_key: String,
    base_url: String,
    config: OpenAIConfig,
    http: Arc<SharedHttpClient>,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        name: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let api_key = api_key.into();
        let base_url = base_url.into();
        let config = OpenAIConfig::new()
            .with_api_key(api_key.clone())
            .with_api_base(base_url.clone());
        Self {
            name: name.into(),
            api_key,
            base_url,
            config,
            http: Arc::new(SharedHttpClient::default()),
        }
    }

    fn client(&self, options: &TransportOptions) -> Result<Client<OpenAIConfig>, ProviderError> {
        Ok(Client::with_config(self.config.clone()).with_http_client(self.http.get(options)?))
    }
}

/// Converts a single [`ChatMessage`] into OpenAI API message format.
fn chat_message_to_openai(
    msg: &ChatMessage,
) -> Result<ChatCompletionRequestMessage, async_openai::error::OpenAIError> {
    let content = msg.content.clone();
    let openai_msg: ChatCompletionRequestMessage = match msg.role {
        MessageRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()?
            .into(),
    };
    Ok(openai_msg)
}

/// Maps one streamed response to a [`RawChunk`]; responses without choices are unrecognized.
fn chunk_from_response(response: &CreateChatCompletionStreamResponse) -> RawChunk {
    match response.choices.first() {
        Some(choice) => RawChunk::Structured {
            content: choice.delta.content.clone().unwrap_or_default(),
        },
        None => RawChunk::Unrecognized(format!("response {} without choices", response.id)),
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, messages, options), fields(provider = %self.name))]
    async fn open_stream(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &TransportOptions,
    ) -> Result<RawChunkStream, ProviderError> {
        info!(
            model = %model,
            message_count = messages.len(),
            base_url = %self.base_url,
            api_key = %mask_token(&self.api_key),
            "OpenAI-compatible chat stream request"
        );

        let openai_messages = messages
            .iter()
            .map(chat_message_to_openai)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ProviderError::InvalidRequest(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(openai_messages)
            .build()
            .map_err(|e| ProviderError::InvalidRequest(e.to_string()))?;

        let stream = self
            .client(options)?
            .chat()
            .create_stream(request)
            .await
            .map_err(|e| ProviderError::transport(&self.name, e))?;

        let name = self.name.clone();
        Ok(stream
            .map(move |item| match item {
                Ok(response) => Ok(chunk_from_response(&response)),
                Err(async_openai::error::OpenAIError::JSONDeserialize(e)) => {
                    Err(ProviderError::Decode {
                        provider: name.clone(),
                        message: e.to_string(),
                    })
                }
                Err(e) => Err(ProviderError::transport(&name, e)),
            })
            .boxed())
    }
}
