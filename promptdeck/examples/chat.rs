//! Conversation walkthrough using the promptdeck meta crate.
//!
//! This demonstrates:
//! 1. A single-prompt conversation answered with plain text
//! 2. A continuous conversation whose answers are streamed
//! 3. A provider failure landing on the error channel
//! 4. An image conversation against a provider without that capability
//!
//! Run with `RUST_LOG`-style verbosity by tweaking the subscriber below.

use async_trait::async_trait;
use futures::StreamExt;
use promptdeck::prelude::*;
use std::sync::Arc;

/// Toy provider: echoes single prompts, streams a recap of the chat history,
/// and rejects prompts containing "forbidden".
#[derive(Debug)]
struct ParrotProvider;

#[async_trait]
impl PromptProvider for ParrotProvider {
    fn info(&self) -> Arc<ProviderInfo> {
        ProviderInfo::new("parrot", "Parrot")
    }

    async fn handle_single_prompt(
        &self,
        prompt: &str,
        payload: &HandlerPayload,
    ) -> Result<PromptResponse> {
        if prompt.contains("forbidden") {
            return Err(PromptError::coded(
                "content_policy",
                "the parrot refuses to repeat that",
            ));
        }

        let voice = payload.global_settings["voice"].as_str().unwrap_or("squawk");
        Ok(PromptResponse::text(format!("{voice}! {prompt}")))
    }

    async fn handle_continuous_prompt(
        &self,
        messages: &[PromptMessage],
        _payload: &HandlerPayload,
    ) -> Result<PromptResponse> {
        let turns: Vec<String> = messages
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .collect();

        let stream = async_stream::stream! {
            yield Ok::<_, PromptError>(format!("You said {} thing(s): ", turns.len()));
            for turn in turns {
                yield Ok(format!("[{turn}] "));
            }
        };

        Ok(PromptResponse::stream(Box::pin(stream)))
    }
}

fn print_transcript(messages: &InMemoryMessageStore, conversation_id: &str) {
    for message in messages.get_all(conversation_id) {
        println!(
            "  {:<9} {:<30} streaming={} {:?}",
            message.role.as_str(),
            message.id,
            message.is_streaming,
            message.content
        );
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let providers = Arc::new(InMemoryProviderRegistry::new());
    providers.register("parrot", LoggingLayer::new().layer(ParrotProvider));

    let settings = Arc::new(InMemorySettingsStore::new());
    settings.set("parrot", serde_json::json!({ "voice": "polly" }));

    let messages = Arc::new(InMemoryMessageStore::new());
    let streams = Arc::new(InMemoryStreamRegistry::new());
    let errors = Arc::new(ErrorSlot::new());

    let orchestrator = ConversationOrchestrator::builder(
        providers,
        messages.clone(),
        settings,
        streams.clone(),
        errors.clone(),
    )
    .dispatch_config(DispatchConfig::new().with_system_role("You are a parrot."))
    .finish();

    // Example 1: Single prompt, plain text answer
    println!("=== Example 1: Single Prompt ===");
    let single = Conversation::new("single-1", "parrot", ConversationType::Single);
    orchestrator.handle_prompt(&single, "hello").await;
    orchestrator.handle_prompt(&single, "hello again").await;
    print_transcript(&messages, &single.id);

    // Example 2: Continuous conversation with streamed answers
    println!("\n=== Example 2: Continuous Streaming ===");
    let chat = Conversation::new("chat-1", "parrot", ConversationType::Continuous)
        .with_name("Parrot small talk");
    println!("  conversation: {}", chat.name);
    for prompt in ["I like Rust", "and async streams"] {
        orchestrator.handle_prompt(&chat, prompt).await;

        if let Some(mut handle) = streams.take(&chat.id) {
            let mut content = String::new();
            while let Some(chunk) = handle.stream.next().await {
                content.push_str(&chunk?);
            }
            messages.update(&chat.id, &handle.message_id, |message| {
                message.content = content;
                message.is_streaming = false;
            });
        }
    }
    print_transcript(&messages, &chat.id);

    // Example 3: Provider failure
    println!("\n=== Example 3: Provider Failure ===");
    orchestrator
        .handle_prompt(&single, "say something forbidden")
        .await;
    print_transcript(&messages, &single.id);
    if let Some(error) = errors.take() {
        println!("  error channel: {} - {}", error.code, error.message);
    }

    // Example 4: Capability the provider does not offer
    println!("\n=== Example 4: Missing Capability ===");
    let image = Conversation::new("image-1", "parrot", ConversationType::Image);
    orchestrator.handle_prompt(&image, "a parrot in a hat").await;
    print_transcript(&messages, &image.id);
    println!("  error channel empty: {}", errors.current().is_none());

    println!("\n=== All Examples Completed ===");
    Ok(())
}
