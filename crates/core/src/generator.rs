//! Slide generation through a schema-constrained completion call.
//!
//! [`SlideGenerator`] owns the prompt, the output schema and response
//! validation. The actual network round trip is a [`CompletionClient`]
//! collaborator.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::normalize::has_content;
use crate::types::{Deck, Slide};

/// Sampling temperature used for every generation request.
pub const GENERATION_TEMPERATURE: f32 = 0.7;

/// A single schema-constrained completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Full instruction prompt, source text included.
    pub prompt: String,

    /// JSON schema the response must follow.
    pub schema: Value,

    /// Sampling temperature.
    pub temperature: f32,
}

/// Generative text service collaborator.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Run one completion and return the raw response text.
    ///
    /// Network, authentication and service failures map to
    /// [`Error::Transport`].
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Build the instruction prompt around the user's text.
///
/// The text is embedded verbatim.
pub fn build_prompt(text: &str) -> String {
    format!(
        "Based on the following text, create a comprehensive and well-structured presentation.\n\
         The presentation should have a logical flow, with an introduction, main points, and a conclusion.\n\
         Each slide must have a clear title and bullet points summarizing the key information.\n\
         Ensure the content is broken down into digestible slides.\n\
         Generate at least 5 slides, but more if the content warrants it.\n\
         \n\
         Here is the source text:\n\
         ---\n\
         {text}\n\
         ---\n"
    )
}

/// Output schema: an array of `{ title: string, content: string[] }`.
pub fn slide_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": {
                    "type": "STRING",
                    "description": "A concise and engaging title for the slide."
                },
                "content": {
                    "type": "ARRAY",
                    "description": "An array of strings, where each string is a bullet point or a short paragraph for the slide body.",
                    "items": { "type": "STRING" }
                }
            },
            "required": ["title", "content"]
        }
    })
}

/// Parse a raw completion into a deck.
///
/// Anything that is not a JSON array of well-formed slides is a
/// [`Error::MalformedResponse`]; an empty array is [`Error::EmptyDeck`].
pub fn parse_deck(response: &str) -> Result<Deck> {
    let slides: Vec<Slide> = serde_json::from_str(response.trim())
        .map_err(|e| Error::MalformedResponse(e.to_string()))?;
    Deck::new(slides)
}

/// Turns source text into a slide deck.
///
/// Every call is a full round trip: no caching, no retries.
#[derive(Debug, Clone)]
pub struct SlideGenerator<C> {
    client: C,
}

impl<C: CompletionClient> SlideGenerator<C> {
    /// Create a generator backed by the given completion client.
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Access the underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Build the request that [`generate`](Self::generate) would send.
    pub fn request_for(&self, text: &str) -> CompletionRequest {
        CompletionRequest {
            prompt: build_prompt(text),
            schema: slide_schema(),
            temperature: GENERATION_TEMPERATURE,
        }
    }

    /// Generate a deck from source text.
    pub async fn generate(&self, text: &str) -> Result<Deck> {
        if !has_content(text) {
            return Err(Error::EmptyInput);
        }

        let request = self.request_for(text);
        log::debug!("Requesting slides for {} chars of source text", text.len());

        let response = self.client.complete(&request).await.map_err(|e| {
            log::error!("Error generating slides: {}", e);
            match e {
                Error::Transport(_) => e,
                other => Error::Transport(other.to_string()),
            }
        })?;

        let deck = parse_deck(&response).map_err(|e| {
            log::error!("Unusable slide response: {}", e);
            e
        })?;
        log::debug!("Generated {} slides", deck.slide_count());

        Ok(deck)
    }
}
