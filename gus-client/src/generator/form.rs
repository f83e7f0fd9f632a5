//! Generator form state and the bindings derived from it

use crate::model::GenerationRequest;
use std::str::FromStr;
use thiserror::Error;

/// Writing style used for generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Persona {
    #[default]
    GusBaha,
    Professional,
    Casual,
    Storyteller,
    Academic,
    Custom,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown persona: {0}")]
pub struct UnknownPersona(pub String);

impl Persona {
    pub const ALL: [Persona; 6] = [
        Persona::GusBaha,
        Persona::Professional,
        Persona::Casual,
        Persona::Storyteller,
        Persona::Academic,
        Persona::Custom,
    ];

    /// Identifier sent to the server
    pub fn id(&self) -> &'static str {
        match self {
            Persona::GusBaha => "gus_baha",
            Persona::Professional => "professional",
            Persona::Casual => "casual",
            Persona::Storyteller => "storyteller",
            Persona::Academic => "academic",
            Persona::Custom => "custom",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Persona::GusBaha => {
                "Warm, humble and funny. Short stories with a punchline, never judgmental."
            }
            Persona::Professional => "Clear, structured and concise. Suited to business writing.",
            Persona::Casual => "Relaxed and conversational, like talking to a friend.",
            Persona::Storyteller => "Narrative-driven, with vivid examples and a clear arc.",
            Persona::Academic => "Precise and well-referenced, with a formal register.",
            Persona::Custom => "Write your own instructions for the model.",
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Persona::Custom)
    }
}

impl FromStr for Persona {
    type Err = UnknownPersona;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Persona::ALL
            .into_iter()
            .find(|p| p.id() == wanted)
            .ok_or_else(|| UnknownPersona(s.to_string()))
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// The generator form as the user has filled it in
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorForm {
    pub prompt: String,
    pub persona: Persona,
    pub custom_prompt: String,
    pub use_ragie: bool,
    /// Overrides the retrieval query; blank means "use the prompt"
    pub ragie_query: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GeneratorForm {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            persona: Persona::default(),
            custom_prompt: String::new(),
            use_ragie: true,
            ragie_query: String::new(),
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

/// Labels and visibility flags that mirror the form
#[derive(Debug, Clone, PartialEq)]
pub struct FormBindings {
    pub char_count: usize,
    pub char_count_label: String,
    pub persona_description: &'static str,
    pub show_custom_prompt: bool,
    pub show_query_override: bool,
    pub temperature_label: String,
    pub max_tokens_label: String,
}

impl GeneratorForm {
    /// The request body for `/api/generate`
    pub fn to_request(&self) -> GenerationRequest {
        let prompt = self.prompt.trim().to_string();
        let ragie_query = match self.ragie_query.trim() {
            "" => prompt.clone(),
            query => query.to_string(),
        };

        GenerationRequest {
            prompt,
            persona: self.persona.id().to_string(),
            custom_prompt: self.custom_prompt.clone(),
            use_ragie: self.use_ragie,
            ragie_query,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    pub fn bindings(&self) -> FormBindings {
        let char_count = self.prompt.chars().count();
        FormBindings {
            char_count,
            char_count_label: format!("{} characters", char_count),
            persona_description: self.persona.description(),
            show_custom_prompt: self.persona.is_custom(),
            show_query_override: self.use_ragie,
            temperature_label: format!("{:.1}", self.temperature),
            max_tokens_label: self.max_tokens.to_string(),
        }
    }
}
