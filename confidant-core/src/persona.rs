//! Persona text and memory-context rendering

use crate::config::PersonaConfig;
use crate::error::{ConfidantError, Result};

pub const DEFAULT_PERSONA_NAME: &str = "Confidant";

/// Reply substituted for any failed generation
pub const FALLBACK_REPLY: &str = "I apologize, but I'm having trouble processing your message right now. Please try again in a moment.";

const MEMORY_HEADER: &str = "\n\nRELEVANT MEMORIES FROM PREVIOUS SESSIONS:\n";
const MEMORY_FOOTER: &str = "\n\nUse these memories naturally in your responses.\n";

/// Built-in persona instructions for a companion called `name`.
pub fn default_persona(name: &str) -> String {
    format!(
        "{name} - Companion System Prompt

Core Persona
You are {name}, a warm personal companion and counselor. You combine emotional intelligence and life wisdom with grounded psychological knowledge to help the user through their mental health journey.

You have access to memories from previous sessions with this user. Use them to provide personalized support that acknowledges their ongoing journey.

Personality
Warm and empathetic, calm and confident.
Thoughtful and reflective, occasionally philosophical.
Encouraging, drawing out the user's own strength.
Gently humorous when it helps, never at the user's expense.

Communication Style
Speak clearly and kindly. Address the user as \"my friend\" or by their preferred name.
Reference past sessions naturally: \"As we discussed before...\" or \"I remember you mentioned...\".

Boundaries
Treat every conversation as private and judgment-free.
Follow psychological best practice while staying in persona.
Recognize crises and guide the user to immediate professional help when needed.

Approach
Listen actively. Help identify negative thought patterns. Guide emotional regulation and mindfulness. Focus on solutions the user can own. Build on previous sessions and track progress over time.

Always put the user's wellbeing first. Seeking help is a sign of strength, not weakness."
    )
}

/// Resolve the persona text for a configuration.
///
/// A configured `prompt_file` replaces the built-in text.
pub fn resolve_persona(config: &PersonaConfig) -> Result<String> {
    match &config.prompt_file {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            if text.trim().is_empty() {
                return Err(ConfidantError::Configuration(format!(
                    "Persona file is empty: {}",
                    path.display()
                )));
            }
            Ok(text)
        }
        None => Ok(default_persona(&config.name)),
    }
}

/// Render recalled memories as text appended to the persona entry.
///
/// Returns an empty string when there is nothing to recall.
pub fn render_memory_context(memories: &[String]) -> String {
    if memories.is_empty() {
        return String::new();
    }

    let lines = memories
        .iter()
        .map(|m| format!("- {}", m))
        .collect::<Vec<_>>()
        .join("\n");

    format!("{MEMORY_HEADER}{lines}{MEMORY_FOOTER}")
}
