//! Assistant personalities offered by the front-ends.

use crate::error::ChatError;

/// Behaviour the assistant is asked to adopt through the system prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persona {
    Snarky,
    Polite,
    /// Single-word attitude typed by the user, e.g. `curious`.
    Custom(String),
}

impl Persona {
    /// Builds a custom persona, rejecting blank input.
    ///
    /// # Examples
    ///
    /// ```
    /// use chathub::persona::Persona;
    ///
    /// let persona = Persona::custom("  curious ").unwrap();
    /// assert_eq!(persona.system_prompt(), "You are a very curious assistant.");
    /// assert!(Persona::custom(" ").is_err());
    /// ```
    pub fn custom(behaviour: &str) -> Result<Self, ChatError> {
        let behaviour = behaviour.trim();
        if behaviour.is_empty() {
            return Err(ChatError::validation("Please enter a valid behavior."));
        }
        Ok(Persona::Custom(behaviour.to_string()))
    }

    /// Maps a terminal menu choice (`1`, `2`) to a fixed persona.
    ///
    /// Choice `3` needs a follow-up prompt and is handled by the caller.
    pub fn from_menu_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(Persona::Snarky),
            "2" => Some(Persona::Polite),
            _ => None,
        }
    }

    /// Maps a web selector value; `custom_text` is only consulted for `custom`.
    pub fn from_selector(selector: &str, custom_text: Option<&str>) -> Result<Self, ChatError> {
        match selector.trim().to_ascii_lowercase().as_str() {
            "snarky" => Ok(Persona::Snarky),
            "polite" => Ok(Persona::Polite),
            "custom" => Persona::custom(custom_text.unwrap_or_default()),
            other => Err(ChatError::validation(format!(
                "unknown personality: {other}"
            ))),
        }
    }

    pub fn system_prompt(&self) -> String {
        match self {
            Persona::Snarky => "You are a very snarky assistant.".to_string(),
            Persona::Polite => "You are a very polite assistant.".to_string(),
            Persona::Custom(behaviour) => format!("You are a very {behaviour} assistant."),
        }
    }
}
