//! Terminal front-end: model menu, personality menu, then a chat loop.
//!
//! Generic over the reader and writer so the whole dialogue can be driven from
//! memory in tests.

use std::io::{self, BufRead, Write};

use tracing::error;

use crate::config::{ClientSettings, KeyLookup, ModelConfig, ModelRegistry, env_key_lookup};
use crate::error::ChatError;
use crate::http::DynHttpTransport;
use crate::persona::Persona;
use crate::session::ConversationSession;

const CHAT_QUIT_KEYWORDS: [&str; 2] = ["quit", "exit"];

/// Interactive chat over a line-oriented reader and writer.
pub struct Repl<'a, R, W> {
    input: R,
    output: W,
    registry: &'a ModelRegistry,
    transport: DynHttpTransport,
    settings: ClientSettings,
    key_lookup: KeyLookup,
}

impl<'a, R: BufRead, W: Write> Repl<'a, R, W> {
    pub fn new(
        input: R,
        output: W,
        registry: &'a ModelRegistry,
        transport: DynHttpTransport,
        settings: ClientSettings,
    ) -> Self {
        Self {
            input,
            output,
            registry,
            transport,
            settings,
            key_lookup: env_key_lookup(),
        }
    }

    /// Replaces where API keys come from; the process environment by default.
    pub fn with_key_lookup(mut self, key_lookup: KeyLookup) -> Self {
        self.key_lookup = key_lookup;
        self
    }

    /// Runs until the user quits or input ends.
    ///
    /// A session that cannot be created (missing API key) is reported and the
    /// user is sent back to the model menu.
    ///
    /// # Errors
    ///
    /// Only terminal I/O failures are returned.
    pub async fn run(&mut self) -> io::Result<()> {
        loop {
            let Some(config) = self.choose_model()? else {
                return Ok(());
            };
            let Some(persona) = self.choose_persona()? else {
                return Ok(());
            };
            match ConversationSession::create_with_key_lookup(
                config,
                persona.system_prompt(),
                self.transport.clone(),
                &self.settings,
                |name| (self.key_lookup)(name),
            ) {
                Ok(session) => return self.chat_loop(session).await,
                Err(err) => {
                    error!(error = %err, "failed to start chat session");
                    writeln!(self.output, "An error occurred: {err}")?;
                }
            }
        }
    }

    fn choose_model(&mut self) -> io::Result<Option<&'a ModelConfig>> {
        writeln!(self.output, "\n=== Available AI Models ===")?;
        for (key, config) in self.registry.list() {
            writeln!(self.output, "{key}. {}", config.display_name)?;
        }
        let count = self.registry.len();
        loop {
            let Some(choice) = self.prompt(&format!("\nSelect model (1-{count}): "))? else {
                return Ok(None);
            };
            match self.registry.get(&choice) {
                Ok(config) => return Ok(Some(config)),
                Err(ChatError::NotFound { .. }) => {
                    writeln!(self.output, "Please select a number between 1 and {count}")?;
                }
                Err(err) => writeln!(self.output, "An error occurred: {err}")?,
            }
        }
    }

    fn choose_persona(&mut self) -> io::Result<Option<Persona>> {
        writeln!(self.output, "\nChoose AI behavior:")?;
        writeln!(self.output, "1. Snarky")?;
        writeln!(self.output, "2. Polite")?;
        writeln!(self.output, "3. Custom")?;
        loop {
            let Some(choice) = self.prompt("\nSelect (1-3): ")? else {
                return Ok(None);
            };
            if let Some(persona) = Persona::from_menu_choice(&choice) {
                return Ok(Some(persona));
            }
            if choice != "3" {
                writeln!(self.output, "Please select 1, 2, or 3.")?;
                continue;
            }
            let Some(behaviour) = self.prompt("Enter custom behavior (single word): ")? else {
                return Ok(None);
            };
            match Persona::custom(&behaviour) {
                Ok(persona) => return Ok(Some(persona)),
                Err(err) => writeln!(self.output, "{}", err.message())?,
            }
        }
    }

    async fn chat_loop(&mut self, mut session: ConversationSession) -> io::Result<()> {
        writeln!(
            self.output,
            "\n=== {} Chat Started ===",
            session.config().display_name
        )?;
        writeln!(self.output, "Type 'quit' to exit")?;

        while let Some(line) = self.prompt("\nYou: ")? {
            if CHAT_QUIT_KEYWORDS
                .iter()
                .any(|keyword| line.eq_ignore_ascii_case(keyword))
            {
                writeln!(self.output, "Goodbye!")?;
                return Ok(());
            }
            match session.send(&line).await {
                Ok(reply) => writeln!(self.output, "AI: {reply}")?,
                Err(ChatError::Validation { message }) => writeln!(self.output, "{message}")?,
                Err(err) => writeln!(self.output, "Error: {err}")?,
            }
        }
        Ok(())
    }

    /// Writes `prompt` and reads one trimmed line; `None` at end of input.
    fn prompt(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
