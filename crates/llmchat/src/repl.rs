//! Interactive terminal chat.
//!
//! Plain lines are prompts; lines starting with `/` are commands and `//`
//! escapes a prompt that itself starts with `/`.

use dialoguer::Password;
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};
use secrecy::SecretString;
use tracing::debug;

use crate::llm::{Provider, ProviderRegistry, Role};
use crate::session::{ChatSelection, Session, TurnOutcome};

const HELP: &str = "\
Commands:
  /provider <name>  switch provider (gemini, openrouter, groq); clears the key
  /model <id>       use a model (any id is forwarded as-is)
  /models           list the models offered for the current provider
  /key              enter the API key for the current provider (hidden)
  /clear            clear the chat
  /history          show the chat so far
  /help             show this help
  /quit             exit
  //text            send a prompt that starts with /";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Prompt(String),
    Provider(String),
    Model(String),
    Models,
    Key,
    Clear,
    History,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse_line(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Command::Prompt(line.trim_end_matches(['\r', '\n']).to_string());
    };
    if rest.starts_with('/') {
        return Command::Prompt(rest.to_string());
    }

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match (name, arg) {
        ("provider", arg) if !arg.is_empty() => Command::Provider(arg.to_string()),
        ("model", arg) if !arg.is_empty() => Command::Model(arg.to_string()),
        // Inline text is discarded; keys are only read with hidden input.
        ("key", _) => Command::Key,
        ("models", _) => Command::Models,
        ("clear", _) => Command::Clear,
        ("history", _) => Command::History,
        ("help", _) => Command::Help,
        ("quit" | "exit", _) => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}

/// Result of handling one command.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Print(String),
    /// Ask for the API key with hidden input, then call [`Repl::set_key`].
    ReadKey,
    Quit,
}

/// Terminal chat state: one session plus the current selection and key.
pub struct Repl {
    registry: ProviderRegistry,
    session: Session,
    selection: ChatSelection,
    api_key: Option<SecretString>,
}

impl Repl {
    pub fn new(
        registry: ProviderRegistry,
        selection: ChatSelection,
        api_key: Option<SecretString>,
    ) -> Self {
        Self {
            registry,
            session: Session::new(),
            selection,
            api_key,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn selection(&self) -> &ChatSelection {
        &self.selection
    }

    pub fn has_key(&self) -> bool {
        !crate::session::is_missing(self.api_key.as_ref())
    }

    /// Store a key for the current provider. Blank input leaves it unchanged.
    pub fn set_key(&mut self, key: SecretString) -> String {
        if crate::session::is_missing(Some(&key)) {
            return "No key entered; API key unchanged.".to_string();
        }
        self.api_key = Some(key);
        format!("API key set for {}.", self.selection.provider.label())
    }

    pub async fn handle(&mut self, command: Command) -> Step {
        match command {
            Command::Prompt(prompt) => {
                let outcome = self
                    .session
                    .submit(
                        &self.registry,
                        &self.selection,
                        self.api_key.as_ref(),
                        &prompt,
                    )
                    .await;
                Step::Print(render_outcome(&outcome))
            }
            Command::Provider(name) => match name.parse::<Provider>() {
                Ok(provider) => {
                    self.selection = ChatSelection::new(provider);
                    self.api_key = None;
                    Step::Print(format!(
                        "Using {} with model {}. Set a key with /key (get one at {}).",
                        provider.label(),
                        self.selection.model,
                        provider.key_url()
                    ))
                }
                Err(e) => Step::Print(e.to_string()),
            },
            Command::Model(model) => {
                self.selection.model = model;
                Step::Print(format!("Model set to {}.", self.selection.model))
            }
            Command::Models => {
                let lines: Vec<String> = self
                    .selection
                    .provider
                    .models()
                    .iter()
                    .map(|model| {
                        let marker = if *model == self.selection.model { "*" } else { " " };
                        format!("{marker} {model}")
                    })
                    .collect();
                Step::Print(lines.join("\n"))
            }
            Command::Key => Step::ReadKey,
            Command::Clear => {
                self.session.clear();
                Step::Print("Chat cleared.".to_string())
            }
            Command::History => Step::Print(render_history(&self.session)),
            Command::Help => Step::Print(HELP.to_string()),
            Command::Quit => Step::Quit,
            Command::Empty => Step::Print(String::new()),
            Command::Unknown(input) => {
                Step::Print(format!("Unknown command: {input}. Type /help."))
            }
        }
    }
}

fn render_outcome(outcome: &TurnOutcome) -> String {
    match outcome {
        TurnOutcome::Replied(message) | TurnOutcome::Failed { message, .. } => {
            message.content.clone()
        }
        TurnOutcome::MissingCredential { provider } => format!(
            "⚠️ Please enter your {} API key with /key (get one at {}).",
            provider.label(),
            provider.key_url()
        ),
    }
}

fn render_history(session: &Session) -> String {
    if session.transcript().is_empty() {
        return "(no messages)".to_string();
    }
    session
        .transcript()
        .all()
        .iter()
        .map(|message| {
            let tag = match message.role {
                Role::User => "you",
                Role::Assistant => "assistant",
            };
            format!("[{tag}] {}", message.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Read lines until Ctrl-D or `/quit`. Ctrl-C discards the current line.
pub async fn run(mut repl: Repl) -> anyhow::Result<()> {
    let mut editor = Reedline::create();
    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("llmchat".to_string()),
        DefaultPromptSegment::Empty,
    );

    println!(
        "LLM chat: {} / {}{}. Type /help for commands.",
        repl.selection().provider.label(),
        repl.selection().model,
        if repl.has_key() { "" } else { " (no API key yet, use /key)" }
    );

    loop {
        let line = match editor.read_line(&prompt)? {
            Signal::Success(line) => line,
            Signal::CtrlD => break,
            _ => continue,
        };

        match repl.handle(parse_line(&line)).await {
            Step::Print(text) if text.is_empty() => {}
            Step::Print(text) => println!("{text}"),
            Step::ReadKey => {
                let key = Password::new()
                    .with_prompt(format!("{} API key", repl.selection().provider.label()))
                    .allow_empty_password(true)
                    .interact()?;
                println!("{}", repl.set_key(SecretString::from(key)));
            }
            Step::Quit => break,
        }
    }

    debug!(
        messages = repl.session().transcript().len(),
        "Terminal chat finished"
    );
    Ok(())
}
