use crate::error::SeqDbError;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::collections::VecDeque;

pub trait Prompter {
    fn ask(&mut self, prompt: &str) -> Result<String, SeqDbError>;
}

pub struct InteractivePrompter {
    editor: DefaultEditor,
}

impl InteractivePrompter {
    pub fn new() -> Result<Self, SeqDbError> {
        let editor = DefaultEditor::new()
            .map_err(|e| SeqDbError::Prompt(format!("could not open terminal: {e}")))?;
        Ok(Self { editor })
    }
}

impl Prompter for InteractivePrompter {
    fn ask(&mut self, prompt: &str) -> Result<String, SeqDbError> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(line),
            Err(ReadlineError::Interrupted) => Err(SeqDbError::Prompt("interrupted".to_string())),
            Err(ReadlineError::Eof) => Err(SeqDbError::Prompt("end of input".to_string())),
            Err(err) => Err(SeqDbError::Prompt(err.to_string())),
        }
    }
}

/// Answers every prompt with empty input, which accepts each default.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptDefaults;

impl Prompter for AcceptDefaults {
    fn ask(&mut self, _prompt: &str) -> Result<String, SeqDbError> {
        Ok(String::new())
    }
}

/// Replays a fixed list of responses and remembers what it was asked.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    responses: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, prompt: &str) -> Result<String, SeqDbError> {
        self.asked.push(prompt.to_string());
        self.responses
            .pop_front()
            .ok_or_else(|| SeqDbError::Prompt(format!("no scripted answer for '{prompt}'")))
    }
}
