use anyhow::Result;
use inquire::{Confirm, Text};

/// Source of interactive answers. The terminal implementation is
/// [`InquireDriver`]; tests script their own.
pub trait PromptDriver {
    fn ask_string(&self, title: &str, help: &str, default: &str) -> Result<String>;
    fn ask_bool(&self, title: &str, help: &str, default: bool) -> Result<bool>;
}

pub struct InquireDriver;

impl PromptDriver for InquireDriver {
    fn ask_string(&self, title: &str, help: &str, default: &str) -> Result<String> {
        let mut prompt = Text::new(title);
        if !help.is_empty() {
            prompt = prompt.with_help_message(help);
        }
        if !default.is_empty() {
            prompt = prompt.with_default(default);
        }
        Ok(prompt.prompt()?)
    }

    fn ask_bool(&self, title: &str, help: &str, default: bool) -> Result<bool> {
        let mut prompt = Confirm::new(title).with_default(default);
        if !help.is_empty() {
            prompt = prompt.with_help_message(help);
        }
        Ok(prompt.prompt()?)
    }
}

/// Asks for a label until a non-blank one is given. The answer is returned
/// exactly as typed.
pub fn prompt_label<D: PromptDriver>(driver: &D) -> Result<String> {
    loop {
        let answer = driver.ask_string("Label", "What does this sketch show?", "")?;
        if !answer.trim().is_empty() {
            return Ok(answer);
        }
        eprintln!("✗ label cannot be empty");
    }
}
