//! Interactive prompts
//!
//! Workflows ask every question through [`Prompter`]; the terminal
//! implementation sits on `dialoguer`.

use crate::errors::Result;
use console::Term;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

/// One entry of a numbered menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub description: String,
}

impl MenuItem {
    pub fn new(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
        }
    }

    fn display(&self) -> String {
        if self.description.is_empty() {
            self.label.clone()
        } else {
            format!("{} - {}", self.label, self.description)
        }
    }
}

pub trait Prompter {
    /// y/n question.
    fn confirm(&self, question: &str) -> Result<bool>;

    /// Free text; an empty answer yields `default` when one is given.
    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String>;

    /// Index into `items`.
    fn select(&self, prompt: &str, items: &[MenuItem], default: usize) -> Result<usize>;

    /// Block until the user presses Enter.
    fn pause(&self, message: &str) -> Result<()>;
}

pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for DialoguerPrompter {
    fn confirm(&self, question: &str) -> Result<bool> {
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt(question.trim())
            .interact()?;
        Ok(answer)
    }

    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme).with_prompt(prompt.trim());
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        let answer: String = input.interact_text()?;
        Ok(answer.trim().to_string())
    }

    fn select(&self, prompt: &str, items: &[MenuItem], default: usize) -> Result<usize> {
        let labels: Vec<String> = items.iter().map(MenuItem::display).collect();
        let choice = Select::with_theme(&self.theme)
            .with_prompt(prompt.trim())
            .items(&labels)
            .default(default.min(items.len().saturating_sub(1)))
            .interact()?;
        Ok(choice)
    }

    fn pause(&self, message: &str) -> Result<()> {
        let term = Term::stdout();
        term.write_str(&format!("{} ", crate::ui::warning().apply_to(message)))?;
        term.read_line()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_item_display() {
        let item = MenuItem::new("MP4 (H.264)", "Most compatible - works on all devices");
        assert_eq!(item.display(), "MP4 (H.264) - Most compatible - works on all devices");
        assert_eq!(MenuItem::new("Batch Mode", "").display(), "Batch Mode");
    }
}
