//! Interactive prompts.

use console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::MultiSelect;

use crate::error::{DoctorError, Result};

fn map_dialoguer_err(e: dialoguer::Error) -> DoctorError {
    DoctorError::Io(e.into())
}

/// Dialoguer theme without the default yellow `?` prefix.
fn prompt_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("".to_string()),
        ..ColorfulTheme::default()
    }
}

/// Ask the user to tick any of `items`. Nothing is selected up front.
pub fn select_many(question: &str, items: &[String], term: &Term) -> Result<Vec<usize>> {
    if items.is_empty() {
        return Ok(Vec::new());
    }
    MultiSelect::with_theme(&prompt_theme())
        .with_prompt(question)
        .items(items)
        .interact_on(term)
        .map_err(map_dialoguer_err)
}
