//! Interactive prompts
//!
//! Used when the source or target is not given on the command line, and
//! for the final go/no-go before merging.

use std::path::PathBuf;

use dialoguer::{Confirm, Input};

use crate::error::{LooperError, Result};

fn prompt_error(e: dialoguer::Error) -> LooperError {
    LooperError::Prompt {
        reason: e.to_string(),
    }
}

/// Clean up a pasted path: surrounding whitespace and quotes
pub fn clean_path_input(raw: &str) -> PathBuf {
    PathBuf::from(raw.trim().trim_matches('"').trim_matches('\''))
}

/// Ask until the user names an existing file
pub fn ask_source_path() -> Result<PathBuf> {
    let raw: String = Input::new()
        .with_prompt("Enter the full path to your video file")
        .validate_with(|input: &String| -> std::result::Result<(), &'static str> {
            if clean_path_input(input).is_file() {
                Ok(())
            } else {
                Err("File not found. Please check the path and try again.")
            }
        })
        .interact_text()
        .map_err(prompt_error)?;
    Ok(clean_path_input(&raw))
}

/// Ask until the user gives a positive number of hours
pub fn ask_target_hours() -> Result<f64> {
    Input::<f64>::new()
        .with_prompt("Enter the target duration in hours (e.g., 1, 2.5, 10)")
        .validate_with(|hours: &f64| -> std::result::Result<(), &'static str> {
            if hours.is_finite() && *hours > 0.0 {
                Ok(())
            } else {
                Err("Please enter a positive number for the hours.")
            }
        })
        .interact_text()
        .map_err(prompt_error)
}

/// Yes/no question, defaulting to no
pub fn confirm(question: &str) -> Result<bool> {
    Confirm::new()
        .with_prompt(question)
        .default(false)
        .interact()
        .map_err(prompt_error)
}
