//! Slash-command text parsing

use thiserror::Error;

pub const USAGE: &str =
    "Usage: `/simulate <iterations> <product description>` (e.g. `/simulate 3 Magnetic Toothbrush`)";

/// A validated `/simulate` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlashCommand {
    pub turns: u32,
    pub product_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("{}", USAGE)]
    Usage,
    #[error("Iterations must be between 1 and {max}. {}", USAGE)]
    TooManyTurns { max: u32 },
}

/// Parse `"<turns> <product description>"`.
pub fn parse_command(text: &str, max_turns: u32) -> Result<SlashCommand, CommandError> {
    let text = text.trim();
    let (count, rest) = text
        .split_once(char::is_whitespace)
        .ok_or(CommandError::Usage)?;

    let turns: u32 = count.parse().map_err(|_| CommandError::Usage)?;
    if turns == 0 {
        return Err(CommandError::Usage);
    }
    if turns > max_turns {
        return Err(CommandError::TooManyTurns { max: max_turns });
    }

    let product_description = rest.trim();
    if product_description.is_empty() {
        return Err(CommandError::Usage);
    }

    Ok(SlashCommand {
        turns,
        product_description: product_description.to_string(),
    })
}
