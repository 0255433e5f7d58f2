use crate::constants::{self, DESCRIPTION_MAX_LENGTH};
use poise::{serenity_prelude::CreateEmbed, CreateReply};

pub fn success_embed(content: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new()
        .description(content)
        .color(constants::SUCCESS_COLOR)
}

pub fn failure_embed(content: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new()
        .description(content)
        .color(constants::FAILURE_COLOR)
}

pub fn info_embed(content: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new()
        .description(content)
        .color(constants::INFO_COLOR)
}

pub fn success_message(content: impl Into<String>) -> CreateReply {
    CreateReply::default().embed(success_embed(content))
}

/// Joins `lines` into one description, dropping trailing lines that would
/// overflow the embed limit. `empty` is shown when there are no lines.
pub fn lines_description<S: AsRef<str>>(lines: impl IntoIterator<Item = S>, empty: &str) -> String {
    let mut description = String::new();
    for line in lines {
        let line = line.as_ref();
        if description.len() + line.len() + 1 > DESCRIPTION_MAX_LENGTH {
            break;
        }
        if !description.is_empty() {
            description.push('\n');
        }
        description.push_str(line);
    }
    if description.is_empty() {
        empty.clone_into(&mut description);
    }
    description
}

pub fn render_lines_reply<S: AsRef<str>>(
    lines: impl IntoIterator<Item = S>,
    title: impl Into<String>,
    empty: &str,
) -> CreateReply {
    CreateReply::default().embed(info_embed(lines_description(lines, empty)).title(title))
}
