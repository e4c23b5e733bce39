//! Pure rendering of the model into screen lines.

use super::state::{Model, Screen};
use crate::api::Stream;

const LIST_TITLE: &str = "Who's online?";
const LIST_HELP: &str = "up/k down/j move | enter chat | o open | r reload | q quit";
const CHAT_HELP: &str = "esc back | o open | q quit";

/// Renders the model as at most `model.height` lines, each at most
/// `model.width` characters.
pub fn render(model: &Model) -> Vec<String> {
    let height = usize::from(model.height.max(4));
    let width = usize::from(model.width.max(1));

    let (header, body, help) = match &model.screen {
        Screen::Streams => (
            LIST_TITLE.to_string(),
            stream_lines(model, height.saturating_sub(4)),
            LIST_HELP,
        ),
        Screen::Chat { channel, connected } => {
            let state = if *connected { "connected" } else { "connecting..." };
            (
                format!("#{channel} ({state})"),
                chat_lines(model, channel, height.saturating_sub(4)),
                CHAT_HELP,
            )
        }
    };

    let mut lines = Vec::with_capacity(height);
    lines.push(header);
    lines.push(String::new());
    lines.extend(body);
    while lines.len() < height - 2 {
        lines.push(String::new());
    }
    lines.push(model.status.clone().unwrap_or_default());
    lines.push(help.to_string());
    lines.into_iter().map(|line| truncate(&line, width)).collect()
}

fn stream_lines(model: &Model, rows: usize) -> Vec<String> {
    if model.streams.is_empty() {
        let text = if model.loading {
            "Loading followed streams..."
        } else {
            "No followed channels are live."
        };
        return vec![text.to_string()];
    }

    // Two rows per entry; scroll so the cursor stays visible.
    let visible = (rows / 2).max(1);
    let first = model.cursor.saturating_sub(visible - 1);
    model
        .streams
        .iter()
        .enumerate()
        .skip(first)
        .take(visible)
        .flat_map(|(index, stream)| stream_entry(stream, index == model.cursor))
        .collect()
}

fn stream_entry(stream: &Stream, selected: bool) -> [String; 2] {
    let marker = if selected { "> " } else { "  " };
    [
        format!(
            "{marker}{} | {}",
            stream.user_display_name, stream.game_name
        ),
        format!("    {} | {} viewers", stream.title, stream.viewer_count),
    ]
}

fn chat_lines(model: &Model, channel: &str, rows: usize) -> Vec<String> {
    let skip = model.messages.len().saturating_sub(rows);
    model.messages[skip..]
        .iter()
        .map(|message| {
            if message.is_join_marker() {
                format!("-- joined #{channel}")
            } else {
                format!("{}  {}", message.username, message.text)
            }
        })
        .collect()
}

fn truncate(line: &str, width: usize) -> String {
    match line.char_indices().nth(width) {
        Some((end, _)) => line[..end].to_string(),
        None => line.to_string(),
    }
}
