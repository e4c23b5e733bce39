//! Minimal IRCv3 line parsing for the Twitch chat gateway.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IrcMessage {
    pub tags: HashMap<String, String>,
    pub prefix: Option<String>,
    pub command: String,
    pub params: Vec<String>,
}

impl IrcMessage {
    /// Nick part of the prefix (`nick!user@host`).
    pub fn nick(&self) -> Option<&str> {
        let prefix = self.prefix.as_deref()?;
        let nick = prefix.split('!').next().unwrap_or(prefix);
        (!nick.is_empty()).then_some(nick)
    }

    /// The trailing parameter, which carries message text for PRIVMSG.
    pub fn trailing(&self) -> Option<&str> {
        self.params.last().map(String::as_str)
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// Parses one line without its CRLF. Returns `None` for blank lines or a
/// line with no command.
pub fn parse_line(line: &str) -> Option<IrcMessage> {
    let mut rest = line.trim_end_matches(['\r', '\n']);
    if rest.trim().is_empty() {
        return None;
    }
    let mut message = IrcMessage::default();

    if let Some(stripped) = rest.strip_prefix('@') {
        let (tags, tail) = stripped.split_once(' ')?;
        message.tags = parse_tags(tags);
        rest = tail.trim_start();
    }

    if let Some(stripped) = rest.strip_prefix(':') {
        let (prefix, tail) = stripped.split_once(' ').unwrap_or((stripped, ""));
        message.prefix = Some(prefix.to_string());
        rest = tail.trim_start();
    }

    let (command, mut params) = rest.split_once(' ').unwrap_or((rest, ""));
    if command.is_empty() {
        return None;
    }
    message.command = command.to_ascii_uppercase();

    loop {
        params = params.trim_start();
        if params.is_empty() {
            break;
        }
        if let Some(trailing) = params.strip_prefix(':') {
            message.params.push(trailing.to_string());
            break;
        }
        match params.split_once(' ') {
            Some((param, tail)) => {
                message.params.push(param.to_string());
                params = tail;
            }
            None => {
                message.params.push(params.to_string());
                break;
            }
        }
    }
    Some(message)
}

fn parse_tags(raw: &str) -> HashMap<String, String> {
    raw.split(';')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (key.to_string(), unescape_tag(value))
        })
        .collect()
}

fn unescape_tag(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(':') => out.push(';'),
            Some('s') => out.push(' '),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
