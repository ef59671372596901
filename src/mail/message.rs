use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::MonoRailError;

/// Header lines recognised before the body starts. Header names are matched
/// case-insensitively; the value runs to the end of the line.
static HEADER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[ \t]*(to|from|cc|bcc|subject|reply-to|x-\w+):[ \t]*(.+)$")
        .expect("mail header regex should be valid")
});

/// An email address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailAddress {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl MailAddress {
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}

impl FromStr for MailAddress {
    type Err = MonoRailError;

    /// Accepts `user@host` and `Display Name <user@host>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MonoRailError::InvalidMailAddress {
            address: s.to_string(),
        };
        let trimmed = s.trim();

        let (display_name, address) = match (trimmed.rfind('<'), trimmed.ends_with('>')) {
            (Some(open), true) => {
                let name = trimmed[..open].trim().trim_matches('"').trim();
                let addr = trimmed[open + 1..trimmed.len() - 1].trim();
                ((!name.is_empty()).then(|| name.to_string()), addr)
            }
            _ => (None, trimmed),
        };

        let valid = match address.split_once('@') {
            Some((local, host)) => {
                !local.is_empty()
                    && !host.is_empty()
                    && !host.contains('@')
                    && !address.chars().any(|c| c.is_whitespace() || c == '<' || c == '>')
            }
            None => false,
        };
        if !valid {
            return Err(invalid());
        }

        Ok(MailAddress {
            address: address.to_string(),
            display_name,
        })
    }
}

impl fmt::Display for MailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.display_name {
            Some(name) => write!(f, "{} <{}>", name, self.address),
            None => f.write_str(&self.address),
        }
    }
}

/// Email message produced from rendered template text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub from: Option<MailAddress>,
    pub to: Vec<MailAddress>,
    pub cc: Vec<MailAddress>,
    pub bcc: Vec<MailAddress>,
    pub reply_to: Vec<MailAddress>,
    pub subject: String,
    /// `X-*` headers, keyed by lowercased name
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub is_body_html: bool,
}

impl MailMessage {
    /// Build a message from rendered template output.
    ///
    /// Leading lines that look like `name: value` headers fill the envelope.
    /// A header name must open its line (after optional indentation), so
    /// `Hi, subject: x` is body text. Recipient headers may list several
    /// addresses separated by commas; commas inside a quoted display name do
    /// not split. The first line that is not a header starts the body; it and every
    /// later line, header-shaped or not, are appended to the body followed by
    /// a newline.
    ///
    /// # Errors
    ///
    /// [`MonoRailError::InvalidMailAddress`] when an address header holds
    /// something other than an address.
    pub fn parse(rendered: &str) -> Result<Self, MonoRailError> {
        let mut message = MailMessage::default();
        let mut in_body = false;

        for line in rendered.lines() {
            if !in_body {
                if let Some(caps) = HEADER_LINE.captures(line) {
                    message.apply_header(&caps[1], caps[2].trim_end())?;
                    continue;
                }
                in_body = true;
            }
            message.body.push_str(line);
            message.body.push('\n');
        }

        message.is_body_html = message.body.to_ascii_lowercase().contains("<html");
        Ok(message)
    }

    fn apply_header(&mut self, name: &str, value: &str) -> Result<(), MonoRailError> {
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "to" => self.to.extend(parse_address_list(value)?),
            "cc" => self.cc.extend(parse_address_list(value)?),
            "bcc" => self.bcc.extend(parse_address_list(value)?),
            "reply-to" => self.reply_to.extend(parse_address_list(value)?),
            "from" => self.from = Some(value.parse()?),
            "subject" => self.subject = value.to_string(),
            _ => {
                self.headers.insert(name, value.to_string());
            }
        }
        Ok(())
    }
}

/// Split a recipient header on commas that sit outside quoted display names
/// and outside `<...>`.
fn parse_address_list(value: &str) -> Result<Vec<MailAddress>, MonoRailError> {
    let mut segments = Vec::new();
    let mut in_quotes = false;
    let mut angle_depth = 0usize;
    let mut start = 0;

    for (i, c) in value.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '<' if !in_quotes => angle_depth += 1,
            '>' if !in_quotes => angle_depth = angle_depth.saturating_sub(1),
            ',' if !in_quotes && angle_depth == 0 => {
                segments.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&value[start..]);

    segments
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}
