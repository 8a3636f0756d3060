//! Message parser - Splits command text into arguments

/// A parsed command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub name: String,
    pub args: Vec<String>,
}

/// Recognizes the trigger prefix and tokenizes what follows
#[derive(Debug, Clone)]
pub struct MessageParser {
    command_prefix: String,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.command_prefix
    }

    /// Parse raw message text. Returns `None` when the text does not start
    /// with the prefix or contains nothing after it.
    pub fn parse(&self, text: &str) -> Option<Invocation> {
        let rest = text.strip_prefix(self.command_prefix.as_str())?;
        let mut tokens = tokenize(rest).into_iter();
        let name = tokens.next()?;
        Some(Invocation {
            name,
            args: tokens.collect(),
        })
    }
}

/// Split `input` on spaces, keeping double-quoted spans together.
///
/// Quotes are dropped from the output and `\"` yields a literal quote. An
/// unterminated quote swallows the rest of the input into one token.
pub fn tokenize(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ' ' if !in_quotes => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        args.push(current);
    }

    args
}
