//! Splits Gerber source text into raw commands.
//!
//! Word commands are terminated by `*`, extended commands are wrapped in `%` and may contain several `*`-terminated
//! commands, e.g. `%FSLAX46Y46*MOMM*%`.

use std::collections::VecDeque;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommand {
    /// Command text without the terminating `*` and without line breaks.
    pub text: String,
    /// 1-based line on which the command started.
    pub line: usize,
    /// True for commands that appeared inside a `%...%` block.
    pub extended: bool,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("Unterminated block at line {line}: {text:?}")]
    Unterminated { line: usize, text: String },
}

/// Lazy iterator over the commands of a source string.
///
/// Cloning the tokenizer restarts from the clone's current position, calling [`tokenize`] again restarts from the
/// beginning.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    source: &'a str,
    offset: usize,
    line: usize,
    /// Commands already split out of the current extended block.
    pending: VecDeque<Result<RawCommand, TokenizeError>>,
}

pub fn tokenize(source: &str) -> Tokenizer<'_> {
    Tokenizer {
        source,
        offset: 0,
        line: 1,
        pending: Default::default(),
    }
}

impl<'a> Tokenizer<'a> {
    fn skip_whitespace(&mut self) {
        let rest = &self.source[self.offset..];
        let trimmed = rest.trim_start();
        let skipped = &rest[..rest.len() - trimmed.len()];
        self.line += count_lines(skipped);
        self.offset += skipped.len();
    }

    /// Consume `%...%`, queueing each command found inside it.
    fn read_extended(&mut self) {
        let start_line = self.line;
        // skip the opening '%'
        let body_start = self.offset + 1;
        let Some(length) = self.source[body_start..].find('%') else {
            let text = clean(&self.source[body_start..]);
            self.line += count_lines(&self.source[self.offset..]);
            self.offset = self.source.len();
            self.pending.push_back(Err(TokenizeError::Unterminated {
                line: start_line,
                text,
            }));
            return;
        };

        let body = &self.source[body_start..body_start + length];
        self.line += count_lines(body);
        self.offset = body_start + length + 1;

        let trimmed = body.trim();
        if trimmed.starts_with("AM") {
            // macro bodies contain '*' separated primitives which belong together
            let text = clean(trimmed.trim_end_matches('*'));
            if trimmed.ends_with('*') {
                self.pending.push_back(Ok(RawCommand {
                    text,
                    line: start_line,
                    extended: true,
                }));
            } else {
                self.pending.push_back(Err(TokenizeError::Unterminated {
                    line: start_line,
                    text,
                }));
            }
            return;
        }

        let mut line = start_line;
        let mut rest = body;
        while !rest.is_empty() {
            match rest.find('*') {
                Some(index) => {
                    let piece = &rest[..index];
                    let text = clean(piece);
                    if !text.is_empty() {
                        self.pending.push_back(Ok(RawCommand {
                            text,
                            line: line + leading_lines(piece),
                            extended: true,
                        }));
                    }
                    line += count_lines(piece);
                    rest = &rest[index + 1..];
                }
                None => {
                    let text = clean(rest);
                    if !text.is_empty() {
                        self.pending.push_back(Err(TokenizeError::Unterminated {
                            line: line + leading_lines(rest),
                            text,
                        }));
                    }
                    break;
                }
            }
        }
    }

    fn read_word(&mut self) -> Result<RawCommand, TokenizeError> {
        let start_line = self.line;
        let rest = &self.source[self.offset..];

        // a word ends at '*', a '%' before that means the word was never terminated
        let end = rest.find(&['*', '%'][..]);
        match end {
            Some(index) if rest.as_bytes()[index] == b'*' => {
                let piece = &rest[..index];
                self.line += count_lines(piece);
                self.offset += index + 1;
                Ok(RawCommand {
                    text: clean(piece),
                    line: start_line,
                    extended: false,
                })
            }
            _ => {
                let index = end.unwrap_or(rest.len());
                let piece = &rest[..index];
                self.line += count_lines(piece);
                self.offset += index;
                Err(TokenizeError::Unterminated {
                    line: start_line,
                    text: clean(piece),
                })
            }
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<RawCommand, TokenizeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(item);
            }

            self.skip_whitespace();
            let next = self.source[self.offset..].chars().next()?;

            match next {
                '%' => self.read_extended(),
                '*' => {
                    // empty word command
                    self.offset += 1;
                }
                _ => {
                    let result = self.read_word();
                    match &result {
                        Ok(command) if command.text.is_empty() => continue,
                        _ => return Some(result),
                    }
                }
            }
        }
    }
}

fn count_lines(text: &str) -> usize {
    text.matches('\n').count()
}

/// Lines before the first non-whitespace character.
fn leading_lines(text: &str) -> usize {
    let trimmed = text.trim_start();
    count_lines(&text[..text.len() - trimmed.len()])
}

/// Remove line breaks and surrounding whitespace; spaces inside a command (e.g. comments) are kept.
fn clean(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .collect::<String>()
        .trim()
        .to_string()
}
