//! Lexical stage: turns an unwrapped CFI body into a flat sequence of [`Token`].

/// Escape character; suppresses the special meaning of the character that follows.
pub(crate) const ESCAPE: char = '^';

/// A lexical unit of a CFI body.
///
/// Numeric payloads that cannot be read are kept as [`None`] (integers)
/// or [`f64::NAN`] (decimals) rather than rejected.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// `/n`
    Step(Option<usize>),
    /// `:n`
    Offset(Option<usize>),
    /// `~n.n`
    Temporal(f64),
    /// One coordinate of `@x:y`.
    Spatial(f64),
    /// The first segment of a `[...]` block.
    Assertion(String),
    /// A segment following an unescaped `,` within a `[...]` block.
    Extension(String),
    /// A `;name=value` segment within a `[...]` block.
    Parameter { name: String, value: String },
    /// `!`
    Indirection,
    /// `,` outside of any `[...]` block.
    RangeSeparator,
}

#[derive(Clone, Debug, PartialEq)]
enum State {
    Idle,
    Step,
    Offset,
    Temporal,
    SpatialX,
    SpatialY,
    /// Inside `[...]`; `extension` is `true` after an unescaped `,`.
    Assertion { extension: bool },
    /// Inside `[...;...]`; `name` is set once `=` has been read.
    Parameter { name: Option<String> },
    Indirection,
    RangeSeparator,
}

impl State {
    fn from_lead(c: char) -> Self {
        match c {
            '/' => Self::Step,
            ':' => Self::Offset,
            '~' => Self::Temporal,
            '@' => Self::SpatialX,
            '[' => Self::Assertion { extension: false },
            '!' => Self::Indirection,
            ',' => Self::RangeSeparator,
            _ => Self::Idle,
        }
    }
}

struct Tokenizer {
    state: State,
    value: String,
    escape: bool,
    tokens: Vec<Token>,
}

impl Tokenizer {
    fn new() -> Self {
        Self {
            state: State::Idle,
            value: String::new(),
            escape: false,
            tokens: Vec::new(),
        }
    }

    fn emit(&mut self, token: Token) {
        self.tokens.push(token);
        self.state = State::Idle;
        self.value.clear();
    }

    /// Emits whatever the current state has accumulated.
    fn flush(&mut self) {
        let token = match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle => return,
            State::Step => Token::Step(self.value.parse().ok()),
            State::Offset => Token::Offset(self.value.parse().ok()),
            State::Temporal => Token::Temporal(parse_decimal(&self.value)),
            State::SpatialX | State::SpatialY => Token::Spatial(parse_decimal(&self.value)),
            State::Assertion { extension } => self.assertion(extension),
            State::Parameter { name } => self.parameter(name),
            State::Indirection => Token::Indirection,
            State::RangeSeparator => Token::RangeSeparator,
        };
        self.emit(token);
    }

    fn assertion(&mut self, extension: bool) -> Token {
        let value = std::mem::take(&mut self.value);
        if extension {
            Token::Extension(value)
        } else {
            Token::Assertion(value)
        }
    }

    fn parameter(&mut self, name: Option<String>) -> Token {
        Token::Parameter {
            name: name.unwrap_or_default(),
            value: std::mem::take(&mut self.value),
        }
    }

    fn feed(&mut self, c: char) {
        if c == ESCAPE && !self.escape {
            self.escape = true;
            return;
        }
        let escaped = std::mem::take(&mut self.escape);

        match &mut self.state {
            State::Idle => {}
            State::Indirection | State::RangeSeparator => self.flush(),
            State::Step | State::Offset => {
                if c.is_ascii_digit() {
                    self.value.push(c);
                    return;
                }
                self.flush();
            }
            State::Temporal | State::SpatialY => {
                if is_decimal(c) {
                    self.value.push(c);
                    return;
                }
                self.flush();
            }
            State::SpatialX => {
                if c == ':' {
                    let x = parse_decimal(&self.value);
                    self.emit(Token::Spatial(x));
                    self.state = State::SpatialY;
                    return;
                }
                if is_decimal(c) {
                    self.value.push(c);
                    return;
                }
                self.flush();
            }
            State::Assertion { extension } => {
                let extension = *extension;
                match c {
                    ';' if !escaped => {
                        let token = self.assertion(extension);
                        self.emit(token);
                        self.state = State::Parameter { name: None };
                    }
                    ',' if !escaped => {
                        let token = self.assertion(extension);
                        self.emit(token);
                        self.state = State::Assertion { extension: true };
                    }
                    ']' if !escaped => self.flush(),
                    _ => self.value.push(c),
                }
                return;
            }
            State::Parameter { name } => {
                match c {
                    '=' if !escaped && name.is_none() => {
                        *name = Some(std::mem::take(&mut self.value));
                    }
                    ';' if !escaped => {
                        let name = name.take();
                        let token = self.parameter(name);
                        self.emit(token);
                        self.state = State::Parameter { name: None };
                    }
                    ']' if !escaped => self.flush(),
                    _ => self.value.push(c),
                }
                return;
            }
        }

        self.state = State::from_lead(c);
    }

    fn finish(mut self) -> Vec<Token> {
        self.flush();
        self.tokens
    }
}

fn is_decimal(c: char) -> bool {
    c.is_ascii_digit() || c == '.'
}

fn parse_decimal(value: &str) -> f64 {
    value.parse().unwrap_or(f64::NAN)
}

/// Splits an unwrapped CFI body into tokens.
///
/// This stage performs no validation; characters outside of any recognized
/// construct are skipped, and unreadable numbers become sentinel payloads.
///
/// # Examples
/// ```
/// use epubcfi::cfi::token::{tokenize, Token};
///
/// let tokens = tokenize("/4[body01]/3:10");
/// assert_eq!(
///     vec![
///         Token::Step(Some(4)),
///         Token::Assertion("body01".into()),
///         Token::Step(Some(3)),
///         Token::Offset(Some(10)),
///     ],
///     tokens,
/// );
/// ```
pub fn tokenize(raw: &str) -> Vec<Token> {
    let mut tokenizer = Tokenizer::new();
    raw.trim().chars().for_each(|c| tokenizer.feed(c));
    tokenizer.finish()
}
