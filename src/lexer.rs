use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;

use crate::token;
use crate::token::Token;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum LexError {
    #[error("unrecognized character: {0:?}")]
    UnrecognizedCharacter(char),
    #[error("unterminated block comment")]
    UnterminatedBlockComment,
}

/// Scans the whole source into a token sequence terminated by `Token::Eof`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = vec![];

    loop {
        let token = lexer.next_token()?;
        let done = token == Token::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &str) -> Lexer {
        Lexer {
            input: input.chars().peekable(),
        }
    }

    fn read_char(&mut self) -> Option<char> {
        self.input.next()
    }

    fn peek_char(&self) -> Option<char> {
        self.input.clone().next()
    }

    fn peek_if<F>(&mut self, mut predicate: F) -> bool
    where
        F: FnMut(char) -> bool,
    {
        match self.peek_char() {
            Some(ch) => predicate(ch),
            None => false,
        }
    }

    fn read_identifier(&mut self, first: char) -> String {
        let mut ident = String::new();
        ident.push(first);

        while self.peek_if(is_letter) {
            ident.push(self.read_char().unwrap());
        }

        ident
    }

    // Digits with at most one decimal point. The lexeme is kept as text; the
    // parser decides whether it is a valid number.
    fn read_number(&mut self, first: char) -> String {
        let mut number = String::new();
        number.push(first);

        let mut seen_dot = false;
        while self.peek_if(|c| c.is_ascii_digit() || (c == '.' && !seen_dot)) {
            let c = self.read_char().unwrap();
            if c == '.' {
                seen_dot = true;
            }
            number.push(c);
        }

        number
    }

    // No escape processing. An unterminated string consumes to end of input,
    // matching the behaviour of the language this replaces.
    fn read_string(&mut self) -> String {
        let mut res = String::new();

        while self.peek_if(|c| c != '"') {
            res.push(self.read_char().unwrap());
        }

        // Consume the closing '"'
        self.read_char();

        res
    }

    fn skip_line_comment(&mut self) {
        while self.peek_if(|c| c != '\n') {
            self.read_char();
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        loop {
            match self.read_char() {
                Some('*') => {
                    if let Some('/') = self.peek_char() {
                        self.read_char();
                        return Ok(());
                    }
                }
                Some(_) => {}
                None => return Err(LexError::UnterminatedBlockComment),
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_if(|c| c.is_whitespace()) {
            self.read_char();
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();

        let token = match self.read_char() {
            Some('=') => {
                if let Some('=') = self.peek_char() {
                    self.read_char();
                    Token::Eq
                } else {
                    Token::Assign
                }
            }
            Some('!') => {
                if let Some('=') = self.peek_char() {
                    self.read_char();
                    Token::Ne
                } else {
                    Token::Bang
                }
            }
            Some('<') => {
                if let Some('=') = self.peek_char() {
                    self.read_char();
                    Token::Le
                } else {
                    Token::Lt
                }
            }
            Some('>') => {
                if let Some('=') = self.peek_char() {
                    self.read_char();
                    Token::Ge
                } else {
                    Token::Gt
                }
            }
            Some('/') => match self.peek_char() {
                Some('/') => {
                    self.skip_line_comment();
                    return self.next_token();
                }
                Some('*') => {
                    self.read_char();
                    self.skip_block_comment()?;
                    return self.next_token();
                }
                _ => Token::Slash,
            },
            Some('+') => Token::Plus,
            Some('-') => Token::Minus,
            Some('*') => Token::Asterisk,
            Some('%') => Token::Percent,
            Some('(') => Token::OpenParen,
            Some(')') => Token::CloseParen,
            Some('{') => Token::OpenBrace,
            Some('}') => Token::CloseBrace,
            Some('[') => Token::OpenBracket,
            Some(']') => Token::CloseBracket,
            Some(',') => Token::Comma,
            Some(';') => Token::SemiColon,
            Some('"') => Token::Str(self.read_string()),
            Some(c) => {
                if is_letter(c) {
                    token::lookup_ident(&self.read_identifier(c))
                } else if c.is_ascii_digit() {
                    Token::Number(self.read_number(c))
                } else {
                    return Err(LexError::UnrecognizedCharacter(c));
                }
            }
            None => Token::Eof,
        };

        Ok(token)
    }
}

// Identifiers are letters only, so `x2` lexes as `x` followed by `2`.
fn is_letter(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_uppercase()
}
