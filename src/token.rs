use std::fmt;

/// Enum representing common lexeme types.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Eof,

    Ident(String),
    /// Numeric literal, carrying the raw lexeme. The parser converts it.
    Number(String),
    Str(String),

    /// "="
    Assign,
    /// "+"
    Plus,
    /// "-"
    Minus,
    /// "!"
    Bang,
    /// "*"
    Asterisk,
    /// "/"
    Slash,
    /// "%"
    Percent,
    /// "=="
    Eq,
    /// "!="
    Ne,
    /// "<"
    Lt,
    /// "<="
    Le,
    /// ">"
    Gt,
    /// ">="
    Ge,
    /// "("
    OpenParen,
    /// ")"
    CloseParen,
    /// "{"
    OpenBrace,
    /// "}"
    CloseBrace,
    /// "["
    OpenBracket,
    /// "]"
    CloseBracket,
    /// ","
    Comma,
    /// ";"
    SemiColon,

    // Keywords
    /// "declare"
    Declare,
    /// "const"
    Const,
    /// "if"
    If,
    /// "elif"
    Elif,
    /// "else"
    Else,
    /// "while"
    While,
    /// "fdeclare"
    FDeclare,
    /// "return"
    Return,
}

pub fn lookup_ident(ident: &str) -> Token {
    keyword_to_token(ident).unwrap_or_else(|| Token::Ident(ident.to_owned()))
}

fn keyword_to_token(keyword: &str) -> Option<Token> {
    match keyword {
        "declare" => Some(Token::Declare),
        "const" => Some(Token::Const),
        "if" => Some(Token::If),
        "elif" => Some(Token::Elif),
        "else" => Some(Token::Else),
        "while" => Some(Token::While),
        "fdeclare" => Some(Token::FDeclare),
        "return" => Some(Token::Return),
        _ => None,
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Eof => write!(f, "end of input"),
            Token::Ident(name) => write!(f, "identifier '{}'", name),
            Token::Number(text) => write!(f, "number '{}'", text),
            Token::Str(text) => write!(f, "string \"{}\"", text),
            Token::Assign => write!(f, "'='"),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::Bang => write!(f, "'!'"),
            Token::Asterisk => write!(f, "'*'"),
            Token::Slash => write!(f, "'/'"),
            Token::Percent => write!(f, "'%'"),
            Token::Eq => write!(f, "'=='"),
            Token::Ne => write!(f, "'!='"),
            Token::Lt => write!(f, "'<'"),
            Token::Le => write!(f, "'<='"),
            Token::Gt => write!(f, "'>'"),
            Token::Ge => write!(f, "'>='"),
            Token::OpenParen => write!(f, "'('"),
            Token::CloseParen => write!(f, "')'"),
            Token::OpenBrace => write!(f, "'{{'"),
            Token::CloseBrace => write!(f, "'}}'"),
            Token::OpenBracket => write!(f, "'['"),
            Token::CloseBracket => write!(f, "']'"),
            Token::Comma => write!(f, "','"),
            Token::SemiColon => write!(f, "';'"),
            Token::Declare => write!(f, "'declare'"),
            Token::Const => write!(f, "'const'"),
            Token::If => write!(f, "'if'"),
            Token::Elif => write!(f, "'elif'"),
            Token::Else => write!(f, "'else'"),
            Token::While => write!(f, "'while'"),
            Token::FDeclare => write!(f, "'fdeclare'"),
            Token::Return => write!(f, "'return'"),
        }
    }
}
