use log::debug;

#[allow(non_camel_case_types)]
#[derive(Debug, Clone)]
pub enum TokenType {
    // Single-character tokens.
    LEFT_PAREN,
    RIGHT_PAREN,
    LEFT_BRACE,
    RIGHT_BRACE,
    COMMA,
    DOT,
    MINUS,
    PLUS,
    SEMICOLON,
    SLASH,
    STAR,

    // One or two character tokens.
    BANG,
    BANG_EQUAL,
    EQUAL,
    EQUAL_EQUAL,
    GREATER,
    GREATER_EQUAL,
    LESS,
    LESS_EQUAL,

    // Literals.
    IDENTIFIER,
    STRING(String),
    NUMBER(f64),

    // Keywords.
    AND,
    CLASS,
    ELSE,
    FALSE,
    FUN,
    FOR,
    IF,
    IN,
    LET,
    NIL,
    OR,
    PRINT,
    RETURN,
    SUPER,
    THIS,
    TRUE,
    VAR,
    WHILE,

    // Special Characters
    EOF,
}

/// Kind-only equality: the literal payloads of `NUMBER` and `STRING` are
/// ignored, so the parser can probe the stream with sentinel values like
/// `TokenType::NUMBER(0.0)`.
impl PartialEq for TokenType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TokenType::NUMBER(_), TokenType::NUMBER(_)) => true,
            (TokenType::STRING(_), TokenType::STRING(_)) => true,
            (TokenType::LEFT_PAREN, TokenType::LEFT_PAREN)
            | (TokenType::RIGHT_PAREN, TokenType::RIGHT_PAREN)
            | (TokenType::LEFT_BRACE, TokenType::LEFT_BRACE)
            | (TokenType::RIGHT_BRACE, TokenType::RIGHT_BRACE)
            | (TokenType::COMMA, TokenType::COMMA)
            | (TokenType::DOT, TokenType::DOT)
            | (TokenType::MINUS, TokenType::MINUS)
            | (TokenType::PLUS, TokenType::PLUS)
            | (TokenType::SEMICOLON, TokenType::SEMICOLON)
            | (TokenType::SLASH, TokenType::SLASH)
            | (TokenType::STAR, TokenType::STAR)
            | (TokenType::BANG, TokenType::BANG)
            | (TokenType::BANG_EQUAL, TokenType::BANG_EQUAL)
            | (TokenType::EQUAL, TokenType::EQUAL)
            | (TokenType::EQUAL_EQUAL, TokenType::EQUAL_EQUAL)
            | (TokenType::GREATER, TokenType::GREATER)
            | (TokenType::GREATER_EQUAL, TokenType::GREATER_EQUAL)
            | (TokenType::LESS, TokenType::LESS)
            | (TokenType::LESS_EQUAL, TokenType::LESS_EQUAL)
            | (TokenType::IDENTIFIER, TokenType::IDENTIFIER)
            | (TokenType::AND, TokenType::AND)
            | (TokenType::CLASS, TokenType::CLASS)
            | (TokenType::ELSE, TokenType::ELSE)
            | (TokenType::FALSE, TokenType::FALSE)
            | (TokenType::FUN, TokenType::FUN)
            | (TokenType::FOR, TokenType::FOR)
            | (TokenType::IF, TokenType::IF)
            | (TokenType::IN, TokenType::IN)
            | (TokenType::LET, TokenType::LET)
            | (TokenType::NIL, TokenType::NIL)
            | (TokenType::OR, TokenType::OR)
            | (TokenType::PRINT, TokenType::PRINT)
            | (TokenType::RETURN, TokenType::RETURN)
            | (TokenType::SUPER, TokenType::SUPER)
            | (TokenType::THIS, TokenType::THIS)
            | (TokenType::TRUE, TokenType::TRUE)
            | (TokenType::VAR, TokenType::VAR)
            | (TokenType::WHILE, TokenType::WHILE)
            | (TokenType::EOF, TokenType::EOF) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    /// 0-indexed line of the token's first character.
    pub line: usize,
}

impl Token {
    pub fn new(token_type: TokenType, lexeme: String, line: usize) -> Self {
        debug!(
            "Creating token: type={:?}, lexeme={}, line={}",
            token_type, lexeme, line
        );
        Self {
            token_type,
            lexeme,
            line,
        }
    }
}
