//! Identifier and token formatting helpers for the fragment parser.

use sqlparser::tokenizer::{Token, Word};

/// Words that end a table source or select element instead of naming an alias.
const RESERVED_WORDS: &[&str] = &[
    "ALTER", "AND", "APPLY", "AS", "BEGIN", "BETWEEN", "BREAK", "BY", "CASE", "CATCH", "CLOSE",
    "COMMIT", "CONTINUE", "CREATE", "CROSS", "CURSOR", "DEALLOCATE", "DECLARE", "DELETE",
    "DENY", "DROP", "ELSE", "END", "EXCEPT", "EXEC", "EXECUTE", "EXISTS", "FETCH", "FOR",
    "FROM", "FULL", "GO", "GOTO", "GRANT", "GROUP", "HAVING", "IF", "IN", "INNER", "INSERT",
    "INTERSECT", "INTO", "IS", "JOIN", "LEFT", "LIKE", "MERGE", "NOT", "NULL", "ON", "OPEN",
    "OPTION", "OR", "ORDER", "OUTER", "OUTPUT", "PRINT", "RAISERROR", "RETURN", "REVOKE",
    "RIGHT", "ROLLBACK", "SAVE", "SELECT", "SET", "THEN", "THROW", "TRUNCATE", "UNION",
    "UPDATE", "USE", "USING", "VALUES", "WAITFOR", "WHEN", "WHERE", "WHILE", "WITH",
];

/// Whether an unquoted word is reserved (and so can never be an alias).
pub fn is_reserved_word(word: &Word) -> bool {
    word.quote_style.is_none()
        && RESERVED_WORDS
            .iter()
            .any(|r| r.eq_ignore_ascii_case(&word.value))
}

/// Converts a Word token to a string, preserving its quote style.
pub fn format_word(word: &Word) -> String {
    match word.quote_style {
        Some('[') => format!("[{}]", word.value),
        Some('"') => format!("\"{}\"", word.value),
        _ => word.value.clone(),
    }
}

/// Converts a token to its source representation.
pub fn format_token(token: &Token) -> String {
    match token {
        Token::Word(w) => format_word(w),
        Token::Number(n, _) => n.clone(),
        Token::SingleQuotedString(s) => format!("'{}'", s.replace('\'', "''")),
        Token::NationalStringLiteral(s) => format!("N'{}'", s.replace('\'', "''")),
        Token::HexStringLiteral(s) => format!("0x{}", s),
        Token::LParen => "(".to_string(),
        Token::RParen => ")".to_string(),
        Token::Comma => ",".to_string(),
        Token::Period => ".".to_string(),
        Token::SemiColon => ";".to_string(),
        Token::Eq => "=".to_string(),
        Token::Neq => "<>".to_string(),
        Token::Lt => "<".to_string(),
        Token::Gt => ">".to_string(),
        Token::LtEq => "<=".to_string(),
        Token::GtEq => ">=".to_string(),
        Token::Plus => "+".to_string(),
        Token::Minus => "-".to_string(),
        Token::Mul => "*".to_string(),
        Token::Div => "/".to_string(),
        Token::Mod => "%".to_string(),
        Token::Sharp => "#".to_string(),
        _ => token.to_string(),
    }
}

/// Joins token texts into compact SQL: no space before `(`, `)`, `,` and `.`,
/// none after `(` and `.`.
pub fn join_tokens<'a>(tokens: impl IntoIterator<Item = &'a Token>) -> String {
    let mut out = String::new();
    let mut previous: Option<&Token> = None;
    for token in tokens {
        let glue = match (previous, token) {
            (None, _) => false,
            (_, Token::LParen | Token::RParen | Token::Comma | Token::Period) => false,
            (Some(Token::LParen | Token::Period), _) => false,
            (Some(Token::Comma), _) => true,
            _ => true,
        };
        if glue {
            out.push(' ');
        }
        out.push_str(&format_token(token));
        previous = Some(token);
    }
    out
}
