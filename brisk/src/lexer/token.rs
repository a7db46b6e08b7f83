//! Token definitions

use logos::Logos;

/// Raw token shape within a single source line
///
/// The engine works on token text, so the lexer only needs to know where
/// one token ends and the next begins.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    /// Quoted string, quotes included. An unterminated string runs to end of line.
    #[regex(r#""[^"\n]*"?"#, |lex| lex.slice().to_owned())]
    Str(String),
    /// Any other run of non-blank characters: keywords, names, operators, numbers
    #[regex(r##"[^ \t\r\n\f"#]+"##, |lex| lex.slice().to_owned())]
    Word(String),
}

impl Token {
    pub fn into_text(self) -> String {
        match self {
            Token::Str(s) | Token::Word(s) => s,
        }
    }
}

/// Reserved words of the language
pub mod kw {
    pub const FUNC: &str = "func";
    pub const ENDFUNC: &str = "endfunc";
    pub const LAMBDA: &str = "lambda";
    pub const ENDLAMBDA: &str = "endlambda";
    pub const VAR: &str = "var";
    pub const ASSIGN: &str = "assign";
    pub const FUNCCALL: &str = "funccall";
    pub const RETURN: &str = "return";
    pub const IF: &str = "if";
    pub const ELSE: &str = "else";
    pub const ENDIF: &str = "endif";
    pub const WHILE: &str = "while";
    pub const ENDWHILE: &str = "endwhile";

    pub const INT: &str = "int";
    pub const BOOL: &str = "bool";
    pub const STRING: &str = "string";
    pub const VOID: &str = "void";
    pub const OBJECT: &str = "object";
    pub const REFINT: &str = "refint";
    pub const REFBOOL: &str = "refbool";
    pub const REFSTRING: &str = "refstring";

    pub const TRUE: &str = "true";
    pub const FALSE: &str = "false";

    pub const PRINT: &str = "print";
    pub const INPUT: &str = "input";
    pub const STRTOINT: &str = "strtoint";

    pub const MAIN: &str = "main";
    pub const THIS: &str = "this";

    /// Words that can never name a variable or parameter
    pub const RESERVED: &[&str] = &[
        FUNC, ENDFUNC, LAMBDA, ENDLAMBDA, VAR, ASSIGN, FUNCCALL, RETURN, IF, ELSE, ENDIF, WHILE,
        ENDWHILE, INT, BOOL, STRING, VOID, OBJECT, REFINT, REFBOOL, REFSTRING, TRUE, FALSE, PRINT,
        INPUT, STRTOINT, MAIN, THIS,
    ];

    pub fn is_reserved(word: &str) -> bool {
        RESERVED.contains(&word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_words() {
        assert!(kw::is_reserved("while"));
        assert!(kw::is_reserved("true"));
        assert!(kw::is_reserved("refint"));
        assert!(kw::is_reserved("this"));
        assert!(kw::is_reserved("main"));
        assert!(!kw::is_reserved("counter"));
    }
}
