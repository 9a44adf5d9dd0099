#![allow(
    clippy::unwrap_used,
    reason = "test assertions use unwrap for clarity"
)]

use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use stencil_ir::{Token, TokenKind};

fn lex(source: &str) -> Vec<Token> {
    tokenize(source, &Delimiters::default()).unwrap()
}

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).into_iter().map(|t| t.kind).collect()
}

fn pairs(source: &str) -> Vec<(TokenKind, String)> {
    lex(source)
        .into_iter()
        .map(|t| (t.kind, t.literal))
        .collect()
}

#[test]
fn test_simple_expression_region() {
    assert_eq!(
        pairs("<%= 1 %>"),
        vec![
            (TokenKind::ExprStart, "<%=".to_string()),
            (TokenKind::Int, "1".to_string()),
            (TokenKind::RegionEnd, "%>".to_string()),
            (TokenKind::Eof, String::new()),
        ]
    );
}

#[test]
fn test_text_around_region() {
    assert_eq!(
        pairs(r#"<p class="foo"><%= 1 %></p>"#),
        vec![
            (TokenKind::Text, r#"<p class="foo">"#.to_string()),
            (TokenKind::ExprStart, "<%=".to_string()),
            (TokenKind::Int, "1".to_string()),
            (TokenKind::RegionEnd, "%>".to_string()),
            (TokenKind::Text, "</p>".to_string()),
            (TokenKind::Eof, String::new()),
        ]
    );
}

#[test]
fn test_language_tokens() {
    let source = r#"<% let add = fn(x, y) { x + y; };
!-/*5; 5 < 10 > 5;
if (5 <= 10) { return true; } else { return false; }
10 == 10; 10 != 9; a ~= "b" && c || d
[1, 2]; {"foo": 1.5}; x.y %>"#;
    use TokenKind as K;
    assert_eq!(
        kinds(source),
        vec![
            K::StmtStart, K::Let, K::Ident, K::Assign, K::Fn, K::LParen, K::Ident, K::Comma,
            K::Ident, K::RParen, K::LBrace, K::Ident, K::Plus, K::Ident, K::Semicolon, K::RBrace,
            K::Semicolon, K::Bang, K::Minus, K::Slash, K::Star, K::Int, K::Semicolon, K::Int,
            K::Lt, K::Int, K::Gt, K::Int, K::Semicolon, K::If, K::LParen, K::Int, K::LtEq,
            K::Int, K::RParen, K::LBrace, K::Return, K::True, K::Semicolon, K::RBrace, K::Else,
            K::LBrace, K::Return, K::False, K::Semicolon, K::RBrace, K::Int, K::EqEq, K::Int,
            K::Semicolon, K::Int, K::NotEq, K::Int, K::Semicolon, K::Ident, K::Matches,
            K::String, K::AndAnd, K::Ident, K::OrOr, K::Ident, K::LBracket, K::Int, K::Comma,
            K::Int, K::RBracket, K::Semicolon, K::LBrace, K::String, K::Colon, K::Float,
            K::RBrace, K::Semicolon, K::Ident, K::Dot, K::Ident, K::RegionEnd, K::Eof,
        ]
    );
}

#[test]
fn test_keywords() {
    use TokenKind as K;
    assert_eq!(
        kinds("<% for in break continue nil func %>"),
        vec![
            K::StmtStart, K::For, K::In, K::Break, K::Continue, K::Nil, K::Fn, K::RegionEnd,
            K::Eof,
        ]
    );
}

#[test]
fn test_identifiers_may_contain_digits() {
    let tokens = lex("<%= h1 + 2x %>");
    assert_eq!(tokens[1].kind, TokenKind::Ident);
    assert_eq!(tokens[1].literal, "h1");
    // `2x` is a number followed by an identifier.
    assert_eq!(tokens[3].kind, TokenKind::Int);
    assert_eq!(tokens[4].kind, TokenKind::Ident);
    assert_eq!(tokens[4].literal, "x");
}

#[test]
fn test_numbers() {
    let tokens = lex("<%= 1.23 42 7. %>");
    assert_eq!(tokens[1].kind, TokenKind::Float);
    assert_eq!(tokens[1].literal, "1.23");
    assert_eq!(tokens[2].kind, TokenKind::Int);
    // A trailing dot is member access, not a float.
    assert_eq!(tokens[3].kind, TokenKind::Int);
    assert_eq!(tokens[4].kind, TokenKind::Dot);
}

#[test]
fn test_string_escapes() {
    let tokens = lex(r#"<%= "a\"b\n\\c\q" %>"#);
    assert_eq!(tokens[1].kind, TokenKind::String);
    assert_eq!(tokens[1].literal, "a\"b\n\\c\\q");
}

#[test]
fn test_backtick_strings_are_raw() {
    let tokens = lex(r#"<%= `say "hi" \n` %>"#);
    assert_eq!(tokens[1].kind, TokenKind::String);
    assert_eq!(tokens[1].literal, r#"say "hi" \n"#);
}

#[test]
fn test_unterminated_string() {
    let err = tokenize("<%= \"abc %>", &Delimiters::default()).unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnterminatedString);
    assert_eq!(err.to_string(), "line 1: unterminated string literal");
}

#[test]
fn test_illegal_character() {
    let err = tokenize("\n<%= a @ b %>", &Delimiters::default()).unwrap_err();
    assert_eq!(err.kind, LexErrorKind::IllegalCharacter('@'));
    assert_eq!(err.line, 2);
}

#[test]
fn test_comments_are_dropped() {
    assert_eq!(
        pairs("a<%# one %>b<%# two\nlines %>c"),
        vec![
            (TokenKind::Text, "a".to_string()),
            (TokenKind::Text, "b".to_string()),
            (TokenKind::Text, "c".to_string()),
            (TokenKind::Eof, String::new()),
        ]
    );
}

#[test]
fn test_nested_regions_inside_comments_are_dropped() {
    let expected = vec![
        (TokenKind::Text, "tail".to_string()),
        (TokenKind::Eof, String::new()),
    ];
    assert_eq!(pairs("<%# a <%= x %> b %>tail"), expected);
    assert_eq!(pairs("<%# <%# inner %> outer %>tail"), expected);
    assert_eq!(pairs("<%# <% if (a) { %>\n<% } %> %>tail"), expected);
}

#[test]
fn test_unbalanced_comment_runs_to_end() {
    assert_eq!(kinds("a<%# <%= x %> never closed"), vec![TokenKind::Text, TokenKind::Eof]);
}

#[test]
fn test_comment_advances_line() {
    let tokens = lex("<%# a\nb\nc %><%= x %>");
    assert_eq!(tokens[0].kind, TokenKind::ExprStart);
    assert_eq!(tokens[0].line, 3);
}

#[test]
fn test_hole_body_is_verbatim() {
    let tokens = lex("x<%H  \"testing\" + y %>z");
    assert_eq!(tokens[1].kind, TokenKind::Hole);
    assert_eq!(tokens[1].literal, "  \"testing\" + y ");
    assert_eq!(tokens[2].kind, TokenKind::Text);
    assert_eq!(tokens[2].literal, "z");
}

#[test]
fn test_line_numbers_span_text() {
    let tokens = lex("<p>\n<%= a %>\n\n<% b %>");
    let ident_lines: Vec<u32> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Ident)
        .map(|t| t.line)
        .collect();
    assert_eq!(ident_lines, vec![2, 4]);
}

#[test]
fn test_line_numbers_inside_code() {
    let tokens = lex("<% let a = 1\nlet b = 2\n\nlet c = 3 %>");
    let let_lines: Vec<u32> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Let)
        .map(|t| t.line)
        .collect();
    assert_eq!(let_lines, vec![1, 2, 4]);
}

#[test]
fn test_escaped_opener_is_text() {
    assert_eq!(
        pairs(r"a\<%= b %>"),
        vec![
            (TokenKind::Text, "a<%= b %>".to_string()),
            (TokenKind::Eof, String::new()),
        ]
    );
}

#[test]
fn test_escaped_backslash_before_opener() {
    let tokens = lex(r#"C:\\<%= "temp" %>"#);
    assert_eq!(tokens[0].kind, TokenKind::Text);
    assert_eq!(tokens[0].literal, r"C:\");
    assert_eq!(tokens[1].kind, TokenKind::ExprStart);
}

#[test]
fn test_remapped_delimiters() {
    let delims = Delimiters::new("{{", "}}").unwrap();
    let tokens = tokenize("a{{= b }}c{{# gone }}{{H d }}", &delims).unwrap();
    let got: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        got,
        vec![
            TokenKind::Text,
            TokenKind::ExprStart,
            TokenKind::Ident,
            TokenKind::RegionEnd,
            TokenKind::Text,
            TokenKind::Hole,
            TokenKind::Eof,
        ]
    );
    // The default spelling is plain text under a remapped set.
    let tokens = tokenize("<%= x %>", &delims).unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Text);
}

#[test]
fn test_eof_forever() {
    let mut lexer = Lexer::new("<%= 1");
    let mut last = lexer.next_token();
    for _ in 0..5 {
        last = lexer.next_token();
    }
    assert_eq!(last.kind, TokenKind::Eof);
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
}

#[test]
fn test_unterminated_final_region() {
    assert_eq!(
        kinds("<% let x = 1"),
        vec![
            TokenKind::StmtStart,
            TokenKind::Let,
            TokenKind::Ident,
            TokenKind::Assign,
            TokenKind::Int,
            TokenKind::Eof
        ]
    );
}

proptest! {
    #[test]
    fn prop_text_only_is_one_token(text in "[^<\\\\]{1,64}") {
        let tokens = lex(&text);
        prop_assert_eq!(tokens.len(), 2);
        prop_assert_eq!(tokens[0].kind, TokenKind::Text);
        prop_assert_eq!(&tokens[0].literal, &text);
    }
}
