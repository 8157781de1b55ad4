//! `CREATE TABLE IF NOT EXISTS` parser over the sqlparser tokenizer
//!
//! Grammar accepted by [`parse_table`] (keywords are case-insensitive):
//!
//! ```text
//! statement   := ... CREATE TABLE IF NOT EXISTS name '(' entry { ',' entry } ')' ...
//! name        := ident { '.' ident }
//! entry       := table_constraint | column
//! column      := ident type_words [ '(' ... ')' ] [ type_words ] { constraint }
//! constraint  := NOT NULL | NULL | PRIMARY KEY | UNIQUE | DEFAULT expr
//!              | REFERENCES name [ '(' ident ')' ] | CONSTRAINT ident | <skipped>
//! ```
//!
//! Anything before the header is ignored, as is anything after the closing
//! parenthesis of the column list.

use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::tokenizer::{Location, Token, TokenWithSpan, Tokenizer, Word};

use super::metadata::*;
use crate::codegen::remove_empty_rows;
use crate::error::SchemaError;

type ParseResult<T> = std::result::Result<T, SchemaError>;

/// Keywords that end a column's type and start its constraints
const CONSTRAINT_KEYWORDS: &[&str] = &[
    "NOT",
    "NULL",
    "PRIMARY",
    "UNIQUE",
    "DEFAULT",
    "REFERENCES",
    "CHECK",
    "CONSTRAINT",
    "GENERATED",
    "COLLATE",
];

/// Keywords that open a table-level constraint inside the column list
const TABLE_CONSTRAINT_KEYWORDS: &[&str] =
    &["PRIMARY", "FOREIGN", "UNIQUE", "CONSTRAINT", "CHECK", "EXCLUDE"];

/// Split a schema file into statements on `;`.
///
/// Terminators are found by the tokenizer, so semicolons inside quoted text or
/// comments do not split. The text after the last terminator is returned as
/// well, so callers must skip blank entries.
pub fn split_statements(sql: &str) -> ParseResult<Vec<&str>> {
    let dialect = PostgreSqlDialect {};
    let tokens = Tokenizer::new(&dialect, sql).tokenize_with_location()?;

    let mut statements = Vec::new();
    let mut start = 0;
    for token in tokens.iter().filter(|t| t.token == Token::SemiColon) {
        let end = byte_offset(sql, token.span.start);
        statements.push(&sql[start..end]);
        start = byte_offset(sql, token.span.end);
    }
    statements.push(&sql[start..]);
    Ok(statements)
}

/// True when a statement holds nothing but whitespace and comments
pub fn is_blank_statement(sql: &str) -> bool {
    let dialect = PostgreSqlDialect {};
    match Tokenizer::new(&dialect, sql).tokenize() {
        Ok(tokens) => tokens
            .iter()
            .all(|t| matches!(t, Token::Whitespace(_) | Token::EOF)),
        // let the parser report it
        Err(_) => false,
    }
}

/// Parse one `CREATE TABLE IF NOT EXISTS` statement.
///
/// Fails with [`SchemaError::TableNotFound`] when the statement carries no
/// table header, and with [`SchemaError::Syntax`] when the header is found but
/// the column list is malformed.
///
/// Blank lines are dropped before tokenizing, so reported line numbers count
/// non-blank lines only.
pub fn parse_table(ddl: &str) -> ParseResult<ParsedTable> {
    let ddl = remove_empty_rows(ddl);
    let dialect = PostgreSqlDialect {};
    let tokens = Tokenizer::new(&dialect, &ddl).tokenize_with_location()?;
    TableParser::new(&ddl, tokens).parse()
}

struct TableParser<'a> {
    source: &'a str,
    tokens: Vec<TokenWithSpan>,
    pos: usize,
}

impl<'a> TableParser<'a> {
    fn new(source: &'a str, tokens: Vec<TokenWithSpan>) -> Self {
        let tokens = tokens
            .into_iter()
            .filter(|t| !matches!(t.token, Token::Whitespace(_) | Token::EOF))
            .collect();
        Self {
            source,
            tokens,
            pos: 0,
        }
    }

    fn parse(mut self) -> ParseResult<ParsedTable> {
        self.pos = self.find_header().ok_or(SchemaError::TableNotFound)?;
        let name = self.parse_object_name("table name")?;
        self.expect(&Token::LParen, "expected '(' after table name")?;

        let mut columns = Vec::new();
        loop {
            match self.peek() {
                Some(Token::RParen) => {
                    self.pos += 1;
                    break;
                }
                None => return Err(self.error("unterminated column list, expected ')'")),
                _ => {}
            }

            if self.peek_any_keyword(TABLE_CONSTRAINT_KEYWORDS) {
                self.skip_entry()?;
            } else {
                columns.push(self.parse_column()?);
            }

            match self.peek() {
                Some(Token::Comma) => self.pos += 1,
                Some(Token::RParen) => {
                    self.pos += 1;
                    break;
                }
                None => return Err(self.error("unterminated column list, expected ')'")),
                Some(_) => return Err(self.error("expected ',' or ')'")),
            }
        }

        Ok(ParsedTable { name, columns })
    }

    /// Position right after `CREATE TABLE IF NOT EXISTS`
    fn find_header(&self) -> Option<usize> {
        const HEADER: [&str; 5] = ["CREATE", "TABLE", "IF", "NOT", "EXISTS"];
        (0..self.tokens.len()).find_map(|start| {
            let matched = HEADER.iter().enumerate().all(|(offset, kw)| {
                self.tokens
                    .get(start + offset)
                    .is_some_and(|t| is_keyword(&t.token, kw))
            });
            matched.then_some(start + HEADER.len())
        })
    }

    fn parse_column(&mut self) -> ParseResult<Column> {
        let name = match self.peek() {
            Some(Token::Word(word)) => word.value.clone(),
            _ => return Err(self.error("expected column name")),
        };
        self.pos += 1;

        let mut type_words = self.type_words();
        if type_words.is_empty() {
            return Err(self.error(&format!("expected type for column \"{}\"", name)));
        }
        if self.peek() == Some(&Token::LParen) {
            // length / precision suffix: varchar(255), numeric(10, 2)
            self.skip_parens()?;
            type_words.extend(self.type_words());
        }

        let constraints = self.parse_constraints()?;
        Ok(Column::new(name, type_words.join(" ")).with_constraints(constraints))
    }

    /// Consecutive words that are part of a type name
    fn type_words(&mut self) -> Vec<String> {
        let mut words = Vec::new();
        while let Some(Token::Word(word)) = self.peek() {
            if word.quote_style.is_none() && is_one_of(word, CONSTRAINT_KEYWORDS) {
                break;
            }
            words.push(word.value.clone());
            self.pos += 1;
        }
        words
    }

    fn parse_constraints(&mut self) -> ParseResult<Vec<ColumnConstraint>> {
        let mut constraints = Vec::new();
        loop {
            let Some(token) = self.peek().cloned() else {
                break;
            };
            match token {
                Token::Comma | Token::RParen => break,
                Token::LParen => self.skip_parens()?,
                _ if self.eat_keyword("NOT") => {
                    if self.eat_keyword("NULL") {
                        constraints.push(ColumnConstraint::NotNull);
                    }
                }
                _ if self.eat_keyword("NULL") => constraints.push(ColumnConstraint::Null),
                _ if self.eat_keyword("PRIMARY") => {
                    if self.eat_keyword("KEY") {
                        constraints.push(ColumnConstraint::PrimaryKey);
                    }
                }
                _ if self.eat_keyword("UNIQUE") => constraints.push(ColumnConstraint::Unique),
                _ if self.eat_keyword("DEFAULT") => {
                    let expr = self.default_expr()?;
                    constraints.push(ColumnConstraint::Default(expr));
                }
                _ if self.eat_keyword("REFERENCES") => {
                    let table = self.parse_object_name("referenced table")?;
                    let column = if self.peek() == Some(&Token::LParen) {
                        let column = match self.tokens.get(self.pos + 1).map(|t| &t.token) {
                            Some(Token::Word(word)) => Some(word.value.clone()),
                            _ => None,
                        };
                        self.skip_parens()?;
                        column
                    } else {
                        None
                    };
                    constraints.push(ColumnConstraint::References { table, column });
                }
                _ if self.eat_keyword("CONSTRAINT") => {
                    // constraint name
                    if matches!(self.peek(), Some(Token::Word(_))) {
                        self.pos += 1;
                    }
                }
                _ => self.pos += 1,
            }
        }
        Ok(constraints)
    }

    /// Source text of a DEFAULT expression
    fn default_expr(&mut self) -> ParseResult<String> {
        let first = self.pos;
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token {
                Token::LParen => depth += 1,
                Token::RParen if depth == 0 => break,
                Token::RParen => depth -= 1,
                Token::Comma if depth == 0 => break,
                _ if depth == 0
                    && self.pos > first
                    && self.peek_any_keyword(CONSTRAINT_KEYWORDS) =>
                {
                    break
                }
                _ => {}
            }
            self.pos += 1;
        }
        if self.pos == first {
            return Err(self.error("expected expression after DEFAULT"));
        }
        let start = self.tokens[first].span.start;
        let end = self.tokens[self.pos - 1].span.end;
        Ok(self.slice(start, end).trim().to_string())
    }

    /// `ident { '.' ident }`, returning the last part
    fn parse_object_name(&mut self, what: &str) -> ParseResult<String> {
        let mut name = match self.peek() {
            Some(Token::Word(word)) => word.value.clone(),
            _ => return Err(self.error(&format!("expected {}", what))),
        };
        self.pos += 1;
        while self.peek() == Some(&Token::Period) {
            self.pos += 1;
            match self.peek() {
                Some(Token::Word(word)) => name = word.value.clone(),
                _ => return Err(self.error(&format!("expected {} after '.'", what))),
            }
            self.pos += 1;
        }
        Ok(name)
    }

    /// Skip a table-level constraint up to the next top-level ',' or ')'
    fn skip_entry(&mut self) -> ParseResult<()> {
        while let Some(token) = self.peek() {
            match token {
                Token::Comma | Token::RParen => break,
                Token::LParen => self.skip_parens()?,
                _ => self.pos += 1,
            }
        }
        Ok(())
    }

    /// Skip a balanced parenthesized group starting at the current '('
    fn skip_parens(&mut self) -> ParseResult<()> {
        self.expect(&Token::LParen, "expected '('")?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.peek() {
                Some(Token::LParen) => depth += 1,
                Some(Token::RParen) => depth -= 1,
                Some(_) => {}
                None => return Err(self.error("unbalanced parentheses, expected ')'")),
            }
            self.pos += 1;
        }
        Ok(())
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn peek_any_keyword(&self, keywords: &[&str]) -> bool {
        matches!(self.peek(), Some(Token::Word(word)) if word.quote_style.is_none() && is_one_of(word, keywords))
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let found = self.peek().is_some_and(|t| is_keyword(t, keyword));
        if found {
            self.pos += 1;
        }
        found
    }

    fn expect(&mut self, expected: &Token, message: &str) -> ParseResult<()> {
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    fn error(&self, message: &str) -> SchemaError {
        let location = match self.tokens.get(self.pos) {
            Some(t) => t.span.start,
            None => self
                .tokens
                .last()
                .map(|t| t.span.end)
                .unwrap_or(Location::new(1, 1)),
        };
        SchemaError::Syntax {
            line: location.line,
            column: location.column,
            message: message.to_string(),
        }
    }

    /// Source text between two tokenizer locations (1-based line/column, end exclusive)
    fn slice(&self, start: Location, end: Location) -> &'a str {
        let from = byte_offset(self.source, start);
        let to = byte_offset(self.source, end).max(from);
        &self.source[from..to]
    }
}

fn is_keyword(token: &Token, keyword: &str) -> bool {
    matches!(token, Token::Word(word) if word.quote_style.is_none() && word.value.eq_ignore_ascii_case(keyword))
}

fn is_one_of(word: &Word, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| word.value.eq_ignore_ascii_case(kw))
}

fn byte_offset(source: &str, location: Location) -> usize {
    let mut offset = 0;
    for (index, line) in source.split_inclusive('\n').enumerate() {
        if index as u64 + 1 == location.line {
            let column = location.column.saturating_sub(1) as usize;
            return offset
                + line
                    .char_indices()
                    .nth(column)
                    .map(|(i, _)| i)
                    .unwrap_or(line.len());
        }
        offset += line.len();
    }
    source.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::MappedType;

    fn names_and_types(table: &ParsedTable) -> Vec<(&str, &str)> {
        table
            .columns
            .iter()
            .map(|c| (c.name.as_str(), c.sql_type.as_str()))
            .collect()
    }

    #[test]
    fn test_parse_simple_table() {
        let sql = r#"
            CREATE TABLE IF NOT EXISTS "branch" (
                "id" uuid PRIMARY KEY,
                "name" varchar(100) NOT NULL,
                "created_at" timestamp,
                "updated_at" timestamp
            )
        "#;

        let table = parse_table(sql).unwrap();
        assert_eq!(table.name, "branch");
        assert_eq!(
            names_and_types(&table),
            vec![
                ("id", "uuid"),
                ("name", "varchar"),
                ("created_at", "timestamp"),
                ("updated_at", "timestamp"),
            ]
        );
        assert!(table.columns[0].is_primary_key());
        assert!(table.columns[1].is_not_null());
        assert_eq!(table.columns[1].mapped_type, MappedType::String);
    }

    #[test]
    fn test_blank_lines_and_suffixes() {
        let sql = "CREATE TABLE IF NOT EXISTS \"product\" (\n\n   \n\
                   \"id\" uuid NOT NULL,\n\n\
                   \"price\" numeric(12, 2) DEFAULT 0,\n\
                   \t\n\
                   \"status\" varchar(20) DEFAULT 'draft' NOT NULL,\n\
                   \"count\" integer\n)";

        let table = parse_table(sql).unwrap();
        assert_eq!(
            names_and_types(&table),
            vec![
                ("id", "uuid"),
                ("price", "numeric"),
                ("status", "varchar"),
                ("count", "integer"),
            ]
        );
        assert_eq!(table.columns[1].default_value(), Some("0"));
        assert_eq!(table.columns[2].default_value(), Some("'draft'"));
        assert!(table.columns[2].is_not_null());
    }

    #[test]
    fn test_case_insensitive_header_and_bare_names() {
        let sql = "create table if not exists public.tender (id UUID, total DOUBLE PRECISION)";
        let table = parse_table(sql).unwrap();
        assert_eq!(table.name, "tender");
        assert_eq!(
            names_and_types(&table),
            vec![("id", "UUID"), ("total", "DOUBLE PRECISION")]
        );
        assert_eq!(table.columns[1].mapped_type, MappedType::Double);
    }

    #[test]
    fn test_multi_word_type_with_suffix() {
        let sql = r#"CREATE TABLE IF NOT EXISTS "client" ("phone" character varying(32), "at" timestamp(3) without time zone)"#;
        let table = parse_table(sql).unwrap();
        assert_eq!(table.columns[0].sql_type, "character varying");
        assert_eq!(table.columns[0].mapped_type, MappedType::String);
        assert_eq!(table.columns[1].sql_type, "timestamp without time zone");
        assert_eq!(table.columns[1].mapped_type, MappedType::String);
    }

    #[test]
    fn test_unknown_type_kept_verbatim() {
        let sql = r#"CREATE TABLE IF NOT EXISTS "geo" ("shape" geometry, "meta" jsonb)"#;
        let table = parse_table(sql).unwrap();
        assert_eq!(table.columns[0].sql_type, "geometry");
        assert_eq!(table.columns[0].mapped_type, MappedType::Any);
        assert_eq!(table.columns[1].mapped_type, MappedType::Any);
    }

    #[test]
    fn test_default_function_call_and_references() {
        let sql = r#"
            CREATE TABLE IF NOT EXISTS "transfer_send" (
                "id" uuid PRIMARY KEY DEFAULT gen_random_uuid(),
                "branch_id" uuid REFERENCES "branch"("id") ON DELETE CASCADE,
                "created_at" timestamp DEFAULT now() NOT NULL
            );
        "#;
        let table = parse_table(sql).unwrap();
        assert_eq!(table.columns.len(), 3);
        assert_eq!(table.columns[0].default_value(), Some("gen_random_uuid()"));
        assert!(table.columns[0].is_primary_key());
        assert_eq!(
            table.columns[1].constraints,
            vec![ColumnConstraint::References {
                table: "branch".to_string(),
                column: Some("id".to_string()),
            }]
        );
        assert_eq!(table.columns[2].default_value(), Some("now()"));
        assert!(table.columns[2].is_not_null());
    }

    #[test]
    fn test_table_constraints_are_skipped() {
        let sql = r#"
            CREATE TABLE IF NOT EXISTS "tender_product" (
                "tender_id" uuid NOT NULL,
                "product_id" uuid NOT NULL,
                PRIMARY KEY ("tender_id", "product_id"),
                CONSTRAINT fk_tender FOREIGN KEY ("tender_id") REFERENCES "tender"("id")
            )
        "#;
        let table = parse_table(sql).unwrap();
        assert_eq!(
            names_and_types(&table),
            vec![("tender_id", "uuid"), ("product_id", "uuid")]
        );
    }

    #[test]
    fn test_leading_comment_is_ignored() {
        let sql = "-- branches of the warehouse\nCREATE TABLE IF NOT EXISTS \"branch\" (\"id\" uuid)";
        assert_eq!(parse_table(sql).unwrap().name, "branch");
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(
            parse_table("CREATE INDEX idx_name ON branch (name)"),
            Err(SchemaError::TableNotFound)
        );
        assert_eq!(
            parse_table(r#"CREATE TABLE "branch" ("id" uuid)"#),
            Err(SchemaError::TableNotFound)
        );
        assert_eq!(parse_table(""), Err(SchemaError::TableNotFound));
    }

    #[test]
    fn test_syntax_errors_carry_location() {
        let err = parse_table("CREATE TABLE IF NOT EXISTS \"branch\"\n  \"id\" uuid").unwrap_err();
        assert_eq!(
            err,
            SchemaError::Syntax {
                line: 2,
                column: 3,
                message: "expected '(' after table name".to_string(),
            }
        );

        let err = parse_table("CREATE TABLE IF NOT EXISTS \"branch\" (\"id\" uuid,").unwrap_err();
        assert!(matches!(err, SchemaError::Syntax { .. }));

        let err = parse_table("CREATE TABLE IF NOT EXISTS \"branch\" (\"id\" NOT NULL)").unwrap_err();
        assert!(err.to_string().contains("expected type for column \"id\""));
    }

    #[test]
    fn test_blank_statement() {
        assert!(is_blank_statement("  \n\t"));
        assert!(is_blank_statement("-- nothing here\n/* or here */"));
        assert!(!is_blank_statement("CREATE TABLE IF NOT EXISTS x (y int)"));
    }

    #[test]
    fn test_split_statements() {
        let sql = "CREATE TABLE IF NOT EXISTS \"a\" (\"x\" text DEFAULT ';');\n\
                   -- trailing; comment\n\
                   CREATE TABLE IF NOT EXISTS \"b\" (\"y\" text);\n";
        let statements = split_statements(sql).unwrap();
        assert_eq!(statements.len(), 3);
        assert!(statements[0].ends_with("DEFAULT ';')"));
        assert!(statements[1].starts_with("\n-- trailing; comment\n"));
        assert!(statements[1].contains("\"b\""));
        assert_eq!(statements[2], "\n");
    }

    #[test]
    fn test_split_ignores_block_comments_and_quoted_identifiers() {
        let sql = "/* a; b */ CREATE TABLE IF NOT EXISTS \"x;y\" (\"v\" text);\n\
                   CREATE TABLE IF NOT EXISTS \"z\" (\"w\" int)";
        let statements = split_statements(sql).unwrap();
        assert_eq!(statements.len(), 2);
        assert_eq!(parse_table(statements[0]).unwrap().name, "x;y");
        assert_eq!(parse_table(statements[1]).unwrap().name, "z");
    }

    #[test]
    fn test_split_unterminated_quote() {
        let err = split_statements("CREATE TABLE IF NOT EXISTS \"a\" (\"x\" text DEFAULT 'oops);")
            .unwrap_err();
        assert!(matches!(err, SchemaError::Tokenize(_)));
    }
}
