use tracing::debug;

use crate::ast::{CommandKind, ParsedCommand, Predicate};
use crate::tokenizer::{Token, Tokenizer};
use crate::{ColumnDef, DataType, Value};

/// Turns a statement into a [ParsedCommand]. This never fails.
///
/// The leading keyword(s) decide the command kind; an unknown one gives a
/// [CommandKind::Invalid] command. When the keyword is known but the rest of
/// the statement does not fit the grammar, the command keeps its kind but
/// every other field is empty and `valid` is `false`.
///
/// # Example
/// ```
/// use minisql::{parse, ast::CommandKind, Value};
///
/// let cmd = parse("SELECT * FROM users WHERE id = 1;");
/// assert_eq!(cmd.kind, CommandKind::Select);
/// assert_eq!(cmd.table, "users");
/// assert_eq!(cmd.predicate.unwrap().value, Value::Integer(1));
///
/// assert_eq!(parse("DROP TABLE users").kind, CommandKind::Invalid);
/// assert!(!parse("SELECT FROM").valid);
/// ```
pub fn parse(statement: &str) -> ParsedCommand {
    let kind = detect_kind(statement);
    if kind == CommandKind::Invalid {
        debug!(statement, "unrecognized statement");
        return ParsedCommand::invalid();
    }

    let parsed = Tokenizer::new(statement)
        .tokenize()
        .and_then(|tokens| Parser::new(tokens).parse(kind));

    match parsed {
        Ok(command) => command,
        Err(reason) => {
            debug!(?kind, %reason, statement, "malformed statement");
            ParsedCommand::empty(kind)
        }
    }
}

/// Looks at the first two words only, ignoring case.
fn detect_kind(statement: &str) -> CommandKind {
    let mut words = statement
        .split(|c: char| c.is_whitespace() || matches!(c, '(' | '*' | ';'))
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_uppercase);

    let first = words.next();
    let second = words.next();

    match (first.as_deref(), second.as_deref()) {
        (Some("CREATE"), Some("TABLE")) => CommandKind::CreateTable,
        (Some("INSERT"), Some("INTO")) => CommandKind::Insert,
        (Some("SELECT"), _) => CommandKind::Select,
        (Some("UPDATE"), _) => CommandKind::Update,
        (Some("DELETE"), Some("FROM")) => CommandKind::Delete,
        _ => CommandKind::Invalid,
    }
}

/// `\w+`: letters, digits and underscores only.
fn is_name(raw: &str) -> bool {
    !raw.is_empty() && raw.chars().all(|c| c.is_alphanumeric() || c == '_')
}

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parses the whole token stream as a statement of `kind`.
    pub fn parse(&mut self, kind: CommandKind) -> Result<ParsedCommand, String> {
        let command = match kind {
            CommandKind::CreateTable => self.parse_create_table(),
            CommandKind::Insert => self.parse_insert(),
            CommandKind::Select => self.parse_select(),
            CommandKind::Update => self.parse_update(),
            CommandKind::Delete => self.parse_delete(),
            CommandKind::Invalid => Err("not a supported statement".into()),
        }?;

        // the terminator is optional
        if matches!(self.current_token(), Token::Semicolon) {
            self.advance();
        }

        // Check we are at the end of the statement
        if !self.is_at_end() {
            return Err(format!(
                "Unexpected token after statement: {:?}",
                self.current_token()
            ));
        }

        Ok(command)
    }

    //helpers
    fn current_token(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current_token(), Token::Eof)
    }

    fn consume(&mut self, expected: Token) -> Result<(), String> {
        if *self.current_token() == expected {
            self.advance();
            Ok(())
        } else {
            Err(format!(
                "Expected {:?}, found {:?}",
                expected,
                self.current_token()
            ))
        }
    }

    /// Reads a name. Keywords are accepted as names wherever the grammar
    /// expects one, and so is a digit-led word such as `2fa`.
    fn consume_ident(&mut self) -> Result<String, String> {
        let name = match self.current_token() {
            Token::Number(raw) if is_name(raw) => raw.clone(),
            token => match token.as_word() {
                Some(word) => word.to_string(),
                None => {
                    return Err(format!(
                        "Expected identifier, found {:?}",
                        self.current_token()
                    ));
                }
            },
        };
        self.advance();
        Ok(name)
    }

    /// Reads a literal. Quoted strings are text; numbers and bare words go
    /// through [Value::parse_literal].
    fn consume_literal(&mut self) -> Result<Value, String> {
        let value = match self.current_token() {
            Token::String(string) => Value::Text(string.as_str().into()),
            Token::Number(raw) => Value::parse_literal(raw),
            token => match token.as_word() {
                Some(word) => Value::parse_literal(word),
                None => return Err(format!("Expected a literal, found {:?}", token)),
            },
        };
        self.advance();
        Ok(value)
    }

    /// `ident (, ident)*` until `end` (not consumed).
    fn parse_ident_list(&mut self) -> Result<Vec<String>, String> {
        let mut idents = vec![self.consume_ident()?];
        while matches!(self.current_token(), Token::Comma) {
            self.advance();
            idents.push(self.consume_ident()?);
        }
        Ok(idents)
    }

    /// `( lit (, lit)* )`
    fn parse_literal_list(&mut self) -> Result<Vec<Value>, String> {
        self.consume(Token::LeftParen)?;
        let mut values = vec![self.consume_literal()?];
        while matches!(self.current_token(), Token::Comma) {
            self.advance();
            values.push(self.consume_literal()?);
        }
        self.consume(Token::RightParen)?;
        Ok(values)
    }

    /// `col = lit`
    fn parse_equality(&mut self) -> Result<Predicate, String> {
        let column = self.consume_ident()?;
        self.consume(Token::Equal)?;
        let value = self.consume_literal()?;
        Ok(Predicate { column, value })
    }

    /// Reads one column definition, up to the next top-level `,` or `)`.
    ///
    /// Word 0 is the name and word 1 the type; the remaining words are scanned
    /// for `PRIMARY KEY` and `NOT NULL`. Literals and parenthesized groups
    /// such as `VARCHAR(255)` or `DEFAULT 0` are skipped. A definition with
    /// fewer than two words is dropped.
    fn parse_column_def(&mut self) -> Result<Option<ColumnDef>, String> {
        let mut words: Vec<String> = vec![];
        let mut depth = 0usize;
        loop {
            match self.current_token() {
                Token::Eof => break,
                Token::Comma | Token::RightParen if depth == 0 => break,
                Token::LeftParen => depth += 1,
                Token::RightParen => depth -= 1,
                Token::Number(raw) if depth == 0 && is_name(raw) => words.push(raw.clone()),
                token if depth == 0 => {
                    if let Some(word) = token.as_word() {
                        words.push(word.to_string());
                    }
                }
                _ => {}
            }
            self.advance();
        }

        if words.len() < 2 {
            return Ok(None);
        }

        let mut column = ColumnDef::new(words[0].clone(), DataType::from_keyword(&words[1]));

        let mut i = 2;
        while i < words.len() {
            let next = words.get(i + 1).map(String::as_str).unwrap_or_default();
            if words[i].eq_ignore_ascii_case("PRIMARY") && next.eq_ignore_ascii_case("KEY") {
                column.primary_key = true;
                i += 2;
            } else if words[i].eq_ignore_ascii_case("NOT") && next.eq_ignore_ascii_case("NULL") {
                column.not_null = true;
                i += 2;
            } else {
                i += 1;
            }
        }

        Ok(Some(column))
    }

    fn parse_create_table(&mut self) -> Result<ParsedCommand, String> {
        self.consume(Token::Create)?;
        self.consume(Token::Table)?;
        let name = self.consume_ident()?;
        self.consume(Token::LeftParen)?;
        let mut columns = vec![];
        loop {
            if let Some(column) = self.parse_column_def()? {
                columns.push(column);
            }
            match self.current_token() {
                Token::RightParen => {
                    self.advance();
                    break;
                }
                Token::Comma => {
                    self.advance();
                    continue;
                }
                _ => return Err("Expected ',' or ')'".into()),
            }
        }
        if columns.is_empty() {
            return Err(format!("table {name:?} has no column definition"));
        }
        for (idx, column) in columns.iter().enumerate() {
            if columns[..idx].iter().any(|c| c.name == column.name) {
                return Err(format!("duplicate column {:?}", column.name));
            }
        }

        let mut command = ParsedCommand::empty(CommandKind::CreateTable);
        command.table = name;
        command.columns = columns.iter().map(|c| c.name.clone()).collect();
        command.column_defs = columns;
        command.valid = true;
        Ok(command)
    }

    fn parse_insert(&mut self) -> Result<ParsedCommand, String> {
        self.consume(Token::Insert)?;
        self.consume(Token::Into)?;
        let table = self.consume_ident()?;

        // the column list is recorded only, values stay positional
        let mut columns = vec![];
        if matches!(self.current_token(), Token::LeftParen) {
            self.advance();
            columns = self.parse_ident_list()?;
            self.consume(Token::RightParen)?;
        }

        self.consume(Token::Values)?;
        let values = self.parse_literal_list()?;

        let mut command = ParsedCommand::empty(CommandKind::Insert);
        command.table = table;
        command.columns = columns;
        command.values = values;
        command.valid = true;
        Ok(command)
    }

    fn parse_select(&mut self) -> Result<ParsedCommand, String> {
        self.consume(Token::Select)?;

        let columns = if matches!(self.current_token(), Token::Star) {
            self.advance();
            vec![]
        } else {
            self.parse_ident_list()?
        };

        self.consume(Token::From)?;
        let table = self.consume_ident()?;

        let predicate = if matches!(self.current_token(), Token::Where) {
            self.advance();
            Some(self.parse_equality()?)
        } else {
            None
        };

        let mut command = ParsedCommand::empty(CommandKind::Select);
        command.table = table;
        command.columns = columns;
        command.predicate = predicate;
        command.valid = true;
        Ok(command)
    }

    fn parse_update(&mut self) -> Result<ParsedCommand, String> {
        self.consume(Token::Update)?;
        let table = self.consume_ident()?;
        self.consume(Token::Set)?;
        let assignment = self.parse_equality()?;
        self.consume(Token::Where)?;
        let predicate = self.parse_equality()?;

        let mut command = ParsedCommand::empty(CommandKind::Update);
        command.table = table;
        command.columns = vec![assignment.column];
        command.values = vec![assignment.value];
        command.predicate = Some(predicate);
        command.valid = true;
        Ok(command)
    }

    fn parse_delete(&mut self) -> Result<ParsedCommand, String> {
        self.consume(Token::Delete)?;
        self.consume(Token::From)?;
        let table = self.consume_ident()?;
        self.consume(Token::Where)?;
        let predicate = self.parse_equality()?;

        let mut command = ParsedCommand::empty(CommandKind::Delete);
        command.table = table;
        command.predicate = Some(predicate);
        command.valid = true;
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predicate(column: &str, value: Value) -> Option<Predicate> {
        Some(Predicate {
            column: column.into(),
            value,
        })
    }

    #[test]
    fn test_parse_create_table() {
        let cmd = parse("CREATE TABLE users (id INTEGER, name TEXT, age INTEGER);");

        assert_eq!(cmd.kind, CommandKind::CreateTable);
        assert!(cmd.valid);
        assert_eq!(cmd.table, "users");
        assert_eq!(cmd.columns, vec!["id", "name", "age"]);
        assert_eq!(
            cmd.column_defs,
            vec![
                ColumnDef::new("id", DataType::Integer),
                ColumnDef::new("name", DataType::Text),
                ColumnDef::new("age", DataType::Integer),
            ]
        );
    }

    #[test]
    fn test_parse_create_table_modifiers_and_aliases() {
        let cmd = parse(
            "create table items (id INT primary key, label VARCHAR(32) NOT NULL, price double, \
             note BLOB UNIQUE)",
        );

        assert!(cmd.valid);
        let defs = &cmd.column_defs;
        assert_eq!(defs.len(), 4);

        assert_eq!(defs[0].data_type, DataType::Integer);
        assert!(defs[0].primary_key);
        assert!(!defs[0].not_null);

        assert_eq!(defs[1].data_type, DataType::Text);
        assert!(defs[1].not_null);
        assert!(!defs[1].primary_key);

        assert_eq!(defs[2].data_type, DataType::Real);

        // unknown type and modifier
        assert_eq!(defs[3].data_type, DataType::Text);
        assert!(!defs[3].primary_key && !defs[3].not_null);
    }

    #[test]
    fn test_parse_create_table_drops_short_definitions() {
        let cmd = parse("CREATE TABLE t (id INTEGER, lonely, name TEXT)");

        assert!(cmd.valid);
        assert_eq!(cmd.columns, vec!["id", "name"]);
    }

    #[test]
    fn test_parse_create_table_lone_modifier_words() {
        let cmd = parse("CREATE TABLE t (id INTEGER PRIMARY NOT KEY)");

        let def = &cmd.column_defs[0];
        assert!(!def.primary_key);
        assert!(!def.not_null);
    }

    #[test]
    fn test_parse_create_table_ignores_default_clauses() {
        let cmd = parse(
            "CREATE TABLE t (id INTEGER DEFAULT 0 PRIMARY KEY, name TEXT DEFAULT 'x', \
             ratio REAL DEFAULT -1.5 NOT NULL, tag VARCHAR(8) CHECK (tag))",
        );

        assert!(cmd.valid);
        assert_eq!(cmd.columns, vec!["id", "name", "ratio", "tag"]);
        let defs = &cmd.column_defs;
        assert_eq!(defs[0].data_type, DataType::Integer);
        assert!(defs[0].primary_key);
        assert_eq!(defs[1].data_type, DataType::Text);
        assert_eq!(defs[2].data_type, DataType::Real);
        assert!(defs[2].not_null);
        assert_eq!(defs[3].data_type, DataType::Text);
    }

    #[test]
    fn test_parse_create_table_rejects_duplicate_columns() {
        let cmd = parse("CREATE TABLE t (a INT, b TEXT, a TEXT)");

        assert_eq!(cmd, ParsedCommand::empty(CommandKind::CreateTable));
    }

    #[test]
    fn test_keywords_and_digit_led_words_as_names() {
        let cmd = parse("CREATE TABLE 2fa (id INTEGER, set TEXT)");
        assert!(cmd.valid);
        assert_eq!(cmd.table, "2fa");
        assert_eq!(cmd.columns, vec!["id", "SET"]);

        let cmd = parse("SELECT set FROM 2fa WHERE set = 'a'");
        assert!(cmd.valid);
        assert_eq!(cmd.table, "2fa");
        assert_eq!(cmd.columns, vec!["SET"]);
        assert_eq!(cmd.predicate, predicate("SET", Value::Text("a".into())));

        let cmd = parse("INSERT INTO values (from) VALUES (1)");
        assert!(cmd.valid);
        assert_eq!(cmd.table, "VALUES");
        assert_eq!(cmd.columns, vec!["FROM"]);

        let cmd = parse("UPDATE values SET set = 2 WHERE where = 1");
        assert!(cmd.valid);
        assert_eq!(cmd.columns, vec!["SET"]);
        assert_eq!(cmd.predicate, predicate("WHERE", Value::Integer(1)));

        // signed or dotted numbers are never names
        assert!(!parse("DELETE FROM -5 WHERE id = 1").valid);
        assert!(!parse("SELECT * FROM t WHERE 1.5 = 1").valid);
    }

    #[test]
    fn test_parse_insert() {
        let cmd = parse("INSERT INTO users VALUES (1, 'Alice', 25, 1.5)");

        assert_eq!(cmd.kind, CommandKind::Insert);
        assert!(cmd.valid);
        assert_eq!(cmd.table, "users");
        assert!(cmd.columns.is_empty());
        assert_eq!(
            cmd.values,
            vec![
                Value::Integer(1),
                Value::Text("Alice".into()),
                Value::Integer(25),
                Value::Real(1.5),
            ]
        );
    }

    #[test]
    fn test_parse_insert_records_column_list_verbatim() {
        let cmd = parse("INSERT INTO users (name, id) VALUES ('Bob', 2);");

        assert_eq!(cmd.columns, vec!["name", "id"]);
        // values are kept in the order written
        assert_eq!(cmd.values, vec![Value::Text("Bob".into()), Value::Integer(2)]);
    }

    #[test]
    fn test_parse_insert_unparsable_numbers_become_text() {
        let cmd = parse("INSERT INTO t VALUES (1.2.3, 12abc, hello)");

        assert_eq!(
            cmd.values,
            vec![
                Value::Text("1.2.3".into()),
                Value::Text("12abc".into()),
                Value::Text("hello".into()),
            ]
        );
    }

    #[test]
    fn test_parse_select_star() {
        let cmd = parse("select * from users");

        assert_eq!(cmd.kind, CommandKind::Select);
        assert!(cmd.valid);
        assert_eq!(cmd.table, "users");
        assert!(cmd.columns.is_empty());
        assert_eq!(cmd.predicate, None);
    }

    #[test]
    fn test_parse_select_columns_with_where() {
        let cmd = parse("SELECT name, age FROM users WHERE name = 'Alice';");

        assert_eq!(cmd.columns, vec!["name", "age"]);
        assert_eq!(cmd.predicate, predicate("name", Value::Text("Alice".into())));
    }

    #[test]
    fn test_parse_update() {
        let cmd = parse("UPDATE users SET age = 26 WHERE id = 1;");

        assert_eq!(cmd.kind, CommandKind::Update);
        assert!(cmd.valid);
        assert_eq!(cmd.table, "users");
        assert_eq!(cmd.columns, vec!["age"]);
        assert_eq!(cmd.values, vec![Value::Integer(26)]);
        assert_eq!(cmd.predicate, predicate("id", Value::Integer(1)));
    }

    #[test]
    fn test_parse_delete() {
        let cmd = parse("DELETE FROM users WHERE id = 1");

        assert_eq!(cmd.kind, CommandKind::Delete);
        assert!(cmd.valid);
        assert_eq!(cmd.table, "users");
        assert_eq!(cmd.predicate, predicate("id", Value::Integer(1)));
    }

    #[test]
    fn test_unknown_keyword_is_invalid() {
        for sql in ["DROP TABLE users", "", "   ", "DELETE users", "INSERT users VALUES (1)"] {
            let cmd = parse(sql);
            assert_eq!(cmd.kind, CommandKind::Invalid, "{sql}");
            assert!(!cmd.valid);
        }
    }

    #[test]
    fn test_malformed_body_keeps_kind_with_empty_fields() {
        let cases = [
            ("CREATE TABLE users", CommandKind::CreateTable),
            ("CREATE TABLE t ()", CommandKind::CreateTable),
            ("INSERT INTO users VALUES 1, 2", CommandKind::Insert),
            ("SELECT * FROM users WHERE id > 1", CommandKind::Select),
            ("SELECT * FROM users WHERE id = 1 AND age = 2", CommandKind::Select),
            ("UPDATE users SET age = 1", CommandKind::Update),
            ("UPDATE users SET age = 1, name = 'x' WHERE id = 1", CommandKind::Update),
            ("DELETE FROM users", CommandKind::Delete),
            ("SELECT * FROM users WHERE name = 'oops", CommandKind::Select),
        ];

        for (sql, kind) in cases {
            let cmd = parse(sql);
            assert_eq!(cmd, ParsedCommand::empty(kind), "{sql}");
        }
    }
}
