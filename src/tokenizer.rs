/// Represents the smallest meaningful units (atoms) of the statement language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // --- Keywords ---
    Create,
    Table,
    Insert,
    Into,
    Values,
    Select,
    From,
    Where,
    Update,
    Set,
    Delete,

    // --- Identifiers & Literals ---
    /// A bare word: a table or column name, a type keyword or a column modifier.
    Ident(String),
    /// A numeric-looking literal, kept as written (e.g. `42`, `-3.5`, `1.2.3`).
    /// It is coerced into a value by the parser.
    Number(String),
    /// A string literal, defined between single quotes (e.g. `'Alice'`).
    String(String),

    // --- Symbols ---
    /// Left parenthesis `(`
    LeftParen,
    /// Right parenthesis `)`
    RightParen,
    /// Comma `,`
    Comma,
    /// Semicolon `;`
    Semicolon,
    /// Wildcard symbol `*`
    Star,
    /// Equal to
    Equal,

    // --- Special ---
    /// Represents the End Of File/Input.
    Eof,
}

impl Token {
    /// Source text of a word-like token, if this is one.
    pub fn as_word(&self) -> Option<&str> {
        match self {
            Token::Ident(word) => Some(word),
            Token::Create => Some("CREATE"),
            Token::Table => Some("TABLE"),
            Token::Insert => Some("INSERT"),
            Token::Into => Some("INTO"),
            Token::Values => Some("VALUES"),
            Token::Select => Some("SELECT"),
            Token::From => Some("FROM"),
            Token::Where => Some("WHERE"),
            Token::Update => Some("UPDATE"),
            Token::Set => Some("SET"),
            Token::Delete => Some("DELETE"),
            _ => None,
        }
    }
}

/// A lexical scanner (lexer) that converts a raw statement into a sequence of [Token]s.
pub struct Tokenizer {
    /// The input string stored as a vector of characters for easy iteration.
    input: Vec<char>,
    /// The current position in the character vector.
    position: usize,
}

impl Tokenizer {
    /// Creates a new Tokenizer for the given input string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Processes the entire input and returns a vector of tokens.
    ///
    /// # Errors
    /// Returns an error if an invalid character is encountered or if a string
    /// literal is not terminated.
    ///
    /// # Example
    /// ```
    /// # use minisql::tokenizer::{Tokenizer, Token};
    /// let mut t = Tokenizer::new("SELECT *");
    /// let tokens = t.tokenize().unwrap();
    /// assert_eq!(tokens[0], Token::Select);
    /// ```
    pub fn tokenize(&mut self) -> Result<Vec<Token>, String> {
        let mut tokens = Vec::new();

        while !self.is_at_end() {
            self.skip_whitespace();

            if self.is_at_end() {
                break;
            }

            let token = self.next_token()?;
            tokens.push(token);
        }

        tokens.push(Token::Eof);
        Ok(tokens)
    }

    /// Identifies the next token based on the character at the current position.
    fn next_token(&mut self) -> Result<Token, String> {
        let ch = self.current_char();

        match ch {
            '(' => {
                self.advance();
                Ok(Token::LeftParen)
            }
            ')' => {
                self.advance();
                Ok(Token::RightParen)
            }
            ',' => {
                self.advance();
                Ok(Token::Comma)
            }
            ';' => {
                self.advance();
                Ok(Token::Semicolon)
            }
            '*' => {
                self.advance();
                Ok(Token::Star)
            }
            '=' => {
                self.advance();
                Ok(Token::Equal)
            }
            '\'' => self.read_string(),
            c if c.is_numeric() || self.starts_signed_number() => Ok(self.read_number()),
            c if c.is_alphabetic() || c == '_' => Ok(self.read_identifier()),
            _ => Err(format!("character: {:?} is not supported", ch)),
        }
    }

    // --- Navigation Helpers ---

    /// Returns the character at the current position.
    fn current_char(&self) -> char {
        self.input[self.position]
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    /// Moves the cursor forward by one character.
    fn advance(&mut self) {
        self.position += 1;
    }

    /// Checks if the cursor has reached the end of the input.
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Consumes any whitespace characters (spaces, tabs, newlines).
    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    /// `-5`, `+5`, `.5`, `-.5`
    fn starts_signed_number(&self) -> bool {
        let mut offset = 0;
        if matches!(self.peek_char(0), Some('-' | '+')) {
            offset += 1;
        }
        if self.peek_char(offset) == Some('.') {
            offset += 1;
        }
        offset > 0 && self.peek_char(offset).is_some_and(|c| c.is_numeric())
    }

    // --- Extraction Logic ---

    /// Reads a sequence of alphanumeric characters and determines if it's
    /// a reserved keyword or a bare word.
    ///
    /// Keywords are matched case-insensitively.
    fn read_identifier(&mut self) -> Token {
        let mut ident = String::new();

        while !self.is_at_end()
            && (self.current_char().is_alphanumeric() || self.current_char() == '_')
        {
            ident.push(self.current_char());
            self.advance();
        }

        match ident.to_uppercase().as_str() {
            "CREATE" => Token::Create,
            "TABLE" => Token::Table,
            "INSERT" => Token::Insert,
            "INTO" => Token::Into,
            "VALUES" => Token::Values,
            "SELECT" => Token::Select,
            "FROM" => Token::From,
            "WHERE" => Token::Where,
            "UPDATE" => Token::Update,
            "SET" => Token::Set,
            "DELETE" => Token::Delete,
            _ => Token::Ident(ident),
        }
    }

    /// Reads a numeric-looking literal verbatim: an optional sign followed by
    /// digits, letters, dots and underscores. Whether it really is a number is
    /// decided later, when the literal is coerced.
    fn read_number(&mut self) -> Token {
        let mut number = String::new();

        if matches!(self.current_char(), '-' | '+') {
            number.push(self.current_char());
            self.advance();
        }

        while !self.is_at_end()
            && (self.current_char().is_alphanumeric()
                || self.current_char() == '.'
                || self.current_char() == '_')
        {
            number.push(self.current_char());
            self.advance();
        }

        Token::Number(number)
    }

    /// Reads a string literal enclosed in single quotes.
    /// There is no escape sequence: the first quote after the opening one closes it.
    fn read_string(&mut self) -> Result<Token, String> {
        self.advance(); // Skip the opening quote

        let mut string = String::new();
        while !self.is_at_end() && self.current_char() != '\'' {
            string.push(self.current_char());
            self.advance();
        }

        if self.is_at_end() {
            return Err("Unterminated string".into());
        }

        // Skip the closing quote
        self.advance();

        Ok(Token::String(string))
    }
}
