//! Query compiler: text to [`Token`] tree.
//!
//! Precedence, loosest first: `||`, `&&`, `== !=`, `< <= > >=`, `+ -`,
//! `* / %`, unary `- !`. Binary operators associate to the left.

use bstr::ByteSlice;

use super::token::{Arguments, Function, Literal, Op, Operator, Path, Root, Segment, Selector, Token};
use crate::{buffer::Buffer, error::QueryError, node::decode, value::Value};

/// Deepest chain of nested sub-expressions (parentheses, unary operators,
/// function arguments, filters and scripts) a query may contain.
pub(super) const MAX_NESTING: usize = 128;

pub(super) struct Parser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub(super) fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    /// Parses the whole input as one expression.
    pub(super) fn parse(mut self) -> Result<Token, QueryError> {
        self.skip_whitespace();
        if self.is_at_end() {
            return Err(self.error("empty query"));
        }
        let token = self.parse_or()?;
        self.skip_whitespace();
        match self.peek() {
            None => Ok(token),
            Some(c) => Err(self.error(format!("unexpected character '{}'", char::from(c)))),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + offset).copied()
    }

    fn peek_str(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.advance();
        }
    }

    fn expect(&mut self, c: u8) -> Result<(), QueryError> {
        if self.peek() == Some(c) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", char::from(c))))
        }
    }

    fn error(&self, message: impl Into<String>) -> QueryError {
        QueryError::syntax(message, self.pos)
    }

    /// Tries each `(text, op)` pair at the cursor, longest spellings first.
    fn operator(&mut self, ops: &[(&str, Op)]) -> Option<Op> {
        self.skip_whitespace();
        let (text, op) = ops.iter().find(|(text, _)| self.peek_str(text))?;
        self.pos += text.len();
        Some(*op)
    }

    fn binary(
        &mut self,
        ops: &[(&str, Op)],
        next: fn(&mut Self) -> Result<Token, QueryError>,
    ) -> Result<Token, QueryError> {
        let mut left = next(self)?;
        while let Some(op) = self.operator(ops) {
            let right = next(self)?;
            left = Token::Operator(Operator {
                op,
                left: Box::new(left),
                right: Some(Box::new(right)),
            });
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Token, QueryError> {
        self.binary(&[("||", Op::Or)], Self::parse_and)
    }

    fn parse_and(&mut self) -> Result<Token, QueryError> {
        self.binary(&[("&&", Op::And)], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> Result<Token, QueryError> {
        self.binary(&[("==", Op::Eq), ("!=", Op::Ne)], Self::parse_comparison)
    }

    fn parse_comparison(&mut self) -> Result<Token, QueryError> {
        self.binary(
            &[("<=", Op::Le), (">=", Op::Ge), ("<", Op::Lt), (">", Op::Gt)],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> Result<Token, QueryError> {
        self.binary(&[("+", Op::Add), ("-", Op::Sub)], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> Result<Token, QueryError> {
        self.binary(
            &[("*", Op::Mul), ("/", Op::Div), ("%", Op::Rem)],
            Self::parse_unary,
        )
    }

    fn parse_unary(&mut self) -> Result<Token, QueryError> {
        if self.depth == MAX_NESTING {
            return Err(self.error("expression nested too deeply"));
        }
        self.depth += 1;
        let token = self.unary();
        self.depth -= 1;
        token
    }

    fn unary(&mut self) -> Result<Token, QueryError> {
        self.skip_whitespace();
        let op = match self.peek() {
            Some(b'-') => Op::Neg,
            Some(b'!') if self.peek_at(1) != Some(b'=') => Op::Not,
            _ => return self.parse_primary(),
        };
        self.advance();
        let operand = self.parse_unary()?;
        // fold negative numeric constants
        if let (Op::Neg, Token::Literal(literal)) = (op, &operand) {
            if let Value::Number(n) = literal.value() {
                return Ok(Token::Literal(Literal::new(Value::Number(-n))));
            }
        }
        Ok(Token::Operator(Operator {
            op,
            left: Box::new(operand),
            right: None,
        }))
    }

    fn parse_primary(&mut self) -> Result<Token, QueryError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.error("unexpected end of query")),
            Some(b'$') => {
                self.advance();
                self.parse_path(Root::Document)
            }
            Some(b'@') => {
                self.advance();
                self.parse_path(Root::Current)
            }
            Some(b'(') => {
                self.advance();
                let token = self.parse_or()?;
                self.skip_whitespace();
                self.expect(b')')?;
                Ok(token)
            }
            Some(q @ (b'\'' | b'"')) => Ok(Token::Literal(Literal::new(Value::String(
                self.parse_string(q)?,
            )))),
            Some(b'0'..=b'9' | b'.') => Ok(Token::Literal(Literal::new(Value::Number(
                self.parse_number()?,
            )))),
            Some(c) if c.is_ascii_alphabetic() || c == b'_' => self.parse_word(),
            Some(c) => Err(self.error(format!("unexpected character '{}'", char::from(c)))),
        }
    }

    /// `true`, `false`, `null` in any case, or a function call.
    fn parse_word(&mut self) -> Result<Token, QueryError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
        {
            self.advance();
        }
        let word = &self.input[start..self.pos];
        let constant = match word.to_ascii_lowercase().as_str() {
            "true" => Some(Value::Boolean(true)),
            "false" => Some(Value::Boolean(false)),
            "null" => Some(Value::Null),
            _ => None,
        };
        if let Some(value) = constant {
            return Ok(Token::Literal(Literal::new(value)));
        }

        self.skip_whitespace();
        self.expect(b'(')?;
        let mut arguments = Vec::new();
        self.skip_whitespace();
        if self.peek() != Some(b')') {
            loop {
                arguments.push(self.parse_or()?);
                self.skip_whitespace();
                if self.peek() == Some(b',') {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(b')')?;
        Ok(Token::Function(Function::new(word, Arguments(arguments))?))
    }

    fn parse_number(&mut self) -> Result<f64, QueryError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == b'.') {
            self.advance();
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.advance();
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.advance();
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        self.input[start..self.pos]
            .parse()
            .map_err(|_| QueryError::syntax("invalid number", start))
    }

    fn parse_integer(&mut self) -> Result<i64, QueryError> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.advance();
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        self.input[start..self.pos]
            .parse()
            .map_err(|_| QueryError::syntax("invalid integer", start))
    }

    /// Quoted string; the cursor is on the opening quote.
    fn parse_string(&mut self, quote: u8) -> Result<String, QueryError> {
        let start = self.pos;
        let mut buf = Buffer::new(self.input.as_bytes());
        buf.index = start + 1;
        let (from, to) = buf
            .scan(quote, false)
            .map_err(|_| QueryError::syntax("unterminated string", start))?;
        self.pos = buf.index;

        // re-quote as a JSON string literal and decode that
        let mut json = Vec::with_capacity(to - from + 2);
        json.push(b'"');
        let mut escaped = false;
        for &b in &self.input.as_bytes()[from..to] {
            if escaped {
                if b == b'\'' {
                    json.pop();
                }
                json.push(b);
                escaped = false;
                continue;
            }
            match b {
                b'\\' => escaped = true,
                b'"' => json.push(b'\\'),
                _ => {}
            }
            json.push(b);
        }
        json.push(b'"');
        decode::string(json.as_bstr()).map_err(|err| QueryError::syntax(err.to_string(), start))
    }

    fn parse_name(&mut self) -> Result<String, QueryError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_' || !c.is_ascii())
        {
            self.advance();
        }
        if self.pos == start {
            return Err(self.error("expected member name"));
        }
        Ok(self.input[start..self.pos].to_owned())
    }

    fn parse_path(&mut self, root: Root) -> Result<Token, QueryError> {
        let mut segments = Vec::new();
        loop {
            match self.peek() {
                Some(b'.') if self.peek_at(1) == Some(b'.') => {
                    self.pos += 2;
                    let selectors = match self.peek() {
                        Some(b'*') => {
                            self.advance();
                            vec![Selector::Wildcard]
                        }
                        Some(b'[') => self.parse_brackets()?,
                        _ => vec![Selector::Name(self.parse_name()?)],
                    };
                    segments.push(Segment {
                        selectors,
                        descendant: true,
                    });
                }
                Some(b'.') => {
                    self.advance();
                    let selector = if self.peek() == Some(b'*') {
                        self.advance();
                        Selector::Wildcard
                    } else {
                        Selector::Name(self.parse_name()?)
                    };
                    segments.push(Segment {
                        selectors: vec![selector],
                        descendant: false,
                    });
                }
                Some(b'[') => segments.push(Segment {
                    selectors: self.parse_brackets()?,
                    descendant: false,
                }),
                _ => break,
            }
        }
        Ok(Token::Path(Path { root, segments }))
    }

    /// `[sel, sel, ...]`; the cursor is on the `[`.
    fn parse_brackets(&mut self) -> Result<Vec<Selector>, QueryError> {
        self.expect(b'[')?;
        let mut selectors = Vec::new();
        loop {
            self.skip_whitespace();
            selectors.push(self.parse_selector()?);
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.advance(),
                Some(b']') => {
                    self.advance();
                    return Ok(selectors);
                }
                _ => return Err(self.error("expected ',' or ']'")),
            }
        }
    }

    fn parse_selector(&mut self) -> Result<Selector, QueryError> {
        match self.peek() {
            Some(q @ (b'\'' | b'"')) => Ok(Selector::Name(self.parse_string(q)?)),
            Some(b'*') => {
                self.advance();
                Ok(Selector::Wildcard)
            }
            Some(b'?') => {
                self.advance();
                self.skip_whitespace();
                self.expect(b'(')?;
                let expr = self.parse_or()?;
                self.skip_whitespace();
                self.expect(b')')?;
                Ok(Selector::Filter(Box::new(expr)))
            }
            Some(b'(') => {
                self.advance();
                let expr = self.parse_or()?;
                self.skip_whitespace();
                self.expect(b')')?;
                Ok(Selector::Script(Box::new(expr)))
            }
            Some(b'-' | b'0'..=b'9' | b':') => self.parse_index_or_slice(),
            _ => Err(self.error("invalid selector")),
        }
    }

    fn parse_index_or_slice(&mut self) -> Result<Selector, QueryError> {
        let start = self.parse_optional_integer()?;
        self.skip_whitespace();
        if self.peek() != Some(b':') {
            return start
                .map(Selector::Index)
                .ok_or_else(|| self.error("expected index"));
        }
        self.advance();
        let end = self.parse_optional_integer()?;
        self.skip_whitespace();
        let step = if self.peek() == Some(b':') {
            self.advance();
            self.parse_optional_integer()?
        } else {
            None
        };
        Ok(Selector::Slice { start, end, step })
    }

    fn parse_optional_integer(&mut self) -> Result<Option<i64>, QueryError> {
        self.skip_whitespace();
        if matches!(self.peek(), Some(b'-' | b'0'..=b'9')) {
            self.parse_integer().map(Some)
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn compile(input: &str) -> Result<String, QueryError> {
        Parser::new(input).parse().map(|token| token.to_string())
    }

    #[rstest]
    #[case("$", "Path($, )")]
    #[case("$.store.book", "Path($, ['store']['book'])")]
    #[case("$['a b'][\"c\"]", "Path($, ['a b']['c'])")]
    #[case("$.*[*]", "Path($, [*][*])")]
    #[case("$..price", "Path($, ..['price'])")]
    #[case("$..*", "Path($, ..[*])")]
    #[case("$..[0,1]", "Path($, ..[0,1])")]
    #[case("$[-1]", "Path($, [-1])")]
    #[case("$[1:3]", "Path($, [1:3])")]
    #[case("$[::2]", "Path($, [::2])")]
    #[case("$[:-1]", "Path($, [:-1])")]
    #[case("$['a','b']", "Path($, ['a','b'])")]
    #[case("$[?(@.price < 10)]", "Path($, [?(Operator(<, Path(@, ['price']), Literal(10)))])")]
    #[case("$[(@.length - 1)]", "Path($, [(Operator(-, Path(@, ['length']), Literal(1)))])")]
    #[case("@", "Path(@, )")]
    fn paths(#[case] input: &str, #[case] rendered: &str) {
        assert_eq!(compile(input).unwrap(), rendered);
    }

    #[rstest]
    #[case("1 + 2 * 3", "Operator(+, Literal(1), Operator(*, Literal(2), Literal(3)))")]
    #[case("(1 + 2) * 3", "Operator(*, Operator(+, Literal(1), Literal(2)), Literal(3))")]
    #[case("1 - 2 - 3", "Operator(-, Operator(-, Literal(1), Literal(2)), Literal(3))")]
    #[case("-2", "Literal(-2)")]
    #[case("-@.a", "Operator(-, Path(@, ['a']), <nil>)")]
    #[case("!TRUE", "Operator(!, Literal(true), <nil>)")]
    #[case("Null", "Literal(null)")]
    #[case("1 != 2 && 3 >= 4 || 5 <= 6",
        "Operator(||, Operator(&&, Operator(!=, Literal(1), Literal(2)), Operator(>=, Literal(3), Literal(4))), Operator(<=, Literal(5), Literal(6)))")]
    #[case("'it\\'s'", r#"Literal("it's")"#)]
    #[case(r#""say \"hi\"""#, r#"Literal("say \"hi\"")"#)]
    #[case("1.5e2 % 7", "Operator(%, Literal(150), Literal(7))")]
    #[case("AVG($..price)", "Function(avg, Arguments(Path($, ..['price'])))")]
    #[case("pow(2, 8)", "Function(pow, Arguments(Literal(2), Literal(8)))")]
    fn expressions(#[case] input: &str, #[case] rendered: &str) {
        assert_eq!(compile(input).unwrap(), rendered);
    }

    #[rstest]
    #[case("", 0)]
    #[case("$.", 2)]
    #[case("$[", 2)]
    #[case("$[1", 3)]
    #[case("$['a", 2)]
    #[case("$[?(@.a]", 7)]
    #[case("1 +", 3)]
    #[case("$ $", 2)]
    #[case("#", 0)]
    #[case("avg", 3)]
    fn syntax_errors(#[case] input: &str, #[case] position: usize) {
        match compile(input) {
            Err(QueryError::Syntax { position: at, .. }) => assert_eq!(at, position),
            other => panic!("{input:?}: expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn nesting_is_bounded() {
        let nested = |n: usize| format!("{}1{}", "(".repeat(n), ")".repeat(n));
        assert_eq!(compile(&nested(MAX_NESTING - 1)).unwrap(), "Literal(1)");
        assert!(matches!(
            compile(&nested(MAX_NESTING)),
            Err(QueryError::Syntax { position: MAX_NESTING, .. })
        ));
        assert!(matches!(compile(&nested(100_000)), Err(QueryError::Syntax { .. })));
        assert!(matches!(
            compile(&format!("{}1", "-!".repeat(MAX_NESTING))),
            Err(QueryError::Syntax { .. })
        ));
    }

    #[test]
    fn unknown_function_is_a_compile_error() {
        assert_eq!(
            compile("$[?(frobnicate(@) > 1)]"),
            Err(QueryError::UnknownFunction {
                name: "frobnicate".into()
            })
        );
    }
}
