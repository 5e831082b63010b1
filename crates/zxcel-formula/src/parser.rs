//! Formula parser
//!
//! Formula text is split into tokens up front, then folded into a
//! [`FormulaExpr`] by a binding-power parser. From loosest to tightest:
//! comparisons, `&`, `+ -`, `* /`, `^` (right associative), prefix `- +`,
//! postfix `%`, and the `:` range operator between two references.
//!
//! Parentheses, calls and signs may nest [`MAX_NESTING`] levels deep and the
//! finished tree may be at most [`MAX_HEIGHT`] nodes tall; anything larger is
//! a parse error rather than a stack overflow.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use zxcel_core::{CellAddress, CellRange};

/// Parse a formula string into an AST
///
/// # Example
/// ```rust
/// use zxcel_formula::parse_formula;
///
/// let ast = parse_formula("=1+2").unwrap();
/// let ast = parse_formula("=SUM(B2:B3)").unwrap();
/// let ast = parse_formula("=COUNTIF(A1:A5,>5)").unwrap();
/// let ast = parse_formula("=СУММ(A1:A3)*2").unwrap();
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<FormulaExpr> {
    let body = formula
        .trim()
        .strip_prefix('=')
        .ok_or_else(|| FormulaError::Parse("Formula must start with '='".into()))?;

    let mut parser = Parser {
        tokens: Lexer::new(body).tokenize()?,
        cursor: 0,
        nesting: 0,
    };
    let parsed = parser.expression(0)?;

    match parser.peek() {
        None => Ok(parsed.expr),
        Some(token) => Err(FormulaError::Parse(format!(
            "Unexpected {:?} after expression",
            token
        ))),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Text(String),
    Boolean(bool),
    /// Function name or bare word
    Word(String),
    /// Letters followed by digits, not used as a call
    Reference(String),
    Op(BinaryOperator),
    Percent,
    Colon,
    Comma,
    Open,
    Close,
}

impl Token {
    fn comparison(&self) -> Option<BinaryOperator> {
        match self {
            Token::Op(op) if op.is_comparison() => Some(*op),
            _ => None,
        }
    }
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    /// Consume the longest prefix whose chars satisfy `pred`
    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    /// Consume `prefix` if the input continues with it
    fn eat(&mut self, prefix: &str) -> bool {
        let found = self.rest().starts_with(prefix);
        if found {
            self.pos += prefix.len();
        }
        found
    }

    fn tokenize(mut self) -> FormulaResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.take_while(char::is_whitespace);
            let Some(c) = self.rest().chars().next() else {
                return Ok(tokens);
            };
            tokens.push(self.token(c)?);
        }
    }

    fn token(&mut self, first: char) -> FormulaResult<Token> {
        // Two-character operators before their one-character prefixes
        for (text, op) in [
            ("<=", BinaryOperator::LessEqual),
            ("<>", BinaryOperator::NotEqual),
            (">=", BinaryOperator::GreaterEqual),
        ] {
            if self.eat(text) {
                return Ok(Token::Op(op));
            }
        }

        let simple = match first {
            '+' => Some(Token::Op(BinaryOperator::Add)),
            '-' => Some(Token::Op(BinaryOperator::Subtract)),
            '*' => Some(Token::Op(BinaryOperator::Multiply)),
            '/' => Some(Token::Op(BinaryOperator::Divide)),
            '^' => Some(Token::Op(BinaryOperator::Power)),
            '&' => Some(Token::Op(BinaryOperator::Concat)),
            '=' => Some(Token::Op(BinaryOperator::Equal)),
            '<' => Some(Token::Op(BinaryOperator::LessThan)),
            '>' => Some(Token::Op(BinaryOperator::GreaterThan)),
            '%' => Some(Token::Percent),
            ':' => Some(Token::Colon),
            ',' => Some(Token::Comma),
            '(' => Some(Token::Open),
            ')' => Some(Token::Close),
            _ => None,
        };
        if let Some(token) = simple {
            self.pos += first.len_utf8();
            return Ok(token);
        }

        match first {
            '"' => self.text(),
            c if c.is_ascii_digit() || (c == '.' && self.starts_number_after(1)) => self.number(),
            c if c.is_alphabetic() || c == '_' => Ok(self.word()),
            c => Err(FormulaError::Parse(format!("Unexpected character '{}'", c))),
        }
    }

    fn starts_number_after(&self, offset: usize) -> bool {
        self.rest()[offset..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
    }

    /// Quoted text; `""` inside the quotes is a literal quote
    fn text(&mut self) -> FormulaResult<Token> {
        self.pos += 1;
        let mut text = String::new();
        loop {
            let chunk = self.take_while(|c| c != '"');
            text.push_str(chunk);
            if !self.eat("\"") {
                return Err(FormulaError::Parse(format!("Unterminated string \"{}", text)));
            }
            if !self.eat("\"") {
                return Ok(Token::Text(text));
            }
            text.push('"');
        }
    }

    /// Digits with an optional fraction and exponent
    fn number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;
        self.take_while(|c| c.is_ascii_digit());
        if self.eat(".") {
            self.take_while(|c| c.is_ascii_digit());
        }

        let rest = self.rest();
        if rest.starts_with(['e', 'E']) {
            let sign = usize::from(rest[1..].starts_with(['+', '-']));
            if self.starts_number_after(1 + sign) {
                self.pos += 1 + sign;
                self.take_while(|c| c.is_ascii_digit());
            }
        }

        let literal = &self.src[start..self.pos];
        literal
            .parse()
            .map(Token::Number)
            .map_err(|_| FormulaError::Parse(format!("Invalid number '{}'", literal)))
    }

    fn word(&mut self) -> Token {
        let word = self.take_while(|c| c.is_alphanumeric() || c == '_' || c == '.');

        // LOG10(100) is a call even though LOG10 looks like a reference
        if self.rest().trim_start().starts_with('(') {
            return Token::Word(word.to_string());
        }

        if word.eq_ignore_ascii_case("TRUE") {
            Token::Boolean(true)
        } else if word.eq_ignore_ascii_case("FALSE") {
            Token::Boolean(false)
        } else if looks_like_reference(word) {
            Token::Reference(word.to_string())
        } else {
            Token::Word(word.to_string())
        }
    }
}

/// ASCII letters followed by ASCII digits, nothing else
fn looks_like_reference(word: &str) -> bool {
    let digits = word.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    digits.len() < word.len() && !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Left and right binding power of an infix operator
fn binding_power(op: BinaryOperator) -> (u8, u8) {
    match op {
        BinaryOperator::Equal
        | BinaryOperator::NotEqual
        | BinaryOperator::LessThan
        | BinaryOperator::LessEqual
        | BinaryOperator::GreaterThan
        | BinaryOperator::GreaterEqual => (1, 2),
        BinaryOperator::Concat => (3, 4),
        BinaryOperator::Add | BinaryOperator::Subtract => (5, 6),
        BinaryOperator::Multiply | BinaryOperator::Divide => (7, 8),
        BinaryOperator::Power => (10, 9),
    }
}

/// Binding power that admits `&` and everything tighter but stops at comparisons
const ABOVE_COMPARISON: u8 = 3;

/// How deep parentheses, function calls and signs may nest
pub const MAX_NESTING: usize = 64;

/// How tall a parsed expression tree may grow (long operator chains)
pub const MAX_HEIGHT: usize = 256;

/// An expression and the height of its tree
struct Parsed {
    expr: FormulaExpr,
    height: usize,
}

impl Parsed {
    fn leaf(expr: FormulaExpr) -> Self {
        Self { expr, height: 1 }
    }

    /// A node one level above its tallest child
    fn branch(expr: FormulaExpr, tallest_child: usize) -> FormulaResult<Self> {
        let height = tallest_child + 1;
        if height > MAX_HEIGHT {
            return Err(FormulaError::Parse(format!(
                "Formula is more than {} operations deep",
                MAX_HEIGHT
            )));
        }
        Ok(Self { expr, height })
    }
}

struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
    /// Recursive descents currently open
    nesting: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor).cloned();
        self.cursor += 1;
        token
    }

    fn bump_if(&mut self, expected: &Token) -> bool {
        let found = self.peek() == Some(expected);
        if found {
            self.cursor += 1;
        }
        found
    }

    fn expect(&mut self, expected: Token) -> FormulaResult<()> {
        if self.bump_if(&expected) {
            return Ok(());
        }
        Err(FormulaError::Parse(match self.peek() {
            Some(found) => format!("Expected {:?}, found {:?}", expected, found),
            None => format!("Expected {:?} before end of formula", expected),
        }))
    }

    /// Run `parse` one nesting level deeper
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> FormulaResult<T>,
    ) -> FormulaResult<T> {
        if self.nesting >= MAX_NESTING {
            return Err(FormulaError::Parse(format!(
                "Formula nests more than {} levels deep",
                MAX_NESTING
            )));
        }
        self.nesting += 1;
        let parsed = parse(self);
        self.nesting -= 1;
        parsed
    }

    /// Infix expression whose operators all bind at least as tightly as `min_bp`
    fn expression(&mut self, min_bp: u8) -> FormulaResult<Parsed> {
        self.nested(|p| p.infix(min_bp))
    }

    fn infix(&mut self, min_bp: u8) -> FormulaResult<Parsed> {
        let mut lhs = self.prefixed()?;

        while let Some(&Token::Op(op)) = self.peek() {
            let (left_bp, right_bp) = binding_power(op);
            if left_bp < min_bp {
                break;
            }
            self.cursor += 1;
            let rhs = self.expression(right_bp)?;
            let tallest = lhs.height.max(rhs.height);
            lhs = Parsed::branch(
                FormulaExpr::BinaryOp {
                    op,
                    left: Box::new(lhs.expr),
                    right: Box::new(rhs.expr),
                },
                tallest,
            )?;
        }

        Ok(lhs)
    }

    /// Prefix signs, an operand, then any number of `%`
    fn prefixed(&mut self) -> FormulaResult<Parsed> {
        if self.bump_if(&Token::Op(BinaryOperator::Subtract)) {
            let operand = self.nested(Self::prefixed)?;
            return Parsed::branch(
                FormulaExpr::UnaryOp {
                    op: UnaryOperator::Negate,
                    operand: Box::new(operand.expr),
                },
                operand.height,
            );
        }
        if self.bump_if(&Token::Op(BinaryOperator::Add)) {
            return self.nested(Self::prefixed);
        }

        let mut parsed = self.operand()?;
        if self.bump_if(&Token::Colon) {
            let end = self.operand()?;
            parsed = Parsed::leaf(range_between(parsed.expr, end.expr)?);
        }
        while self.bump_if(&Token::Percent) {
            let height = parsed.height;
            parsed = Parsed::branch(
                FormulaExpr::UnaryOp {
                    op: UnaryOperator::Percent,
                    operand: Box::new(parsed.expr),
                },
                height,
            )?;
        }
        Ok(parsed)
    }

    fn operand(&mut self) -> FormulaResult<Parsed> {
        let token = self
            .bump()
            .ok_or_else(|| FormulaError::Parse("Unexpected end of formula".into()))?;

        match token {
            Token::Number(n) => Ok(Parsed::leaf(FormulaExpr::Number(n))),
            Token::Text(s) => Ok(Parsed::leaf(FormulaExpr::String(s))),
            Token::Boolean(b) => Ok(Parsed::leaf(FormulaExpr::Boolean(b))),
            Token::Open => {
                let inner = self.expression(0)?;
                self.expect(Token::Close)?;
                Ok(inner)
            }
            Token::Reference(text) => Ok(Parsed::leaf(reference(&text))),
            Token::Word(name) if self.peek() == Some(&Token::Open) => self.call(name),
            Token::Word(name) => Ok(Parsed::leaf(FormulaExpr::NameRef(name))),
            other => Err(FormulaError::Parse(format!("Unexpected {:?}", other))),
        }
    }

    fn call(&mut self, name: String) -> FormulaResult<Parsed> {
        self.expect(Token::Open)?;

        let mut args = Vec::new();
        let mut tallest = 0;
        if !self.bump_if(&Token::Close) {
            loop {
                let arg = self.argument()?;
                tallest = tallest.max(arg.height);
                args.push(arg.expr);
                if !self.bump_if(&Token::Comma) {
                    break;
                }
            }
            self.expect(Token::Close)?;
        }

        Parsed::branch(
            FormulaExpr::Function {
                name: name.to_uppercase(),
                args,
            },
            tallest,
        )
    }

    /// An argument that opens with a comparison operator is a criteria (`>5`)
    fn argument(&mut self) -> FormulaResult<Parsed> {
        match self.peek().and_then(Token::comparison) {
            Some(op) => {
                self.cursor += 1;
                let operand = self.expression(ABOVE_COMPARISON)?;
                Parsed::branch(
                    FormulaExpr::Criteria {
                        op,
                        operand: Box::new(operand.expr),
                    },
                    operand.height,
                )
            }
            None => self.expression(0),
        }
    }
}

/// A reference token that does not name a real cell (A0, a column past the
/// limit) reads as 0 like any other missing cell
fn reference(text: &str) -> FormulaExpr {
    match CellAddress::parse(text) {
        Ok(address) => FormulaExpr::CellRef(address),
        Err(e) => {
            log::debug!("reference '{}' read as 0: {}", text, e);
            FormulaExpr::Number(0.0)
        }
    }
}

fn range_between(start: FormulaExpr, end: FormulaExpr) -> FormulaResult<FormulaExpr> {
    match (start, end) {
        (FormulaExpr::CellRef(start), FormulaExpr::CellRef(end)) => {
            Ok(FormulaExpr::RangeRef(CellRange::new(start, end)))
        }
        _ => Err(FormulaError::Parse(
            "Range operator ':' needs a cell reference on both sides".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn addr(s: &str) -> CellAddress {
        CellAddress::parse(s).unwrap()
    }

    fn binary(op: BinaryOperator, left: FormulaExpr, right: FormulaExpr) -> FormulaExpr {
        FormulaExpr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn n(value: f64) -> FormulaExpr {
        FormulaExpr::Number(value)
    }

    #[test]
    fn test_tokenize() {
        let tokens = Lexer::new("A1 <= 2.5e1 & \"x\"").tokenize().unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Reference("A1".into()),
                Token::Op(BinaryOperator::LessEqual),
                Token::Number(25.0),
                Token::Op(BinaryOperator::Concat),
                Token::Text("x".into()),
            ]
        );
    }

    #[test]
    fn test_looks_like_reference() {
        assert!(looks_like_reference("B12"));
        assert!(looks_like_reference("xfd1"));
        assert!(!looks_like_reference("B"));
        assert!(!looks_like_reference("12"));
        assert!(!looks_like_reference("B1C"));
        assert!(!looks_like_reference("Б1"));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse_formula("=42").unwrap(), n(42.0));
        assert_eq!(parse_formula("=.5").unwrap(), n(0.5));
        assert_eq!(parse_formula("=1e3").unwrap(), n(1000.0));
        assert_eq!(parse_formula("= 7 ").unwrap(), n(7.0));
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            parse_formula("=\"say \"\"hi\"\"\"").unwrap(),
            FormulaExpr::String("say \"hi\"".into())
        );
        assert_eq!(
            parse_formula("=\"\"").unwrap(),
            FormulaExpr::String(String::new())
        );
        assert!(parse_formula("=\"open").is_err());
    }

    #[test]
    fn test_booleans() {
        assert_eq!(parse_formula("=true").unwrap(), FormulaExpr::Boolean(true));
        assert_eq!(parse_formula("=FALSE").unwrap(), FormulaExpr::Boolean(false));
    }

    #[test]
    fn test_references_are_case_insensitive() {
        assert_eq!(parse_formula("=B2").unwrap(), FormulaExpr::CellRef(addr("B2")));
        assert_eq!(
            parse_formula("=ab12").unwrap(),
            FormulaExpr::CellRef(addr("AB12"))
        );
    }

    #[test]
    fn test_row_zero_reads_as_zero() {
        assert_eq!(parse_formula("=A0").unwrap(), n(0.0));
    }

    #[test]
    fn test_ranges_are_normalized() {
        assert_eq!(
            parse_formula("=B3:A1").unwrap(),
            FormulaExpr::RangeRef(CellRange::parse("A1:B3").unwrap())
        );
        assert!(parse_formula("=A1:5").is_err());
    }

    #[test]
    fn test_multiplication_binds_tighter() {
        assert_eq!(
            parse_formula("=1+2*3").unwrap(),
            binary(
                BinaryOperator::Add,
                n(1.0),
                binary(BinaryOperator::Multiply, n(2.0), n(3.0))
            )
        );
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        assert_eq!(
            parse_formula("=8-4-2").unwrap(),
            binary(
                BinaryOperator::Subtract,
                binary(BinaryOperator::Subtract, n(8.0), n(4.0)),
                n(2.0)
            )
        );
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(
            parse_formula("=2^3^2").unwrap(),
            binary(
                BinaryOperator::Power,
                n(2.0),
                binary(BinaryOperator::Power, n(3.0), n(2.0))
            )
        );
    }

    #[test]
    fn test_negation_binds_tighter_than_power() {
        let negated_two = FormulaExpr::UnaryOp {
            op: UnaryOperator::Negate,
            operand: Box::new(n(2.0)),
        };
        assert_eq!(
            parse_formula("=-2^2").unwrap(),
            binary(BinaryOperator::Power, negated_two, n(2.0))
        );
    }

    #[test]
    fn test_comparison_is_loosest() {
        assert_eq!(
            parse_formula("=1&2=\"12\"").unwrap(),
            binary(
                BinaryOperator::Equal,
                binary(BinaryOperator::Concat, n(1.0), n(2.0)),
                FormulaExpr::String("12".into())
            )
        );
    }

    #[test]
    fn test_percent_postfix() {
        assert_eq!(
            parse_formula("=50%").unwrap(),
            FormulaExpr::UnaryOp {
                op: UnaryOperator::Percent,
                operand: Box::new(n(50.0)),
            }
        );
    }

    #[test]
    fn test_function_call() {
        assert_eq!(
            parse_formula("=sum(B2:B3, 4)").unwrap(),
            FormulaExpr::Function {
                name: "SUM".into(),
                args: vec![
                    FormulaExpr::RangeRef(CellRange::parse("B2:B3").unwrap()),
                    n(4.0),
                ],
            }
        );
        assert_eq!(
            parse_formula("=PI()").unwrap(),
            FormulaExpr::Function {
                name: "PI".into(),
                args: vec![],
            }
        );
    }

    #[test]
    fn test_localized_function_name() {
        let expr = parse_formula("=сумм(A1:A2)").unwrap();
        assert!(matches!(expr, FormulaExpr::Function { ref name, .. } if name == "СУММ"));
    }

    #[test]
    fn test_call_shaped_reference_is_function() {
        assert!(matches!(
            parse_formula("=LOG10(100)").unwrap(),
            FormulaExpr::Function { .. }
        ));
    }

    #[test]
    fn test_bare_criteria_arguments() {
        let FormulaExpr::Function { args, .. } = parse_formula("=COUNTIF(A1:A5,>=5)").unwrap()
        else {
            panic!("expected function");
        };
        assert_eq!(
            args[1],
            FormulaExpr::Criteria {
                op: BinaryOperator::GreaterEqual,
                operand: Box::new(n(5.0)),
            }
        );

        let FormulaExpr::Function { args, .. } = parse_formula("=COUNTIF(A1:A5,<>done)").unwrap()
        else {
            panic!("expected function");
        };
        assert_eq!(
            args[1],
            FormulaExpr::Criteria {
                op: BinaryOperator::NotEqual,
                operand: Box::new(FormulaExpr::NameRef("done".into())),
            }
        );
    }

    #[test]
    fn test_malformed_formulas() {
        for text in [
            "1+2", "=", "=1+", "=(1+2", "=1 2", "=1 $ 2", "=SUM(A1,)", "=SUM(A1", "=)",
        ] {
            assert!(parse_formula(text).is_err(), "{} should not parse", text);
        }
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| format!("={}1{}", "(".repeat(depth), ")".repeat(depth));

        assert_eq!(parse_formula(&nested(MAX_NESTING - 1)).unwrap(), n(1.0));
        assert!(matches!(
            parse_formula(&nested(100_000)),
            Err(FormulaError::Parse(_))
        ));
        assert!(parse_formula(&format!("={}1", "-".repeat(100_000))).is_err());
        assert!(parse_formula(&format!("=1{}", "^2".repeat(100_000))).is_err());

        let calls = format!("={}1{}", "SUM(".repeat(100_000), ")".repeat(100_000));
        assert!(parse_formula(&calls).is_err());
    }

    #[test]
    fn test_height_limit() {
        let chain = |terms: usize| format!("=1{}", "+1".repeat(terms - 1));

        // 200 terms make a tree 200 nodes tall
        assert!(parse_formula(&chain(200)).is_ok());
        assert!(parse_formula(&chain(MAX_HEIGHT + 1)).is_err());
        assert!(parse_formula(&format!("=1{}", "%".repeat(100_000))).is_err());
    }

    #[test]
    fn test_collects_references_in_order() {
        let expr = parse_formula("=SUM(A1:A3)+B7*2").unwrap();
        assert_eq!(
            expr.references(),
            vec![
                CellRange::parse("A1:A3").unwrap(),
                CellRange::parse("B7").unwrap(),
            ]
        );
    }
}
