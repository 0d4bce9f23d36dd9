//! Sandboxed arithmetic expressions of a single variable `x`.
//!
//! Question banks describe their graphs with a textual function body such as
//! `"Math.sin(x) / x"` or `"x < 2 ? x * x : 4"`. Bodies are parsed into a small
//! expression tree and evaluated directly; nothing outside the variable `x`, a
//! few constants and an allow-list of math functions can be reached.

use std::f64::consts;
use std::fmt;

/// Deepest expression tree a body may produce. Parentheses, calls, unary
/// operators and every link of a binary operator chain each count as a level.
const MAX_DEPTH: usize = 128;

/// Error produced while parsing a function body.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A character that cannot start any token.
    UnexpectedChar { pos: usize, ch: char },
    /// A token that does not fit the grammar at this point.
    UnexpectedToken { pos: usize, found: String },
    /// The body ended in the middle of an expression.
    UnexpectedEnd,
    /// A bare name that is neither `x` nor a known constant.
    UnknownIdentifier(String),
    /// A call to a function outside the allow-list.
    UnknownFunction(String),
    /// A known function called with the wrong number of arguments.
    Arity {
        name: String,
        expected: &'static str,
        found: usize,
    },
    /// Nesting exceeded [`MAX_DEPTH`].
    TooDeep,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedChar { pos, ch } => {
                write!(f, "unexpected character '{}' at {}", ch, pos)
            }
            ParseError::UnexpectedToken { pos, found } => {
                write!(f, "unexpected '{}' at {}", found, pos)
            }
            ParseError::UnexpectedEnd => write!(f, "unexpected end of expression"),
            ParseError::UnknownIdentifier(name) => write!(f, "unknown identifier '{}'", name),
            ParseError::UnknownFunction(name) => write!(f, "unknown function '{}'", name),
            ParseError::Arity {
                name,
                expected,
                found,
            } => write!(
                f,
                "{}() takes {} argument(s), got {}",
                name, expected, found
            ),
            ParseError::TooDeep => write!(f, "expression nested too deeply"),
        }
    }
}

impl std::error::Error for ParseError {}

/// A real-valued function of `x` built from a textual body.
///
/// [`Function::eval`] returns `None` wherever the function is undefined:
/// non-finite results (division by zero, `log` of a negative number, ...)
/// as well as every point of a function whose body failed to parse.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    expr: Option<Expr>,
}

impl Function {
    /// Parse `body` strictly, reporting the first syntax problem.
    pub fn parse(body: &str) -> Result<Self, ParseError> {
        let tokens = tokenize(body)?;
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.conditional()?;
        if let Some((pos, token)) = parser.peek_with_pos() {
            return Err(ParseError::UnexpectedToken {
                pos,
                found: token.to_string(),
            });
        }
        Ok(Self { expr: Some(expr) })
    }

    /// Build a function from `body`, degrading to [`Function::undefined`]
    /// when the body is malformed.
    pub fn compile(body: &str) -> Self {
        match Self::parse(body) {
            Ok(function) => function,
            Err(err) => {
                tracing::warn!("failed to compile function body {:?}: {}", body, err);
                Self::undefined()
            }
        }
    }

    /// A function that is undefined everywhere.
    pub fn undefined() -> Self {
        Self { expr: None }
    }

    /// Whether the body parsed.
    pub fn is_defined(&self) -> bool {
        self.expr.is_some()
    }

    /// Evaluate at `x`, yielding `None` for undefined or non-finite results.
    pub fn eval(&self, x: f64) -> Option<f64> {
        let value = self.expr.as_ref()?.eval(x);
        value.is_finite().then_some(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Num(f64),
    Var,
    Neg(Box<Expr>),
    Not(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Cond(Box<Expr>, Box<Expr>, Box<Expr>),
    Call(Func, Vec<Expr>),
}

impl Expr {
    fn eval(&self, x: f64) -> f64 {
        match self {
            Expr::Num(value) => *value,
            Expr::Var => x,
            Expr::Neg(inner) => -inner.eval(x),
            Expr::Not(inner) => truth(inner.eval(x) == 0.0),
            Expr::Binary(op, lhs, rhs) => op.apply(lhs.eval(x), rhs.eval(x)),
            Expr::Cond(cond, then, otherwise) => {
                let c = cond.eval(x);
                if c != 0.0 && !c.is_nan() {
                    then.eval(x)
                } else {
                    otherwise.eval(x)
                }
            }
            Expr::Call(func, args) => {
                let values: Vec<f64> = args.iter().map(|arg| arg.eval(x)).collect();
                func.apply(&values)
            }
        }
    }
}

fn truth(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinOp {
    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinOp::Add => a + b,
            BinOp::Sub => a - b,
            BinOp::Mul => a * b,
            BinOp::Div => a / b,
            BinOp::Rem => a % b,
            BinOp::Pow => a.powf(b),
            BinOp::Eq => truth(a == b),
            BinOp::Ne => truth(a != b),
            BinOp::Lt => truth(a < b),
            BinOp::Le => truth(a <= b),
            BinOp::Gt => truth(a > b),
            BinOp::Ge => truth(a >= b),
            BinOp::And => truth(a != 0.0 && b != 0.0),
            BinOp::Or => truth(a != 0.0 || b != 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Func {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
    Exp,
    Expm1,
    Ln,
    Log10,
    Log2,
    Log1p,
    Sqrt,
    Cbrt,
    Abs,
    Floor,
    Ceil,
    Round,
    Trunc,
    Sign,
    Pow,
    Hypot,
    Min,
    Max,
}

enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Func {
    fn lookup(name: &str) -> Option<Self> {
        let func = match name {
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "asin" => Func::Asin,
            "acos" => Func::Acos,
            "atan" => Func::Atan,
            "atan2" => Func::Atan2,
            "sinh" => Func::Sinh,
            "cosh" => Func::Cosh,
            "tanh" => Func::Tanh,
            "asinh" => Func::Asinh,
            "acosh" => Func::Acosh,
            "atanh" => Func::Atanh,
            "exp" => Func::Exp,
            "expm1" => Func::Expm1,
            "log" | "ln" => Func::Ln,
            "log10" => Func::Log10,
            "log2" => Func::Log2,
            "log1p" => Func::Log1p,
            "sqrt" => Func::Sqrt,
            "cbrt" => Func::Cbrt,
            "abs" => Func::Abs,
            "floor" => Func::Floor,
            "ceil" => Func::Ceil,
            "round" => Func::Round,
            "trunc" => Func::Trunc,
            "sign" => Func::Sign,
            "pow" => Func::Pow,
            "hypot" => Func::Hypot,
            "min" => Func::Min,
            "max" => Func::Max,
            _ => return None,
        };
        Some(func)
    }

    fn arity(self) -> Arity {
        match self {
            Func::Atan2 | Func::Pow | Func::Hypot => Arity::Exact(2),
            Func::Min | Func::Max => Arity::AtLeast(1),
            _ => Arity::Exact(1),
        }
    }

    fn check_arity(self, name: &str, found: usize) -> Result<(), ParseError> {
        let (ok, expected) = match self.arity() {
            Arity::Exact(n) => (found == n, if n == 1 { "1" } else { "2" }),
            Arity::AtLeast(n) => (found >= n, "at least 1"),
        };
        if ok {
            Ok(())
        } else {
            Err(ParseError::Arity {
                name: name.to_string(),
                expected,
                found,
            })
        }
    }

    fn apply(self, args: &[f64]) -> f64 {
        let a = args.first().copied().unwrap_or(f64::NAN);
        let b = args.get(1).copied().unwrap_or(f64::NAN);
        match self {
            Func::Sin => a.sin(),
            Func::Cos => a.cos(),
            Func::Tan => a.tan(),
            Func::Asin => a.asin(),
            Func::Acos => a.acos(),
            Func::Atan => a.atan(),
            Func::Atan2 => a.atan2(b),
            Func::Sinh => a.sinh(),
            Func::Cosh => a.cosh(),
            Func::Tanh => a.tanh(),
            Func::Asinh => a.asinh(),
            Func::Acosh => a.acosh(),
            Func::Atanh => a.atanh(),
            Func::Exp => a.exp(),
            Func::Expm1 => a.exp_m1(),
            Func::Ln => a.ln(),
            Func::Log10 => a.log10(),
            Func::Log2 => a.log2(),
            Func::Log1p => a.ln_1p(),
            Func::Sqrt => a.sqrt(),
            Func::Cbrt => a.cbrt(),
            Func::Abs => a.abs(),
            Func::Floor => a.floor(),
            Func::Ceil => a.ceil(),
            // Halves round toward positive infinity.
            Func::Round => (a + 0.5).floor(),
            Func::Trunc => a.trunc(),
            Func::Sign => {
                if a > 0.0 {
                    1.0
                } else if a < 0.0 {
                    -1.0
                } else {
                    a
                }
            }
            Func::Pow => a.powf(b),
            Func::Hypot => a.hypot(b),
            Func::Min => args.iter().copied().fold(f64::INFINITY, nan_min),
            Func::Max => args.iter().copied().fold(f64::NEG_INFINITY, nan_max),
        }
    }
}

fn nan_min(acc: f64, value: f64) -> f64 {
    if acc.is_nan() || value.is_nan() {
        f64::NAN
    } else {
        acc.min(value)
    }
}

fn nan_max(acc: f64, value: f64) -> f64 {
    if acc.is_nan() || value.is_nan() {
        f64::NAN
    } else {
        acc.max(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
    Comma,
    Question,
    Colon,
    Bang,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    Ne,
    AndAnd,
    OrOr,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Token::Num(value) => return write!(f, "{}", value),
            Token::Ident(name) => return write!(f, "{}", name),
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Caret => "^",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Comma => ",",
            Token::Question => "?",
            Token::Colon => ":",
            Token::Bang => "!",
            Token::Lt => "<",
            Token::Le => "<=",
            Token::Gt => ">",
            Token::Ge => ">=",
            Token::EqEq => "==",
            Token::Ne => "!=",
            Token::AndAnd => "&&",
            Token::OrOr => "||",
        };
        f.write_str(symbol)
    }
}

fn tokenize(body: &str) -> Result<Vec<(usize, Token)>, ParseError> {
    let chars: Vec<char> = body.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let start = i;

        if ch.is_whitespace() {
            i += 1;
            continue;
        }

        if ch.is_ascii_digit() || (ch == '.' && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit())) {
            i = scan_number(&chars, i);
            let text: String = chars[start..i].iter().collect();
            let value = text
                .parse::<f64>()
                .map_err(|_| ParseError::UnexpectedToken {
                    pos: start,
                    found: text.clone(),
                })?;
            tokens.push((start, Token::Num(value)));
            continue;
        }

        if ch.is_ascii_alphabetic() || ch == '_' {
            let mut name = scan_ident(&chars, &mut i);
            // `Math.sin` and friends read as their bare names.
            if name == "Math" && chars.get(i) == Some(&'.') {
                i += 1;
                if !chars.get(i).is_some_and(|c| c.is_ascii_alphabetic()) {
                    return Err(ParseError::UnexpectedToken {
                        pos: start,
                        found: "Math.".to_string(),
                    });
                }
                name = scan_ident(&chars, &mut i);
            }
            tokens.push((start, Token::Ident(name)));
            continue;
        }

        let next = chars.get(i + 1).copied();
        let (token, width) = match (ch, next) {
            ('*', Some('*')) => (Token::Caret, 2),
            ('<', Some('=')) => (Token::Le, 2),
            ('>', Some('=')) => (Token::Ge, 2),
            ('=', Some('=')) => (Token::EqEq, if chars.get(i + 2) == Some(&'=') { 3 } else { 2 }),
            ('!', Some('=')) => (Token::Ne, if chars.get(i + 2) == Some(&'=') { 3 } else { 2 }),
            ('&', Some('&')) => (Token::AndAnd, 2),
            ('|', Some('|')) => (Token::OrOr, 2),
            ('+', _) => (Token::Plus, 1),
            ('-', _) => (Token::Minus, 1),
            ('*', _) => (Token::Star, 1),
            ('/', _) => (Token::Slash, 1),
            ('%', _) => (Token::Percent, 1),
            ('^', _) => (Token::Caret, 1),
            ('(', _) => (Token::LParen, 1),
            (')', _) => (Token::RParen, 1),
            (',', _) => (Token::Comma, 1),
            ('?', _) => (Token::Question, 1),
            (':', _) => (Token::Colon, 1),
            ('!', _) => (Token::Bang, 1),
            ('<', _) => (Token::Lt, 1),
            ('>', _) => (Token::Gt, 1),
            _ => return Err(ParseError::UnexpectedChar { pos: start, ch }),
        };
        tokens.push((start, token));
        i += width;
    }

    Ok(tokens)
}

fn scan_number(chars: &[char], mut i: usize) -> usize {
    while chars.get(i).is_some_and(|c| c.is_ascii_digit()) {
        i += 1;
    }
    if chars.get(i) == Some(&'.') {
        i += 1;
        while chars.get(i).is_some_and(|c| c.is_ascii_digit()) {
            i += 1;
        }
    }
    if matches!(chars.get(i), Some('e') | Some('E')) {
        let mut j = i + 1;
        if matches!(chars.get(j), Some('+') | Some('-')) {
            j += 1;
        }
        if chars.get(j).is_some_and(|c| c.is_ascii_digit()) {
            i = j;
            while chars.get(i).is_some_and(|c| c.is_ascii_digit()) {
                i += 1;
            }
        }
    }
    i
}

fn scan_ident(chars: &[char], i: &mut usize) -> String {
    let start = *i;
    while chars
        .get(*i)
        .is_some_and(|c| c.is_ascii_alphanumeric() || *c == '_')
    {
        *i += 1;
    }
    chars[start..*i].iter().collect()
}

struct Parser<'a> {
    tokens: &'a [(usize, Token)],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, token)| token)
    }

    fn peek_with_pos(&self) -> Option<(usize, &Token)> {
        self.tokens.get(self.pos).map(|(pos, token)| (*pos, token))
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), ParseError> {
        if self.eat(expected) {
            return Ok(());
        }
        Err(self.unexpected())
    }

    fn unexpected(&self) -> ParseError {
        match self.peek_with_pos() {
            Some((pos, token)) => ParseError::UnexpectedToken {
                pos,
                found: token.to_string(),
            },
            None => ParseError::UnexpectedEnd,
        }
    }

    fn descend(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::TooDeep);
        }
        Ok(())
    }

    /// Account for one more operator in a left-associative chain.
    fn link(&mut self, links: &mut usize) -> Result<(), ParseError> {
        self.descend()?;
        *links += 1;
        Ok(())
    }

    fn conditional(&mut self) -> Result<Expr, ParseError> {
        self.descend()?;
        let cond = self.or()?;
        let expr = if self.eat(&Token::Question) {
            let then = self.conditional()?;
            self.expect(&Token::Colon)?;
            let otherwise = self.conditional()?;
            Expr::Cond(Box::new(cond), Box::new(then), Box::new(otherwise))
        } else {
            cond
        };
        self.depth -= 1;
        Ok(expr)
    }

    fn or(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.and()?;
        let mut links = 0;
        while self.eat(&Token::OrOr) {
            self.link(&mut links)?;
            let rhs = self.and()?;
            lhs = Expr::Binary(BinOp::Or, Box::new(lhs), Box::new(rhs));
        }
        self.depth -= links;
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.comparison()?;
        let mut links = 0;
        while self.eat(&Token::AndAnd) {
            self.link(&mut links)?;
            let rhs = self.comparison()?;
            lhs = Expr::Binary(BinOp::And, Box::new(lhs), Box::new(rhs));
        }
        self.depth -= links;
        Ok(lhs)
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.additive()?;
        let mut links = 0;
        loop {
            let op = match self.peek() {
                Some(Token::EqEq) => BinOp::Eq,
                Some(Token::Ne) => BinOp::Ne,
                Some(Token::Lt) => BinOp::Lt,
                Some(Token::Le) => BinOp::Le,
                Some(Token::Gt) => BinOp::Gt,
                Some(Token::Ge) => BinOp::Ge,
                _ => break,
            };
            self.pos += 1;
            self.link(&mut links)?;
            let rhs = self.additive()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        self.depth -= links;
        Ok(lhs)
    }

    fn additive(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.multiplicative()?;
        let mut links = 0;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            self.link(&mut links)?;
            let rhs = self.multiplicative()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        self.depth -= links;
        Ok(lhs)
    }

    fn multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.unary()?;
        let mut links = 0;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::Percent) => BinOp::Rem,
                _ => break,
            };
            self.pos += 1;
            self.link(&mut links)?;
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        self.depth -= links;
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        self.descend()?;
        let expr = if self.eat(&Token::Minus) {
            Expr::Neg(Box::new(self.unary()?))
        } else if self.eat(&Token::Plus) {
            self.unary()?
        } else if self.eat(&Token::Bang) {
            Expr::Not(Box::new(self.unary()?))
        } else {
            self.power()?
        };
        self.depth -= 1;
        Ok(expr)
    }

    fn power(&mut self) -> Result<Expr, ParseError> {
        let base = self.primary()?;
        if self.eat(&Token::Caret) {
            // Right associative, and `2^-1` is allowed.
            let exponent = self.unary()?;
            return Ok(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let Some((_, token)) = self.peek_with_pos() else {
            return Err(ParseError::UnexpectedEnd);
        };

        match token.clone() {
            Token::Num(value) => {
                self.pos += 1;
                Ok(Expr::Num(value))
            }
            Token::LParen => {
                self.pos += 1;
                let inner = self.conditional()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Token::Ident(name) => {
                self.pos += 1;
                if self.eat(&Token::LParen) {
                    self.call(&name)
                } else {
                    resolve_name(&name)
                }
            }
            _ => Err(self.unexpected()),
        }
    }

    fn call(&mut self, name: &str) -> Result<Expr, ParseError> {
        let func = Func::lookup(name).ok_or_else(|| ParseError::UnknownFunction(name.to_string()))?;

        let mut args = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                args.push(self.conditional()?);
                if self.eat(&Token::Comma) {
                    continue;
                }
                self.expect(&Token::RParen)?;
                break;
            }
        }

        func.check_arity(name, args.len())?;
        Ok(Expr::Call(func, args))
    }
}

fn resolve_name(name: &str) -> Result<Expr, ParseError> {
    match name {
        "x" => Ok(Expr::Var),
        "pi" | "PI" => Ok(Expr::Num(consts::PI)),
        "e" | "E" => Ok(Expr::Num(consts::E)),
        _ => Err(ParseError::UnknownIdentifier(name.to_string())),
    }
}
