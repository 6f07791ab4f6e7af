// ==========================================
// 产品配置引擎 - 公式求值器
// ==========================================
// 职责: 解析并求值算术表达式 (消耗量/重量/技术参数公式)
// 文法: 数字 | 标识符 | + - * / % ^ | 一元负号 | 括号
//       比较 < <= > >= == != (结果 1/0, 供 if 使用)
//       函数 min max abs round ceil floor sqrt pow if
// 红线: 纯函数, 无共享状态, 永不 panic, 失败一律以数据返回
// ==========================================

use crate::domain::types::FormulaCode;
use serde::Serialize;
use std::collections::BTreeMap;

/// 公式求值结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormulaOutcome {
    pub result: Option<f64>,
    pub code: FormulaCode,
    pub message: Option<String>,
    /// 求值过程中解析到的变量
    pub variables: BTreeMap<String, f64>,
}

impl FormulaOutcome {
    fn ok(result: f64, variables: BTreeMap<String, f64>) -> Self {
        Self {
            result: Some(result),
            code: FormulaCode::Ok,
            message: None,
            variables,
        }
    }

    pub fn failure(code: FormulaCode, message: impl Into<String>) -> Self {
        Self {
            result: None,
            code,
            message: Some(message.into()),
            variables: BTreeMap::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code.is_ok()
    }
}

/// 内部错误 (转换为 FormulaOutcome)
#[derive(Debug, Clone, PartialEq)]
struct FormulaFault {
    code: FormulaCode,
    message: String,
}

impl FormulaFault {
    fn new(code: FormulaCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn parse(message: impl Into<String>) -> Self {
        Self::new(FormulaCode::ParseError, message)
    }
}

// ==========================================
// 词法
// ==========================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Op(char),
    Cmp(&'static str),
    LParen,
    RParen,
    Comma,
}

fn tokenize(text: &str) -> Result<Vec<Token>, FormulaFault> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| FormulaFault::parse(format!("无效数字: {}", literal)))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '.')
                {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            '+' | '-' | '*' | '/' | '%' | '^' => {
                tokens.push(Token::Op(c));
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' | ';' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '<' | '>' | '=' | '!' => {
                let next = chars.get(i + 1).copied();
                let (symbol, width) = match (c, next) {
                    ('<', Some('=')) => ("<=", 2),
                    ('>', Some('=')) => (">=", 2),
                    ('=', Some('=')) => ("==", 2),
                    ('!', Some('=')) => ("!=", 2),
                    ('<', _) => ("<", 1),
                    ('>', _) => (">", 1),
                    _ => return Err(FormulaFault::parse(format!("无效运算符: {}", c))),
                };
                tokens.push(Token::Cmp(symbol));
                i += width;
            }
            other => return Err(FormulaFault::parse(format!("无效字符: {}", other))),
        }
    }

    Ok(tokens)
}

// ==========================================
// 语法
// ==========================================

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Number(f64),
    Variable(String),
    Negate(Box<Expr>),
    Binary(char, Box<Expr>, Box<Expr>),
    Compare(&'static str, Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

/// 最大嵌套深度 (括号 / 一元符号 / 函数参数 / 幂指数)
const MAX_DEPTH: usize = 256;
/// 最大符号数; 限制左结合长链生成的语法树深度
const MAX_TOKENS: usize = 1024;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn parse(mut self) -> Result<Expr, FormulaFault> {
        if self.tokens.len() > MAX_TOKENS {
            return Err(FormulaFault::parse(format!(
                "公式过长: {} 个符号 (上限 {})",
                self.tokens.len(),
                MAX_TOKENS
            )));
        }
        let expr = self.comparison()?;
        match self.peek() {
            None => Ok(expr),
            Some(token) => Err(FormulaFault::parse(format!("多余的符号: {:?}", token))),
        }
    }

    fn comparison(&mut self) -> Result<Expr, FormulaFault> {
        let left = self.additive()?;
        if let Some(Token::Cmp(symbol)) = self.peek() {
            let symbol = *symbol;
            self.pos += 1;
            let right = self.additive()?;
            return Ok(Expr::Compare(symbol, Box::new(left), Box::new(right)));
        }
        Ok(left)
    }

    fn additive(&mut self) -> Result<Expr, FormulaFault> {
        let mut left = self.multiplicative()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let right = self.multiplicative()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> Result<Expr, FormulaFault> {
        let mut left = self.unary()?;
        while let Some(Token::Op(op @ ('*' | '/' | '%'))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let right = self.unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    /// 所有嵌套路径都经过这里, 深度在此计数
    fn unary(&mut self) -> Result<Expr, FormulaFault> {
        if self.depth >= MAX_DEPTH {
            return Err(FormulaFault::parse("嵌套过深"));
        }
        self.depth += 1;
        let expr = self.signed();
        self.depth -= 1;
        expr
    }

    fn signed(&mut self) -> Result<Expr, FormulaFault> {
        match self.peek() {
            Some(Token::Op('-')) => {
                self.pos += 1;
                Ok(Expr::Negate(Box::new(self.unary()?)))
            }
            Some(Token::Op('+')) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    /// 幂运算右结合
    fn power(&mut self) -> Result<Expr, FormulaFault> {
        let base = self.primary()?;
        if let Some(Token::Op('^')) = self.peek() {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(Expr::Binary('^', Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, FormulaFault> {
        match self.advance() {
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::Ident(name)) => {
                if let Some(Token::LParen) = self.peek() {
                    self.pos += 1;
                    let args = self.arguments()?;
                    Ok(Expr::Call(name.to_lowercase(), args))
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            Some(Token::LParen) => {
                let inner = self.comparison()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(FormulaFault::parse("缺少右括号")),
                }
            }
            Some(token) => Err(FormulaFault::parse(format!("意外的符号: {:?}", token))),
            None => Err(FormulaFault::parse("表达式意外结束")),
        }
    }

    fn arguments(&mut self) -> Result<Vec<Expr>, FormulaFault> {
        let mut args = Vec::new();
        if let Some(Token::RParen) = self.peek() {
            self.pos += 1;
            return Ok(args);
        }
        loop {
            args.push(self.comparison()?);
            match self.advance() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => return Ok(args),
                _ => return Err(FormulaFault::parse("函数参数列表未闭合")),
            }
        }
    }
}

// ==========================================
// 求值
// ==========================================

struct Evaluation<'a> {
    variables: &'a BTreeMap<String, f64>,
    resolved: BTreeMap<String, f64>,
}

impl<'a> Evaluation<'a> {
    fn eval(&mut self, expr: &Expr) -> Result<f64, FormulaFault> {
        match expr {
            Expr::Number(value) => Ok(*value),
            Expr::Variable(name) => match self.variables.get(name) {
                Some(value) => {
                    self.resolved.insert(name.clone(), *value);
                    Ok(*value)
                }
                None => Err(FormulaFault::new(
                    FormulaCode::UnknownVariable,
                    format!("未知变量: {}", name),
                )),
            },
            Expr::Negate(inner) => Ok(-self.eval(inner)?),
            Expr::Binary(op, left, right) => {
                let l = self.eval(left)?;
                let r = self.eval(right)?;
                match op {
                    '+' => Ok(l + r),
                    '-' => Ok(l - r),
                    '*' => Ok(l * r),
                    '/' | '%' if r == 0.0 => Err(FormulaFault::new(
                        FormulaCode::DivisionByZero,
                        "除数为零",
                    )),
                    '/' => Ok(l / r),
                    '%' => Ok(l % r),
                    '^' => Ok(l.powf(r)),
                    other => Err(FormulaFault::parse(format!("未知运算符: {}", other))),
                }
            }
            Expr::Compare(symbol, left, right) => {
                let l = self.eval(left)?;
                let r = self.eval(right)?;
                let truth = match *symbol {
                    "<" => l < r,
                    "<=" => l <= r,
                    ">" => l > r,
                    ">=" => l >= r,
                    "==" => l == r,
                    "!=" => l != r,
                    other => return Err(FormulaFault::parse(format!("未知比较符: {}", other))),
                };
                Ok(if truth { 1.0 } else { 0.0 })
            }
            Expr::Call(name, args) => self.call(name, args),
        }
    }

    fn call(&mut self, name: &str, args: &[Expr]) -> Result<f64, FormulaFault> {
        let arity = |expected: &str, ok: bool| {
            if ok {
                Ok(())
            } else {
                Err(FormulaFault::new(
                    FormulaCode::ArityMismatch,
                    format!("函数 {} 需要 {} 个参数, 实际 {}", name, expected, args.len()),
                ))
            }
        };

        match name {
            "if" => {
                arity("3", args.len() == 3)?;
                // 只求值被选中的分支
                if self.eval(&args[0])? != 0.0 {
                    self.eval(&args[1])
                } else {
                    self.eval(&args[2])
                }
            }
            "min" | "max" => {
                arity("至少 1", !args.is_empty())?;
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(arg)?);
                }
                let folded = if name == "min" {
                    values.into_iter().fold(f64::INFINITY, f64::min)
                } else {
                    values.into_iter().fold(f64::NEG_INFINITY, f64::max)
                };
                Ok(folded)
            }
            "round" => {
                arity("1 或 2", matches!(args.len(), 1 | 2))?;
                let value = self.eval(&args[0])?;
                let digits = match args.get(1) {
                    Some(arg) => self.eval(arg)?,
                    None => 0.0,
                };
                let factor = 10f64.powi(digits as i32);
                Ok((value * factor).round() / factor)
            }
            "abs" | "ceil" | "floor" | "sqrt" => {
                arity("1", args.len() == 1)?;
                let value = self.eval(&args[0])?;
                Ok(match name {
                    "abs" => value.abs(),
                    "ceil" => value.ceil(),
                    "floor" => value.floor(),
                    _ => value.sqrt(),
                })
            }
            "pow" => {
                arity("2", args.len() == 2)?;
                let base = self.eval(&args[0])?;
                let exponent = self.eval(&args[1])?;
                Ok(base.powf(exponent))
            }
            other => Err(FormulaFault::new(
                FormulaCode::UnknownFunction,
                format!("未知函数: {}", other),
            )),
        }
    }
}

// ==========================================
// FormulaEvaluator - 公式求值器
// ==========================================
pub struct FormulaEvaluator;

impl FormulaEvaluator {
    /// 求值公式
    ///
    /// # 返回
    /// - code=OK: result 为数值结果
    /// - 其他 code: result=None, message 说明失败原因
    /// - variables: 已解析的变量 (失败时包含失败前解析到的部分)
    pub fn evaluate(formula: &str, variables: &BTreeMap<String, f64>) -> FormulaOutcome {
        if formula.trim().is_empty() {
            return FormulaOutcome::failure(FormulaCode::EmptyFormula, "公式为空");
        }

        let expr = match tokenize(formula).and_then(|tokens| Parser::new(tokens).parse()) {
            Ok(expr) => expr,
            Err(fault) => return FormulaOutcome::failure(fault.code, fault.message),
        };

        let mut evaluation = Evaluation {
            variables,
            resolved: BTreeMap::new(),
        };
        match evaluation.eval(&expr) {
            Ok(value) if value.is_finite() => FormulaOutcome::ok(value, evaluation.resolved),
            Ok(value) => FormulaOutcome {
                result: None,
                code: FormulaCode::NonFinite,
                message: Some(format!("结果非有限数: {}", value)),
                variables: evaluation.resolved,
            },
            Err(fault) => FormulaOutcome {
                result: None,
                code: fault.code,
                message: Some(fault.message),
                variables: evaluation.resolved,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> BTreeMap<String, f64> {
        let mut v = BTreeMap::new();
        v.insert("width".to_string(), 1200.0);
        v.insert("height".to_string(), 800.0);
        v.insert("pieces".to_string(), 2.0);
        v
    }

    fn eval(text: &str) -> FormulaOutcome {
        FormulaEvaluator::evaluate(text, &vars())
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(eval("1 + 2 * 3").result, Some(7.0));
        assert_eq!(eval("(1 + 2) * 3").result, Some(9.0));
        assert_eq!(eval("-2 ^ 2").result, Some(-4.0));
        assert_eq!(eval("2 ^ 3 ^ 2").result, Some(512.0));
        assert_eq!(eval("10 % 4").result, Some(2.0));
    }

    #[test]
    fn test_variables_are_recorded() {
        let outcome = eval("(width + height) * 2 / 1000");
        assert_eq!(outcome.code, FormulaCode::Ok);
        assert_eq!(outcome.result, Some(4.0));
        assert_eq!(outcome.variables.len(), 2);
        assert_eq!(outcome.variables["width"], 1200.0);
    }

    #[test]
    fn test_functions() {
        assert_eq!(eval("max(width, height) / 100").result, Some(12.0));
        assert_eq!(eval("round(10 / 3, 2)").result, Some(3.33));
        assert_eq!(eval("ceil(width / 500)").result, Some(3.0));
        assert_eq!(eval("if(pieces > 1, 10, 20)").result, Some(10.0));
        assert_eq!(eval("if(pieces >= 3, 1 / 0, 5)").result, Some(5.0));
    }

    #[test]
    fn test_failure_codes() {
        assert_eq!(eval("").code, FormulaCode::EmptyFormula);
        assert_eq!(eval("width +").code, FormulaCode::ParseError);
        assert_eq!(eval("(width").code, FormulaCode::ParseError);
        assert_eq!(eval("width $ 2").code, FormulaCode::ParseError);
        assert_eq!(eval("depth * 2").code, FormulaCode::UnknownVariable);
        assert_eq!(eval("width / (pieces - 2)").code, FormulaCode::DivisionByZero);
        assert_eq!(eval("sqrt(0 - 1)").code, FormulaCode::NonFinite);
        assert_eq!(eval("cube(2)").code, FormulaCode::UnknownFunction);
        assert_eq!(eval("pow(2)").code, FormulaCode::ArityMismatch);
    }

    #[test]
    fn test_deep_nesting_is_parse_error() {
        let nested = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(eval(&nested).code, FormulaCode::ParseError);

        // 符号数在上限内, 嵌套深度超限
        let parens = format!("{}1{}", "(".repeat(300), ")".repeat(300));
        let outcome = eval(&parens);
        assert_eq!(outcome.code, FormulaCode::ParseError);
        assert!(outcome.message.unwrap().contains("嵌套过深"));

        let negations = format!("{}1", "-".repeat(500));
        assert_eq!(eval(&negations).code, FormulaCode::ParseError);

        let chain = vec!["1"; 100_000].join("+");
        let outcome = eval(&chain);
        assert_eq!(outcome.code, FormulaCode::ParseError);
        assert!(outcome.message.unwrap().contains("公式过长"));

        let moderate = format!("{}width{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(eval(&moderate).result, Some(1200.0));
    }

    #[test]
    fn test_partial_variables_kept_on_failure() {
        let outcome = eval("width + depth");
        assert_eq!(outcome.code, FormulaCode::UnknownVariable);
        assert!(outcome.result.is_none());
        assert!(outcome.message.unwrap().contains("depth"));
        assert_eq!(outcome.variables["width"], 1200.0);
    }
}
