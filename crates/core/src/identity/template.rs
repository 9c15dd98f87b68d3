//! Minimal text template engine for the `email_template` setting.
//!
//! Supports a small, side-effect-free subset of Go-style templates:
//!
//! ```text
//! {{.Username}}@example.com
//! {{replace (toLower .Name) " " "." -1}}@example.com
//! {{index (split .Name " ") 0 | toLower}}@example.com
//! {{with split .Name " "}}{{index . 0}}.{{index . 1}}{{end}}@example.com
//! ```
//!
//! Fields: `.Initials`, `.Name`, `.Username`.
//! Functions: `toLower`, `toUpper`, `split`, `replace`, `index`.
//! In a pipeline the previous value is passed as the final argument of the
//! next command. `{{-` and `-}}` trim whitespace around an action.
//!
//! `{{with pipeline}}...{{else}}...{{end}}` renders its body with `.` set to
//! the pipeline value when that value is non-empty, otherwise the `else`
//! branch. Fields are only available outside a `with` body.
//!
//! Not supported: `if`, `range`, `printf`, variables and `define`/`template`.

use crate::errors::TemplateError;

/// Values available to a template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    pub initials: &'a str,
    pub name: &'a str,
    pub username: &'a str,
}

/// A parsed email template.
#[derive(Debug, Clone)]
pub struct EmailTemplate {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone)]
enum Node {
    Text(String),
    Action(Pipeline),
    With {
        pipeline: Pipeline,
        body: Vec<Node>,
        otherwise: Vec<Node>,
    },
}

/// A `with` block still waiting for its `{{end}}`.
struct OpenWith {
    pipeline: Pipeline,
    at: usize,
    body: Vec<Node>,
    otherwise: Option<Vec<Node>>,
}

impl OpenWith {
    fn active(&mut self) -> &mut Vec<Node> {
        match &mut self.otherwise {
            Some(otherwise) => otherwise,
            None => &mut self.body,
        }
    }

    fn close(self) -> Node {
        Node::With {
            pipeline: self.pipeline,
            body: self.body,
            otherwise: self.otherwise.unwrap_or_default(),
        }
    }
}

/// Where the next node goes: the innermost open `with`, or the top level.
fn target<'b>(root: &'b mut Vec<Node>, open: &'b mut [OpenWith]) -> &'b mut Vec<Node> {
    match open.last_mut() {
        Some(block) => block.active(),
        None => root,
    }
}

#[derive(Debug, Clone)]
struct Pipeline {
    commands: Vec<Command>,
}

#[derive(Debug, Clone)]
struct Command {
    operands: Vec<Operand>,
}

#[derive(Debug, Clone)]
enum Operand {
    Dot,
    Field(Field),
    Str(String),
    Int(i64),
    Func(Func),
    Pipeline(Pipeline),
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Initials,
    Name,
    Username,
}

impl Field {
    fn name(self) -> &'static str {
        match self {
            Self::Initials => "Initials",
            Self::Name => "Name",
            Self::Username => "Username",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Func {
    ToLower,
    ToUpper,
    Split,
    Replace,
    Index,
}

impl Func {
    fn lookup(name: &str) -> Option<Self> {
        match name {
            "toLower" => Some(Self::ToLower),
            "toUpper" => Some(Self::ToUpper),
            "split" => Some(Self::Split),
            "replace" => Some(Self::Replace),
            "index" => Some(Self::Index),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::ToLower => "toLower",
            Self::ToUpper => "toUpper",
            Self::Split => "split",
            Self::Replace => "replace",
            Self::Index => "index",
        }
    }

    fn call(self, args: Vec<Value>) -> Result<Value, TemplateError> {
        let mut args = args.into_iter();
        let value = match self {
            Self::ToLower => {
                let [s] = take_args::<1>(self, &mut args)?;
                Value::Str(s.into_str(self)?.to_lowercase())
            }
            Self::ToUpper => {
                let [s] = take_args::<1>(self, &mut args)?;
                Value::Str(s.into_str(self)?.to_uppercase())
            }
            Self::Split => {
                let [s, sep] = take_args::<2>(self, &mut args)?;
                let (s, sep) = (s.into_str(self)?, sep.into_str(self)?);
                let parts = if sep.is_empty() {
                    s.chars().map(String::from).collect()
                } else {
                    s.split(sep.as_str()).map(String::from).collect()
                };
                Value::List(parts)
            }
            Self::Replace => {
                let [s, old, new, n] = take_args::<4>(self, &mut args)?;
                let (s, old, new) = (s.into_str(self)?, old.into_str(self)?, new.into_str(self)?);
                let n = n.into_int(self)?;
                if n < 0 {
                    Value::Str(s.replace(old.as_str(), &new))
                } else {
                    let count = usize::try_from(n).unwrap_or(usize::MAX);
                    Value::Str(s.replacen(old.as_str(), &new, count))
                }
            }
            Self::Index => {
                let [list, i] = take_args::<2>(self, &mut args)?;
                let type_name = list.type_name();
                let Value::List(items) = list else {
                    return Err(TemplateError::Render(format!(
                        "index: can't index item of type {type_name}"
                    )));
                };
                let i = i.into_int(self)?;
                let len = items.len();
                usize::try_from(i)
                    .ok()
                    .and_then(|i| items.into_iter().nth(i))
                    .map(Value::Str)
                    .ok_or_else(|| {
                        TemplateError::Render(format!("index: index out of range: {i} (len {len})"))
                    })?
            }
        };
        Ok(value)
    }
}

/// Pull exactly `N` arguments for `func`.
fn take_args<const N: usize>(
    func: Func,
    args: &mut std::vec::IntoIter<Value>,
) -> Result<[Value; N], TemplateError> {
    let got = args.len();
    let wrong_count = || {
        TemplateError::Render(format!(
            "wrong number of args for {}: want {N} got {got}",
            func.name()
        ))
    };
    if got != N {
        return Err(wrong_count());
    }
    let collected: Vec<Value> = args.collect();
    collected.try_into().map_err(|_| wrong_count())
}

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Int(i64),
    List(Vec<String>),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Int(_) => "int",
            Self::List(_) => "list",
        }
    }

    fn into_str(self, func: Func) -> Result<String, TemplateError> {
        match self {
            Self::Str(s) => Ok(s),
            other => Err(TemplateError::Render(format!(
                "{}: expected string, got {}",
                func.name(),
                other.type_name()
            ))),
        }
    }

    fn into_int(self, func: Func) -> Result<i64, TemplateError> {
        match self {
            Self::Int(n) => Ok(n),
            other => Err(TemplateError::Render(format!(
                "{}: expected int, got {}",
                func.name(),
                other.type_name()
            ))),
        }
    }

    /// Go's notion of truth: empty strings and lists and zero are false.
    fn is_truthy(&self) -> bool {
        match self {
            Self::Str(s) => !s.is_empty(),
            Self::Int(n) => *n != 0,
            Self::List(items) => !items.is_empty(),
        }
    }

    fn write_to(&self, out: &mut String) {
        match self {
            Self::Str(s) => out.push_str(s),
            Self::Int(n) => out.push_str(&n.to_string()),
            Self::List(items) => {
                out.push('[');
                out.push_str(&items.join(" "));
                out.push(']');
            }
        }
    }
}

impl EmailTemplate {
    /// Parse a template source string.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut root = Vec::new();
        let mut open: Vec<OpenWith> = Vec::new();
        let mut pos = 0;
        let mut trim_next_text = false;

        while pos < source.len() {
            let Some(action_at) = source[pos..].find("{{").map(|i| pos + i) else {
                push_text(target(&mut root, &mut open), &source[pos..], trim_next_text, false);
                break;
            };

            let mut body_start = action_at + 2;
            let trim_prev_text = is_trim_marker(&source[body_start..]);
            if trim_prev_text {
                body_start += 1;
            }
            push_text(
                target(&mut root, &mut open),
                &source[pos..action_at],
                trim_next_text,
                trim_prev_text,
            );

            let mut lexer = Lexer::new(source, body_start);
            let (tokens, trim_after) = lexer.action_tokens(action_at)?;
            pos = lexer.pos;
            trim_next_text = trim_after;

            if is_comment(&tokens) {
                continue;
            }

            match tokens.first() {
                Some((Token::Ident(keyword), _)) if keyword == "with" => {
                    let pipeline = whole_pipeline(&tokens[1..], action_at)?;
                    open.push(OpenWith {
                        pipeline,
                        at: action_at,
                        body: Vec::new(),
                        otherwise: None,
                    });
                }
                Some((Token::Ident(keyword), _)) if keyword == "else" => {
                    expect_bare_keyword(&tokens, "else")?;
                    let Some(block) = open.last_mut() else {
                        return Err(parse_error(action_at, "unexpected {{else}}"));
                    };
                    if block.otherwise.is_some() {
                        return Err(parse_error(action_at, "multiple {{else}} in with"));
                    }
                    block.otherwise = Some(Vec::new());
                }
                Some((Token::Ident(keyword), _)) if keyword == "end" => {
                    expect_bare_keyword(&tokens, "end")?;
                    let Some(block) = open.pop() else {
                        return Err(parse_error(action_at, "unexpected {{end}}"));
                    };
                    target(&mut root, &mut open).push(block.close());
                }
                _ => {
                    let pipeline = whole_pipeline(&tokens, action_at)?;
                    target(&mut root, &mut open).push(Node::Action(pipeline));
                }
            }
        }

        if let Some(block) = open.last() {
            return Err(parse_error(block.at, "unclosed with: missing {{end}}"));
        }
        Ok(Self { nodes: root })
    }

    /// Evaluate the template against `ctx`.
    pub fn render(&self, ctx: &TemplateContext<'_>) -> Result<String, TemplateError> {
        let mut out = String::new();
        render_nodes(&self.nodes, ctx, None, &mut out)?;
        Ok(out)
    }
}

/// `dot` is `None` at the top level and the `with` value inside a block.
fn render_nodes(
    nodes: &[Node],
    ctx: &TemplateContext<'_>,
    dot: Option<&Value>,
    out: &mut String,
) -> Result<(), TemplateError> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Action(pipeline) => pipeline.eval(ctx, dot)?.write_to(out),
            Node::With { pipeline, body, otherwise } => {
                let value = pipeline.eval(ctx, dot)?;
                if value.is_truthy() {
                    render_nodes(body, ctx, Some(&value), out)?;
                } else {
                    render_nodes(otherwise, ctx, dot, out)?;
                }
            }
        }
    }
    Ok(())
}

/// Parse `tokens` as one pipeline that must consume every token.
fn whole_pipeline(tokens: &[(Token, usize)], action_at: usize) -> Result<Pipeline, TemplateError> {
    let mut cursor = TokenCursor { tokens, index: 0, offset: action_at };
    let pipeline = cursor.pipeline()?;
    if let Some((_, at)) = cursor.peek() {
        return Err(parse_error(at, "unexpected \")\" in action"));
    }
    Ok(pipeline)
}

fn expect_bare_keyword(tokens: &[(Token, usize)], keyword: &str) -> Result<(), TemplateError> {
    match tokens.get(1) {
        Some((_, at)) => Err(parse_error(*at, format!("unexpected token after {keyword}"))),
        None => Ok(()),
    }
}

fn push_text(nodes: &mut Vec<Node>, text: &str, trim_start: bool, trim_end: bool) {
    let mut text = text;
    if trim_start {
        text = text.trim_start();
    }
    if trim_end {
        text = text.trim_end();
    }
    if !text.is_empty() {
        nodes.push(Node::Text(text.to_string()));
    }
}

/// `{{- ` needs whitespace after the dash; `{{-3}}` is a number.
fn is_trim_marker(rest: &str) -> bool {
    let mut chars = rest.chars();
    chars.next() == Some('-') && chars.next().is_some_and(char::is_whitespace)
}

fn is_comment(tokens: &[(Token, usize)]) -> bool {
    matches!(tokens, [(Token::Comment, _)])
}

fn parse_error(offset: usize, detail: impl Into<String>) -> TemplateError {
    TemplateError::Parse { offset, detail: detail.into() }
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Field(String),
    Ident(String),
    Str(String),
    Int(i64),
    Pipe,
    LParen,
    RParen,
    Comment,
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str, pos: usize) -> Self {
        Self { src, pos }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Lex one action body up to and including its closing `}}`. Returns the
    /// tokens and whether a `-}}` trim marker closed the action.
    fn action_tokens(&mut self, open: usize) -> Result<(Vec<(Token, usize)>, bool), TemplateError> {
        let mut tokens = Vec::new();

        if self.rest().trim_start().starts_with("/*") {
            let start = self.pos + self.rest().find("/*").unwrap_or(0);
            let Some(end) = self.src[start..].find("*/") else {
                return Err(parse_error(start, "unclosed comment"));
            };
            self.pos = start + end + 2;
            tokens.push((Token::Comment, start));
        }

        loop {
            let before = self.pos;
            while self.peek_char().is_some_and(char::is_whitespace) {
                self.bump();
            }
            let skipped_space = self.pos > before;
            let at = self.pos;
            let rest = self.rest();

            if rest.is_empty() {
                return Err(parse_error(open, "unclosed action"));
            }
            if skipped_space && rest.starts_with("-}}") {
                self.pos += 3;
                return Ok((tokens, true));
            }
            if rest.starts_with("}}") {
                self.pos += 2;
                return Ok((tokens, false));
            }
            if matches!(tokens.last(), Some((Token::Comment, _))) {
                return Err(parse_error(at, "comment must be the whole action"));
            }

            let token = match self.peek_char() {
                Some('|') => {
                    self.bump();
                    Token::Pipe
                }
                Some('(') => {
                    self.bump();
                    Token::LParen
                }
                Some(')') => {
                    self.bump();
                    Token::RParen
                }
                Some('.') => {
                    self.bump();
                    Token::Field(self.word())
                }
                Some('"') => self.quoted()?,
                Some('`') => self.raw()?,
                Some(c) if c.is_ascii_digit() || c == '-' || c == '+' => self.number()?,
                Some(c) if c.is_alphabetic() || c == '_' => Token::Ident(self.word()),
                Some(c) => return Err(parse_error(at, format!("unexpected {c:?} in action"))),
                None => return Err(parse_error(open, "unclosed action")),
            };
            tokens.push((token, at));
        }
    }

    fn word(&mut self) -> String {
        let start = self.pos;
        while self.peek_char().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.bump();
        }
        self.src[start..self.pos].to_string()
    }

    fn number(&mut self) -> Result<Token, TemplateError> {
        let start = self.pos;
        self.bump();
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        let text = &self.src[start..self.pos];
        text.parse::<i64>()
            .map(Token::Int)
            .map_err(|_| parse_error(start, format!("bad number syntax: {text:?}")))
    }

    fn quoted(&mut self) -> Result<Token, TemplateError> {
        let start = self.pos;
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(Token::Str(value)),
                Some('\\') => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('\\') => value.push('\\'),
                    Some('"') => value.push('"'),
                    Some(c) => {
                        return Err(parse_error(
                            self.pos - c.len_utf8() - 1,
                            format!("unknown escape sequence \\{c}"),
                        ))
                    }
                    None => return Err(parse_error(start, "unterminated quoted string")),
                },
                Some('\n') | None => return Err(parse_error(start, "unterminated quoted string")),
                Some(c) => value.push(c),
            }
        }
    }

    fn raw(&mut self) -> Result<Token, TemplateError> {
        let start = self.pos;
        self.bump();
        let Some(end) = self.rest().find('`') else {
            return Err(parse_error(start, "unterminated raw quoted string"));
        };
        let value = self.rest()[..end].to_string();
        self.pos += end + 1;
        Ok(Token::Str(value))
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct TokenCursor<'t> {
    tokens: &'t [(Token, usize)],
    index: usize,
    /// Offset of the action's `{{`, reported for errors at end of input.
    offset: usize,
}

impl<'t> TokenCursor<'t> {
    fn peek(&self) -> Option<(&'t Token, usize)> {
        self.tokens.get(self.index).map(|(t, at)| (t, *at))
    }

    fn pipeline(&mut self) -> Result<Pipeline, TemplateError> {
        let mut commands = vec![self.command()?];
        while let Some((Token::Pipe, _)) = self.peek() {
            self.index += 1;
            commands.push(self.command()?);
        }
        Ok(Pipeline { commands })
    }

    fn command(&mut self) -> Result<Command, TemplateError> {
        let start = self.peek().map_or(self.offset, |(_, at)| at);
        let mut operands = Vec::new();

        while let Some((token, at)) = self.peek() {
            let operand = match token {
                Token::Pipe | Token::RParen => break,
                Token::Field(name) if name.is_empty() => Operand::Dot,
                Token::Field(name) => Operand::Field(field(name, at)?),
                Token::Ident(name) => Operand::Func(
                    Func::lookup(name)
                        .ok_or_else(|| parse_error(at, format!("function {name:?} not defined")))?,
                ),
                Token::Str(s) => Operand::Str(s.clone()),
                Token::Int(n) => Operand::Int(*n),
                Token::LParen => {
                    self.index += 1;
                    let inner = self.pipeline()?;
                    match self.peek() {
                        Some((Token::RParen, _)) => {}
                        _ => return Err(parse_error(at, "unclosed left paren")),
                    }
                    Operand::Pipeline(inner)
                }
                Token::Comment => return Err(parse_error(at, "unexpected comment")),
            };
            self.index += 1;
            operands.push(operand);
        }

        if operands.is_empty() {
            return Err(parse_error(start, "missing value for command"));
        }
        Ok(Command { operands })
    }
}

fn field(name: &str, at: usize) -> Result<Field, TemplateError> {
    match name {
        "Initials" => Ok(Field::Initials),
        "Name" => Ok(Field::Name),
        "Username" => Ok(Field::Username),
        _ => Err(parse_error(at, format!("can't evaluate field {name:?}"))),
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

impl Pipeline {
    fn eval(&self, ctx: &TemplateContext<'_>, dot: Option<&Value>) -> Result<Value, TemplateError> {
        let mut previous = None;
        for command in &self.commands {
            previous = Some(command.eval(ctx, dot, previous.take())?);
        }
        previous.ok_or_else(|| TemplateError::Render("empty pipeline".into()))
    }
}

impl Command {
    fn eval(
        &self,
        ctx: &TemplateContext<'_>,
        dot: Option<&Value>,
        piped: Option<Value>,
    ) -> Result<Value, TemplateError> {
        match self.operands.as_slice() {
            [Operand::Func(func), rest @ ..] => {
                let mut args = rest
                    .iter()
                    .map(|op| op.eval(ctx, dot))
                    .collect::<Result<Vec<_>, _>>()?;
                args.extend(piped);
                func.call(args)
            }
            [single] if piped.is_none() => single.eval(ctx, dot),
            _ => Err(TemplateError::Render(
                "can't give argument to non-function".into(),
            )),
        }
    }
}

impl Operand {
    fn eval(&self, ctx: &TemplateContext<'_>, dot: Option<&Value>) -> Result<Value, TemplateError> {
        match (self, dot) {
            (Self::Dot, Some(value)) => Ok(value.clone()),
            (Self::Dot, None) => Err(TemplateError::Render(
                "{{.}} is only available inside with".into(),
            )),
            (Self::Field(field), Some(value)) => Err(TemplateError::Render(format!(
                "can't evaluate field {} in type {}",
                field.name(),
                value.type_name()
            ))),
            (Self::Field(Field::Initials), None) => Ok(Value::Str(ctx.initials.to_string())),
            (Self::Field(Field::Name), None) => Ok(Value::Str(ctx.name.to_string())),
            (Self::Field(Field::Username), None) => Ok(Value::Str(ctx.username.to_string())),
            (Self::Str(s), _) => Ok(Value::Str(s.clone())),
            (Self::Int(n), _) => Ok(Value::Int(*n)),
            (Self::Func(func), _) => func.call(Vec::new()),
            (Self::Pipeline(p), _) => p.eval(ctx, dot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> TemplateContext<'static> {
        TemplateContext {
            initials: "ab",
            name: "Alice Brown",
            username: "abrown",
        }
    }

    fn render(src: &str) -> Result<String, TemplateError> {
        EmailTemplate::parse(src)?.render(&ctx())
    }

    #[test]
    fn test_plain_text_and_fields() {
        assert_eq!(render("static@example.com").unwrap(), "static@example.com");
        assert_eq!(render("{{.Username}}@example.com").unwrap(), "abrown@example.com");
        assert_eq!(render("{{ .Initials }}-{{.Name}}").unwrap(), "ab-Alice Brown");
    }

    #[test]
    fn test_case_functions() {
        assert_eq!(render("{{toUpper .Initials}}").unwrap(), "AB");
        assert_eq!(render("{{.Name | toLower}}").unwrap(), "alice brown");
    }

    #[test]
    fn test_replace() {
        let out = render(r#"{{replace (toLower .Name) " " "." -1}}@example.com"#).unwrap();
        assert_eq!(out, "alice.brown@example.com");

        let out = render(r#"{{replace "a-b-c" "-" "+" 1}}"#).unwrap();
        assert_eq!(out, "a+b-c");
    }

    #[test]
    fn test_split_and_index() {
        let out = render(r#"{{index (split .Name " ") 1 | toLower}}@example.com"#).unwrap();
        assert_eq!(out, "brown@example.com");

        assert_eq!(render(r#"{{split .Name " "}}"#).unwrap(), "[Alice Brown]");
    }

    #[test]
    fn test_trim_markers() {
        assert_eq!(render("a  {{- .Initials -}}  b").unwrap(), "aabb");
        assert_eq!(render("{{-3}}").unwrap(), "-3");
    }

    #[test]
    fn test_comment_is_dropped() {
        assert_eq!(render("{{/* owner */}}{{.Username}}").unwrap(), "abrown");
    }

    #[test]
    fn test_backquoted_literal() {
        assert_eq!(render(r#"{{replace .Name ` ` `_` -1}}"#).unwrap(), "Alice_Brown");
    }

    #[test]
    fn test_with_binds_dot() {
        assert_eq!(
            render(r#"{{with split .Name " "}}{{index . 0 | toLower}}.{{index . 1 | toLower}}{{end}}@example.com"#)
                .unwrap(),
            "alice.brown@example.com"
        );
        assert_eq!(render("{{with .Username}}<{{.}}>{{end}}").unwrap(), "<abrown>");
    }

    #[test]
    fn test_with_else_on_empty_value() {
        let tmpl = EmailTemplate::parse("{{with .Username}}{{.}}{{else}}{{toLower .Initials}}{{end}}@example.com")
            .unwrap();
        let no_username = TemplateContext { username: "", ..ctx() };
        assert_eq!(tmpl.render(&no_username).unwrap(), "ab@example.com");
        assert_eq!(tmpl.render(&ctx()).unwrap(), "abrown@example.com");
    }

    #[test]
    fn test_nested_with() {
        let src = r#"{{with split .Name " "}}{{with index . 1}}{{toLower .}}{{end}}{{end}}"#;
        assert_eq!(render(src).unwrap(), "brown");
    }

    #[test]
    fn test_parse_errors() {
        for src in [
            "{{.Name",
            "{{.Email}}",
            "{{shell .Name}}",
            "{{}}",
            r#"{{replace .Name "x}}"#,
            "{{(toLower .Name}}",
            "{{.Name)}}",
            "{{with .Name}}x",
            "{{end}}",
            "{{else}}",
            "{{with}}{{end}}",
            "{{with .Name}}{{else}}{{else}}{{end}}",
            "{{with .Name}}{{end .Name}}",
            "{{printf \"%s\" .Name}}",
            "{{if .Name}}x{{end}}",
        ] {
            let err = EmailTemplate::parse(src).unwrap_err();
            assert!(matches!(err, TemplateError::Parse { .. }), "{src}: {err:?}");
        }
    }

    #[test]
    fn test_render_errors() {
        for src in [
            "{{toLower}}",
            r#"{{index (split .Name " ") 5}}"#,
            "{{index .Name 0}}",
            r#"{{replace .Name " " "." "all"}}"#,
            "{{.Name .Initials}}",
            "{{.Name | .Initials}}",
            "{{.}}",
            "{{with .Name}}{{.Initials}}{{end}}",
        ] {
            let err = render(src).unwrap_err();
            assert!(matches!(err, TemplateError::Render(_)), "{src}: {err:?}");
        }
    }
}
