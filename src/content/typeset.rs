//! TeX typesetting for card content: finds `$...$`, `$$...$$`, `\(...\)`
//! and `\[...\]` segments and renders the TeX inside as MathML
//! presentation markup, restricted to the tags the sanitizer allows.
//! Anything the mini-engine cannot express is a hard error, matching the
//! collaborator contract: bad math fails the item, it is never passed
//! through half-rendered.

use crate::errors::RetmapError;

/// Convert all TeX segments of `input` to MathML, leaving surrounding
/// text untouched.
pub fn typeset(input: &str) -> Result<String, RetmapError> {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::new();
    let mut i = 0;

    while i < chars.len() {
        let (open, close, display) = if starts_with(&chars, i, "$$") {
            ("$$", "$$", true)
        } else if starts_with(&chars, i, r"\[") {
            (r"\[", r"\]", true)
        } else if starts_with(&chars, i, r"\(") {
            (r"\(", r"\)", false)
        } else if chars[i] == '$' {
            ("$", "$", false)
        } else {
            out.push(chars[i]);
            i += 1;
            continue;
        };

        let body_start = i + open.chars().count();
        let body_end = find_close(&chars, body_start, close)
            .ok_or_else(|| RetmapError::Typeset(format!("unclosed {open} delimiter")))?;
        let tex: String = chars[body_start..body_end].iter().collect();
        out.push_str(&render_math(&tex, display)?);
        i = body_end + close.chars().count();
    }

    if out.is_empty() && !input.is_empty() {
        return Err(RetmapError::Typeset(String::from("typesetting produced no output")));
    }
    Ok(out)
}

/// Render one TeX fragment as a `<math>` element.
pub fn render_math(tex: &str, display: bool) -> Result<String, RetmapError> {
    let nodes = Parser::new(tex).parse_sequence(None)?;
    if nodes.is_empty() {
        return Err(RetmapError::Typeset(String::from("empty math segment")));
    }
    let body: String = nodes.iter().map(MathNode::render).collect();
    Ok(if display {
        format!(r#"<math display="block"><mrow>{body}</mrow></math>"#)
    } else {
        format!("<math><mrow>{body}</mrow></math>")
    })
}

fn starts_with(chars: &[char], at: usize, pat: &str) -> bool {
    let pat: Vec<char> = pat.chars().collect();
    chars.len() >= at + pat.len() && chars[at..at + pat.len()] == pat[..]
}

fn find_close(chars: &[char], from: usize, close: &str) -> Option<usize> {
    let mut i = from;
    while i < chars.len() {
        // An escaped dollar is content, not a delimiter.
        if chars[i] == '\\' && close == "$" {
            i += 2;
            continue;
        }
        if starts_with(chars, i, close) {
            return Some(i);
        }
        i += 1;
    }
    None
}

#[derive(Debug)]
enum MathNode {
    Identifier(String),
    Number(String),
    Operator(String),
    Row(Vec<MathNode>),
    Frac(Box<MathNode>, Box<MathNode>),
    Sqrt(Box<MathNode>),
    Root(Box<MathNode>, Box<MathNode>),
    Sup(Box<MathNode>, Box<MathNode>),
    Sub(Box<MathNode>, Box<MathNode>),
}

impl MathNode {
    fn render(&self) -> String {
        match self {
            MathNode::Identifier(s) => format!("<mi>{s}</mi>"),
            MathNode::Number(s) => format!("<mn>{s}</mn>"),
            MathNode::Operator(s) => format!("<mo>{}</mo>", escape(s)),
            MathNode::Row(children) => {
                let body: String = children.iter().map(MathNode::render).collect();
                format!("<mrow>{body}</mrow>")
            }
            MathNode::Frac(num, den) => {
                format!("<mfrac>{}{}</mfrac>", num.render(), den.render())
            }
            MathNode::Sqrt(inner) => format!("<msqrt>{}</msqrt>", inner.render()),
            MathNode::Root(inner, index) => {
                format!("<mroot>{}{}</mroot>", inner.render(), index.render())
            }
            MathNode::Sup(base, exp) => {
                format!("<msup>{}{}</msup>", base.render(), exp.render())
            }
            MathNode::Sub(base, idx) => {
                format!("<msub>{}{}</msub>", base.render(), idx.render())
            }
        }
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Commands rendered as a single identifier (greek letters and friends).
fn identifier_command(name: &str) -> Option<&'static str> {
    Some(match name {
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" => "ε",
        "theta" => "θ",
        "lambda" => "λ",
        "mu" => "μ",
        "pi" => "π",
        "sigma" => "σ",
        "phi" => "φ",
        "omega" => "ω",
        "infty" => "∞",
        _ => return None,
    })
}

/// Commands rendered as an operator.
fn operator_command(name: &str) -> Option<&'static str> {
    Some(match name {
        "times" => "×",
        "cdot" => "⋅",
        "pm" => "±",
        "div" => "÷",
        "le" | "leq" => "≤",
        "ge" | "geq" => "≥",
        "ne" | "neq" => "≠",
        "approx" => "≈",
        "rightarrow" | "to" => "→",
        "sum" => "∑",
        "int" => "∫",
        _ => return None,
    })
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(tex: &str) -> Self {
        Self { chars: tex.chars().collect(), pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    /// Parse until `terminator` (or end of input when `None`).
    fn parse_sequence(&mut self, terminator: Option<char>) -> Result<Vec<MathNode>, RetmapError> {
        let mut nodes = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                None => {
                    if let Some(t) = terminator {
                        return Err(RetmapError::Typeset(format!("missing closing '{t}'")));
                    }
                    return Ok(nodes);
                }
                Some(c) if Some(c) == terminator => {
                    self.pos += 1;
                    return Ok(nodes);
                }
                Some('}') => {
                    return Err(RetmapError::Typeset(String::from("unbalanced '}'")));
                }
                Some('^') | Some('_') => {
                    let op = self.bump().unwrap_or_default();
                    let base = nodes.pop().ok_or_else(|| {
                        RetmapError::Typeset(format!("'{op}' with no base"))
                    })?;
                    let script = self.parse_atom()?;
                    nodes.push(if op == '^' {
                        MathNode::Sup(Box::new(base), Box::new(script))
                    } else {
                        MathNode::Sub(Box::new(base), Box::new(script))
                    });
                }
                Some(_) => nodes.push(self.parse_atom()?),
            }
        }
    }

    /// One atom: a group, a command, a number, or a single character.
    fn parse_atom(&mut self) -> Result<MathNode, RetmapError> {
        self.skip_ws();
        let c = self
            .bump()
            .ok_or_else(|| RetmapError::Typeset(String::from("unexpected end of math")))?;
        match c {
            '{' => {
                let nodes = self.parse_sequence(Some('}'))?;
                Ok(row(nodes))
            }
            '\\' => self.parse_command(),
            c if c.is_ascii_digit() => {
                let mut num = String::from(c);
                while matches!(self.peek(), Some(d) if d.is_ascii_digit() || d == '.') {
                    num.push(self.bump().unwrap_or_default());
                }
                Ok(MathNode::Number(num))
            }
            c if c.is_alphabetic() => Ok(MathNode::Identifier(c.to_string())),
            c => Ok(MathNode::Operator(c.to_string())),
        }
    }

    fn parse_command(&mut self) -> Result<MathNode, RetmapError> {
        let mut name = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_alphabetic()) {
            name.push(self.bump().unwrap_or_default());
        }
        if name.is_empty() {
            // An escaped single character, e.g. \{ or \$.
            let c = self
                .bump()
                .ok_or_else(|| RetmapError::Typeset(String::from("dangling backslash")))?;
            return Ok(MathNode::Operator(c.to_string()));
        }

        match name.as_str() {
            "frac" => {
                let num = self.parse_atom()?;
                let den = self.parse_atom()?;
                Ok(MathNode::Frac(Box::new(num), Box::new(den)))
            }
            "sqrt" => {
                self.skip_ws();
                if self.peek() == Some('[') {
                    self.pos += 1;
                    let index = self.parse_sequence(Some(']'))?;
                    let inner = self.parse_atom()?;
                    Ok(MathNode::Root(Box::new(inner), Box::new(row(index))))
                } else {
                    Ok(MathNode::Sqrt(Box::new(self.parse_atom()?)))
                }
            }
            _ => {
                if let Some(sym) = identifier_command(&name) {
                    Ok(MathNode::Identifier(sym.to_string()))
                } else if let Some(sym) = operator_command(&name) {
                    Ok(MathNode::Operator(sym.to_string()))
                } else {
                    Err(RetmapError::Typeset(format!("unknown command \\{name}")))
                }
            }
        }
    }
}

fn row(mut nodes: Vec<MathNode>) -> MathNode {
    if nodes.len() == 1 {
        nodes.remove(0)
    } else {
        MathNode::Row(nodes)
    }
}
