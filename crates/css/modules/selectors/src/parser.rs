//! CSS selector parsing.
//! Reference: <https://www.w3.org/TR/selectors-3/#grammar>

use crate::{AnPlusB, Combinator, ComplexSelector, CompoundSelector, SelectorList, SimpleSelector};
use anyhow::{Result, anyhow, bail};
use core::mem::take;

#[derive(Clone, Debug, PartialEq, Eq)]
/// Internal tokenizer token kinds.
pub enum Tok {
    /// A combinator token like child/adjacent/general sibling.
    Combinator(Combinator),
    /// Whitespace that implies a descendant combinator.
    DescendantWS,
    /// A simple selector token (type, class, id, attribute, pseudo-class, universal).
    Simple(SimpleSelector),
}

/// Tokenizer over a selector string.
pub struct SelectorTokenizer {
    /// Input decoded to chars so escapes and non-ASCII identifiers index cleanly.
    input: Vec<char>,
    /// Current cursor index into `input`.
    index: usize,
}

impl SelectorTokenizer {
    /// Construct a tokenizer from input.
    #[inline]
    pub(crate) fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            index: 0,
        }
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.input.get(self.index).copied()
    }

    #[inline]
    fn bump(&mut self) {
        self.index = self.index.saturating_add(1);
    }

    /// Return the next selector token, if any.
    pub(crate) fn next(&mut self) -> Result<Option<Tok>> {
        if self.skip_whitespace_descendant() {
            if self.peek().is_none() {
                return Ok(None);
            }
            return Ok(Some(Tok::DescendantWS));
        }
        let Some(current) = self.peek() else {
            return Ok(None);
        };
        let token = match current {
            '*' => {
                self.bump();
                Tok::Simple(SimpleSelector::Universal)
            }
            '.' => {
                self.bump();
                Tok::Simple(SimpleSelector::Class(self.consume_ident("class")?))
            }
            '#' => {
                self.bump();
                Tok::Simple(SimpleSelector::IdSelector(self.consume_ident("id")?))
            }
            '[' => {
                self.bump();
                Tok::Simple(self.consume_attr()?)
            }
            ':' => {
                self.bump();
                Tok::Simple(self.consume_pseudo()?)
            }
            '>' => {
                self.bump();
                Tok::Combinator(Combinator::Child)
            }
            '+' => {
                self.bump();
                Tok::Combinator(Combinator::AdjacentSibling)
            }
            '~' => {
                self.bump();
                Tok::Combinator(Combinator::GeneralSibling)
            }
            other if is_ident_start(other) => {
                Tok::Simple(SimpleSelector::Type(
                    self.consume_ident("type")?.to_ascii_lowercase(),
                ))
            }
            other => bail!("unexpected character `{other}` at offset {}", self.index),
        };
        Ok(Some(token))
    }

    /// Skip whitespace, returning true when it separates two tokens (a descendant combinator).
    #[inline]
    fn skip_whitespace_descendant(&mut self) -> bool {
        let start = self.index;
        while self.peek().is_some_and(is_css_whitespace) {
            self.bump();
        }
        start > 0 && self.index > start
    }

    /// Consume an identifier, resolving escapes. Case is preserved.
    fn consume_ident(&mut self, what: &str) -> Result<String> {
        let mut out = String::new();
        if self.peek() == Some('-') {
            out.push('-');
            self.bump();
        }
        match self.peek() {
            Some(first) if is_ident_start(first) || first == '-' => {}
            _ => bail!("expected {what} identifier at offset {}", self.index),
        }
        while let Some(character) = self.peek() {
            if character == '\\' {
                self.bump();
                out.push(self.consume_escape()?);
            } else if is_ident_char(character) {
                out.push(character);
                self.bump();
            } else {
                break;
            }
        }
        if out.is_empty() || out == "-" {
            bail!("expected {what} identifier at offset {}", self.index);
        }
        Ok(out)
    }

    /// Consume the escape after a backslash: up to six hex digits plus one optional space, or a literal char.
    /// Reference: <https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point>
    fn consume_escape(&mut self) -> Result<char> {
        let Some(first) = self.peek() else {
            bail!("selector ends inside an escape sequence");
        };
        if !first.is_ascii_hexdigit() {
            if first == '\n' {
                bail!("newline cannot be escaped in a selector");
            }
            self.bump();
            return Ok(first);
        }
        let mut digits = String::new();
        while digits.len() < 6 && self.peek().is_some_and(|digit| digit.is_ascii_hexdigit()) {
            if let Some(digit) = self.peek() {
                digits.push(digit);
            }
            self.bump();
        }
        if self.peek().is_some_and(is_css_whitespace) {
            self.bump();
        }
        let value = u32::from_str_radix(&digits, 16)?;
        Ok(match char::from_u32(value) {
            Some(decoded) if value != 0 => decoded,
            _ => '\u{FFFD}',
        })
    }

    /// Parse an attribute selector, supporting `[name]` and `[name=value]` (quoted or unquoted).
    fn consume_attr(&mut self) -> Result<SimpleSelector> {
        self.skip_spaces();
        let name = self.consume_ident("attribute")?.to_ascii_lowercase();
        self.skip_spaces();
        let selector = match self.peek() {
            Some(']') => SimpleSelector::AttrExists(name),
            Some('=') => {
                self.bump();
                self.skip_spaces();
                let value = match self.peek() {
                    Some(quote @ ('"' | '\'')) => {
                        self.bump();
                        self.consume_quoted_attr_value(quote)?
                    }
                    _ => self.consume_ident("attribute value")?,
                };
                self.skip_spaces();
                SimpleSelector::AttrEquals { name, value }
            }
            Some(other) => bail!("unsupported attribute operator starting with `{other}`"),
            None => bail!("unterminated attribute selector"),
        };
        if self.peek() != Some(']') {
            bail!("expected `]` at offset {}", self.index);
        }
        self.bump();
        Ok(selector)
    }

    /// Consume a quoted attribute value until the matching quote char.
    fn consume_quoted_attr_value(&mut self, quote: char) -> Result<String> {
        let mut out = String::new();
        loop {
            match self.peek() {
                None => bail!("unterminated string in attribute selector"),
                Some(character) if character == quote => {
                    self.bump();
                    return Ok(out);
                }
                Some('\\') => {
                    self.bump();
                    out.push(self.consume_escape()?);
                }
                Some(character) => {
                    out.push(character);
                    self.bump();
                }
            }
        }
    }

    /// Parse a pseudo-class after ':'.
    fn consume_pseudo(&mut self) -> Result<SimpleSelector> {
        let name = self.consume_ident("pseudo-class")?.to_ascii_lowercase();
        match name.as_str() {
            "first-child" => Ok(SimpleSelector::FirstChild),
            "last-child" => Ok(SimpleSelector::LastChild),
            "root" => Ok(SimpleSelector::Root),
            "nth-child" => {
                if self.peek() != Some('(') {
                    bail!(":nth-child requires an argument");
                }
                self.bump();
                let start = self.index;
                while self.peek().is_some_and(|character| character != ')') {
                    self.bump();
                }
                if self.peek().is_none() {
                    bail!("unterminated :nth-child argument");
                }
                let argument: String = self
                    .input
                    .get(start..self.index)
                    .unwrap_or_default()
                    .iter()
                    .collect();
                self.bump();
                Ok(SimpleSelector::NthChild(parse_an_plus_b(&argument)?))
            }
            other => Err(anyhow!("unsupported pseudo-class `:{other}`")),
        }
    }

    /// Skip CSS whitespace.
    #[inline]
    fn skip_spaces(&mut self) {
        while self.peek().is_some_and(is_css_whitespace) {
            self.bump();
        }
    }
}

/// Parse the `An+B` argument of `:nth-child()`.
fn parse_an_plus_b(argument: &str) -> Result<AnPlusB> {
    let compact: String = argument
        .chars()
        .filter(|character| !is_css_whitespace(*character))
        .collect::<String>()
        .to_ascii_lowercase();
    match compact.as_str() {
        "" => bail!("empty :nth-child argument"),
        "odd" => return Ok(AnPlusB { step: 2, offset: 1 }),
        "even" => return Ok(AnPlusB { step: 2, offset: 0 }),
        _ => {}
    }
    let Some((step_text, offset_text)) = compact.split_once('n') else {
        let offset = compact
            .parse::<i32>()
            .map_err(|_| anyhow!("invalid :nth-child argument `{argument}`"))?;
        return Ok(AnPlusB::index(offset));
    };
    let step = match step_text {
        "" | "+" => 1,
        "-" => -1,
        text => text
            .parse::<i32>()
            .map_err(|_| anyhow!("invalid :nth-child step `{text}`"))?,
    };
    let offset = if offset_text.is_empty() {
        0
    } else if offset_text.starts_with(['+', '-']) {
        offset_text
            .parse::<i32>()
            .map_err(|_| anyhow!("invalid :nth-child offset `{offset_text}`"))?
    } else {
        bail!("invalid :nth-child argument `{argument}`");
    };
    Ok(AnPlusB { step, offset })
}

const fn is_css_whitespace(character: char) -> bool {
    matches!(character, '\t' | '\n' | '\u{000C}' | '\r' | ' ')
}

fn is_ident_start(character: char) -> bool {
    character.is_ascii_alphabetic() || character == '_' || character == '\\' || !character.is_ascii()
}

fn is_ident_char(character: char) -> bool {
    character.is_ascii_alphanumeric() || character == '-' || character == '_' || !character.is_ascii()
}

/// Parse a selector list from CSS text.
///
/// # Errors
/// Returns an error if any comma-separated item is empty or malformed.
pub fn parse_selector_list(input: &str) -> Result<SelectorList> {
    if input.trim().is_empty() {
        bail!("empty selector");
    }
    let mut list = SelectorList::default();
    for part in split_top_level_commas(input) {
        list.selectors.push(parse_complex_selector(part.trim())?);
    }
    Ok(list)
}

/// Split on commas that are not inside brackets, parentheses, or strings.
fn split_top_level_commas(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0usize;
    for (offset, character) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, character) {
            (_, '\\') => escaped = true,
            (Some(open), close) if open == close => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(character),
            (None, '[' | '(') => depth = depth.saturating_add(1),
            (None, ']' | ')') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(input.get(start..offset).unwrap_or_default());
                start = offset.saturating_add(1);
            }
            (None, _) => {}
        }
    }
    parts.push(input.get(start..).unwrap_or_default());
    parts
}

/// Parse one complex selector.
///
/// # Errors
/// Returns an error for empty input, dangling or doubled combinators, misplaced
/// type selectors, and any tokenizer error.
pub fn parse_complex_selector(input: &str) -> Result<ComplexSelector> {
    let mut tokens = SelectorTokenizer::new(input.trim());
    let mut current = CompoundSelector::default();
    let mut finished: Vec<CompoundSelector> = Vec::new();
    let mut combinators: Vec<Combinator> = Vec::new();
    let mut pending_combinator: Option<Combinator> = None;

    while let Some(token) = tokens.next()? {
        match token {
            Tok::Combinator(comb) => {
                if current.simples.is_empty() {
                    bail!("combinator without a left-hand compound in `{input}`");
                }
                match pending_combinator {
                    None | Some(Combinator::Descendant) => pending_combinator = Some(comb),
                    Some(_) => bail!("consecutive combinators in `{input}`"),
                }
            }
            Tok::DescendantWS => {
                // Whitespace only implies a descendant combinator once a compound exists
                if !current.simples.is_empty() && pending_combinator.is_none() {
                    pending_combinator = Some(Combinator::Descendant);
                }
            }
            Tok::Simple(simple) => {
                if let Some(prev_comb) = pending_combinator.take() {
                    finished.push(take(&mut current));
                    combinators.push(prev_comb);
                }
                let is_type_like =
                    matches!(simple, SimpleSelector::Type(_) | SimpleSelector::Universal);
                if is_type_like && !current.simples.is_empty() {
                    bail!("type selector must start its compound in `{input}`");
                }
                current.simples.push(simple);
            }
        }
    }

    if current.simples.is_empty() {
        bail!("empty selector");
    }
    if pending_combinator.is_some_and(|comb| comb != Combinator::Descendant) {
        bail!("dangling combinator in `{input}`");
    }
    finished.push(current);

    let mut compounds = finished.into_iter();
    let first = compounds.next().unwrap_or_default();
    Ok(ComplexSelector {
        first,
        rest: combinators.into_iter().zip(compounds).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn an_plus_b_forms() {
        assert_eq!(parse_an_plus_b("3").ok(), Some(AnPlusB::index(3)));
        assert_eq!(parse_an_plus_b("odd").ok(), Some(AnPlusB { step: 2, offset: 1 }));
        assert_eq!(parse_an_plus_b("2n + 1").ok(), Some(AnPlusB { step: 2, offset: 1 }));
        assert_eq!(parse_an_plus_b("-n+3").ok(), Some(AnPlusB { step: -1, offset: 3 }));
        assert!(parse_an_plus_b("n3").is_err());
        assert!(parse_an_plus_b("").is_err());
    }

    #[test]
    fn commas_inside_strings_do_not_split() {
        let parts = split_top_level_commas(r#"a[title="x,y"], b"#);
        assert_eq!(parts.len(), 2);
    }
}
