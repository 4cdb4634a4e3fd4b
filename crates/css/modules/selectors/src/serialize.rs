//! Selector serialization.
//! Reference: <https://www.w3.org/TR/cssom-1/#serializing-selectors>

use crate::{AnPlusB, Combinator, ComplexSelector, CompoundSelector, SelectorList, SimpleSelector};
use core::fmt::{self, Display, Formatter, Write as _};

/// Serialize an identifier so that parsing it yields the same string.
/// Reference: <https://www.w3.org/TR/cssom-1/#serialize-an-identifier>
pub fn serialize_identifier(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    let chars: Vec<char> = ident.chars().collect();
    if chars.as_slice() == ['-'] {
        return String::from("\\-");
    }
    for (index, &character) in chars.iter().enumerate() {
        let code = u32::from(character);
        let leading_digit = character.is_ascii_digit()
            && (index == 0 || (index == 1 && chars.first() == Some(&'-')));
        if code == 0 {
            out.push('\u{FFFD}');
        } else if (0x1..=0x1F).contains(&code) || code == 0x7F || leading_digit {
            let _ignored = write!(out, "\\{code:x} ");
        } else if character.is_ascii_alphanumeric()
            || character == '-'
            || character == '_'
            || !character.is_ascii()
        {
            out.push(character);
        } else {
            out.push('\\');
            out.push(character);
        }
    }
    out
}

/// True when `ident` can be written into a selector without any escaping.
pub fn is_plain_identifier(ident: &str) -> bool {
    !ident.is_empty() && serialize_identifier(ident) == ident
}

fn serialize_string(value: &str, out: &mut Formatter<'_>) -> fmt::Result {
    out.write_char('"')?;
    for character in value.chars() {
        match character {
            '"' | '\\' => {
                out.write_char('\\')?;
                out.write_char(character)?;
            }
            '\u{1}'..='\u{1F}' | '\u{7F}' => write!(out, "\\{:x} ", u32::from(character))?,
            '\0' => out.write_char('\u{FFFD}')?,
            _ => out.write_char(character)?,
        }
    }
    out.write_char('"')
}

impl Display for AnPlusB {
    fn fmt(&self, out: &mut Formatter<'_>) -> fmt::Result {
        match (self.step, self.offset) {
            (0, offset) => write!(out, "{offset}"),
            (step, 0) => write!(out, "{step}n"),
            (step, offset) if offset > 0 => write!(out, "{step}n+{offset}"),
            (step, offset) => write!(out, "{step}n{offset}"),
        }
    }
}

impl Display for SimpleSelector {
    fn fmt(&self, out: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(name) => out.write_str(&serialize_identifier(name)),
            Self::Universal => out.write_char('*'),
            Self::Class(name) => write!(out, ".{}", serialize_identifier(name)),
            Self::IdSelector(id) => write!(out, "#{}", serialize_identifier(id)),
            Self::AttrExists(name) => write!(out, "[{}]", serialize_identifier(name)),
            Self::AttrEquals { name, value } => {
                write!(out, "[{}=", serialize_identifier(name))?;
                serialize_string(value, out)?;
                out.write_char(']')
            }
            Self::NthChild(expression) => write!(out, ":nth-child({expression})"),
            Self::FirstChild => out.write_str(":first-child"),
            Self::LastChild => out.write_str(":last-child"),
            Self::Root => out.write_str(":root"),
        }
    }
}

impl Display for CompoundSelector {
    fn fmt(&self, out: &mut Formatter<'_>) -> fmt::Result {
        for simple in &self.simples {
            simple.fmt(out)?;
        }
        Ok(())
    }
}

impl Display for Combinator {
    fn fmt(&self, out: &mut Formatter<'_>) -> fmt::Result {
        out.write_str(match self {
            Self::Descendant => " ",
            Self::Child => " > ",
            Self::AdjacentSibling => " + ",
            Self::GeneralSibling => " ~ ",
        })
    }
}

impl Display for ComplexSelector {
    fn fmt(&self, out: &mut Formatter<'_>) -> fmt::Result {
        self.first.fmt(out)?;
        for (combinator, compound) in &self.rest {
            combinator.fmt(out)?;
            compound.fmt(out)?;
        }
        Ok(())
    }
}

impl Display for SelectorList {
    fn fmt(&self, out: &mut Formatter<'_>) -> fmt::Result {
        for (index, selector) in self.selectors.iter().enumerate() {
            if index > 0 {
                out.write_str(", ")?;
            }
            selector.fmt(out)?;
        }
        Ok(())
    }
}
