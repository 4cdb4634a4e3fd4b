//! Computed style from inline `style` attributes.
//!
//! There is no cascade here: an element's computed values come from a small
//! user-agent default table, the `hidden` attribute, inherited values of its
//! parent, and its own inline declarations, in that order.
//!
//! Reference: <https://www.w3.org/TR/css-style-attr/#interpreting>

use cssparser::{ParseError, Parser, ParserInput, Token};

/// A single declaration parsed from a style attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Property name, ASCII lowercase.
    pub property: String,
    /// Value trimmed of whitespace, with any `!important` flag removed.
    pub value: String,
}

/// Parse the value of a `style` attribute into a list of declarations.
///
/// Items without a colon, or with an empty property or value, are skipped.
pub fn parse_declarations(input: &str) -> Vec<Declaration> {
    input
        .split(';')
        .filter_map(|item| {
            let (raw_prop, raw_value) = item.split_once(':')?;
            let property = raw_prop.trim().to_ascii_lowercase();
            let value = strip_important(raw_value.trim()).trim();
            (!property.is_empty() && !value.is_empty()).then(|| Declaration {
                property,
                value: value.to_owned(),
            })
        })
        .collect()
}

fn strip_important(value: &str) -> &str {
    let Some(bang) = value.rfind('!') else {
        return value;
    };
    let flag = value.get(bang + 1..).unwrap_or_default().trim();
    if flag.eq_ignore_ascii_case("important") {
        value.get(..bang).unwrap_or_default()
    } else {
        value
    }
}

/// The value of `property` in a style attribute, if declared (last one wins).
pub fn declared_value(style_attr: &str, property: &str) -> Option<String> {
    parse_declarations(style_attr)
        .into_iter()
        .rev()
        .find(|decl| decl.property.eq_ignore_ascii_case(property))
        .map(|decl| decl.value)
}

/// Rewrite a style attribute with `property` set to `value`, or removed when `value` is `None`.
pub fn with_declaration(style_attr: &str, property: &str, value: Option<&str>) -> String {
    let property = property.to_ascii_lowercase();
    let mut parts: Vec<String> = parse_declarations(style_attr)
        .into_iter()
        .filter(|decl| decl.property != property)
        .map(|decl| format!("{}: {}", decl.property, decl.value))
        .collect();
    if let Some(new_value) = value {
        parts.push(format!("{property}: {new_value}"));
    }
    parts.join("; ")
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Display {
    #[default]
    Block,
    Inline,
    InlineBlock,
    Flex,
    Grid,
    Contents,
    None,
}

impl Display {
    fn parse(value: &str) -> Option<Self> {
        Some(match value.to_ascii_lowercase().as_str() {
            "block" | "list-item" | "table" | "flow-root" => Self::Block,
            "inline" => Self::Inline,
            "inline-block" | "inline-flex" | "inline-grid" => Self::InlineBlock,
            "flex" => Self::Flex,
            "grid" => Self::Grid,
            "contents" => Self::Contents,
            "none" => Self::None,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Clip,
    Scroll,
    Auto,
}

impl Overflow {
    fn parse(value: &str) -> Option<Self> {
        Some(match value.to_ascii_lowercase().as_str() {
            "visible" => Self::Visible,
            "hidden" => Self::Hidden,
            "clip" => Self::Clip,
            "scroll" => Self::Scroll,
            "auto" | "overlay" => Self::Auto,
            _ => return None,
        })
    }

    /// True for values that cut off content outside the box.
    pub const fn clips(self) -> bool {
        matches!(self, Self::Hidden | Self::Clip)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PointerEvents {
    #[default]
    Auto,
    None,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
}

/// A length in px or a percentage of some reference size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Length {
    Px(f64),
    Percent(f64),
}

impl Length {
    /// Parse a `<length-percentage>`: `12px`, `12.5px`, `50%`, or a bare `0`.
    ///
    /// Other units and non-finite numbers are rejected.
    pub fn parse(value: &str) -> Option<Self> {
        parse_entire(value, parse_length_percentage)
    }

    /// Resolve against `reference` (used for percentages).
    pub fn resolve(self, reference: f64) -> f64 {
        match self {
            Self::Px(pixels) => pixels,
            Self::Percent(percent) => reference * percent / 100.0,
        }
    }
}

/// A sum of px and percentage terms, as produced by chained translations.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LengthSum {
    pub px: f64,
    pub percent: f64,
}

impl LengthSum {
    fn add(&mut self, length: Length) {
        match length {
            Length::Px(pixels) => self.px += pixels,
            Length::Percent(percent) => self.percent += percent,
        }
    }

    pub fn resolve(self, reference: f64) -> f64 {
        self.px + reference * self.percent / 100.0
    }
}

/// Accumulated `translate()` from the `transform` property.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Translate {
    pub x: LengthSum,
    pub y: LengthSum,
}

impl Translate {
    /// Parse a `transform` value, keeping only its translations.
    ///
    /// Other transform functions contribute nothing; a malformed value is rejected as a whole.
    pub fn parse(value: &str) -> Option<Self> {
        parse_entire(value, parse_transform)
    }

    /// Resolve against the element's own box size.
    pub fn resolve(self, width: f64, height: f64) -> (f64, f64) {
        (self.x.resolve(width), self.y.resolve(height))
    }
}

type ValueResult<'i, T> = Result<T, ParseError<'i, ()>>;

fn parse_entire<T, F>(value: &str, parse: F) -> Option<T>
where
    F: for<'i, 't> FnOnce(&mut Parser<'i, 't>) -> ValueResult<'i, T>,
{
    let mut input = ParserInput::new(value);
    let mut parser = Parser::new(&mut input);
    parser.parse_entirely(parse).ok()
}

fn finite(number: f32) -> Option<f64> {
    Some(f64::from(number)).filter(|value| value.is_finite())
}

fn parse_length_percentage<'i>(parser: &mut Parser<'i, '_>) -> ValueResult<'i, Length> {
    let location = parser.current_source_location();
    let length = match *parser.next()? {
        Token::Dimension { value, ref unit, .. } if unit.eq_ignore_ascii_case("px") => {
            finite(value).map(Length::Px)
        }
        Token::Percentage { unit_value, .. } => {
            finite(unit_value).map(|fraction| Length::Percent(fraction * 100.0))
        }
        Token::Number { value, .. } if value == 0.0 => Some(Length::Px(0.0)),
        _ => None,
    };
    length.ok_or_else(|| location.new_custom_error(()))
}

/// `<number>` or `<percentage>`, as a fraction.
fn parse_alpha<'i>(parser: &mut Parser<'i, '_>) -> ValueResult<'i, f64> {
    let location = parser.current_source_location();
    let alpha = match *parser.next()? {
        Token::Number { value, .. } | Token::Percentage { unit_value: value, .. } => finite(value),
        _ => None,
    };
    alpha.ok_or_else(|| location.new_custom_error(()))
}

fn parse_transform<'i>(parser: &mut Parser<'i, '_>) -> ValueResult<'i, Translate> {
    let mut translate = Translate::default();
    if parser
        .try_parse(|input| input.expect_ident_matching("none"))
        .is_ok()
    {
        return Ok(translate);
    }
    loop {
        let function = parser.expect_function()?.to_ascii_lowercase();
        parser.parse_nested_block(|args| -> ValueResult<'i, ()> {
            match function.as_str() {
                "translate" => {
                    let x_len = parse_length_percentage(args)?;
                    translate.x.add(x_len);
                    if args.try_parse(Parser::expect_comma).is_ok() {
                        translate.y.add(parse_length_percentage(args)?);
                    }
                }
                "translatex" => translate.x.add(parse_length_percentage(args)?),
                "translatey" => translate.y.add(parse_length_percentage(args)?),
                _ => while args.next().is_ok() {},
            }
            Ok(())
        })?;
        if parser.is_exhausted() {
            return Ok(translate);
        }
    }
}

/// Elements hidden by the user-agent stylesheet.
const UA_DISPLAY_NONE: &[&str] = &[
    "head", "script", "style", "template", "meta", "link", "title", "noscript", "base",
];

/// Computed values used by layout, visibility checks and hit testing.
#[derive(Clone, Debug, PartialEq)]
pub struct ComputedStyle {
    pub display: Display,
    pub visibility: Visibility,
    pub opacity: f64,
    pub overflow_x: Overflow,
    pub overflow_y: Overflow,
    pub pointer_events: PointerEvents,
    pub position: Position,
    pub left: Option<Length>,
    pub top: Option<Length>,
    pub width: Option<Length>,
    pub height: Option<Length>,
    pub translate: Translate,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::default(),
            visibility: Visibility::default(),
            opacity: 1.0,
            overflow_x: Overflow::default(),
            overflow_y: Overflow::default(),
            pointer_events: PointerEvents::default(),
            position: Position::default(),
            left: None,
            top: None,
            width: None,
            height: None,
            translate: Translate::default(),
        }
    }
}

impl ComputedStyle {
    /// Compute the style of an element.
    ///
    /// `parent` supplies inherited properties (`visibility`, `pointer-events`).
    pub fn compute(
        tag: &str,
        hidden_attr: bool,
        style_attr: Option<&str>,
        parent: Option<&Self>,
    ) -> Self {
        let mut style = Self::default();
        if let Some(inherited) = parent {
            style.visibility = inherited.visibility;
            style.pointer_events = inherited.pointer_events;
        }
        if hidden_attr || UA_DISPLAY_NONE.contains(&tag) {
            style.display = Display::None;
        }
        for decl in style_attr.map(parse_declarations).unwrap_or_default() {
            style.apply(&decl);
        }
        style
    }

    /// Apply one declaration; unknown properties and invalid values are ignored.
    fn apply(&mut self, decl: &Declaration) {
        let value = decl.value.as_str();
        match decl.property.as_str() {
            "display" => {
                if let Some(display) = Display::parse(value) {
                    self.display = display;
                }
            }
            "visibility" => match value.to_ascii_lowercase().as_str() {
                "visible" => self.visibility = Visibility::Visible,
                "hidden" => self.visibility = Visibility::Hidden,
                "collapse" => self.visibility = Visibility::Collapse,
                _ => {}
            },
            "opacity" => {
                if let Some(opacity) = parse_entire(value, parse_alpha) {
                    self.opacity = opacity.clamp(0.0, 1.0);
                }
            }
            "overflow" => {
                let keywords: Vec<Overflow> =
                    value.split_whitespace().filter_map(Overflow::parse).collect();
                match keywords.as_slice() {
                    [both] => {
                        self.overflow_x = *both;
                        self.overflow_y = *both;
                    }
                    [x_axis, y_axis] => {
                        self.overflow_x = *x_axis;
                        self.overflow_y = *y_axis;
                    }
                    _ => {}
                }
            }
            "overflow-x" => {
                if let Some(overflow) = Overflow::parse(value) {
                    self.overflow_x = overflow;
                }
            }
            "overflow-y" => {
                if let Some(overflow) = Overflow::parse(value) {
                    self.overflow_y = overflow;
                }
            }
            "pointer-events" => match value.to_ascii_lowercase().as_str() {
                "none" => self.pointer_events = PointerEvents::None,
                "auto" => self.pointer_events = PointerEvents::Auto,
                _ => {}
            },
            "position" => match value.to_ascii_lowercase().as_str() {
                "static" => self.position = Position::Static,
                "relative" | "sticky" => self.position = Position::Relative,
                "absolute" => self.position = Position::Absolute,
                "fixed" => self.position = Position::Fixed,
                _ => {}
            },
            "left" => self.left = Length::parse(value).or(self.left),
            "top" => self.top = Length::parse(value).or(self.top),
            "width" => self.width = Length::parse(value).or(self.width),
            "height" => self.height = Length::parse(value).or(self.height),
            "transform" => {
                if let Some(translate) = Translate::parse(value) {
                    self.translate = translate;
                }
            }
            _ => {}
        }
    }

    /// True when either overflow axis clips content.
    pub const fn clips_overflow(&self) -> bool {
        self.overflow_x.clips() || self.overflow_y.clips()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn important_flag_is_stripped() {
        let decls = parse_declarations("Display: none !important; ; color:");
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].property, "display");
        assert_eq!(decls[0].value, "none");
    }

    #[test]
    fn overflow_shorthand_sets_both_axes() {
        let style = ComputedStyle::compute("div", false, Some("overflow: hidden auto"), None);
        assert_eq!(style.overflow_x, Overflow::Hidden);
        assert_eq!(style.overflow_y, Overflow::Auto);
        assert!(style.clips_overflow());
    }

    #[test]
    fn visibility_inherits_but_opacity_does_not() {
        let parent = ComputedStyle::compute("div", false, Some("visibility: hidden; opacity: 0"), None);
        let child = ComputedStyle::compute("span", false, None, Some(&parent));
        assert_eq!(child.visibility, Visibility::Hidden);
        assert!((child.opacity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn translate_functions_accumulate() {
        let style = ComputedStyle::compute(
            "div",
            false,
            Some("transform: translateX(-100%) translateY(10px) scale(2)"),
            None,
        );
        assert_eq!(style.translate.resolve(200.0, 50.0), (-200.0, 10.0));
    }

    #[test]
    fn mixed_unit_translations_add_up() {
        let style = ComputedStyle::compute(
            "div",
            false,
            Some("transform: translateX(-100%) translateX(10px)"),
            None,
        );
        assert_eq!(style.translate.resolve(100.0, 20.0), (-90.0, 0.0));
        assert_eq!(
            Translate::parse("translate(10px)").map(|translate| translate.resolve(50.0, 50.0)),
            Some((10.0, 0.0))
        );
    }

    #[test]
    fn malformed_transforms_keep_the_previous_value() {
        let style = ComputedStyle::compute(
            "div",
            false,
            Some("transform: translateY(5px); transform: translate(1px, 2px, 3px)"),
            None,
        );
        assert_eq!(style.translate.resolve(10.0, 10.0), (0.0, 5.0));
        assert_eq!(Translate::parse("translateX(10em)"), None);
        assert_eq!(Translate::parse("scale(2) rotate(45deg)"), Some(Translate::default()));
        assert_eq!(Translate::parse("none"), Some(Translate::default()));
    }

    #[test]
    fn non_finite_and_unsupported_lengths_are_rejected() {
        for input in ["infpx", "NaNpx", "-infpx", "1e400px", "1e400%", "10em", "12", "px", "10px 5px", ""] {
            assert_eq!(Length::parse(input), None, "{input:?} should not parse");
        }
        assert_eq!(Length::parse(" 12.5px "), Some(Length::Px(12.5)));
        assert_eq!(Length::parse("50%"), Some(Length::Percent(50.0)));
        assert_eq!(Length::parse("0"), Some(Length::Px(0.0)));
    }

    #[test]
    fn invalid_declarations_do_not_override_earlier_ones() {
        let style = ComputedStyle::compute(
            "div",
            false,
            Some("width: 100px; width: NaNpx; left: infpx; opacity: 0.5; opacity: 1e400"),
            None,
        );
        assert_eq!(style.width, Some(Length::Px(100.0)));
        assert_eq!(style.left, None);
        assert!((style.opacity - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn rewriting_a_declaration_keeps_the_others() {
        let rewritten = with_declaration("width: 10px; pointer-events: auto", "pointer-events", Some("none"));
        assert_eq!(rewritten, "width: 10px; pointer-events: none");
        assert_eq!(declared_value(&rewritten, "pointer-events").as_deref(), Some("none"));
        assert_eq!(with_declaration(&rewritten, "pointer-events", None), "width: 10px");
    }
}
