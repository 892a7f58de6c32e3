//! C-style directive sub-parsers.
//!
//! Each [`DirectiveParser`] recognizes one class of directive body (the text
//! after `%`, e.g. `05d` or `-10.2f`) and produces the substituted line. The
//! [`CStyleFormatter`](crate::cstyle::CStyleFormatter) hands every parser an
//! explicit [`DirectiveMatch`] carrying the body, its position in the line and
//! the capture groups of the parser's own pattern.
//!
//! Widths and precisions are always counted in characters, not bytes.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use textfmt_core::error::{FormatError, FormatResult};

use crate::value::FormatValue;

/// A matched directive, passed to [`DirectiveParser::substitute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveMatch<'a> {
    body: &'a str,
    span: Range<usize>,
    captures: Vec<Option<&'a str>>,
}

impl<'a> DirectiveMatch<'a> {
    /// Creates a match from its parts.
    ///
    /// `span` is the byte range of the whole directive, `%` included, within
    /// the line being formatted. `captures[0]` is conventionally the whole body.
    pub fn new(body: &'a str, span: Range<usize>, captures: Vec<Option<&'a str>>) -> Self {
        Self {
            body,
            span,
            captures,
        }
    }

    /// Matches `pattern` against `body`, returning `None` if it does not match.
    pub fn from_pattern(pattern: &Regex, body: &'a str, span: Range<usize>) -> Option<Self> {
        let caps = pattern.captures(body)?;
        let captures = caps.iter().map(|m| m.map(|m| m.as_str())).collect();
        Some(Self::new(body, span, captures))
    }

    /// The directive body without the leading `%` (e.g. `-5.4s`).
    pub fn body(&self) -> &'a str {
        self.body
    }

    /// The byte range of the directive, `%` included, within the line.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Capture group `index`, or `None` if it did not participate.
    pub fn group(&self, index: usize) -> Option<&'a str> {
        self.captures.get(index).copied().flatten()
    }

    /// Replaces exactly this directive in `line` with `replacement`.
    ///
    /// If the span does not fit `line`, the line is returned unchanged.
    pub fn splice(&self, line: &str, replacement: &str) -> String {
        match (line.get(..self.span.start), line.get(self.span.end..)) {
            (Some(before), Some(after)) => format!("{before}{replacement}{after}"),
            _ => line.to_string(),
        }
    }
}

/// A rule recognizing one class of C-style directive.
pub trait DirectiveParser: Send + Sync {
    /// Returns the parser name. Names are unique within a formatter.
    fn name(&self) -> &str;

    /// The anchored recognition pattern, matched against the directive body.
    fn pattern(&self) -> &Regex;

    /// Produces the new line with the directive substituted by `arg`.
    fn substitute(
        &self,
        directive: &DirectiveMatch<'_>,
        line: &str,
        arg: &FormatValue,
    ) -> FormatResult<String>;
}

/// The substitution closure of a [`CustomDirectiveParser`].
pub type SubstituteFn =
    dyn Fn(&DirectiveMatch<'_>, &str, &FormatValue) -> FormatResult<String> + Send + Sync;

/// A directive parser built from a closure.
///
/// # Examples
///
/// ```
/// use regex::Regex;
/// use textfmt_template::cstyle::CStyleFormatter;
/// use textfmt_template::directives::CustomDirectiveParser;
/// use textfmt_template::formatter::Formatter;
/// use textfmt_template::value::FormatValue;
///
/// let parser = CustomDirectiveParser::new(
///     "shout-parser",
///     Regex::new(r"^S$").unwrap(),
///     |directive, line, arg| Ok(directive.splice(line, &arg.to_display_string().to_uppercase())),
/// );
///
/// let mut formatter = CStyleFormatter::new();
/// formatter.add_directive_parser(Box::new(parser)).unwrap();
/// let result = formatter.format("hey %S", &[FormatValue::from("you")]).unwrap();
/// assert_eq!(result.output, "hey YOU");
/// ```
pub struct CustomDirectiveParser {
    name: String,
    pattern: Regex,
    substitute: Box<SubstituteFn>,
}

impl CustomDirectiveParser {
    /// Creates a parser named `name` that handles bodies matching `pattern`.
    pub fn new<F>(name: impl Into<String>, pattern: Regex, substitute: F) -> Self
    where
        F: Fn(&DirectiveMatch<'_>, &str, &FormatValue) -> FormatResult<String>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            pattern,
            substitute: Box::new(substitute),
        }
    }
}

impl DirectiveParser for CustomDirectiveParser {
    fn name(&self) -> &str {
        &self.name
    }

    fn pattern(&self) -> &Regex {
        &self.pattern
    }

    fn substitute(
        &self,
        directive: &DirectiveMatch<'_>,
        line: &str,
        arg: &FormatValue,
    ) -> FormatResult<String> {
        (self.substitute)(directive, line, arg)
    }
}

/// Returns the built-in directive parsers in scan-precedence order.
pub fn default_parsers() -> Vec<Box<dyn DirectiveParser>> {
    vec![
        Box::new(StringIntParser),
        Box::new(PaddedIntParser),
        Box::new(OctalParser),
        Box::new(BinaryParser),
        Box::new(HexParser),
        Box::new(CharParser),
        Box::new(PaddedStringParser),
        Box::new(StringMaxParser),
        Box::new(UnsignedParser),
        Box::new(ExponentialParser),
        Box::new(FloatParser),
    ]
}

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new($re).expect("valid regex"));
    };
}

pattern!(STRING_INT_RE, r"^([ds])$");
pattern!(PADDED_INT_RE, r"^([0\-]?)(\d+)d$");
pattern!(OCTAL_RE, r"^o$");
pattern!(BINARY_RE, r"^b$");
pattern!(HEX_RE, r"^([xX])$");
pattern!(CHAR_RE, r"^c$");
pattern!(PADDED_STRING_RE, r"^(-?)(\d+)s$");
pattern!(STRING_MAX_RE, r"^(-?\d*)\.(\d+)s$");
pattern!(UNSIGNED_RE, r"^u$");
pattern!(EXPONENTIAL_RE, r"^(-?)(\d*)(?:\.(\d+))?e$");
pattern!(FLOAT_RE, r"^(-?)(\d*)(?:\.(\d+))?f$");

// ============================================================
// Integer and string
// ============================================================

/// `%d` and `%s`: plain substitution.
struct StringIntParser;
impl DirectiveParser for StringIntParser {
    fn name(&self) -> &str {
        "string-int-parser"
    }
    fn pattern(&self) -> &Regex {
        &STRING_INT_RE
    }
    fn substitute(
        &self,
        directive: &DirectiveMatch<'_>,
        line: &str,
        arg: &FormatValue,
    ) -> FormatResult<String> {
        if directive.group(1) == Some("d") {
            number_arg(arg)?;
        } else if !matches!(arg, FormatValue::String(_) | FormatValue::Bool(_)) {
            return Err(not_a_string(arg));
        }
        Ok(directive.splice(line, &arg.to_display_string()))
    }
}

/// `%5d`, `%-5d`, `%05d`: width-padded integer.
struct PaddedIntParser;
impl DirectiveParser for PaddedIntParser {
    fn name(&self) -> &str {
        "padded-int-parser"
    }
    fn pattern(&self) -> &Regex {
        &PADDED_INT_RE
    }
    fn substitute(
        &self,
        directive: &DirectiveMatch<'_>,
        line: &str,
        arg: &FormatValue,
    ) -> FormatResult<String> {
        number_arg(arg)?;
        let width = parse_count(directive.group(2).unwrap_or_default())?;
        let text = arg.to_display_string();
        let replacement = match directive.group(1) {
            Some("-") => fit(&text, width, ' ', true),
            Some("0") => zero_fill(&text, width),
            _ => fit(&text, width, ' ', false),
        };
        Ok(directive.splice(line, &replacement))
    }
}

// ============================================================
// Base conversion
// ============================================================

/// `%o`: octal.
struct OctalParser;
impl DirectiveParser for OctalParser {
    fn name(&self) -> &str {
        "octal-parser"
    }
    fn pattern(&self) -> &Regex {
        &OCTAL_RE
    }
    fn substitute(
        &self,
        directive: &DirectiveMatch<'_>,
        line: &str,
        arg: &FormatValue,
    ) -> FormatResult<String> {
        let value = integer_arg(arg)?;
        let digits = format!("{:o}", value.unsigned_abs());
        Ok(directive.splice(line, &signed(value, &digits)))
    }
}

/// `%b`: binary.
struct BinaryParser;
impl DirectiveParser for BinaryParser {
    fn name(&self) -> &str {
        "binary-parser"
    }
    fn pattern(&self) -> &Regex {
        &BINARY_RE
    }
    fn substitute(
        &self,
        directive: &DirectiveMatch<'_>,
        line: &str,
        arg: &FormatValue,
    ) -> FormatResult<String> {
        let value = integer_arg(arg)?;
        let digits = format!("{:b}", value.unsigned_abs());
        Ok(directive.splice(line, &signed(value, &digits)))
    }
}

/// `%x` and `%X`: lower and upper case hexadecimal.
struct HexParser;
impl DirectiveParser for HexParser {
    fn name(&self) -> &str {
        "hex-parser"
    }
    fn pattern(&self) -> &Regex {
        &HEX_RE
    }
    fn substitute(
        &self,
        directive: &DirectiveMatch<'_>,
        line: &str,
        arg: &FormatValue,
    ) -> FormatResult<String> {
        let value = integer_arg(arg)?;
        let digits = if directive.group(1) == Some("X") {
            format!("{:X}", value.unsigned_abs())
        } else {
            format!("{:x}", value.unsigned_abs())
        };
        Ok(directive.splice(line, &signed(value, &digits)))
    }
}

/// `%c`: integer code point to character.
struct CharParser;
impl DirectiveParser for CharParser {
    fn name(&self) -> &str {
        "char-parser"
    }
    fn pattern(&self) -> &Regex {
        &CHAR_RE
    }
    fn substitute(
        &self,
        directive: &DirectiveMatch<'_>,
        line: &str,
        arg: &FormatValue,
    ) -> FormatResult<String> {
        let value = integer_arg(arg)?;
        let ch = u32::try_from(value)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| {
                FormatError::RangeError(format!("{value} is not a valid character code"))
            })?;
        Ok(directive.splice(line, &ch.to_string()))
    }
}

/// `%u`: integer reinterpreted as unsigned 32-bit.
struct UnsignedParser;
impl DirectiveParser for UnsignedParser {
    fn name(&self) -> &str {
        "unicode-parser"
    }
    fn pattern(&self) -> &Regex {
        &UNSIGNED_RE
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn substitute(
        &self,
        directive: &DirectiveMatch<'_>,
        line: &str,
        arg: &FormatValue,
    ) -> FormatResult<String> {
        // Keeps the low 32 bits, two's complement.
        let value = integer_arg(arg)? as u32;
        Ok(directive.splice(line, &value.to_string()))
    }
}

// ============================================================
// Strings
// ============================================================

/// `%5s` and `%-5s`: width-padded string.
struct PaddedStringParser;
impl DirectiveParser for PaddedStringParser {
    fn name(&self) -> &str {
        "padded-string-parser"
    }
    fn pattern(&self) -> &Regex {
        &PADDED_STRING_RE
    }
    fn substitute(
        &self,
        directive: &DirectiveMatch<'_>,
        line: &str,
        arg: &FormatValue,
    ) -> FormatResult<String> {
        let text = arg.as_str().ok_or_else(|| not_a_string(arg))?;
        let width = parse_count(directive.group(2).unwrap_or_default())?;
        let left = directive.group(1) == Some("-");
        Ok(directive.splice(line, &fit(text, width, ' ', left)))
    }
}

/// `%.4s`, `%5.4s`, `%-5.4s`: truncated (and optionally padded) string.
struct StringMaxParser;
impl DirectiveParser for StringMaxParser {
    fn name(&self) -> &str {
        "string-max-parser"
    }
    fn pattern(&self) -> &Regex {
        &STRING_MAX_RE
    }
    fn substitute(
        &self,
        directive: &DirectiveMatch<'_>,
        line: &str,
        arg: &FormatValue,
    ) -> FormatResult<String> {
        let text = arg.as_str().ok_or_else(|| not_a_string(arg))?;
        let max = parse_count(directive.group(2).unwrap_or_default())?;
        let truncated: String = text.chars().take(max).collect();

        let width_spec = directive.group(1).unwrap_or_default();
        let left = width_spec.starts_with('-');
        let digits = width_spec.trim_start_matches('-');
        let replacement = if digits.is_empty() {
            truncated
        } else {
            fit(&truncated, parse_count(digits)?, ' ', left)
        };
        Ok(directive.splice(line, &replacement))
    }
}

// ============================================================
// Floating point
// ============================================================

/// `%e`, `%.2e`, `%15e`, `%-15.2e`: exponential notation.
struct ExponentialParser;
impl DirectiveParser for ExponentialParser {
    fn name(&self) -> &str {
        "exponential-parser"
    }
    fn pattern(&self) -> &Regex {
        &EXPONENTIAL_RE
    }
    fn substitute(
        &self,
        directive: &DirectiveMatch<'_>,
        line: &str,
        arg: &FormatValue,
    ) -> FormatResult<String> {
        let number = number_arg(arg)?;
        let left = directive.group(1) == Some("-");
        let width = optional_count(directive.group(2))?;
        let precision = optional_count(directive.group(3))?;

        let text = to_exponential(number, precision);
        let replacement = match (width, precision) {
            (Some(width), Some(_)) => {
                if char_len(&text) > width {
                    return Err(FormatError::RangeError(format!(
                        "width ({width}) is too small for value ({text})"
                    )));
                }
                pad(&text, width, ' ', left)
            }
            (Some(width), None) => fit_exponential(&text, width)?,
            (None, _) => text,
        };
        Ok(directive.splice(line, &replacement))
    }
}

/// `%f`, `%.2f`, `%10f`, `%-10.2f`: fixed-point notation.
struct FloatParser;
impl DirectiveParser for FloatParser {
    fn name(&self) -> &str {
        "float-parser"
    }
    fn pattern(&self) -> &Regex {
        &FLOAT_RE
    }
    fn substitute(
        &self,
        directive: &DirectiveMatch<'_>,
        line: &str,
        arg: &FormatValue,
    ) -> FormatResult<String> {
        let number = number_arg(arg)?;
        let left = directive.group(1) == Some("-");
        let width = optional_count(directive.group(2))?;
        let precision = optional_count(directive.group(3))?;

        let replacement = match (width, precision) {
            (Some(width), None) => fit_fixed(number, width)?,
            (Some(width), Some(precision)) => pad(&to_fixed(number, precision), width, ' ', left),
            (None, precision) => to_fixed(number, precision.unwrap_or(6)),
        };
        Ok(directive.splice(line, &replacement))
    }
}

// ============================================================
// Helpers
// ============================================================

fn not_a_number(arg: &FormatValue) -> FormatError {
    FormatError::type_mismatch("an integer", arg.to_display_string())
}

fn not_a_string(arg: &FormatValue) -> FormatError {
    FormatError::type_mismatch("a string", arg.to_display_string())
}

/// Negative zero is read as zero.
fn number_arg(arg: &FormatValue) -> FormatResult<f64> {
    let number = arg.as_number().ok_or_else(|| not_a_number(arg))?;
    Ok(if number == 0.0 { 0.0 } else { number })
}

fn integer_arg(arg: &FormatValue) -> FormatResult<i64> {
    let number = number_arg(arg)?;
    arg.as_integer().ok_or_else(|| {
        if number.trunc().abs() >= I64_BOUND {
            FormatError::RangeError(format!("{number} is outside the integer range"))
        } else {
            not_a_number(arg)
        }
    })
}

/// Largest accepted width or precision.
const MAX_FIELD_SIZE: usize = 100;

/// 2^63, the magnitude just past the `i64` range.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn parse_count(digits: &str) -> FormatResult<usize> {
    digits
        .parse()
        .ok()
        .filter(|count| *count <= MAX_FIELD_SIZE)
        .ok_or_else(|| FormatError::RangeError(format!("field size '{digits}' is out of range")))
}

fn optional_count(digits: Option<&str>) -> FormatResult<Option<usize>> {
    digits.filter(|d| !d.is_empty()).map(parse_count).transpose()
}

fn signed(value: i64, digits: &str) -> String {
    if value < 0 {
        format!("-{digits}")
    } else {
        digits.to_string()
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Pads `text` to `width` characters; never truncates.
fn pad(text: &str, width: usize, fill: char, left: bool) -> String {
    let padding: String = std::iter::repeat(fill)
        .take(width.saturating_sub(char_len(text)))
        .collect();
    if left {
        format!("{text}{padding}")
    } else {
        format!("{padding}{text}")
    }
}

/// Keeps the last `n` characters of `text`.
fn keep_last(text: &str, n: usize) -> String {
    let skip = char_len(text).saturating_sub(n);
    text.chars().skip(skip).collect()
}

/// Pads `text` to `width`, then keeps the rightmost `width` characters.
/// A width of zero leaves the text untouched.
fn fit(text: &str, width: usize, fill: char, left: bool) -> String {
    if width == 0 {
        return text.to_string();
    }
    keep_last(&pad(text, width, fill, left), width)
}

/// Zero padding goes between the sign and the digits.
fn zero_fill(text: &str, width: usize) -> String {
    match text.strip_prefix('-') {
        Some(digits) if char_len(text) < width => {
            format!("-{}", pad(digits, width - 1, '0', false))
        }
        _ => fit(text, width, '0', false),
    }
}

/// Splits a finite, non-zero float into an odd integer mantissa and a binary
/// exponent, so that `number.abs() == mantissa * 2^exponent`.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn odd_mantissa(number: f64) -> (u64, i32) {
    let bits = number.abs().to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1 << 52) - 1);
    let (mantissa, exponent) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1 << 52), biased - 1075)
    };
    let zeros = mantissa.trailing_zeros();
    (mantissa >> zeros, exponent + zeros as i32)
}

/// Whether `number` lies exactly halfway between two multiples of
/// `10^-digits`. `digits` may be negative.
fn is_decimal_tie(number: f64, digits: i32) -> bool {
    if number == 0.0 || !number.is_finite() {
        return false;
    }
    // 2 * number * 10^digits must be an odd integer.
    let (mantissa, exponent) = odd_mantissa(number);
    if exponent != -(digits + 1) {
        return false;
    }
    digits >= 0
        || 5_u64
            .checked_pow(digits.unsigned_abs())
            .is_some_and(|divisor| mantissa % divisor == 0)
}

/// Moves an exact tie one step away from zero, so that the standard
/// round-half-to-even formatting rounds it up in magnitude.
fn ties_away_from_zero(number: f64, digits: i32) -> f64 {
    if is_decimal_tie(number, digits) {
        f64::from_bits(number.abs().to_bits() + 1).copysign(number)
    } else {
        number
    }
}

fn digits_i32(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

/// Fixed-point notation with `precision` fraction digits, ties rounded up.
fn to_fixed(number: f64, precision: usize) -> String {
    let number = ties_away_from_zero(number, digits_i32(precision));
    format!("{number:.precision$}")
}

/// Fixed-point notation spanning exactly `width` characters: sign, integer
/// digits, `.` and as many fraction digits as fit.
fn fit_fixed(number: f64, width: usize) -> FormatResult<String> {
    let integer_len = format!("{:.0}", number.trunc().abs()).len() + usize::from(number < 0.0);
    let precision = width.checked_sub(integer_len + 1).ok_or_else(|| {
        FormatError::RangeError(format!("width ({width}) is too small for value ({number})"))
    })?;
    let text = to_fixed(number, precision);
    // A rounding carry adds an integer digit.
    if char_len(&text) > width && precision > 0 {
        return Ok(to_fixed(number, precision - 1));
    }
    Ok(text)
}

/// Decimal exponent of the leading significant digit.
fn decimal_exponent(number: f64) -> i32 {
    format!("{:.24e}", number.abs())
        .split_once('e')
        .and_then(|(_, exponent)| exponent.parse().ok())
        .unwrap_or(0)
}

/// Exponential notation with an explicit exponent sign (`1.23e+2`).
fn to_exponential(number: f64, precision: Option<usize>) -> String {
    let raw = match precision {
        Some(precision) => {
            let digits = digits_i32(precision) - decimal_exponent(number);
            let number = ties_away_from_zero(number, digits);
            format!("{number:.precision$e}")
        }
        None => format!("{number:e}"),
    };
    match raw.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => raw,
    }
}

/// Stretches or shrinks the mantissa so the whole value spans `width`
/// characters, keeping the exponent suffix intact.
fn fit_exponential(text: &str, width: usize) -> FormatResult<String> {
    let Some((mantissa, exponent)) = text.split_once('e') else {
        return Ok(pad(text, width, ' ', false));
    };
    let exponent = format!("e{exponent}");
    let used = mantissa.len() + exponent.len();

    if width >= used {
        let extra = width - used;
        return Ok(if extra == 0 {
            text.to_string()
        } else if mantissa.contains('.') {
            format!("{mantissa}{}{exponent}", "0".repeat(extra))
        } else {
            format!("{mantissa}.{}{exponent}", "0".repeat(extra - 1))
        });
    }

    let too_small = || {
        FormatError::RangeError(format!("width ({width}) is too small for value ({text})"))
    };
    let keep = width.checked_sub(exponent.len()).ok_or_else(too_small)?;
    let mut kept: String = mantissa.chars().take(keep).collect();
    if kept.ends_with('.') {
        kept.pop();
    }
    if kept.is_empty() || kept == "-" {
        return Err(too_small());
    }
    Ok(format!("{kept}{exponent}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(parser: &dyn DirectiveParser, body: &str, arg: FormatValue) -> FormatResult<String> {
        let line = format!("[%{body}]");
        let directive = DirectiveMatch::from_pattern(parser.pattern(), body, 1..body.len() + 2)
            .expect("pattern should match");
        parser.substitute(&directive, &line, &arg)
    }

    #[test]
    fn test_directive_match_groups() {
        let m = DirectiveMatch::from_pattern(&PADDED_INT_RE, "05d", 0..4).unwrap();
        assert_eq!(m.body(), "05d");
        assert_eq!(m.group(0), Some("05d"));
        assert_eq!(m.group(1), Some("0"));
        assert_eq!(m.group(2), Some("5"));
        assert_eq!(m.group(9), None);
    }

    #[test]
    fn test_directive_match_optional_group() {
        let m = DirectiveMatch::from_pattern(&FLOAT_RE, "10f", 0..4).unwrap();
        assert_eq!(m.group(2), Some("10"));
        assert_eq!(m.group(3), None);
    }

    #[test]
    fn test_splice() {
        let m = DirectiveMatch::new("d", 4..6, vec![Some("d")]);
        assert_eq!(m.splice("abc %d xyz", "42"), "abc 42 xyz");
        assert_eq!(m.splice("ab", "42"), "ab");
    }

    #[test]
    fn test_patterns_do_not_overlap_common_bodies() {
        assert!(!PADDED_INT_RE.is_match("-d"));
        assert!(!PADDED_INT_RE.is_match("vd"));
        assert!(!PADDED_STRING_RE.is_match(".4s"));
        assert!(STRING_MAX_RE.is_match(".4s"));
        assert!(STRING_MAX_RE.is_match("-12.10s"));
        assert!(EXPONENTIAL_RE.is_match("-15.2e"));
        assert!(FLOAT_RE.is_match("f"));
    }

    #[test]
    fn test_string_int() {
        assert_eq!(run(&StringIntParser, "d", 10.into()).unwrap(), "[10]");
        assert_eq!(run(&StringIntParser, "d", "10".into()).unwrap(), "[10]");
        assert_eq!(run(&StringIntParser, "s", true.into()).unwrap(), "[true]");
        assert!(run(&StringIntParser, "d", "test".into()).is_err());
        assert!(run(&StringIntParser, "d", true.into()).is_err());
        assert!(run(&StringIntParser, "s", 5.into()).is_err());
    }

    #[test]
    fn test_padded_int() {
        assert_eq!(run(&PaddedIntParser, "05d", 123.into()).unwrap(), "[00123]");
        assert_eq!(run(&PaddedIntParser, "5d", 123.into()).unwrap(), "[  123]");
        assert_eq!(run(&PaddedIntParser, "-5d", 123.into()).unwrap(), "[123  ]");
        assert_eq!(run(&PaddedIntParser, "5d", 1_234_567.into()).unwrap(), "[34567]");
        assert_eq!(run(&PaddedIntParser, "-5d", 1_234_567.into()).unwrap(), "[34567]");
        assert_eq!(run(&PaddedIntParser, "05d", 1_234_567.into()).unwrap(), "[34567]");
    }

    #[test]
    fn test_padded_int_zero_width_keeps_value() {
        assert_eq!(run(&PaddedIntParser, "0d", 123.into()).unwrap(), "[123]");
    }

    #[test]
    fn test_zero_fill_negative() {
        assert_eq!(run(&PaddedIntParser, "05d", (-12).into()).unwrap(), "[-0012]");
    }

    #[test]
    fn test_base_conversion() {
        assert_eq!(run(&OctalParser, "o", 123.into()).unwrap(), "[173]");
        assert_eq!(run(&OctalParser, "o", "0x7b".into()).unwrap(), "[173]");
        assert_eq!(run(&BinaryParser, "b", 123.into()).unwrap(), "[1111011]");
        assert_eq!(run(&HexParser, "x", 123.into()).unwrap(), "[7b]");
        assert_eq!(run(&HexParser, "X", "123".into()).unwrap(), "[7B]");
        assert_eq!(run(&HexParser, "x", (-255).into()).unwrap(), "[-ff]");
        assert_eq!(run(&HexParser, "x", 12.9.into()).unwrap(), "[c]");
    }

    #[test]
    fn test_char() {
        assert_eq!(run(&CharParser, "c", 97.into()).unwrap(), "[a]");
        assert_eq!(run(&CharParser, "c", "0x61".into()).unwrap(), "[a]");
        assert_eq!(run(&CharParser, "c", 0x3042.into()).unwrap(), "[あ]");
        let err = run(&CharParser, "c", (-1).into()).unwrap_err();
        assert_eq!(err.code(), "range_error");
        assert_eq!(run(&CharParser, "c", "test".into()).unwrap_err().code(), "type_mismatch");
    }

    #[test]
    fn test_unsigned() {
        assert_eq!(run(&UnsignedParser, "u", 42.into()).unwrap(), "[42]");
        assert_eq!(run(&UnsignedParser, "u", (-1).into()).unwrap(), "[4294967295]");
        assert_eq!(run(&UnsignedParser, "u", 4_294_967_296_i64.into()).unwrap(), "[0]");
    }

    #[test]
    fn test_padded_string() {
        assert_eq!(run(&PaddedStringParser, "5s", "abc".into()).unwrap(), "[  abc]");
        assert_eq!(run(&PaddedStringParser, "5s", "abcdef".into()).unwrap(), "[bcdef]");
        assert_eq!(run(&PaddedStringParser, "-5s", "abc".into()).unwrap(), "[abc  ]");
        assert!(run(&PaddedStringParser, "5s", true.into()).is_err());
    }

    #[test]
    fn test_string_max() {
        assert_eq!(run(&StringMaxParser, ".4s", "abcde".into()).unwrap(), "[abcd]");
        assert_eq!(run(&StringMaxParser, "5.4s", "abcde".into()).unwrap(), "[ abcd]");
        assert_eq!(run(&StringMaxParser, "-5.4s", "abcde".into()).unwrap(), "[abcd ]");
        assert_eq!(run(&StringMaxParser, "-5.4s", "あいうえお".into()).unwrap(), "[あいうえ ]");
        assert_eq!(run(&StringMaxParser, "3.5s", "abcdef".into()).unwrap(), "[cde]");
        assert_eq!(run(&StringMaxParser, "-.2s", "abc".into()).unwrap(), "[ab]");
    }

    #[test]
    fn test_exponential() {
        assert_eq!(run(&ExponentialParser, "e", 123.into()).unwrap(), "[1.23e+2]");
        assert_eq!(run(&ExponentialParser, "e", 0.00012.into()).unwrap(), "[1.2e-4]");
        assert_eq!(run(&ExponentialParser, ".5e", 123.45.into()).unwrap(), "[1.23450e+2]");
        assert_eq!(run(&ExponentialParser, "15e", 123.45.into()).unwrap(), "[1.2345000000e+2]");
        assert_eq!(run(&ExponentialParser, "15.2e", 123.45.into()).unwrap(), "[        1.23e+2]");
        assert_eq!(run(&ExponentialParser, "-15.2e", 123.45.into()).unwrap(), "[1.23e+2        ]");
    }

    #[test]
    fn test_exponential_width_without_decimal_point() {
        assert_eq!(run(&ExponentialParser, "8e", 100.into()).unwrap(), "[1.000e+2]");
        assert_eq!(run(&ExponentialParser, "5e", 100.into()).unwrap(), "[1.e+2]");
    }

    #[test]
    fn test_exponential_truncates_mantissa() {
        assert_eq!(
            run(&ExponentialParser, "15e", 12_345_678_901.45.into()).unwrap(),
            "[1.234567890e+10]"
        );
        assert_eq!(run(&ExponentialParser, "6e", 123.45.into()).unwrap(), "[1.2e+2]");
        assert_eq!(run(&ExponentialParser, "5e", 123.45.into()).unwrap(), "[1e+2]");
        assert_eq!(run(&ExponentialParser, "3e", 123.45.into()).unwrap_err().code(), "range_error");
    }

    #[test]
    fn test_exponential_too_narrow() {
        let err = run(&ExponentialParser, "-1.1e", 9999.999.into()).unwrap_err();
        assert_eq!(err.code(), "range_error");
    }

    #[test]
    fn test_float() {
        assert_eq!(run(&FloatParser, "f", 1.0.into()).unwrap(), "[1.000000]");
        assert_eq!(run(&FloatParser, ".2f", (-12.98765).into()).unwrap(), "[-12.99]");
        assert_eq!(run(&FloatParser, "10f", 1.0.into()).unwrap(), "[1.00000000]");
        assert_eq!(run(&FloatParser, "10f", (-1.5).into()).unwrap(), "[-1.5000000]");
        assert_eq!(run(&FloatParser, "10.2f", 1.2345.into()).unwrap(), "[      1.23]");
        assert_eq!(run(&FloatParser, "-10.2f", 1.0.into()).unwrap(), "[1.00      ]");
        assert_eq!(run(&FloatParser, "2.2f", 123.0.into()).unwrap(), "[123.00]");
    }

    #[test]
    fn test_float_width_too_small() {
        let err = run(&FloatParser, "2f", 123.0.into()).unwrap_err();
        assert_eq!(err.code(), "range_error");
    }

    #[test]
    fn test_float_width_counts_negative_zero_as_zero() {
        assert_eq!(run(&FloatParser, "5f", (-0.0).into()).unwrap(), "[0.000]");
        assert_eq!(run(&FloatParser, ".1f", (-0.0).into()).unwrap(), "[0.0]");
        assert_eq!(run(&FloatParser, "6f", (-0.5).into()).unwrap(), "[-0.500]");
    }

    #[test]
    fn test_float_width_after_rounding_carry() {
        assert_eq!(run(&FloatParser, "4f", 9.999.into()).unwrap(), "[10.0]");
        assert_eq!(run(&FloatParser, "5f", (-9.999).into()).unwrap(), "[-10.0]");
    }

    #[test]
    fn test_float_rounds_exact_ties_up() {
        assert_eq!(run(&FloatParser, ".1f", 0.25.into()).unwrap(), "[0.3]");
        assert_eq!(run(&FloatParser, ".0f", 2.5.into()).unwrap(), "[3]");
        assert_eq!(run(&FloatParser, ".0f", (-2.5).into()).unwrap(), "[-3]");
        assert_eq!(run(&FloatParser, ".2f", 0.125.into()).unwrap(), "[0.13]");
        // 1.005 is stored slightly below the tie.
        assert_eq!(run(&FloatParser, ".2f", 1.005.into()).unwrap(), "[1.00]");
        assert_eq!(run(&FloatParser, ".1f", 0.35.into()).unwrap(), "[0.3]");
    }

    #[test]
    fn test_exponential_rounds_exact_ties_up() {
        assert_eq!(run(&ExponentialParser, ".1e", 1.25.into()).unwrap(), "[1.3e+0]");
        assert_eq!(run(&ExponentialParser, ".1e", 125.into()).unwrap(), "[1.3e+2]");
        assert_eq!(run(&ExponentialParser, ".0e", 9.5.into()).unwrap(), "[1e+1]");
        assert_eq!(run(&ExponentialParser, ".1e", (-0.125).into()).unwrap(), "[-1.3e-1]");
        assert_eq!(run(&ExponentialParser, ".1e", 124.into()).unwrap(), "[1.2e+2]");
    }

    #[test]
    fn test_decimal_tie_detection() {
        assert!(is_decimal_tie(0.5, 0));
        assert!(is_decimal_tie(0.25, 1));
        assert!(!is_decimal_tie(0.25, 2));
        assert!(is_decimal_tie(250.0, -2));
        assert!(!is_decimal_tie(0.1, 0));
        assert!(!is_decimal_tie(0.0, 0));
    }

    #[test]
    fn test_field_size_is_capped() {
        assert_eq!(run(&PaddedIntParser, "100d", 1.into()).unwrap().len(), 102);
        for body in ["101d", "18446744073709551615d", "99999999999d"] {
            let err = run(&PaddedIntParser, body, 1.into()).unwrap_err();
            assert_eq!(err.code(), "range_error", "{body}");
        }
        assert_eq!(run(&PaddedStringParser, "-999s", "a".into()).unwrap_err().code(), "range_error");
        assert_eq!(run(&StringMaxParser, ".101s", "a".into()).unwrap_err().code(), "range_error");
        assert_eq!(run(&FloatParser, ".101f", 1.into()).unwrap_err().code(), "range_error");
        assert_eq!(run(&ExponentialParser, "200e", 1.into()).unwrap_err().code(), "range_error");
    }

    #[test]
    fn test_integer_directives_reject_out_of_range_floats() {
        let parsers: [(&dyn DirectiveParser, &str); 4] = [
            (&HexParser, "x"),
            (&OctalParser, "o"),
            (&BinaryParser, "b"),
            (&UnsignedParser, "u"),
        ];
        for (parser, body) in parsers {
            let err = run(parser, body, 1e20.into()).unwrap_err();
            assert_eq!(err.code(), "range_error", "{body}");
        }
        assert_eq!(run(&HexParser, "x", (-1e20).into()).unwrap_err().code(), "range_error");
        assert_eq!(run(&HexParser, "x", 1e15.into()).unwrap(), "[38d7ea4c68000]");
        assert_eq!(run(&StringIntParser, "d", 1e20.into()).unwrap(), "[100000000000000000000]");
    }

    #[test]
    fn test_float_type_mismatch() {
        assert_eq!(run(&FloatParser, "f", "test".into()).unwrap_err().code(), "type_mismatch");
    }

    #[test]
    fn test_default_parser_order() {
        let names: Vec<String> = default_parsers().iter().map(|p| p.name().to_string()).collect();
        assert_eq!(
            names,
            vec![
                "string-int-parser",
                "padded-int-parser",
                "octal-parser",
                "binary-parser",
                "hex-parser",
                "char-parser",
                "padded-string-parser",
                "string-max-parser",
                "unicode-parser",
                "exponential-parser",
                "float-parser",
            ]
        );
    }
}
