//! The Python-style brace formatter.
//!
//! ```text
//! {}            next implicit argument
//! {1}           explicit argument index
//! {0.a.b}       dotted path into an argument
//! {name}        shorthand for {0.name}
//! {0|json}      resolved value piped through a transformer
//! {{ and }}     literal braces
//! ```
//!
//! Path resolution never fails the call: a missing segment renders as the
//! empty string. Mixing implicit and explicit indexing in one template does.
//!
//! ```
//! use textfmt_template::formatter::Formatter;
//! use textfmt_template::pystyle::PyStyleFormatter;
//! use textfmt_template::value::FormatValue;
//!
//! let formatter = PyStyleFormatter::new();
//! let args = [FormatValue::from("Holly"), FormatValue::from(2), FormatValue::from("s")];
//! let result = formatter
//!     .format("{0}, you have {1} unread message{2}", &args)
//!     .unwrap();
//! assert_eq!(result.output, "Holly, you have 2 unread messages");
//! ```

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use textfmt_core::error::{FormatError, FormatResult};
use textfmt_core::logging::format_span;

use crate::formatter::{Formatted, Formatter};
use crate::transformers::{JsonTransformer, Transformer, JSON_TRANSFORMER};
use crate::value::FormatValue;

/// The registered name of [`PyStyleFormatter`].
pub const PY_STYLE_FORMATTER: &str = textfmt_core::settings::PY_STYLE_FORMATTER;

/// A doubled brace, or a placeholder with an optional `|transformer` suffix.
static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{|\}\}|\{([^}]*?)(?:\|([^}]+?))?\}").expect("valid regex")
});

/// Which kind of indexing a template has committed to.
///
/// Starts `Undefined`; the first placeholder fixes it for the rest of the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexingMode {
    /// No placeholder seen yet.
    #[default]
    Undefined,
    /// Placeholders use `{}`.
    Implicit,
    /// Placeholders name an index or path.
    Explicit,
}

impl IndexingMode {
    /// Records a placeholder of the given kind.
    ///
    /// Fails with `IndexingModeConflict` if the template already committed to
    /// the other kind.
    pub fn observe(self, implicit: bool) -> FormatResult<Self> {
        let next = if implicit {
            Self::Implicit
        } else {
            Self::Explicit
        };
        match self {
            Self::Undefined => Ok(next),
            current if current == next => Ok(current),
            current => Err(FormatError::IndexingModeConflict {
                from: current.as_str(),
                to: next.as_str(),
            }),
        }
    }

    /// Returns the lowercase name of the mode.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Implicit => "implicit",
            Self::Explicit => "explicit",
        }
    }
}

impl fmt::Display for IndexingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The Python-style brace formatter.
pub struct PyStyleFormatter {
    transformers: HashMap<String, Box<dyn Transformer>>,
}

impl PyStyleFormatter {
    /// Creates a formatter with the built-in `json` transformer registered.
    pub fn new() -> Self {
        let mut transformers: HashMap<String, Box<dyn Transformer>> = HashMap::new();
        transformers.insert(JSON_TRANSFORMER.to_string(), Box::new(JsonTransformer));
        Self { transformers }
    }

    /// Returns the registered transformer keys, sorted.
    pub fn transformer_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.transformers.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Resolves a placeholder key against the argument list.
    ///
    /// A key whose first segment is not a decimal index is resolved against
    /// the first argument. Any missing segment yields the empty string.
    pub fn resolve(key: &str, args: &[FormatValue]) -> FormatValue {
        let mut segments = key.split('.').peekable();
        let index = match segments.peek() {
            Some(first) if !first.is_empty() && first.bytes().all(|b| b.is_ascii_digit()) => {
                let index = first.parse::<usize>().ok();
                segments.next();
                index
            }
            _ => Some(0),
        };

        let Some(mut current) = index
            .and_then(|i| args.get(i))
            .cloned()
            .map(FormatValue::invoked)
        else {
            return FormatValue::String(String::new());
        };

        for segment in segments {
            match current.member(segment) {
                Some(next) => current = next,
                None => return FormatValue::String(String::new()),
            }
        }
        current
    }

    fn transform(&self, name: &str, value: &FormatValue) -> FormatResult<FormatValue> {
        let transformer = self
            .transformers
            .get(name)
            .ok_or_else(|| FormatError::UnknownTransformer(name.to_string()))?;
        transformer.apply(value)
    }
}

impl Default for PyStyleFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for PyStyleFormatter {
    fn name(&self) -> &str {
        PY_STYLE_FORMATTER
    }

    fn supports_transformers(&self) -> bool {
        true
    }

    fn add_transformer(&mut self, key: &str, transformer: Box<dyn Transformer>) -> FormatResult<()> {
        if self.transformers.contains_key(key) {
            return Err(FormatError::duplicate("Transformer", key));
        }
        self.transformers.insert(key.to_string(), transformer);
        tracing::debug!(transformer = key, "registered transformer");
        Ok(())
    }

    fn has_transformer(&self, key: &str) -> FormatResult<bool> {
        Ok(self.transformers.contains_key(key))
    }

    fn remove_transformer(&mut self, key: &str) -> FormatResult<()> {
        self.transformers
            .remove(key)
            .ok_or_else(|| FormatError::not_found("Transformer", key))?;
        tracing::debug!(transformer = key, "removed transformer");
        Ok(())
    }

    fn format(&self, input: &str, args: &[FormatValue]) -> FormatResult<Formatted> {
        let span = format_span(self.name());
        let _guard = span.enter();

        let mut output = String::with_capacity(input.len());
        let mut last = 0;
        let mut mode = IndexingMode::Undefined;
        let mut next_implicit = 0usize;
        let mut matched = false;

        for caps in PLACEHOLDER_RE.captures_iter(input) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            matched = true;
            output.push_str(&input[last..whole.start()]);
            last = whole.end();

            let token = whole.as_str();
            if token == "{{" || token == "}}" {
                output.push_str(&token[..1]);
                continue;
            }

            let key = caps.get(1).map_or("", |m| m.as_str());
            mode = mode.observe(key.is_empty())?;
            let value = if key.is_empty() {
                let value = Self::resolve(&next_implicit.to_string(), args);
                next_implicit += 1;
                value
            } else {
                Self::resolve(key, args)
            };

            let rendered = match caps.get(2) {
                Some(name) => self.transform(name.as_str(), &value)?,
                None => value,
            };
            tracing::trace!(placeholder = token, "substituted placeholder");
            output.push_str(&rendered.to_display_string());
        }

        if !matched {
            return Ok(Formatted::unmatched(input));
        }
        output.push_str(&input[last..]);
        Ok(Formatted::matched(output))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn fmt(template: &str, args: &[FormatValue]) -> String {
        PyStyleFormatter::new().format(template, args).unwrap().output
    }

    fn keyed(entries: &[(&str, FormatValue)]) -> FormatValue {
        FormatValue::Keyed(
            entries
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[test]
    fn test_name() {
        assert_eq!(PyStyleFormatter::new().name(), "PyStyleFormatter");
    }

    #[test]
    fn test_indexing_mode_transitions() {
        let mode = IndexingMode::Undefined.observe(true).unwrap();
        assert_eq!(mode, IndexingMode::Implicit);
        assert_eq!(mode.observe(true).unwrap(), IndexingMode::Implicit);
        assert!(mode.observe(false).is_err());

        let mode = IndexingMode::Undefined.observe(false).unwrap();
        assert_eq!(mode, IndexingMode::Explicit);
        let err = mode.observe(true).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot switch from explicit to implicit format indexing"
        );
    }

    #[test]
    fn test_unformatted_input() {
        let result = PyStyleFormatter::new().format("Hello World", &[]).unwrap();
        assert!(!result.matched);
        assert_eq!(result.output, "Hello World");
    }

    #[test]
    fn test_implicit_and_explicit() {
        let result = PyStyleFormatter::new()
            .format("The answer to all the questions is {}", &[42.into()])
            .unwrap();
        assert!(result.matched);
        assert_eq!(result.output, "The answer to all the questions is 42");
        assert_eq!(
            fmt("The answer to all the questions is {0}", &[42.into()]),
            "The answer to all the questions is 42"
        );
    }

    #[test]
    fn test_mode_conflicts() {
        let formatter = PyStyleFormatter::new();
        let args = ["answer".into(), 42.into()];
        let err = formatter
            .format("The {} to all the questions is {1}", &args)
            .unwrap_err();
        assert_eq!(err.code(), "indexing_mode_conflict");
        let err = formatter
            .format("The {0} to all the questions is {}", &args)
            .unwrap_err();
        assert_eq!(err.code(), "indexing_mode_conflict");
    }

    #[test]
    fn test_missing_arguments_render_empty() {
        assert_eq!(
            fmt("{0}, you have {1} unread message{2}", &["Steve".into(), 1.into()]),
            "Steve, you have 1 unread message"
        );
        assert_eq!(
            fmt("{}, you have {} unread message{}", &["Steve".into(), 1.into()]),
            "Steve, you have 1 unread message"
        );
    }

    #[test]
    fn test_repeated_placeholder() {
        assert_eq!(
            fmt(
                "the meaning of life is {0} ({1} x {2} is also {0})",
                &[42.into(), 6.into(), 7.into()]
            ),
            "the meaning of life is 42 (6 x 7 is also 42)"
        );
    }

    #[test]
    fn test_default_representations() {
        assert_eq!(fmt("result: {}", &[FormatValue::Null]), "result: null");
        assert_eq!(fmt("result: {}", &[FormatValue::Undefined]), "result: undefined");
        assert_eq!(fmt("result: {}", &[vec![1, 2, 3].into()]), "result: 1,2,3");
        assert_eq!(
            fmt("result: {}", &[keyed(&[("foo", 42.into())])]),
            "result: [object Object]"
        );
    }

    #[test]
    fn test_braces() {
        assert_eq!(
            fmt("{{ {}: \"{}\" }}", &["foo".into(), "bar".into()]),
            "{ foo: \"bar\" }"
        );
        assert_eq!(fmt("{{", &[]), "{");
        assert_eq!(fmt("}}", &[]), "}");
        assert_eq!(fmt("{{}}", &[]), "{}");
        assert_eq!(fmt("{{x}}", &[]), "{x}");
        assert_eq!(fmt("{{{0}}}", &[123.into()]), "{123}");
        assert_eq!(fmt("{{{{0}}}}", &[]), "{{0}}");
        assert_eq!(fmt("}}{{", &[]), "}{");
        assert_eq!(fmt("}}x{{", &[]), "}x{");
    }

    #[test]
    fn test_brace_escape_counts_as_match() {
        let result = PyStyleFormatter::new().format("a {{b}}", &[]).unwrap();
        assert!(result.matched);
        assert_eq!(result.output, "a {b}");
    }

    #[test]
    fn test_dotted_paths() {
        let bobby = keyed(&[("first", "Bobby".into()), ("last", "Fischer".into())]);
        let garry = keyed(&[("first", "Garry".into()), ("last", "Kasparov".into())]);
        assert_eq!(
            fmt("{0.first} {0.last} vs. {1.first} {1.last}", &[bobby, garry]),
            "Bobby Fischer vs. Garry Kasparov"
        );
    }

    #[test]
    fn test_failed_lookup_renders_empty() {
        let cases = [
            FormatValue::Null,
            "x".into(),
            keyed(&[]),
            keyed(&[("foo", FormatValue::Null)]),
            keyed(&[("foo", "x".into())]),
            keyed(&[("foo", keyed(&[]))]),
            keyed(&[("foo", keyed(&[("bar", FormatValue::Null)]))]),
            keyed(&[("foo", keyed(&[("bar", "x".into())]))]),
            keyed(&[("foo", keyed(&[("bar", keyed(&[]))]))]),
        ];
        for case in cases {
            assert_eq!(fmt("result: {foo.bar.baz}", &[case]), "result: ");
        }
    }

    #[test]
    fn test_resolved_leaf() {
        let leaf = |v: FormatValue| keyed(&[("foo", keyed(&[("bar", keyed(&[("baz", v)]))]))]);
        assert_eq!(fmt("result: {foo.bar.baz}", &[leaf(FormatValue::Null)]), "result: null");
        assert_eq!(
            fmt("result: {foo.bar.baz}", &[leaf(FormatValue::Undefined)]),
            "result: undefined"
        );
        assert_eq!(fmt("result: {foo.bar.baz}", &[leaf("x".into())]), "result: x");
        assert_eq!(
            fmt("result: {foo.bar.baz}", &[leaf(keyed(&[]))]),
            "result: [object Object]"
        );
    }

    #[test]
    fn test_method_invocation() {
        assert_eq!(fmt("{0.toLowerCase}", &["III".into()]), "iii");
        assert_eq!(fmt("{0.toUpperCase}", &["iii".into()]), "III");
        assert_eq!(
            fmt("{pop}-{pop}-{pop}", &[vec!["one", "two", "three"].into()]),
            "three-two-one"
        );
        let quip = keyed(&[(
            "quip",
            FormatValue::callable(|| FormatValue::from("Bazinga!")),
        )]);
        assert_eq!(fmt("{quip.toUpperCase}", &[quip]), "BAZINGA!");
    }

    #[test]
    fn test_pop_mutates_caller_sequence() {
        let list: FormatValue = vec!["one", "two"].into();
        assert_eq!(fmt("{pop}-{pop}", &[list.clone()]), "two-one");
        assert_eq!(list.to_display_string(), "");
    }

    #[test]
    fn test_python_suite() {
        let abc: FormatValue = "abc".into();
        assert_eq!(fmt("", &[]), "");
        assert_eq!(fmt("abc", &[]), "abc");
        assert_eq!(fmt("{0}", &[abc.clone()]), "abc");
        assert_eq!(fmt("X{0}", &[abc.clone()]), "Xabc");
        assert_eq!(fmt("{0}X", &[abc.clone()]), "abcX");
        assert_eq!(fmt("X{0}Y", &[abc.clone()]), "XabcY");
        assert_eq!(fmt("{1}", &[1.into(), abc.clone()]), "abc");
        assert_eq!(fmt("X{1}Y", &[1.into(), abc.clone()]), "XabcY");
        assert_eq!(fmt("{0}", &[(-15).into()]), "-15");
        assert_eq!(fmt("{0}{1}", &[(-15).into(), abc.clone()]), "-15abc");
        assert_eq!(fmt("{0}X{1}", &[(-15).into(), abc]), "-15Xabc");
    }

    #[test]
    fn test_json_transformer() {
        let value = keyed(&[("a", 1.into()), ("b", vec!["x"].into())]);
        assert_eq!(fmt("{0|json}", &[value]), r#"{"a":1,"b":["x"]}"#);
        assert_eq!(fmt("{0|json}", &["hi".into()]), "\"hi\"");
        assert_eq!(fmt("{5|json}", &[]), "\"\"");
    }

    #[test]
    fn test_custom_transformer() {
        let mut formatter = PyStyleFormatter::new();
        formatter
            .add_transformer(
                "theLaw",
                Box::new(|v: &FormatValue| -> FormatResult<FormatValue> {
                    Ok(match v {
                        FormatValue::Integer(69) => FormatValue::from("69 (nice!)"),
                        other => other.clone(),
                    })
                }),
            )
            .unwrap();
        let result = formatter
            .format(
                "Todays lucky numbers are {|theLaw}, {|theLaw}, and {|theLaw}.",
                &[42.into(), 69.into(), 9.into()],
            )
            .unwrap();
        assert!(result.matched);
        assert_eq!(result.output, "Todays lucky numbers are 42, 69 (nice!), and 9.");
    }

    #[test]
    fn test_unknown_transformer() {
        let err = PyStyleFormatter::new().format("{|dummy}", &[]).unwrap_err();
        assert_eq!(err.code(), "unknown_transformer");
        assert_eq!(err.to_string(), "no transformer named \"dummy\"");
    }

    #[test]
    fn test_transformer_registry() {
        let mut formatter = PyStyleFormatter::new();
        assert!(formatter.supports_transformers());
        assert!(formatter.has_transformer("json").unwrap());

        let identity = |v: &FormatValue| -> FormatResult<FormatValue> { Ok(v.clone()) };
        formatter.add_transformer("test", Box::new(identity)).unwrap();
        assert!(formatter.has_transformer("test").unwrap());
        assert_eq!(formatter.transformer_keys(), vec!["json", "test"]);

        let err = formatter.add_transformer("test", Box::new(identity)).unwrap_err();
        assert_eq!(err.code(), "duplicate_name");

        formatter.remove_transformer("test").unwrap();
        assert!(!formatter.has_transformer("test").unwrap());
        let err = formatter.remove_transformer("dummy").unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn test_directive_parsers_unsupported() {
        let mut formatter = PyStyleFormatter::new();
        assert!(!formatter.supports_directive_parsers());
        assert!(formatter.has_directive_parser("hex-parser").is_err());
        assert!(formatter.remove_directive_parser("dummy").is_err());
        let parser = crate::directives::default_parsers().remove(0);
        let err = formatter.add_directive_parser(parser).unwrap_err();
        assert_eq!(err.code(), "unsupported_operation");
    }
}
