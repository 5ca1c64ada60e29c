//! Console argument parsing
//!
//! Turns one command-line-like string into positional tokens and flags.
//! Parsing never fails: fragments that cannot be read as flags end up as positionals.
//!
//! Supported forms:
//! - `--name=value` and `--name value` (equivalent)
//! - `--name='quoted value'` and `--name "quoted value"` (quotes stripped, spaces kept)
//! - `--name` followed by another flag or end of input: literal flag
//!
//! A value that itself starts with `--` is only read as a value when quoted.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{instrument, trace};

/// Prefix marking a token as a flag.
pub const FLAG_PREFIX: &str = "--";

/// How a flag appeared on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    /// Flag present without a value.
    Present,
    /// Flag carrying a value (quotes already stripped).
    Value(String),
}

/// Result of parsing a console command string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArguments {
    positionals: Vec<String>,
    flags: BTreeMap<String, FlagValue>,
}

impl ParsedArguments {
    /// Non-flag tokens in encounter order.
    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    /// All flags by name. A repeated flag keeps its last occurrence.
    pub fn flags(&self) -> &BTreeMap<String, FlagValue> {
        &self.flags
    }

    pub fn flag(&self, name: &str) -> Option<&FlagValue> {
        self.flags.get(name)
    }

    /// Names of flags given without a value.
    pub fn literal_flags(&self) -> BTreeSet<&str> {
        self.flags
            .iter()
            .filter(|(_, v)| matches!(v, FlagValue::Present))
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Flags given with a value.
    pub fn valued_parameters(&self) -> BTreeMap<&str, &str> {
        self.flags
            .iter()
            .filter_map(|(k, v)| match v {
                FlagValue::Value(value) => Some((k.as_str(), value.as_str())),
                FlagValue::Present => None,
            })
            .collect()
    }

    pub fn has_literal_flag(&self, name: &str) -> bool {
        matches!(self.flags.get(name), Some(FlagValue::Present))
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        match self.flags.get(name) {
            Some(FlagValue::Value(v)) => Some(v),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positionals.is_empty() && self.flags.is_empty()
    }
}

/// Parser hints.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Flags that never take a value, even when followed by a non-flag token.
    pub literal_flags: BTreeSet<String>,
}

impl ParseOptions {
    pub fn with_literal_flags<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            literal_flags: names.into_iter().map(Into::into).collect(),
        }
    }

    fn is_literal(&self, name: &str) -> bool {
        self.literal_flags.contains(name)
    }
}

/// Parse a raw console command string without hints.
pub fn parse(raw: &str) -> ParsedArguments {
    parse_with(raw, &ParseOptions::default())
}

/// Parse a raw console command string.
///
/// Flags listed in `options.literal_flags` are recorded as present and never
/// consume the following token.
#[instrument(level = "trace", skip(options))]
pub fn parse_with(raw: &str, options: &ParseOptions) -> ParsedArguments {
    let mut parsed = ParsedArguments::default();
    let mut tokens = tokenize(raw).into_iter().peekable();

    while let Some(token) = tokens.next() {
        let Some(body) = token.strip_prefix(FLAG_PREFIX) else {
            parsed.positionals.push(unquote(&token));
            continue;
        };

        if let Some((name, value)) = body.split_once('=') {
            if name.is_empty() {
                parsed.positionals.push(unquote(&token));
            } else {
                parsed
                    .flags
                    .insert(name.to_string(), FlagValue::Value(unquote(value)));
            }
            continue;
        }

        if body.is_empty() {
            parsed.positionals.push(token);
            continue;
        }

        let value = if options.is_literal(body) {
            None
        } else {
            tokens.next_if(|next| !is_flag(next)).map(|next| unquote(&next))
        };
        let flag = match value {
            Some(v) => FlagValue::Value(v),
            None => FlagValue::Present,
        };
        parsed.flags.insert(body.to_string(), flag);
    }

    trace!(?parsed, "parsed console arguments");
    parsed
}

fn is_flag(token: &str) -> bool {
    token.starts_with(FLAG_PREFIX)
}

/// Split on whitespace, keeping whitespace inside matching quotes.
///
/// Quote characters stay in the token; `unquote` strips them where a value is read.
/// A quote only opens at the start of a token or right after `=`, and only when
/// the same quote character follows later in the input. Any other quote
/// character (`O'Brien`) is ordinary.
pub(crate) fn tokenize(raw: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for (i, c) in raw.char_indices() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            }
            None if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            None => {
                let at_value_start = current.is_empty() || current.ends_with('=');
                if (c == '"' || c == '\'')
                    && at_value_start
                    && raw[i + c.len_utf8()..].contains(c)
                {
                    quote = Some(c);
                }
                current.push(c);
            }
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Strip one pair of matching surrounding quotes.
pub(crate) fn unquote(value: &str) -> String {
    let mut chars = value.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) if first == last && (first == '"' || first == '\'') => {
            chars.as_str().to_string()
        }
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn given_quoted_segments_when_tokenizing_then_keeps_inner_whitespace() {
        let tokens = tokenize(r#"filter --date="2013-03-07 00:00:00"   --id=10 'a b'"#);
        assert_eq!(
            tokens,
            vec![
                "filter",
                r#"--date="2013-03-07 00:00:00""#,
                "--id=10",
                "'a b'"
            ]
        );
    }

    #[test]
    fn given_unterminated_quote_when_tokenizing_then_quote_is_literal() {
        let tokens = tokenize(r#"run --text="open ended"#);
        assert_eq!(tokens, vec!["run", r#"--text="open"#, "ended"]);
    }

    #[test]
    fn given_apostrophe_in_word_when_parsing_then_following_flag_survives() {
        let parsed = parse("greet O'Brien --loud");

        assert_eq!(parsed.positionals(), ["greet", "O'Brien"]);
        assert_eq!(parsed.flag("loud"), Some(&FlagValue::Present));
    }

    #[test]
    fn given_apostrophe_in_flag_value_when_parsing_then_value_stops_at_whitespace() {
        let parsed = parse("greet --name=O'Brien --loud");

        assert_eq!(parsed.value("name"), Some("O'Brien"));
        assert!(parsed.has_literal_flag("loud"));
    }

    #[rstest]
    #[case(r#"greet O'Brien --title="Sir John""#, &["greet", "O'Brien", r#"--title="Sir John""#])]
    #[case("greet O'Brien --title='Sir John'", &["greet", "O'Brien", "--title='Sir John'"])]
    #[case(r#"say "it's" now"#, &["say", r#""it's""#, "now"])]
    fn given_inner_apostrophe_when_tokenizing_then_only_leading_quotes_pair(
        #[case] raw: &str,
        #[case] expected: &[&str],
    ) {
        assert_eq!(tokenize(raw), expected);
    }

    #[rstest]
    #[case(r#""quoted""#, "quoted")]
    #[case("'single'", "single")]
    #[case("plain", "plain")]
    #[case(r#""mismatched'"#, r#""mismatched'"#)]
    #[case(r#"""#, r#"""#)]
    #[case(r#""""#, "")]
    fn test_unquote(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(unquote(input), expected);
    }

    #[test]
    fn given_equals_and_space_forms_when_parsing_then_results_are_identical() {
        let with_equals = parse(r#"filter --date="2013-03-07 00:00:00" --id=10 --text="custom text""#);
        let with_space = parse(r#"filter --date "2013-03-07 00:00:00" --id=10 --text="custom text""#);

        assert_eq!(with_equals, with_space);
        assert_eq!(with_equals.positionals(), ["filter"]);
        assert_eq!(with_equals.value("date"), Some("2013-03-07 00:00:00"));
        assert_eq!(with_equals.value("id"), Some("10"));
        assert_eq!(with_equals.value("text"), Some("custom text"));
    }

    #[test]
    fn given_flags_without_values_when_parsing_then_records_literal_flags() {
        let parsed = parse("literal --foo --bar");

        assert_eq!(parsed.positionals(), ["literal"]);
        assert_eq!(parsed.literal_flags(), BTreeSet::from(["foo", "bar"]));
        assert!(parsed.valued_parameters().is_empty());
        assert!(!parsed.has_literal_flag("optional"));
        assert_eq!(parsed.value("doo"), None);
    }

    #[test]
    fn given_trailing_value_when_parsing_then_last_flag_consumes_it() {
        let parsed = parse("literal --foo --bar --doo test");

        assert!(parsed.has_literal_flag("foo"));
        assert!(parsed.has_literal_flag("bar"));
        assert_eq!(parsed.value("doo"), Some("test"));
        assert_eq!(parsed.positionals(), ["literal"]);
    }

    #[test]
    fn given_literal_hint_when_parsing_then_flag_does_not_consume_next_token() {
        let options = ParseOptions::with_literal_flags(["foo"]);
        let parsed = parse_with("literal --foo test", &options);

        assert!(parsed.has_literal_flag("foo"));
        assert_eq!(parsed.positionals(), ["literal", "test"]);
    }

    #[test]
    fn given_quoted_value_starting_with_dashes_when_parsing_then_reads_it_as_value() {
        let parsed = parse(r#"run --pattern "--not-a-flag""#);

        assert_eq!(parsed.value("pattern"), Some("--not-a-flag"));
        assert!(!parsed.flags().contains_key("not-a-flag"));
    }

    #[test]
    fn given_unquoted_value_starting_with_dashes_when_parsing_then_reads_sibling_flag() {
        let parsed = parse("run --pattern --not-a-flag");

        assert!(parsed.has_literal_flag("pattern"));
        assert!(parsed.has_literal_flag("not-a-flag"));
    }

    #[test]
    fn given_single_quotes_when_parsing_then_strips_them() {
        let parsed = parse("foo --bar='FOO' --baz='ARE'");

        assert_eq!(parsed.value("bar"), Some("FOO"));
        assert_eq!(parsed.value("baz"), Some("ARE"));
    }

    #[test]
    fn given_value_containing_equals_when_parsing_then_splits_at_first_equals() {
        let parsed = parse("set --expr=a=b");
        assert_eq!(parsed.value("expr"), Some("a=b"));
    }

    #[test]
    fn given_flag_only_invocation_when_parsing_then_has_no_positionals() {
        let parsed = parse("--console");

        assert!(parsed.positionals().is_empty());
        assert!(parsed.has_literal_flag("console"));
    }

    #[rstest]
    #[case("--")]
    #[case("--=value")]
    fn given_flag_without_name_when_parsing_then_treated_as_positional(#[case] raw: &str) {
        let parsed = parse(raw);

        assert_eq!(parsed.positionals(), [raw]);
        assert!(parsed.flags().is_empty());
    }

    #[test]
    fn given_repeated_flag_when_parsing_then_last_occurrence_wins() {
        let parsed = parse("run --level=1 --level=2");
        assert_eq!(parsed.value("level"), Some("2"));
    }

    #[test]
    fn given_quoted_positional_when_parsing_then_strips_quotes() {
        let parsed = parse(r#"greet "John Doe""#);
        assert_eq!(parsed.positionals(), ["greet", "John Doe"]);
    }

    #[test]
    fn given_blank_input_when_parsing_then_empty() {
        assert!(parse("   \t ").is_empty());
    }

    #[test]
    fn given_same_input_when_parsing_twice_then_deterministic() {
        let raw = r#"filter --date "2013-03-07 00:00:00" --flag x y"#;
        assert_eq!(parse(raw), parse(raw));
    }
}
