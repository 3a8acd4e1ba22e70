//! Regex synthesis from step method names.
//!
//! A binding declared without expression text falls back to its method name:
//! `given_i_have_entered_amount_into_the_calculator` with a parameter called
//! `amount` becomes a case-insensitive regex matching
//! `I have entered 50 into the calculator`.

use regex::Regex;

use crate::errors::PatternError;

const KEYWORD_PREFIXES: [&str; 5] = ["given", "when", "then", "and", "but"];
const WORD_SEPARATOR: &str = r"\W+";
const PARAMETER_GROUP: &str = "(.*)";

/// Build an anchored regex source from a method name.
///
/// The name is split on underscores and camel-case boundaries. A leading
/// step keyword is dropped. Runs of words that spell a parameter name, or a
/// positional marker such as `P0`, become capture groups.
///
/// # Examples
/// ```
/// use stepbind_patterns::method_name_regex;
/// assert_eq!(
///     method_name_regex("when_i_press_add", &[]),
///     r"^(?i)i\W+press\W+add$"
/// );
/// assert_eq!(
///     method_name_regex("GivenIHaveEnteredP0IntoTheCalculator", &["number"]),
///     r"^(?i)I\W+Have\W+Entered\W+(.*)\W+Into\W+The\W+Calculator$"
/// );
/// ```
#[must_use]
pub fn method_name_regex(method_name: &str, parameter_names: &[&str]) -> String {
    let mut words = split_words(method_name);
    if words.len() > 1
        && words
            .first()
            .is_some_and(|first| KEYWORD_PREFIXES.contains(&first.to_ascii_lowercase().as_str()))
    {
        words.remove(0);
    }
    let parameters: Vec<Vec<String>> = parameter_names
        .iter()
        .map(|name| split_words(name))
        .collect();

    let mut parts: Vec<String> = Vec::with_capacity(words.len());
    let mut index = 0;
    while let Some(word) = words.get(index) {
        if let Some(width) = parameter_width(&words, index, &parameters) {
            parts.push(PARAMETER_GROUP.to_string());
            index += width;
        } else if is_positional_marker(word, parameters.len()) {
            parts.push(PARAMETER_GROUP.to_string());
            index += 1;
        } else {
            parts.push(regex::escape(word));
            index += 1;
        }
    }
    format!("^(?i){}$", parts.join(WORD_SEPARATOR))
}

/// Build and compile a method-name regex.
///
/// # Errors
/// Returns [`PatternError::Regex`] when the synthesised regex exceeds the
/// regex engine's limits.
pub fn compile_method_name_pattern(
    method_name: &str,
    parameter_names: &[&str],
) -> Result<Regex, PatternError> {
    Regex::new(&method_name_regex(method_name, parameter_names)).map_err(PatternError::from)
}

fn parameter_width(words: &[String], start: usize, parameters: &[Vec<String>]) -> Option<usize> {
    parameters
        .iter()
        .filter(|param| !param.is_empty())
        .find(|param| {
            param.iter().enumerate().all(|(offset, part)| {
                words
                    .get(start + offset)
                    .is_some_and(|word| word.eq_ignore_ascii_case(part))
            })
        })
        .map(Vec::len)
}

fn is_positional_marker(word: &str, parameter_count: usize) -> bool {
    let Some(digits) = word.strip_prefix(['P', 'p']) else {
        return false;
    };
    !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
        && digits
            .parse::<usize>()
            .is_ok_and(|position| position < parameter_count)
}

fn split_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    for segment in name.split('_').filter(|segment| !segment.is_empty()) {
        split_camel_case(segment, &mut words);
    }
    words
}

fn split_camel_case(segment: &str, words: &mut Vec<String>) {
    let chars: Vec<char> = segment.chars().collect();
    let mut current = String::new();
    for (index, ch) in chars.iter().enumerate() {
        let prev = index.checked_sub(1).and_then(|i| chars.get(i));
        let next = chars.get(index + 1);
        let boundary = ch.is_uppercase()
            && !current.is_empty()
            && (prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit())
                || next.is_some_and(|n| n.is_lowercase()));
        if boundary {
            words.push(std::mem::take(&mut current));
        }
        current.push(*ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
}
