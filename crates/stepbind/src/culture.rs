//! Culture settings consulted by simple conversion.
//!
//! A [`BindingCulture`] decides how numbers and dates written in feature
//! files are read: which character separates decimals, which groups
//! thousands, and which date and time layouts are tried before the ISO
//! fallbacks.

use std::fmt;

/// Number and date conventions for converting step arguments.
///
/// # Examples
///
/// ```
/// use stepbind::BindingCulture;
///
/// let culture = BindingCulture::from_name("de-DE").expect("known culture");
/// assert_eq!(culture.decimal_separator(), ',');
/// assert_eq!(BindingCulture::default().name(), "invariant");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingCulture {
    name: String,
    decimal_separator: char,
    group_separator: char,
    date_formats: Vec<String>,
    datetime_formats: Vec<String>,
    time_formats: Vec<String>,
}

const ISO_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
const ISO_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];
const ISO_TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];

fn owned(formats: &[&str]) -> Vec<String> {
    formats.iter().map(|f| (*f).to_string()).collect()
}

impl BindingCulture {
    /// Build a culture with the given separators and no preferred date
    /// layouts; ISO layouts are always accepted.
    #[must_use]
    pub fn new(name: impl Into<String>, decimal_separator: char, group_separator: char) -> Self {
        Self {
            name: name.into(),
            decimal_separator,
            group_separator,
            date_formats: Vec::new(),
            datetime_formats: Vec::new(),
            time_formats: Vec::new(),
        }
    }

    /// Replace the preferred date layouts (`chrono` strftime syntax).
    #[must_use]
    pub fn with_date_formats(mut self, formats: &[&str]) -> Self {
        self.date_formats = owned(formats);
        self
    }

    /// Replace the preferred date-time layouts.
    #[must_use]
    pub fn with_datetime_formats(mut self, formats: &[&str]) -> Self {
        self.datetime_formats = owned(formats);
        self
    }

    /// Replace the preferred time layouts.
    #[must_use]
    pub fn with_time_formats(mut self, formats: &[&str]) -> Self {
        self.time_formats = owned(formats);
        self
    }

    /// The culture-neutral default: `.` decimals, `,` grouping, US-style
    /// month-first dates.
    #[must_use]
    pub fn invariant() -> Self {
        Self::new("invariant", '.', ',')
            .with_date_formats(&["%m/%d/%Y"])
            .with_datetime_formats(&["%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M"])
            .with_time_formats(&["%H:%M:%S"])
    }

    /// Look up a preset by name, case-insensitively.
    ///
    /// Known names are `invariant` (also the empty string), `en-US`,
    /// `en-GB`, `de-DE`, `fr-FR` and `nl-NL`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let culture = match name.trim().to_ascii_lowercase().as_str() {
            "" | "invariant" => Self::invariant(),
            "en-us" => Self::new("en-US", '.', ',')
                .with_date_formats(&["%m/%d/%Y"])
                .with_datetime_formats(&[
                    "%m/%d/%Y %I:%M:%S %p",
                    "%m/%d/%Y %H:%M:%S",
                    "%m/%d/%Y %H:%M",
                ])
                .with_time_formats(&["%I:%M:%S %p", "%I:%M %p", "%H:%M:%S"]),
            "en-gb" => Self::new("en-GB", '.', ',')
                .with_date_formats(&["%d/%m/%Y"])
                .with_datetime_formats(&["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"])
                .with_time_formats(&["%H:%M:%S"]),
            "de-de" => Self::new("de-DE", ',', '.')
                .with_date_formats(&["%d.%m.%Y"])
                .with_datetime_formats(&["%d.%m.%Y %H:%M:%S", "%d.%m.%Y %H:%M"])
                .with_time_formats(&["%H:%M:%S"]),
            "fr-fr" => Self::new("fr-FR", ',', '\u{a0}')
                .with_date_formats(&["%d/%m/%Y"])
                .with_datetime_formats(&["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"])
                .with_time_formats(&["%H:%M:%S"]),
            "nl-nl" => Self::new("nl-NL", ',', '.')
                .with_date_formats(&["%d-%m-%Y"])
                .with_datetime_formats(&["%d-%m-%Y %H:%M:%S", "%d-%m-%Y %H:%M"])
                .with_time_formats(&["%H:%M:%S"]),
            _ => return None,
        };
        Some(culture)
    }

    /// Culture name as supplied or from the preset.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Character separating the integral and fractional parts.
    #[must_use]
    pub const fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    /// Character grouping thousands.
    #[must_use]
    pub const fn group_separator(&self) -> char {
        self.group_separator
    }

    /// Preferred date layouts followed by the ISO fallbacks.
    pub fn date_formats(&self) -> impl Iterator<Item = &str> {
        self.date_formats
            .iter()
            .map(String::as_str)
            .chain(ISO_DATE_FORMATS)
    }

    /// Preferred date-time layouts followed by the ISO fallbacks.
    pub fn datetime_formats(&self) -> impl Iterator<Item = &str> {
        self.datetime_formats
            .iter()
            .map(String::as_str)
            .chain(ISO_DATETIME_FORMATS)
    }

    /// Preferred time layouts followed by the ISO fallbacks.
    pub fn time_formats(&self) -> impl Iterator<Item = &str> {
        self.time_formats
            .iter()
            .map(String::as_str)
            .chain(ISO_TIME_FORMATS)
    }

    /// Rewrite a culture-formatted number into Rust's `.`-decimal syntax.
    ///
    /// Group separators are only accepted when `allow_grouping` is set.
    /// Returns `None` when the text uses a foreign decimal point.
    pub(crate) fn normalise_number(&self, text: &str, allow_grouping: bool) -> Option<String> {
        let trimmed = text.trim();
        let mut normalised = String::with_capacity(trimmed.len());
        for ch in trimmed.chars() {
            if ch == self.decimal_separator {
                normalised.push('.');
            } else if allow_grouping && ch == self.group_separator {
                continue;
            } else if ch == '.' || ch == ',' {
                return None;
            } else {
                normalised.push(ch);
            }
        }
        Some(normalised)
    }
}

impl Default for BindingCulture {
    fn default() -> Self {
        Self::invariant()
    }
}

impl fmt::Display for BindingCulture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
