//! Value formatters selected per series or per group sum row

use serde::Deserialize;
use std::str::FromStr;

use super::{Result, TallyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Formatter {
    /// Bare integer
    #[default]
    Plain,
    /// Integer with a thousands separator
    Thousands(char),
    /// Bare integer followed by `%`
    Percentage,
}

impl Formatter {
    /// Amounts such as counts: `1'234'567`
    pub const fn scalar() -> Self {
        Formatter::Thousands('\'')
    }

    /// Money amounts: `1.234.567`
    pub const fn currency() -> Self {
        Formatter::Thousands('.')
    }

    pub fn format(&self, value: i64) -> String {
        match self {
            Formatter::Plain => value.to_string(),
            Formatter::Thousands(sep) => group_thousands(value, *sep),
            Formatter::Percentage => format!("{}%", value),
        }
    }

    pub fn is_percentage(&self) -> bool {
        matches!(self, Formatter::Percentage)
    }
}

impl FromStr for Formatter {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "plain" => Ok(Formatter::Plain),
            "scalar" => Ok(Formatter::scalar()),
            "currency" => Ok(Formatter::currency()),
            "percentage" | "percent" => Ok(Formatter::Percentage),
            other => Err(TallyError::Config(format!("unknown formatter: {}", other))),
        }
    }
}

impl TryFrom<String> for Formatter {
    type Error = TallyError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

fn group_thousands(value: i64, sep: char) -> String {
    let digits = value.unsigned_abs().to_string();
    let len = digits.len();
    let mut result = String::with_capacity(len + len / 3 + 1);
    if value < 0 {
        result.push('-');
    }

    // Digits are ASCII, so byte indexing is safe
    for (i, ch) in digits.bytes().enumerate() {
        if i > 0 && (len - i).is_multiple_of(3) {
            result.push(sep);
        }
        result.push(ch as char);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain() {
        assert_eq!(Formatter::Plain.format(1234567), "1234567");
        assert_eq!(Formatter::Plain.format(-5), "-5");
    }

    #[test]
    fn test_scalar_separator() {
        assert_eq!(Formatter::scalar().format(0), "0");
        assert_eq!(Formatter::scalar().format(999), "999");
        assert_eq!(Formatter::scalar().format(1000), "1'000");
        assert_eq!(Formatter::scalar().format(1234567), "1'234'567");
    }

    #[test]
    fn test_currency_separator() {
        assert_eq!(Formatter::currency().format(1234567), "1.234.567");
        assert_eq!(Formatter::currency().format(-1234), "-1.234");
    }

    #[test]
    fn test_i64_min_does_not_overflow() {
        let s = Formatter::scalar().format(i64::MIN);
        assert!(s.starts_with("-9'223'372"));
    }

    #[test]
    fn test_percentage_suffix() {
        assert_eq!(Formatter::Percentage.format(12), "12%");
        assert!(Formatter::Percentage.is_percentage());
    }

    #[test]
    fn test_parse_kinds() {
        assert_eq!("currency".parse::<Formatter>().unwrap(), Formatter::currency());
        assert_eq!("Scalar".parse::<Formatter>().unwrap(), Formatter::scalar());
        assert_eq!("".parse::<Formatter>().unwrap(), Formatter::Plain);
        assert!(matches!(
            "roman".parse::<Formatter>(),
            Err(TallyError::Config(_))
        ));
    }

    #[test]
    fn test_deserialize_from_string() {
        let f: Formatter = serde_json::from_str("\"percentage\"").unwrap();
        assert_eq!(f, Formatter::Percentage);
        assert!(serde_json::from_str::<Formatter>("\"nope\"").is_err());
    }
}
