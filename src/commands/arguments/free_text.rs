use std::{convert::Infallible, fmt::Display, str::FromStr};

/// User-typed text with surrounding whitespace removed.
///
/// Never rejected: an answer that is blank after trimming is still an
/// attempt and is recorded as such.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FreeText(String);

impl FromStr for FreeText {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FreeText::from(s))
    }
}

impl From<&str> for FreeText {
    fn from(value: &str) -> Self {
        FreeText(value.trim().to_owned())
    }
}

impl From<FreeText> for String {
    fn from(value: FreeText) -> Self {
        value.0
    }
}

impl Display for FreeText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FreeText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
