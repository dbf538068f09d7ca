//! Core token types
//!
//! These are the values handed to the library by an external loader. The
//! library never mutates a [`Token`]; every derived structure borrows or clones
//! from it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Manuscript section a folio belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Herbal,
    Astronomical,
    Biological,
    Cosmological,
    Pharmaceutical,
    Recipes,
    Zodiac,
    Text,
    Unknown,
}

impl Section {
    /// Single-letter transcription code for this section
    pub fn code(&self) -> &'static str {
        match self {
            Section::Herbal => "H",
            Section::Astronomical => "A",
            Section::Biological => "B",
            Section::Cosmological => "C",
            Section::Pharmaceutical => "P",
            Section::Recipes => "S",
            Section::Zodiac => "Z",
            Section::Text => "T",
            Section::Unknown => "?",
        }
    }

    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "h" | "herbal" => Section::Herbal,
            "a" | "astronomical" => Section::Astronomical,
            "b" | "biological" | "balneological" => Section::Biological,
            "c" | "cosmological" => Section::Cosmological,
            "p" | "pharmaceutical" => Section::Pharmaceutical,
            "s" | "recipes" | "stars" => Section::Recipes,
            "z" | "zodiac" => Section::Zodiac,
            "t" | "text" => Section::Text,
            _ => Section::Unknown,
        }
    }
}

impl FromStr for Section {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Section::parse(value))
    }
}

/// Currier language of a folio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    A,
    B,
    #[serde(rename = "NA")]
    NA,
}

impl FromStr for Language {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value.trim() {
            "A" | "a" => Language::A,
            "B" | "b" => Language::B,
            _ => Language::NA,
        })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Language::A => "A",
            Language::B => "B",
            Language::NA => "NA",
        };
        f.write_str(s)
    }
}

/// Where on the page a token was written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Running paragraph text
    Paragraph,
    /// Labels attached to illustrations
    Label,
    /// Text written around a circle
    Circular,
    /// Text written along radii
    Radial,
    Other,
}

impl Placement {
    /// Whether this placement is ordinary paragraph text
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Placement::Paragraph)
    }
}

impl FromStr for Placement {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let first = value.trim().chars().next().map(|c| c.to_ascii_uppercase());
        Ok(match first {
            Some('P') => Placement::Paragraph,
            Some('L') => Placement::Label,
            Some('C') => Placement::Circular,
            Some('R') => Placement::Radial,
            _ => Placement::Other,
        })
    }
}

/// A single transcribed token with its location metadata
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    /// The transcribed word
    pub word: String,
    /// Folio identifier (e.g. `f1r`)
    pub folio: String,
    /// Line identifier within the folio
    pub line: String,
    pub section: Section,
    pub language: Language,
    pub placement: Placement,
}

impl Token {
    /// Create a new token
    pub fn new(
        word: impl Into<String>,
        folio: impl Into<String>,
        line: impl Into<String>,
        section: Section,
        language: Language,
        placement: Placement,
    ) -> Self {
        Self {
            word: word.into(),
            folio: folio.into(),
            line: line.into(),
            section,
            language,
            placement,
        }
    }

    /// Paragraph token with unknown section, the common case in tests and
    /// small fixtures
    pub fn paragraph(
        word: impl Into<String>,
        folio: impl Into<String>,
        line: impl Into<String>,
        language: Language,
    ) -> Self {
        Self::new(word, folio, line, Section::Unknown, language, Placement::Paragraph)
    }

    /// Whether this token shares folio and line with `other`
    pub fn same_line(&self, other: &Token) -> bool {
        self.folio == other.folio && self.line == other.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_codes_parse() {
        assert_eq!("H".parse::<Section>().unwrap(), Section::Herbal);
        assert_eq!("zodiac".parse::<Section>().unwrap(), Section::Zodiac);
        assert_eq!("x".parse::<Section>().unwrap(), Section::Unknown);
        assert_eq!(Section::Recipes.code(), "S");
    }

    #[test]
    fn test_language_parse_and_display() {
        assert_eq!("A".parse::<Language>().unwrap(), Language::A);
        assert_eq!("b".parse::<Language>().unwrap(), Language::B);
        assert_eq!("".parse::<Language>().unwrap(), Language::NA);
        assert_eq!(Language::NA.to_string(), "NA");
    }

    #[test]
    fn test_placement_parse() {
        assert_eq!("P0".parse::<Placement>().unwrap(), Placement::Paragraph);
        assert_eq!("L".parse::<Placement>().unwrap(), Placement::Label);
        assert_eq!("Ri".parse::<Placement>().unwrap(), Placement::Radial);
        assert_eq!("*".parse::<Placement>().unwrap(), Placement::Other);
        assert!(Placement::Paragraph.is_paragraph());
    }

    #[test]
    fn test_same_line() {
        let a = Token::paragraph("daiin", "f1r", "1", Language::A);
        let b = Token::paragraph("chol", "f1r", "1", Language::A);
        let c = Token::paragraph("chol", "f1r", "2", Language::A);
        assert!(a.same_line(&b));
        assert!(!a.same_line(&c));
    }

    #[test]
    fn test_token_serializes() {
        let t = Token::paragraph("daiin", "f1r", "1", Language::NA);
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"language\":\"NA\""));
        assert!(json.contains("\"placement\":\"paragraph\""));
    }
}
