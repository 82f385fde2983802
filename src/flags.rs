use crate::corrections::NameCorrections;
use crate::error::{AnalysisError, Result};
use crate::records::{read_rows, read_text_lossy};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

const DEFAULT_CODES: &str = include_str!("../data/country_codes.csv");

/// 0x1F1E6 (REGIONAL INDICATOR SYMBOL LETTER A) - 'A'
pub const REGIONAL_INDICATOR_OFFSET: u32 = 127_397;

#[derive(Debug, Deserialize)]
struct RawCode {
    name: String,
    code: String,
}

/// Country display name to ISO-3166 alpha-2 code. Lookups ignore ASCII case
/// and surrounding whitespace.
#[derive(Debug, Clone, Default)]
pub struct CountryCodes {
    by_name: HashMap<String, String>,
}

impl CountryCodes {
    pub fn parse(text: &str) -> Result<Self> {
        let raw: Vec<RawCode> = read_rows(text, "country codes", &["name", "code"])?;
        let mut codes = Self::default();
        for row in raw {
            let code = row.code.trim();
            validate_code(code)?;
            codes.insert(&row.name, code);
        }
        Ok(codes)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Self::parse(&read_text_lossy(path)?)
    }

    pub fn default_codes() -> Result<Self> {
        Self::parse(DEFAULT_CODES)
    }

    pub fn insert(&mut self, name: &str, code: &str) {
        self.by_name
            .insert(lookup_key(name), code.to_ascii_uppercase());
    }

    pub fn code_for(&self, name: &str) -> Result<&str> {
        self.by_name
            .get(&lookup_key(name))
            .map(String::as_str)
            .ok_or_else(|| AnalysisError::UnknownCountry(name.trim().to_string()))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

fn lookup_key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

fn validate_code(code: &str) -> Result<()> {
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(AnalysisError::InvalidCode(code.to_string()))
    }
}

/// Flag emoji for a two-letter code: each letter shifted onto its
/// regional-indicator symbol.
pub fn flag_emoji(code: &str) -> Result<String> {
    validate_code(code)?;
    code.chars()
        .map(|c| {
            char::from_u32(c.to_ascii_uppercase() as u32 + REGIONAL_INDICATOR_OFFSET)
                .ok_or_else(|| AnalysisError::InvalidCode(code.to_string()))
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct FlagCodeResolver {
    codes: CountryCodes,
    display_names: NameCorrections,
}

impl FlagCodeResolver {
    pub fn new(codes: CountryCodes) -> Self {
        Self {
            codes,
            display_names: NameCorrections::display_names(),
        }
    }

    pub fn with_display_names(mut self, display_names: NameCorrections) -> Self {
        self.display_names = display_names;
        self
    }

    /// ISO code for a display name, as already normalized by the caller.
    pub fn resolve_code(&self, display_name: &str) -> Result<&str> {
        self.codes.code_for(display_name)
    }

    pub fn flag_for(&self, display_name: &str) -> Result<String> {
        flag_emoji(self.resolve_code(display_name)?)
    }

    /// Flag for a raw team name from the match data, running it through the
    /// historical display-name table first.
    pub fn flag_for_team(&self, team: &str) -> Result<String> {
        self.flag_for(self.display_names.apply(team.trim()))
    }
}
