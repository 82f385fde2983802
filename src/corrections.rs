use std::collections::HashMap;

/// Exact-match `{original -> corrected}` name table.
///
/// Used for every hand-maintained data patch: historical country names,
/// mis-encoded diacritics in player names, and the country rows that need
/// folding after the home/away merge. Entries are keyed by name, never by
/// row position, so they survive reordering of the source data. Review them
/// whenever the source CSVs change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameCorrections {
    pairs: HashMap<String, String>,
}

impl NameCorrections {
    pub fn new<I, A, B>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(from, to)| (from.into(), to.into()))
                .collect(),
        }
    }

    /// Historical team names replaced by the name used for code lookup.
    pub fn display_names() -> Self {
        Self::new([("England", "United Kingdom"), ("Germany FR", "Germany")])
    }

    /// Country rows that come out of the goals merge under a broken name.
    pub fn country_patches() -> Self {
        Self::new([("C\u{FFFD}te d'Ivoire", "Côte d'Ivoire"), ("IR Iran", "Iran")])
    }

    /// Player names whose diacritics were lost in the source export.
    pub fn player_names() -> Self {
        Self::new([("M\u{FFFD}LLER", "MÜLLER"), ("PEL\u{FFFD}", "PELÉ")])
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs.get(name).map(String::as_str)
    }

    /// Corrected name, or the input unchanged.
    pub fn apply<'a>(&'a self, name: &'a str) -> &'a str {
        self.get(name).unwrap_or(name)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
