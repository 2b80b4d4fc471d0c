use crate::vocab::VocabularyTable;
use lantun_core::{LantunError, LantunResult, Romanizer};
use once_cell::sync::Lazy;
use std::borrow::Cow;
use std::collections::HashMap;

/// uroman's catch-all language code; the tool is always invoked with it.
const GENERIC_LANGUAGE_HINT: &str = "xxx";

/// Per-language character rewrites applied before any other normalization
/// step. Keyed by ISO 639-3 code; extending a voice means adding a row here.
static CHAR_SUBSTITUTIONS: Lazy<HashMap<&'static str, Vec<(char, char)>>> = Lazy::new(|| {
    HashMap::from([
        // Romanian voices are trained with the cedilla variant
        ("ron", vec![('ț', 'ţ')]),
    ])
});

pub fn substitute_chars<'a>(language: &str, text: &'a str) -> Cow<'a, str> {
    match CHAR_SUBSTITUTIONS.get(language) {
        Some(pairs) => {
            let mut rewritten = text.to_string();
            for (source, target) in pairs.iter() {
                rewritten = rewritten.replace(*source, target.to_string().as_str());
            }
            Cow::from(rewritten)
        }
        None => Cow::from(text),
    }
}

/// Maps sentence and clause breaks onto the `_` and `-` vocabulary
/// stand-ins. Callers run this before normalization so romanization and
/// case folding cannot corrupt the surrogates.
pub fn remap_clause_breaks(text: &str) -> String {
    text.replace('.', " _ ").replace(',', " - ")
}

/// Characters outside the model alphabet are dropped, order preserved.
/// This is a designed filter, not an error path.
pub fn filter_oov(text: &str, vocab: &VocabularyTable) -> String {
    text.chars().filter(|c| vocab.contains(*c)).collect()
}

/// Brings arbitrary input text into the closed alphabet of the vocabulary:
/// character substitution, optional romanization, case folding, OOV
/// filtering, in that order.
pub struct TextNormalizer {
    language: Option<String>,
    romanize: bool,
    romanizer: Option<Box<dyn Romanizer + Send + Sync>>,
}

impl TextNormalizer {
    pub fn new(
        language: Option<String>,
        romanize: bool,
        romanizer: Option<Box<dyn Romanizer + Send + Sync>>,
    ) -> Self {
        Self {
            language,
            romanize,
            romanizer,
        }
    }

    pub fn normalize(&self, text: &str, vocab: &VocabularyTable) -> LantunResult<String> {
        let text = match self.language.as_deref() {
            Some(language) => substitute_chars(language, text),
            None => Cow::from(text),
        };
        let text = if self.romanize {
            let romanizer = self.romanizer.as_ref().ok_or_else(|| {
                LantunError::RomanizerFailure(
                    "Voice requires romanized input but no romanizer is configured".to_string(),
                )
            })?;
            Cow::from(romanizer.romanize(&text, GENERIC_LANGUAGE_HINT)?)
        } else {
            text
        };
        let text = text.to_lowercase();
        Ok(filter_oov(&text, vocab))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct FixedRomanizer(&'static str);

    impl Romanizer for FixedRomanizer {
        fn romanize(&self, _text: &str, _language_hint: &str) -> LantunResult<String> {
            Ok(self.0.to_string())
        }
    }

    fn test_vocab() -> VocabularyTable {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_\n-\n \na\nb\nc\nd\ne\nh\nl\no\nr\nw\n")
            .unwrap();
        VocabularyTable::load(file.path()).unwrap()
    }

    #[test]
    fn test_romanian_substitution() {
        // comma-below to cedilla, everything else untouched
        assert_eq!(substitute_chars("ron", "țară"), "ţară");
    }

    #[test]
    fn test_substitution_passthrough_for_other_languages() {
        assert_eq!(substitute_chars("ind", "țară"), "țară");
    }

    #[test]
    fn test_clause_break_remapping_runs_before_filtering() {
        let remapped = remap_clause_breaks("Hello, world.");
        // the comma surrogate keeps the original following space
        assert_eq!(remapped.to_lowercase(), "hello -  world _ ");
    }

    #[test]
    fn test_normalize_lowercases_and_filters() {
        let vocab = test_vocab();
        let normalizer = TextNormalizer::new(None, false, None);
        let out = normalizer.normalize("Hello, World!", &vocab).unwrap();
        assert_eq!(out, "hello world");
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let vocab = test_vocab();
        let once = filter_oov("héllo wörld", &vocab);
        let twice = filter_oov(&once, &vocab);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalized_text_stays_in_alphabet() {
        let vocab = test_vocab();
        let normalizer = TextNormalizer::new(None, false, None);
        let out = normalizer.normalize("¿Héllo, wörld? 123", &vocab).unwrap();
        assert!(out.chars().all(|c| vocab.contains(c)));
    }

    #[test]
    fn test_romanization_applies_before_case_folding() {
        let vocab = test_vocab();
        let normalizer =
            TextNormalizer::new(None, true, Some(Box::new(FixedRomanizer("HELLO WORLD"))));
        let out = normalizer.normalize("حللو", &vocab).unwrap();
        assert_eq!(out, "hello world");
    }

    #[test]
    fn test_missing_romanizer_is_an_error() {
        let vocab = test_vocab();
        let normalizer = TextNormalizer::new(None, true, None);
        let result = normalizer.normalize("text", &vocab);
        assert!(matches!(result, Err(LantunError::RomanizerFailure(_))));
    }
}
