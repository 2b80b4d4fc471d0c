use lantun_core::{LantunError, LantunResult};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Word separator; every voice vocabulary must carry it.
const SPACE_SYMBOL: char = ' ';

/// The model's fixed input alphabet. Line order in the vocabulary file
/// defines the dense symbol ids. Immutable once built.
pub struct VocabularyTable {
    symbols: Vec<String>,
    symbol_to_id: HashMap<char, i64>,
    space_id: i64,
}

impl VocabularyTable {
    pub fn load(vocab_path: &Path) -> LantunResult<Self> {
        let raw = match fs::read_to_string(vocab_path) {
            Ok(raw) => raw,
            Err(why) => {
                return Err(LantunError::ResourceNotFound(format!(
                    "Failed to load vocabulary: `{}`. Caused by: `{}`",
                    vocab_path.display(),
                    why
                )))
            }
        };
        let symbols: Vec<String> = raw.lines().map(str::to_string).collect();
        if symbols.is_empty() {
            return Err(LantunError::ResourceNotFound(format!(
                "Vocabulary file is empty: `{}`",
                vocab_path.display()
            )));
        }
        let mut symbol_to_id = HashMap::with_capacity(symbols.len());
        for (id, symbol) in symbols.iter().enumerate() {
            let mut chars = symbol.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                // duplicates resolve to the later line
                symbol_to_id.insert(c, id as i64);
            }
        }
        let space_id = match symbol_to_id.get(&SPACE_SYMBOL) {
            Some(id) => *id,
            None => {
                return Err(LantunError::MalformedVocabulary(format!(
                    "Vocabulary `{}` has no space symbol",
                    vocab_path.display()
                )))
            }
        };
        Ok(Self {
            symbols,
            symbol_to_id,
            space_id,
        })
    }

    pub fn id_of(&self, symbol: char) -> Option<i64> {
        self.symbol_to_id.get(&symbol).copied()
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.symbol_to_id.contains_key(&symbol)
    }

    pub fn symbol_of(&self, id: i64) -> Option<&str> {
        usize::try_from(id)
            .ok()
            .and_then(|idx| self.symbols.get(idx))
            .map(String::as_str)
    }

    pub fn space_id(&self) -> i64 {
        self.space_id
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
