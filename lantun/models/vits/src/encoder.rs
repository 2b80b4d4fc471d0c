use crate::vocab::VocabularyTable;
use lantun_core::{LantunError, LantunResult};
use ndarray::{Array1, Array2};

/// Reserved id interspersed between symbols for voices trained with blanks.
pub const BLANK_ID: i64 = 0;

/// Strict per-character lookup. Normalization is expected to have dropped
/// anything outside the vocabulary; a miss here is a hard error, never a
/// silent substitution.
pub fn symbols_to_ids(text: &str, vocab: &VocabularyTable) -> LantunResult<Vec<i64>> {
    let mut ids = Vec::with_capacity(text.len());
    for symbol in text.chars() {
        match vocab.id_of(symbol) {
            Some(id) => ids.push(id),
            None => {
                return Err(LantunError::UnknownSymbol(format!(
                    "Symbol `{}` (U+{:04X}) is not in the vocabulary",
                    symbol, symbol as u32
                )))
            }
        }
    }
    Ok(ids)
}

/// Inverse of [`symbols_to_ids`], for diagnostics.
pub fn ids_to_symbols(ids: &[i64], vocab: &VocabularyTable) -> LantunResult<String> {
    let mut text = String::with_capacity(ids.len());
    for id in ids {
        match vocab.symbol_of(*id) {
            Some(symbol) => text.push_str(symbol),
            None => {
                return Err(LantunError::UnknownSymbol(format!(
                    "Id `{}` has no vocabulary symbol",
                    id
                )))
            }
        }
    }
    Ok(text)
}

/// `[b, id0, b, id1, ..., b]` — stabilizes duration modelling for voices
/// trained with blank tokens.
pub fn intersperse_blank(ids: Vec<i64>, blank_id: i64) -> Vec<i64> {
    let mut interspersed = Vec::with_capacity(ids.len() * 2 + 1);
    interspersed.push(blank_id);
    for id in ids {
        interspersed.push(id);
        interspersed.push(blank_id);
    }
    interspersed
}

/// Shapes the id sequence the way the acoustic network consumes it: a batch
/// of one plus its length.
pub fn to_input_tensors(ids: &[i64]) -> (Array2<i64>, Array1<i64>) {
    let sequence = Array2::from_shape_vec((1, ids.len()), ids.to_vec()).unwrap();
    let length = Array1::from_iter([ids.len() as i64]);
    (sequence, length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn abc_vocab() -> VocabularyTable {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b" \na\nb\nc\n").unwrap();
        VocabularyTable::load(file.path()).unwrap()
    }

    #[test]
    fn test_strict_lookup() {
        let vocab = abc_vocab();
        assert_eq!(symbols_to_ids("abc", &vocab).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_unknown_symbol_is_an_error() {
        let vocab = abc_vocab();
        let result = symbols_to_ids("abz", &vocab);
        assert!(matches!(result, Err(LantunError::UnknownSymbol(_))));
    }

    #[test]
    fn test_intersperse_shape() {
        let ids = vec![5, 6, 7, 8];
        let out = intersperse_blank(ids.clone(), 0);
        assert_eq!(out.len(), ids.len() * 2 + 1);
        for (i, id) in out.iter().enumerate() {
            if i % 2 == 0 {
                assert_eq!(*id, 0);
            } else {
                assert_eq!(*id, ids[i / 2]);
            }
        }
    }

    #[test]
    fn test_intersperse_empty() {
        assert_eq!(intersperse_blank(Vec::new(), 0), vec![0]);
    }

    #[test]
    fn test_blank_interspersion_scenario() {
        // vocabulary [" ", "a", "b", "c"], blank id 0, input "abc"
        let vocab = abc_vocab();
        let ids = symbols_to_ids("abc", &vocab).unwrap();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(intersperse_blank(ids, BLANK_ID), vec![0, 1, 0, 2, 0, 3, 0]);
    }

    #[test]
    fn test_round_trip() {
        let vocab = abc_vocab();
        let text = "cab ba";
        let ids = symbols_to_ids(text, &vocab).unwrap();
        assert_eq!(ids_to_symbols(&ids, &vocab).unwrap(), text);
    }

    #[test]
    fn test_decode_invalid_id() {
        let vocab = abc_vocab();
        assert!(ids_to_symbols(&[42], &vocab).is_err());
    }

    #[test]
    fn test_input_tensor_shapes() {
        let (sequence, length) = to_input_tensors(&[0, 1, 0, 2, 0]);
        assert_eq!(sequence.shape(), &[1, 5]);
        assert_eq!(length[0], 5);
    }
}
