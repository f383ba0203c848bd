//! Length and alphabeticity metrics for content item texts.
//!
//! OCR noise shows up as a low share of letter characters, so the
//! alphabetical ratio doubles as a cheap quality signal for the
//! statistics admission filter.

/// Character-level metrics of a content item text.
///
/// Lengths are counted in Unicode scalar values, letters are
/// characters of the Unicode letter category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub length: usize,
    pub letters: usize,
    pub non_letters: usize,
    pub alphabetical_ratio: f64,
}

/// Compute [TextMetrics] for a text. Pure, never fails.
pub fn metrics(text: &str) -> TextMetrics {
    let mut length = 0usize;
    let mut letters = 0usize;
    for c in text.chars() {
        length += 1;
        if c.is_alphabetic() {
            letters += 1;
        }
    }

    TextMetrics {
        length,
        letters,
        non_letters: length - letters,
        alphabetical_ratio: letters as f64 / length.max(1) as f64,
    }
}

/// Round to `ndigits` decimal places, like the probabilities in the
/// emitted JSON.
pub fn round_to(value: f64, ndigits: i32) -> f64 {
    let factor = 10f64.powi(ndigits);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let m = metrics("");
        assert_eq!(m.length, 0);
        assert_eq!(m.letters, 0);
        assert_eq!(m.alphabetical_ratio, 0.0);
    }

    #[test]
    fn test_plain_sentence() {
        let m = metrics("Die Schweiz.");
        assert_eq!(m.length, 12);
        // space and full stop are not letters
        assert_eq!(m.letters, 10);
        assert_eq!(m.non_letters, 2);
        assert!((m.alphabetical_ratio - 10.0 / 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_unicode_letters() {
        // accented and non-latin letters count as letters
        let m = metrics("été 中文");
        assert_eq!(m.length, 6);
        assert_eq!(m.letters, 5);
    }

    #[test]
    fn test_digits_are_not_letters() {
        let m = metrics("1848 était");
        assert_eq!(m.letters, 5);
        assert_eq!(m.non_letters, 5);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123456789123, 9), 0.123456789);
        assert_eq!(round_to(0.9999999999, 3), 1.0);
        assert_eq!(round_to(0.5551, 3), 0.555);
    }
}
