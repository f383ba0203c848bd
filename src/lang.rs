//! Language code tables.
//!
//! All tools emit two-letter ISO 639-1 codes where one exists; backends
//! using three-letter ISO 639-3 labels are mapped through
//! [ISO_639_3_TO_1], unknown codes pass through unchanged.
use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;

lazy_static! {
    /// The closed set of languages the impresso fastText model can emit.
    pub static ref IMPRESSO_FT_LANGS: HashSet<&'static str> =
        ["de", "en", "fr", "it", "lb"].iter().copied().collect();

    /// ISO 639-3 → ISO 639-1 for the codes emitted by the trigram backend.
    pub static ref ISO_639_3_TO_1: HashMap<&'static str, &'static str> = [
        ("afr", "af"),
        ("aka", "ak"),
        ("amh", "am"),
        ("ara", "ar"),
        ("aze", "az"),
        ("bel", "be"),
        ("ben", "bn"),
        ("bul", "bg"),
        ("cat", "ca"),
        ("ces", "cs"),
        ("cmn", "zh"),
        ("dan", "da"),
        ("deu", "de"),
        ("ell", "el"),
        ("eng", "en"),
        ("epo", "eo"),
        ("est", "et"),
        ("fin", "fi"),
        ("fra", "fr"),
        ("guj", "gu"),
        ("heb", "he"),
        ("hin", "hi"),
        ("hrv", "hr"),
        ("hun", "hu"),
        ("hye", "hy"),
        ("ind", "id"),
        ("ita", "it"),
        ("jav", "jv"),
        ("jpn", "ja"),
        ("kan", "kn"),
        ("kat", "ka"),
        ("khm", "km"),
        ("kor", "ko"),
        ("kur", "ku"),
        ("lat", "la"),
        ("lav", "lv"),
        ("lit", "lt"),
        ("ltz", "lb"),
        ("mal", "ml"),
        ("mar", "mr"),
        ("mkd", "mk"),
        ("mlg", "mg"),
        ("mya", "my"),
        ("nep", "ne"),
        ("nld", "nl"),
        ("nob", "nb"),
        ("ori", "or"),
        ("orm", "om"),
        ("pan", "pa"),
        ("pes", "fa"),
        ("pol", "pl"),
        ("por", "pt"),
        ("ron", "ro"),
        ("rus", "ru"),
        ("sin", "si"),
        ("slk", "sk"),
        ("slv", "sl"),
        ("sna", "sn"),
        ("som", "so"),
        ("spa", "es"),
        ("srp", "sr"),
        ("swe", "sv"),
        ("tam", "ta"),
        ("tel", "te"),
        ("tgl", "tl"),
        ("tha", "th"),
        ("tir", "ti"),
        ("tuk", "tk"),
        ("tur", "tr"),
        ("ukr", "uk"),
        ("urd", "ur"),
        ("uzb", "uz"),
        ("vie", "vi"),
        ("ydd", "yi"),
        ("yor", "yo"),
        ("zul", "zu"),
    ]
    .iter()
    .copied()
    .collect();
}

/// Map a three-letter code to its two-letter equivalent, passing
/// through codes that have none.
pub fn to_iso639_1(code: &str) -> &str {
    ISO_639_3_TO_1.get(code).copied().unwrap_or(code)
}
