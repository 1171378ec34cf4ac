//! Applicant name normalization (spec §4.7): strip common corporate
//! suffixes, collapse whitespace, and drop punctuation outside CJK/word
//! characters.

use once_cell::sync::Lazy;
use regex::Regex;

const SUFFIXES: &[&str] = &[
    "有限责任公司",
    "股份有限公司",
    "科技有限公司",
    "技术有限公司",
    "集团有限公司",
    "控股有限公司",
    "有限公司",
    "Corporation",
    "Company",
    "Limited",
    "GmbH",
    "S.A.",
    "N.V.",
    "LLC",
    "Corp.",
    "Ltd.",
    "Inc.",
    "Co.",
];

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
// `\w` is Unicode-aware in the `regex` crate, so this already keeps CJK
// characters alongside ASCII word characters (spec §4.7).
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Normalizes a raw applicant name: trims, strips one trailing suffix
/// (longest match first so "科技有限公司" doesn't get half-stripped to
/// "科技" by "有限公司" alone), collapses whitespace, and removes
/// punctuation outside CJK/word characters.
pub fn normalize_applicant(raw: &str) -> String {
    let mut cleaned = raw.trim().to_string();

    let mut suffixes_by_len: Vec<&str> = SUFFIXES.to_vec();
    suffixes_by_len.sort_by_key(|s| std::cmp::Reverse(s.len()));
    for suffix in suffixes_by_len {
        if cleaned.ends_with(suffix) {
            cleaned.truncate(cleaned.len() - suffix.len());
            cleaned = cleaned.trim().to_string();
            break;
        }
    }

    let cleaned = WHITESPACE.replace_all(&cleaned, " ");
    let cleaned = NON_WORD.replace_all(&cleaned, "");
    cleaned.trim().to_string()
}
