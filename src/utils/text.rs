//! Text helpers shared by the normalizer and the key matcher.

use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

/// Lowercase, trim and collapse internal whitespace runs to one space.
pub fn normalize_name(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").to_lowercase()
}

pub fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Last 10 digits after stripping everything else; shorter inputs keep all digits.
pub fn normalize_phone(s: &str) -> String {
    let digits = digits_only(s);
    let skip = digits.len().saturating_sub(10);
    digits[skip..].to_string()
}

/// Word-initial capitals, everything else lowercase.
///
/// A letter starts a word when the previous character is not a letter, so
/// `"followup-scheduled"` becomes `"Followup-Scheduled"` and `"x2"` becomes `"X2"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_letter = true;
        } else {
            out.push(c);
            prev_letter = false;
        }
    }
    out
}

/// Replace whole alphanumeric words matching an acronym (case-insensitive)
/// with the acronym's canonical spelling.
pub fn apply_acronyms(s: &str, acronyms: &[String]) -> String {
    if acronyms.is_empty() {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut word = String::new();
    let flush = |word: &mut String, out: &mut String| {
        if !word.is_empty() {
            match acronyms.iter().find(|a| a.eq_ignore_ascii_case(word)) {
                Some(a) => out.push_str(a),
                None => out.push_str(word),
            }
            word.clear();
        }
    };
    for c in s.chars() {
        if c.is_alphanumeric() {
            word.push(c);
        } else {
            flush(&mut word, &mut out);
            out.push(c);
        }
    }
    flush(&mut word, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_normalization_collapses_whitespace() {
        assert_eq!(normalize_name("  John   Doe "), "john doe");
        assert_eq!(normalize_name("JOHN\tDOE"), "john doe");
    }

    #[test]
    fn phone_keeps_last_ten_digits() {
        assert_eq!(normalize_phone("+91 98765-43210"), "9876543210");
        assert_eq!(normalize_phone("9876543210"), "9876543210");
        assert_eq!(normalize_phone("12-34"), "1234");
        assert_eq!(normalize_phone(""), "");
    }

    #[test]
    fn title_case_matches_word_boundaries() {
        assert_eq!(title_case("new lead"), "New Lead");
        assert_eq!(title_case("FOLLOWUP-SCHEDULED"), "Followup-Scheduled");
        assert_eq!(title_case("kreation x2"), "Kreation X2");
    }

    #[test]
    fn acronyms_only_replace_whole_words() {
        let acr = vec!["TV".to_string(), "GB".to_string()];
        assert_eq!(apply_acronyms("Tv Unit", &acr), "TV Unit");
        assert_eq!(apply_acronyms("Tvastra Gb", &acr), "Tvastra GB");
    }
}
