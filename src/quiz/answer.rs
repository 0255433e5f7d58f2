//! Guess normalization and matching.

use ahash::HashSet;

const REGIONAL_INDICATOR_A: u32 = 0x1F1E6;

/// Lowercases, transliterates German umlauts, folds common Latin diacritics
/// and collapses everything that is not `[a-z0-9]` into single spaces.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.trim().chars().flat_map(char::to_lowercase) {
        match ch {
            'ä' => out.push_str("ae"),
            'ö' => out.push_str("oe"),
            'ü' => out.push_str("ue"),
            'ß' => out.push_str("ss"),
            'æ' => out.push_str("ae"),
            'œ' => out.push_str("oe"),
            ch if ch.is_ascii_alphanumeric() => out.push(ch),
            ch => out.push(fold_diacritic(ch).unwrap_or(' ')),
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

const fn fold_diacritic(ch: char) -> Option<char> {
    Some(match ch {
        'à' | 'á' | 'â' | 'ã' | 'å' | 'ā' | 'ą' | 'ă' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'ď' | 'đ' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
        'ğ' => 'g',
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'ı' => 'i',
        'ł' => 'l',
        'ñ' | 'ń' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ø' | 'ō' | 'ő' => 'o',
        'ř' => 'r',
        'ś' | 'š' | 'ş' | 'ș' => 's',
        'ť' | 'ţ' | 'ț' => 't',
        'ù' | 'ú' | 'û' | 'ū' | 'ů' | 'ű' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        _ => return None,
    })
}

/// Decodes the first two regional indicator symbols of `text` (a flag emoji)
/// into an uppercase ISO alpha-2 code.
pub fn code_from_flag_emoji(text: &str) -> Option<String> {
    let mut letters = text.trim().chars().filter_map(|ch| {
        let offset = u32::from(ch).checked_sub(REGIONAL_INDICATOR_A)?;
        let offset = u8::try_from(offset).ok().filter(|offset| *offset < 26)?;
        Some(char::from(b'A' + offset))
    });
    let first = letters.next()?;
    let second = letters.next()?;
    Some([first, second].into_iter().collect())
}

/// Ratcliff/Obershelp similarity: twice the number of matching characters
/// divided by the combined length.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.chars().collect::<Vec<_>>();
    let b = b.chars().collect::<Vec<_>>();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = 2.0 * matching_chars(&a, &b) as f64 / total as f64;
    ratio
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (start_a, start_b, len) = longest_common_block(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_chars(&a[..start_a], &b[..start_b])
        + matching_chars(&a[start_a + len..], &b[start_b + len..])
}

// Earliest block in `a`, then earliest in `b`, among the longest ones.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut previous = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        let mut current = vec![0usize; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            if ca == cb {
                current[j + 1] = previous[j] + 1;
                if current[j + 1] > best.2 {
                    let len = current[j + 1];
                    best = (i + 1 - len, j + 1 - len, len);
                }
            }
        }
        previous = current;
    }
    best
}

pub fn is_fuzzy_match(guess: &str, candidate: &str) -> bool {
    let guess = normalize(guess);
    let candidate = normalize(candidate);
    if guess.is_empty() || candidate.is_empty() {
        return false;
    }
    if guess == candidate {
        return true;
    }
    let guess_len = guess.chars().count();
    let candidate_len = candidate.chars().count();
    if guess_len.abs_diff(candidate_len) > 2 {
        return false;
    }
    let threshold = if candidate_len <= 5 { 0.78 } else { 0.74 };
    similarity(&guess, &candidate) >= threshold
}

/// `answers` must hold normalized strings, `code` is the uppercase target.
pub fn is_correct_guess(guess: &str, code: &str, answers: &HashSet<String>) -> bool {
    if code_from_flag_emoji(guess).is_some_and(|emoji| emoji.eq_ignore_ascii_case(code)) {
        return true;
    }
    let normalized = normalize(guess);
    if normalized.is_empty() {
        return false;
    }
    normalized == normalize(code)
        || answers.contains(&normalized)
        || answers
            .iter()
            .any(|candidate| is_fuzzy_match(&normalized, candidate))
}
