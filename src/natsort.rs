//! Natural-order sort keys for corpus file names.
//!
//! Embedded digit runs compare by magnitude instead of character order, so
//! `2.ipynb` sorts before `10.ipynb`. Text runs compare case-insensitively.

use std::cmp::Ordering;

/// One run of a file name: either a maximal decimal digit run or the text
/// between digit runs.
///
/// Keys always alternate `Text`, `Number`, `Text`, ... starting with a
/// (possibly empty) text run, so two keys never compare a number against
/// text at the same position.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// Digit run with leading zeros stripped. Comparing by length first and
    /// content second orders by magnitude without parsing to an integer, so
    /// runs longer than any machine word still compare correctly.
    Number(String),
    /// Lower-cased non-digit run.
    Text(String),
}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Token::Number(a), Token::Number(b)) => {
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            (Token::Text(a), Token::Text(b)) => a.cmp(b),
            (Token::Number(_), Token::Text(_)) => Ordering::Less,
            (Token::Text(_), Token::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sort key for one file name. A strict prefix sorts before any extension of
/// it (`a` before `a1`), which falls out of comparing the token sequences
/// element-wise.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NaturalKey(Vec<Token>);

impl NaturalKey {
    pub fn new(name: &str) -> Self {
        let mut tokens = Vec::new();
        let mut run = String::new();
        let mut in_digits = false;
        for ch in name.chars() {
            if ch.is_ascii_digit() == in_digits {
                run.push(ch);
                continue;
            }
            tokens.push(finish_run(run, in_digits));
            run = String::from(ch);
            in_digits = !in_digits;
        }
        if !run.is_empty() {
            tokens.push(finish_run(run, in_digits));
        }
        NaturalKey(tokens)
    }
}

fn finish_run(run: String, digits: bool) -> Token {
    if digits {
        let stripped = run.trim_start_matches('0');
        if stripped.is_empty() {
            Token::Number("0".to_string())
        } else {
            Token::Number(stripped.to_string())
        }
    } else {
        Token::Text(run.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::NaturalKey;

    fn sorted(mut names: Vec<&str>) -> Vec<&str> {
        names.sort_by_key(|name| NaturalKey::new(name));
        names
    }

    #[test]
    fn digit_runs_compare_by_magnitude() {
        assert!(NaturalKey::new("item2") < NaturalKey::new("item10"));
        assert!(NaturalKey::new("2") < NaturalKey::new("10"));
        assert_eq!(
            sorted(vec!["10.ipynb", "2.ipynb", "1.ipynb"]),
            vec!["1.ipynb", "2.ipynb", "10.ipynb"]
        );
    }

    #[test]
    fn text_runs_compare_case_insensitively() {
        assert_eq!(NaturalKey::new("README"), NaturalKey::new("readme"));
        assert!(NaturalKey::new("Alpha") < NaturalKey::new("beta"));
    }

    #[test]
    fn strict_prefix_sorts_first() {
        assert!(NaturalKey::new("a") < NaturalKey::new("a1"));
        assert!(NaturalKey::new("a1") < NaturalKey::new("a1b"));
    }

    #[test]
    fn leading_zeros_do_not_change_magnitude() {
        assert_eq!(NaturalKey::new("item007"), NaturalKey::new("item7"));
        assert!(NaturalKey::new("item007") < NaturalKey::new("item10"));
    }

    #[test]
    fn digit_runs_longer_than_a_machine_word_stay_ordered() {
        let small = "f18446744073709551615";
        let large = "f18446744073709551616";
        assert!(NaturalKey::new(small) < NaturalKey::new(large));
        let huge = format!("f{}", "9".repeat(40));
        assert!(NaturalKey::new(large) < NaturalKey::new(&huge));
    }

    #[test]
    fn mixed_names_sort_like_the_corpus_expects() {
        assert_eq!(
            sorted(vec![
                "b.ipynb",
                "10-widgets.ipynb",
                "2-basics.ipynb",
                "a.ipynb",
            ]),
            vec!["2-basics.ipynb", "10-widgets.ipynb", "a.ipynb", "b.ipynb"]
        );
    }
}
