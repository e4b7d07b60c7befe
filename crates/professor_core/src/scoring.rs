//! Pluggable similarity scoring for free-text answers.
//!
//! # Responsibility
//! - Define the `Scorer` contract used by free-response checks.
//! - Ship a default indel-ratio scorer.
//!
//! # Invariants
//! - Scores are in `[0, 100]`, symmetric, higher means more similar.

/// Similarity scoring contract.
pub trait Scorer {
    fn score(&self, left: &str, right: &str) -> u8;
}

impl<F> Scorer for F
where
    F: Fn(&str, &str) -> u8,
{
    fn score(&self, left: &str, right: &str) -> u8 {
        self(left, right)
    }
}

/// Normalized indel similarity: `100 * 2 * lcs / (len(left) + len(right))`,
/// rounded. Two empty strings score 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndelRatio;

impl Scorer for IndelRatio {
    fn score(&self, left: &str, right: &str) -> u8 {
        let left: Vec<char> = left.chars().collect();
        let right: Vec<char> = right.chars().collect();
        let total = left.len() + right.len();
        if total == 0 {
            return 100;
        }
        let common = longest_common_subsequence(&left, &right);
        let ratio = (200 * common) as f64 / total as f64;
        ratio.round().clamp(0.0, 100.0) as u8
    }
}

fn longest_common_subsequence(left: &[char], right: &[char]) -> usize {
    let mut previous = vec![0usize; right.len() + 1];
    let mut current = vec![0usize; right.len() + 1];
    for left_char in left {
        for (column, right_char) in right.iter().enumerate() {
            current[column + 1] = if left_char == right_char {
                previous[column] + 1
            } else {
                current[column].max(previous[column + 1])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[right.len()]
}

#[cfg(test)]
mod tests {
    use super::{IndelRatio, Scorer};

    #[test]
    fn identical_strings_score_full_marks() {
        assert_eq!(IndelRatio.score("photosynthesis", "photosynthesis"), 100);
        assert_eq!(IndelRatio.score("", ""), 100);
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert_eq!(IndelRatio.score("abc", "xyz"), 0);
        assert_eq!(IndelRatio.score("abc", ""), 0);
    }

    #[test]
    fn partial_overlap_matches_classic_ratio() {
        // lcs("kitten", "sitting") = 4 -> 200 * 4 / 13 = 61.5
        assert_eq!(IndelRatio.score("kitten", "sitting"), 62);
        assert_eq!(IndelRatio.score("sitting", "kitten"), 62);
    }

    #[test]
    fn closures_are_scorers() {
        let always = |_: &str, _: &str| 88u8;
        assert_eq!(always.score("a", "b"), 88);
    }
}
