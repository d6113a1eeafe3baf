use yomi_types::Candidate;

use crate::script::is_japanese_character;

/// Candidate substrings of one line, addressed by char offset
pub struct CandidateGenerator {
    chars: Vec<char>,
}

impl CandidateGenerator {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
        }
    }

    /// Length of the line in chars
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Candidates starting at `start`, shortest first.
    ///
    /// Stops before the first non-Japanese character, at the end of the
    /// line, or after `max_len` chars.
    pub fn candidates_from(&self, start: usize, max_len: Option<usize>) -> Candidates<'_> {
        let limit = match max_len {
            Some(max_len) => self.chars.len().min(start.saturating_add(max_len)),
            None => self.chars.len(),
        };
        Candidates {
            chars: &self.chars,
            start,
            end: start,
            limit,
        }
    }
}

pub struct Candidates<'a> {
    chars: &'a [char],
    start: usize,
    end: usize,
    limit: usize,
}

impl Iterator for Candidates<'_> {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        if self.end >= self.limit {
            return None;
        }
        if !is_japanese_character(self.chars[self.end]) {
            self.limit = self.end;
            return None;
        }

        self.end += 1;
        Some(Candidate {
            text: self.chars[self.start..self.end].iter().collect(),
            start: self.start,
            end: self.end,
        })
    }
}

/// Convenience over [`CandidateGenerator`] for a single start offset
pub fn candidates_from(text: &str, start: usize, max_len: Option<usize>) -> Vec<Candidate> {
    CandidateGenerator::new(text)
        .candidates_from(start, max_len)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(candidates: Vec<Candidate>) -> Vec<String> {
        candidates.into_iter().map(|c| c.text).collect()
    }

    #[test]
    fn test_increasing_length_to_end() {
        let candidates = candidates_from("お腹がすいた", 0, None);
        assert_eq!(
            texts(candidates.clone()),
            ["お", "お腹", "お腹が", "お腹がす", "お腹がすい", "お腹がすいた"]
        );
        for (i, c) in candidates.iter().enumerate() {
            assert_eq!(c.start, 0);
            assert_eq!(c.end, i + 1);
            assert_eq!(c.len(), i + 1);
        }
    }

    #[test]
    fn test_stops_at_script_boundary() {
        assert_eq!(texts(candidates_from("猫はcute", 0, None)), ["猫", "猫は"]);
        assert_eq!(texts(candidates_from("今日、晴れ", 1, None)), ["日"]);
        assert!(candidates_from("abc日本", 0, None).is_empty());
    }

    #[test]
    fn test_offsets_are_chars() {
        let candidates = candidates_from("Aお腹", 1, None);
        assert_eq!(texts(candidates.clone()), ["お", "お腹"]);
        assert_eq!(candidates[1].start, 1);
        assert_eq!(candidates[1].end, 3);
    }

    #[test]
    fn test_max_len() {
        let line = "あいうえおかきくけこさしすせそ";
        let candidates = candidates_from(line, 2, Some(10));
        assert_eq!(candidates.len(), 10);
        assert_eq!(candidates.last().unwrap().text, "うえおかきくけこさし");
    }

    #[test]
    fn test_start_out_of_range() {
        assert!(candidates_from("お腹", 2, None).is_empty());
        assert!(candidates_from("お腹", 7, Some(10)).is_empty());
        assert!(candidates_from("", 0, None).is_empty());
    }

    #[test]
    fn test_restartable() {
        let generator = CandidateGenerator::new("人々が");
        let first: Vec<_> = generator.candidates_from(0, None).collect();
        let second: Vec<_> = generator.candidates_from(0, None).collect();
        assert_eq!(first, second);
        assert_eq!(generator.len(), 3);
    }
}
