/// Verdict for a single board position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LetterStatus {
    /// Same letter, same position.
    Correct,
    /// Letter occurs at another, still unclaimed position of the target.
    Present,
    Absent,
}

impl LetterStatus {
    /// Square used in the shareable result grid.
    #[must_use]
    pub fn emoji(self) -> char {
        match self {
            Self::Correct => '🟩',
            Self::Present => '🟨',
            Self::Absent => '⬜',
        }
    }
}

/// One tile of the board. `letter` is `None` for positions past the end of a
/// guess that is shorter than the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LetterFeedback {
    pub letter: Option<char>,
    pub status: LetterStatus,
}

impl LetterFeedback {
    fn blank() -> Self {
        Self {
            letter: None,
            status: LetterStatus::Absent,
        }
    }
}

/// Compares an already normalized guess against an already normalized target.
///
/// The result always has one entry per target character. Exact matches claim
/// their target position first; remaining guess letters then claim the
/// leftmost unclaimed occurrence of the same letter, in guess order. Guess
/// characters beyond the target length are ignored.
#[must_use]
pub fn compare(guess: &str, target: &str) -> Vec<LetterFeedback> {
    let guess_chars: Vec<char> = guess.chars().collect();
    let target_chars: Vec<char> = target.chars().collect();
    let mut feedback = vec![LetterFeedback::blank(); target_chars.len()];
    let mut target_used = vec![false; target_chars.len()];

    // First pass: exact matches
    for (i, &target_char) in target_chars.iter().enumerate() {
        let Some(&guess_char) = guess_chars.get(i) else {
            break;
        };
        feedback[i].letter = Some(guess_char);
        if guess_char == target_char {
            feedback[i].status = LetterStatus::Correct;
            target_used[i] = true;
        }
    }

    // Second pass: misplaced letters
    let overlap = guess_chars.len().min(target_chars.len());
    for i in 0..overlap {
        if feedback[i].status == LetterStatus::Correct {
            continue;
        }
        let guess_char = guess_chars[i];
        let unclaimed = target_chars
            .iter()
            .enumerate()
            .position(|(j, &c)| !target_used[j] && c == guess_char);
        if let Some(j) = unclaimed {
            feedback[i].status = LetterStatus::Present;
            target_used[j] = true;
        }
    }

    feedback
}

/// Win rule: every tile is correct and the guess is exactly as long as the
/// target, so neither a prefix nor a longer guess solves it.
#[must_use]
pub fn is_solved(feedback: &[LetterFeedback], guess_len: usize) -> bool {
    feedback.len() == guess_len && feedback.iter().all(|f| f.status == LetterStatus::Correct)
}
