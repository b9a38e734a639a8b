use crate::types::{Quiz, QuizQuestion};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QuestionState {
    #[default]
    Unanswered,
    Selected(String),
    /// Terminal. Holds whatever was selected when the answer was shown.
    Revealed(Option<String>),
}

impl QuestionState {
    pub fn selection(&self) -> Option<&str> {
        match self {
            QuestionState::Unanswered => None,
            QuestionState::Selected(option) => Some(option),
            QuestionState::Revealed(option) => option.as_deref(),
        }
    }

    pub fn is_revealed(&self) -> bool {
        matches!(self, QuestionState::Revealed(_))
    }
}

/// A quiz plus the learner's progress through it.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSession {
    quiz: Quiz,
    states: Vec<QuestionState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub revealed: usize,
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.correct, self.revealed)
    }
}

impl QuizSession {
    pub fn new(quiz: Quiz) -> Self {
        let states = vec![QuestionState::Unanswered; quiz.questions.len()];
        Self { quiz, states }
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn len(&self) -> usize {
        self.quiz.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quiz.questions.is_empty()
    }

    pub fn question(&self, index: usize) -> Option<&QuizQuestion> {
        self.quiz.questions.get(index)
    }

    pub fn state(&self, index: usize) -> Option<&QuestionState> {
        self.states.get(index)
    }

    /// Records a choice. Ignored once the question is revealed.
    pub fn select(&mut self, index: usize, option: impl Into<String>) -> bool {
        match self.states.get_mut(index) {
            Some(state) if !state.is_revealed() => {
                *state = QuestionState::Selected(option.into());
                true
            }
            _ => false,
        }
    }

    pub fn reveal(&mut self, index: usize) -> bool {
        match self.states.get_mut(index) {
            Some(state) if !state.is_revealed() => {
                let selection = state.selection().map(str::to_string);
                *state = QuestionState::Revealed(selection);
                true
            }
            _ => false,
        }
    }

    /// Whether a revealed question was answered correctly. `None` until
    /// revealed.
    pub fn is_correct(&self, index: usize) -> Option<bool> {
        let question = self.quiz.questions.get(index)?;
        match self.states.get(index)? {
            QuestionState::Revealed(selection) => {
                Some(selection.as_deref() == Some(question.correct_answer.as_str()))
            }
            _ => None,
        }
    }

    pub fn score(&self) -> Score {
        let revealed = self.states.iter().filter(|s| s.is_revealed()).count();
        let correct = (0..self.len())
            .filter(|&i| self.is_correct(i) == Some(true))
            .count();
        Score { correct, revealed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(n: usize) -> QuizQuestion {
        QuizQuestion {
            question: format!("Question {n}?"),
            options: vec![
                "A) Borrowing".into(),
                "B) Cloning".into(),
                "C) Leaking".into(),
                "D) Boxing".into(),
            ],
            correct_answer: "A) Borrowing".into(),
            explanation: "References let you use a value without owning it.".into(),
        }
    }

    fn session(n: usize) -> QuizSession {
        QuizSession::new(Quiz {
            title: "Ownership".into(),
            questions: (0..n).map(question).collect(),
        })
    }

    #[test]
    fn selection_only_touches_its_question() {
        let mut quiz = session(3);
        assert!(quiz.select(1, "B) Cloning"));
        assert!(quiz.select(1, "A) Borrowing"));

        assert_eq!(quiz.state(0), Some(&QuestionState::Unanswered));
        assert_eq!(quiz.state(1).unwrap().selection(), Some("A) Borrowing"));
        assert_eq!(quiz.state(2), Some(&QuestionState::Unanswered));
    }

    #[test]
    fn reveal_freezes_selection() {
        let mut quiz = session(1);
        quiz.select(0, "C) Leaking");
        assert!(quiz.reveal(0));
        assert!(!quiz.select(0, "A) Borrowing"));
        assert!(!quiz.reveal(0));
        assert_eq!(quiz.state(0).unwrap().selection(), Some("C) Leaking"));
        assert_eq!(quiz.is_correct(0), Some(false));
    }

    #[test]
    fn score_counts_only_revealed_questions() {
        let mut quiz = session(3);
        quiz.select(0, "A) Borrowing");
        quiz.select(1, "D) Boxing");
        quiz.select(2, "A) Borrowing");
        quiz.reveal(0);
        quiz.reveal(1);

        let score = quiz.score();
        assert_eq!(score, Score { correct: 1, revealed: 2 });
        assert_eq!(score.to_string(), "1 / 2");
    }

    #[test]
    fn revealing_without_answer_counts_as_wrong() {
        let mut quiz = session(2);
        quiz.reveal(0);
        assert_eq!(quiz.is_correct(0), Some(false));
        assert_eq!(quiz.score().to_string(), "0 / 1");
    }

    #[test]
    fn out_of_range_is_ignored() {
        let mut quiz = session(1);
        assert!(!quiz.select(5, "A) Borrowing"));
        assert!(!quiz.reveal(5));
        assert_eq!(quiz.is_correct(5), None);
    }
}
