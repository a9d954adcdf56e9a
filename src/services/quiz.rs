// Quiz Engine
// Awareness quiz session: fixed question bank, score and mistake tracking

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Question, QuizMistake, QuizSummary};

/// The embedded awareness questions, asked strictly in order.
pub fn question_bank() -> Vec<Question> {
    let raw: &[(&str, [&str; 2], usize, &str)] = &[
        (
            "Un SMS te promet 100 000 F si tu cliques sur un lien. Tu fais quoi ?",
            ["Je clique vite", "J’ignore le message"],
            1,
            "C’est typiquement un scam ! Ne clique jamais sur un lien inconnu.",
        ),
        (
            "Un collègue t’envoie un lien étrange via WhatsApp.",
            ["Je lui demande s’il l’a bien envoyé", "Je clique directement"],
            0,
            "Toujours vérifier la source avant de cliquer.",
        ),
        (
            "Un mail de ta banque te demande ton mot de passe.",
            ["Je réponds au mail", "Je contacte la banque directement"],
            1,
            "Les banques ne demandent jamais ton mot de passe par mail.",
        ),
        (
            "Un SMS te dit que tu as un colis en attente avec un lien.",
            ["Je clique sur le lien", "Je vérifie sur le vrai site de livraison"],
            1,
            "Les faux SMS de livraison sont fréquents.",
        ),
        (
            "Tu vois une pub 'Gagne un iPhone gratuit'.",
            ["Je participe", "Je me méfie"],
            1,
            "Les offres trop belles sont presque toujours fausses.",
        ),
        (
            "Tu reçois un appel te demandant ton code Wave.",
            ["Je le donne", "Je raccroche immédiatement"],
            1,
            "Ne partage jamais tes codes, même à quelqu’un de ‘fiable’.",
        ),
        (
            "Tu reçois un lien inconnu d’un ami hacké.",
            ["Je clique", "Je signale et supprime"],
            1,
            "Les comptes piratés envoient souvent des liens piégés.",
        ),
        (
            "Tu veux sécuriser ton mot de passe, que faire ?",
            ["Le même partout", "Un mot de passe fort et différent"],
            1,
            "Utilise un mot de passe unique et complexe pour chaque compte.",
        ),
        (
            "Quel signe indique un site non sécurisé ?",
            ["HTTP sans cadenas", "HTTPS avec cadenas"],
            0,
            "HTTP sans cadenas 🔓 = site non sécurisé.",
        ),
        (
            "Que faire si tu suspectes une arnaque ?",
            ["Je garde pour moi", "Je signale sur Malaw Security"],
            1,
            "Signaler aide à protéger les autres !",
        ),
    ];

    raw.iter()
        .map(|(prompt, options, answer, explanation)| Question {
            prompt: prompt.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            answer: *answer,
            explanation: explanation.to_string(),
        })
        .collect()
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizPhase {
    /// A question is shown and can be answered.
    InProgress,
    /// The current question was answered; waiting for advance().
    AwaitingNext,
    /// The bank is exhausted; only summary() and restart() are useful.
    Completed,
}

impl QuizPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizPhase::InProgress => "in_progress",
            QuizPhase::AwaitingNext => "awaiting_next",
            QuizPhase::Completed => "completed",
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum QuizError {
    #[error("no question is currently answerable")]
    NotAnswerable,
    #[error("choice {0} is out of range")]
    InvalidChoice(usize),
    #[error("not awaiting next question")]
    NotAwaitingNext,
}

/// Feedback returned right after an answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_option: String,
    pub explanation: String,
}

/// One quiz run. Owned by the caller; all state lives here, none in
/// module globals.
pub struct QuizSession {
    questions: Vec<Question>,
    current: usize,
    score: usize,
    mistakes: Vec<QuizMistake>,
    phase: QuizPhase,
}

impl QuizSession {
    pub fn new(questions: Vec<Question>) -> Self {
        let phase = if questions.is_empty() {
            QuizPhase::Completed
        } else {
            QuizPhase::InProgress
        };
        Self {
            questions,
            current: 0,
            score: 0,
            mistakes: Vec::new(),
            phase,
        }
    }

    pub fn with_default_bank() -> Self {
        Self::new(question_bank())
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The question on display, None once the session completed.
    pub fn current_question(&self) -> Option<&Question> {
        if self.phase == QuizPhase::Completed {
            return None;
        }
        self.questions.get(self.current)
    }

    /// Answer the current question. Correct answers raise the score; wrong
    /// ones record a mistake. Moves the session to AwaitingNext.
    pub fn select_answer(&mut self, choice: usize) -> Result<AnswerOutcome, QuizError> {
        if self.phase != QuizPhase::InProgress {
            return Err(QuizError::NotAnswerable);
        }
        let question = self
            .questions
            .get(self.current)
            .ok_or(QuizError::NotAnswerable)?;
        if choice >= question.options.len() {
            return Err(QuizError::InvalidChoice(choice));
        }

        let correct = choice == question.answer;
        if correct {
            self.score += 1;
        } else {
            self.mistakes.push(QuizMistake {
                question: question.prompt.clone(),
                user: question.options[choice].clone(),
                correct: question.options[question.answer].clone(),
                explanation: question.explanation.clone(),
            });
        }
        self.phase = QuizPhase::AwaitingNext;

        Ok(AnswerOutcome {
            correct,
            correct_option: question.options[question.answer].clone(),
            explanation: question.explanation.clone(),
        })
    }

    /// Move past the answered question. Returns the new phase: InProgress
    /// with the next question shown, or Completed when the bank is done.
    pub fn advance(&mut self) -> Result<QuizPhase, QuizError> {
        if self.phase != QuizPhase::AwaitingNext {
            return Err(QuizError::NotAwaitingNext);
        }
        self.current += 1;
        self.phase = if self.current < self.questions.len() {
            QuizPhase::InProgress
        } else {
            QuizPhase::Completed
        };
        Ok(self.phase)
    }

    pub fn summary(&self) -> QuizSummary {
        QuizSummary {
            score: self.score,
            total: self.questions.len(),
            mistakes: self.mistakes.clone(),
        }
    }

    /// Reset all session state and show the first question again.
    pub fn restart(&mut self) {
        self.current = 0;
        self.score = 0;
        self.mistakes.clear();
        self.phase = if self.questions.is_empty() {
            QuizPhase::Completed
        } else {
            QuizPhase::InProgress
        };
    }
}
