//! The conversational phase machine.
//!
//! A coaching session moves through six phases. The transition function is
//! pure so it can be unit tested in isolation and replayed from a transcript.

use serde::{Deserialize, Serialize};

/// Number of questions asked before the interviewer wraps up.
///
/// Policy value, not derived from any external input. Carried on the engine
/// configuration so deployments can tune it.
pub const DEFAULT_MAX_QUESTIONS: u32 = 12;

/// One discrete state of the coaching conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// The interviewer welcomes the candidate and explains the format.
    Intro,
    /// The interviewer asks one short question.
    Ask,
    /// The candidate is answering; the interviewer listens.
    Answer,
    /// The interviewer gives ultra-short feedback on the answer.
    Feedback,
    /// The interviewer closes with an overall assessment.
    Summary,
    /// The session is over. Terminal.
    Completed,
}

impl Phase {
    /// The stored TEXT representation of this phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Intro => "INTRO",
            Phase::Ask => "ASK",
            Phase::Answer => "ANSWER",
            Phase::Feedback => "FEEDBACK",
            Phase::Summary => "SUMMARY",
            Phase::Completed => "COMPLETED",
        }
    }

    /// Parse a stored phase string.
    ///
    /// Returns `None` for anything outside the six known states. Callers must
    /// treat that as a fatal protocol violation rather than guessing a phase.
    pub fn parse(s: &str) -> Option<Phase> {
        match s {
            "INTRO" => Some(Phase::Intro),
            "ASK" => Some(Phase::Ask),
            "ANSWER" => Some(Phase::Answer),
            "FEEDBACK" => Some(Phase::Feedback),
            "SUMMARY" => Some(Phase::Summary),
            "COMPLETED" => Some(Phase::Completed),
            _ => None,
        }
    }

    /// Whether this phase admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute the phase that follows `phase` for a session that has asked
/// `question_count` questions so far.
///
/// `max_questions` is the ceiling at which the interviewer stops asking and
/// moves to the closing summary. `Completed` is a fixed point.
pub fn next_phase(phase: Phase, question_count: u32, max_questions: u32) -> Phase {
    match phase {
        Phase::Intro => Phase::Ask,
        Phase::Ask => Phase::Answer,
        Phase::Answer => Phase::Feedback,
        Phase::Feedback => {
            if question_count >= max_questions {
                Phase::Summary
            } else {
                Phase::Ask
            }
        }
        Phase::Summary => Phase::Completed,
        Phase::Completed => Phase::Completed,
    }
}

/// Replay the machine from a fresh session through `completed_turns` turns.
///
/// Returns the phase and question count a session must be in after that many
/// completed user/assistant exchanges. Used to repair sessions whose stored
/// phase lags the transcript (e.g. a crash between message persistence and
/// the phase update).
pub fn phase_after_turns(completed_turns: u64, max_questions: u32) -> (Phase, u32) {
    let mut phase = Phase::Intro;
    let mut question_count = 0u32;

    for _ in 0..completed_turns {
        let next = next_phase(phase, question_count, max_questions);
        if phase == Phase::Feedback && next == Phase::Ask {
            question_count += 1;
        }
        phase = next;
        if phase.is_terminal() {
            break;
        }
    }

    (phase, question_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Phase; 6] = [
        Phase::Intro,
        Phase::Ask,
        Phase::Answer,
        Phase::Feedback,
        Phase::Summary,
        Phase::Completed,
    ];

    #[test]
    fn test_transition_table() {
        assert_eq!(next_phase(Phase::Intro, 0, 12), Phase::Ask);
        assert_eq!(next_phase(Phase::Ask, 0, 12), Phase::Answer);
        assert_eq!(next_phase(Phase::Answer, 0, 12), Phase::Feedback);
        assert_eq!(next_phase(Phase::Feedback, 0, 12), Phase::Ask);
        assert_eq!(next_phase(Phase::Summary, 0, 12), Phase::Completed);
    }

    #[test]
    fn test_feedback_ceiling() {
        for count in 0..12 {
            assert_eq!(next_phase(Phase::Feedback, count, 12), Phase::Ask);
        }
        for count in 12..20 {
            assert_eq!(next_phase(Phase::Feedback, count, 12), Phase::Summary);
        }
    }

    #[test]
    fn test_ceiling_is_configurable() {
        assert_eq!(next_phase(Phase::Feedback, 2, 3), Phase::Ask);
        assert_eq!(next_phase(Phase::Feedback, 3, 3), Phase::Summary);
    }

    #[test]
    fn test_completed_is_fixed_point() {
        for count in [0, 1, 11, 12, 100] {
            assert_eq!(next_phase(Phase::Completed, count, 12), Phase::Completed);
        }
    }

    #[test]
    fn test_advance_stays_within_known_states() {
        for phase in ALL {
            for count in 0..20 {
                let next = next_phase(phase, count, 12);
                assert!(ALL.contains(&next));
            }
        }
    }

    #[test]
    fn test_parse_round_trip() {
        for phase in ALL {
            assert_eq!(Phase::parse(phase.as_str()), Some(phase));
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(Phase::parse("DONE"), None);
        assert_eq!(Phase::parse("intro"), None);
        assert_eq!(Phase::parse(""), None);
    }

    #[test]
    fn test_replay_matches_iteration() {
        let mut phase = Phase::Intro;
        let mut count = 0u32;

        for turns in 0..60u64 {
            assert_eq!(phase_after_turns(turns, 12), (phase, count));
            let next = next_phase(phase, count, 12);
            if phase == Phase::Feedback && next == Phase::Ask {
                count += 1;
            }
            phase = next;
        }
    }

    #[test]
    fn test_replay_reaches_completed() {
        let (phase, count) = phase_after_turns(10_000, 12);
        assert_eq!(phase, Phase::Completed);
        assert_eq!(count, 12);
    }
}
