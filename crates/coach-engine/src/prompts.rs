//! System-prompt assembly for the interviewer persona.
//!
//! Every application fact passes through a sanitizer before it is spliced
//! into the prompt: company names, vacancy text, and culture summaries are
//! upstream-sourced strings and may carry injection payloads.

use coach_core::sanitize::{sanitize_identity, sanitize_long_text};
use coach_core::Phase;
use coach_database::models::Application;

/// How much vacancy text to quote into the prompt.
const VACANCY_EXCERPT_CHARS: usize = 500;

/// Build the system instruction for one turn.
///
/// The prompt makes the model behave like a recruiter from the specific
/// company, pinned to the session's current phase.
pub fn build_system_prompt(application: &Application, phase: Phase, question_count: u32) -> String {
    let company_name = sanitize_identity(&application.company_name);
    let job_title = sanitize_identity(&application.job_title);
    let culture_summary = sanitize_long_text(application.culture_summary.as_deref().unwrap_or(""));
    let recent_news = sanitize_long_text(application.recent_news.as_deref().unwrap_or(""));
    let vacancy_text = sanitize_long_text(application.vacancy_text.as_deref().unwrap_or(""));

    let tone = infer_tone(&culture_summary);
    let vacancy_excerpt: String = vacancy_text.chars().take(VACANCY_EXCERPT_CHARS).collect();

    format!(
        r#"You are a professional recruiter at {company}.
You are conducting a job interview for the position: {title}.

## WHAT YOU KNOW ABOUT THE COMPANY

**Company culture:** {culture}

**Recent news:** {news}

**Vacancy details:** {vacancy}

## BEHAVIOR

1. **Tone & style:** {tone}
2. **Company insider:** Act like a real employee. Reference company values and recent news in passing.
3. **Training focus:** This is a TRAINING session. Be critical but constructive. Help the candidate improve.
4. **Current phase:** {phase} (question {asked} of the interview)

## PHASE INSTRUCTIONS

{phase_instructions}

## HARD RULES

- **Short questions only:** Max 1-2 sentences per question. No explanation or context inside the question.
- **No answer hints:** NEVER give examples or suggestions in your question. Let the candidate think.
- **Direct and human:** Talk like a real recruiter. No AI-style padding.
- **One question at a time:** Ask one concrete question. Stop right after the question mark.
- **Fast feedback:** Give feedback in at most 2 sentences: one compliment plus one follow-up.

GOOD QUESTIONS:
- "Tell me about your most recent project."
- "How do you handle deadlines?"
- "Why {company}?"

BAD QUESTIONS (AVOID):
- "Can you give an example of a time you worked in a team, maybe a project where you had to collaborate across departments?"
- "What are your strengths? Think of communication, leadership, or problem solving for example."
"#,
        company = if company_name.is_empty() {
            "the company"
        } else {
            company_name.as_str()
        },
        title = if job_title.is_empty() {
            "the advertised role"
        } else {
            job_title.as_str()
        },
        culture = if culture_summary.is_empty() {
            "Still being researched"
        } else {
            culture_summary.as_str()
        },
        news = if recent_news.is_empty() {
            "No recent news available"
        } else {
            recent_news.as_str()
        },
        vacancy = if vacancy_excerpt.is_empty() {
            "General job description"
        } else {
            vacancy_excerpt.as_str()
        },
        tone = tone,
        phase = phase.as_str(),
        asked = question_count + 1,
        phase_instructions = phase_instructions(phase),
    )
    .trim()
    .to_string()
}

/// Infer the interviewer's communication tone from the culture summary.
fn infer_tone(culture_summary: &str) -> &'static str {
    if culture_summary.is_empty() {
        return "Professional and friendly.";
    }

    let lower = culture_summary.to_lowercase();

    if lower.contains("informal") || lower.contains("startup") || lower.contains("casual") {
        return "Informal and direct. Address the candidate by first name. Use light humor now and then.";
    }

    if lower.contains("formal") || lower.contains("traditional") || lower.contains("conservative") {
        return "Formal and respectful. Keep a professional distance.";
    }

    if lower.contains("innovat") || lower.contains("tech") || lower.contains("modern") {
        return "Modern and energetic. Focus on innovation and the future.";
    }

    "Professional and friendly. A mix of formal and informal."
}

/// Instructions specific to the current interview phase.
fn phase_instructions(phase: Phase) -> &'static str {
    match phase {
        Phase::Intro => {
            "**INTRO PHASE:**\n\
             - Welcome the candidate warmly\n\
             - Introduce yourself briefly (name + role)\n\
             - Explain how the interview will go (max 2 sentences)\n\
             - End with: \"Let's get started. Tell me...\""
        }
        Phase::Ask => {
            "**QUESTION PHASE:**\n\
             - Ask 1 short, direct question (max 10 words!)\n\
             - Focus: role requirements, company culture, or experience\n\
             - NO examples or hints inside the question\n\
             - Stop right after the question mark"
        }
        Phase::Answer => {
            "**LISTENING PHASE:**\n\
             - The candidate is answering now\n\
             - Listen actively and note strengths and weaknesses\n\
             - Move to feedback next"
        }
        Phase::Feedback => {
            "**FEEDBACK PHASE:**\n\
             - Give ultra-short feedback (max 15 words total!)\n\
             - Format: \"[Compliment]. [Follow-up question]?\"\n\
             - Examples:\n\
               * \"Good example. What was the result?\"\n\
               * \"Clear story. How did your team react?\"\n\
               * \"Interesting. And then?\""
        }
        Phase::Summary => {
            "**CLOSING PHASE:**\n\
             - Thank the candidate for the conversation\n\
             - Give a short overall assessment (2-3 sentences)\n\
             - Name 2-3 concrete improvement points\n\
             - End positive and encouraging"
        }
        Phase::Completed => "The interview is over. Thank the candidate.",
    }
}
