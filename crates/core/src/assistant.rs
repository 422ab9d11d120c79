//! Course assistant: keyword intent detection and canned replies.
//!
//! There is no model behind this; replies are chosen from templates and
//! filled with whatever course context the caller has.

use serde::{Deserialize, Serialize};

/// Maximum accepted question length, in characters.
pub const MAX_QUESTION_CHARS: usize = 1_000;

/// What the student appears to be asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Payment,
    Progress,
    Certificate,
    Refund,
    Telegram,
    Fallback,
}

/// Keywords per intent, checked in order; the first match wins.
const KEYWORDS: &[(Intent, &[&str])] = &[
    (Intent::Refund, &["refund", "money back", "cancel"]),
    (
        Intent::Payment,
        &["pay", "price", "buy", "enroll", "chapa", "stripe", "checkout"],
    ),
    (Intent::Telegram, &["telegram", "channel", "group", "invite"]),
    (Intent::Certificate, &["certificate", "certification"]),
    (
        Intent::Progress,
        &["progress", "next lesson", "continue", "where was i", "complete"],
    ),
    (Intent::Greeting, &["hello", "hi ", "hey", "selam"]),
];

/// Context the assistant may reference in its reply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantContext {
    pub course_title: Option<String>,
    pub progress_percent: Option<f64>,
    pub next_lesson_title: Option<String>,
    pub is_enrolled: bool,
}

/// Assistant answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantReply {
    pub intent: Intent,
    pub message: String,
}

/// Detect the intent of a free-text question.
pub fn detect_intent(question: &str) -> Intent {
    // Pad so word-ish keywords like "hi " also match at the end.
    let text = format!("{} ", question.to_lowercase());
    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| text.contains(w)))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::Fallback)
}

/// Produce a reply for `question` using `ctx`.
pub fn reply(question: &str, ctx: &AssistantContext) -> AssistantReply {
    let intent = detect_intent(question);
    let course = ctx.course_title.as_deref().unwrap_or("this course");

    let message = match intent {
        Intent::Greeting => format!(
            "Hello! I can help with payments, your progress, and the Telegram channel for {course}."
        ),
        Intent::Payment if ctx.is_enrolled => {
            format!("You are already enrolled in {course}, no further payment is needed.")
        }
        Intent::Payment => format!(
            "You can enroll in {course} from its page. Pay in ETB through Chapa or in USD through Stripe; \
             access opens as soon as the payment is confirmed."
        ),
        Intent::Progress => match (ctx.progress_percent, ctx.next_lesson_title.as_deref()) {
            (Some(pct), Some(next)) => {
                format!("You have completed {pct:.1}% of {course}. Up next: {next}.")
            }
            (Some(pct), None) => format!("You have completed {pct:.1}% of {course}. Well done!"),
            _ => format!("Enroll in {course} to start tracking your progress."),
        },
        Intent::Certificate => format!(
            "A certificate for {course} becomes available once every lesson is completed."
        ),
        Intent::Refund => {
            "Refund requests are handled by our managers. Please contact support with your order reference."
                .to_string()
        }
        Intent::Telegram if ctx.is_enrolled => format!(
            "Create a Telegram link code in your profile and send it to our bot with /link, then /join to get your invite to the {course} channel."
        ),
        Intent::Telegram => format!(
            "The Telegram channel for {course} is available to enrolled students only."
        ),
        Intent::Fallback => format!(
            "I am not sure about that yet. Try asking your instructor in the lesson Q&A for {course}."
        ),
    };

    AssistantReply { intent, message }
}
