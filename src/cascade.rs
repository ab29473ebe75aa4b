use std::future::{Future, Pending};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};

use crate::lexicon;
use crate::models::{parse_labels, EmotionAnalysis, EmotionLabel, RiskLevel};
use crate::mood;
use crate::remote::{
    AnalysisRequest, CompletionRequest, FailureReason, StructuredAnalysis, TextCompletion,
};

pub const LOCAL_INSIGHT: &str = "Analysis completed locally";
pub const LOCAL_RECOMMENDATION: &str = "Continue journaling regularly";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Primary,
    Secondary,
    Fallback,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Primary => "primary",
            Tier::Secondary => "secondary",
            Tier::Fallback => "fallback",
        }
    }
}

/// A cascade answer and the tier that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub tier: Tier,
}

/// `AttemptPrimary -> AttemptSecondary -> Fallback -> Done`. No tier is retried.
enum Stage<T> {
    AttemptPrimary,
    AttemptSecondary,
    Fallback,
    Done(Resolved<T>),
}

/// Placeholder for a cascade that has no tier in a given slot.
pub type NoTier<T> = Pending<Result<T, FailureReason>>;

fn settle<T>(
    cascade: &'static str,
    tier: Tier,
    outcome: Result<T, FailureReason>,
    next: Stage<T>,
) -> Stage<T> {
    match outcome {
        Ok(value) => {
            debug!(cascade, tier = tier.as_str(), "cascade resolved");
            Stage::Done(Resolved { value, tier })
        }
        Err(reason) => {
            warn!(cascade, tier = tier.as_str(), %reason, "cascade tier failed, falling through");
            next
        }
    }
}

/// Drives the state machine. Tier futures are lazy, so a tier that is never
/// reached never touches the network. `None` skips a slot.
pub async fn resolve<T, P, S, F>(
    cascade: &'static str,
    primary: Option<P>,
    secondary: Option<S>,
    fallback: F,
) -> Resolved<T>
where
    P: Future<Output = Result<T, FailureReason>>,
    S: Future<Output = Result<T, FailureReason>>,
    F: FnOnce() -> T,
{
    let mut primary = primary;
    let mut secondary = secondary;
    let mut stage = Stage::AttemptPrimary;

    loop {
        stage = match stage {
            Stage::AttemptPrimary => match primary.take() {
                Some(attempt) => settle(
                    cascade,
                    Tier::Primary,
                    attempt.await,
                    Stage::AttemptSecondary,
                ),
                None => Stage::AttemptSecondary,
            },
            Stage::AttemptSecondary => match secondary.take() {
                Some(attempt) => {
                    settle(cascade, Tier::Secondary, attempt.await, Stage::Fallback)
                }
                None => Stage::Fallback,
            },
            Stage::Fallback => {
                debug!(cascade, tier = Tier::Fallback.as_str(), "cascade resolved locally");
                break Resolved {
                    value: fallback(),
                    tier: Tier::Fallback,
                };
            }
            Stage::Done(resolved) => break resolved,
        };
    }
}

/// The analysis produced when no remote tier answers.
pub fn local_analysis(text: &str) -> EmotionAnalysis {
    EmotionAnalysis {
        emotions: lexicon::detect(text),
        mood_score: mood::score(text),
        insights: vec![LOCAL_INSIGHT.to_string()],
        recommendations: vec![LOCAL_RECOMMENDATION.to_string()],
        risk_level: RiskLevel::Low,
    }
}

pub fn emotion_prompt(text: &str) -> String {
    let categories = lexicon::categories()
        .iter()
        .map(|label| label.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Analyze the emotional content of this text and return only a JSON array of emotions detected. \
         Use these emotion categories: {categories}.\n\n\
         Text to analyze: \"{text}\"\n\n\
         Return only a JSON array like: [\"happy\", \"grateful\"] or [\"sad\", \"anxious\"]"
    )
}

/// Reads a completion as a JSON array of emotion names.
pub fn parse_emotion_array(raw: &str) -> Result<Vec<EmotionLabel>, FailureReason> {
    let value: serde_json::Value = serde_json::from_str(raw.trim())
        .map_err(|error| FailureReason::Malformed(error.to_string()))?;
    let items = value
        .as_array()
        .ok_or_else(|| FailureReason::Unusable("completion is not a JSON array".to_string()))?;

    parse_labels(items.iter().filter_map(serde_json::Value::as_str)).ok_or_else(|| {
        FailureReason::Unusable(format!("no known emotion among {} entries", items.len()))
    })
}

async fn classify<C: TextCompletion>(
    classifier: &C,
    request: &CompletionRequest,
) -> Result<Vec<EmotionLabel>, FailureReason> {
    let raw = classifier.complete(request).await?;
    parse_emotion_array(&raw)
}

pub struct Cascade<W, C> {
    webhook: W,
    classifier: C,
    secondary_classifier: Option<C>,
}

impl<W, C> Cascade<W, C>
where
    W: StructuredAnalysis,
    C: TextCompletion,
{
    pub fn new(webhook: W, classifier: C) -> Self {
        Self {
            webhook,
            classifier,
            secondary_classifier: None,
        }
    }

    pub fn with_secondary_classifier(mut self, classifier: C) -> Self {
        self.secondary_classifier = Some(classifier);
        self
    }

    /// Full journal analysis: the webhook first, local analysis otherwise.
    /// Blank text never leaves the process.
    pub async fn analyze(
        &self,
        subject_id: &str,
        text: &str,
        title: Option<&str>,
    ) -> Resolved<EmotionAnalysis> {
        let request = AnalysisRequest {
            subject_id: subject_id.to_string(),
            journal_text: text.to_string(),
            title: title.unwrap_or_default().to_string(),
            timestamp: Utc::now(),
            language: lexicon::detect_language(text),
        };
        debug!(
            subject_id,
            chars = text.chars().count(),
            language = ?request.language,
            "analyzing journal text"
        );

        let webhook = &self.webhook;
        let request = &request;
        let primary = if text.trim().is_empty() {
            None
        } else {
            Some(async move { webhook.analyze(request).await?.into_analysis() })
        };

        resolve("analyze", primary, None::<NoTier<EmotionAnalysis>>, || {
            local_analysis(text)
        })
        .await
    }

    /// Plain emotion tagging: completion models first, the lexicon otherwise.
    pub async fn tag(&self, text: &str) -> Resolved<Vec<EmotionLabel>> {
        let blank = text.trim().is_empty();
        let request = CompletionRequest::prompt(emotion_prompt(text));

        let primary = (!blank).then(|| classify(&self.classifier, &request));
        let secondary = self
            .secondary_classifier
            .as_ref()
            .filter(|_| !blank)
            .map(|classifier| classify(classifier, &request));

        resolve("tag", primary, secondary, || lexicon::detect(text)).await
    }
}
