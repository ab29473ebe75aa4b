use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Happy,
    Sad,
    Angry,
    Anxious,
    Grateful,
    Peaceful,
    Confused,
    Hopeful,
    Frustrated,
    Excited,
    Lonely,
    Content,
    Overwhelmed,
    Proud,
    Disappointed,
    Neutral,
}

impl EmotionLabel {
    /// Every label in declared category order. `Neutral` is last and carries
    /// no keywords of its own.
    pub const ALL: [EmotionLabel; 16] = [
        EmotionLabel::Happy,
        EmotionLabel::Sad,
        EmotionLabel::Angry,
        EmotionLabel::Anxious,
        EmotionLabel::Grateful,
        EmotionLabel::Peaceful,
        EmotionLabel::Confused,
        EmotionLabel::Hopeful,
        EmotionLabel::Frustrated,
        EmotionLabel::Excited,
        EmotionLabel::Lonely,
        EmotionLabel::Content,
        EmotionLabel::Overwhelmed,
        EmotionLabel::Proud,
        EmotionLabel::Disappointed,
        EmotionLabel::Neutral,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EmotionLabel::Happy => "happy",
            EmotionLabel::Sad => "sad",
            EmotionLabel::Angry => "angry",
            EmotionLabel::Anxious => "anxious",
            EmotionLabel::Grateful => "grateful",
            EmotionLabel::Peaceful => "peaceful",
            EmotionLabel::Confused => "confused",
            EmotionLabel::Hopeful => "hopeful",
            EmotionLabel::Frustrated => "frustrated",
            EmotionLabel::Excited => "excited",
            EmotionLabel::Lonely => "lonely",
            EmotionLabel::Content => "content",
            EmotionLabel::Overwhelmed => "overwhelmed",
            EmotionLabel::Proud => "proud",
            EmotionLabel::Disappointed => "disappointed",
            EmotionLabel::Neutral => "neutral",
        }
    }

    /// Parses a label coming from outside the process (remote tiers, storage,
    /// CSV). Accepts the English names case-insensitively and the Urdu
    /// category names used by the webhook's own lexicon.
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim().to_lowercase();
        let label = match value.as_str() {
            "happy" | "خوش" => EmotionLabel::Happy,
            "sad" | "غمگین" => EmotionLabel::Sad,
            "angry" | "غصہ" => EmotionLabel::Angry,
            "anxious" | "پریشان" => EmotionLabel::Anxious,
            "grateful" | "شکرگزار" => EmotionLabel::Grateful,
            "peaceful" | "پرسکون" => EmotionLabel::Peaceful,
            "confused" | "الجھن" => EmotionLabel::Confused,
            "hopeful" | "امیدوار" => EmotionLabel::Hopeful,
            "frustrated" => EmotionLabel::Frustrated,
            "excited" => EmotionLabel::Excited,
            "lonely" => EmotionLabel::Lonely,
            "content" => EmotionLabel::Content,
            "overwhelmed" => EmotionLabel::Overwhelmed,
            "proud" => EmotionLabel::Proud,
            "disappointed" => EmotionLabel::Disappointed,
            "neutral" => EmotionLabel::Neutral,
            _ => return None,
        };
        Some(label)
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a list of raw labels into a non-empty, duplicate-free set.
/// Unknown entries are dropped; returns `None` when nothing usable remains.
pub fn parse_labels<I, S>(raw: I) -> Option<Vec<EmotionLabel>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut labels = Vec::new();
    for value in raw {
        if let Some(label) = EmotionLabel::parse(value.as_ref()) {
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
    }
    if labels.is_empty() {
        None
    } else {
        Some(labels)
    }
}

pub fn neutral() -> Vec<EmotionLabel> {
    vec![EmotionLabel::Neutral]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Urdu,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionAnalysis {
    pub emotions: Vec<EmotionLabel>,
    pub mood_score: u8,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionRecord {
    pub id: Uuid,
    pub subject_id: String,
    pub emotions: Vec<EmotionLabel>,
    pub mood_score: u8,
    pub timestamp: DateTime<Utc>,
    pub source_date: NaiveDate,
}

impl EmotionRecord {
    pub fn new(
        subject_id: impl Into<String>,
        emotions: Vec<EmotionLabel>,
        mood_score: u8,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let emotions = if emotions.is_empty() { neutral() } else { emotions };
        Self {
            id: Uuid::new_v4(),
            subject_id: subject_id.into(),
            emotions,
            mood_score: mood_score.clamp(1, 10),
            timestamp,
            source_date: timestamp.date_naive(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JournalEntry {
    pub subject_id: String,
    pub title: String,
    pub content: String,
    pub analysis: EmotionAnalysis,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionShare {
    pub emotion: EmotionLabel,
    pub count: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTrend {
    pub date: NaiveDate,
    pub entry_count: usize,
    pub average_mood_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub entry_count: usize,
    pub average_mood_score: f64,
    pub top_emotions: Vec<EmotionLabel>,
    pub distribution: Vec<EmotionShare>,
    pub daily_trends: Vec<DailyTrend>,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_accepts_english_and_urdu_names() {
        assert_eq!(EmotionLabel::parse(" Happy "), Some(EmotionLabel::Happy));
        assert_eq!(EmotionLabel::parse("پریشان"), Some(EmotionLabel::Anxious));
        assert_eq!(EmotionLabel::parse("stressed"), None);
    }

    #[test]
    fn parse_labels_dedupes_and_drops_unknown() {
        let labels = parse_labels(["sad", "SAD", "melancholic", "lonely"]);
        assert_eq!(labels, Some(vec![EmotionLabel::Sad, EmotionLabel::Lonely]));
        assert_eq!(parse_labels(["nope"]), None);
        assert_eq!(parse_labels(Vec::<String>::new()), None);
    }

    #[test]
    fn record_derives_source_date_and_guards_invariants() {
        let timestamp = Utc.with_ymd_and_hms(2026, 3, 4, 23, 59, 0).unwrap();
        let record = EmotionRecord::new("subject-1", Vec::new(), 14, timestamp);
        assert_eq!(record.emotions, vec![EmotionLabel::Neutral]);
        assert_eq!(record.mood_score, 10);
        assert_eq!(record.source_date, NaiveDate::from_ymd_opt(2026, 3, 4).unwrap());
    }

    #[test]
    fn analysis_serializes_in_camel_case() {
        let analysis = EmotionAnalysis {
            emotions: vec![EmotionLabel::Grateful],
            mood_score: 7,
            insights: vec![],
            recommendations: vec![],
            risk_level: RiskLevel::Medium,
        };
        let value = serde_json::to_value(&analysis).unwrap();
        assert_eq!(value["moodScore"], 7);
        assert_eq!(value["riskLevel"], "medium");
        assert_eq!(value["emotions"][0], "grateful");
    }
}
