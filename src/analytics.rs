use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::models::{DailyTrend, EmotionLabel, EmotionRecord, EmotionShare, WeeklyReport};

pub const WINDOW_DAYS: i64 = 7;
pub const TOP_EMOTION_LIMIT: usize = 5;

pub fn window_start(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - Duration::days(days.max(1))
}

/// Records with `start <= timestamp <= end`, in input order.
pub fn records_in_window(
    records: &[EmotionRecord],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<&EmotionRecord> {
    records
        .iter()
        .filter(|record| record.timestamp >= start && record.timestamp <= end)
        .collect()
}

/// Weekly summary over the trailing seven days ending at `now`, or `None`
/// when no record falls inside the window.
pub fn weekly_report(records: &[EmotionRecord], now: DateTime<Utc>) -> Option<WeeklyReport> {
    let start = window_start(now, WINDOW_DAYS);
    let window = records_in_window(records, start, now);
    if window.is_empty() {
        return None;
    }

    let mean = mean_mood(&window);
    let counts = emotion_counts(&window);
    let top_emotions: Vec<EmotionLabel> = counts
        .iter()
        .take(TOP_EMOTION_LIMIT)
        .map(|(label, _)| *label)
        .collect();

    Some(WeeklyReport {
        window_start: start,
        window_end: now,
        entry_count: window.len(),
        average_mood_score: round_one_decimal(mean),
        insights: insights(mean, window.len(), &top_emotions),
        recommendations: recommendations(mean, &top_emotions),
        distribution: shares(&counts),
        daily_trends: daily_trends(&window),
        top_emotions,
    })
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Unrounded mean mood; thresholds are applied to this value.
fn mean_mood(records: &[&EmotionRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let total: u32 = records.iter().map(|record| u32::from(record.mood_score)).sum();
    f64::from(total) / records.len() as f64
}


/// Label occurrences across `records`, most frequent first. Equal counts keep
/// the order in which labels were first seen.
pub fn emotion_counts(records: &[&EmotionRecord]) -> Vec<(EmotionLabel, usize)> {
    let mut positions: HashMap<EmotionLabel, usize> = HashMap::new();
    let mut counts: Vec<(EmotionLabel, usize)> = Vec::new();

    for record in records {
        for label in &record.emotions {
            let index = *positions.entry(*label).or_insert_with(|| {
                counts.push((*label, 0));
                counts.len() - 1
            });
            counts[index].1 += 1;
        }
    }

    // Stable sort keeps first-seen order among ties.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

pub fn shares(counts: &[(EmotionLabel, usize)]) -> Vec<EmotionShare> {
    let total: usize = counts.iter().map(|(_, count)| count).sum();
    counts
        .iter()
        .map(|(emotion, count)| EmotionShare {
            emotion: *emotion,
            count: *count,
            percentage: if total == 0 {
                0
            } else {
                (*count as f64 / total as f64 * 100.0).round() as u32
            },
        })
        .collect()
}

pub fn distribution(records: &[&EmotionRecord]) -> Vec<EmotionShare> {
    shares(&emotion_counts(records))
}

/// One bucket per calendar day, oldest first.
pub fn daily_trends(records: &[&EmotionRecord]) -> Vec<DailyTrend> {
    let mut buckets: BTreeMap<NaiveDate, (usize, u32)> = BTreeMap::new();
    for record in records {
        let entry = buckets.entry(record.source_date).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += u32::from(record.mood_score);
    }

    buckets
        .into_iter()
        .map(|(date, (entry_count, total))| DailyTrend {
            date,
            entry_count,
            average_mood_score: round_one_decimal(f64::from(total) / entry_count as f64),
        })
        .collect()
}

pub fn insights(
    average_mood: f64,
    entry_count: usize,
    top_emotions: &[EmotionLabel],
) -> Vec<String> {
    let mut insights = Vec::new();

    if average_mood >= 7.0 {
        insights.push(
            "You've had a particularly positive week! Your mood scores are above average."
                .to_string(),
        );
    }
    if average_mood <= 4.0 {
        insights.push(
            "This week seems to have been challenging. Consider reaching out for support."
                .to_string(),
        );
    }

    if entry_count >= 5 {
        insights.push("Great job maintaining a consistent journaling habit this week!".to_string());
    }
    if entry_count <= 2 {
        insights.push(
            "Try to journal more regularly to better track your emotional patterns.".to_string(),
        );
    }

    if top_emotions.contains(&EmotionLabel::Anxious) {
        insights.push(
            "You've experienced some anxiety this week. Consider practicing relaxation techniques."
                .to_string(),
        );
    }
    if top_emotions.contains(&EmotionLabel::Grateful) || top_emotions.contains(&EmotionLabel::Happy)
    {
        insights.push(
            "You've shown gratitude and happiness this week - that's wonderful for mental health!"
                .to_string(),
        );
    }

    insights
}

pub fn recommendations(average_mood: f64, top_emotions: &[EmotionLabel]) -> Vec<String> {
    let mut recommendations: Vec<&str> = Vec::new();

    if average_mood < 5.0 {
        recommendations.extend([
            "Consider speaking with a mental health professional",
            "Try incorporating daily meditation or mindfulness practices",
            "Engage in physical activities like walking or yoga",
        ]);
    }
    if top_emotions.contains(&EmotionLabel::Lonely) {
        recommendations.extend([
            "Reach out to friends or family members",
            "Consider joining community groups or activities",
        ]);
    }
    if top_emotions.contains(&EmotionLabel::Anxious) {
        recommendations.extend([
            "Practice deep breathing exercises",
            "Try progressive muscle relaxation",
            "Limit caffeine intake",
        ]);
    }

    recommendations.extend([
        "Continue regular journaling to track your progress",
        "Maintain a consistent sleep schedule",
        "Practice gratitude by writing down 3 things you're thankful for daily",
    ]);

    recommendations.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::models::EmotionLabel::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn record(hours_ago: i64, mood_score: u8, emotions: &[EmotionLabel]) -> EmotionRecord {
        EmotionRecord::new(
            "user-1",
            emotions.to_vec(),
            mood_score,
            now() - Duration::hours(hours_ago),
        )
    }

    #[test]
    fn empty_input_has_no_report() {
        assert!(weekly_report(&[], now()).is_none());
    }

    #[test]
    fn records_outside_the_window_have_no_report() {
        let old = record(24 * 8, 6, &[Happy]);
        assert!(weekly_report(&[old], now()).is_none());
    }

    #[test]
    fn window_boundary_is_inclusive_to_the_millisecond() {
        let start = now() - Duration::days(7);
        let on_edge = EmotionRecord::new("user-1", vec![Sad], 3, start);
        let just_before =
            EmotionRecord::new("user-1", vec![Happy], 9, start - Duration::milliseconds(1));

        let report = weekly_report(&[on_edge, just_before], now()).unwrap();
        assert_eq!(report.entry_count, 1);
        assert_eq!(report.top_emotions, vec![Sad]);
        assert_eq!(report.window_start, start);
        assert_eq!(report.window_end, now());
    }

    #[test]
    fn future_records_are_excluded() {
        let ahead = EmotionRecord::new("user-1", vec![Happy], 9, now() + Duration::minutes(5));
        assert!(weekly_report(&[ahead], now()).is_none());
    }

    #[test]
    fn positive_consistent_week() {
        let records: Vec<EmotionRecord> = [8, 8, 7, 9, 8, 8]
            .iter()
            .enumerate()
            .map(|(i, mood)| record(i as i64 * 20 + 1, *mood, &[Grateful, Peaceful]))
            .collect();

        let report = weekly_report(&records, now()).unwrap();
        assert_eq!(report.entry_count, 6);
        assert_eq!(report.average_mood_score, 8.0);
        assert_eq!(report.top_emotions[0], Grateful);
        assert!(report
            .insights
            .iter()
            .any(|i| i.starts_with("You've had a particularly positive week")));
        assert!(report
            .insights
            .iter()
            .any(|i| i.starts_with("Great job maintaining a consistent journaling habit")));
        assert!(report.insights.iter().any(|i| i.contains("gratitude and happiness")));
        assert_eq!(report.recommendations.len(), 3);
    }

    #[test]
    fn average_is_rounded_to_one_decimal() {
        let records = vec![
            record(1, 7, &[Content]),
            record(2, 8, &[Content]),
            record(3, 8, &[Content]),
        ];
        let report = weekly_report(&records, now()).unwrap();
        assert_eq!(report.average_mood_score, 7.7);
    }

    #[test]
    fn thresholds_use_the_unrounded_mean() {
        let mut records: Vec<EmotionRecord> =
            (0..24).map(|i| record(i + 1, 5, &[Content])).collect();
        records.push(record(30, 4, &[Content]));

        let report = weekly_report(&records, now()).unwrap();
        assert_eq!(report.average_mood_score, 5.0);
        assert_eq!(
            report.recommendations.first().map(String::as_str),
            Some("Consider speaking with a mental health professional")
        );

        let mut records: Vec<EmotionRecord> =
            (0..24).map(|i| record(i + 1, 7, &[Content])).collect();
        records.push(record(30, 6, &[Content]));
        let report = weekly_report(&records, now()).unwrap();
        assert_eq!(report.average_mood_score, 7.0);
        assert!(!report.insights.iter().any(|i| i.contains("particularly positive week")));
    }

    #[test]
    fn top_emotions_break_ties_by_first_seen() {
        let records = vec![
            record(1, 5, &[Confused, Lonely]),
            record(2, 5, &[Hopeful, Lonely]),
            record(3, 5, &[Proud, Excited, Angry]),
            record(4, 5, &[Frustrated]),
        ];
        let report = weekly_report(&records, now()).unwrap();
        assert_eq!(
            report.top_emotions,
            vec![Lonely, Confused, Hopeful, Proud, Excited]
        );
        assert_eq!(report.distribution.len(), 7);
        assert_eq!(report.distribution[0].count, 2);
        assert_eq!(report.distribution[0].percentage, 25);
    }

    #[test]
    fn challenging_sparse_week() {
        let records = vec![record(3, 3, &[Anxious, Lonely]), record(30, 4, &[Sad])];
        let report = weekly_report(&records, now()).unwrap();
        assert_eq!(report.average_mood_score, 3.5);
        assert_eq!(
            report.insights,
            vec![
                "This week seems to have been challenging. Consider reaching out for support."
                    .to_string(),
                "Try to journal more regularly to better track your emotional patterns."
                    .to_string(),
                "You've experienced some anxiety this week. Consider practicing relaxation techniques."
                    .to_string(),
            ]
        );
        assert_eq!(report.recommendations.len(), 3 + 2 + 3 + 3);
        assert_eq!(
            report.recommendations.first().map(String::as_str),
            Some("Consider speaking with a mental health professional")
        );
        assert_eq!(
            report.recommendations.last().map(String::as_str),
            Some("Practice gratitude by writing down 3 things you're thankful for daily")
        );
    }

    #[test]
    fn middling_week_only_gets_standing_recommendations() {
        let records = vec![
            record(1, 5, &[Neutral]),
            record(2, 6, &[Content]),
            record(3, 6, &[Content]),
        ];
        let report = weekly_report(&records, now()).unwrap();
        assert!(report.insights.is_empty());
        assert_eq!(
            report.recommendations,
            vec![
                "Continue regular journaling to track your progress".to_string(),
                "Maintain a consistent sleep schedule".to_string(),
                "Practice gratitude by writing down 3 things you're thankful for daily".to_string(),
            ]
        );
    }

    #[test]
    fn daily_trends_bucket_by_source_date() {
        let records = vec![
            record(1, 8, &[Happy]),
            record(2, 6, &[Happy]),
            record(30, 3, &[Sad]),
        ];
        let refs: Vec<&EmotionRecord> = records.iter().collect();
        let trends = daily_trends(&refs);
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].date, NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        assert_eq!(trends[0].entry_count, 1);
        assert_eq!(trends[1].entry_count, 2);
        assert_eq!(trends[1].average_mood_score, 7.0);
    }

    #[test]
    fn window_start_respects_days() {
        assert_eq!(window_start(now(), 14), now() - Duration::days(14));
        assert_eq!(window_start(now(), 0), now() - Duration::days(1));
    }

    #[test]
    fn reports_are_deterministic() {
        let records = vec![record(5, 6, &[Hopeful, Anxious]), record(9, 2, &[Overwhelmed])];
        assert_eq!(weekly_report(&records, now()), weekly_report(&records, now()));
    }
}
