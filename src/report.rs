use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::models::{DailyTrend, EmotionLabel, EmotionRecord, EmotionShare, WeeklyReport};

fn join_labels(labels: &[EmotionLabel]) -> String {
    labels
        .iter()
        .map(|label| label.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_distribution(output: &mut String, distribution: &[EmotionShare]) {
    if distribution.is_empty() {
        let _ = writeln!(output, "No emotions recorded for this window.");
        return;
    }
    for share in distribution {
        let _ = writeln!(
            output,
            "- {}: {} ({}%)",
            share.emotion, share.count, share.percentage
        );
    }
}

fn write_trends(output: &mut String, trends: &[DailyTrend]) {
    if trends.is_empty() {
        let _ = writeln!(output, "No entries recorded for this window.");
        return;
    }
    for trend in trends {
        let _ = writeln!(
            output,
            "- {}: {} entries, average mood {:.1}/10",
            trend.date, trend.entry_count, trend.average_mood_score
        );
    }
}

pub fn build_markdown(subject_id: &str, report: &WeeklyReport) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Socho Weekly Report");
    let _ = writeln!(
        output,
        "Generated for {} ({} to {})",
        subject_id,
        report.window_start.date_naive(),
        report.window_end.date_naive()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    let _ = writeln!(output, "- Journal entries: {}", report.entry_count);
    let _ = writeln!(
        output,
        "- Average mood: {:.1}/10",
        report.average_mood_score
    );
    let _ = writeln!(output, "- Top emotions: {}", join_labels(&report.top_emotions));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Emotion Mix");
    write_distribution(&mut output, &report.distribution);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Daily Mood");
    write_trends(&mut output, &report.daily_trends);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Insights");
    if report.insights.is_empty() {
        let _ = writeln!(output, "No particular patterns stood out this week.");
    } else {
        for insight in &report.insights {
            let _ = writeln!(output, "- {insight}");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recommendations");
    for recommendation in &report.recommendations {
        let _ = writeln!(output, "- {recommendation}");
    }

    output
}

/// Plain-text layout used for the downloadable weekly report.
pub fn build_text(report: &WeeklyReport) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "SOCHO WEEKLY MENTAL HEALTH REPORT");
    let _ = writeln!(
        output,
        "Week: {} - {}",
        report.window_start.date_naive(),
        report.window_end.date_naive()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "SUMMARY:");
    let _ = writeln!(output, "- Total Journal Entries: {}", report.entry_count);
    let _ = writeln!(output, "- Average Mood Score: {}/10", report.average_mood_score);
    let _ = writeln!(output, "- Top Emotions: {}", join_labels(&report.top_emotions));
    let _ = writeln!(output);
    let _ = writeln!(output, "INSIGHTS:");
    for insight in &report.insights {
        let _ = writeln!(output, "• {insight}");
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "RECOMMENDATIONS:");
    for recommendation in &report.recommendations {
        let _ = writeln!(output, "• {recommendation}");
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "Generated by Socho - Your Mental Health Companion");

    output
}

pub fn build_trends(
    subject_id: &str,
    since: DateTime<Utc>,
    records: &[&EmotionRecord],
    distribution: &[EmotionShare],
    trends: &[DailyTrend],
) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "Emotion trends for {} since {}",
        subject_id,
        since.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "Entries:");
    if records.is_empty() {
        let _ = writeln!(output, "No entries recorded for this window.");
    } else {
        for record in records {
            let _ = writeln!(
                output,
                "- {} mood {}/10: {}",
                record.timestamp.format("%Y-%m-%d %H:%M"),
                record.mood_score,
                join_labels(&record.emotions)
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "Emotion mix:");
    write_distribution(&mut output, distribution);

    let _ = writeln!(output);
    let _ = writeln!(output, "Daily mood:");
    write_trends(&mut output, trends);

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    use crate::analytics;
    use crate::models::EmotionLabel::*;

    fn sample_report() -> WeeklyReport {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let records = vec![
            EmotionRecord::new("user-1", vec![Anxious, Lonely], 3, now - Duration::hours(2)),
            EmotionRecord::new("user-1", vec![Anxious], 4, now - Duration::days(2)),
        ];
        analytics::weekly_report(&records, now).unwrap()
    }

    #[test]
    fn markdown_report_has_every_section() {
        let output = build_markdown("user-1", &sample_report());
        assert!(output.starts_with("# Socho Weekly Report\n"));
        assert!(output.contains("Generated for user-1 (2026-10-12 to 2026-10-19)"));
        assert!(output.contains("- Average mood: 3.5/10"));
        assert!(output.contains("- Top emotions: anxious, lonely"));
        assert!(output.contains("- anxious: 2 (67%)"));
        assert!(output.contains("- 2026-10-17: 1 entries, average mood 4.0/10"));
        assert!(output.contains("## Insights\n- This week seems to have been challenging."));
        assert!(output.contains("- Limit caffeine intake"));
    }

    #[test]
    fn text_report_matches_download_layout() {
        let output = build_text(&sample_report());
        assert!(output.starts_with("SOCHO WEEKLY MENTAL HEALTH REPORT\nWeek: 2026-10-12 - 2026-10-19\n"));
        assert!(output.contains("- Total Journal Entries: 2"));
        assert!(output.contains("- Average Mood Score: 3.5/10"));
        assert!(output.contains("INSIGHTS:\n• "));
        assert!(output.trim_end().ends_with("Generated by Socho - Your Mental Health Companion"));
    }

    #[test]
    fn trends_listing_handles_no_entries() {
        let since = Utc.with_ymd_and_hms(2026, 10, 12, 0, 0, 0).unwrap();
        let output = build_trends("user-1", since, &[], &[], &[]);
        assert!(output.contains("since 2026-10-12 00:00 UTC"));
        assert!(output.contains("Entries:\nNo entries recorded for this window."));
        assert!(output.contains("Emotion mix:\nNo emotions recorded for this window."));
    }
}
