use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::cascade;
use crate::models::{neutral, parse_labels, EmotionLabel, EmotionRecord, JournalEntry};

/// Pool that opens its first connection when a query needs one and is reused
/// for the life of the process.
pub fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(std::time::Duration::from_secs(10))
        .connect_lazy(database_url)
        .context("invalid DATABASE_URL")
}

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn ping(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .context("failed to reach Postgres")?;
    Ok(())
}

fn labels_to_text(labels: &[EmotionLabel]) -> Vec<String> {
    labels.iter().map(|label| label.as_str().to_string()).collect()
}

fn labels_from_text(raw: &[String]) -> Vec<EmotionLabel> {
    parse_labels(raw).unwrap_or_else(neutral)
}

fn mood_from_db(raw: i16) -> u8 {
    raw.clamp(1, 10) as u8
}

/// Appends one record. Returns `false` when `source_key` was already imported.
pub async fn insert_record(
    pool: &PgPool,
    record: &EmotionRecord,
    source_key: Option<&str>,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO socho.emotion_records
        (id, subject_id, emotions, mood_score, recorded_at, source_date, source_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (source_key) DO NOTHING
        "#,
    )
    .bind(record.id)
    .bind(&record.subject_id)
    .bind(labels_to_text(&record.emotions))
    .bind(i16::from(record.mood_score))
    .bind(record.timestamp)
    .bind(record.source_date)
    .bind(source_key)
    .execute(pool)
    .await
    .context("failed to insert emotion record")?;

    Ok(result.rows_affected() > 0)
}

pub async fn insert_journal_entry(pool: &PgPool, entry: &JournalEntry) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO socho.journal_entries
        (id, subject_id, title, content, emotions, mood_score, insights, recommendations, risk_level, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(id)
    .bind(&entry.subject_id)
    .bind(&entry.title)
    .bind(&entry.content)
    .bind(labels_to_text(&entry.analysis.emotions))
    .bind(i16::from(entry.analysis.mood_score))
    .bind(&entry.analysis.insights)
    .bind(&entry.analysis.recommendations)
    .bind(entry.analysis.risk_level.as_str())
    .bind(entry.created_at)
    .execute(pool)
    .await
    .context("failed to insert journal entry")?;

    Ok(id)
}

/// Records for `subject_id` at or after `since`, oldest first.
pub async fn fetch_records(
    pool: &PgPool,
    subject_id: &str,
    since: DateTime<Utc>,
) -> anyhow::Result<Vec<EmotionRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT id, subject_id, emotions, mood_score, recorded_at, source_date
        FROM socho.emotion_records
        WHERE subject_id = $1 AND recorded_at >= $2
        ORDER BY recorded_at ASC
        "#,
    )
    .bind(subject_id)
    .bind(since)
    .fetch_all(pool)
    .await
    .context("failed to query emotion records")?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let emotions: Vec<String> = row.get("emotions");
        records.push(EmotionRecord {
            id: row.get("id"),
            subject_id: row.get("subject_id"),
            emotions: labels_from_text(&emotions),
            mood_score: mood_from_db(row.get("mood_score")),
            timestamp: row.get("recorded_at"),
            source_date: row.get("source_date"),
        });
    }

    debug!(subject_id, count = records.len(), "fetched emotion records");
    Ok(records)
}

const SEED_ENTRIES: &[(i64, &str, &str)] = &[
    (
        150,
        "Naya semester",
        "Classes started today. A bit nervous about the workload but hopeful and motivated.",
    ),
    (
        120,
        "Ammi ki call",
        "Talked to Ammi for an hour, feeling grateful and calm. Dil khush ho gaya.",
    ),
    (
        96,
        "Deadline",
        "Too much work this week, stressed out and behind on everything. Terrible sleep.",
    ),
    (
        70,
        "Hostel",
        "Everyone went home for the weekend and I feel lonely here by myself.",
    ),
    (
        44,
        "Presentation",
        "The presentation went great! Proud that I managed it, sab theek ho gaya.",
    ),
    (
        20,
        "شام",
        "آج دن اچھا تھا، میں خوش ہوں اور پرسکون ہوں",
    ),
];

/// Inserts a week of locally analysed journal entries for `subject_id`.
/// Re-running is a no-op.
pub async fn seed(pool: &PgPool, subject_id: &str, now: DateTime<Utc>) -> anyhow::Result<usize> {
    let mut inserted = 0usize;

    for (index, (hours_ago, title, content)) in SEED_ENTRIES.iter().enumerate() {
        let created_at = now - Duration::hours(*hours_ago);
        let analysis = cascade::local_analysis(content);
        let record = EmotionRecord::new(
            subject_id,
            analysis.emotions.clone(),
            analysis.mood_score,
            created_at,
        );
        let source_key = format!("seed-{subject_id}-{index:03}");

        if insert_record(pool, &record, Some(&source_key)).await? {
            insert_journal_entry(
                pool,
                &JournalEntry {
                    subject_id: subject_id.to_string(),
                    title: title.to_string(),
                    content: content.to_string(),
                    analysis,
                    created_at,
                },
            )
            .await?;
            inserted += 1;
        }
    }

    info!(subject_id, inserted, "seed complete");
    Ok(inserted)
}

#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    subject_id: String,
    emotions: String,
    mood_score: i32,
    recorded_at: DateTime<Utc>,
    source_key: Option<String>,
}

impl CsvRow {
    fn into_record(self) -> (EmotionRecord, String) {
        let labels = parse_labels(self.emotions.split(';')).unwrap_or_else(neutral);
        let mood_score = self.mood_score.clamp(1, 10) as u8;
        let source_key = self
            .source_key
            .filter(|key| !key.trim().is_empty())
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));
        (
            EmotionRecord::new(self.subject_id, labels, mood_score, self.recorded_at),
            source_key,
        )
    }
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut inserted = 0usize;

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("invalid CSV row {}", line + 1))?;
        let (record, source_key) = row.into_record();

        if insert_record(pool, &record, Some(&source_key)).await? {
            inserted += 1;
        }
    }

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn stored_labels_round_trip_through_text() {
        let labels = vec![EmotionLabel::Hopeful, EmotionLabel::Anxious];
        assert_eq!(labels_from_text(&labels_to_text(&labels)), labels);
    }

    #[test]
    fn unreadable_stored_labels_become_neutral() {
        assert_eq!(
            labels_from_text(&["bored".to_string()]),
            vec![EmotionLabel::Neutral]
        );
        assert_eq!(labels_from_text(&[]), vec![EmotionLabel::Neutral]);
    }

    #[test]
    fn stored_mood_is_clamped() {
        assert_eq!(mood_from_db(0), 1);
        assert_eq!(mood_from_db(7), 7);
        assert_eq!(mood_from_db(42), 10);
    }

    #[test]
    fn csv_rows_become_records() {
        let data = "subject_id,emotions,mood_score,recorded_at,source_key\n\
                    user-1,happy;grateful;bogus,12,2026-10-18T09:30:00Z,row-1\n\
                    user-1,,4,2026-10-17T22:00:00Z,\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<CsvRow> = reader.deserialize().collect::<Result<_, _>>().unwrap();

        let mut records = rows.into_iter().map(CsvRow::into_record);
        let (first, first_key) = records.next().unwrap();
        assert_eq!(first.emotions, vec![EmotionLabel::Happy, EmotionLabel::Grateful]);
        assert_eq!(first.mood_score, 10);
        assert_eq!(first_key, "row-1");
        assert_eq!(
            first.source_date,
            Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap().date_naive()
        );

        let (second, second_key) = records.next().unwrap();
        assert_eq!(second.emotions, vec![EmotionLabel::Neutral]);
        assert!(second_key.starts_with("import-"));
    }

    #[test]
    fn seed_entries_cover_the_week() {
        assert!(SEED_ENTRIES.iter().all(|(hours, _, _)| *hours < 7 * 24));
        let labels: Vec<_> = SEED_ENTRIES
            .iter()
            .flat_map(|(_, _, content)| cascade::local_analysis(content).emotions)
            .collect();
        assert!(labels.contains(&EmotionLabel::Lonely));
        assert!(labels.contains(&EmotionLabel::Grateful));
    }
}
