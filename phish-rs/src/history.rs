//! Scan history persistence
//!
//! Records each classification and serves recent scans and aggregate counts.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{PhishError, Result};
use crate::types::{ClassificationRequest, ClassificationResult};

/// One stored scan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanRecord {
    pub id: String,
    pub input_type: String,
    pub content: String,
    pub is_phishing: bool,
    pub confidence: f64,
    pub features: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Aggregate scan counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub total_scans: i64,
    pub phishing_count: i64,
    pub legitimate_count: i64,
}

type ScanRow = (String, String, String, i64, f64, String, String);

/// Scan history store
pub struct ScanHistory {
    db: SqlitePool,
}

impl ScanHistory {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Open a pool for `database_url`. In-memory databases get a single
    /// connection so every query sees the same data.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let db = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(db))
    }

    /// Initialize database tables
    pub async fn init_db(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS scans (
                id TEXT PRIMARY KEY,
                input_type TEXT NOT NULL,
                content TEXT NOT NULL,
                is_phishing INTEGER NOT NULL,
                confidence REAL NOT NULL,
                features TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_scans_created_at ON scans(created_at)")
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Store a classification
    pub async fn record(
        &self,
        request: &ClassificationRequest,
        result: &ClassificationResult,
    ) -> Result<ScanRecord> {
        let record = ScanRecord {
            id: Uuid::new_v4().to_string(),
            input_type: request.kind.as_str().to_string(),
            content: request.text.clone(),
            is_phishing: result.is_phishing,
            confidence: result.confidence,
            features: serde_json::to_value(&result.features)?,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO scans (id, input_type, content, is_phishing, confidence, features, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.input_type)
        .bind(&record.content)
        .bind(record.is_phishing as i64)
        .bind(record.confidence)
        .bind(record.features.to_string())
        .bind(record.created_at.to_rfc3339_opts(SecondsFormat::Micros, true))
        .execute(&self.db)
        .await?;

        Ok(record)
    }

    /// Most recent scans, newest first
    pub async fn recent(&self, limit: i64) -> Result<Vec<ScanRecord>> {
        let rows = sqlx::query_as::<_, ScanRow>(
            "SELECT id, input_type, content, is_phishing, confidence, features, created_at FROM scans ORDER BY created_at DESC, rowid DESC LIMIT ?"
        )
        .bind(limit.max(0))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(row_to_record).collect()
    }

    pub async fn stats(&self) -> Result<ScanStats> {
        let (total_scans, phishing_count) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COALESCE(SUM(is_phishing), 0) FROM scans",
        )
        .fetch_one(&self.db)
        .await?;

        Ok(ScanStats {
            total_scans,
            phishing_count,
            legitimate_count: total_scans - phishing_count,
        })
    }

    /// Delete all scans, returning how many were removed
    pub async fn clear(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM scans").execute(&self.db).await?;
        Ok(result.rows_affected())
    }
}

fn row_to_record(row: ScanRow) -> Result<ScanRecord> {
    let (id, input_type, content, is_phishing, confidence, features, created_at) = row;
    Ok(ScanRecord {
        id,
        input_type,
        content,
        is_phishing: is_phishing != 0,
        confidence,
        features: serde_json::from_str(&features)?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| PhishError::Database(sqlx::Error::Decode(Box::new(e))))?
            .with_timezone(&Utc),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features;

    async fn setup_history() -> ScanHistory {
        let history = ScanHistory::connect("sqlite::memory:").await.unwrap();
        history.init_db().await.unwrap();
        history
    }

    fn result_for(
        request: &ClassificationRequest,
        is_phishing: bool,
        confidence: f64,
    ) -> ClassificationResult {
        ClassificationResult {
            is_phishing,
            confidence,
            features: features::extract(&request.text, request.kind),
        }
    }

    #[tokio::test]
    async fn test_record_and_recent() {
        let history = setup_history().await;

        let request = ClassificationRequest::url("http://192.168.1.100/admin/login");
        let stored = history
            .record(&request, &result_for(&request, true, 0.85))
            .await
            .unwrap();

        assert_eq!(stored.input_type, "url");
        assert!(stored.is_phishing);
        assert_eq!(stored.features["has_ip"], serde_json::json!(true));

        let recent = history.recent(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, stored.id);
        assert_eq!(recent[0].content, request.text);
        assert_eq!(recent[0].features, stored.features);
    }

    #[tokio::test]
    async fn test_recent_is_newest_first_and_limited() {
        let history = setup_history().await;

        for text in ["first", "second", "third"] {
            let request = ClassificationRequest::email(text);
            history
                .record(&request, &result_for(&request, false, 0.1))
                .await
                .unwrap();
        }

        let recent = history.recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "third");
        assert_eq!(recent[1].content, "second");
    }

    #[tokio::test]
    async fn test_stats() {
        let history = setup_history().await;
        assert_eq!(history.stats().await.unwrap(), ScanStats::default());

        let phish = ClassificationRequest::url("http://10.0.0.1/secure/bank");
        let legit = ClassificationRequest::email("Lunch tomorrow?");
        history.record(&phish, &result_for(&phish, true, 0.9)).await.unwrap();
        history.record(&legit, &result_for(&legit, false, 0.2)).await.unwrap();
        history.record(&legit, &result_for(&legit, false, 0.3)).await.unwrap();

        let stats = history.stats().await.unwrap();
        assert_eq!(stats.total_scans, 3);
        assert_eq!(stats.phishing_count, 1);
        assert_eq!(stats.legitimate_count, 2);
    }

    #[tokio::test]
    async fn test_clear() {
        let history = setup_history().await;
        let request = ClassificationRequest::email("hello");
        history
            .record(&request, &result_for(&request, false, 0.1))
            .await
            .unwrap();

        assert_eq!(history.clear().await.unwrap(), 1);
        assert!(history.recent(10).await.unwrap().is_empty());
    }
}
