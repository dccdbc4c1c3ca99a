use chrono::NaiveDateTime;

/// `TIMESTAMP` columns hold UTC wall-clock time; on the wire they carry
/// an explicit `Z` so browsers do not read them as local time.
mod utc_timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(timestamp) => serializer.serialize_str(
                &timestamp
                    .and_utc()
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<DateTime<Utc>>::deserialize(deserializer)?;
        Ok(value.map(|timestamp| timestamp.naive_utc()))
    }
}

/// One ingested row of the `tweets` table.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, sqlx::FromRow)]
pub struct Tweet {
    pub tweet_id: String,
    pub author_id: Option<String>,
    pub text: Option<String>,
    #[serde(default, with = "utc_timestamp")]
    pub created_at: Option<NaiveDateTime>,
    pub has_media: Option<bool>,
    /// Comma-joined list of media URLs, as written by ingestion.
    pub media_urls: Option<String>,
    pub retweet_count: Option<i32>,
    pub like_count: Option<i32>,
    /// Contact address extracted from the text, if any.
    pub email: Option<String>,
}

impl Tweet {
    pub fn media_urls(&self) -> Vec<&str> {
        self.media_urls
            .as_deref()
            .map(|urls| {
                urls.split(',')
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}
