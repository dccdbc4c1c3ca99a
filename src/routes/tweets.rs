use crate::domain::Tweet;
use crate::routes::error_chain_fmt;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use sqlx::PgPool;

#[derive(thiserror::Error)]
#[error("Error fetching data")]
pub struct FetchTweetsError(#[from] sqlx::Error);

impl std::fmt::Debug for FetchTweetsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for FetchTweetsError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(self.to_string())
    }
}

#[tracing::instrument(name = "Listing all tweets", skip(pool))]
pub async fn list_tweets(pool: web::Data<PgPool>) -> Result<HttpResponse, FetchTweetsError> {
    let tweets = fetch_all_tweets(pool.get_ref()).await.map_err(|e| {
        tracing::error!("Failed to fetch tweets: {:?}", e);
        e
    })?;
    tracing::info!(count = tweets.len(), "Fetched tweets");
    Ok(HttpResponse::Ok().json(tweets))
}

#[tracing::instrument(name = "Reading tweets from the database", skip(pool))]
pub async fn fetch_all_tweets(pool: &PgPool) -> Result<Vec<Tweet>, sqlx::Error> {
    sqlx::query_as::<_, Tweet>(
        r#"SELECT tweet_id, author_id, text, created_at, has_media, media_urls, retweet_count, like_count, email FROM tweets"#,
    )
    .fetch_all(pool)
    .await
}
