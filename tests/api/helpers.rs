use once_cell::sync::Lazy;
use potsol::configuration::{
    get_configuration, DatabaseSettings, HttpTransportSettings, Settings, SmtpSettings,
    TransportSettings,
};
use potsol::domain::Tweet;
use potsol::startup::{get_connection_pool, Application};
use potsol::telemetry::{get_subscriber, init_subscriber};
use secrecy::Secret;
use sqlx::{Connection, Executor, PgConnection, PgPool};
use uuid::Uuid;
use wiremock::MockServer;

// Ensure that the `tracing` stack is only initialised once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    };
});

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
    pub email_server: MockServer,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn get_tweets(&self) -> reqwest::Response {
        self.api_client
            .get(&format!("{}/api/tweets", &self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_send_email(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/send-email", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_raw_send_email(
        &self,
        content_type: Option<&str>,
        body: &'static str,
    ) -> reqwest::Response {
        let mut request = self
            .api_client
            .post(&format!("{}/send-email", &self.address))
            .body(body);
        if let Some(content_type) = content_type {
            request = request.header("Content-Type", content_type);
        }
        request.send().await.expect("Failed to execute request.")
    }

    pub async fn insert_tweet(&self, tweet: &Tweet) {
        sqlx::query(
            r#"INSERT INTO tweets (tweet_id, author_id, text, created_at, has_media, media_urls, retweet_count, like_count, email)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
        )
        .bind(&tweet.tweet_id)
        .bind(&tweet.author_id)
        .bind(&tweet.text)
        .bind(tweet.created_at)
        .bind(tweet.has_media)
        .bind(&tweet.media_urls)
        .bind(tweet.retweet_count)
        .bind(tweet.like_count)
        .bind(&tweet.email)
        .execute(&self.db_pool)
        .await
        .expect("Failed to insert tweet.");
    }
}

enum Database {
    /// Pool is lazy; the database is never created or touched.
    Untouched,
    Provisioned,
    Unreachable,
}

/// Relay-only app: no Postgres required.
pub async fn spawn_app() -> TestApp {
    spawn(Database::Untouched, |_| {}).await
}

pub async fn spawn_app_with_database() -> TestApp {
    spawn(Database::Provisioned, |_| {}).await
}

pub async fn spawn_app_with_unreachable_database() -> TestApp {
    spawn(Database::Unreachable, |_| {}).await
}

/// Relays through SMTP instead of the mocked HTTP provider.
pub async fn spawn_app_with_smtp(smtp: SmtpSettings) -> TestApp {
    spawn(Database::Untouched, move |c| {
        c.email_client.transport = TransportSettings::Smtp(smtp);
    })
    .await
}

async fn spawn(database: Database, customise: impl FnOnce(&mut Settings)) -> TestApp {
    Lazy::force(&TRACING);

    // Stands in for the mail provider
    let email_server = MockServer::start().await;

    // Randomise configuration to ensure test isolation
    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        // Use a different database for each test case
        c.database.database_name = Uuid::new_v4().to_string();
        // Use a random OS port
        c.application.port = 0;
        c.email_client.transport = TransportSettings::Http(HttpTransportSettings {
            base_url: email_server.uri(),
            authorization_token: Secret::new("test-token".to_string()),
        });
        if let Database::Unreachable = database {
            c.database.port = 1;
        }
        customise(&mut c);
        c
    };

    if let Database::Provisioned = database {
        configure_database(&configuration.database).await;
    }

    let application = Application::build(configuration.clone())
        .await
        .expect("Failed to build application.");
    let application_port = application.port();
    let _ = tokio::spawn(application.run_until_stopped());

    TestApp {
        address: format!("http://127.0.0.1:{}", application_port),
        db_pool: get_connection_pool(&configuration.database),
        email_server,
        api_client: reqwest::Client::new(),
    }
}

async fn configure_database(config: &DatabaseSettings) -> PgPool {
    // Create database
    let mut connection = PgConnection::connect_with(&config.without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(format!(r#"CREATE DATABASE "{}";"#, config.database_name).as_str())
        .await
        .expect("Failed to create database.");

    // Migrate database
    let connection_pool = PgPool::connect_with(config.with_db())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database");
    connection_pool
}
