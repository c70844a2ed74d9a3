//! Batch generation orchestration.
//!
//! Drives concurrency-limited, retried calls to the remote model API,
//! hands every raw response to the normalizer, and writes results through
//! the repository. All coordination state (pacing clock, per-batch title
//! set) lives on the instance; nothing in the crate is process-wide, so
//! concurrent batches and test runs cannot interfere with each other.

use log::{debug, info, warn};
use rand::{distributions::Alphanumeric, Rng};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio::time::{sleep, Instant};

use crate::config::GenerationConfig;
use crate::error::DishlensError;
use crate::model::{Article, NewRecord, Recipe, RecordKind};
use crate::parse::{normalize_article, normalize_recipe};
use crate::providers::{
    build_article_prompt, build_image_prompt, GenerativeModel, ARTICLE_WRITER_PROMPT,
    DISH_ANALYSIS_PROMPT,
};
use crate::repository::RecordRepository;

pub struct GenerationOrchestrator {
    provider: Arc<dyn GenerativeModel>,
    repository: Arc<dyn RecordRepository>,
    limiter: Arc<Semaphore>,
    last_call: Mutex<Option<Instant>>,
    retry_attempts: u32,
    retry_delay: Duration,
    min_call_interval: Duration,
    title_retry_attempts: u32,
}

impl GenerationOrchestrator {
    pub fn new(
        provider: Arc<dyn GenerativeModel>,
        repository: Arc<dyn RecordRepository>,
        config: &GenerationConfig,
    ) -> Self {
        GenerationOrchestrator {
            provider,
            repository,
            limiter: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            last_call: Mutex::new(None),
            retry_attempts: config.retry_attempts.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            min_call_interval: Duration::from_millis(config.min_call_interval_ms),
            title_retry_attempts: config.title_retry_attempts,
        }
    }

    /// Turn a dish photo into a stored [`Recipe`].
    pub async fn analyze_dish(&self, image: &[u8], mime: &str) -> Result<Recipe, DishlensError> {
        let _permit = self.acquire().await?;
        self.pace().await;

        let provider = Arc::clone(&self.provider);
        let image = image.to_vec();
        let mime = mime.to_string();
        let raw = self
            .call_with_retry(|| {
                let provider = Arc::clone(&provider);
                let image = image.clone();
                let mime = mime.clone();
                async move {
                    provider
                        .analyze_image(
                            DISH_ANALYSIS_PROMPT,
                            "Reconstruct the recipe for the dish in this photo.",
                            &image,
                            &mime,
                        )
                        .await
                }
            })
            .await?;

        let recipe = normalize_recipe(&raw);
        self.repository
            .insert(NewRecord {
                kind: RecordKind::Recipe,
                title: recipe.title.clone(),
                payload: serde_json::to_value(&recipe)?,
            })
            .await?;
        info!("analyzed dish into recipe '{}'", recipe.title);
        Ok(recipe)
    }

    /// Generate one article per topic with bounded concurrency.
    ///
    /// Results are appended as each generation finishes, so the output
    /// order is not the topic order; callers update incrementally rather
    /// than waiting on slot N.
    pub async fn generate_articles(
        self: &Arc<Self>,
        topics: Vec<String>,
    ) -> Vec<Result<Article, DishlensError>> {
        let seen_titles: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));
        let mut tasks = JoinSet::new();

        for topic in topics {
            let orchestrator = Arc::clone(self);
            let seen_titles = Arc::clone(&seen_titles);
            tasks.spawn(async move {
                orchestrator.generate_article(&topic, &seen_titles).await
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => results.push(Err(DishlensError::Provider(format!(
                    "generation task failed: {e}"
                )))),
            }
        }
        results
    }

    /// Generate and store one article, avoiding title collisions within the
    /// current batch.
    async fn generate_article(
        &self,
        topic: &str,
        seen_titles: &Mutex<HashSet<String>>,
    ) -> Result<Article, DishlensError> {
        let _permit = self.acquire().await?;

        let mut attempt = 0;
        loop {
            self.pace().await;

            let provider = Arc::clone(&self.provider);
            let prompt = build_article_prompt(topic);
            let raw = self
                .call_with_retry(|| {
                    let provider = Arc::clone(&provider);
                    let prompt = prompt.clone();
                    async move {
                        provider.generate_text(ARTICLE_WRITER_PROMPT, &prompt).await
                    }
                })
                .await?;

            let mut article = normalize_article(&raw);
            let key = article.title.trim().to_lowercase();

            let mut seen = seen_titles.lock().await;
            if !seen.contains(&key) {
                seen.insert(key);
                drop(seen);
                return self.store_article(article).await;
            }
            drop(seen);

            if attempt >= self.title_retry_attempts {
                // Out of regeneration budget; disambiguate in place. The
                // title rewrite happens after normalization and does not
                // re-enter the normalizer.
                let suffix: String = rand::thread_rng()
                    .sample_iter(&Alphanumeric)
                    .take(4)
                    .map(char::from)
                    .collect();
                article.title = format!("{} ({suffix})", article.title);
                seen_titles
                    .lock()
                    .await
                    .insert(article.title.trim().to_lowercase());
                return self.store_article(article).await;
            }

            debug!(
                "duplicate title '{}' in batch, regenerating (attempt {}/{})",
                article.title,
                attempt + 1,
                self.title_retry_attempts
            );
            attempt += 1;
        }
    }

    /// Generate a header image for a stored recipe or article.
    pub async fn illustrate(&self, subject: &str) -> Result<Vec<u8>, DishlensError> {
        let _permit = self.acquire().await?;
        self.pace().await;

        let provider = Arc::clone(&self.provider);
        let prompt = build_image_prompt(subject);
        self.call_with_retry(|| {
            let provider = Arc::clone(&provider);
            let prompt = prompt.clone();
            async move { provider.generate_image(&prompt).await }
        })
        .await
    }

    pub fn repository(&self) -> Arc<dyn RecordRepository> {
        Arc::clone(&self.repository)
    }

    async fn store_article(&self, article: Article) -> Result<Article, DishlensError> {
        self.repository
            .insert(NewRecord {
                kind: RecordKind::Article,
                title: article.title.clone(),
                payload: serde_json::to_value(&article)?,
            })
            .await?;
        info!("generated article '{}'", article.title);
        Ok(article)
    }

    async fn acquire(&self) -> Result<tokio::sync::SemaphorePermit<'_>, DishlensError> {
        self.limiter
            .acquire()
            .await
            .map_err(|_| DishlensError::Provider("orchestrator shut down".to_string()))
    }

    /// Enforce the minimum delay between consecutive remote calls.
    async fn pace(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.min_call_interval {
                sleep(self.min_call_interval - elapsed).await;
            }
        }
        *last_call = Some(Instant::now());
    }

    /// Retry a remote call with linear backoff.
    async fn call_with_retry<T, Fut, F>(&self, mut operation: F) -> Result<T, DishlensError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DishlensError>>,
    {
        let mut last_error = None;
        for attempt in 1..=self.retry_attempts {
            debug!(
                "calling {} (attempt {}/{})",
                self.provider.provider_name(),
                attempt,
                self.retry_attempts
            );
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(
                        "provider {} failed (attempt {}/{}): {}",
                        self.provider.provider_name(),
                        attempt,
                        self.retry_attempts,
                        e
                    );
                    last_error = Some(e);
                    if attempt < self.retry_attempts {
                        // Linear backoff: delay grows with each attempt
                        sleep(self.retry_delay * attempt).await;
                    }
                }
            }
        }
        Err(last_error
            .unwrap_or_else(|| DishlensError::Provider("no attempts were made".to_string())))
    }
}
