use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;
use std::time::Duration;

/// Expected account volume and false-positive rate. Tune against real
/// registration numbers.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

/// Fast negative: an email not in the filter is definitely unregistered.
static EMAIL_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

/// Fast positive: only taken emails are stored.
static EMAIL_CACHE: Lazy<Cache<String, bool>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(500_000)
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

#[inline]
fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Mark an email as taken in both layers.
pub async fn record(email: &str) {
    let email = normalize(email);
    EMAIL_FILTER
        .write()
        .expect("email filter poisoned")
        .add(&email);
    EMAIL_CACHE.insert(email, true).await;
}

/// true  => email AVAILABLE
/// false => email TAKEN
///
/// Filter gives fast negatives, cache fast positives, the database
/// settles the rest.
pub async fn is_available(email: &str, pool: &MySqlPool) -> bool {
    let email = normalize(email);

    if !EMAIL_FILTER
        .read()
        .expect("email filter poisoned")
        .contains(&email)
    {
        return true;
    }

    if EMAIL_CACHE.get(&email).await.unwrap_or(false) {
        return false;
    }

    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ? LIMIT 1)",
    )
    .bind(&email)
    .fetch_one(pool)
    .await
    .unwrap_or(true); // fail-safe

    !exists
}

/// Stream every registered email into the filter and the recently active
/// ones into the cache, in batches.
pub async fn warmup(pool: &MySqlPool, recent_days: u32, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String,)>("SELECT email FROM users").fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (email,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;

        batch.push(normalize(&email));
        total += 1;

        if batch.len() == batch_size {
            insert_batch(&batch);
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch);
    }

    // the cache only holds accounts that logged in recently
    let mut recent = sqlx::query_as::<_, (String,)>(
        r#"
        SELECT email
        FROM users
        WHERE last_login_at >= NOW() - INTERVAL ? DAY
        ORDER BY last_login_at DESC
        "#,
    )
    .bind(recent_days)
    .fetch(pool);

    let mut pending = Vec::with_capacity(batch_size);
    let mut cached = 0usize;

    while let Some(row) = recent.next().await {
        let (email,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;

        pending.push(EMAIL_CACHE.insert(normalize(&email), true));
        cached += 1;

        if pending.len() == batch_size {
            futures::future::join_all(pending.drain(..)).await;
        }
    }

    futures::future::join_all(pending).await;

    log::info!(
        "Email index warmup complete: {} emails, {} recently active (last {} days)",
        total,
        cached,
        recent_days
    );

    Ok(())
}

/// Insert a batch of normalized emails into the filter
fn insert_batch(emails: &[String]) {
    let mut filter = EMAIL_FILTER.write().expect("email filter poisoned");

    for email in emails {
        filter.add(email);
    }
}
