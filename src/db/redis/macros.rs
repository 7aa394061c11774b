/// Read-through caching for values that can always be recomputed.
///
/// Returns the cached value when present. On a miss, or when the cache read
/// itself fails, the block is awaited, its value is queued for a background
/// write, and the value is returned. Cache failures are logged and never
/// surface to the caller; errors from the block are propagated with `?`.
///
/// # Arguments
/// * `$cache`: A cache with `get_from_cache` and `set_in_background` methods.
/// * `$key`: The key to use for caching the value.
/// * `$ttl`: The time-to-live (TTL) for the cached value in seconds.
/// * `$block`: A future computing the value if it is not cached.
///
/// # Example
/// ```rust,ignore
/// let model = cached!(cache, key, 600, async move {
///     Ok::<_, AppError>(TfidfVectorizer::fit(&corpus))
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        match $cache.get_from_cache(&$key).await {
            Ok(Some(cached)) => {
                tracing::debug!(key = %$key, "Cache hit");
                Ok(cached)
            }
            lookup => {
                if let Err(e) = lookup {
                    tracing::warn!(key = %$key, error = %e, "Cache read failed, recomputing");
                }
                let value = $block.await?;
                $cache.set_in_background(&$key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
