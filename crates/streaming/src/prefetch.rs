use foundation::Year;
use futures_util::future::join_all;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::ImageryError;
use crate::resolver::TileUrlResolver;

/// Outcome of warming the cache for every supported year.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PrefetchReport {
    pub resolved: Vec<Year>,
    pub failed: Vec<(Year, ImageryError)>,
}

impl PrefetchReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Resolves every year in the resolver's range concurrently.
///
/// Each year succeeds or fails on its own; a failure is logged and recorded in
/// the report, never propagated. Only the tile URL cache is touched.
pub async fn prefetch_all(resolver: &TileUrlResolver) -> PrefetchReport {
    let range = resolver.range();
    let results = join_all(
        range
            .iter()
            .map(|year| async move { (year, resolver.resolve(year).await) }),
    )
    .await;

    let mut report = PrefetchReport::default();
    for (year, result) in results {
        match result {
            Ok(_) => report.resolved.push(year),
            Err(err) => {
                warn!(%year, error = %err, "prefetch failed");
                report.failed.push((year, err));
            }
        }
    }

    info!(
        resolved = report.resolved.len(),
        failed = report.failed.len(),
        "imagery prefetch finished"
    );
    report
}

/// Detaches [`prefetch_all`] onto the current tokio runtime.
///
/// The handle may be dropped; the task keeps running to completion.
pub fn spawn_prefetch(resolver: TileUrlResolver) -> JoinHandle<PrefetchReport> {
    tokio::spawn(async move { prefetch_all(&resolver).await })
}

#[cfg(test)]
mod tests {
    use foundation::{Year, YearRange};

    use super::{prefetch_all, spawn_prefetch};
    use crate::cache::TileUrlCache;
    use crate::error::ImageryError;
    use crate::request::ImageryRequestTemplate;
    use crate::resolver::TileUrlResolver;
    use crate::testing::{ScriptedEndpoint, url_for};

    #[tokio::test]
    async fn one_failing_year_does_not_abort_the_rest() {
        let endpoint = ScriptedEndpoint::new();
        endpoint.fail_next(2010, ImageryError::Network("timed out".into()));
        let resolver = TileUrlResolver::new(
            YearRange::new(2009, 2011),
            ImageryRequestTemplate::default(),
            TileUrlCache::new(),
            endpoint.clone(),
        );

        let report = prefetch_all(&resolver).await;

        assert_eq!(report.resolved, vec![Year(2009), Year(2011)]);
        assert_eq!(
            report.failed,
            vec![(Year(2010), ImageryError::Network("timed out".into()))]
        );
        assert!(!report.is_complete());

        let cache = resolver.cache();
        assert_eq!(cache.get(Year(2011)), Some(url_for(2011)));
        assert!(!cache.contains(Year(2010)));
        assert_eq!(endpoint.calls(), 3);
    }

    #[tokio::test]
    async fn spawned_prefetch_warms_a_shared_cache() {
        let endpoint = ScriptedEndpoint::new();
        let cache = TileUrlCache::new();
        let resolver = TileUrlResolver::new(
            YearRange::new(2009, 2023),
            ImageryRequestTemplate::default(),
            cache.clone(),
            endpoint.clone(),
        );

        let report = spawn_prefetch(resolver.clone()).await.unwrap();
        assert!(report.is_complete());
        assert_eq!(cache.len(), 15);

        // Later lookups are cache hits.
        resolver.resolve(Year(2014)).await.unwrap();
        assert_eq!(endpoint.calls(), 15);
    }
}
