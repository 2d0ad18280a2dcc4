//! Year → tile template URL resolution against the imagery tile service.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use foundation::{Year, YearRange};
use runtime::Metrics;
use tracing::{debug, warn};

use crate::cache::TileUrlCache;
use crate::error::ImageryError;
use crate::protocol::ImageryResponse;
use crate::request::{ImageryRequest, ImageryRequestTemplate};

pub const METRIC_CACHE_HITS: &str = "naip.cache_hits";
pub const METRIC_NETWORK_REQUESTS: &str = "naip.network_requests";
pub const METRIC_FAILURES: &str = "naip.failures";
pub const METRIC_RESOLVE_MS: &str = "naip.resolve_ms";

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The remote service that turns a request payload into a tile template URL.
///
/// Methods return boxed futures for dyn-compatibility.
pub trait ImageryEndpoint: Send + Sync {
    fn request_tiles<'a>(
        &'a self,
        request: &'a ImageryRequest,
    ) -> BoxFuture<'a, Result<ImageryResponse, ImageryError>>;
}

/// JSON-over-HTTP endpoint.
pub struct HttpImageryEndpoint {
    url: String,
    client: reqwest::Client,
}

impl HttpImageryEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, reqwest::Client::new())
    }

    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ImageryEndpoint for HttpImageryEndpoint {
    fn request_tiles<'a>(
        &'a self,
        request: &'a ImageryRequest,
    ) -> BoxFuture<'a, Result<ImageryResponse, ImageryError>> {
        Box::pin(async move {
            let resp = self
                .client
                .post(&self.url)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .json(request)
                .send()
                .await
                .map_err(|e| ImageryError::Network(e.to_string()))?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(ImageryError::Upstream {
                    status: status.as_u16(),
                    body,
                });
            }

            let bytes = resp
                .bytes()
                .await
                .map_err(|e| ImageryError::Network(e.to_string()))?;
            ImageryResponse::from_slice(&bytes)
        })
    }
}

/// Resolves a year to its tile template URL, at most one successful network
/// call per year.
///
/// Cheap to clone: clones share the cache, the endpoint and the metrics.
#[derive(Clone)]
pub struct TileUrlResolver {
    range: YearRange,
    template: ImageryRequestTemplate,
    cache: TileUrlCache,
    endpoint: Arc<dyn ImageryEndpoint>,
    metrics: Metrics,
}

impl TileUrlResolver {
    pub fn new(
        range: YearRange,
        template: ImageryRequestTemplate,
        cache: TileUrlCache,
        endpoint: Arc<dyn ImageryEndpoint>,
    ) -> Self {
        Self {
            range,
            template,
            cache,
            endpoint,
            metrics: Metrics::new(),
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn range(&self) -> YearRange {
        self.range
    }

    pub fn cache(&self) -> &TileUrlCache {
        &self.cache
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn check_year(&self, year: Year) -> Result<(), ImageryError> {
        if self.range.contains(year) {
            Ok(())
        } else {
            Err(ImageryError::InvalidYear {
                year,
                start: self.range.start,
                end: self.range.end,
            })
        }
    }

    pub async fn resolve(&self, year: Year) -> Result<String, ImageryError> {
        self.check_year(year)?;

        if let Some(url) = self.cache.get(year) {
            debug!(%year, "tile url cache hit");
            self.metrics.incr(METRIC_CACHE_HITS);
            return Ok(url);
        }

        let slot = self.cache.slot(year);
        let result = slot
            .get_or_try_init(|| self.fetch(year))
            .await
            .cloned();

        if let Err(err) = &result {
            self.metrics.incr(METRIC_FAILURES);
            warn!(%year, error = %err, "tile url resolution failed");
        }
        result
    }

    async fn fetch(&self, year: Year) -> Result<String, ImageryError> {
        let request = self.template.request_for(year);
        debug!(%year, asset = %request.asset_id, "requesting tile url");
        self.metrics.incr(METRIC_NETWORK_REQUESTS);

        let started = Instant::now();
        let resp = self.endpoint.request_tiles(&request).await;
        self.metrics
            .record(METRIC_RESOLVE_MS, started.elapsed().as_millis() as u64);

        Ok(resp?.tile_url)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use foundation::{Year, YearRange};

    use super::{
        HttpImageryEndpoint, ImageryEndpoint, METRIC_CACHE_HITS, METRIC_NETWORK_REQUESTS,
        TileUrlResolver,
    };
    use crate::cache::TileUrlCache;
    use crate::error::ImageryError;
    use crate::request::{ImageryRequest, ImageryRequestTemplate};
    use crate::testing::{ScriptedEndpoint, url_for};

    fn resolver(endpoint: Arc<ScriptedEndpoint>) -> TileUrlResolver {
        TileUrlResolver::new(
            YearRange::new(2009, 2023),
            ImageryRequestTemplate::default(),
            TileUrlCache::new(),
            endpoint,
        )
    }

    #[tokio::test]
    async fn second_resolve_is_served_from_cache() {
        let endpoint = ScriptedEndpoint::new();
        let r = resolver(endpoint.clone());

        let first = r.resolve(Year(2012)).await.unwrap();
        let second = r.resolve(Year(2012)).await.unwrap();

        assert_eq!(first, url_for(2012));
        assert_eq!(first, second);
        assert_eq!(endpoint.calls(), 1);
        assert_eq!(r.metrics().counter(METRIC_NETWORK_REQUESTS), 1);
        assert_eq!(r.metrics().counter(METRIC_CACHE_HITS), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let endpoint = ScriptedEndpoint::new();
        endpoint.fail_next(2018, ImageryError::Network("connection reset".into()));
        let r = resolver(endpoint.clone());

        let err = r.resolve(Year(2018)).await.unwrap_err();
        assert_eq!(err, ImageryError::Network("connection reset".into()));
        assert!(!r.cache().contains(Year(2018)));

        let url = r.resolve(Year(2018)).await.unwrap();
        assert_eq!(url, url_for(2018));
        assert_eq!(endpoint.calls_for(2018), 2);
        assert!(r.cache().contains(Year(2018)));
    }

    #[tokio::test]
    async fn out_of_range_year_never_reaches_the_network() {
        let endpoint = ScriptedEndpoint::new();
        let r = resolver(endpoint.clone());

        let err = r.resolve(Year(2008)).await.unwrap_err();
        assert!(matches!(err, ImageryError::InvalidYear { year: Year(2008), .. }));
        assert_eq!(endpoint.calls(), 0);
    }

    #[tokio::test]
    async fn concurrent_misses_share_one_request() {
        let endpoint = ScriptedEndpoint::new();
        let release = endpoint.gate(2020);
        let r = resolver(endpoint.clone());

        let a = tokio::spawn({
            let r = r.clone();
            async move { r.resolve(Year(2020)).await }
        });
        let b = tokio::spawn({
            let r = r.clone();
            async move { r.resolve(Year(2020)).await }
        });

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        release.send(()).unwrap();

        assert_eq!(a.await.unwrap().unwrap(), url_for(2020));
        assert_eq!(b.await.unwrap().unwrap(), url_for(2020));
        assert_eq!(endpoint.calls_for(2020), 1);
    }

    #[tokio::test]
    async fn waiter_retries_after_the_shared_request_fails() {
        let endpoint = ScriptedEndpoint::new();
        endpoint.fail_next(2014, ImageryError::Network("connection reset".into()));
        let release = endpoint.gate(2014);
        let r = resolver(endpoint.clone());

        // `a` owns the in-flight request; `b` waits on the same slot.
        let (a, b, ()) = tokio::join!(r.resolve(Year(2014)), r.resolve(Year(2014)), async {
            release.send(()).unwrap();
        });

        assert_eq!(a, Err(ImageryError::Network("connection reset".into())));
        assert_eq!(b, Ok(url_for(2014)));
        assert_eq!(endpoint.calls_for(2014), 2);
        assert!(r.cache().contains(Year(2014)));
    }

    #[tokio::test]
    async fn upstream_status_is_reported() {
        let endpoint = ScriptedEndpoint::new();
        endpoint.fail_next(
            2011,
            ImageryError::Upstream {
                status: 503,
                body: "busy".into(),
            },
        );
        let r = resolver(endpoint);
        let err = r.resolve(Year(2011)).await.unwrap_err();
        assert_eq!(
            err,
            ImageryError::Upstream {
                status: 503,
                body: "busy".into()
            }
        );
    }

    mod http {
        use axum::Json;
        use axum::http::{HeaderMap, StatusCode, header};
        use axum::routing::post;
        use axum::Router;
        use serde_json::{Value, json};

        use super::*;

        async fn tile(headers: HeaderMap, Json(request): Json<ImageryRequest>) -> Json<Value> {
            let content_type = headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");
            let year = &request.start_date[..4];
            Json(json!({ "tile_url": format!("u/{year}/{content_type}") }))
        }

        async fn serve() -> String {
            let app = Router::new()
                .route("/tile", post(tile))
                .route("/busy", post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "busy") }))
                .route("/garbled", post(|| async { Json(json!({ "url": "x" })) }));
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
            format!("http://{addr}")
        }

        fn request(year: i32) -> ImageryRequest {
            ImageryRequestTemplate::default().request_for(Year(year))
        }

        #[tokio::test]
        async fn posts_json_and_reads_the_tile_url() {
            let base = serve().await;
            let endpoint = HttpImageryEndpoint::new(format!("{base}/tile"));
            let resp = endpoint.request_tiles(&request(2012)).await.unwrap();
            assert_eq!(resp.tile_url, "u/2012/application/json");
        }

        #[tokio::test]
        async fn non_success_status_is_upstream() {
            let base = serve().await;
            let endpoint = HttpImageryEndpoint::new(format!("{base}/busy"));
            let err = endpoint.request_tiles(&request(2012)).await.unwrap_err();
            assert_eq!(
                err,
                ImageryError::Upstream {
                    status: 503,
                    body: "busy".into()
                }
            );
        }

        #[tokio::test]
        async fn body_without_tile_url_is_a_parse_error() {
            let base = serve().await;
            let endpoint = HttpImageryEndpoint::new(format!("{base}/garbled"));
            let err = endpoint.request_tiles(&request(2012)).await.unwrap_err();
            assert!(matches!(err, ImageryError::Parse(msg) if msg.contains("tile_url")));
        }

        #[tokio::test]
        async fn unreachable_service_is_a_network_error() {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);

            let endpoint = HttpImageryEndpoint::new(format!("http://{addr}/tile"));
            let err = endpoint.request_tiles(&request(2012)).await.unwrap_err();
            assert!(matches!(err, ImageryError::Network(_)));
        }
    }
}
