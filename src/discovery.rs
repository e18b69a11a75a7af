//! Device discovery via mDNS service advertisement.

use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::{FutureExt, StreamExt};
use futures::channel::mpsc;
use log::{debug, error, warn};

use crate::config::DiscoveryConfig;
use crate::errors::Error;
use crate::light::Light;
use crate::mdns::{MdnsBrowser, ResolvedService, ServiceBrowser};
use crate::runtime::{self, Instant};

type Result<T> = std::result::Result<T, Error>;

impl ResolvedService {
    /// Convert this resolved service into a [`Light`] instance.
    ///
    /// Fails if the reported address cannot be normalized.
    pub fn into_light(self) -> Result<Light> {
        let address = self.address.normalize()?;
        Ok(Light::new(&address, self.port, &self.name, &self.server))
    }
}

/// Closes the browser when discovery returns, on every path out.
struct BrowseGuard<B: ServiceBrowser>(Arc<B>);

impl<B: ServiceBrowser> Drop for BrowseGuard<B> {
    fn drop(&mut self) {
        if let Err(e) = self.0.close() {
            error!("Failed to close service browser: {}", e);
        }
    }
}

/// Discover Elgato lights on the local network using mDNS.
///
/// Listens until `target_count` lights have been seen or the timeout
/// elapses, then waits for every resolution already started. If you know
/// how many lights to expect, setting the target count returns as soon as
/// they are found instead of always waiting out the timeout.
///
/// # Examples
///
/// ```ignore
/// use std::time::Duration;
/// use elgato_lights_rs::{DiscoveryConfig, discover};
///
/// let config = DiscoveryConfig::new().target_count(2).timeout(Duration::from_secs(5));
/// let lights = discover(&config).await?;
/// println!("Found {} lights", lights.len());
/// for light in lights {
///     println!("  {}", light);
/// }
/// ```
pub async fn discover(config: &DiscoveryConfig) -> Result<Vec<Light>> {
    let browser = Arc::new(MdnsBrowser::new(config)?);
    discover_with(browser, config).await
}

/// Discover lights using the given [`ServiceBrowser`].
///
/// A service that fails to resolve, or resolves to an unusable address, is
/// logged and skipped; the other lights are still returned. Repeated
/// announcements of the same name are resolved once. The browser is
/// closed before this returns, whether or not discovery succeeded.
pub async fn discover_with<B: ServiceBrowser>(
    browser: Arc<B>,
    config: &DiscoveryConfig,
) -> Result<Vec<Light>> {
    let guard = BrowseGuard(Arc::clone(&browser));
    let mut names = guard.0.browse(config.get_service_type())?;

    let started = Arc::new(AtomicUsize::new(0));
    let (results_tx, mut results) = mpsc::unbounded();

    let listener = {
        let started = Arc::clone(&started);
        runtime::spawn(async move {
            let mut seen = HashSet::new();
            while let Some(name) = names.next().await {
                if !seen.insert(name.clone()) {
                    debug!("Ignoring repeated announcement of {}", name);
                    continue;
                }
                // Start resolving right away so it is likely done by the
                // time finalization waits for it.
                let seq = started.fetch_add(1, Ordering::SeqCst);
                let browser = Arc::clone(&browser);
                let tx = results_tx.clone();
                runtime::spawn(async move {
                    let resolved = AssertUnwindSafe(browser.resolve(&name))
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|_| Err(Error::ResolvePanicked(name.clone())));
                    let _ = tx.unbounded_send((seq, name, resolved));
                });
            }
        })
    };

    let start = Instant::now();
    while config.keep_listening(started.load(Ordering::SeqCst), start.elapsed()) {
        runtime::sleep(config.get_poll_interval()).await;
    }

    // Dropping the listener drops the last sender it owns; the channel then
    // closes once every started resolution has reported.
    listener.abort();
    listener.await;

    let mut services = Vec::new();
    while let Some(result) = results.next().await {
        services.push(result);
    }
    services.sort_by_key(|(seq, _, _)| *seq);
    debug!(
        "Finished listening after {:?} with {} services",
        start.elapsed(),
        services.len()
    );

    let lights = services
        .into_iter()
        .filter_map(|(_, name, resolved)| match resolved.and_then(ResolvedService::into_light) {
            Ok(light) => Some(light),
            Err(e) => {
                warn!("Skipping service {}: {}", name, e);
                None
            }
        })
        .collect();

    drop(guard);
    Ok(lights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdns::ResolvedAddress;
    use futures::channel::mpsc::UnboundedReceiver;
    use std::collections::HashMap;
    use std::net::IpAddr;
    use std::time::Duration;

    struct Announcement {
        after: Duration,
        name: &'static str,
        resolve_delay: Duration,
        address: ResolvedAddress,
        panics: bool,
    }

    fn announce(after_ms: u64, name: &'static str, resolve_ms: u64) -> Announcement {
        Announcement {
            after: Duration::from_millis(after_ms),
            name,
            resolve_delay: Duration::from_millis(resolve_ms),
            address: ResolvedAddress::Ip(IpAddr::from([192, 168, 1, 10])),
            panics: false,
        }
    }

    /// Browser that announces a fixed schedule of services.
    struct FakeBrowser {
        schedule: std::sync::Mutex<Vec<(Duration, &'static str)>>,
        services: HashMap<&'static str, (Duration, ResolvedAddress)>,
        panicking: HashSet<&'static str>,
        closed: AtomicUsize,
    }

    impl FakeBrowser {
        fn new(announcements: Vec<Announcement>) -> Arc<Self> {
            Arc::new(FakeBrowser {
                schedule: std::sync::Mutex::new(
                    announcements.iter().map(|a| (a.after, a.name)).collect(),
                ),
                panicking: announcements
                    .iter()
                    .filter(|a| a.panics)
                    .map(|a| a.name)
                    .collect(),
                services: announcements
                    .into_iter()
                    .map(|a| (a.name, (a.resolve_delay, a.address)))
                    .collect(),
                closed: AtomicUsize::new(0),
            })
        }

        fn closed(&self) -> usize {
            self.closed.load(Ordering::SeqCst)
        }
    }

    impl ServiceBrowser for FakeBrowser {
        fn browse(&self, service_type: &str) -> Result<UnboundedReceiver<String>> {
            assert_eq!(service_type, "_elg._tcp.local.");
            let schedule = std::mem::take(&mut *self.schedule.lock().unwrap());
            let (tx, rx) = mpsc::unbounded();
            runtime::spawn(async move {
                let start = Instant::now();
                for (after, name) in schedule {
                    runtime::sleep(after.saturating_sub(start.elapsed())).await;
                    let _ = tx.unbounded_send(name.to_string());
                }
                // Keep the stream open like a live browser would.
                runtime::sleep(Duration::from_secs(60)).await;
            });
            Ok(rx)
        }

        async fn resolve(&self, name: &str) -> Result<ResolvedService> {
            let (delay, address) = self
                .services
                .get(name)
                .cloned()
                .ok_or_else(|| Error::ResolveTimeout(name.to_string()))?;
            runtime::sleep(delay).await;
            if self.panicking.contains(name) {
                panic!("resolver crashed on {}", name);
            }
            Ok(ResolvedService {
                address,
                port: 9123,
                name: name.to_string(),
                server: format!("{}.local.", name),
            })
        }

        fn close(&self) -> Result<()> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn names(lights: &[Light]) -> Vec<&str> {
        lights.iter().map(|l| l.name()).collect()
    }

    #[tokio::test]
    async fn test_returns_early_when_target_count_reached() {
        let browser = FakeBrowser::new(vec![announce(50, "a", 10), announce(100, "b", 10)]);
        let config = DiscoveryConfig::new()
            .target_count(2)
            .timeout(Duration::from_secs(5));

        let start = Instant::now();
        let lights = discover_with(Arc::clone(&browser), &config).await.unwrap();

        assert!(start.elapsed() < Duration::from_secs(2));
        assert_eq!(names(&lights), ["a", "b"]);
        assert_eq!(lights[0].address(), "192.168.1.10");
        assert_eq!(lights[0].port(), 9123);
        assert_eq!(lights[0].server(), "a.local.");
        assert_eq!(browser.closed(), 1);
    }

    #[tokio::test]
    async fn test_without_target_waits_for_timeout() {
        let browser = FakeBrowser::new(vec![announce(100, "a", 0), announce(3000, "late", 0)]);
        let config = DiscoveryConfig::new().timeout(Duration::from_millis(500));

        let start = Instant::now();
        let lights = discover_with(Arc::clone(&browser), &config).await.unwrap();
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(500));
        assert!(elapsed < Duration::from_millis(1500));
        assert_eq!(names(&lights), ["a"]);
        assert_eq!(browser.closed(), 1);
    }

    #[tokio::test]
    async fn test_nothing_found_is_not_an_error() {
        let browser = FakeBrowser::new(vec![]);
        let config = DiscoveryConfig::new().timeout(Duration::from_millis(200));

        let lights = discover_with(Arc::clone(&browser), &config).await.unwrap();

        assert!(lights.is_empty());
        assert_eq!(browser.closed(), 1);
    }

    #[tokio::test]
    async fn test_in_flight_resolutions_are_awaited() {
        let browser = FakeBrowser::new(vec![announce(0, "slow", 400)]);
        let config = DiscoveryConfig::new()
            .target_count(1)
            .timeout(Duration::from_secs(5));

        let start = Instant::now();
        let lights = discover_with(browser, &config).await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(400));
        assert_eq!(names(&lights), ["slow"]);
    }

    #[tokio::test]
    async fn test_can_exceed_target_count() {
        let browser = FakeBrowser::new(vec![
            announce(0, "a", 0),
            announce(0, "b", 0),
            announce(0, "c", 0),
        ]);
        let config = DiscoveryConfig::new()
            .target_count(1)
            .poll_interval(Duration::from_millis(200))
            .timeout(Duration::from_secs(5));

        let lights = discover_with(browser, &config).await.unwrap();

        assert_eq!(names(&lights), ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_bad_records_do_not_sink_discovery() {
        let mut corrupt = announce(0, "corrupt", 0);
        corrupt.address = ResolvedAddress::Octets(vec![10, 0, 0]);
        let browser = FakeBrowser::new(vec![announce(0, "good", 0), corrupt]);
        // An announced name the browser cannot resolve.
        browser
            .schedule
            .lock()
            .unwrap()
            .push((Duration::ZERO, "vanished"));
        let config = DiscoveryConfig::new()
            .target_count(3)
            .timeout(Duration::from_secs(5));

        let lights = discover_with(Arc::clone(&browser), &config).await.unwrap();

        assert_eq!(names(&lights), ["good"]);
        assert_eq!(browser.closed(), 1);
    }

    #[tokio::test]
    async fn test_panicking_resolution_is_skipped() {
        let mut boom = announce(0, "boom", 20);
        boom.panics = true;
        let browser = FakeBrowser::new(vec![
            announce(0, "good", 0),
            boom,
            announce(0, "other", 40),
        ]);
        let config = DiscoveryConfig::new()
            .target_count(3)
            .timeout(Duration::from_secs(5));

        let lights = discover_with(Arc::clone(&browser), &config).await.unwrap();

        assert_eq!(names(&lights), ["good", "other"]);
        assert_eq!(browser.closed(), 1);
    }

    #[tokio::test]
    async fn test_repeated_announcements_resolve_once() {
        let browser = FakeBrowser::new(vec![
            announce(0, "a", 0),
            announce(50, "a", 0),
            announce(100, "b", 0),
        ]);
        let config = DiscoveryConfig::new()
            .target_count(2)
            .timeout(Duration::from_secs(5));

        let lights = discover_with(Arc::clone(&browser), &config).await.unwrap();

        assert_eq!(names(&lights), ["a", "b"]);
    }

    #[tokio::test]
    async fn test_zero_target_returns_immediately() {
        let browser = FakeBrowser::new(vec![announce(100, "a", 0)]);
        let config = DiscoveryConfig::new()
            .target_count(0)
            .timeout(Duration::from_secs(5));

        let start = Instant::now();
        let lights = discover_with(Arc::clone(&browser), &config).await.unwrap();

        assert!(start.elapsed() < Duration::from_millis(100));
        assert!(lights.is_empty());
        assert_eq!(browser.closed(), 1);
    }

    #[tokio::test]
    async fn test_browse_failure_still_closes() {
        struct Broken(AtomicUsize);

        impl ServiceBrowser for Broken {
            fn browse(&self, _: &str) -> Result<UnboundedReceiver<String>> {
                Err(Error::Mdns("no interface".into()))
            }

            async fn resolve(&self, name: &str) -> Result<ResolvedService> {
                Err(Error::ResolveTimeout(name.to_string()))
            }

            fn close(&self) -> Result<()> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }

        let browser = Arc::new(Broken(AtomicUsize::new(0)));
        let err = discover_with(Arc::clone(&browser), &DiscoveryConfig::new())
            .await
            .unwrap_err();

        assert_eq!(err, Error::Mdns("no interface".into()));
        assert_eq!(browser.0.load(Ordering::SeqCst), 1);
    }
}
