//! mDNS/DNS-SD browsing for Elgato lights.

use std::collections::HashMap;
use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use futures::channel::mpsc::{self, UnboundedReceiver};
use log::debug;
use mdns_sd::{ServiceDaemon, ServiceEvent, ServiceInfo};

use crate::config::DiscoveryConfig;
use crate::errors::Error;
use crate::runtime::{self, Instant, Mutex, Notify};

type Result<T> = std::result::Result<T, Error>;

/// Address of a resolved service, as the browser reported it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedAddress {
    Ip(IpAddr),
    /// Raw network-order octets: 4 for IPv4, 16 for IPv6.
    Octets(Vec<u8>),
    Text(String),
}

impl ResolvedAddress {
    /// Standard textual form of the address.
    ///
    /// # Examples
    ///
    /// ```
    /// use elgato_lights_rs::ResolvedAddress;
    ///
    /// let raw = ResolvedAddress::Octets(vec![192, 168, 1, 20]);
    /// assert_eq!(raw.normalize().unwrap(), "192.168.1.20");
    /// assert!(ResolvedAddress::Octets(vec![1, 2, 3]).normalize().is_err());
    /// ```
    pub fn normalize(&self) -> Result<String> {
        match self {
            ResolvedAddress::Ip(ip) => Ok(ip.to_string()),
            ResolvedAddress::Octets(octets) => match octets.len() {
                4 => {
                    let mut buf = [0u8; 4];
                    buf.copy_from_slice(octets);
                    Ok(Ipv4Addr::from(buf).to_string())
                }
                16 => {
                    let mut buf = [0u8; 16];
                    buf.copy_from_slice(octets);
                    Ok(Ipv6Addr::from(buf).to_string())
                }
                n => Err(Error::InvalidAddress(format!("{} raw address bytes", n))),
            },
            ResolvedAddress::Text(text) if text.is_empty() => {
                Err(Error::InvalidAddress("empty address".to_string()))
            }
            ResolvedAddress::Text(text) => Ok(text.clone()),
        }
    }
}

/// Connection details for one discovered service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedService {
    pub address: ResolvedAddress,
    pub port: u16,
    /// Full service instance name.
    pub name: String,
    /// Host name of the advertising server.
    pub server: String,
}

/// Source of discovered services.
///
/// `browse` yields service names as they are announced. `resolve` turns one
/// of those names into connection details. `close` releases whatever the
/// browser holds and is called exactly once per discovery run.
pub trait ServiceBrowser: Send + Sync + 'static {
    fn browse(&self, service_type: &str) -> Result<UnboundedReceiver<String>>;

    fn resolve(&self, name: &str) -> impl Future<Output = Result<ResolvedService>> + Send;

    fn close(&self) -> Result<()>;
}

/// Services the daemon has resolved so far, keyed by full name.
#[derive(Default)]
struct Resolved {
    services: Mutex<HashMap<String, ResolvedService>>,
    changed: Notify,
}

impl Resolved {
    /// Record a resolution and wake every pending `wait_for`.
    fn insert(&self, service: ResolvedService) {
        self.services
            .blocking_lock()
            .insert(service.name.clone(), service);
        self.changed.notify_waiters();
    }

    /// Wait until `name` has been resolved, giving up after `timeout`.
    async fn wait_for(&self, name: &str, timeout: Duration) -> Result<ResolvedService> {
        let start = Instant::now();
        loop {
            // Register interest before checking, so a resolution landing in
            // between is not missed.
            let changed = self.changed.notified();
            if let Some(service) = self.services.lock().await.get(name) {
                return Ok(service.clone());
            }
            let remaining = timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                return Err(Error::ResolveTimeout(name.to_string()));
            }
            // Timing out here just loops back to the final check above.
            let _ = runtime::timeout(remaining, changed).await;
        }
    }
}

/// [`ServiceBrowser`] backed by an `mdns-sd` daemon.
///
/// The daemon resolves services on its own; `resolve` waits until it has
/// done so for the requested name, up to the resolve timeout.
pub struct MdnsBrowser {
    daemon: ServiceDaemon,
    resolved: Arc<Resolved>,
    resolve_timeout: Duration,
}

impl MdnsBrowser {
    pub fn new(config: &DiscoveryConfig) -> Result<Self> {
        let daemon = ServiceDaemon::new().map_err(Error::mdns)?;
        Ok(MdnsBrowser {
            daemon,
            resolved: Arc::new(Resolved::default()),
            resolve_timeout: config.get_resolve_timeout(),
        })
    }
}

impl ServiceBrowser for MdnsBrowser {
    fn browse(&self, service_type: &str) -> Result<UnboundedReceiver<String>> {
        let events = self.daemon.browse(service_type).map_err(Error::mdns)?;
        let (names, rx) = mpsc::unbounded();
        let resolved = Arc::clone(&self.resolved);

        // mdns-sd hands out a blocking channel, so pump it from a plain
        // thread. Ends when the daemon shuts down and drops its sender.
        thread::spawn(move || {
            while let Ok(event) = events.recv() {
                match event {
                    ServiceEvent::ServiceFound(ty, fullname) => {
                        debug!("Adding service {}-{}", ty, fullname);
                        if names.unbounded_send(fullname).is_err() {
                            debug!("Discovery no longer listening for new names");
                        }
                    }
                    ServiceEvent::ServiceResolved(info) => {
                        debug!("Resolved service {}", info.get_fullname());
                        resolved.insert(resolved_service(&info));
                    }
                    other => debug!("mDNS event: {:?}", other),
                }
            }
        });

        Ok(rx)
    }

    async fn resolve(&self, name: &str) -> Result<ResolvedService> {
        self.resolved.wait_for(name, self.resolve_timeout).await
    }

    fn close(&self) -> Result<()> {
        self.daemon.shutdown().map_err(Error::mdns)?;
        Ok(())
    }
}

// Elgato lights also advertise IPv6 addresses that are frequently not
// routable, so an IPv4 address wins when there is one.
fn resolved_service(info: &ServiceInfo) -> ResolvedService {
    let addresses = info.get_addresses();
    let address = addresses
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addresses.iter().next())
        .map(|ip| ResolvedAddress::Ip(*ip))
        .unwrap_or_else(|| ResolvedAddress::Text(String::new()));

    ResolvedService {
        address,
        port: info.get_port(),
        name: info.get_fullname().to_string(),
        server: info.get_hostname().to_string(),
    }
}
