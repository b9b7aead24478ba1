// Connectivity monitor: periodically probes the API host and reports changes
// to the coordinator. It never touches an in-flight fetch.
use crate::coordinator::Command;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, timeout};
use url::Url;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Host and port the probe connects to, taken from the API base URL.
pub fn endpoint_of(base_url: &str) -> Option<(String, u16)> {
    let url = Url::parse(base_url).ok()?;
    let host = url.host_str()?.to_string();
    let port = url.port_or_known_default()?;
    Some((host, port))
}

/// True if a TCP connection to `host:port` opens within the probe timeout.
pub async fn probe(host: &str, port: u16) -> bool {
    matches!(
        timeout(PROBE_TIMEOUT, TcpStream::connect((host, port))).await,
        Ok(Ok(_))
    )
}

/// Spawns the monitor. Only transitions are sent, starting with the first
/// probe result. The task ends when the coordinator's command channel closes.
pub fn spawn_reachability_monitor(
    host: String,
    port: u16,
    every: Duration,
    commands: mpsc::Sender<Command>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last: Option<bool> = None;
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let reachable = probe(&host, port).await;
            if last == Some(reachable) {
                continue;
            }
            log::debug!("Probe {}:{} -> {}", host, port, reachable);
            if commands.send(Command::Reachability(reachable)).await.is_err() {
                break;
            }
            last = Some(reachable);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn endpoint_uses_known_default_port() {
        assert_eq!(
            endpoint_of("https://open.neis.go.kr/hub/"),
            Some(("open.neis.go.kr".to_string(), 443))
        );
        assert_eq!(
            endpoint_of("http://127.0.0.1:8080/hub/"),
            Some(("127.0.0.1".to_string(), 8080))
        );
        assert_eq!(endpoint_of("not a url"), None);
    }

    #[tokio::test]
    async fn probe_detects_open_and_closed_ports() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        assert!(probe("127.0.0.1", port).await);

        drop(listener);
        assert!(!probe("127.0.0.1", port).await);
    }

    #[tokio::test]
    async fn monitor_reports_first_state() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (tx, mut rx) = mpsc::channel(4);

        let handle =
            spawn_reachability_monitor("127.0.0.1".into(), port, Duration::from_secs(60), tx);
        assert_eq!(rx.recv().await, Some(Command::Reachability(true)));

        handle.abort();
    }
}
