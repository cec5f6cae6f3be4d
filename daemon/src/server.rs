use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use pancake_core::Baker;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::time::{timeout, Duration};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::protocol::{
    DaemonRequest, DaemonResponse, ErrorCode, ErrorResponse, RequestBody, ResponseBody,
};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

pub struct BakerServer {
    config: ServerConfig,
    baker: Arc<Baker>,
}

impl BakerServer {
    pub fn new(config: ServerConfig, baker: Baker) -> Self {
        Self {
            config,
            baker: Arc::new(baker),
        }
    }

    pub async fn run(&self) -> Result<()> {
        let addr = self.config.listen_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind tcp listener at {addr}"))?;
        info!("pancake baker listening on {addr}");

        let idle_timeout = idle_timeout(self.config.idle_timeout_ms);
        loop {
            let Some((stream, peer)) = accepted(listener.accept().await) else {
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            };
            debug!(%peer, "client connected");
            let baker = self.baker.clone();
            tokio::spawn(async move {
                match handle_connection(stream, baker, idle_timeout).await {
                    Ok(()) => debug!(%peer, "client disconnected"),
                    Err(error) => warn!(%peer, "connection closed with error: {error:#}"),
                }
            });
        }
    }
}

// EMFILE, ECONNABORTED and friends must not take the listener down.
fn accepted<T>(result: io::Result<T>) -> Option<T> {
    match result {
        Ok(connection) => Some(connection),
        Err(error) => {
            warn!("failed to accept connection: {error}");
            None
        }
    }
}

fn idle_timeout(idle_timeout_ms: u64) -> Option<Duration> {
    (idle_timeout_ms > 0).then(|| Duration::from_millis(idle_timeout_ms))
}

async fn handle_connection<S>(
    stream: S,
    baker: Arc<Baker>,
    idle_timeout: Option<Duration>,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut lines = BufReader::new(reader).lines();

    loop {
        let next = match idle_timeout {
            Some(limit) => match timeout(limit, lines.next_line()).await {
                Ok(line) => line?,
                Err(_) => {
                    debug!("closing idle connection after {}ms", limit.as_millis());
                    break;
                }
            },
            None => lines.next_line().await?,
        };
        let Some(line) = next else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = process_line(&line, &baker);
        let payload = serde_json::to_string(&response)?;
        writer.write_all(payload.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    Ok(())
}

fn process_line(line: &str, baker: &Baker) -> DaemonResponse {
    match serde_json::from_str::<DaemonRequest>(line) {
        Ok(request) => handle_request(request, baker),
        Err(error) => {
            error!("invalid request JSON: {error}");
            DaemonResponse {
                id: String::new(),
                body: ResponseBody::Error(ErrorResponse {
                    code: ErrorCode::InvalidRequest,
                    message: format!("invalid JSON payload: {error}"),
                }),
            }
        }
    }
}

fn handle_request(request: DaemonRequest, baker: &Baker) -> DaemonResponse {
    let id = request.id;
    let body = match request.body {
        RequestBody::Ping => ResponseBody::Pong,
        RequestBody::Bake(bake_request) => match baker.bake(&bake_request) {
            Ok(response) => ResponseBody::Bake(response),
            Err(error) => ResponseBody::Error(error.into()),
        },
        RequestBody::Report(report_request) => {
            ResponseBody::Report(baker.report(&report_request))
        }
    };
    DaemonResponse { id, body }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pancake_core::protocol::{BakeRequest, ReportRequest};
    use pancake_core::{Menu, CHEF_NAME};

    #[test]
    fn handles_ping() {
        let baker = Baker::with_seed(1);
        let request = DaemonRequest {
            id: "1".to_string(),
            body: RequestBody::Ping,
        };

        let response = handle_request(request, &baker);
        assert!(matches!(response.body, ResponseBody::Pong));
        assert_eq!(response.id, "1");
    }

    #[test]
    fn handles_bake() {
        let baker = Baker::with_seed(1);
        let request = DaemonRequest {
            id: "2".to_string(),
            body: RequestBody::Bake(BakeRequest::new(Menu::BaconAndCheese)),
        };

        let response = handle_request(request, &baker);
        assert_eq!(response.id, "2");
        match response.body {
            ResponseBody::Bake(baked) => {
                assert_eq!(baked.pancake.menu, Menu::BaconAndCheese);
                assert_eq!(baked.pancake.chef_name, CHEF_NAME);
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_menu() {
        let baker = Baker::with_seed(1);
        let request = DaemonRequest {
            id: "3".to_string(),
            body: RequestBody::Bake(BakeRequest { menu: 0 }),
        };

        match handle_request(request, &baker).body {
            ResponseBody::Error(error) => assert_eq!(error.code, ErrorCode::InvalidArgument),
            other => panic!("unexpected response: {other:?}"),
        }
        let report = baker.report(&ReportRequest::default()).report;
        assert!(report.bake_counts.is_empty());
    }

    #[test]
    fn malformed_json_is_invalid_request() {
        let baker = Baker::with_seed(1);
        let response = process_line("{not json", &baker);
        assert!(response.id.is_empty());
        match response.body {
            ResponseBody::Error(error) => assert_eq!(error.code, ErrorCode::InvalidRequest),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn unknown_menu_name_is_invalid_request() {
        let baker = Baker::with_seed(1);
        let response = process_line(r#"{"id":"4","type":"bake","menu":"WAFFLE"}"#, &baker);
        match response.body {
            ResponseBody::Error(error) => assert_eq!(error.code, ErrorCode::InvalidRequest),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn serves_a_jsonl_session() {
        let baker = Arc::new(Baker::with_seed(5));
        let (client, server) = tokio::io::duplex(4096);
        let session = tokio::spawn(handle_connection(server, baker.clone(), None));

        let (reader, mut writer) = tokio::io::split(client);
        let mut lines = BufReader::new(reader).lines();
        writer
            .write_all(
                concat!(
                    r#"{"id":"a","type":"bake","menu":"CLASSIC"}"#,
                    "\n\n",
                    r#"{"id":"b","type":"bake","menu":1}"#,
                    "\n",
                    r#"{"id":"c","type":"report"}"#,
                    "\n",
                )
                .as_bytes(),
            )
            .await
            .unwrap();

        let mut responses = Vec::new();
        for _ in 0..3 {
            let line = lines.next_line().await.unwrap().unwrap();
            responses.push(serde_json::from_str::<DaemonResponse>(&line).unwrap());
        }
        writer.shutdown().await.unwrap();
        session.await.unwrap().unwrap();

        let ids: Vec<&str> = responses.iter().map(|response| response.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        match &responses[2].body {
            ResponseBody::Report(report) => {
                assert_eq!(report.report.count_of(Menu::Classic), Some(2));
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn drops_idle_connections() {
        let baker = Arc::new(Baker::with_seed(5));
        let (_client, server) = tokio::io::duplex(64);
        let result = handle_connection(server, baker, Some(Duration::from_millis(20))).await;
        assert!(result.is_ok());
    }

    #[test]
    fn accept_errors_do_not_stop_the_listener() {
        let exhausted = io::Error::from_raw_os_error(24);
        assert_eq!(accepted::<u8>(Err(exhausted)), None);
        let aborted = io::Error::from(io::ErrorKind::ConnectionAborted);
        assert_eq!(accepted::<u8>(Err(aborted)), None);
        assert_eq!(accepted(Ok(7u8)), Some(7));
    }

    #[tokio::test]
    async fn listener_keeps_serving_after_accepts() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let baker = Arc::new(Baker::with_seed(9));
        let server = tokio::spawn(async move {
            for _ in 0..2 {
                if let Some((stream, _)) = accepted(listener.accept().await) {
                    handle_connection(stream, baker.clone(), None).await.unwrap();
                }
            }
        });

        for id in ["first", "second"] {
            let stream = tokio::net::TcpStream::connect(addr).await.unwrap();
            let (reader, mut writer) = stream.into_split();
            let request = format!("{{\"id\":\"{id}\",\"type\":\"ping\"}}\n");
            writer.write_all(request.as_bytes()).await.unwrap();
            let line = BufReader::new(reader).lines().next_line().await.unwrap().unwrap();
            let response: DaemonResponse = serde_json::from_str(&line).unwrap();
            assert_eq!(response.id, id);
            assert!(matches!(response.body, ResponseBody::Pong));
            writer.shutdown().await.unwrap();
        }
        server.await.unwrap();
    }

    #[test]
    fn zero_idle_timeout_disables_it() {
        assert_eq!(idle_timeout(0), None);
        assert_eq!(idle_timeout(250), Some(Duration::from_millis(250)));
    }
}
