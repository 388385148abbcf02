#![allow(dead_code)]

pub mod http {
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    /// Send a raw request and read until the server closes the connection
    /// or `wait` passes without it doing so.
    ///
    /// Returns the bytes received and whether the server closed the socket.
    pub async fn exchange(addr: SocketAddr, req: &str, wait: Duration) -> (String, bool) {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(req.as_bytes()).await.unwrap();
        read_until_close(&mut stream, wait).await
    }

    /// Send a request with `Connection: close` semantics and return the response text.
    pub async fn send_request(addr: SocketAddr, req: &str) -> String {
        let (resp, _closed) = exchange(addr, req, Duration::from_secs(5)).await;
        resp
    }

    pub async fn read_until_close(stream: &mut TcpStream, wait: Duration) -> (String, bool) {
        let mut buf = Vec::new();
        let closed = tokio::time::timeout(wait, async {
            let mut tmp = [0u8; 1024];
            loop {
                match stream.read(&mut tmp).await {
                    Ok(0) => return true,
                    Ok(n) => buf.extend_from_slice(&tmp[..n]),
                    Err(_) => return true,
                }
            }
        })
        .await
        .unwrap_or(false);
        (String::from_utf8_lossy(&buf).to_string(), closed)
    }

    pub fn get(path: &str) -> String {
        format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
    }

    pub fn delete(path: &str) -> String {
        format!("DELETE {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
    }

    /// Split a raw HTTP/1.1 response into status, lowercase headers and body.
    pub fn parse_response_parts(resp: &str) -> (u16, HashMap<String, String>, String) {
        let mut parts = resp.splitn(2, "\r\n\r\n");
        let head = parts.next().unwrap_or("");
        let body = parts.next().unwrap_or("").to_string();
        let mut status = 0;
        let mut headers = HashMap::new();
        for line in head.lines() {
            if line.starts_with("HTTP/1.1") {
                status = line
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("0")
                    .parse()
                    .unwrap();
            } else if let Some((name, val)) = line.split_once(':') {
                headers.insert(name.trim().to_ascii_lowercase(), val.trim().to_string());
            }
        }
        (status, headers, body)
    }

    pub fn parse_response(resp: &str) -> (u16, serde_json::Value) {
        let (status, headers, body) = parse_response_parts(resp);
        let is_json = headers
            .get("content-type")
            .is_some_and(|ct| ct.starts_with("application/json"));
        if is_json {
            (status, serde_json::from_str(&body).unwrap_or_default())
        } else {
            (status, serde_json::Value::String(body))
        }
    }
}

pub mod test_server {
    use action_api::runtime_config::ServerConfig;
    use action_api::server::{HttpServer, ServerHandle};
    use axum::Router;
    use std::net::SocketAddr;

    /// Running server on an ephemeral loopback port.
    ///
    /// Dropping the fixture aborts the server so a failing test cannot leak
    /// a listener into the next one.
    pub struct TestServer {
        handle: Option<ServerHandle>,
        addr: SocketAddr,
    }

    pub fn local_config() -> ServerConfig {
        ServerConfig::default().with_addr(SocketAddr::from(([127, 0, 0, 1], 0)))
    }

    impl TestServer {
        pub async fn start(router: Router, config: ServerConfig) -> Self {
            let handle = HttpServer::new(router, config).start().await.unwrap();
            let addr = handle.local_addr();
            Self {
                handle: Some(handle),
                addr,
            }
        }

        pub fn addr(&self) -> SocketAddr {
            self.addr
        }

        pub fn handle(&self) -> &ServerHandle {
            self.handle.as_ref().unwrap()
        }

        /// Hand the server over to the test, e.g. to drive `shutdown`.
        pub fn take_handle(&mut self) -> ServerHandle {
            self.handle.take().unwrap()
        }
    }

    impl Drop for TestServer {
        fn drop(&mut self) {
            if let Some(handle) = self.handle.take() {
                handle.abort();
            }
        }
    }
}
