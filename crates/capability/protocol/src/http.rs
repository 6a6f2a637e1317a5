//! HTTP 驱动
//!
//! 按 `http://host[:port]/path` 发起请求，状态码与响应体交由分类器判定。

use crate::driver::TransportDriver;
use crate::error::TransportError;
use crate::types::{Endpoint, Frame, HttpRequestSpec, TransportReply};
use async_trait::async_trait;
use domain::Protocol;
use std::error::Error as _;
use std::io;
use std::time::Duration;
use tracing::debug;

pub struct HttpDriver {
    client: reqwest::Client,
    max_response_bytes: usize,
}

impl HttpDriver {
    pub fn new(max_response_bytes: usize) -> Result<Self, TransportError> {
        // 每条命令独立连接，不复用空闲连接
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|err| TransportError::Http(err.to_string()))?;
        Ok(Self {
            client,
            max_response_bytes: max_response_bytes.max(1),
        })
    }

    pub fn url(endpoint: &Endpoint, spec: &HttpRequestSpec) -> String {
        let path = if spec.path.starts_with('/') {
            spec.path.clone()
        } else {
            format!("/{}", spec.path)
        };
        format!("http://{}{}", endpoint.authority(), path)
    }

    async fn request(
        &self,
        endpoint: &Endpoint,
        spec: &HttpRequestSpec,
    ) -> Result<TransportReply, TransportError> {
        let method = reqwest::Method::from_bytes(spec.method.as_bytes())
            .map_err(|_| TransportError::Http(format!("invalid method `{}`", spec.method)))?;
        let url = Self::url(endpoint, spec);
        let mut builder = self.client.request(method, &url);
        if let Some(body) = &spec.body {
            builder = builder.body(body.clone());
        }
        let mut response = builder
            .send()
            .await
            .map_err(|err| map_reqwest_error(err, &endpoint.authority()))?;
        let status = response.status().as_u16();
        // 读满上限即停止，不等待剩余响应体
        let mut body = Vec::new();
        while body.len() < self.max_response_bytes {
            let chunk = response
                .chunk()
                .await
                .map_err(|err| map_reqwest_error(err, &endpoint.authority()))?;
            match chunk {
                Some(chunk) => body.extend_from_slice(&chunk),
                None => break,
            }
        }
        body.truncate(self.max_response_bytes);
        debug!(target: "devctl.protocol", url = %url, status, "http_response");
        Ok(TransportReply::http(status, body))
    }
}

fn map_reqwest_error(err: reqwest::Error, authority: &str) -> TransportError {
    if err.is_connect() {
        let mut source = err.source();
        while let Some(cause) = source {
            if let Some(io_err) = cause.downcast_ref::<io::Error>() {
                let io_err = io::Error::new(io_err.kind(), io_err.to_string());
                return TransportError::from_io(io_err, authority);
            }
            source = cause.source();
        }
        return TransportError::Refused(format!("{authority}: {err}"));
    }
    TransportError::Http(err.to_string())
}

#[async_trait]
impl TransportDriver for HttpDriver {
    fn protocol(&self) -> Protocol {
        Protocol::Http
    }

    async fn send(
        &self,
        endpoint: &Endpoint,
        frame: &Frame,
        timeout: Duration,
    ) -> Result<TransportReply, TransportError> {
        let Frame::Http(spec) = frame else {
            return Err(TransportError::FrameMismatch {
                protocol: Protocol::Http,
            });
        };
        match tokio::time::timeout(timeout, self.request(endpoint, spec)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(timeout.as_millis() as u64)),
        }
    }
}
