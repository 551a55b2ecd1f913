use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{middleware, web, App, HttpServer};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

type Routes = Arc<dyn Fn(&mut web::ServiceConfig) + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

/// An HTTP server that runs until a shutdown future resolves.
#[derive(Clone)]
pub struct Server {
    routes: Routes,
    host: String,
    port: u16,
    read_timeout: Duration,
    write_timeout: Duration,
    idle_timeout: Duration,
    shutdown_timeout: Duration,
}

impl Server {
    pub fn new<F>(routes: F) -> Self
    where
        F: Fn(&mut web::ServiceConfig) + Send + Sync + 'static,
    {
        Self {
            routes: Arc::new(routes),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    pub fn with_host_port(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Time allowed for a client to send the request head.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Time allowed for a client to acknowledge connection close.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Keep-alive duration for idle connections.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Grace period for in-flight requests once shutdown starts.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Serves until `shutdown` resolves, then stops gracefully.
    ///
    /// Must be called from within an actix system, e.g. under
    /// `#[actix_web::main]`.
    pub async fn serve<S>(self, shutdown: S) -> Result<(), ServerError>
    where
        S: Future<Output = ()> + 'static,
    {
        let addr = self.address();
        log::info!(address = addr.as_str(); "starting server");

        let routes = self.routes.clone();
        let server = HttpServer::new(move || {
            let routes = routes.clone();
            App::new()
                .wrap(middleware::Logger::default())
                .configure(move |cfg| routes(cfg))
        })
        .client_request_timeout(self.read_timeout)
        .client_disconnect_timeout(self.write_timeout)
        .keep_alive(self.idle_timeout)
        .shutdown_timeout(shutdown_secs(self.shutdown_timeout))
        .disable_signals()
        .bind((self.host.as_str(), self.port))
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?
        .run();

        let handle = server.handle();
        actix_web::rt::spawn(async move {
            shutdown.await;
            log::info!("shutting down server");
            handle.stop(true).await;
        });

        server.await.map_err(ServerError::Serve)?;
        log::info!(address = addr.as_str(); "server stopped");
        Ok(())
    }
}

/// actix takes whole seconds; partial seconds round up.
fn shutdown_secs(timeout: Duration) -> u64 {
    let secs = timeout.as_secs();
    if timeout.subsec_nanos() > 0 {
        secs.saturating_add(1)
    } else {
        secs
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("address", &self.address())
            .field("read_timeout", &self.read_timeout)
            .field("write_timeout", &self.write_timeout)
            .field("idle_timeout", &self.idle_timeout)
            .field("shutdown_timeout", &self.shutdown_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let server = Server::new(|_| {});
        assert_eq!(server.address(), "0.0.0.0:8080");
        assert_eq!(server.read_timeout, Duration::from_secs(1));
        assert_eq!(server.write_timeout, Duration::from_secs(1));
        assert_eq!(server.idle_timeout, Duration::from_secs(1));
        assert_eq!(server.shutdown_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_options() {
        let server = Server::new(|_| {})
            .with_host_port("127.0.0.1", 9000)
            .with_read_timeout(Duration::from_secs(2))
            .with_write_timeout(Duration::from_secs(3))
            .with_idle_timeout(Duration::from_secs(4))
            .with_shutdown_timeout(Duration::from_secs(10));

        assert_eq!(server.address(), "127.0.0.1:9000");
        assert_eq!(server.read_timeout, Duration::from_secs(2));
        assert_eq!(server.write_timeout, Duration::from_secs(3));
        assert_eq!(server.idle_timeout, Duration::from_secs(4));
        assert_eq!(server.shutdown_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_shutdown_secs_rounds_up() {
        assert_eq!(shutdown_secs(Duration::from_millis(500)), 1);
        assert_eq!(shutdown_secs(Duration::from_millis(1500)), 2);
        assert_eq!(shutdown_secs(Duration::from_secs(5)), 5);
        assert_eq!(shutdown_secs(Duration::ZERO), 0);
    }
}
