//! go-plugin server bootstrap: handshake cookie check, loopback listener,
//! handshake line on stdout, then gRPC serving until the client goes away.

use std::env;
use std::io::{self, Write as _};
use std::net::{Ipv4Addr, SocketAddr};

use anyhow::{bail, Context, Result};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tracing::info;

use crate::grpc::ProviderServer;
use crate::provider::MemoryProvider;

/// go-plugin core protocol version, fixed at 1.
const CORE_PROTOCOL_VERSION: u32 = 1;

/// Terraform plugin protocol version this provider registers under.
const PROTOCOL_VERSION: u32 = 6;

// The client and server must both agree on the cookie key and value so that
// the server can detect whether it is running as a child process of its
// expected client.
const MAGIC_COOKIE_KEY: &str = "TF_PLUGIN_MAGIC_COOKIE";
const MAGIC_COOKIE_VALUE: &str =
    "d602bf8f470bc67ca7faa0386276bbdd4330efaf76d1a219cb4d6991ca9872b2";

/// Serve the provider until the client disconnects or kills the process.
pub async fn serve(provider: MemoryProvider) -> Result<()> {
    check_magic_cookie()?;

    let listener = bind_listener().await?;
    let addr = listener
        .local_addr()
        .context("Could not determine listen address")?;

    // The client blocks on this line; everything else must go to stderr.
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", handshake_line(&addr)).context("Could not write handshake")?;
    stdout.flush().context("Could not flush handshake")?;

    info!(%addr, "provider listening");

    Server::builder()
        .add_service(ProviderServer::new(provider))
        .serve_with_incoming(TcpListenerStream::new(listener))
        .await
        .context("gRPC server failed")?;

    Ok(())
}

/// Handshake format:
/// CORE-PROTOCOL-VERSION | APP-PROTOCOL-VERSION | NETWORK-TYPE | NETWORK-ADDR | PROTOCOL
fn handshake_line(addr: &SocketAddr) -> String {
    format!(
        "{}|{}|tcp|{}|grpc",
        CORE_PROTOCOL_VERSION, PROTOCOL_VERSION, addr
    )
}

fn check_magic_cookie() -> Result<()> {
    match env::var(MAGIC_COOKIE_KEY) {
        Ok(value) if value == MAGIC_COOKIE_VALUE => Ok(()),
        _ => bail!(
            "This binary is a plugin; it is not meant to be executed directly. \
             Run the program that consumes this plugin instead."
        ),
    }
}

/// Bind a loopback listener, honoring the client's PLUGIN_MIN_PORT and
/// PLUGIN_MAX_PORT range when both are set.
async fn bind_listener() -> Result<TcpListener> {
    match (env_port("PLUGIN_MIN_PORT")?, env_port("PLUGIN_MAX_PORT")?) {
        (Some(min), Some(max)) => {
            if min > max {
                bail!("PLUGIN_MIN_PORT {} exceeds PLUGIN_MAX_PORT {}", min, max);
            }
            for port in min..=max {
                if let Ok(listener) = TcpListener::bind((Ipv4Addr::LOCALHOST, port)).await {
                    return Ok(listener);
                }
            }
            bail!("No free port between {} and {}", min, max)
        }
        _ => TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .context("Could not bind loopback listener"),
    }
}

fn env_port(name: &str) -> Result<Option<u16>> {
    match env::var(name) {
        Ok(value) => {
            let port = value
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid {} value: {:?}", name, value))?;
            Ok(Some(port))
        }
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_line() {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        assert_eq!(handshake_line(&addr), "1|6|tcp|127.0.0.1:12345|grpc");
    }
}
