use drivedigest::{api, config, logging, processing};
use std::io::ErrorKind;
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Ports tried in order when `SERVER_PORT` is unset.
const FALLBACK_PORTS: RangeInclusive<u16> = 4100..=4199;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::init_config();
    logging::init_tracing();

    let orchestrator = processing::BatchOrchestrator::from_config()?;
    let app = api::create_router(Arc::new(orchestrator));

    let (listener, port) = match config::get_config().server_port {
        Some(port) => (TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await?, port),
        None => bind_first_free(FALLBACK_PORTS).await?,
    };
    tracing::info!(port, "drivedigest listening on http://0.0.0.0:{port}");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Walk `ports` and keep the first one nobody else holds. Errors other than
/// `AddrInUse` stop the search.
async fn bind_first_free(ports: RangeInclusive<u16>) -> std::io::Result<(TcpListener, u16)> {
    let (first, last) = (*ports.start(), *ports.end());
    for port in ports {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => {
                if port != first {
                    tracing::info!(port, skipped = port - first, "Preferred port busy");
                }
                return Ok((listener, port));
            }
            Err(err) if err.kind() == ErrorKind::AddrInUse => {}
            Err(err) => return Err(err),
        }
    }
    Err(std::io::Error::new(
        ErrorKind::AddrNotAvailable,
        format!("every port in {first}-{last} is taken; set SERVER_PORT"),
    ))
}
