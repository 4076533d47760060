//! `fraglink` command line tool.
//!
//! `listen` prints every reassembled message arriving on a UDP port; `send`
//! fragments a file into datagrams and transmits it to a listener.

mod cli;

use std::{error::Error, net::SocketAddr, path::Path};

use clap::Parser;
use fraglink::{
    ByteOrder,
    LinkConfig,
    MessageId,
    link::Sender,
    transport::UdpTransport,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, LinkArgs};

type BoxError = Box<dyn Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    install_metrics(&cli.link)?;
    let config = link_config(&cli.link);
    config.validate()?;

    match cli.command {
        Command::Listen { bind, echo } => listen(config, bind, echo).await,
        Command::Send { bind, to, file } => send(config, bind, to, &file).await,
    }
}

fn link_config(args: &LinkArgs) -> LinkConfig {
    let order = if args.little_endian {
        ByteOrder::Little
    } else {
        ByteOrder::Big
    };
    LinkConfig::default()
        .with_mtu(args.mtu)
        .with_pool_capacity(args.pool)
        .with_byte_order(order)
        .with_message_id(MessageId::new(args.message_id))
}

#[cfg(feature = "metrics")]
fn install_metrics(args: &LinkArgs) -> Result<(), BoxError> {
    if let Some(addr) = args.metrics_addr {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
        info!(%addr, "serving metrics");
    }
    Ok(())
}

#[cfg(not(feature = "metrics"))]
fn install_metrics(args: &LinkArgs) -> Result<(), BoxError> {
    if args.metrics_addr.is_some() {
        warn!("built without the metrics feature; ignoring --metrics-addr");
    }
    Ok(())
}

async fn listen(config: LinkConfig, bind: SocketAddr, echo: bool) -> Result<(), BoxError> {
    let transport = UdpTransport::bind(bind, config.mtu()).await?;
    info!(addr = %transport.local_addr()?, "listening");
    let mut receiver = config.receiver(transport)?;

    loop {
        let message = tokio::select! {
            message = receiver.receive_next() => message?,
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                return Ok(());
            }
        };
        let peer = receiver.source().last_peer();
        info!(
            message_id = %message.message_id(),
            fragments = message.fragment_count(),
            len = message.payload().len(),
            peer = ?peer,
            "message received"
        );
        println!("{}", String::from_utf8_lossy(message.payload()));

        if echo {
            let Some(sink) = receiver.source().reply_sink() else {
                continue;
            };
            let mut reply = config.sender(sink)?;
            if let Err(err) = reply.send(message.payload()).await {
                warn!(error = %err, "echo failed");
            }
        }
    }
}

async fn send(
    config: LinkConfig,
    bind: SocketAddr,
    to: SocketAddr,
    file: &Path,
) -> Result<(), BoxError> {
    let payload = tokio::fs::read(file).await?;
    let transport = UdpTransport::bind(bind, config.mtu()).await?;
    transport.connect(to).await?;

    let mut sender: Sender<UdpTransport> = config.sender(transport)?;
    let fragments = sender.send(&payload).await?;
    info!(%to, len = payload.len(), fragments, "message sent");
    Ok(())
}
