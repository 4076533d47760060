//! Command line interface for the `fraglink` binary.
//!
//! The same definition feeds the man page generated by `build.rs`, so this
//! module depends on nothing but `clap` and the standard library.

use std::{
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    num::NonZeroUsize,
    path::PathBuf,
};

use clap::{Args, Parser, Subcommand};

/// UDP port used when no address is given.
pub const DEFAULT_PORT: u16 = 1995;

/// Command line arguments for the `fraglink` binary.
#[derive(Debug, Parser)]
#[command(
    name = "fraglink",
    version,
    about = "Send and receive messages larger than one datagram over UDP"
)]
pub struct Cli {
    #[command(flatten)]
    pub link: LinkArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Settings shared by both ends of a link.
#[derive(Debug, Args)]
pub struct LinkArgs {
    /// Largest datagram in bytes, header included.
    #[arg(long, global = true, default_value = "2047")]
    pub mtu: NonZeroUsize,

    /// Fragments the receive pool may hold before evicting.
    #[arg(long, global = true, default_value = "1000")]
    pub pool: NonZeroUsize,

    /// Identifier stamped on outbound fragments.
    #[arg(long, global = true, default_value_t = 0)]
    pub message_id: u16,

    /// Encode fragment headers little-endian instead of network order.
    #[arg(long, global = true)]
    pub little_endian: bool,

    /// Serve Prometheus metrics on this address.
    #[arg(long, global = true)]
    pub metrics_addr: Option<SocketAddr>,
}

/// Operating mode.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every message received.
    Listen {
        /// Address to bind.
        #[arg(long, default_value_t = any_addr())]
        bind: SocketAddr,

        /// Echo each message back to its sender.
        #[arg(long)]
        echo: bool,
    },
    /// Send the contents of a file as one message.
    Send {
        /// Address to bind locally.
        #[arg(long, default_value = "0.0.0.0:0")]
        bind: SocketAddr,

        /// Destination address.
        #[arg(long, default_value_t = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, DEFAULT_PORT)))]
        to: SocketAddr,

        /// File whose bytes form the message.
        file: PathBuf,
    },
}

fn any_addr() -> SocketAddr { SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)) }

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command};

    #[test]
    fn listen_defaults_to_port_1995() {
        let cli = Cli::parse_from(["fraglink", "listen"]);
        assert_eq!(cli.link.mtu.get(), 2047);
        assert_eq!(cli.link.pool.get(), 1000);
        assert!(!cli.link.little_endian);
        match cli.command {
            Command::Listen { bind, echo } => {
                assert_eq!(bind.port(), 1995);
                assert!(!echo);
            }
            Command::Send { .. } => panic!("expected listen"),
        }
    }

    #[test]
    fn parses_send_with_link_flags() {
        let cli = Cli::parse_from([
            "fraglink",
            "send",
            "--to",
            "127.0.0.1:4000",
            "--mtu",
            "512",
            "--little-endian",
            "payload.bin",
        ]);
        assert_eq!(cli.link.mtu.get(), 512);
        assert!(cli.link.little_endian);
        match cli.command {
            Command::Send { to, file, .. } => {
                assert_eq!(to.port(), 4000);
                assert_eq!(file.to_str(), Some("payload.bin"));
            }
            Command::Listen { .. } => panic!("expected send"),
        }
    }
}
