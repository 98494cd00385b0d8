use clap::Parser;
use net_dns_query_domain::{CliOverrides, Query, RecordType};
use net_dns_query_infrastructure::dns::{DnsResolver, NetworkTransport, ResolverOptions};
use output::OutputFormat;
use std::sync::Arc;
use tracing::{error, info};

mod bootstrap;
mod output;

#[derive(Parser)]
#[command(name = "net-dns-query")]
#[command(version)]
#[command(about = "net-dns-query: A tool to perform DNS queries for specific hostnames.")]
struct Cli {
    /// The hostname to query
    hostname: String,

    /// DNS record type (A, AAAA, CNAME, MX, TXT, NS, PTR, SOA, SRV, ANY or TYPEnnn)
    #[arg(short = 't', long = "type", value_name = "TYPE", default_value = "A")]
    record_type: RecordType,

    /// DNS server to query; repeat to try several in order (default: system nameservers)
    #[arg(short = 's', long, value_name = "IP")]
    server: Vec<String>,

    /// DNS server port (default: 53)
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Query over TCP only
    #[arg(long)]
    tcp: bool,

    /// Per-attempt timeout in seconds (default: 5)
    #[arg(long)]
    timeout: Option<u64>,

    /// Number of passes over the server list (default: 3)
    #[arg(long)]
    retries: Option<u32>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        servers: cli.server.clone(),
        port: cli.port,
        timeout_secs: cli.timeout,
        retries: cli.retries,
        tcp_only: cli.tcp,
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config.logging);

    let config = bootstrap::finalize_config(config)?;

    let query = Query::new(&cli.hostname, cli.record_type)?;
    let options = ResolverOptions::from_config(&config.resolver)?;
    let resolver = DnsResolver::new(Arc::new(NetworkTransport::new()));

    info!(
        domain = %query.name(),
        record_type = %query.record_type(),
        servers = ?config.resolver.servers,
        "Querying"
    );

    let resolution = match resolver.resolve(&query, &options).await {
        Ok(resolution) => resolution,
        Err(e) => {
            for attempt in e.attempts() {
                error!(
                    server = %attempt.endpoint,
                    transport = attempt.transport,
                    latency_ms = attempt.latency_ms(),
                    outcome = ?attempt.outcome,
                    "Attempt"
                );
            }
            error!(error = %e, "DNS query failed");
            return Err(e.into());
        }
    };

    print!("{}", output::render(&query, &resolution, cli.output)?);
    Ok(())
}
