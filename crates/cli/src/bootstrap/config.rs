use net_dns_query_domain::{CliOverrides, Config, DEFAULT_DNS_PORT};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tracing::debug;

const RESOLV_CONF: &str = "/etc/resolv.conf";
const FALLBACK_SERVER: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Reads the config file and applies the command-line overrides.
pub fn load_config(path: Option<&str>, overrides: CliOverrides) -> anyhow::Result<Config> {
    Ok(Config::load(path, overrides)?)
}

/// Fills in the system nameservers when none are configured, then
/// validates. Runs once logging is up so the choice is visible.
pub fn finalize_config(mut config: Config) -> anyhow::Result<Config> {
    if config.resolver.servers.is_empty() {
        use_nameservers(&mut config, system_nameservers());
    }

    config.validate()?;
    Ok(config)
}

/// System nameservers always listen on the standard port; `--port` only
/// applies to servers given explicitly.
fn use_nameservers(config: &mut Config, nameservers: Vec<IpAddr>) {
    config.resolver.servers = nameservers
        .into_iter()
        .map(|ip| SocketAddr::new(ip, DEFAULT_DNS_PORT).to_string())
        .collect();
    debug!(servers = ?config.resolver.servers, "Using system nameservers");
}

fn system_nameservers() -> Vec<IpAddr> {
    let servers = std::fs::read_to_string(RESOLV_CONF)
        .map(|contents| parse_resolv_conf(&contents))
        .unwrap_or_default();

    if servers.is_empty() {
        vec![FALLBACK_SERVER]
    } else {
        servers
    }
}

/// `nameserver` entries of a resolv.conf, in file order. Link-local zone
/// suffixes (`%eth0`) are dropped and unparsable entries skipped.
fn parse_resolv_conf(contents: &str) -> Vec<IpAddr> {
    contents
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            match fields.next() {
                Some("nameserver") => fields.next(),
                _ => None,
            }
        })
        .filter_map(|addr| {
            let addr = addr.split('%').next().unwrap_or(addr);
            addr.parse::<IpAddr>().ok()
        })
        .collect()
}
