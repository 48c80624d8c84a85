//! Entry point for the hostwatch read API + dashboard. Thin and stateless:
//! every endpoint is a parameterized query over the usage store.

mod dashboard;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use hostwatch_collector::config::{DbConfig, LogConfig};
use hostwatch_collector::logging;
use hostwatch_collector::store::MySqlStore;

struct ParsedArgs {
    port: Option<u16>,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<ParsedArgs, String> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "hostwatch".into());
    let mut port: Option<u16> = None;

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                return Err(format!("Usage: {prog} [--port PORT|-p PORT]"));
            }
            "--port" | "-p" => {
                port = it.next().and_then(|v| v.parse().ok());
            }
            _ if arg.starts_with("--port=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    port = v.parse().ok();
                }
            }
            _ => {
                return Err(format!(
                    "Unexpected argument. Usage: {prog} [--port PORT|-p PORT]"
                ));
            }
        }
    }
    Ok(ParsedArgs { port })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let parsed = match parse_args(std::env::args()) {
        Ok(v) => v,
        Err(msg) => {
            eprintln!("{msg}");
            return Ok(());
        }
    };

    logging::init(&LogConfig::from_env())?;

    let default_port: u16 = std::env::var("HTTP_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5001);
    let port = parsed.port.unwrap_or(default_port);

    let store = Arc::new(MySqlStore::from_config(&DbConfig::from_env()));
    let app = routes::router(store);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("read API listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_long_short_and_assign() {
        let parse = |args: Vec<&str>| {
            parse_args(args.into_iter().map(String::from))
                .map(|p| p.port)
        };
        assert_eq!(parse(vec!["hostwatch", "--port", "9001"]), Ok(Some(9001)));
        assert_eq!(parse(vec!["hostwatch", "-p", "9002"]), Ok(Some(9002)));
        assert_eq!(parse(vec!["hostwatch", "--port=9003"]), Ok(Some(9003)));
        assert_eq!(parse(vec!["hostwatch"]), Ok(None));
    }

    #[test]
    fn help_and_unexpected_args_return_usage() {
        let parse = |args: Vec<&str>| parse_args(args.into_iter().map(String::from));
        assert!(parse(vec!["hostwatch", "--help"])
            .err()
            .is_some_and(|m| m.contains("Usage:")));
        assert!(parse(vec!["hostwatch", "bogus"])
            .err()
            .is_some_and(|m| m.contains("Usage:")));
    }
}
