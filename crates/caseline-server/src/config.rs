use std::net::{IpAddr, SocketAddr};

use caseline_db::DbConfig;
use clap::Args;

/// Server settings, from flags or the environment.
#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "CASELINE_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(long, env = "CASELINE_PORT", default_value = "3720")]
    pub port: u16,

    /// Postgres connection URL. SQLite is used when unset.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// SQLite database file
    #[arg(long, env = "CASELINE_SQLITE_PATH")]
    pub sqlite_path: Option<String>,

    /// Require `Authorization: Bearer <key>` on every route except /health
    #[arg(long, env = "CASELINE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            database_url: self.database_url.clone(),
            sqlite_path: self.sqlite_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: ServerConfig,
    }

    fn parse(args: &[&str]) -> Result<ServerConfig, clap::Error> {
        TestCli::try_parse_from(std::iter::once("caseline-server").chain(args.iter().copied()))
            .map(|cli| cli.config)
    }

    #[test]
    fn explicit_flags_are_used() {
        let config = parse(&[
            "--bind",
            "127.0.0.1",
            "--port",
            "9000",
            "--sqlite-path",
            "/tmp/c.db",
            "--database-url",
            "postgres://db/caseline",
            "--api-key",
            "k",
        ])
        .unwrap();
        assert_eq!(config.socket_addr(), "127.0.0.1:9000".parse().unwrap());
        let db = config.db_config();
        assert_eq!(db.sqlite_path.as_deref(), Some("/tmp/c.db"));
        assert_eq!(db.database_url.as_deref(), Some("postgres://db/caseline"));
        assert_eq!(config.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn invalid_bind_address_is_rejected() {
        assert!(parse(&["--bind", "not-an-ip"]).is_err());
    }

    #[test]
    fn invalid_port_is_rejected() {
        assert!(parse(&["--port", "70000"]).is_err());
    }
}
