use std::path::PathBuf;

use sqlx::mysql::MySqlConnectOptions;
use tracing::debug;

use crate::error::GeneratorError;

pub const DEFAULT_PACKAGE: &str = "model";
pub const DEFAULT_OUTPUT_PATH: &str = "./gen";
const DEFAULT_MYSQL_HOST: &str = "localhost";
const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Everything the assembler and the driver need to know about a run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub package: String,
    /// Generate interfaces instead of data classes.
    pub interface: bool,
    pub output_dir: PathBuf,
    pub skip_unsupported: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            package: DEFAULT_PACKAGE.to_string(),
            interface: false,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_PATH),
            skip_unsupported: false,
        }
    }
}

/// Connection options for a datasource. `mysql://` URLs are handed to sqlx,
/// anything else is read as a Go-driver DSN:
/// `[user[:password]@][tcp(host[:port])|unix(/socket)]/dbname[?param=value&...]`.
pub fn connect_options(datasource: &str) -> Result<MySqlConnectOptions, GeneratorError> {
    if datasource.contains("://") {
        return Ok(datasource.parse()?);
    }

    Dsn::parse(datasource)?.connect_options()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DsnAddress {
    Tcp { host: String, port: Option<u16> },
    Socket(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dsn {
    pub username: Option<String>,
    pub password: Option<String>,
    pub address: DsnAddress,
    pub database: Option<String>,
    pub params: Vec<(String, String)>,
}

impl Dsn {
    pub fn parse(dsn: &str) -> Result<Self, GeneratorError> {
        // the database name is the only part that can't hold a '/'
        let (head, tail) = dsn.rsplit_once('/').ok_or(GeneratorError::InvalidDatasource(
            "missing '/' before the database name",
        ))?;
        let (database, params) = tail.split_once('?').unwrap_or((tail, ""));

        let (credentials, address) = match head.rsplit_once('@') {
            Some((credentials, address)) => (Some(credentials), address),
            None => (None, head),
        };
        let (username, password) = match credentials {
            Some(credentials) => match credentials.split_once(':') {
                Some((user, password)) => (Some(user.to_string()), Some(password.to_string())),
                None => (Some(credentials.to_string()), None),
            },
            None => (None, None),
        };

        let params = params
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (key.to_string(), value.to_string())
            })
            .collect();

        Ok(Self {
            username: username.filter(|user| !user.is_empty()),
            password,
            address: parse_address(address)?,
            database: Some(database.to_string()).filter(|database| !database.is_empty()),
            params,
        })
    }

    pub fn connect_options(&self) -> Result<MySqlConnectOptions, GeneratorError> {
        let mut options = MySqlConnectOptions::new();
        options = match &self.address {
            DsnAddress::Tcp { host, port } => {
                let options = options.host(host);
                match port {
                    Some(port) => options.port(*port),
                    None => options,
                }
            }
            DsnAddress::Socket(path) => options.socket(path),
        };
        if let Some(username) = &self.username {
            options = options.username(username);
        }
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        if let Some(database) = &self.database {
            options = options.database(database);
        }
        for (key, value) in &self.params {
            match key.as_str() {
                "charset" => options = options.charset(value),
                _ => debug!(param = %key, "ignoring datasource parameter"),
            }
        }

        Ok(options)
    }
}

fn parse_address(address: &str) -> Result<DsnAddress, GeneratorError> {
    let (protocol, inner) = match address.split_once('(') {
        Some((protocol, rest)) => {
            let inner = rest
                .strip_suffix(')')
                .ok_or(GeneratorError::InvalidDatasource("unclosed address parenthesis"))?;
            (protocol, inner)
        }
        None => (address, ""),
    };

    match protocol {
        "unix" if !inner.is_empty() => Ok(DsnAddress::Socket(PathBuf::from(inner))),
        "unix" => Err(GeneratorError::InvalidDatasource("unix address needs a socket path")),
        "" | "tcp" if inner.is_empty() => Ok(DsnAddress::Tcp {
            host: DEFAULT_MYSQL_HOST.to_string(),
            port: Some(DEFAULT_MYSQL_PORT),
        }),
        "tcp" => match inner.rsplit_once(':') {
            Some((host, port)) => Ok(DsnAddress::Tcp {
                host: host.to_string(),
                port: Some(
                    port.parse()
                        .map_err(|_| GeneratorError::InvalidDatasource("invalid port number"))?,
                ),
            }),
            None => Ok(DsnAddress::Tcp {
                host: inner.to_string(),
                port: None,
            }),
        },
        _ => Err(GeneratorError::InvalidDatasource(
            "unsupported protocol, expected tcp or unix",
        )),
    }
}
