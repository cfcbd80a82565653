use std::fmt;

use serde::{Deserialize, Serialize};

/// Database engine family targeted by a connection string.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Sqlite,
    MySql,
    PostgreSql,
    Drizzle,
    Firebird,
    Informix,
    MsSql,
    Oracle,
    Sybase,
}

impl Dialect {
    pub const ALL: [Dialect; 9] = [
        Dialect::Sqlite,
        Dialect::MySql,
        Dialect::PostgreSql,
        Dialect::Drizzle,
        Dialect::Firebird,
        Dialect::Informix,
        Dialect::MsSql,
        Dialect::Oracle,
        Dialect::Sybase,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "sqlite",
            Dialect::MySql => "mysql",
            Dialect::PostgreSql => "postgresql",
            Dialect::Drizzle => "drizzle",
            Dialect::Firebird => "firebird",
            Dialect::Informix => "informix",
            Dialect::MsSql => "mssql",
            Dialect::Oracle => "oracle",
            Dialect::Sybase => "sybase",
        }
    }

    /// Whether a driver is compiled in for this dialect.
    pub fn is_supported(&self) -> bool {
        matches!(self, Dialect::Sqlite | Dialect::MySql | Dialect::PostgreSql)
    }

    /// Position in [`Dialect::ALL`].
    pub fn index(&self) -> usize {
        Dialect::ALL
            .iter()
            .position(|d| d == self)
            .unwrap_or_default()
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters collected by the connection form.
///
/// Empty strings mean the field was left blank. The password is never
/// serialized.
#[derive(Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct ConnectionSpec {
    pub dialect: Dialect,
    pub host: String,
    pub username: String,
    #[serde(skip)]
    pub password: String,
    pub database: String,
}

impl ConnectionSpec {
    /// Builds `dialect://[user[:password]@]host/database`.
    ///
    /// Credentials are only emitted when a host is present, and a password
    /// without a username is dropped. Nothing is validated or escaped.
    pub fn connection_string(&self) -> String {
        let userinfo = match (self.username.is_empty(), self.password.is_empty()) {
            (true, _) => String::new(),
            (false, true) => self.username.clone(),
            (false, false) => format!("{}:{}", self.username, self.password),
        };

        let authority = if self.host.is_empty() {
            String::new()
        } else if userinfo.is_empty() {
            self.host.clone()
        } else {
            format!("{}@{}", userinfo, self.host)
        };

        format!("{}://{}/{}", self.dialect, authority, self.database)
    }

    /// The connection string with the password masked, for logs.
    pub fn redacted(&self) -> String {
        if self.password.is_empty() {
            return self.connection_string();
        }
        ConnectionSpec {
            password: "***".to_string(),
            ..self.clone()
        }
        .connection_string()
    }

    /// URL handed to the sqlx driver.
    ///
    /// SQLite takes the database field as a file path; the other dialects
    /// accept the connection string as-is.
    pub fn driver_url(&self) -> String {
        match self.dialect {
            Dialect::Sqlite => format!("sqlite:{}", self.database),
            _ => self.connection_string(),
        }
    }
}

impl fmt::Debug for ConnectionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSpec")
            .field("dialect", &self.dialect)
            .field("host", &self.host)
            .field("username", &self.username)
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}
