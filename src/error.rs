//! Error enum
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Serde(serde_json::Error),
    /// missing or unloadable classifier model
    Model(String),
    /// missing or unreadable collection statistics
    Stats(PathBuf, String),
    UnknownLid(String),
    Custom(String),
}

impl Error {
    /// Exit code for fatal errors: `2` input parse error, `3` missing model,
    /// `4` missing stats, `1` anything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Serde(_) => 2,
            Error::Model(_) => 3,
            Error::Stats(_, _) => 4,
            _ => 1,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Serde(e)
    }
}

impl From<String> for Error {
    fn from(s: String) -> Error {
        Error::Custom(s)
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn test_exit_codes() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(Error::Serde(parse_err).exit_code(), 2);
        assert_eq!(Error::Model("no model".to_string()).exit_code(), 3);
        assert_eq!(
            Error::Stats("stats.json".into(), "not found".to_string()).exit_code(),
            4
        );
        assert_eq!(Error::Custom("oops".to_string()).exit_code(), 1);
        assert_eq!(Error::UnknownLid("mystery_lid".to_string()).exit_code(), 1);
    }
}
