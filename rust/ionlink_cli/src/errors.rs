#[derive(Debug)]
pub enum CliError {
    ParseError {
        msg: String,
    },
    Io {
        source: String,
        path: Option<String>,
    },
    Core {
        source: ionlink::IonlinkError,
    },
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::ParseError { msg } => write!(f, "Error parsing config: {}", msg),
            CliError::Io { source, path } => {
                if let Some(path) = path {
                    write!(f, "Error reading file {}: {}", path, source)
                } else {
                    write!(f, "Error reading file: {}", source)
                }
            }
            CliError::Core { source } => write!(f, "{}", source),
        }
    }
}

impl From<ionlink::IonlinkError> for CliError {
    fn from(e: ionlink::IonlinkError) -> Self {
        CliError::Core { source: e }
    }
}

impl From<csv::Error> for CliError {
    fn from(e: csv::Error) -> Self {
        CliError::Io {
            source: e.to_string(),
            path: None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io {
            source: e.to_string(),
            path: None,
        }
    }
}
