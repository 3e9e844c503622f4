use serde::Serialize;
use std::fmt;

/// Output format selection for all subcommands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object on stdout.
    Json,
    /// Indented JSON for people.
    #[default]
    Human,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Human => write!(f, "human"),
        }
    }
}

/// Write a successful result to stdout.
pub fn emit<T: Serialize>(format: OutputFormat, value: &T) -> Result<(), serde_json::Error> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string(value)?,
        OutputFormat::Human => serde_json::to_string_pretty(value)?,
    };
    println!("{text}");
    Ok(())
}

/// Write an error to stdout (JSON mode) or stderr (human mode).
pub fn emit_error(format: OutputFormat, exit_code: u8, message: &str) {
    match format {
        OutputFormat::Json => {
            let obj = serde_json::json!({
                "error": message,
                "exit_code": exit_code,
            });
            println!("{obj}");
        }
        OutputFormat::Human => eprintln!("error: {message}"),
    }
}
