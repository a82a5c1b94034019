//! Operator commands read from stdin, one per line

use std::fmt;
use std::str::FromStr;

use dashboard_core::DistrictFilter;
use thiserror::Error;

/// Which dashboard view is on screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    /// Card grid with live players
    #[default]
    Grid,
    /// Map with one marker per camera
    Map,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid => write!(f, "grid"),
            Self::Map => write!(f, "map"),
        }
    }
}

/// A parsed operator command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Scroll the grid to an absolute offset
    Scroll(f64),
    /// Change the concurrent stream limit
    Capacity(usize),
    /// Switch between grid and map
    View(ViewMode),
    /// Show one district or all of them
    Filter(DistrictFilter),
    /// Change the number of grid columns
    Columns(usize),
    /// Open a camera in the fullscreen viewer
    Fullscreen(u64),
    /// Close the fullscreen viewer
    Close,
    /// Print the current state
    Status,
    /// Print the command list
    Help,
    /// Leave the dashboard
    Quit,
}

/// Command parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Blank input line
    #[error("Empty command")]
    Empty,

    /// First word is not a known command
    #[error("Unknown command '{0}' (try 'help')")]
    Unknown(String),

    /// Command needs an argument
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    /// Argument could not be parsed
    #[error("Invalid argument for '{command}': {value}")]
    InvalidArgument {
        /// Command name
        command: &'static str,
        /// Offending argument
        value: String,
    },
}

/// Command summary printed by `help`
pub const HELP: &str = "\
commands:
  scroll <y>        scroll the grid to offset y
  capacity <n>      set the concurrent stream limit
  grid | g          show the card grid
  map | m           show the map
  filter <id|all>   show one district or all
  columns <n>       set the number of grid columns
  fullscreen <id>   open a camera with sound and controls
  close | esc       close the fullscreen viewer
  status            print streams and view state
  help              print this list
  quit              stop all streams and exit";

fn argument<'a>(
    command: &'static str,
    arg: Option<&'a str>,
) -> Result<&'a str, CommandError> {
    arg.ok_or(CommandError::MissingArgument(command))
}

fn invalid(command: &'static str, value: &str) -> CommandError {
    CommandError::InvalidArgument {
        command,
        value: value.to_string(),
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(CommandError::Empty);
        };
        let arg = words.next();

        match name.to_ascii_lowercase().as_str() {
            "scroll" => {
                let value = argument("scroll", arg)?;
                value
                    .parse::<f64>()
                    .ok()
                    .filter(|y| y.is_finite())
                    .map(Command::Scroll)
                    .ok_or_else(|| invalid("scroll", value))
            }
            "capacity" => {
                let value = argument("capacity", arg)?;
                value
                    .parse::<usize>()
                    .map(Command::Capacity)
                    .map_err(|_| invalid("capacity", value))
            }
            "columns" => {
                let value = argument("columns", arg)?;
                match value.parse::<usize>() {
                    Ok(columns) if columns > 0 => Ok(Command::Columns(columns)),
                    _ => Err(invalid("columns", value)),
                }
            }
            "filter" => {
                let value = argument("filter", arg)?;
                value
                    .parse::<DistrictFilter>()
                    .map(Command::Filter)
                    .map_err(|_| invalid("filter", value))
            }
            "fullscreen" | "f" => {
                let value = argument("fullscreen", arg)?;
                value
                    .parse::<u64>()
                    .map(Command::Fullscreen)
                    .map_err(|_| invalid("fullscreen", value))
            }
            "close" | "esc" => Ok(Command::Close),
            "grid" | "g" => Ok(Command::View(ViewMode::Grid)),
            "map" | "m" => Ok(Command::View(ViewMode::Map)),
            "status" => Ok(Command::Status),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
