//! Shell command parsing and credential input validation.

use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Maximum length for email input.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
pub const MAX_PASSWORD_LENGTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login(String),
    Register(String),
    Logout,
    Go(String),
    Back,
    Status,
    Routes,
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty command")]
    Empty,

    #[error("usage: {0}")]
    MissingArgument(&'static str),

    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),
}

pub const HELP: &str = "\
Commands:
  login <email>      log in (prompts for password)
  register <email>   create an account and log in
  logout             end the session
  go <path>          navigate, e.g. go /forms/dashboard
  back               go to the previous location
  status             show session and current route
  routes             list routes (* = requires login)
  help               show this help
  quit               exit";

pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let mut parts = line.split_whitespace();
    let Some(cmd) = parts.next() else {
        return Err(ParseError::Empty);
    };
    let arg = parts.next().map(str::to_string);

    match cmd.to_ascii_lowercase().as_str() {
        "login" => arg.map(Command::Login).ok_or(ParseError::MissingArgument("login <email>")),
        "register" => arg
            .map(Command::Register)
            .ok_or(ParseError::MissingArgument("register <email>")),
        "logout" => Ok(Command::Logout),
        "go" | "goto" => arg.map(Command::Go).ok_or(ParseError::MissingArgument("go <path>")),
        "back" => Ok(Command::Back),
        "status" => Ok(Command::Status),
        "routes" => Ok(Command::Routes),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(ParseError::Unknown(other.to_string())),
    }
}

// ============================================================================
// Input validation helpers
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

fn is_valid_input(value: &str, max_len: usize) -> bool {
    value.chars().count() <= max_len && value.chars().all(is_valid_input_char)
}

/// Validate email and password before they are sent anywhere
pub fn validate_credentials(email: &str, password: &str) -> Result<(), &'static str> {
    if email.is_empty() || password.is_empty() {
        return Err("Email and password required");
    }
    if !is_valid_input(email, MAX_EMAIL_LENGTH) {
        return Err("Email is too long or contains invalid characters");
    }
    if !is_valid_input(password, MAX_PASSWORD_LENGTH) {
        return Err("Password is too long or contains invalid characters");
    }
    Ok(())
}
