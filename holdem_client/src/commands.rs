use holdem_table::{
    Chips,
    entities::Action,
    messages::TableCommand,
};
use std::fmt;

/// Command help shown by `help`.
pub const COMMANDS_HELP: &str = "\
Commands:
  sit                 take a seat
  buyin N             add N chips to your stack (between hands)
  standup / sitback   sit out from the next hand / come back
  leave               leave after the current hand
  cashout             take your stack off the table
  blinds SB BB        set the blinds
  start               start a hand
  check / call        check, or call the current bet
  bet N               bet so your total this round is N
  raise N             raise by N over the current bet
  allin               push your whole stack
  fold                fold your hand
  info                show the table
  help                show this list
  quit                disconnect";

/// What a line of user input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Send a command to the table.
    Table(TableCommand),
    /// Print the command list.
    Help,
    /// Disconnect and exit.
    Quit,
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A command that needs an amount didn't get one.
    MissingAmount(&'static str),
    /// Amount isn't a non-negative whole number.
    InvalidAmount(String),
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAmount(usage) => write!(f, "Missing amount (e.g., '{}')", usage),
            Self::InvalidAmount(value) => write!(
                f,
                "Invalid amount '{}'. Must be a whole number of chips (e.g., 'bet 100')",
                value
            ),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Type 'help' to see available commands",
                cmd
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse a command string into an [`Input`].
///
/// # Examples
///
/// ```
/// use holdem_client::commands::{Input, parse_command};
/// use holdem_table::{entities::Action, messages::TableCommand};
///
/// assert_eq!(parse_command("sit"), Ok(Input::Table(TableCommand::SitDown)));
/// assert_eq!(
///     parse_command("raise 40"),
///     Ok(Input::Table(TableCommand::TakeAction { action: Action::Raise, amount: 40 }))
/// );
/// assert_eq!(parse_command("quit"), Ok(Input::Quit));
/// ```
pub fn parse_command(input: &str) -> Result<Input, ParseError> {
    let trimmed = input.trim();
    let parts: Vec<&str> = trimmed.split_ascii_whitespace().collect();

    let command = match parts.as_slice() {
        ["help"] => return Ok(Input::Help),
        ["quit"] | ["exit"] => return Ok(Input::Quit),
        ["sit"] => TableCommand::SitDown,
        ["standup"] => TableCommand::StandUp,
        ["sitback"] => TableCommand::SitBack,
        ["leave"] => TableCommand::Leave,
        ["cashout"] => TableCommand::CashOut,
        ["start"] => TableCommand::StartHand,
        ["info"] => TableCommand::TableInfo,
        ["check"] | ["call"] => action(Action::CheckCall, 0),
        ["allin"] | ["all-in"] => action(Action::AllIn, 0),
        ["fold"] => action(Action::Fold, 0),
        ["buyin", rest @ ..] => TableCommand::BuyIn(parse_amount(rest.first(), "buyin 1000")?),
        ["bet", rest @ ..] => action(Action::Bet, parse_amount(rest.first(), "bet 100")?),
        ["raise", rest @ ..] => action(Action::Raise, parse_amount(rest.first(), "raise 50")?),
        ["blinds", rest @ ..] => TableCommand::SetBlinds {
            small_blind: parse_amount(rest.first(), "blinds 5 10")?,
            big_blind: parse_amount(rest.get(1), "blinds 5 10")?,
        },
        _ => return Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    };
    Ok(Input::Table(command))
}

fn action(action: Action, amount: Chips) -> TableCommand {
    TableCommand::TakeAction { action, amount }
}

fn parse_amount(value: Option<&&str>, usage: &'static str) -> Result<Chips, ParseError> {
    let value = value.ok_or(ParseError::MissingAmount(usage))?;
    match value.parse::<Chips>() {
        Ok(amount) if amount >= 0 => Ok(amount),
        _ => Err(ParseError::InvalidAmount(value.to_string())),
    }
}
