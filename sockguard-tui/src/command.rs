//! Command parsing for the prompt.
//!
//! Lines starting with `:` are commands; any other non-empty line is a
//! search query. Row numbers refer to the numbering shown in the list and
//! start at 1.

use anyhow::{anyhow, bail, Result};
use sockguard_core::Priority;

/// Represents a parsed prompt line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Search by color, style or brand
    Search(String),
    /// Clear the search query
    Clear,
    /// Change the sort priority
    Priority(Priority),
    /// Load the next page
    More,
    /// Reload from the first page
    Refresh,
    /// Flip clean/dirty for a row
    Toggle(usize),
    /// Ask to delete a row
    Delete(usize),
    /// Confirm the pending delete
    Confirm,
    /// Cancel the pending delete
    Cancel,
    /// Show wash history for a row
    History(usize),
    /// Show statistics
    Stats,
    /// Close the front-most modal
    Close,
    /// Fill in the add form and submit it
    Add(Vec<(String, String)>),
    /// Show the add form
    Form,
    /// Start another sock after a successful add
    Again,
    /// Show help information
    Help,
    /// Quit the application
    Quit,
}

/// Help text listing every command.
pub const HELP: &str = "\
Commands:
  <text>                 search by color, style or brand
  :clear                 clear the search
  :priority <p>          sort by clean | dirty | frequent
  :more                  load the next page
  :refresh               reload from the first page
  :toggle <row>          mark a sock clean or dirty
  :delete <row>          delete a sock (asks first)
  :yes / :no             confirm or cancel a delete
  :history <row>         show wash history
  :stats                 show statistics
  :close                 close the open panel
  :add key=value ...     add a sock (color, style, pattern, material, size, brand, photo=<path>)
  :form                  show the add form
  :again                 start another sock after adding one
  :help                  show this help
  :quit                  exit";

/// Parse a prompt line.
///
/// # Examples
///
/// ```
/// use sockguard_tui::command::{parse_command, Command};
///
/// assert_eq!(parse_command(":quit").unwrap(), Command::Quit);
/// assert_eq!(parse_command(":toggle 3").unwrap(), Command::Toggle(3));
/// assert_eq!(parse_command("черный").unwrap(), Command::Search("черный".to_string()));
/// ```
pub fn parse_command(input: &str) -> Result<Command> {
    let input = input.trim();

    if input.is_empty() {
        bail!("Empty command");
    }

    let Some(input) = input.strip_prefix(':') else {
        return Ok(Command::Search(input.to_string()));
    };

    let (name, rest) = match input.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (input, ""),
    };

    if name.is_empty() {
        bail!("Empty command");
    }

    let name = name.to_lowercase();
    match name.as_str() {
        "q" | "quit" => no_args(Command::Quit, &name, rest),
        "h" | "help" => no_args(Command::Help, &name, rest),
        "clear" => no_args(Command::Clear, &name, rest),
        "more" | "m" => no_args(Command::More, &name, rest),
        "refresh" => no_args(Command::Refresh, &name, rest),
        "yes" | "y" => no_args(Command::Confirm, &name, rest),
        "no" | "n" => no_args(Command::Cancel, &name, rest),
        "stats" => no_args(Command::Stats, &name, rest),
        "close" => no_args(Command::Close, &name, rest),
        "form" => no_args(Command::Form, &name, rest),
        "again" => no_args(Command::Again, &name, rest),
        "search" | "s" => {
            if rest.is_empty() {
                bail!("search requires a query");
            }
            Ok(Command::Search(rest.to_string()))
        }
        "priority" | "p" => {
            let priority = rest
                .parse::<Priority>()
                .map_err(|_| anyhow!("priority must be clean, dirty or frequent"))?;
            Ok(Command::Priority(priority))
        }
        "toggle" | "t" => Ok(Command::Toggle(parse_row(&name, rest)?)),
        "delete" | "d" => Ok(Command::Delete(parse_row(&name, rest)?)),
        "history" => Ok(Command::History(parse_row(&name, rest)?)),
        "add" => Ok(Command::Add(parse_pairs(rest)?)),
        other => Err(anyhow!("Unknown command: {}", other)),
    }
}

fn no_args(command: Command, name: &str, rest: &str) -> Result<Command> {
    if !rest.is_empty() {
        bail!("{} command takes no arguments", name);
    }
    Ok(command)
}

fn parse_row(name: &str, rest: &str) -> Result<usize> {
    let row: usize = rest
        .parse()
        .map_err(|_| anyhow!("{} requires a row number", name))?;
    if row == 0 {
        bail!("Rows are numbered from 1");
    }
    Ok(row)
}

/// Split `key=value` pairs. Values containing spaces may be double-quoted.
fn parse_pairs(rest: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    for token in tokenize(rest)? {
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected key=value, got {:?}", token))?;
        if key.is_empty() {
            bail!("Missing field name in {:?}", token);
        }
        pairs.push((key.to_lowercase(), value.to_string()));
    }
    Ok(pairs)
}

fn tokenize(input: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for ch in input.chars() {
        match ch {
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }

    if quoted {
        bail!("Unterminated quote");
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quit() {
        assert_eq!(parse_command(":quit").unwrap(), Command::Quit);
        assert_eq!(parse_command(":q").unwrap(), Command::Quit);
        assert_eq!(parse_command(":QUIT").unwrap(), Command::Quit);
    }

    #[test]
    fn test_no_arg_commands_reject_args() {
        assert!(parse_command(":quit now").is_err());
        assert!(parse_command(":more 2").is_err());
        assert!(parse_command(":yes please").is_err());
    }

    #[test]
    fn test_bare_text_is_search() {
        assert_eq!(
            parse_command("  Under Armour ").unwrap(),
            Command::Search("Under Armour".to_string())
        );
        assert_eq!(
            parse_command(":search синий").unwrap(),
            Command::Search("синий".to_string())
        );
        assert!(parse_command(":search").is_err());
    }

    #[test]
    fn test_parse_priority() {
        assert_eq!(parse_command(":priority dirty").unwrap(), Command::Priority(Priority::Dirty));
        assert_eq!(parse_command(":p frequent").unwrap(), Command::Priority(Priority::Frequent));
        assert!(parse_command(":priority shiny").is_err());
    }

    #[test]
    fn test_parse_rows() {
        assert_eq!(parse_command(":toggle 3").unwrap(), Command::Toggle(3));
        assert_eq!(parse_command(":d 1").unwrap(), Command::Delete(1));
        assert_eq!(parse_command(":history 12").unwrap(), Command::History(12));
        assert!(parse_command(":toggle 0").is_err());
        assert!(parse_command(":toggle x").is_err());
        assert!(parse_command(":delete").is_err());
    }

    #[test]
    fn test_parse_add() {
        let cmd = parse_command(r#":add color=Красный style="В горошек" brand="Under Armour" size=M"#).unwrap();
        assert_eq!(
            cmd,
            Command::Add(vec![
                ("color".to_string(), "Красный".to_string()),
                ("style".to_string(), "В горошек".to_string()),
                ("brand".to_string(), "Under Armour".to_string()),
                ("size".to_string(), "M".to_string()),
            ])
        );
    }

    #[test]
    fn test_parse_add_errors() {
        assert!(parse_command(":add color").is_err());
        assert!(parse_command(":add =x").is_err());
        assert!(parse_command(r#":add brand="Under Armour"#).is_err());
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_command("").is_err());
        assert!(parse_command("   ").is_err());
        assert!(parse_command(":").is_err());
    }

    #[test]
    fn test_parse_unknown_command() {
        assert!(parse_command(":foobar").is_err());
    }
}
