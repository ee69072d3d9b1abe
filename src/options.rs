use thiserror::Error;
use tracing::trace;

use crate::args::ArgCursor;

/// Work scheduled by `-e` and `-l`, performed in command-line order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Execute(String),
    Load(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mode {
    /// An `-e` string was given.
    pub executed_any: bool,
    /// `-i`: enter the REPL after all other processing.
    pub interactive: bool,
    /// A program must be read from a file or standard input.
    pub load_requested: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Options {
    pub program_name: String,
    pub actions: Vec<Action>,
    pub mode: Mode,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("unrecognized option `{0}`")]
    UnknownOption(String),
    #[error("option `-{0}` requires an argument")]
    MissingArgument(char),
}

/// Parses the leading options off `cursor`, leaving it on the program name
/// (if any).
///
/// The whole option prefix is validated before anything is scheduled to
/// run, so a malformed command line never evaluates code.
pub fn parse(cursor: &mut ArgCursor) -> Result<Options, UsageError> {
    let mut options = Options {
        program_name: cursor.advance().unwrap_or("mu").to_string(),
        ..Options::default()
    };

    while let Some(arg) = cursor.peek() {
        if !arg.starts_with('-') {
            break;
        }
        if arg.len() > 2 {
            return Err(UsageError::UnknownOption(arg.to_string()));
        }
        trace!(option = arg, "parsing option");
        let flag = arg.chars().nth(1);
        cursor.advance();

        match flag {
            Some('e') => {
                let source = required_argument(cursor, 'e')?;
                options.actions.push(Action::Execute(source));
                options.mode.executed_any = true;
            }
            Some('l') => {
                let path = required_argument(cursor, 'l')?;
                options.actions.push(Action::Load(path));
            }
            Some('i') => options.mode.interactive = true,
            None => {
                options.mode.load_requested = true;
                break;
            }
            Some('-') => break,
            Some(other) => return Err(UsageError::UnknownOption(format!("-{other}"))),
        }
    }

    Ok(options)
}

fn required_argument(cursor: &mut ArgCursor, flag: char) -> Result<String, UsageError> {
    cursor
        .advance()
        .map(str::to_string)
        .ok_or(UsageError::MissingArgument(flag))
}

pub fn usage(program_name: &str) -> String {
    format!(
        "\n\
         usage: {program_name} [options] [program] [args]\n\
         options:\n\
         \x20 -e string     execute string before program\n\
         \x20 -l file       import and execute file before program\n\
         \x20 -i            run interactively after program\n\
         \x20 --            stop handling options\n\
         program: file to execute and run or '-' for stdin\n\
         args: arguments passed to running program\n"
    )
}
