use mu::{
    args::ArgCursor,
    options::{self, Action, Mode, UsageError},
};
use proptest::prelude::*;

fn parse(args: &[&str]) -> (Result<options::Options, UsageError>, ArgCursor) {
    let mut cursor = ArgCursor::new(args.iter().copied());
    let parsed = options::parse(&mut cursor);
    (parsed, cursor)
}

#[test]
fn cursor_advances_irreversibly() {
    let mut cursor = ArgCursor::new(["mu", "-e", "1"]);
    assert_eq!(cursor.peek(), Some("mu"));
    assert_eq!(cursor.advance(), Some("mu"));
    assert_eq!(cursor.advance(), Some("-e"));
    assert_eq!(cursor.peek(), Some("1"));
    assert_eq!(cursor.advance(), Some("1"));
    assert!(cursor.is_exhausted());
    assert_eq!(cursor.advance(), None);
    assert_eq!(cursor.peek(), None);
}

#[test]
fn cursor_remaining_drains_the_tail() {
    let mut cursor = ArgCursor::new(["mu", "prog.mu", "a", "b"]);
    cursor.advance();
    cursor.advance();
    assert_eq!(cursor.remaining(), ["a", "b"]);
    assert!(cursor.is_exhausted());
    assert!(cursor.remaining().is_empty());
}

#[test]
fn actions_keep_command_line_order() {
    let (parsed, cursor) = parse(&["mu", "-e", "a()", "-l", "lib.mu", "-i", "-e", "b()"]);
    let parsed = parsed.expect("valid options");
    assert_eq!(parsed.program_name, "mu");
    assert_eq!(
        parsed.actions,
        [
            Action::Execute("a()".into()),
            Action::Load("lib.mu".into()),
            Action::Execute("b()".into()),
        ]
    );
    assert_eq!(
        parsed.mode,
        Mode {
            executed_any: true,
            interactive: true,
            load_requested: false,
        }
    );
    assert!(cursor.is_exhausted());
}

#[test]
fn load_alone_does_not_count_as_execution() {
    let (parsed, _) = parse(&["mu", "-l", "lib.mu"]);
    assert_eq!(parsed.expect("valid options").mode, Mode::default());
}

#[test]
fn parsing_stops_at_first_non_option() {
    let (parsed, cursor) = parse(&["mu", "prog.mu", "-i", "-x"]);
    let parsed = parsed.expect("valid options");
    assert!(parsed.actions.is_empty());
    assert!(!parsed.mode.interactive);
    assert_eq!(cursor.peek(), Some("prog.mu"));
}

#[test]
fn bare_dash_requests_load_and_stops() {
    let (parsed, mut cursor) = parse(&["mu", "-", "-e", "x"]);
    assert!(parsed.expect("valid options").mode.load_requested);
    assert_eq!(cursor.remaining(), ["-e", "x"]);
}

#[test]
fn double_dash_stops_without_load() {
    let (parsed, mut cursor) = parse(&["mu", "--", "-i"]);
    let parsed = parsed.expect("valid options");
    assert_eq!(parsed.mode, Mode::default());
    assert_eq!(cursor.remaining(), ["-i"]);
}

#[test]
fn execute_argument_may_look_like_a_flag() {
    let (parsed, _) = parse(&["mu", "-e", "-1"]);
    assert_eq!(
        parsed.expect("valid options").actions,
        [Action::Execute("-1".into())]
    );
}

#[test]
fn malformed_options_are_usage_errors() {
    assert_eq!(
        parse(&["mu", "-x"]).0.unwrap_err(),
        UsageError::UnknownOption("-x".into())
    );
    assert_eq!(
        parse(&["mu", "-ei", "1"]).0.unwrap_err(),
        UsageError::UnknownOption("-ei".into())
    );
    assert_eq!(
        parse(&["mu", "--help"]).0.unwrap_err(),
        UsageError::UnknownOption("--help".into())
    );
    assert_eq!(
        parse(&["mu", "-e"]).0.unwrap_err(),
        UsageError::MissingArgument('e')
    );
    assert_eq!(
        parse(&["mu", "-i", "-l"]).0.unwrap_err(),
        UsageError::MissingArgument('l')
    );
}

#[test]
fn usage_banner_names_the_program() {
    let banner = options::usage("mu-test");
    assert!(banner.starts_with("\nusage: mu-test [options] [program] [args]\n"));
    assert!(banner.contains("  -e string     execute string before program\n"));
    assert!(banner.contains("  --            stop handling options\n"));
}

proptest! {
    #[test]
    fn non_option_tokens_are_left_for_the_program(
        rest in proptest::collection::vec("[a-z0-9._]{1,8}", 0..6)
    ) {
        let mut args = vec!["mu".to_string(), "-i".to_string()];
        args.extend(rest.iter().cloned());
        let mut cursor = ArgCursor::new(args);
        let parsed = options::parse(&mut cursor).expect("valid options");
        prop_assert!(parsed.mode.interactive);
        prop_assert_eq!(cursor.remaining(), rest.as_slice());
    }
}
