use std::{
    cell::Cell,
    collections::VecDeque,
    io::{self, Read, Write},
    rc::Rc,
};

use mu::{
    driver::USAGE_STATUS, loader::read_stream, value::ValueKind, Config, Driver, Engine,
    Interpreter, LineReader, MuError, SystemHost,
};
use tempfile::tempdir;

type TestDriver = Driver<Interpreter, Vec<u8>>;

fn driver() -> TestDriver {
    Driver::new(
        Interpreter::new(Rc::new(SystemHost::new())),
        Config::plain(),
        Vec::new(),
    )
}

fn output(driver: &TestDriver) -> String {
    String::from_utf8_lossy(driver.output()).into_owned()
}

fn lookup_int(driver: &TestDriver, name: &str) -> Option<i64> {
    let value = driver.engine().lookup(driver.scope(), name)?;
    match value.kind() {
        ValueKind::Int(n) => Some(*n),
        _ => None,
    }
}

/// Line reader fed from a fixed list of lines.
#[derive(Default)]
struct Script {
    lines: VecDeque<String>,
    history: Vec<String>,
    prompts: usize,
}

impl Script {
    fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|line| line.to_string()).collect(),
            ..Self::default()
        }
    }
}

impl LineReader for Script {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>, MuError> {
        self.prompts += 1;
        Ok(self.lines.pop_front())
    }

    fn add_history(&mut self, line: &str) {
        self.history.push(line.to_string());
    }
}

/// Yields `data`, then fails with EIO instead of reporting end of stream.
struct FailingReader {
    data: Vec<u8>,
    position: usize,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.position == self.data.len() {
            return Err(io::Error::from_raw_os_error(5));
        }
        let count = buf.len().min(self.data.len() - self.position);
        buf[..count].copy_from_slice(&self.data[self.position..self.position + count]);
        self.position += count;
        Ok(count)
    }
}

/// Hands out at most `chunk` bytes per read, like a pipe.
struct Trickle<'a> {
    data: &'a [u8],
    chunk: usize,
}

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let count = buf.len().min(self.chunk).min(self.data.len());
        buf[..count].copy_from_slice(&self.data[..count]);
        self.data = &self.data[count..];
        Ok(count)
    }
}

#[test]
fn repl_echoes_expression_value() {
    let mut driver = driver();
    let mut script = Script::new(&["2+2"]);
    let status = driver.interpret(&mut script).expect("repl runs");
    assert_eq!(status, 0);
    assert_eq!(output(&driver), "4\n");
    assert_eq!(script.prompts, 2, "prompts again before seeing end of input");
}

#[test]
fn repl_reports_error_and_keeps_going() {
    let mut driver = driver();
    let mut script = Script::new(&["error(\"boom\")", "var x = 40", "x + 2"]);
    let status = driver.interpret(&mut script).expect("repl runs");
    assert_eq!(status, 0);
    let text = output(&driver);
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines, ["error: boom", "", "42"]);
}

#[test]
fn repl_exit_status_ignores_earlier_errors() {
    let mut driver = driver();
    let mut script = Script::new(&["nope(", "undefined_name"]);
    assert_eq!(driver.interpret(&mut script).expect("repl runs"), 0);
    assert_eq!(output(&driver).matches("error: ").count(), 2);
}

#[test]
fn repl_records_only_non_empty_history() {
    let mut driver = driver();
    let mut script = Script::new(&["1", "", "   ", "2"]);
    driver.interpret(&mut script).expect("repl runs");
    assert_eq!(script.history, ["1", "2"]);
}

#[test]
fn repl_shows_strings_and_multiple_values() {
    let mut driver = driver();
    let mut script = Script::new(&["\"hi\"", "1, [2, 3]"]);
    driver.interpret(&mut script).expect("repl runs");
    assert_eq!(output(&driver), "\"hi\"\n1, [2, 3]\n");
}

#[test]
fn execute_accumulates_into_shared_scope() {
    let mut driver = driver();
    driver.execute("var a = 20");
    driver.execute("var b = a + 1");
    assert_eq!(lookup_int(&driver, "b"), Some(21));
    assert!(output(&driver).is_empty());
}

#[test]
fn execute_error_is_reported_once() {
    let mut driver = driver();
    driver.execute("var a = 1 / 0");
    assert_eq!(output(&driver), "error: division by zero (8..13)\n");
    assert_eq!(lookup_int(&driver, "a"), None);
}

#[test]
fn colored_errors_are_wrapped_in_escapes() {
    let mut driver = Driver::new(
        Interpreter::new(Rc::new(SystemHost::new())),
        Config::default(),
        Vec::new(),
    );
    driver.execute("error(\"red\")");
    assert_eq!(output(&driver), "\x1b[31merror: red\x1b[0m\n");
}

#[test]
fn load_stream_evaluates_everything() {
    let mut source = String::new();
    for idx in 0..200 {
        source.push_str(&format!("var v{idx} = {idx}\n"));
    }
    let mut driver = driver();
    let mut reader = Trickle {
        data: source.as_bytes(),
        chunk: 7,
    };
    assert!(driver.load_stream(&mut reader));
    assert_eq!(lookup_int(&driver, "v199"), Some(199));
}

#[test]
fn load_stream_read_failure_is_caught() {
    let block = 16;
    let mut driver = Driver::new(
        Interpreter::new(Rc::new(SystemHost::new())),
        Config::plain().with_block_size(block),
        Vec::new(),
    );
    for _ in 0..3 {
        let mut reader = FailingReader {
            data: b"var loaded = 1; ".repeat(2),
            position: 0,
        };
        assert!(!driver.load_stream(&mut reader));
    }
    assert_eq!(
        output(&driver),
        "error: io error reading file (5)\n".repeat(3)
    );
    assert_eq!(lookup_int(&driver, "loaded"), None);
}

#[test]
fn read_stream_handles_exact_block_multiples() {
    let data = vec![b' '; 64];
    let buffer = read_stream(&mut data.as_slice(), 32).expect("reads");
    assert_eq!(buffer.len(), 64);
    assert_eq!(buffer.capacity(), 96);
    assert!(buffer.as_bytes().iter().all(|b| *b == b' '));
}

#[test]
fn load_file_missing_reports_open_error() {
    let dir = tempdir().expect("create temp dir");
    let mut driver = driver();
    assert!(!driver.load_file(dir.path().join("missing.mu")));
    assert_eq!(output(&driver), "error: io error opening file (2)\n");
}

#[test]
fn load_file_stops_at_first_error() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("partial.mu");
    std::fs::write(&path, "var before = 1\nerror(\"halt\")\nvar after = 2\n").expect("write");
    let mut driver = driver();
    assert!(!driver.load_file(&path));
    assert_eq!(lookup_int(&driver, "before"), Some(1));
    assert_eq!(lookup_int(&driver, "after"), None);
    assert_eq!(output(&driver), "error: halt\n");
}

#[test]
fn run_without_entry_point_succeeds() {
    let mut driver = driver();
    let args = driver.collect_arguments(&[]);
    assert_eq!(driver.run(&args).expect("runs"), 0);

    driver.execute("var main = 3");
    assert_eq!(driver.run(&args).expect("runs"), 0);
}

#[test]
fn run_passes_arguments_and_returns_status() {
    let mut driver = driver();
    driver.execute(
        r#"
        fn main(args) {
            if args[0] == "alpha" && args[1] == "beta" {
                return 10 + len(args)
            }
            return 1
        }
        "#,
    );
    let args = driver.collect_arguments(&["alpha".to_string(), "beta".to_string()]);
    assert_eq!(driver.run(&args).expect("runs"), 12);
}

#[test]
fn run_propagates_entry_point_errors() {
    let mut driver = driver();
    driver.execute("fn main(args) { error(\"fatal\") }");
    let args = driver.collect_arguments(&[]);
    let err = driver.run(&args).expect_err("main raises");
    assert_eq!(err.message(), "fatal");
    assert!(output(&driver).is_empty());
}

fn unused_reader() -> Result<Script, MuError> {
    panic!("interactive mode should not start");
}

#[test]
fn main_with_execute_only_skips_repl() {
    let mut driver = driver();
    let status = driver
        .main(["mu", "-e", "1+1"], &mut io::empty(), unused_reader)
        .expect("runs");
    assert_eq!(status, 0);
}

#[test]
fn main_without_arguments_enters_repl() {
    let mut driver = driver();
    let opened = Cell::new(false);
    let status = driver
        .main(["mu"], &mut io::empty(), || {
            opened.set(true);
            Ok(Script::new(&["3 * 3"]))
        })
        .expect("runs");
    assert_eq!(status, 0);
    assert!(opened.get());
    assert_eq!(output(&driver), "9\n");
}

#[test]
fn main_usage_error_runs_nothing() {
    let mut driver = driver();
    let status = driver
        .main(
            ["mu", "-e", "var ran = 1", "-z"],
            &mut io::empty(),
            unused_reader,
        )
        .expect("runs");
    assert_eq!(status, USAGE_STATUS);
    assert!(output(&driver).contains("usage: mu [options] [program] [args]"));
    assert_eq!(lookup_int(&driver, "ran"), None);
}

#[test]
fn main_reads_program_from_stdin() {
    let mut driver = driver();
    let mut stdin = "fn main(args) { return len(args) + 4 }".as_bytes();
    let status = driver
        .main(["mu", "-"], &mut stdin, unused_reader)
        .expect("runs");
    assert_eq!(status, 4);
}

#[test]
fn main_loads_program_file_and_collects_arguments() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("prog.mu");
    std::fs::write(
        &path,
        "fn main(args) { if args[0] == \"-e\" { return len(args) } return 99 }",
    )
    .expect("write");
    let program = path.to_string_lossy().into_owned();

    let mut driver = driver();
    let status = driver
        .main(
            ["mu", "--", program.as_str(), "-e", "x"],
            &mut io::empty(),
            unused_reader,
        )
        .expect("runs");
    assert_eq!(status, 2);
}

#[test]
fn main_actions_run_in_order_before_program() {
    let dir = tempdir().expect("create temp dir");
    let lib = dir.path().join("lib.mu");
    std::fs::write(&lib, "var base = base * 10").expect("write");
    let lib = lib.to_string_lossy().into_owned();

    let mut driver = driver();
    let status = driver
        .main(
            ["mu", "-e", "var base = 4", "-l", lib.as_str(), "-e", "fn main() { return base + 1 }"],
            &mut io::empty(),
            unused_reader,
        )
        .expect("runs");
    assert_eq!(status, 41);
}

#[test]
fn main_load_only_still_enters_repl() {
    let dir = tempdir().expect("create temp dir");
    let lib = dir.path().join("lib.mu");
    std::fs::write(&lib, "var answer = 42").expect("write");
    let lib = lib.to_string_lossy().into_owned();

    let mut driver = driver();
    driver
        .main(["mu", "-l", lib.as_str()], &mut io::empty(), || {
            Ok(Script::new(&["answer"]))
        })
        .expect("runs");
    assert_eq!(output(&driver), "42\n");
}

#[test]
fn main_interactive_flag_forces_repl_after_program() {
    let mut driver = driver();
    let mut stdin = "var loaded = 5\nfn main() { return 1 }".as_bytes();
    let status = driver
        .main(["mu", "-i", "-"], &mut stdin, || {
            Ok(Script::new(&["loaded + 1"]))
        })
        .expect("runs");
    assert_eq!(status, 0);
    assert_eq!(output(&driver), "6\n");
}

#[test]
fn output_sink_is_flushed_through_write() {
    let mut driver = driver();
    assert!(!driver.config().color);
    driver.execute("error(1, 2)");
    driver.flush();
    let mut sink = Vec::new();
    sink.write_all(&driver.into_output()).expect("copy");
    assert_eq!(String::from_utf8(sink).expect("utf8"), "error: 1 2\n");
}
