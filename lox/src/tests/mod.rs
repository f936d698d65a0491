use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use regex::Regex;

use lox_interpreter::{resolver, Interpreter};

fn parse_expects(source: &str, regex: Regex, field: usize) -> Vec<String> {
    let mut results = vec![];
    for line in source.lines() {
        let caps = regex.captures(line);
        if let Some(caps) = caps {
            results.push(caps[field].to_owned());
        }
    }

    results
}

#[derive(PartialEq, Debug)]
enum TestResult {
    Ok,
    ParseError,
    ResolveError,
    RuntimeError,
}

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn execute(source: &str) -> (Vec<String>, TestResult) {
    let ast = match lox_syntax::parse(source) {
        Ok(ast) => ast,
        Err(_) => return (vec![], TestResult::ParseError),
    };

    let locals = match resolver::resolve(&ast) {
        Ok(locals) => locals,
        Err(_) => return (vec![], TestResult::ResolveError),
    };

    let buffer = SharedBuffer::default();
    let mut interpreter = Interpreter::with_output(Box::new(buffer.clone()));
    interpreter.resolve(locals);
    let result = match interpreter.interpret(&ast) {
        Ok(()) => TestResult::Ok,
        Err(_) => TestResult::RuntimeError,
    };

    let output = String::from_utf8(buffer.0.borrow().clone()).unwrap();

    (output.lines().map(|l| l.to_owned()).collect(), result)
}

fn harness(source: &str) {
    let expects = parse_expects(source, Regex::new(r"// expect: ?(.*)").unwrap(), 1);

    let expected_result = if !parse_expects(source, Regex::new(r"// expect parse error").unwrap(), 0)
        .is_empty()
    {
        TestResult::ParseError
    } else if !parse_expects(source, Regex::new(r"// expect resolve error").unwrap(), 0).is_empty()
    {
        TestResult::ResolveError
    } else if !parse_expects(
        source,
        Regex::new(r"// expect runtime error: (.+)").unwrap(),
        1,
    )
    .is_empty()
    {
        TestResult::RuntimeError
    } else {
        TestResult::Ok
    };

    let (output, result) = execute(source);
    assert_eq!(expects, output);
    assert_eq!(expected_result, result);
}

#[test]
fn precedence() {
    harness(include_str!("precedence.lox"));
}

#[test]
fn blocks() {
    harness(include_str!("blocks.lox"));
}

#[test]
fn logical() {
    harness(include_str!("logical.lox"));
}

#[test]
fn strings() {
    harness(include_str!("strings.lox"));
}

#[test]
fn closures() {
    harness(include_str!("closures.lox"));
}

#[test]
fn fib() {
    harness(include_str!("fib.lox"));
}

#[test]
fn for_loops() {
    harness(include_str!("for_loops.lox"));
}

#[test]
fn functions() {
    harness(include_str!("functions.lox"));
}

#[test]
fn runtime_error() {
    harness(include_str!("runtime_error.lox"));
}

#[test]
fn resolve_error() {
    harness(include_str!("resolve_error.lox"));
}

#[test]
fn parse_error() {
    harness(include_str!("parse_error.lox"));
}
