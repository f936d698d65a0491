use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use lox_bytecode::Chunk;
use lox_interpreter::{resolver, Interpreter};
use lox_vm::Vm;

fn tree_walk(source: &str) {
    let ast = lox_syntax::parse(source).unwrap();
    let locals = resolver::resolve(&ast).unwrap();
    let mut interpreter = Interpreter::with_output(Box::new(std::io::sink()));
    interpreter.resolve(locals);
    interpreter.interpret(&ast).unwrap();
}

fn compile_and_run(source: &str) -> f64 {
    let mut chunk = Chunk::new();
    assert!(lox_compiler::compile(source, &mut chunk));
    Vm::new(&chunk).run().unwrap()
}

fn criterion_benchmark(c: &mut Criterion) {
    let fib = include_str!("fib.lox");
    let arithmetic = "(-1 + 2) * 3 - -4 / (5 - 6) * 7 + 8";

    c.bench_with_input(BenchmarkId::new("tree-walk", "fib"), &fib, |b, s| {
        b.iter(|| tree_walk(s));
    });

    c.bench_with_input(BenchmarkId::new("vm", "arithmetic"), &arithmetic, |b, s| {
        b.iter(|| compile_and_run(s));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
