use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use plumber::compose::{Composer, TargetDecl};
use plumber::core::config::PlumbingConfig;
use plumber::host::Instance;
use plumber::instruction::{Instruction, Stacks};
use plumber::part::Part;
use plumber::value::{DocMerger, Method, Value};

fn layered_parts(count: usize) -> Vec<Arc<Part>> {
    (0..count)
        .map(|i| {
            Part::builder(format!("Layer{}", i))
                .default("shared", i as i64)
                .extend(format!("own_{}", i), i as i64)
                .plumb(
                    "process",
                    Method::link(format!("layer{}", i), |next, this, args| next.call(this, args)),
                )
                .implements([format!("layer{}", i)])
                .shared()
        })
        .collect()
}

fn bench_fold(c: &mut Criterion) {
    let docs = DocMerger::new(".. plbnext::");
    let instructions: Vec<Instruction> = (0..200)
        .map(|i| match i % 3 {
            0 => Instruction::default(i as i64),
            1 => Instruction::extend(i as i64),
            _ => Instruction::overwrite(i as i64),
        })
        .map(|i| i.named("x"))
        .collect();

    c.bench_function("fold_200_instructions", |b| {
        b.iter(|| {
            let mut stacks = Stacks::new();
            for instruction in &instructions {
                stacks.fold(instruction.clone(), &docs, true).unwrap();
            }
            black_box(stacks.len())
        })
    });
}

fn bench_compose(c: &mut Criterion) {
    let composer = Composer::with_config(PlumbingConfig::default());
    let parts = layered_parts(50);
    let original = Method::endpoint("process", |_, args| Ok(Value::from(args.len() as i64)));
    let decl = TargetDecl::new("Layered")
        .parts(parts)
        .attr("process", original);

    c.bench_function("compose_50_parts", |b| {
        b.iter(|| black_box(composer.compose(&decl).unwrap()))
    });

    let class = composer.compose(&decl).unwrap();
    c.bench_function("call_50_link_chain", |b| {
        let mut inst = Instance::new(class.clone());
        b.iter(|| black_box(inst.call("process", &[Value::from(1)]).unwrap()))
    });
}

criterion_group!(benches, bench_fold, bench_compose);
criterion_main!(benches);
