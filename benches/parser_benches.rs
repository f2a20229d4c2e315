use criterion::{criterion_group, criterion_main, Criterion};

use dialogue_engine::{
    export, validate_script, ChoiceEntry, DialogueEntry, DialogueScript, ScriptFormat,
    ScriptParser,
};

fn sample_script(entry_count: usize) -> DialogueScript {
    let entries = (0..entry_count)
        .map(|idx| {
            let mut entry = DialogueEntry::new(format!("e{idx}"), format!("Line number {idx}"))
                .with_character(if idx % 2 == 0 { "alice" } else { "bob" });
            if idx % 10 == 0 {
                entry = entry.with_label(format!("l{idx}"));
            }
            if idx % 25 == 5 {
                entry = entry
                    .with_choice(ChoiceEntry::new("c0", "Go back", "l0"))
                    .with_choice(ChoiceEntry::new(
                        "c1",
                        "Carry on",
                        format!("l{}", (idx / 10 + 1) * 10),
                    ));
            }
            entry
        })
        .collect();
    DialogueScript::new("bench", entries)
}

fn bench_parsers(c: &mut Criterion) {
    let script = sample_script(1_000);
    let json = export::to_json(&script).expect("json");
    let yaml = export::to_yaml(&script).expect("yaml");
    let dsl = export::to_dsl(&script).expect("dsl");
    let parser = ScriptParser::new();

    c.bench_function("parse_json_1000", |b| {
        b.iter(|| parser.parse(&json, ScriptFormat::Json))
    });
    c.bench_function("parse_yaml_1000", |b| {
        b.iter(|| parser.parse(&yaml, ScriptFormat::Yaml))
    });
    c.bench_function("parse_dsl_1000", |b| {
        b.iter(|| parser.parse(&dsl, ScriptFormat::Dsl))
    });
}

fn bench_validator(c: &mut Criterion) {
    let script = sample_script(1_000);
    c.bench_function("validate_1000", |b| b.iter(|| validate_script(&script)));
}

criterion_group!(benches, bench_parsers, bench_validator);
criterion_main!(benches);
