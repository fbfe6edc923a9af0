//! Test harness for feeding inputs with stochastic chunking

use std::cell::RefCell;

use crate::common::{Case, Gen};
use jsonsp_core::{Error, Map, Parser, ParserOptions, Value};

/// Everything a parser published for one input.
#[derive(Debug, Default, PartialEq)]
pub struct Outcome {
    pub values: Vec<Value>,
    pub errors: Vec<Error>,
}

/// Feed `chunks` in order, then finish.
pub fn collect_chunks<C: AsRef<[u8]>>(options: ParserOptions, chunks: &[C]) -> Outcome {
    let values = RefCell::new(Vec::new());
    let errors = RefCell::new(Vec::new());
    {
        let mut parser = Parser::new(options);
        parser.on_value(|v| values.borrow_mut().push(v.clone()));
        parser.on_error(|e| errors.borrow_mut().push(e.clone()));
        for chunk in chunks {
            parser.feed(chunk);
        }
        parser.finish();
    }
    Outcome {
        values: values.into_inner(),
        errors: errors.into_inner(),
    }
}

/// Feed `input` as a single chunk.
pub fn collect(options: ParserOptions, input: &str) -> Outcome {
    collect_chunks(options, &[input])
}

/// Convert a reference value into ours.
pub fn from_json(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::Array(items.iter().map(from_json).collect()),
        serde_json::Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.as_str(), from_json(v)))
                .collect::<Map>(),
        ),
    }
}

fn options_for(case: &Case) -> ParserOptions {
    ParserOptions::default().allow_multiple_values(!case.single)
}

fn check(case: &Case, outcome: &Outcome, context: &str) {
    let expected: Vec<Value> = case.values.iter().map(from_json).collect();
    assert_eq!(
        outcome.values, expected,
        "[{}] {}: values differ ({})",
        case.id, case.desc, context
    );
    assert_eq!(
        outcome.errors.len(),
        case.errors,
        "[{}] {}: expected {} failures, got {:?} ({})",
        case.id, case.desc, case.errors, outcome.errors, context
    );
}

/// Run a single case as one chunk.
pub fn run_case(case: &Case) {
    let outcome = collect(options_for(case), &case.json);
    check(case, &outcome, "single chunk");
}

/// Run a case under `n` random chunkings.
pub fn run_with_splits(case: &Case, gen: &mut Gen, n: usize) {
    for _ in 0..n {
        let chunks = gen.split(case.json.as_bytes());
        let outcome = collect_chunks(options_for(case), &chunks);
        let context = format!("seed {}, chunks {:?}", gen.seed, chunks_lossy(&chunks));
        check(case, &outcome, &context);
    }
}

fn chunks_lossy(chunks: &[&[u8]]) -> Vec<String> {
    chunks
        .iter()
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect()
}
