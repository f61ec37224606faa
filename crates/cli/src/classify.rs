//! `qatrack classify` — show the class and matching rule for raw values.

use serde::Serialize;

use qatrack_analyzer::classify::explain;
use qatrack_io::json;

use crate::CliError;

#[derive(Serialize)]
struct Explained<'a> {
    value: &'a str,
    classification: String,
    rule: String,
}

pub fn cmd_classify(values: Vec<String>, json_output: bool) -> Result<(), CliError> {
    let explained: Vec<Explained> = values
        .iter()
        .map(|v| {
            let m = explain(v);
            Explained { value: v, classification: m.classification.to_string(), rule: m.rule }
        })
        .collect();

    if json_output {
        println!("{}", json::to_string_pretty(&explained)?);
        return Ok(());
    }

    let width = explained.iter().map(|e| e.value.chars().count()).max().unwrap_or(0);
    for e in &explained {
        let pad = width - e.value.chars().count();
        println!("{}{}  {:<13}  {}", e.value, " ".repeat(pad), e.classification, e.rule);
    }
    Ok(())
}
