//! WASM bindings for lpcalc
//!
//! A browser front end collects the form fields or a problem document and
//! hands them to these functions; results come back as plain JS objects.

use wasm_bindgen::prelude::*;

use crate::canonical::canonicalize;
use crate::orchestrate::Orchestrator;
use crate::model::{Constraint, Objective};
use crate::parser::{FieldInput, LineInput, parse_document};

fn to_js_error(message: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&message.to_string()).into()
}

#[derive(serde::Deserialize)]
struct ModelInput {
    objective: Objective,
    constraints: Vec<Constraint>,
}

/// Solve a problem document and return the display result as JSON
#[wasm_bindgen]
pub fn solve(source: &str) -> Result<JsValue, JsValue> {
    let result = crate::solve_document(source, &Orchestrator::default());
    serde_wasm_bindgen::to_value(&result).map_err(to_js_error)
}

/// Solve a `{ variables, constraints, goal, objective: [...], rows: [...] }` object
#[wasm_bindgen(js_name = solveFields)]
pub fn solve_fields(input: JsValue) -> Result<JsValue, JsValue> {
    let input: FieldInput = serde_wasm_bindgen::from_value(input).map_err(to_js_error)?;
    let result = crate::solve_fields(&input);
    serde_wasm_bindgen::to_value(&result).map_err(to_js_error)
}

/// Solve a `{ variables, goal, objective, constraints: [...] }` object of delimited lines
#[wasm_bindgen(js_name = solveLines)]
pub fn solve_lines(input: JsValue) -> Result<JsValue, JsValue> {
    let input: LineInput = serde_wasm_bindgen::from_value(input).map_err(to_js_error)?;
    let result = crate::solve_lines(&input);
    serde_wasm_bindgen::to_value(&result).map_err(to_js_error)
}

/// Solve a `{ objective: { coefficients, goal }, constraints: [{ lhs, relation, rhs }] }` object
#[wasm_bindgen(js_name = solveModel)]
pub fn solve_model(input: JsValue) -> Result<JsValue, JsValue> {
    let input: ModelInput = serde_wasm_bindgen::from_value(input).map_err(to_js_error)?;
    let result = crate::solve_model(input.objective, input.constraints);
    serde_wasm_bindgen::to_value(&result).map_err(to_js_error)
}

/// Return the standard form of a problem document without solving it
#[wasm_bindgen]
pub fn canonical(source: &str) -> Result<JsValue, JsValue> {
    let problem = parse_document(source).map_err(to_js_error)?;
    serde_wasm_bindgen::to_value(&canonicalize(&problem)).map_err(to_js_error)
}

/// Render the text notice for a problem document, as the desktop dialog shows it
#[wasm_bindgen(js_name = solveToText)]
pub fn solve_to_text(source: &str) -> String {
    crate::solve_document(source, &Orchestrator::default()).to_string()
}
