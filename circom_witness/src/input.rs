//! Assignment of JSON inputs to a session.
//!
//! The input document is an object mapping each main input name to a scalar
//! or a (possibly nested) array, flattened in row-major order. Scalars are
//! JSON integers or strings holding a literal with an optional `0b`/`0o`/`0x`
//! prefix.

use serde_json::{Map, Value};

use crate::{
    circuit::fnv1a,
    field::{FieldContext, FieldElement},
    utils::error::{Error, Result},
    witness::{position_suffix, WitnessCalculator},
};

fn scalar(field: &FieldContext, v: &Value) -> Result<FieldElement> {
    match v {
        Value::String(s) => field.parse_literal(s),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Ok(field.from_u64(u))
            } else if let Some(i) = n.as_i64() {
                Ok(field.from_i64(i))
            } else {
                let text = n.to_string();
                let (negative, digits) = match text.strip_prefix('-') {
                    Some(d) => (true, d),
                    None => (false, text.as_str()),
                };
                if digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_digit()) {
                    return Err(Error::InvalidInput(format!("{} is not an integer", text)));
                }
                let x = field.parse(digits, 10)?;
                Ok(if negative { field.neg(&x) } else { x })
            }
        }
        other => Err(Error::InvalidInput(format!(
            "unexpected value {} in input",
            other
        ))),
    }
}

fn flatten_into(field: &FieldContext, v: &Value, out: &mut Vec<FieldElement>) -> Result<()> {
    match v {
        Value::Array(items) => {
            for item in items {
                flatten_into(field, item, out)?;
            }
            Ok(())
        }
        _ => {
            out.push(scalar(field, v)?);
            Ok(())
        }
    }
}

/// Flattens one input value in row-major order.
pub fn flatten(field: &FieldContext, v: &Value) -> Result<Vec<FieldElement>> {
    let mut res = Vec::new();
    flatten_into(field, v, &mut res)?;
    Ok(res)
}

/// Parses every input of `doc` and checks its length against the declared
/// arity. Nothing is assigned here.
pub fn parse_inputs(
    calc: &WitnessCalculator,
    doc: &Map<String, Value>,
) -> Result<Vec<(String, u64, Vec<FieldElement>)>> {
    let mut res = Vec::with_capacity(doc.len());
    for (name, v) in doc {
        let h = fnv1a(name);
        let expected = calc.input_signal_size(h)?;
        let values = flatten(calc.field(), v).map_err(|e| e.prepend(name))?;
        if values.len() < expected {
            return Err(Error::TooFewValues {
                name: name.clone(),
                expected,
                got: values.len(),
            });
        }
        if values.len() > expected {
            return Err(Error::TooManyValues {
                name: name.clone(),
                expected,
                got: values.len(),
            });
        }
        res.push((name.clone(), h, values));
    }
    Ok(res)
}

/// Assigns all inputs in `json` to `calc`.
///
/// Every input is parsed and length-checked before the first assignment.
/// An empty object asks the session to run, which only succeeds for
/// circuits without main inputs.
pub fn assign_inputs(calc: &WitnessCalculator, json: &str) -> Result<()> {
    let doc: Value = serde_json::from_str(json)
        .map_err(|e| Error::InvalidInput(format!("input is not valid JSON: {}", e)))?;
    let doc = match doc {
        Value::Object(m) => m,
        other => {
            return Err(Error::InvalidInput(format!(
                "input must be a JSON object, got {}",
                other
            )))
        }
    };
    if doc.is_empty() {
        calc.try_run()?;
        return Ok(());
    }
    let inputs = parse_inputs(calc, &doc)?;
    for (name, h, values) in inputs {
        log::debug!("assigning {} values to input {}", values.len(), name);
        let dims = [values.len()];
        for (i, v) in values.into_iter().enumerate() {
            calc.set_input(h, i, v).map_err(|e| {
                log::warn!("assigning {}{} failed: {}", name, position_suffix(&dims, i), e);
                e
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten() {
        let field = FieldContext::bn254();
        let v = flatten(&field, &json!([[1, "0x2"], ["0b11", -4]])).unwrap();
        assert_eq!(v.len(), 4);
        assert!(field.equals(&v[1], &field.from_u64(2)));
        assert!(field.equals(&v[2], &field.from_u64(3)));
        assert!(field.equals(&v[3], &field.neg(&field.from_u64(4))));
        let v = flatten(&field, &json!("12345678901234567890123")).unwrap();
        assert_eq!(field.to_decimal_string(&v[0]), "12345678901234567890123");
    }

    #[test]
    fn test_flatten_rejects() {
        let field = FieldContext::bn254();
        assert!(matches!(
            flatten(&field, &json!({"a": 1})),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            flatten(&field, &json!(1.5)),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            flatten(&field, &json!(["0x1g"])),
            Err(Error::InvalidLiteral { .. })
        ));
        assert!(matches!(flatten(&field, &json!(null)), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_bare_big_integers() {
        let field = FieldContext::bn254();
        let doc: Value =
            serde_json::from_str(r#"[12345678901234567890123, -12345678901234567890123]"#).unwrap();
        let v = flatten(&field, &doc).unwrap();
        assert_eq!(field.to_decimal_string(&v[0]), "12345678901234567890123");
        assert!(field.is_zero(&field.add(&v[0], &v[1])));

        for text in ["1e20", "1.0", "-2.5"] {
            let doc: Value = serde_json::from_str(text).unwrap();
            assert!(
                matches!(flatten(&field, &doc), Err(Error::InvalidInput(_))),
                "{}",
                text
            );
        }
    }

    #[test]
    fn test_booleans_rejected() {
        let field = FieldContext::bn254();
        assert!(matches!(
            flatten(&field, &json!(true)),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            flatten(&field, &json!([1, false])),
            Err(Error::InvalidInput(_))
        ));
    }
}
