use crate::utils::error::{Error, Result};

/// Per-component bookkeeping written by the evaluation routine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentSlot {
    pub name: String,
    pub parent: usize,
}

/// Dotted path from the root component (id 0) down to `id`.
pub fn component_path(components: &[Option<ComponentSlot>], id: usize) -> Result<String> {
    let mut names = Vec::new();
    let mut cur = id;
    loop {
        let slot = components
            .get(cur)
            .ok_or_else(|| {
                Error::InvariantViolation(format!(
                    "component {} out of {}",
                    cur,
                    components.len()
                ))
            })?
            .as_ref()
            .ok_or_else(|| Error::InvariantViolation(format!("component {} not initialized", cur)))?;
        names.push(slot.name.as_str());
        if cur == 0 {
            break;
        }
        // a parent chain longer than the table must contain a cycle
        if names.len() > components.len() {
            return Err(Error::InvariantViolation(format!(
                "component {} has a cyclic parent chain",
                id
            )));
        }
        cur = slot.parent;
    }
    names.reverse();
    Ok(names.join("."))
}

/// Renders a flat index into a multi-dimensional signal array as `[i][j]...`.
pub fn position_suffix(dimensions: &[usize], index: usize) -> String {
    let mut index = index;
    let mut parts = Vec::with_capacity(dimensions.len());
    for &d in dimensions.iter().rev() {
        if d == 0 {
            parts.push("[0]".to_string());
            continue;
        }
        parts.push(format!("[{}]", index % d));
        index /= d;
    }
    parts.reverse();
    parts.concat()
}
