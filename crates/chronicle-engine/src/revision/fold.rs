use chronicle_core::models::{Attributes, AuditRecord};

/// Left fold of the records' new-value projections.
///
/// `records` must be in ascending version order. Later values overwrite
/// earlier ones; attributes a record does not mention keep their value.
pub fn fold(records: &[AuditRecord]) -> Attributes {
    let mut state = Attributes::new();
    for record in records {
        fold_into(&mut state, record);
    }
    state
}

/// Apply one record on top of `state`.
pub fn fold_into(state: &mut Attributes, record: &AuditRecord) {
    for (name, change) in record.changes.iter() {
        state.insert(name.clone(), change.new.clone());
    }
}
