use chronicle_core::models::Attributes;
use chronicle_core::traits::TrackedEntity;

/// Assign every attribute `target` supports. Returns the names it refused.
pub fn materialize(target: &mut dyn TrackedEntity, attributes: &Attributes) -> Vec<String> {
    let mut skipped = Vec::new();
    for (name, value) in attributes {
        if !target.has_attribute(name) || !target.set_attribute(name, value.clone()) {
            tracing::debug!(
                entity = %target.entity_ref(),
                attribute = %name,
                "skipping attribute the entity does not support"
            );
            skipped.push(name.clone());
        }
    }
    skipped
}
