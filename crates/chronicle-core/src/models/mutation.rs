use super::{Actor, Attributes, AuditAction, EntityRef};

/// What the mutation hook reports about one create, update, or delete.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    pub entity: EntityRef,
    pub action: AuditAction,
    pub before: Option<Attributes>,
    pub after: Option<Attributes>,
    /// Explicit actor. Takes precedence over the ambient one.
    pub actor: Option<Actor>,
    pub comment: Option<String>,
}

impl Mutation {
    pub fn create(entity: EntityRef, after: Attributes) -> Self {
        Self {
            entity,
            action: AuditAction::Create,
            before: None,
            after: Some(after),
            actor: None,
            comment: None,
        }
    }

    pub fn update(entity: EntityRef, before: Attributes, after: Attributes) -> Self {
        Self {
            entity,
            action: AuditAction::Update,
            before: Some(before),
            after: Some(after),
            actor: None,
            comment: None,
        }
    }

    pub fn delete(entity: EntityRef, before: Attributes) -> Self {
        Self {
            entity,
            action: AuditAction::Delete,
            before: Some(before),
            after: None,
            actor: None,
            comment: None,
        }
    }

    pub fn by(mut self, actor: impl Into<Actor>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}
