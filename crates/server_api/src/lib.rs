use std::sync::Arc;

use async_trait::async_trait;
use shared::{
    domain::{Entity, EntityId, ViewModel},
    error::ValidationResult,
};
use storage::Store;
use thiserror::Error;

pub mod product;

/// Structural conversion between a persisted entity and its view model.
pub trait Mapper<E, V>: Send + Sync {
    fn to_view(&self, entity: E) -> anyhow::Result<V>;
    fn to_entity(&self, view: V) -> anyhow::Result<E>;
}

#[async_trait]
pub trait Validator<V>: Send + Sync {
    async fn validate(&self, view: &V) -> ValidationResult;
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("validation failed with {} error(s)", .0.failures().len())]
    Validation(ValidationResult),
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: EntityId },
    /// Store or mapper failure. Never shown to clients.
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct Created<V> {
    pub id: EntityId,
    pub view: V,
}

/// CRUD over one entity/view-model pair.
///
/// Holds no request state; clones share the same collaborators.
pub struct EntityController<E, V> {
    store: Arc<dyn Store<E>>,
    mapper: Arc<dyn Mapper<E, V>>,
    validator: Arc<dyn Validator<V>>,
}

impl<E, V> Clone for EntityController<E, V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            mapper: Arc::clone(&self.mapper),
            validator: Arc::clone(&self.validator),
        }
    }
}

impl<E: Entity, V: ViewModel> EntityController<E, V> {
    pub fn new(
        store: Arc<dyn Store<E>>,
        mapper: Arc<dyn Mapper<E, V>>,
        validator: Arc<dyn Validator<V>>,
    ) -> Self {
        Self {
            store,
            mapper,
            validator,
        }
    }

    pub async fn list_all(&self) -> Result<Vec<V>, ControllerError> {
        let entities = self.store.read().await?;
        entities
            .into_iter()
            .map(|entity| self.mapper.to_view(entity).map_err(ControllerError::from))
            .collect()
    }

    pub async fn get_by_id(&self, id: EntityId) -> Result<V, ControllerError> {
        let entity = self
            .store
            .read_by_id(id)
            .await?
            .ok_or(ControllerError::NotFound { kind: E::KIND, id })?;
        Ok(self.mapper.to_view(entity)?)
    }

    pub async fn create(&self, view: V) -> Result<Created<V>, ControllerError> {
        let validation = self.validator.validate(&view).await;
        if !validation.is_valid() {
            return Err(ControllerError::Validation(validation));
        }

        let entity = self.mapper.to_entity(view)?;
        let persisted = self.store.create(entity).await?;
        let id = persisted.id();
        let view = self.mapper.to_view(persisted)?;
        Ok(Created { id, view })
    }

    pub async fn update(&self, view: V) -> Result<V, ControllerError> {
        let mut validation = ValidationResult::valid();
        if view.id().is_none() {
            validation.push("id", "required");
        }
        validation.extend(self.validator.validate(&view).await.into_failures());
        if !validation.is_valid() {
            return Err(ControllerError::Validation(validation));
        }

        let entity = self.mapper.to_entity(view)?;
        let id = entity.id();
        let updated = self
            .store
            .update(entity)
            .await?
            .ok_or(ControllerError::NotFound { kind: E::KIND, id })?;
        Ok(self.mapper.to_view(updated)?)
    }

    pub async fn delete(&self, id: EntityId) -> Result<(), ControllerError> {
        self.store.delete(id).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
