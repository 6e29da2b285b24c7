use uuid::Uuid;

use super::{KeyValueStore, StoreError};
use crate::config;
use crate::models::BankTemplate;

/// Bank template collection, persisted whole under one key. Every
/// operation is a read-modify-write of the full collection.
pub struct TemplateStore<'a, S: KeyValueStore> {
    store: &'a S,
}

impl<'a, S: KeyValueStore> TemplateStore<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<BankTemplate>, StoreError> {
        match self.store.get(config::TEMPLATES_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(vec![]),
        }
    }

    /// Append a template. Names are not required to be unique; identity
    /// is the id.
    pub fn add(&self, template: &BankTemplate) -> Result<(), StoreError> {
        let mut templates = self.list()?;
        templates.push(template.clone());
        self.save(&templates)
    }

    /// Rename a template. Returns false when no template has that id.
    pub fn rename(&self, id: Uuid, new_name: &str) -> Result<bool, StoreError> {
        let mut templates = self.list()?;
        let Some(template) = templates.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        template.name = new_name.to_string();
        self.save(&templates)?;
        Ok(true)
    }

    pub fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut templates = self.list()?;
        templates.retain(|t| t.id != id);
        self.save(&templates)
    }

    fn save(&self, templates: &[BankTemplate]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(templates)?;
        self.store.set(config::TEMPLATES_KEY, &raw)
    }
}
