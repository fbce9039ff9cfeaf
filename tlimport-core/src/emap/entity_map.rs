use std::collections::HashMap;

use crate::model::EntityError;

/// maps (file, source identifier) to the identifier assigned when the entity
/// was written. populated by the copier, one file at a time, and read by
/// entities rewriting their references and by builders during finalization.
#[derive(Debug, Default, Clone)]
pub struct EntityMap {
    ids: HashMap<&'static str, HashMap<String, String>>,
}

impl EntityMap {
    pub fn new() -> EntityMap {
        EntityMap::default()
    }

    pub fn set(&mut self, file: &'static str, old_id: &str, new_id: &str) {
        self.ids
            .entry(file)
            .or_default()
            .insert(old_id.to_string(), new_id.to_string());
    }

    /// the written identifier for an entity, or None if the entity was
    /// filtered out or has not been written yet.
    pub fn get(&self, file: &str, old_id: &str) -> Option<&str> {
        self.ids
            .get(file)
            .and_then(|m| m.get(old_id))
            .map(|s| s.as_str())
    }

    pub fn contains(&self, file: &str, old_id: &str) -> bool {
        self.get(file, old_id).is_some()
    }

    /// number of entities recorded for a file.
    pub fn count(&self, file: &str) -> usize {
        self.ids.get(file).map(|m| m.len()).unwrap_or_default()
    }

    /// rewrites a required reference in place.
    pub fn update_key(
        &self,
        value: &mut String,
        file: &'static str,
        field: &'static str,
    ) -> Result<(), EntityError> {
        match self.get(file, value) {
            Some(new_id) => {
                *value = new_id.to_string();
                Ok(())
            }
            None => Err(EntityError::MissingReference {
                field,
                value: value.clone(),
                file,
            }),
        }
    }

    /// rewrites an optional reference in place. an empty value is cleared.
    pub fn update_optional_key(
        &self,
        value: &mut Option<String>,
        file: &'static str,
        field: &'static str,
    ) -> Result<(), EntityError> {
        match value {
            Some(v) if v.is_empty() => {
                *value = None;
                Ok(())
            }
            Some(v) => self.update_key(v, file, field),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EntityMap;
    use crate::model::EntityError;

    #[test]
    fn test_set_then_get() {
        let mut emap = EntityMap::new();
        emap.set("stops.txt", "a", "101");
        assert_eq!(emap.get("stops.txt", "a"), Some("101"));
        assert_eq!(emap.count("stops.txt"), 1);
    }

    #[test]
    fn test_miss() {
        let mut emap = EntityMap::new();
        emap.set("stops.txt", "a", "101");
        assert_eq!(emap.get("stops.txt", "b"), None);
        assert_eq!(emap.get("routes.txt", "a"), None);
    }

    #[test]
    fn test_update_key() {
        let mut emap = EntityMap::new();
        emap.set("routes.txt", "r1", "7");
        let mut route_id = String::from("r1");
        emap.update_key(&mut route_id, "routes.txt", "route_id")
            .expect("reference should resolve");
        assert_eq!(route_id, "7");

        let mut missing = String::from("r2");
        let result = emap.update_key(&mut missing, "routes.txt", "route_id");
        assert!(matches!(
            result,
            Err(EntityError::MissingReference { field: "route_id", .. })
        ));
        assert_eq!(missing, "r2");
    }

    #[test]
    fn test_update_optional_key_clears_empty() {
        let emap = EntityMap::new();
        let mut shape_id = Some(String::new());
        emap.update_optional_key(&mut shape_id, "shapes.txt", "shape_id")
            .expect("empty reference is not an error");
        assert_eq!(shape_id, None);
    }
}
