use tlimport_core::emap::EntityMap;
use tlimport_core::geom::GeomCache;
use tlimport_core::model::Entity;

use super::{CopierError, CopyResult};
use crate::adapter::Writer;

/// handed to each [`super::Finalizer`] once the source is exhausted. derived
/// records written through the context are stamped with the feed version.
pub struct FinalizeContext<'a> {
    pub feed_version_id: i64,
    pub emap: &'a EntityMap,
    pub geom_cache: &'a GeomCache,
    writer: &'a mut dyn Writer,
    result: &'a mut CopyResult,
}

impl<'a> FinalizeContext<'a> {
    pub(crate) fn new(
        feed_version_id: i64,
        emap: &'a EntityMap,
        geom_cache: &'a GeomCache,
        writer: &'a mut dyn Writer,
        result: &'a mut CopyResult,
    ) -> FinalizeContext<'a> {
        FinalizeContext {
            feed_version_id,
            emap,
            geom_cache,
            writer,
            result,
        }
    }

    pub fn write(&mut self, entity: impl Into<Entity>) -> Result<String, CopierError> {
        let mut entity = entity.into();
        self.stamp(&mut entity);
        let id = self.writer.add_entity(&entity)?;
        self.result.add_inserted(entity.filename(), 1);
        Ok(id)
    }

    pub fn write_all(&mut self, entities: Vec<Entity>) -> Result<Vec<String>, CopierError> {
        let mut entities = entities;
        for e in entities.iter_mut() {
            self.stamp(e);
        }
        let ids = self.writer.add_entities(&entities)?;
        for e in entities.iter() {
            self.result.add_inserted(e.filename(), 1);
        }
        Ok(ids)
    }

    fn stamp(&self, entity: &mut Entity) {
        if let Some(scoped) = entity.record_mut().as_feed_version_scoped() {
            scoped.set_feed_version_id(self.feed_version_id);
        }
    }
}
