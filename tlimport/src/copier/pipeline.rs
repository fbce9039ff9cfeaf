use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use tlimport_core::emap::EntityMap;
use tlimport_core::geom::{GeomCache, StopGeom};
use tlimport_core::model::gtfs::{
    Agency, Calendar, CalendarDate, Route, Shape, Stop, StopTime, Trip,
};
use tlimport_core::model::{Entity, EntityError, EntityStatus};

use super::{CopierError, CopierOptions, CopyResult, Extension, FinalizeContext};
use crate::adapter::{Reader, Writer};

/// copies one feed version from a [`Reader`] to a [`Writer`].
///
/// files are copied in reference order (agencies, stops, routes, calendars,
/// calendar dates, shapes, trips, stop times) so that every reference can be
/// rewritten through the [`EntityMap`] when an entity is written. extensions
/// observe each entity and are finalized, in registration order, once the
/// source is exhausted.
pub struct Copier<'a> {
    reader: &'a mut dyn Reader,
    state: CopierState<'a>,
}

/// everything the copier mutates while the reader is streaming.
struct CopierState<'a> {
    writer: &'a mut dyn Writer,
    options: CopierOptions,
    extensions: Vec<Box<dyn Extension>>,
    emap: EntityMap,
    geom_cache: GeomCache,
    result: CopyResult,
    /// source id of the only agency in the feed
    default_agency: Option<String>,
    /// stop pattern (written stop ids) to source id of the generated shape
    generated_shapes: HashMap<Vec<String>, String>,
    pending_stop_times: Vec<Entity>,
}

impl<'a> Copier<'a> {
    pub fn new(
        reader: &'a mut dyn Reader,
        writer: &'a mut dyn Writer,
        options: CopierOptions,
        extensions: Vec<Box<dyn Extension>>,
    ) -> Copier<'a> {
        Copier {
            reader,
            state: CopierState {
                writer,
                options,
                extensions,
                emap: EntityMap::new(),
                geom_cache: GeomCache::new(),
                result: CopyResult::default(),
                default_agency: None,
                generated_shapes: HashMap::new(),
                pending_stop_times: vec![],
            },
        }
    }

    /// runs the import. a systemic failure stops the pass and is returned in
    /// [`CopyResult::error`] along with the tallies up to that point.
    pub fn copy(mut self) -> CopyResult {
        let names = self.state.extensions.iter().map(|e| e.name()).join(", ");
        log::info!(
            "copying feed version {} with extensions [{names}]",
            self.state.options.feed_version_id
        );
        if let Err(e) = self.run() {
            log::error!("import aborted: {e}");
            if let Err(flush_error) = self.state.writer.flush() {
                log::error!("failure flushing partial results: {flush_error}");
            }
            self.state.result.error = Some(e);
        }
        self.state.result
    }

    fn run(&mut self) -> Result<(), CopierError> {
        let Copier { reader, state } = self;

        let mut agencies: Vec<String> = vec![];
        reader.each(Agency::FILENAME, &mut |e| {
            let id = e.entity_id().to_string();
            if state.copy_entity(e)?.is_some() {
                agencies.push(id);
            }
            Ok(())
        })?;
        if agencies.len() == 1 {
            state.default_agency = agencies.pop();
        }
        state.log_progress(Agency::FILENAME);

        state.copy_stops(&mut **reader)?;
        state.log_progress(Stop::FILENAME);

        reader.each(Route::FILENAME, &mut |e| state.copy_entity(e).map(|_| ()))?;
        state.log_progress(Route::FILENAME);

        let mut service_ids: HashSet<String> = HashSet::new();
        reader.each(Calendar::FILENAME, &mut |e| {
            service_ids.insert(e.entity_id().to_string());
            state.copy_entity(e).map(|_| ())
        })?;
        state.log_progress(Calendar::FILENAME);

        state.copy_calendar_dates(&mut **reader, &service_ids)?;
        state.log_progress(CalendarDate::FILENAME);

        reader.each(Shape::FILENAME, &mut |e| state.copy_entity(e).map(|_| ()))?;
        state.log_progress(Shape::FILENAME);

        state.copy_trips(&mut **reader)?;
        state.log_progress(Trip::FILENAME);
        state.log_progress(StopTime::FILENAME);

        state.finalize()
    }
}

impl CopierState<'_> {
    fn log_progress(&self, file: &str) {
        log::info!(
            "{file}: {} written, {} skipped",
            self.result.inserted_count(file),
            self.result.skipped_count(file)
        );
    }

    /// validates, re-identifies and writes a single entity. returns the
    /// assigned id, or None when the entity was skipped.
    fn copy_entity(&mut self, entity: Entity) -> Result<Option<String>, CopierError> {
        match self.prepare(entity)? {
            Some(e) => self.write(e).map(Some),
            None => Ok(None),
        }
    }

    /// runs validation and pre-write hooks, then rewrites references. returns
    /// None when the entity must be skipped.
    fn prepare(&mut self, mut entity: Entity) -> Result<Option<Entity>, CopierError> {
        let file = entity.filename();
        let errors = entity.record().validate();
        if let Some(status) = entity.record_mut().status_mut() {
            status.errors.extend(errors);
        }

        for ext in self.extensions.iter_mut() {
            if let Some(v) = ext.as_after_validator() {
                v.after_validator(&entity)?;
            }
        }

        let old_id = entity.entity_id().to_string();
        if !old_id.is_empty() && self.emap.contains(file, &old_id) {
            add_error(&mut entity, EntityError::DuplicateId(old_id, file));
            self.skip(&entity, false);
            return Ok(None);
        }

        if let (Entity::Route(route), Some(agency_id)) = (&mut entity, &self.default_agency) {
            if route.agency_id.is_empty() {
                route.agency_id = agency_id.clone();
            }
        }

        if !entity.errors().is_empty() && !self.options.allow_entity_errors {
            self.skip(&entity, false);
            return Ok(None);
        }

        if let Err(e) = entity.record_mut().update_keys(&self.emap) {
            add_error(&mut entity, e);
            if !self.options.allow_reference_errors {
                self.skip(&entity, true);
                return Ok(None);
            }
        }
        Ok(Some(entity))
    }

    fn write(&mut self, entity: Entity) -> Result<String, CopierError> {
        let id = self.writer.add_entity(&entity)?;
        self.commit(&id, &entity)?;
        Ok(id)
    }

    /// records a written entity and dispatches post-write hooks.
    fn commit(&mut self, id: &str, entity: &Entity) -> Result<(), CopierError> {
        let file = entity.filename();
        let old_id = entity.entity_id();
        if !old_id.is_empty() || matches!(entity, Entity::Agency(_)) {
            self.emap.set(file, old_id, id);
        }
        self.result.add_inserted(file, 1);
        self.result.add_warnings(file, entity.warnings().len());
        self.result.add_errors(file, old_id, entity.errors());

        if let Some(located) = entity.record().as_point_geometry() {
            if let Some(point) = located.point() {
                let name = located.display_name().map(String::from);
                self.geom_cache.add_stop(id, StopGeom { point, name });
            }
        }
        if let Entity::Shape(shape) = entity {
            let distances = shape.shape_dist_traveled.as_deref();
            if let Err(e) = self
                .geom_cache
                .add_shape(id, &shape.geometry, distances, shape.generated)
            {
                log::warn!("shape '{old_id}' was written but not cached: {e}");
            }
        }

        for ext in self.extensions.iter_mut() {
            if let Some(w) = ext.as_after_write() {
                w.after_write(id, entity, &self.emap)?;
            }
        }
        Ok(())
    }

    fn skip(&mut self, entity: &Entity, reference_error: bool) {
        let file = entity.filename();
        log::debug!(
            "skipping {file} '{}': {}",
            entity.entity_id(),
            entity.errors().iter().join("; ")
        );
        self.result.add_errors(file, entity.entity_id(), entity.errors());
        self.result.add_skipped(file, reference_error, 1);
    }

    /// stations and stops without a parent are written first, then stops
    /// whose parent has been written, one level of the hierarchy at a time.
    fn copy_stops(&mut self, reader: &mut dyn Reader) -> Result<(), CopierError> {
        let mut children: Vec<Entity> = vec![];
        reader.each(Stop::FILENAME, &mut |e| {
            if matches!(&e, Entity::Stop(s) if s.parent_station.is_some()) {
                children.push(e);
                Ok(())
            } else {
                self.copy_entity(e).map(|_| ())
            }
        })?;

        while !children.is_empty() {
            let (ready, waiting): (Vec<Entity>, Vec<Entity>) =
                children.into_iter().partition(|e| match e {
                    Entity::Stop(s) => s
                        .parent_station
                        .as_deref()
                        .is_some_and(|p| self.emap.contains(Stop::FILENAME, p)),
                    _ => true,
                });
            // what remains references missing or cyclic parents and fails in update_keys
            let (batch, rest) = if ready.is_empty() {
                (waiting, vec![])
            } else {
                (ready, waiting)
            };
            for e in batch {
                self.copy_entity(e)?;
            }
            children = rest;
        }
        Ok(())
    }

    /// services that appear only in calendar_dates.txt get a generated
    /// calendar spanning their exception dates, written before the dates.
    fn copy_calendar_dates(
        &mut self,
        reader: &mut dyn Reader,
        service_ids: &HashSet<String>,
    ) -> Result<(), CopierError> {
        let mut dates: Vec<Entity> = vec![];
        reader.each(CalendarDate::FILENAME, &mut |e| {
            dates.push(e);
            Ok(())
        })?;

        let mut generated: Vec<Calendar> = vec![];
        let mut generated_index: HashMap<String, usize> = HashMap::new();
        for e in dates.iter() {
            if let Entity::CalendarDate(cd) = e {
                if cd.service_id.is_empty() || service_ids.contains(&cd.service_id) || cd.status.has_errors() {
                    continue;
                }
                match generated_index.get(&cd.service_id) {
                    Some(i) => generated[*i].expand_to(cd.date),
                    None => {
                        generated_index.insert(cd.service_id.clone(), generated.len());
                        generated.push(Calendar::generated(&cd.service_id, cd.date));
                    }
                }
            }
        }
        for calendar in generated {
            if self.copy_entity(calendar.into())?.is_some() {
                self.result.add_generated(Calendar::FILENAME);
            }
        }
        for e in dates {
            self.copy_entity(e)?;
        }
        Ok(())
    }

    /// trips are held in memory and written when their stop times arrive, so
    /// that trips without enough stop times can be rejected and a missing
    /// shape can be generated from the stop pattern first.
    fn copy_trips(&mut self, reader: &mut dyn Reader) -> Result<(), CopierError> {
        let mut trips: HashMap<String, Trip> = HashMap::new();
        let mut trip_order: Vec<String> = vec![];
        reader.each(Trip::FILENAME, &mut |e| {
            if let Entity::Trip(mut trip) = e {
                if trips.contains_key(&trip.trip_id) {
                    let id = trip.trip_id.clone();
                    trip.status.add_error(EntityError::DuplicateId(id, Trip::FILENAME));
                    self.skip(&Entity::Trip(trip), false);
                } else {
                    trip_order.push(trip.trip_id.clone());
                    trips.insert(trip.trip_id.clone(), trip);
                }
            }
            Ok(())
        })?;
        log::info!("read {} trips", trips.len());

        reader.stop_times_by_trip(&mut |group| {
            let trip = group.first().and_then(|st| trips.remove(&st.trip_id));
            self.copy_trip(trip, group)
        })?;
        self.flush_stop_times()?;

        for trip_id in trip_order {
            if let Some(mut trip) = trips.remove(&trip_id) {
                trip.status.add_error(EntityError::NoStopTimes(trip_id));
                self.copy_entity(trip.into())?;
            }
        }
        Ok(())
    }

    fn copy_trip(&mut self, trip: Option<Trip>, group: Vec<StopTime>) -> Result<(), CopierError> {
        let mut trip = match trip {
            Some(t) => t,
            None => {
                self.reject_stop_times(group);
                return Ok(());
            }
        };
        if group.len() < 2 {
            trip.status.add_error(EntityError::InsufficientStopTimes(group.len()));
        } else if trip.shape_id.is_none() && self.options.create_missing_shapes {
            trip.shape_id = self.generated_shape(&group)?;
        }

        let (trip_id, shape_id) = match self.prepare(trip.into())? {
            Some(Entity::Trip(t)) => {
                let shape_id = t.shape_id.clone();
                (self.write(Entity::Trip(t))?, shape_id)
            }
            _ => {
                self.reject_stop_times(group);
                return Ok(());
            }
        };

        let mut kept: Vec<StopTime> = Vec::with_capacity(group.len());
        for st in group {
            if let Some(Entity::StopTime(st)) = self.prepare(st.into())? {
                kept.push(st);
            }
        }

        if self.options.interpolate_stop_times {
            match self
                .geom_cache
                .interpolate_stop_times(shape_id.as_deref(), &mut kept)
            {
                Ok(count) => self.result.interpolated_stop_times += count,
                Err(e) => {
                    log::debug!("failed to interpolate stop times for trip '{trip_id}': {e}");
                    let error = EntityError::from(e);
                    for st in kept.iter_mut() {
                        st.status.add_error(error.clone());
                    }
                    if !self.options.allow_entity_errors {
                        for st in kept {
                            self.skip(&st.into(), false);
                        }
                        return Ok(());
                    }
                }
            }
        } else {
            kept.iter_mut().for_each(StopTime::normalize_times);
        }

        self.pending_stop_times.extend(kept.into_iter().map(Entity::from));
        if self.pending_stop_times.len() >= self.options.stop_time_batch_size {
            self.flush_stop_times()?;
        }
        Ok(())
    }

    /// stop times of a trip that was not written.
    fn reject_stop_times(&mut self, group: Vec<StopTime>) {
        for mut st in group {
            let error = EntityError::MissingReference {
                field: "trip_id",
                value: st.trip_id.clone(),
                file: Trip::FILENAME,
            };
            st.status.add_error(error);
            self.skip(&st.into(), true);
        }
    }

    fn flush_stop_times(&mut self) -> Result<(), CopierError> {
        if self.pending_stop_times.is_empty() {
            return Ok(());
        }
        let batch = std::mem::take(&mut self.pending_stop_times);
        let ids = self.writer.add_entities(&batch)?;
        if ids.len() != batch.len() {
            return Err(CopierError::WriterError {
                file: StopTime::FILENAME.to_string(),
                message: format!("wrote {} of {} stop times", ids.len(), batch.len()),
            });
        }
        for (id, entity) in ids.iter().zip(batch.iter()) {
            self.commit(id, entity)?;
        }
        Ok(())
    }

    /// source id of a shape generated from the stops of a trip, shared by all
    /// trips with the same stop pattern. None when a stop cannot be located.
    fn generated_shape(&mut self, group: &[StopTime]) -> Result<Option<String>, CopierError> {
        let stop_ids: Option<Vec<String>> = group
            .iter()
            .map(|st| self.emap.get(Stop::FILENAME, &st.stop_id).map(String::from))
            .collect();
        let stop_ids = match stop_ids {
            Some(ids) => ids,
            None => return Ok(None),
        };
        if let Some(shape_id) = self.generated_shapes.get(&stop_ids) {
            return Ok(Some(shape_id.clone()));
        }

        let refs: Vec<&str> = stop_ids.iter().map(String::as_str).collect();
        let geometry = match self.geom_cache.make_shape(&refs) {
            Ok(line) => line,
            Err(e) => {
                log::debug!("unable to generate shape: {e}");
                return Ok(None);
            }
        };
        let mut n = self.generated_shapes.len() + 1;
        let mut shape_id = format!("generated-{n}");
        while self.emap.contains(Shape::FILENAME, &shape_id) {
            n += 1;
            shape_id = format!("generated-{n}");
        }
        let shape = Shape {
            shape_id: shape_id.clone(),
            geometry,
            shape_dist_traveled: None,
            generated: true,
            status: EntityStatus::default(),
        };
        match self.copy_entity(shape.into())? {
            Some(_) => {
                self.result.add_generated(Shape::FILENAME);
                self.generated_shapes.insert(stop_ids, shape_id.clone());
                Ok(Some(shape_id))
            }
            None => Ok(None),
        }
    }

    fn finalize(&mut self) -> Result<(), CopierError> {
        let CopierState {
            writer,
            options,
            extensions,
            emap,
            geom_cache,
            result,
            ..
        } = self;
        for ext in extensions.iter_mut() {
            let name = ext.name().to_string();
            if let Some(finalizer) = ext.as_finalizer() {
                log::info!("finalizing {name}");
                let mut ctx =
                    FinalizeContext::new(options.feed_version_id, emap, geom_cache, &mut **writer, result);
                finalizer.finalize(&mut ctx)?;
            }
        }
        writer.flush()
    }
}

fn add_error(entity: &mut Entity, error: EntityError) {
    if let Some(status) = entity.record_mut().status_mut() {
        status.add_error(error);
    }
}
