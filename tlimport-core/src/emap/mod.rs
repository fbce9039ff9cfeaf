mod entity_map;

pub use entity_map::EntityMap;
