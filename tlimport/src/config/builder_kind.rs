use serde::{Deserialize, Serialize};

/// the derived-record builders available to an import, registered with
/// the copier in the order they are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuilderKind {
    RouteGeometry,
    RouteHeadway,
    ConvexHull,
    OnestopId,
    RouteStop,
    AgencyPlace,
}

impl BuilderKind {
    pub const ALL: [BuilderKind; 6] = [
        BuilderKind::RouteGeometry,
        BuilderKind::RouteHeadway,
        BuilderKind::ConvexHull,
        BuilderKind::OnestopId,
        BuilderKind::RouteStop,
        BuilderKind::AgencyPlace,
    ];
}
