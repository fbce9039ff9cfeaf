use serde::Serialize;

use crate::model::{EntityError, EntityRecord, EntityStatus};

/// agency.txt
#[derive(Debug, Clone, Default, Serialize)]
pub struct Agency {
    pub agency_id: String,
    pub agency_name: String,
    pub agency_url: String,
    pub agency_timezone: String,
    pub agency_lang: Option<String>,
    pub agency_phone: Option<String>,
    pub agency_fare_url: Option<String>,
    pub agency_email: Option<String>,
    #[serde(skip)]
    pub status: EntityStatus,
}

impl Agency {
    pub const FILENAME: &'static str = "agency.txt";
}

impl EntityRecord for Agency {
    fn filename(&self) -> &'static str {
        Agency::FILENAME
    }

    fn entity_id(&self) -> &str {
        &self.agency_id
    }

    fn status(&self) -> Option<&EntityStatus> {
        Some(&self.status)
    }

    fn status_mut(&mut self) -> Option<&mut EntityStatus> {
        Some(&mut self.status)
    }

    fn validate(&self) -> Vec<EntityError> {
        let mut errors = vec![];
        super::require(&mut errors, "agency_name", &self.agency_name);
        super::require(&mut errors, "agency_url", &self.agency_url);
        super::require(&mut errors, "agency_timezone", &self.agency_timezone);
        errors
    }
}
