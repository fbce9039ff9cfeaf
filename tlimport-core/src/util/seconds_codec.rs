//! lists of departure times, written as a single comma-joined column of
//! seconds since midnight.
use itertools::Itertools;
use serde::Serializer;

pub fn serialize<S>(values: &[u32], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&values.iter().join(","))
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    #[derive(Serialize)]
    struct Departures {
        #[serde(serialize_with = "super::serialize")]
        departures: Vec<u32>,
    }

    #[test]
    fn test_departures_are_comma_joined() {
        let row = Departures {
            departures: vec![21600, 22500, 23400],
        };
        let json = serde_json::to_string(&row).expect("serializes");
        assert_eq!(json, r#"{"departures":"21600,22500,23400"}"#);
        let empty = serde_json::to_string(&Departures { departures: vec![] }).expect("serializes");
        assert_eq!(empty, r#"{"departures":""}"#);
    }
}
