use super::GeomError;
use crate::model::gtfs::StopTime;
use crate::model::WideTime;

/// assigns times to every run of stop times without times that lies between
/// two stop times with known times. `positions` holds the distance along the
/// trip for each stop time. the first and last stop times must have a time.
pub fn interpolate_gaps(stop_times: &mut [StopTime], positions: &[f64]) -> Result<usize, GeomError> {
    if positions.len() != stop_times.len() {
        return Err(GeomError::LengthMismatch {
            expected: stop_times.len(),
            found: positions.len(),
        });
    }
    let (first, last) = match (stop_times.first(), stop_times.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return Ok(0),
    };
    for st in [first, last] {
        if st.arrival_time.is_none() && st.departure_time.is_none() {
            return Err(GeomError::MissingEndpointTime(st.stop_sequence));
        }
    }

    let known: Vec<usize> = stop_times
        .iter()
        .enumerate()
        .filter(|(_, st)| st.arrival_time.is_some() || st.departure_time.is_some())
        .map(|(i, _)| i)
        .collect();

    let mut count = 0;
    for pair in known.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        if end - start < 2 {
            continue;
        }
        let t0 = stop_times[start]
            .departure_time
            .or(stop_times[start].arrival_time)
            .map(|t| t.seconds())
            .unwrap_or_default();
        let t1 = stop_times[end]
            .arrival_time
            .or(stop_times[end].departure_time)
            .map(|t| t.seconds())
            .unwrap_or_default();
        if t1 < t0 {
            return Err(GeomError::DecreasingTimes(t0, t1));
        }
        let (d0, d1) = (positions[start], positions[end]);
        for i in start + 1..end {
            let frac = if d1 - d0 > 0.0 {
                ((positions[i] - d0) / (d1 - d0)).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let t = WideTime::from_seconds(t0 + ((t1 - t0) as f64 * frac).round() as u32);
            let st = &mut stop_times[i];
            st.arrival_time = Some(t);
            st.departure_time = Some(t);
            st.interpolated = true;
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn st(seq: u32, time: Option<u32>) -> StopTime {
        StopTime {
            stop_sequence: seq,
            arrival_time: time.map(WideTime::from_seconds),
            departure_time: time.map(WideTime::from_seconds),
            ..Default::default()
        }
    }

    #[test]
    fn test_multiple_gaps() {
        let mut sts = vec![st(1, Some(0)), st(2, None), st(3, None), st(4, Some(300)), st(5, None), st(6, Some(400))];
        let positions = [0.0, 100.0, 200.0, 300.0, 350.0, 400.0];
        let count = interpolate_gaps(&mut sts, &positions).expect("should interpolate");
        assert_eq!(count, 3);
        assert_eq!(sts[1].arrival_time, Some(WideTime::from_seconds(100)));
        assert_eq!(sts[2].arrival_time, Some(WideTime::from_seconds(200)));
        assert_eq!(sts[4].departure_time, Some(WideTime::from_seconds(350)));
    }

    #[test]
    fn test_zero_denominator_assigns_start_time() {
        let mut sts = vec![st(1, Some(60)), st(2, None), st(3, Some(120))];
        let count = interpolate_gaps(&mut sts, &[5.0, 5.0, 5.0]).expect("should interpolate");
        assert_eq!(count, 1);
        assert_eq!(sts[1].arrival_time, Some(WideTime::from_seconds(60)));
    }

    #[test]
    fn test_missing_endpoint() {
        let mut sts = vec![st(1, Some(0)), st(2, None), st(3, None)];
        let result = interpolate_gaps(&mut sts, &[0.0, 1.0, 2.0]);
        assert_eq!(result, Err(GeomError::MissingEndpointTime(3)));
    }
}
