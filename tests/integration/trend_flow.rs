use super::{perf_mut, snapshot};
use metricgate_app::{TrendRequest, TrendUseCase};
use metricgate_types::{Direction, TrendAxis, TrendDirection};
use std::collections::BTreeMap;

fn request(metric: &str, axis: TrendAxis) -> TrendRequest {
    let snapshots = [(0, 180.0), (1, 170.0), (2, 160.0), (9, 150.0)]
        .into_iter()
        .map(|(day, p95)| {
            let mut s = snapshot(&format!("s{day}"), day, 400, 0, 84.0 + day as f64 / 10.0);
            perf_mut(&mut s, "p95").value = p95;
            s
        })
        .collect();
    TrendRequest {
        snapshots,
        metric: metric.to_string(),
        axis,
        directions: BTreeMap::new(),
    }
}

#[test]
fn latency_falling_is_improving() {
    let result = TrendUseCase::execute(request("performance.p95.ms", TrendAxis::Index)).unwrap();
    assert_eq!(result.trend, TrendDirection::Improving);
    assert!(result.slope < 0.0);
    assert!(result.correlation < -0.9);
}

#[test]
fn elapsed_axis_flattens_the_slope_across_a_gap() {
    let by_index = TrendUseCase::execute(request("performance.p95.ms", TrendAxis::Index)).unwrap();
    let by_time = TrendUseCase::execute(request("performance.p95.ms", TrendAxis::Elapsed)).unwrap();
    assert!(by_time.slope.abs() < by_index.slope.abs());
    assert_eq!(by_time.values, by_index.values);
}

#[test]
fn direction_override_applies_to_trends() {
    let mut req = request("performance.p95.ms", TrendAxis::Index);
    req.directions
        .insert("performance.p95.ms".to_string(), Direction::Higher);
    let result = TrendUseCase::execute(req).unwrap();
    assert_eq!(result.trend, TrendDirection::Declining);
}

#[test]
fn json_path_into_nested_fields() {
    let result = TrendUseCase::execute(request("coverage.lines.covered", TrendAxis::Index)).unwrap();
    let values: Vec<f64> = result.values.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![1680.0, 1682.0, 1684.0, 1698.0]);
}
