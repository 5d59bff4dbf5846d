//! Goal-route discovery.
//!
//! Each goal contributes an ordered per-second puck path from the tracking
//! feed. Paths reduce to exact arithmetic features and cluster with
//! density-based grouping (DBSCAN) on a 5-D vector; sparse routes fall out
//! as noise. Best-effort pattern discovery for visualization, not part of
//! the season totals.

use serde::{Deserialize, Serialize};

use crate::config::ClusterParams;
use crate::models::GameId;

/// One goal's puck path, sampled once per second.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalRoute {
    pub game_id: GameId,
    pub event_idx: usize,
    pub points: Vec<(f64, f64)>,
}

/// Exact path features for one route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteFeatures {
    /// Straight-line release-to-goal distance
    pub straight_dist: f64,
    /// Cumulative polyline length
    pub path_len: f64,
    /// path_len / straight_dist, 1.0 when degenerate
    pub curvature: f64,
    pub lateral_disp: f64,
    pub longitudinal_disp: f64,
}

/// Feature arithmetic; `None` for an empty path.
pub fn extract_features(points: &[(f64, f64)]) -> Option<RouteFeatures> {
    let (first, last) = (points.first()?, points.last()?);
    let dx = last.0 - first.0;
    let dy = last.1 - first.1;
    let straight_dist = (dx * dx + dy * dy).sqrt();

    let path_len: f64 = points
        .windows(2)
        .map(|w| {
            let (x0, y0) = w[0];
            let (x1, y1) = w[1];
            ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt()
        })
        .sum();

    let curvature = if straight_dist > f64::EPSILON { path_len / straight_dist } else { 1.0 };

    Some(RouteFeatures {
        straight_dist,
        path_len,
        curvature,
        lateral_disp: dy.abs(),
        longitudinal_disp: dx.abs(),
    })
}

/// 5-D clustering vector: endpoints plus scaled curvature.
fn feature_vector(route: &GoalRoute, params: &ClusterParams) -> Option<[f64; 5]> {
    let features = extract_features(&route.points)?;
    let (sx, sy) = *route.points.first()?;
    let (ex, ey) = *route.points.last()?;
    Some([sx, sy, ex, ey, features.curvature * params.curvature_scale])
}

fn dist(a: &[f64; 5], b: &[f64; 5]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
}

/// One discovered route group; `members` index into the input slice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteCluster {
    pub id: usize,
    pub members: Vec<usize>,
}

impl RouteCluster {
    pub fn population(&self) -> usize {
        self.members.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Label {
    Unvisited,
    Noise,
    Cluster(usize),
}

/// DBSCAN over the route set. Routes with no extractable features and
/// routes in sparse neighborhoods are noise and appear in no cluster.
/// Clusters come back ranked by population, most common route first.
pub fn cluster_routes(routes: &[GoalRoute], params: &ClusterParams) -> Vec<RouteCluster> {
    // Compact index space over the routes that yielded a feature vector
    let items: Vec<(usize, [f64; 5])> = routes
        .iter()
        .enumerate()
        .filter_map(|(i, r)| feature_vector(r, params).map(|v| (i, v)))
        .collect();

    let neighbors = |k: usize| -> Vec<usize> {
        (0..items.len())
            .filter(|&m| m != k && dist(&items[k].1, &items[m].1) <= params.eps)
            .collect()
    };

    let mut labels = vec![Label::Unvisited; items.len()];
    let mut clusters: Vec<RouteCluster> = Vec::new();

    for k in 0..items.len() {
        if labels[k] != Label::Unvisited {
            continue;
        }
        let seed_neighbors = neighbors(k);
        // A core point needs min_samples in its neighborhood, itself included
        if seed_neighbors.len() + 1 < params.min_samples {
            labels[k] = Label::Noise;
            continue;
        }

        let cluster_id = clusters.len();
        labels[k] = Label::Cluster(cluster_id);
        let mut members = vec![items[k].0];
        let mut queue = seed_neighbors;

        while let Some(m) = queue.pop() {
            match labels[m] {
                Label::Cluster(_) => continue,
                Label::Noise => {
                    // Border point reachable from a core point
                    labels[m] = Label::Cluster(cluster_id);
                    members.push(items[m].0);
                    continue;
                }
                Label::Unvisited => {
                    labels[m] = Label::Cluster(cluster_id);
                    members.push(items[m].0);
                    let next = neighbors(m);
                    if next.len() + 1 >= params.min_samples {
                        queue.extend(next);
                    }
                }
            }
        }

        members.sort_unstable();
        clusters.push(RouteCluster { id: cluster_id, members });
    }

    // Most common route first; renumber after ranking
    clusters.sort_by(|a, b| b.population().cmp(&a.population()).then(a.id.cmp(&b.id)));
    for (rank, cluster) in clusters.iter_mut().enumerate() {
        cluster.id = rank;
    }
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(event_idx: usize, points: Vec<(f64, f64)>) -> GoalRoute {
        GoalRoute { game_id: 1, event_idx, points }
    }

    fn straight_route(event_idx: usize, offset: f64) -> GoalRoute {
        route(
            event_idx,
            vec![(20.0 + offset, 0.0), (50.0 + offset, 0.0), (85.0 + offset, 0.0)],
        )
    }

    #[test]
    fn test_feature_arithmetic() {
        let f = extract_features(&[(0.0, 0.0), (30.0, 40.0), (60.0, 0.0)]).unwrap();
        assert!((f.straight_dist - 60.0).abs() < 1e-9);
        assert!((f.path_len - 100.0).abs() < 1e-9, "two 50-ft legs");
        assert!((f.curvature - 100.0 / 60.0).abs() < 1e-9);
        assert!((f.lateral_disp - 0.0).abs() < 1e-9);
        assert!((f.longitudinal_disp - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_path() {
        let f = extract_features(&[(10.0, 10.0)]).unwrap();
        assert_eq!(f.straight_dist, 0.0);
        assert_eq!(f.curvature, 1.0, "degenerate path has unit curvature");
        assert!(extract_features(&[]).is_none());
    }

    #[test]
    fn test_empty_input_clusters_cleanly() {
        let clusters = cluster_routes(&[], &ClusterParams::default());
        assert!(clusters.is_empty());
    }

    #[test]
    fn test_single_route_is_noise() {
        let clusters = cluster_routes(&[straight_route(0, 0.0)], &ClusterParams::default());
        assert!(clusters.is_empty(), "one route cannot reach min_samples");
    }

    #[test]
    fn test_dense_group_clusters_and_outlier_is_noise() {
        let mut routes: Vec<GoalRoute> =
            (0..4).map(|i| straight_route(i, i as f64 * 0.5)).collect();
        // A wildly different wraparound-style route
        routes.push(route(99, vec![(60.0, 40.0), (88.0, 30.0), (95.0, 5.0), (88.0, -2.0)]));

        let clusters = cluster_routes(&routes, &ClusterParams::default());
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].population(), 4);
        assert!(
            !clusters[0].members.contains(&4),
            "the outlier is noise and excluded from every cluster"
        );
    }

    #[test]
    fn test_clusters_ranked_by_population() {
        let mut routes: Vec<GoalRoute> = Vec::new();
        // Group A: 3 center-lane routes
        for i in 0..3 {
            routes.push(straight_route(i, i as f64 * 0.5));
        }
        // Group B: 5 left-wing routes, far from group A
        for i in 0..5 {
            routes.push(route(
                10 + i,
                vec![(0.0, 35.0 + i as f64 * 0.4), (40.0, 35.0), (80.0, 30.0)],
            ));
        }
        let clusters = cluster_routes(&routes, &ClusterParams::default());
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].population(), 5, "most common route first");
        assert_eq!(clusters[0].id, 0);
        assert_eq!(clusters[1].population(), 3);
    }
}
