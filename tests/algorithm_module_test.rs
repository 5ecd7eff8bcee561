/// 算法模块综合测试
///
/// 通过公开接口验证各定位组件的关键性质

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use wifinav::algorithms::*;

    fn observation(id: &str, rss: i32) -> AccessPointObservation {
        AccessPointObservation::new(RouterId::from(id), rss, Point2D::default(), Utc::now())
    }

    fn candidate(id: &str, x: f64, y: f64, diffs: &[(&str, i32)]) -> CandidatePoint {
        let (first, rest) = diffs.split_first().expect("at least one router");
        let mut c = CandidatePoint::new(id, Point2D::new(x, y), RouterId::from(first.0), first.1);
        for (router, diff) in rest {
            c.record_match(RouterId::from(*router), *diff);
        }
        c
    }

    fn anchors_for(points: [(f64, f64); 3], truth: Point2D) -> [Anchor; 3] {
        points.map(|(x, y)| Anchor::new(x, y, Point2D::new(x, y).distance_to(&truth)))
    }

    #[test]
    fn test_distance_grows_as_signal_weakens() {
        let model = DistanceModel::default();
        let mut previous = 0.0;
        for rss in (-100..=-20).rev() {
            let d = model.distance_meters(rss);
            assert!(d > previous, "{} dBm gave {} m", rss, d);
            previous = d;
        }
        // 像素距离只是米距离的线性换算
        let ratio = model.distance_pixels(-60) / model.distance_meters(-60);
        assert!((ratio - model.distance_pixels(-75) / model.distance_meters(-75)).abs() < 1e-9);
    }

    #[test]
    fn test_router_selector_drops_weakest_of_four() {
        let observations: Vec<_> = [("A", -40), ("B", -55), ("C", -30), ("D", -70)]
            .into_iter()
            .map(|(id, rss)| observation(id, rss))
            .collect();

        let selected = select_routers(&observations);
        let rss: Vec<i32> = selected.iter().map(|o| o.rss_dbm()).collect();
        assert_eq!(rss, vec![-40, -55, -30]);

        let trio = require_trio(&observations).unwrap();
        assert_eq!(trio[2].router_id().as_str(), "C");

        // 三个观测原样返回
        assert_eq!(select_routers(&observations[..3]).len(), 3);
    }

    #[test]
    fn test_rank_and_filter_is_idempotent() {
        let mut a = candidate("a", 0.0, 0.0, &[("R0", 3)]);
        a.record_match(RouterId::from("R1"), 2);
        let mut b = candidate("b", 10.0, 0.0, &[("R0", 1)]);
        b.record_match(RouterId::from("R2"), 4);
        let c = candidate("c", 20.0, 0.0, &[("R0", 0)]);

        let once = rank_and_filter(vec![a, c, b]);
        assert_eq!(once.len(), 2);
        assert_eq!(rank_and_filter(once.clone()), once);
    }

    #[test]
    fn test_fingerprinting_with_three_candidates_matches_choose_best() {
        let last = Point2D::new(500.0, 500.0);
        let candidates = vec![
            candidate("101", 100.0, 100.0, &[("R0", 4)]),
            candidate("102", 300.0, 100.0, &[("R0", 2)]),
            candidate("103", 300.0, 300.0, &[("R0", 6)]),
        ];
        let expected = choose_best(&candidates, last).unwrap().coordinate;
        let actual = fingerprint(candidates, last, &SmoothingParams::default()).unwrap();
        assert_eq!(actual, expected);
        assert_eq!(actual, Point2D::new(300.0, 100.0));
    }

    #[test]
    fn test_fingerprinting_snaps_to_best_point() {
        // 最佳点离上一次估计 50px，四近邻质心 (200, 0) 离上一次估计 200px
        let last = Point2D::new(0.0, 0.0);
        let candidates = vec![
            candidate("best", 50.0, 0.0, &[("R0", 1)]),
            candidate("far1", 250.0, 0.0, &[("R0", 5)]),
            candidate("far2", 250.0, 0.0, &[("R0", 6)]),
            candidate("far3", 250.0, 0.0, &[("R0", 7)]),
        ];
        let point = fingerprint(candidates, last, &SmoothingParams::default()).unwrap();
        assert_eq!(point, Point2D::new(50.0, 0.0));
    }

    #[test]
    fn test_weighted_centroid_snaps_to_best_point() {
        let routers = RouterSet::from_vec(vec![Router::new("R0", 0.0, 0.0, 0.6)]);
        let last = Point2D::new(500.0, 500.0);
        // 加权点 (300, 330) 离上一次估计约 262px，最佳点只有 50px
        let candidates = vec![candidate("room", 500.0, 550.0, &[("R0", 2)])];
        let point = weighted_centroid(candidates, &routers, last, &SmoothingParams::default()).unwrap();
        assert_eq!(point, Point2D::new(500.0, 550.0));
    }

    #[test]
    fn test_weighted_centroid_keeps_nearby_weighted_point() {
        let routers = RouterSet::from_vec(vec![
            Router::new("R0", 0.0, 0.0, 0.95),
            Router::new("R1", 0.0, 0.0, 0.85),
        ]);
        let last = Point2D::new(100.0, 100.0);
        let candidates = vec![candidate("room", 100.0, 100.0, &[("R0", 2), ("R1", 3)])];
        let point = weighted_centroid(candidates, &routers, last, &SmoothingParams::default()).unwrap();
        assert!((point.x - 90.0).abs() < 1e-9);
        assert!((point.y - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_geometric_algorithms_recover_ground_truth() {
        let truth = Point2D::new(30.0, 40.0);
        let anchors = anchors_for([(0.0, 0.0), (100.0, 0.0), (0.0, 100.0)], truth);

        for point in [find_center_point(&anchors).unwrap(), triangulate(&anchors).unwrap()] {
            assert!((point.x - truth.x).abs() < 1e-6, "{}", point);
            assert!((point.y - truth.y).abs() < 1e-6, "{}", point);
        }
    }

    #[test]
    fn test_triangulation_ignores_first_two_y_differences() {
        // B 恒为 0：只改变 p1.y 时，解只通过 E 中的 y1 项变化
        let base = [Anchor::new(0.0, 0.0, 50.0), Anchor::new(100.0, 0.0, 80.0), Anchor::new(0.0, 100.0, 60.0)];
        let mut shifted = base;
        shifted[0].center.y = 37.0;

        let a = triangulate(&base).unwrap();
        let b = triangulate(&shifted).unwrap();
        // A、C、D 不依赖 y1，行列式不变，x 解按 E 的变化量 -y1² / A 平移
        let expected_dx = -(37.0_f64 * 37.0) / 200.0;
        assert!((b.x - a.x - expected_dx).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_geometry_is_reported() {
        let collinear = [Anchor::new(0.0, 0.0, 10.0), Anchor::new(50.0, 0.0, 10.0), Anchor::new(100.0, 0.0, 10.0)];
        assert!(matches!(
            find_center_point(&collinear),
            Err(wifinav::PositioningError::DegenerateGeometry { algorithm: AlgorithmType::Trilateration, .. })
        ));
    }

    #[test]
    fn test_algorithm_type_parsing() {
        for algorithm in AlgorithmType::ALL {
            assert_eq!(algorithm.name().parse::<AlgorithmType>().unwrap(), algorithm);
        }
        assert_eq!("weighted centroid".parse::<AlgorithmType>().unwrap(), AlgorithmType::WeightedCentroid);
        assert!("dead reckoning".parse::<AlgorithmType>().is_err());
    }
}
