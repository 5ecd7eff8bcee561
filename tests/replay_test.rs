/// 回放流程端到端测试
///
/// 训练数据与配置均从 JSON 加载：
/// - 四个路由器位于 800x600 地图四角
/// - 三个标定点 2101 / 2102 / 2103
/// - 录制会话每 5 秒一组读数，第三组缺少两个路由器

use std::collections::HashSet;
use tokio::sync::mpsc;
use wifinav::algorithms::*;
use wifinav::training::InMemoryTrainingStore;
use wifinav::*;

const CONFIG: &str = r#"{
    "ssid_prefix": "Lab",
    "routers": [
        { "id": "Lab0", "coordinate": { "x": 20, "y": 20 }, "weight": 0.95 },
        { "id": "Lab1", "coordinate": { "x": 780, "y": 20 }, "weight": 0.85 },
        { "id": "Lab2", "coordinate": { "x": 20, "y": 580 }, "weight": 0.80 },
        { "id": "Lab3", "coordinate": { "x": 780, "y": 580 }, "weight": 0.75 }
    ],
    "map_bounds": { "width": 800, "height": 600 },
    "replay": { "interval_ms": 5000, "half_window_ms": 500, "playback_period_ms": 1 }
}"#;

const TRAINING: &str = r#"{
    "routers": [
        { "ssid": "Lab0", "x": 20, "y": 20 },
        { "ssid": "Lab1", "x": 780, "y": 20 },
        { "ssid": "Lab2", "x": 20, "y": 580 },
        { "ssid": "Lab3", "x": 780, "y": 580 }
    ],
    "locations": [
        { "location_id": "2101", "x": 200, "y": 150 },
        { "location_id": "2102", "x": 600, "y": 150 },
        { "location_id": "2103", "x": 400, "y": 450 },
        { "location_id": "hallway", "x": 400, "y": 300 }
    ],
    "samples": [
        { "router": "Lab0", "rss": 45, "location_id": "2101" },
        { "router": "Lab1", "rss": 65, "location_id": "2101" },
        { "router": "Lab2", "rss": 60, "location_id": "2101" },
        { "router": "Lab0", "rss": 65, "location_id": "2102" },
        { "router": "Lab1", "rss": 45, "location_id": "2102" },
        { "router": "Lab3", "rss": 60, "location_id": "2102" },
        { "router": "Lab2", "rss": 50, "location_id": "2103" },
        { "router": "Lab3", "rss": 50, "location_id": "2103" },
        { "router": "Lab0", "rss": 55, "location_id": "unmapped" }
    ]
}"#;

fn engine() -> PositioningEngine<InMemoryTrainingStore> {
    let config = PositioningConfig::from_json_str(CONFIG).unwrap();
    let store = InMemoryTrainingStore::from_json_str(TRAINING).unwrap();
    PositioningEngine::new(store, config).unwrap()
}

/// 以录制文件名作为序列名载入
fn recording(engine: &PositioningEngine<InMemoryTrainingStore>) -> ReplaySession {
    let config = engine.config();
    let mut session = ReplaySession::new(config.replay);
    let rows: [(&str, [i32; 3]); 4] = [
        ("Lab0.csv", [-45, -65, -45]),
        ("Lab1.csv", [-65, -45, -65]),
        ("Lab2.csv", [-60, -80, -60]),
        ("Lab3.csv", [-85, -60, -85]),
    ];
    for (label, values) in rows {
        for (i, rss) in values.into_iter().enumerate() {
            // 第三组只录到 Lab0 与 Lab1
            if i == 2 && (label == "Lab2.csv" || label == "Lab3.csv") {
                continue;
            }
            let t = 1_700_000_000_000 + i as i64 * 5000 + 40;
            assert!(session.add_labeled_reading(engine.routers(), &config.ssid_prefix, label, t, rss));
        }
    }
    session
}

#[test]
fn test_replay_pattern_matching_follows_calibration_points() {
    let engine = engine();
    let session = recording(&engine);
    let mut state = engine.new_session();

    let reports = replay(&engine, &session, AlgorithmType::PatternMatching, &mut state);
    assert_eq!(reports.len(), 3);

    let points: Vec<Option<Point2D>> = reports.iter().map(|r| r.estimate().map(|e| e.point)).collect();
    assert_eq!(
        points,
        vec![Some(Point2D::new(200.0, 150.0)), Some(Point2D::new(600.0, 150.0)), None]
    );
    assert_eq!(
        state.last_estimate(AlgorithmType::PatternMatching),
        Point2D::new(600.0, 150.0)
    );
    // 其它算法的上一次估计不受影响
    assert_eq!(
        state.last_estimate(AlgorithmType::Fingerprinting),
        Point2D::new(500.0, 500.0)
    );
}

#[test]
fn test_replay_tracks_stay_inside_map() {
    let engine = engine();
    let session = recording(&engine);
    let bounds = engine.config().map_bounds.unwrap();

    let tracks = replay_tracks(&engine, &session);
    let algorithms: HashSet<AlgorithmType> = tracks.keys().copied().collect();
    assert_eq!(algorithms.len(), 5);

    for (algorithm, track) in &tracks {
        assert!(track.len() <= 2, "{} produced {} points", algorithm, track.len());
        for estimate in track.all() {
            assert!(bounds.contains(&estimate.point), "{} -> {}", algorithm, estimate.point);
        }
    }
    assert_eq!(tracks[&AlgorithmType::Fingerprinting].len(), 2);

    let exported = tracks[&AlgorithmType::PatternMatching].export_json_lines().unwrap();
    assert_eq!(exported.lines().count(), 2);
    assert!(exported.contains("pattern_matching"));
}

#[test]
fn test_engine_exposes_map_data() {
    let engine = engine();
    assert_eq!(engine.training_coordinates().unwrap().len(), 4);
    assert_eq!(engine.router_coordinates().unwrap().len(), 4);
}

#[tokio::test]
async fn test_playback_over_channel() {
    let (tx, mut rx) = mpsc::channel(8);

    let producer = tokio::spawn(async move {
        let engine = engine();
        let mut session = recording(&engine);
        session.set_truth_path(vec![Point2D::new(210.0, 140.0), Point2D::new(590.0, 160.0)]);
        let mut state = engine.new_session();
        run_playback(&engine, &session, AlgorithmType::Fingerprinting, &mut state, tx).await
    });

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    assert_eq!(producer.await.unwrap(), 3);

    assert!(matches!(&events[0], PlaybackEvent::TruthPath(path) if path.len() == 2));
    let estimates = events
        .iter()
        .filter(|e| matches!(e, PlaybackEvent::Estimate { .. }))
        .count();
    assert_eq!(estimates, 2);
    assert!(matches!(
        events.iter().rev().nth(1),
        Some(PlaybackEvent::NoEstimate {
            reason: PositioningError::InsufficientRouters { available: 2, required: 3 },
            ..
        })
    ));
    assert_eq!(events.last(), Some(&PlaybackEvent::Finished { ticks: 3 }));
}
