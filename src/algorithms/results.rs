/// 定位结果数据结构
///
/// 每个采样周期输出一条带算法标签的结果：估计点或错误。

use crate::algorithms::Point2D;
use crate::error::PositioningError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 定位算法类型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmType {
    Trilateration,
    Triangulation,
    Fingerprinting,
    PatternMatching,
    WeightedCentroid,
}

impl AlgorithmType {
    pub const ALL: [AlgorithmType; 5] = [
        AlgorithmType::Trilateration,
        AlgorithmType::Triangulation,
        AlgorithmType::Fingerprinting,
        AlgorithmType::PatternMatching,
        AlgorithmType::WeightedCentroid,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AlgorithmType::Trilateration => "trilateration",
            AlgorithmType::Triangulation => "triangulation",
            AlgorithmType::Fingerprinting => "fingerprinting",
            AlgorithmType::PatternMatching => "pattern_matching",
            AlgorithmType::WeightedCentroid => "weighted_centroid",
        }
    }

    /// 是否只依赖路由器几何（不查询训练数据）
    pub fn is_geometric(&self) -> bool {
        matches!(
            self,
            AlgorithmType::Trilateration | AlgorithmType::Triangulation
        )
    }
}

impl fmt::Display for AlgorithmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        AlgorithmType::ALL
            .into_iter()
            .find(|a| a.name() == normalized)
            .ok_or_else(|| format!("unknown algorithm: {}", s))
    }
}

/// 单次定位估计
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    /// 使用的算法
    pub algorithm: AlgorithmType,
    /// 估计点（像素）
    pub point: Point2D,
    /// 参与定位的路由器数量
    pub router_count: usize,
    /// 时间戳
    pub timestamp: DateTime<Utc>,
}

impl Estimate {
    pub fn new(algorithm: AlgorithmType, point: Point2D, router_count: usize) -> Self {
        Self::with_timestamp(algorithm, point, router_count, Utc::now())
    }

    pub fn with_timestamp(
        algorithm: AlgorithmType,
        point: Point2D,
        router_count: usize,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Estimate {
            algorithm,
            point,
            router_count,
            timestamp,
        }
    }
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({} routers)", self.algorithm, self.point, self.router_count)
    }
}

/// 一个采样周期的输出
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    /// 采样周期的参考时间（录制时间轴，毫秒）
    pub tick_ms: i64,
    pub algorithm: AlgorithmType,
    pub outcome: Result<Estimate, PositioningError>,
}

impl TickReport {
    pub fn estimate(&self) -> Option<&Estimate> {
        self.outcome.as_ref().ok()
    }

    pub fn is_estimate(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// 单个算法的估计轨迹
#[derive(Clone, Debug, Default)]
pub struct EstimateTrack {
    estimates: Vec<Estimate>,
}

impl EstimateTrack {
    pub fn new() -> Self {
        EstimateTrack {
            estimates: Vec::new(),
        }
    }

    pub fn push(&mut self, estimate: Estimate) {
        self.estimates.push(estimate);
    }

    /// 收集回放结果中成功的估计
    pub fn from_reports<'a>(reports: impl IntoIterator<Item = &'a TickReport>) -> Self {
        let mut track = EstimateTrack::new();
        for estimate in reports.into_iter().filter_map(TickReport::estimate) {
            track.push(estimate.clone());
        }
        track
    }

    pub fn last(&self) -> Option<&Estimate> {
        self.estimates.last()
    }

    pub fn all(&self) -> &[Estimate] {
        &self.estimates
    }

    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }

    /// 最近 N 个估计（播放进度条只显示前 N 个点时使用）
    pub fn last_n(&self, n: usize) -> &[Estimate] {
        let start = self.estimates.len().saturating_sub(n);
        &self.estimates[start..]
    }

    /// 前 N 个估计
    pub fn first_n(&self, n: usize) -> &[Estimate] {
        &self.estimates[..n.min(self.estimates.len())]
    }

    /// 导出为 JSON Lines，每行一个估计
    pub fn export_json_lines(&self) -> serde_json::Result<String> {
        let mut out = String::new();
        for estimate in &self.estimates {
            out.push_str(&serde_json::to_string(estimate)?);
            out.push('\n');
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimate(x: f64) -> Estimate {
        Estimate::new(AlgorithmType::Fingerprinting, Point2D::new(x, 0.0), 3)
    }

    #[test]
    fn test_algorithm_type_parse_and_display() {
        for algorithm in AlgorithmType::ALL {
            assert_eq!(algorithm.to_string().parse::<AlgorithmType>(), Ok(algorithm));
        }
        assert_eq!(
            "Weighted Centroid".parse::<AlgorithmType>(),
            Ok(AlgorithmType::WeightedCentroid)
        );
        assert!("kalman".parse::<AlgorithmType>().is_err());
        assert!(AlgorithmType::Triangulation.is_geometric());
        assert!(!AlgorithmType::PatternMatching.is_geometric());
    }

    #[test]
    fn test_estimate_track_windows() {
        let mut track = EstimateTrack::new();
        for x in 0..5 {
            track.push(estimate(x as f64));
        }
        assert_eq!(track.len(), 5);
        assert_eq!(track.last().unwrap().point.x, 4.0);
        assert_eq!(track.last_n(2).len(), 2);
        assert_eq!(track.last_n(2)[0].point.x, 3.0);
        assert_eq!(track.last_n(10).len(), 5);
        assert_eq!(track.first_n(3).len(), 3);
        assert_eq!(track.first_n(30).len(), 5);
    }

    #[test]
    fn test_export_json_lines() {
        let mut track = EstimateTrack::new();
        track.push(estimate(1.0));
        track.push(estimate(2.0));
        let exported = track.export_json_lines().unwrap();
        let lines: Vec<&str> = exported.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: Estimate = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed.algorithm, AlgorithmType::Fingerprinting);
        assert_eq!(parsed.point, Point2D::new(2.0, 0.0));
    }

    #[test]
    fn test_track_from_reports_skips_failures() {
        let reports = vec![
            TickReport {
                tick_ms: 0,
                algorithm: AlgorithmType::Fingerprinting,
                outcome: Ok(estimate(1.0)),
            },
            TickReport {
                tick_ms: 5000,
                algorithm: AlgorithmType::Fingerprinting,
                outcome: Err(PositioningError::NoCandidateMatch),
            },
        ];
        let track = EstimateTrack::from_reports(&reports);
        assert_eq!(track.len(), 1);
    }
}
