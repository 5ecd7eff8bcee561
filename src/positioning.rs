/// Wi-Fi 室内定位流程
///
/// 每个采样周期：
/// - 由窗口内读数构造观测（每个路由器恰好一个读数才参与）
/// - 路由器筛选，不足 3 个则跳过本周期
/// - 几何算法使用筛选后的 3 个路由器，匹配类算法使用全部观测查询训练数据
/// - 输出一个带算法标签的估计点，并更新该算法的"上一次估计"

use crate::algorithms::{
    AccessPointObservation, AlgorithmType, CandidatePoint, Estimate, Point2D, RouterId, RouterSet,
    anchors_from_observations, find_center_point, fingerprint, pattern_matching, require_trio,
    triangulate, weighted_centroid,
};
use crate::config::PositioningConfig;
use crate::error::{ConfigError, Result};
use crate::training::{TrainingStore, get_likeliest_points};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

// ============================================================================
// 采样窗口
// ============================================================================

/// 一个采样窗口内各路由器的原始读数
#[derive(Clone, Debug, PartialEq)]
pub struct ObservationWindow {
    readings: BTreeMap<RouterId, Vec<i32>>,
    timestamp: DateTime<Utc>,
}

impl ObservationWindow {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        ObservationWindow {
            readings: BTreeMap::new(),
            timestamp,
        }
    }

    /// 从 (router_id, rss) 对创建，每个路由器一个读数
    pub fn from_pairs(pairs: Vec<(&str, i32)>) -> Self {
        let mut window = ObservationWindow::new(Utc::now());
        for (id, rss) in pairs {
            window.add_reading(RouterId::from(id), rss);
        }
        window
    }

    pub fn add_reading(&mut self, router: RouterId, rss_dbm: i32) {
        self.readings.entry(router).or_default().push(rss_dbm);
    }

    /// 某路由器在窗口内的全部读数
    pub fn readings(&self, router: &RouterId) -> &[i32] {
        self.readings.get(router).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// 按路由器顺序构造观测；窗口内读数不是恰好一个的路由器被忽略
    pub fn observations(&self, routers: &RouterSet) -> Vec<AccessPointObservation> {
        routers
            .iter()
            .filter_map(|router| match self.readings(&router.id) {
                [rss] => Some(AccessPointObservation::from_router(router, *rss, self.timestamp)),
                _ => None,
            })
            .collect()
    }
}

// ============================================================================
// 会话状态
// ============================================================================

/// 每个算法的"上一次估计"，由调用方持有并在周期之间传递
#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    start: Point2D,
    last: HashMap<AlgorithmType, Point2D>,
}

impl SessionState {
    /// 所有算法都以 `start` 作为初始的上一次估计
    pub fn new(start: Point2D) -> Self {
        SessionState {
            start,
            last: HashMap::new(),
        }
    }

    pub fn last_estimate(&self, algorithm: AlgorithmType) -> Point2D {
        self.last.get(&algorithm).copied().unwrap_or(self.start)
    }

    pub fn update(&mut self, algorithm: AlgorithmType, point: Point2D) {
        self.last.insert(algorithm, point);
    }

    /// 回到初始状态（重新开始回放时使用）
    pub fn reset(&mut self) {
        self.last.clear();
    }
}

// ============================================================================
// 定位引擎
// ============================================================================

/// 定位引擎
pub struct PositioningEngine<S> {
    store: S,
    config: PositioningConfig,
    routers: RouterSet,
}

impl<S: TrainingStore> PositioningEngine<S> {
    pub fn new(store: S, config: PositioningConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let routers = config.router_set();
        Ok(PositioningEngine {
            store,
            config,
            routers,
        })
    }

    pub fn config(&self) -> &PositioningConfig {
        &self.config
    }

    pub fn routers(&self) -> &RouterSet {
        &self.routers
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 以配置的起始点创建新会话
    pub fn new_session(&self) -> SessionState {
        SessionState::new(self.config.calibration_start)
    }

    /// 全部标定点坐标（地图渲染用）
    pub fn training_coordinates(&self) -> Result<Vec<Point2D>> {
        Ok(self.store.all_training_coordinates()?)
    }

    /// 训练数据中记录的路由器坐标，按路由器顺序；存储中没有的路由器被略过
    pub fn router_coordinates(&self) -> Result<Vec<(RouterId, Point2D)>> {
        let mut coordinates = Vec::with_capacity(self.routers.len());
        for router in self.routers.iter() {
            if let Some(point) = self.store.router_coordinate(&router.id)? {
                coordinates.push((router.id.clone(), point));
            }
        }
        Ok(coordinates)
    }

    /// 本次定位的候选标定点（未过滤）
    pub fn candidates(&self, observations: &[AccessPointObservation]) -> Result<Vec<CandidatePoint>> {
        let set = get_likeliest_points(&self.store, observations, &self.config.aggregation)?;
        Ok(set.into_vec())
    }

    /// 对给定观测运行单个算法
    ///
    /// 几何算法要求筛选后恰好 3 个路由器；匹配类算法使用全部观测。
    pub fn locate(
        &self,
        algorithm: AlgorithmType,
        observations: &[AccessPointObservation],
        last_estimate: Point2D,
    ) -> Result<Point2D> {
        let smoothing = &self.config.smoothing;
        match algorithm {
            AlgorithmType::Trilateration => {
                let trio = require_trio(observations)?;
                find_center_point(&anchors_from_observations(&trio, &self.config.distance_model))
            }
            AlgorithmType::Triangulation => {
                let trio = require_trio(observations)?;
                triangulate(&anchors_from_observations(&trio, &self.config.distance_model))
            }
            AlgorithmType::Fingerprinting => {
                fingerprint(self.candidates(observations)?, last_estimate, smoothing)
            }
            AlgorithmType::PatternMatching => {
                pattern_matching(self.candidates(observations)?, last_estimate)
            }
            AlgorithmType::WeightedCentroid => weighted_centroid(
                self.candidates(observations)?,
                &self.routers,
                last_estimate,
                smoothing,
            ),
        }
    }

    /// 一个采样周期的完整定位
    ///
    /// 筛选后不是恰好 3 个路由器时整个周期跳过。成功时更新会话中该算法的上一次估计。
    pub fn estimate(
        &self,
        algorithm: AlgorithmType,
        window: &ObservationWindow,
        session: &mut SessionState,
    ) -> Result<Estimate> {
        let observations = window.observations(&self.routers);
        require_trio(&observations)?;

        let last_estimate = session.last_estimate(algorithm);
        let raw = self.locate(algorithm, &observations, last_estimate)?;
        let point = match &self.config.map_bounds {
            Some(bounds) => bounds.clamp(raw),
            None => raw,
        };
        if point != raw {
            debug!(%algorithm, raw = %raw, clamped = %point, "estimate clamped to map bounds");
        }

        session.update(algorithm, point);
        let router_count = if algorithm.is_geometric() {
            3
        } else {
            observations.len()
        };
        info!(%algorithm, %point, router_count, "estimate");
        Ok(Estimate::with_timestamp(
            algorithm,
            point,
            router_count,
            window.timestamp(),
        ))
    }

    /// 同一窗口依次运行全部五种算法
    pub fn estimate_all(
        &self,
        window: &ObservationWindow,
        session: &mut SessionState,
    ) -> Vec<(AlgorithmType, Result<Estimate>)> {
        AlgorithmType::ALL
            .into_iter()
            .map(|algorithm| (algorithm, self.estimate(algorithm, window, session)))
            .collect()
    }
}
