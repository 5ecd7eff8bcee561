/// 内存训练数据存储
///
/// 数据以 JSON 描述：
///
/// ```json
/// {
///   "routers":   [{ "ssid": "CiscoLinksysE1200", "x": 120, "y": 80 }],
///   "locations": [{ "location_id": "2101", "x": 140, "y": 95 }],
///   "samples":   [{ "router": "CiscoLinksysE1200", "rss": 52, "location_id": "2101" }]
/// }
/// ```

use crate::algorithms::{Point2D, RouterId};
use crate::error::StoreError;
use crate::training::{CalibrationSample, TrainingStore};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// 路由器位置记录
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouterLocation {
    pub ssid: RouterId,
    pub x: f64,
    pub y: f64,
}

/// 标定点位置记录
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingLocation {
    pub location_id: String,
    pub x: f64,
    pub y: f64,
}

/// 单条标定样本记录
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub router: RouterId,
    /// RSS 幅值（正数）
    pub rss: i32,
    pub location_id: String,
}

/// 训练数据文件内容
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingData {
    #[serde(default)]
    pub routers: Vec<RouterLocation>,
    #[serde(default)]
    pub locations: Vec<TrainingLocation>,
    #[serde(default)]
    pub samples: Vec<TrainingSample>,
}

/// 内存训练数据存储
#[derive(Clone, Debug, Default)]
pub struct InMemoryTrainingStore {
    routers: BTreeMap<RouterId, Point2D>,
    /// 按插入顺序保存的标定点
    locations: Vec<(String, Point2D)>,
    location_index: HashMap<String, usize>,
    /// 每个路由器一张样本表，保持插入顺序
    samples: BTreeMap<RouterId, Vec<CalibrationSample>>,
}

impl InMemoryTrainingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: TrainingData) -> Self {
        let mut store = InMemoryTrainingStore::new();
        for router in data.routers {
            store.add_router(router.ssid, Point2D::new(router.x, router.y));
        }
        for location in data.locations {
            store.add_location(location.location_id, Point2D::new(location.x, location.y));
        }
        for sample in data.samples {
            store.add_sample(sample.router, sample.rss, sample.location_id);
        }
        store
    }

    pub fn from_json_str(json: &str) -> Result<Self, StoreError> {
        let data: TrainingData =
            serde_json::from_str(json).map_err(|e| StoreError::Parse(e.to_string()))?;
        Ok(Self::from_data(data))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| StoreError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// 添加路由器；同时为其建立一张空样本表
    pub fn add_router(&mut self, ssid: RouterId, coordinate: Point2D) {
        self.samples.entry(ssid.clone()).or_default();
        self.routers.insert(ssid, coordinate);
    }

    /// 添加或更新标定点
    pub fn add_location(&mut self, location_id: impl Into<String>, coordinate: Point2D) {
        let location_id = location_id.into();
        match self.location_index.get(&location_id) {
            Some(&index) => self.locations[index].1 = coordinate,
            None => {
                self.location_index
                    .insert(location_id.clone(), self.locations.len());
                self.locations.push((location_id, coordinate));
            }
        }
    }

    pub fn add_sample(&mut self, router: RouterId, rss: i32, location_id: impl Into<String>) {
        self.samples
            .entry(router)
            .or_default()
            .push(CalibrationSample::new(rss, location_id));
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    pub fn sample_count(&self) -> usize {
        self.samples.values().map(Vec::len).sum()
    }
}

impl TrainingStore for InMemoryTrainingStore {
    fn locations_by_rss_band(
        &self,
        router: &RouterId,
        first_bound: i32,
        second_bound: i32,
    ) -> Result<Vec<CalibrationSample>, StoreError> {
        let table = self
            .samples
            .get(router)
            .ok_or_else(|| StoreError::UnknownRouter(router.to_string()))?;
        let low = first_bound.min(second_bound);
        let high = first_bound.max(second_bound);
        Ok(table
            .iter()
            .filter(|sample| sample.rss >= low && sample.rss <= high)
            .cloned()
            .collect())
    }

    fn coordinate_of_location(&self, location_id: &str) -> Result<Option<Point2D>, StoreError> {
        Ok(self
            .location_index
            .get(location_id)
            .map(|&index| self.locations[index].1))
    }

    fn all_training_coordinates(&self) -> Result<Vec<Point2D>, StoreError> {
        Ok(self.locations.iter().map(|(_, p)| *p).collect())
    }

    fn router_coordinate(&self, router: &RouterId) -> Result<Option<Point2D>, StoreError> {
        Ok(self.routers.get(router).copied())
    }
}
