/// 路由器（接入点）定义与单次 RSS 观测

use crate::algorithms::DistanceModel;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 地图平面上的二维点（像素）
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Point2D { x, y }
    }

    /// 欧几里得距离
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// 两个坐标是否都是有限值
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Point2D::new(x, y)
    }
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// 路由器标识（SSID）
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouterId(String);

impl RouterId {
    pub fn new(id: impl Into<String>) -> Self {
        RouterId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RouterId {
    fn from(id: &str) -> Self {
        RouterId::new(id)
    }
}

impl fmt::Display for RouterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 固定位置的路由器
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Router {
    /// 路由器 SSID
    pub id: RouterId,
    /// 地图坐标（像素）
    pub coordinate: Point2D,
    /// 加权质心算法使用的静态权重
    pub weight: f64,
}

impl Router {
    pub fn new(id: impl Into<String>, x: f64, y: f64, weight: f64) -> Self {
        Router {
            id: RouterId::new(id),
            coordinate: Point2D::new(x, y),
            weight,
        }
    }
}

/// 路由器集合，按 SSID 排序
#[derive(Clone, Debug, Default)]
pub struct RouterSet {
    routers: BTreeMap<RouterId, Router>,
}

impl RouterSet {
    pub fn new() -> Self {
        RouterSet {
            routers: BTreeMap::new(),
        }
    }

    pub fn from_vec(routers: Vec<Router>) -> Self {
        let mut set = RouterSet::new();
        for router in routers {
            set.add_router(router);
        }
        set
    }

    pub fn add_router(&mut self, router: Router) {
        self.routers.insert(router.id.clone(), router);
    }

    pub fn get(&self, id: &RouterId) -> Option<&Router> {
        self.routers.get(id)
    }

    /// 路由器的静态权重，未配置时为 None
    pub fn weight(&self, id: &RouterId) -> Option<f64> {
        self.routers.get(id).map(|r| r.weight)
    }

    /// 按 SSID 顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = &Router> {
        self.routers.values()
    }

    pub fn len(&self) -> usize {
        self.routers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }

    /// 在任意文本（如录制文件名 `CiscoLinksysE1202.csv`）中查找 `<前缀><编号>` 形式的 SSID
    pub fn match_label(&self, label: &str, ssid_prefix: &str) -> Option<&Router> {
        let pattern = format!("{}(\\d+)", regex::escape(ssid_prefix));
        let re = Regex::new(&pattern).ok()?;
        re.captures_iter(label)
            .filter_map(|caps| caps.get(1))
            .map(|index| RouterId::new(format!("{}{}", ssid_prefix, index.as_str())))
            .find_map(|id| self.routers.get(&id))
    }
}

/// 单个路由器在一个采样周期内的观测
#[derive(Clone, Debug, PartialEq)]
pub struct AccessPointObservation {
    router_id: RouterId,
    rss_dbm: i32,
    coordinate: Point2D,
    timestamp: DateTime<Utc>,
}

impl AccessPointObservation {
    pub fn new(
        router_id: RouterId,
        rss_dbm: i32,
        coordinate: Point2D,
        timestamp: DateTime<Utc>,
    ) -> Self {
        AccessPointObservation {
            router_id,
            rss_dbm,
            coordinate,
            timestamp,
        }
    }

    /// 由路由器定义构造观测
    pub fn from_router(router: &Router, rss_dbm: i32, timestamp: DateTime<Utc>) -> Self {
        Self::new(router.id.clone(), rss_dbm, router.coordinate, timestamp)
    }

    pub fn router_id(&self) -> &RouterId {
        &self.router_id
    }

    /// RSS（dBm，通常为负）
    pub fn rss_dbm(&self) -> i32 {
        self.rss_dbm
    }

    /// 路由器的已知坐标
    pub fn coordinate(&self) -> Point2D {
        self.coordinate
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn distance_meters(&self, model: &DistanceModel) -> f64 {
        model.distance_meters(self.rss_dbm)
    }

    pub fn distance_pixels(&self, model: &DistanceModel) -> f64 {
        model.distance_pixels(self.rss_dbm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_routers() -> RouterSet {
        RouterSet::from_vec(vec![
            Router::new("CiscoLinksysE1203", 600.0, 600.0, 0.75),
            Router::new("CiscoLinksysE1200", 0.0, 0.0, 0.95),
            Router::new("CiscoLinksysE1202", 0.0, 600.0, 0.80),
            Router::new("CiscoLinksysE1201", 600.0, 0.0, 0.85),
        ])
    }

    #[test]
    fn test_point_distance() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(3.0, 4.0);
        assert_eq!(a.distance_to(&b), 5.0);
    }

    #[test]
    fn test_router_set_iterates_in_ssid_order() {
        let set = four_routers();
        let ids: Vec<&str> = set.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "CiscoLinksysE1200",
                "CiscoLinksysE1201",
                "CiscoLinksysE1202",
                "CiscoLinksysE1203"
            ]
        );
        assert_eq!(set.weight(&RouterId::from("CiscoLinksysE1201")), Some(0.85));
        assert_eq!(set.weight(&RouterId::from("other")), None);
    }

    #[test]
    fn test_match_label() {
        let set = four_routers();
        let router = set
            .match_label("data/02012015-5sec/CiscoLinksysE1202.csv", "CiscoLinksysE120")
            .unwrap();
        assert_eq!(router.id.as_str(), "CiscoLinksysE1202");
        assert!(set.match_label("CiscoLinksysE1207.csv", "CiscoLinksysE120").is_none());
        assert!(set.match_label("truth_path.csv", "CiscoLinksysE120").is_none());
    }
}
