/// 几何定位：三边定位与"三角定位"（Cramer 法则线性求解）
///
/// 两者都只使用筛选后的 3 个路由器及其像素距离。

use crate::algorithms::{AccessPointObservation, AlgorithmType, DistanceModel, Point2D};
use crate::error::{PositioningError, Result};

/// 相对退化阈值
///
/// 分母、行列式按锚点间最大距离 L 的相应次幂归一化（长度量除以 L，面积量除以 L²），
/// 归一化后不超过该值视为退化。
pub const DEGENERATE_RELATIVE_TOLERANCE: f64 = 1e-6;

/// 已知位置和估计半径的锚点
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
    pub center: Point2D,
    /// 估计距离（像素）
    pub radius: f64,
}

impl Anchor {
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Anchor {
            center: Point2D::new(x, y),
            radius,
        }
    }

    pub fn from_observation(observation: &AccessPointObservation, model: &DistanceModel) -> Self {
        Anchor {
            center: observation.coordinate(),
            radius: observation.distance_pixels(model),
        }
    }
}

/// 由 3 个观测构造锚点
pub fn anchors_from_observations(
    observations: &[AccessPointObservation; 3],
    model: &DistanceModel,
) -> [Anchor; 3] {
    [
        Anchor::from_observation(&observations[0], model),
        Anchor::from_observation(&observations[1], model),
        Anchor::from_observation(&observations[2], model),
    ]
}

fn degenerate(algorithm: AlgorithmType, detail: String) -> PositioningError {
    PositioningError::DegenerateGeometry { algorithm, detail }
}

/// 锚点之间的最大距离
fn anchor_spread(anchors: &[Anchor; 3]) -> f64 {
    let [a, b, c] = anchors;
    a.center
        .distance_to(&b.center)
        .max(a.center.distance_to(&c.center))
        .max(b.center.distance_to(&c.center))
}

fn is_degenerate(value: f64, scale: f64) -> bool {
    value.abs() <= DEGENERATE_RELATIVE_TOLERANCE * scale
}

fn finite_or_degenerate(algorithm: AlgorithmType, point: Point2D) -> Result<Point2D> {
    if point.is_finite() {
        Ok(point)
    } else {
        Err(degenerate(algorithm, format!("non-finite solution {}", point)))
    }
}

/// 三边定位
///
/// 先以三个点轮换累加求 y，再只用前两个点求 x。
pub fn find_center_point(anchors: &[Anchor; 3]) -> Result<Point2D> {
    let mut top = 0.0;
    let mut bot = 0.0;
    for i in 0..3 {
        let p = &anchors[i];
        let (other2, other3) = match i {
            0 => (&anchors[1], &anchors[2]),
            1 => (&anchors[0], &anchors[2]),
            _ => (&anchors[0], &anchors[1]),
        };

        let d = other2.center.x - other3.center.x;
        let v1 = (p.center.x * p.center.x + p.center.y * p.center.y) - p.radius * p.radius;
        top += d * v1;
        bot += p.center.y * d;
    }

    let spread = anchor_spread(anchors);
    if is_degenerate(bot, spread * spread) {
        return Err(degenerate(
            AlgorithmType::Trilateration,
            format!("y denominator {}", bot),
        ));
    }
    let y = top / (2.0 * bot);

    let p0 = &anchors[0];
    let p1 = &anchors[1];
    let top2 = p1.radius * p1.radius + p0.center.x * p0.center.x + p0.center.y * p0.center.y
        - p0.radius * p0.radius
        - p1.center.x * p1.center.x
        - p1.center.y * p1.center.y
        - 2.0 * (p0.center.y - p1.center.y) * y;
    let bot2 = p0.center.x - p1.center.x;
    if is_degenerate(bot2, spread) {
        return Err(degenerate(
            AlgorithmType::Trilateration,
            format!("x denominator {}", bot2),
        ));
    }
    let x = top2 / (2.0 * bot2);

    finite_or_degenerate(AlgorithmType::Trilateration, Point2D::new(x, y))
}

/// Cramer 法则求解
///
/// 系数 B 的两项引用的是同一个点，恒为 0。这是历史公式，保留不改。
pub fn triangulate(anchors: &[Anchor; 3]) -> Result<Point2D> {
    let [p1, p2, p3] = anchors;
    let (x1, y1, r1) = (p1.center.x, p1.center.y, p1.radius);
    let (x2, y2, r2) = (p2.center.x, p2.center.y, p2.radius);
    let (x3, y3, r3) = (p3.center.x, p3.center.y, p3.radius);

    let a = -2.0 * x1 + 2.0 * x2;
    let b = -2.0 * y1 + 2.0 * y1;
    let c = -2.0 * x2 + 2.0 * x3;
    let d = -2.0 * y2 + 2.0 * y3;
    let e = r1.powi(2) - r2.powi(2) - x1.powi(2) + x2.powi(2) - y1.powi(2) + y2.powi(2);
    let f = r2.powi(2) - r3.powi(2) - x2.powi(2) + x3.powi(2) - y2.powi(2) + y3.powi(2);

    let det = a * d - b * c;
    let spread = anchor_spread(anchors);
    if is_degenerate(det, 4.0 * spread * spread) {
        return Err(degenerate(
            AlgorithmType::Triangulation,
            format!("determinant {}", det),
        ));
    }
    let det_x = e * d - b * f;
    let det_y = a * f - e * c;

    finite_or_degenerate(
        AlgorithmType::Triangulation,
        Point2D::new(det_x / det, det_y / det),
    )
}
