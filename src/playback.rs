/// 录制会话的回放
///
/// 录制数据是每个路由器一条 `时间戳(毫秒) -> RSS` 序列。回放按固定间隔切出时间窗口，
/// 每个窗口独立定位，产生零个或一个估计。失败的窗口只影响自己，不会中断回放。

use crate::algorithms::{
    AlgorithmType, Estimate, EstimateTrack, Point2D, RouterId, RouterSet, TickReport,
};
use crate::config::ReplayParams;
use crate::error::PositioningError;
use crate::positioning::{ObservationWindow, PositioningEngine, SessionState};
use crate::training::TrainingStore;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

// ============================================================================
// 录制序列
// ============================================================================

/// 单个路由器的录制序列，按时间戳有序
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RouterSeries {
    readings: BTreeMap<i64, i32>,
}

impl RouterSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// 同一时间戳重复写入时保留后一个值
    pub fn insert(&mut self, timestamp_ms: i64, rss_dbm: i32) {
        self.readings.insert(timestamp_ms, rss_dbm);
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn earliest(&self) -> Option<i64> {
        self.readings.keys().next().copied()
    }

    pub fn latest(&self) -> Option<i64> {
        self.readings.keys().next_back().copied()
    }

    /// `[start, end)` 内的读数
    pub fn readings_in(&self, start: i64, end: i64) -> impl Iterator<Item = i32> + '_ {
        let range = if start < end { start..end } else { start..start };
        self.readings.range(range).map(|(_, &rss)| rss)
    }
}

impl FromIterator<(i64, i32)> for RouterSeries {
    fn from_iter<I: IntoIterator<Item = (i64, i32)>>(iter: I) -> Self {
        RouterSeries {
            readings: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// 回放会话
// ============================================================================

/// 一次录制：各路由器序列、可选的真实路径、窗口参数
#[derive(Clone, Debug)]
pub struct ReplaySession {
    series: BTreeMap<RouterId, RouterSeries>,
    truth_path: Vec<Point2D>,
    params: ReplayParams,
}

impl ReplaySession {
    pub fn new(params: ReplayParams) -> Self {
        ReplaySession {
            series: BTreeMap::new(),
            truth_path: Vec::new(),
            params,
        }
    }

    pub fn params(&self) -> &ReplayParams {
        &self.params
    }

    pub fn add_reading(&mut self, router: RouterId, timestamp_ms: i64, rss_dbm: i32) {
        self.series
            .entry(router)
            .or_default()
            .insert(timestamp_ms, rss_dbm);
    }

    /// 替换某路由器的整条序列
    pub fn set_series(&mut self, router: RouterId, series: RouterSeries) {
        self.series.insert(router, series);
    }

    /// 按录制文件中的序列名（如 `CiscoLinksysE1202`）归到对应路由器
    ///
    /// 名称无法匹配任何已配置路由器时返回 false，读数被丢弃。
    pub fn add_labeled_reading(
        &mut self,
        routers: &RouterSet,
        ssid_prefix: &str,
        label: &str,
        timestamp_ms: i64,
        rss_dbm: i32,
    ) -> bool {
        match routers.match_label(label, ssid_prefix) {
            Some(router) => {
                let id = router.id.clone();
                self.add_reading(id, timestamp_ms, rss_dbm);
                true
            }
            None => {
                debug!(label, "recorded series does not match any router");
                false
            }
        }
    }

    pub fn series(&self, router: &RouterId) -> Option<&RouterSeries> {
        self.series.get(router)
    }

    pub fn set_truth_path(&mut self, path: Vec<Point2D>) {
        self.truth_path = path;
    }

    pub fn truth_path(&self) -> &[Point2D] {
        &self.truth_path
    }

    /// 所有序列中最早和最晚的时间戳
    pub fn time_span(&self) -> Option<(i64, i64)> {
        let earliest = self.series.values().filter_map(RouterSeries::earliest).min()?;
        let latest = self.series.values().filter_map(RouterSeries::latest).max()?;
        Some((earliest, latest))
    }

    /// 窗口中心时刻：从最早时间戳开始，每次前进一个间隔，直到 `latest + half_window`（不含）
    pub fn tick_times(&self) -> Vec<i64> {
        let Some((earliest, latest)) = self.time_span() else {
            return Vec::new();
        };
        let step = self.params.interval_ms.max(1);
        let end = latest.saturating_add(self.params.half_window_ms);

        let mut ticks = Vec::new();
        let mut t = earliest;
        while t < end {
            ticks.push(t);
            t = t.saturating_add(step);
        }
        ticks
    }

    /// `[t - half, t + half)` 内的读数组成的窗口
    pub fn window_at(&self, tick_ms: i64) -> ObservationWindow {
        let half = self.params.half_window_ms;
        let timestamp = DateTime::<Utc>::from_timestamp_millis(tick_ms).unwrap_or_default();
        let mut window = ObservationWindow::new(timestamp);
        for (router, series) in &self.series {
            for rss in series.readings_in(tick_ms - half, tick_ms + half) {
                window.add_reading(router.clone(), rss);
            }
        }
        window
    }

    pub fn windows(&self) -> Vec<(i64, ObservationWindow)> {
        self.tick_times()
            .into_iter()
            .map(|t| (t, self.window_at(t)))
            .collect()
    }
}

// ============================================================================
// 批量回放
// ============================================================================

/// 对每个窗口运行一次指定算法
pub fn replay<S: TrainingStore>(
    engine: &PositioningEngine<S>,
    session: &ReplaySession,
    algorithm: AlgorithmType,
    state: &mut SessionState,
) -> Vec<TickReport> {
    session
        .windows()
        .into_iter()
        .map(|(tick_ms, window)| {
            let outcome = engine.estimate(algorithm, &window, state);
            if let Err(reason) = &outcome {
                warn!(tick_ms, %algorithm, %reason, "no estimate for tick");
            }
            TickReport {
                tick_ms,
                algorithm,
                outcome,
            }
        })
        .collect()
}

/// 全部算法各自回放一遍，每个算法使用独立的新会话状态
pub fn replay_tracks<S: TrainingStore>(
    engine: &PositioningEngine<S>,
    session: &ReplaySession,
) -> BTreeMap<AlgorithmType, EstimateTrack> {
    AlgorithmType::ALL
        .into_iter()
        .map(|algorithm| {
            let mut state = engine.new_session();
            let reports = replay(engine, session, algorithm, &mut state);
            (algorithm, EstimateTrack::from_reports(&reports))
        })
        .collect()
}

// ============================================================================
// 定时播放
// ============================================================================

/// 播放过程中发给渲染端的事件
#[derive(Clone, Debug, PartialEq)]
pub enum PlaybackEvent {
    /// 真实路径，在所有估计之前发送一次
    TruthPath(Vec<Point2D>),
    Estimate { tick_ms: i64, estimate: Estimate },
    NoEstimate {
        tick_ms: i64,
        algorithm: AlgorithmType,
        reason: PositioningError,
    },
    /// 全部窗口播放完毕
    Finished { ticks: usize },
}

/// 按 `playback_period_ms` 的节奏逐个窗口定位并发送事件
///
/// 接收端关闭时提前结束，不视为错误。返回实际播放的窗口数。
pub async fn run_playback<S: TrainingStore>(
    engine: &PositioningEngine<S>,
    session: &ReplaySession,
    algorithm: AlgorithmType,
    state: &mut SessionState,
    events: mpsc::Sender<PlaybackEvent>,
) -> usize {
    if !session.truth_path().is_empty()
        && events
            .send(PlaybackEvent::TruthPath(session.truth_path().to_vec()))
            .await
            .is_err()
    {
        debug!("playback receiver closed before start");
        return 0;
    }

    let period = Duration::from_millis(session.params().playback_period_ms.max(1));
    let mut ticker = tokio::time::interval(period);
    let mut played = 0;

    for (tick_ms, window) in session.windows() {
        ticker.tick().await;
        let event = match engine.estimate(algorithm, &window, state) {
            Ok(estimate) => PlaybackEvent::Estimate { tick_ms, estimate },
            Err(reason) => {
                warn!(tick_ms, %algorithm, %reason, "no estimate for tick");
                PlaybackEvent::NoEstimate {
                    tick_ms,
                    algorithm,
                    reason,
                }
            }
        };
        if events.send(event).await.is_err() {
            debug!(played, "playback receiver closed");
            return played;
        }
        played += 1;
    }

    if events
        .send(PlaybackEvent::Finished { ticks: played })
        .await
        .is_err()
    {
        debug!("playback receiver closed before finish");
    }
    played
}
