// ==========================================
// 产能场景仿真系统 - 场景会话
// ==========================================
// 职责: 编排模式流转 (base / 已加载场景 / 实时预览 /
//       对比), 持有当前展示结果, 决定覆盖暂存何时清空
// 状态机: Base ⇄ LoadedScenario ⇄ LivePreview,
//         Comparison 为叠加态, 退出一律重置回 Base
// 红线: 失败不得部分落地; 状态仅在完整校验的响应
//       或显式本地编辑之后写入
// 并发模型: 状态锁从不跨越 await 点; 乱序响应由
//           预览调度器的序列号守卫丢弃
// ==========================================

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::domain::overrides::{CenterConfigMap, ItemOverride, OverrideKey};
use crate::domain::scenario::{HistoryEntry, ScenarioSummary};
use crate::domain::simulation::{PreviewRequest, ScenarioPayload, SimulationResult};
use crate::domain::types::{GlobalParams, ScenarioId, SessionMode};
use crate::engine::annotate::{annotate_detail, RowAnnotation};
use crate::engine::comparison::{ComparisonEngine, ComparisonReport};
use crate::engine::diff::{ChangedFields, DiffEngine};
use crate::service::SimulationService;
use crate::session::error::{SessionError, SessionResult};
use crate::session::preview_scheduler::{PreviewScheduler, ScheduleOutcome};
use crate::store::OverrideStore;

// ==========================================
// 会话结局类型
// ==========================================

/// 预览结局: 过期/被取代不是错误, 静默丢弃
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewOutcome {
    /// 新结果已安装
    Installed,
    /// 静默期内被新编辑取代
    Superseded,
    /// 响应到达时已非最近请求
    Stale,
}

/// 加载结局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// 场景已安装为当前状态
    Loaded,
    /// 响应到达时已被更新的操作取代
    Stale,
}

// ==========================================
// ComparisonSession - 对比会话
// ==========================================
/// 并排持有的两份结果及派生报告; 与实时编辑互斥
#[derive(Debug, Clone)]
pub struct ComparisonSession {
    pub side_a: ScenarioId,
    pub side_b: ScenarioId,
    pub result_a: Arc<SimulationResult>,
    pub result_b: Arc<SimulationResult>,
    pub report: ComparisonReport,
}

// ==========================================
// SessionState - 会话内部状态
// ==========================================
// 模块级游离变量一律收敛到此结构, 仅经会话方法改写
#[derive(Debug)]
struct SessionState {
    scenario_id: ScenarioId,
    mode: SessionMode,
    params: GlobalParams,
    store: OverrideStore,
    scenarios: Vec<ScenarioSummary>,
    current_result: Option<Arc<SimulationResult>>,
    modified: bool,
    comparison: Option<ComparisonSession>,
    last_error: Option<String>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            scenario_id: ScenarioId::Base,
            mode: SessionMode::Base,
            params: GlobalParams::default(),
            store: OverrideStore::new(),
            scenarios: Vec::new(),
            current_result: None,
            modified: false,
            comparison: None,
            last_error: None,
        }
    }

    fn guard_not_comparison(&self) -> SessionResult<()> {
        if self.mode == SessionMode::Comparison {
            return Err(SessionError::ComparisonModeActive);
        }
        Ok(())
    }

    /// 是否存在待保存变更: 覆盖 / 中心配置 / 全局参数偏离默认
    fn has_pending_changes(&self) -> bool {
        !self.store.is_empty() || self.params.differs_from_default()
    }
}

// ==========================================
// ScenarioSession - 场景会话
// ==========================================
pub struct ScenarioSession {
    service: Arc<dyn SimulationService>,
    scheduler: PreviewScheduler,
    state: Mutex<SessionState>,
}

impl ScenarioSession {
    pub fn new(service: Arc<dyn SimulationService>) -> Self {
        Self {
            service,
            scheduler: PreviewScheduler::default(),
            state: Mutex::new(SessionState::new()),
        }
    }

    /// 指定静默期时长创建 (测试与低延迟环境使用)
    pub fn with_debounce(service: Arc<dyn SimulationService>, debounce: Duration) -> Self {
        Self {
            service,
            scheduler: PreviewScheduler::new(debounce),
            state: Mutex::new(SessionState::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ==========================================
    // 生命周期
    // ==========================================

    /// 初始化: 刷新场景列表并加载基础场景
    #[instrument(skip(self))]
    pub async fn init(&self) -> SessionResult<()> {
        self.refresh_scenarios().await?;
        self.load_scenario(ScenarioId::Base).await?;
        Ok(())
    }

    /// 销毁: 取消调度并清空全部会话状态
    pub fn teardown(&self) {
        self.scheduler.cancel();
        let mut state = self.lock();
        *state = SessionState::new();
        debug!("会话已销毁");
    }

    /// 重置: 等价于加载基础场景
    pub async fn reset(&self) -> SessionResult<LoadOutcome> {
        self.load_scenario(ScenarioId::Base).await
    }

    // ==========================================
    // 场景列表与历史
    // ==========================================

    /// 刷新已保存场景列表缓存
    pub async fn refresh_scenarios(&self) -> SessionResult<()> {
        let scenarios = self.service.list_scenarios().await?;
        self.lock().scenarios = scenarios;
        Ok(())
    }

    /// 查询场景审计历史 (只读透传)
    pub async fn scenario_history(&self, id: i64) -> SessionResult<Vec<HistoryEntry>> {
        Ok(self.service.scenario_history(id).await?)
    }

    // ==========================================
    // 场景加载
    // ==========================================

    /// 加载场景 (含 base)
    ///
    /// 成功安装时清空全部本地待定状态, 保证展示内容
    /// 忠实对应唯一事实来源; 失败保持原状态不动,
    /// 仅记录可见错误指示。
    #[instrument(skip(self, id), fields(scenario = %id))]
    pub async fn load_scenario(&self, id: ScenarioId) -> SessionResult<LoadOutcome> {
        // 先使旧上下文失效: 未触发的预览计时器与在途响应
        self.scheduler.cancel();

        let params = self.lock().params;
        let seq = self.scheduler.issue();

        let raw = match id {
            ScenarioId::Base => {
                self.service
                    .compute_base(params.work_days, params.global_shift_hours)
                    .await
            }
            ScenarioId::Saved(sid) => {
                self.service
                    .compute_scenario(sid, params.work_days, params.global_shift_hours)
                    .await
            }
        };

        let result = match raw.and_then(|r| r.validate()) {
            Ok(result) => result,
            Err(err) => {
                warn!(%err, "场景加载失败, 保持原状态");
                self.lock().last_error = Some(err.to_string());
                return Err(err.into());
            }
        };

        if !self.scheduler.is_latest(seq) {
            debug!(seq, "加载响应已被更新的操作取代, 丢弃");
            return Ok(LoadOutcome::Stale);
        }

        let mut state = self.lock();
        state.store.clear();
        state.scenario_id = id;
        state.modified = false;
        state.comparison = None;
        state.last_error = None;

        // 持久化场景: 用存储的元数据回填会话参数
        if let (ScenarioId::Saved(_), Some(meta)) = (id, result.meta.as_ref()) {
            state.params = GlobalParams {
                work_days: meta.work_days,
                global_shift_hours: meta.global_shift_hours,
            };
            for (center, config) in &meta.center_configs {
                state.store.set_center_config(center, Some(config.shifts));
            }
        }

        state.mode = match id {
            ScenarioId::Base => SessionMode::Base,
            ScenarioId::Saved(_) => SessionMode::LoadedScenario,
        };
        state.current_result = Some(Arc::new(result));

        info!(scenario = %id, mode = %state.mode, "场景已安装");
        Ok(LoadOutcome::Loaded)
    }

    // ==========================================
    // 本地编辑 (同步, 仅改暂存)
    // ==========================================

    /// 插入或替换单品覆盖
    pub fn upsert_override(&self, item: ItemOverride) -> SessionResult<()> {
        let mut state = self.lock();
        state.guard_not_comparison()?;
        state.store.upsert(item);
        Ok(())
    }

    /// 按键删除单品覆盖
    pub fn remove_override(&self, key: &OverrideKey) -> SessionResult<bool> {
        let mut state = self.lock();
        state.guard_not_comparison()?;
        Ok(state.store.remove(key))
    }

    /// 设置中心班次配置 (None 回退继承全局)
    pub fn set_center_config(&self, center_id: &str, shift_hours: Option<u32>) -> SessionResult<()> {
        let mut state = self.lock();
        state.guard_not_comparison()?;
        state.store.set_center_config(center_id, shift_hours);
        Ok(())
    }

    /// 调整全局参数 (工作日 / 全局班次)
    pub fn set_global_params(&self, params: GlobalParams) -> SessionResult<()> {
        let mut state = self.lock();
        state.guard_not_comparison()?;
        state.params = params;
        Ok(())
    }

    // ==========================================
    // 预览重算
    // ==========================================

    /// 预览: 按当前待定状态发起防抖重算
    ///
    /// 每次编辑后调用; 一个静默期内的连续调用只发出
    /// 一次请求。有效 (非过期) 响应安装为当前结果并
    /// 标记"相对当前场景已修改"。
    #[instrument(skip(self))]
    pub async fn preview(&self) -> SessionResult<PreviewOutcome> {
        let request = {
            let state = self.lock();
            state.guard_not_comparison()?;
            PreviewRequest {
                overrides: state.store.snapshot(),
                work_days: state.params.work_days,
                global_shift_hours: state.params.global_shift_hours,
                center_configs: state.store.snapshot_center_configs(),
            }
        };

        let outcome = self
            .scheduler
            .schedule(|seq| async move {
                debug!(seq, overrides = request.overrides.len(), "发出预览请求");
                self.service.preview(&request).await
            })
            .await;

        let raw = match outcome {
            Ok(ScheduleOutcome::Completed(raw)) => raw,
            Ok(ScheduleOutcome::Superseded) => return Ok(PreviewOutcome::Superseded),
            Ok(ScheduleOutcome::Stale) => return Ok(PreviewOutcome::Stale),
            Err(err) => {
                warn!(%err, "预览请求失败");
                self.lock().last_error = Some(err.to_string());
                return Err(err.into());
            }
        };

        let result = match raw.validate() {
            Ok(result) => result,
            Err(err) => {
                warn!(%err, "预览响应校验失败");
                self.lock().last_error = Some(err.to_string());
                return Err(err.into());
            }
        };

        let mut state = self.lock();
        // 调度守卫通过后到此无挂起点, 直接安装
        state.current_result = Some(Arc::new(result));
        state.modified = true;
        state.mode = SessionMode::LivePreview;
        state.last_error = None;

        Ok(PreviewOutcome::Installed)
    }

    /// 删除覆盖并刷新展示
    ///
    /// 删除后若无任何待定变更, 重新加载当前场景以展示
    /// 精确的持久化状态; 否则发起预览。
    pub async fn remove_override_and_refresh(
        &self,
        key: &OverrideKey,
    ) -> SessionResult<PreviewOutcome> {
        let (removed, reload_target) = {
            let mut state = self.lock();
            state.guard_not_comparison()?;
            let removed = state.store.remove(key);
            let reload = if state.has_pending_changes() {
                None
            } else {
                Some(state.scenario_id)
            };
            (removed, reload)
        };

        if !removed {
            debug!(%key, "删除的覆盖键不存在, 视为无操作");
        }

        match reload_target {
            Some(id) => match self.load_scenario(id).await? {
                LoadOutcome::Loaded => Ok(PreviewOutcome::Installed),
                LoadOutcome::Stale => Ok(PreviewOutcome::Stale),
            },
            None => self.preview().await,
        }
    }

    // ==========================================
    // 保存与场景管理
    // ==========================================

    /// 保存: as_update 时整体更新当前场景, 否则创建新场景
    ///
    /// 成功后刷新场景列表并加载服务端规范副本, 本地编辑
    /// 状态随之丢弃 (服务端副本成为唯一事实来源)。
    #[instrument(skip(self, name), fields(scenario_name = name))]
    pub async fn save(&self, name: &str, as_update: bool) -> SessionResult<ScenarioId> {
        let (payload, update_target) = {
            let state = self.lock();
            state.guard_not_comparison()?;
            if !state.has_pending_changes() {
                return Err(SessionError::NothingToSave);
            }

            let update_target = if as_update {
                match state.scenario_id {
                    ScenarioId::Base => return Err(SessionError::CannotUpdateBase),
                    ScenarioId::Saved(id) => Some(id),
                }
            } else {
                None
            };

            let payload = ScenarioPayload {
                name: name.to_string(),
                work_days: state.params.work_days,
                global_shift_hours: state.params.global_shift_hours,
                center_configs: state.store.snapshot_center_configs(),
                overrides: state.store.snapshot(),
            };
            (payload, update_target)
        };

        let saved_id = match update_target {
            Some(id) => {
                if let Err(err) = self.service.update_scenario_full(id, &payload).await {
                    warn!(%err, id, "场景更新失败");
                    self.lock().last_error = Some(err.to_string());
                    return Err(err.into());
                }
                id
            }
            None => match self.service.create_scenario(&payload).await {
                Ok(scenario) => scenario.id,
                Err(err) => {
                    warn!(%err, "场景创建失败");
                    self.lock().last_error = Some(err.to_string());
                    return Err(err.into());
                }
            },
        };

        info!(id = saved_id, "场景已保存, 切换到服务端规范副本");
        self.refresh_scenarios().await?;
        self.load_scenario(ScenarioId::Saved(saved_id)).await?;
        Ok(ScenarioId::Saved(saved_id))
    }

    /// 重命名场景并刷新列表缓存
    pub async fn rename_scenario(&self, id: i64, name: &str) -> SessionResult<()> {
        self.service.rename_scenario(id, name).await?;
        self.refresh_scenarios().await?;
        Ok(())
    }

    /// 删除场景; 删除的是当前加载场景时回退加载 base
    #[instrument(skip(self))]
    pub async fn delete_scenario(&self, id: i64) -> SessionResult<()> {
        self.service.delete_scenario(id).await?;
        self.refresh_scenarios().await?;

        let was_current = self.lock().scenario_id == ScenarioId::Saved(id);
        if was_current {
            info!(id, "当前加载场景已删除, 回退到基础场景");
            self.load_scenario(ScenarioId::Base).await?;
        }
        Ok(())
    }

    // ==========================================
    // 对比模式
    // ==========================================

    /// 进入对比模式: 分别获取两侧结果并生成报告
    ///
    /// 挂起预览调度 (取消计时器 + 在途响应失效);
    /// 任一侧失败则整体不落地。
    #[instrument(skip(self, side_a, side_b), fields(a = %side_a, b = %side_b))]
    pub async fn enter_comparison(
        &self,
        side_a: ScenarioId,
        side_b: ScenarioId,
    ) -> SessionResult<()> {
        let params = {
            let state = self.lock();
            if state.mode == SessionMode::Comparison {
                return Err(SessionError::ComparisonModeActive);
            }
            state.params
        };

        self.scheduler.cancel();

        let fetched = tokio::try_join!(
            self.fetch_side(side_a, params),
            self.fetch_side(side_b, params)
        );
        let (result_a, result_b) = match fetched {
            Ok(pair) => pair,
            Err(err) => {
                warn!(%err, "对比数据获取失败, 不进入对比模式");
                self.lock().last_error = Some(err.to_string());
                return Err(err);
            }
        };

        let report = ComparisonEngine::compare(&result_a, &result_b);

        let mut state = self.lock();
        state.comparison = Some(ComparisonSession {
            side_a,
            side_b,
            result_a: Arc::new(result_a),
            result_b: Arc::new(result_b),
            report,
        });
        state.mode = SessionMode::Comparison;
        state.last_error = None;

        info!("已进入对比模式");
        Ok(())
    }

    /// 退出对比模式: 一律重新初始化回基础场景
    #[instrument(skip(self))]
    pub async fn exit_comparison(&self) -> SessionResult<()> {
        {
            let mut state = self.lock();
            if state.mode != SessionMode::Comparison {
                return Err(SessionError::NotInComparisonMode);
            }
            state.comparison = None;
            state.mode = SessionMode::Base;
        }

        self.scheduler.cancel();
        self.init().await
    }

    async fn fetch_side(
        &self,
        id: ScenarioId,
        params: GlobalParams,
    ) -> SessionResult<SimulationResult> {
        let raw = match id {
            ScenarioId::Base => {
                self.service
                    .compute_base(params.work_days, params.global_shift_hours)
                    .await?
            }
            ScenarioId::Saved(sid) => {
                // 传入当前参数仅作回退, 服务端以场景存储参数为准
                self.service
                    .compute_scenario(sid, params.work_days, params.global_shift_hours)
                    .await?
            }
        };
        Ok(raw.validate()?)
    }

    // ==========================================
    // 派生展示数据
    // ==========================================

    /// 各待定覆盖相对当前结果的变化字段标记
    pub fn pending_diffs(&self) -> Vec<(OverrideKey, ChangedFields)> {
        let state = self.lock();
        let result = state.current_result.as_deref();
        let configs = state.store.list_center_configs();

        state
            .store
            .list()
            .iter()
            .map(|item| {
                let row = result.and_then(|r| r.find_detail(&item.key()));
                let flags =
                    DiffEngine::diff(row, item, state.params.global_shift_hours, configs);
                (item.key(), flags)
            })
            .collect()
    }

    /// 当前结果明细的展示注解
    pub fn annotations(&self) -> Vec<RowAnnotation> {
        let state = self.lock();
        match state.current_result.as_deref() {
            Some(result) => annotate_detail(
                &result.detail,
                &state.params,
                state.store.list_center_configs(),
            ),
            None => Vec::new(),
        }
    }

    // ==========================================
    // 只读视图
    // ==========================================

    pub fn mode(&self) -> SessionMode {
        self.lock().mode
    }

    pub fn scenario_id(&self) -> ScenarioId {
        self.lock().scenario_id
    }

    pub fn current_result(&self) -> Option<Arc<SimulationResult>> {
        self.lock().current_result.clone()
    }

    pub fn is_modified(&self) -> bool {
        self.lock().modified
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    pub fn scenarios(&self) -> Vec<ScenarioSummary> {
        self.lock().scenarios.clone()
    }

    pub fn global_params(&self) -> GlobalParams {
        self.lock().params
    }

    pub fn overrides(&self) -> Vec<ItemOverride> {
        self.lock().store.snapshot()
    }

    pub fn center_configs(&self) -> CenterConfigMap {
        self.lock().store.snapshot_center_configs()
    }

    pub fn comparison(&self) -> Option<ComparisonSession> {
        self.lock().comparison.clone()
    }

    /// 当前场景展示名称 (列表缓存中查找, base 用固定名)
    pub fn display_name(&self) -> String {
        let state = self.lock();
        match state.scenario_id {
            ScenarioId::Base => "基础场景".to_string(),
            ScenarioId::Saved(id) => state
                .scenarios
                .iter()
                .find(|s| s.id == id)
                .map(|s| s.name.clone())
                .unwrap_or_else(|| format!("场景 {}", id)),
        }
    }
}
