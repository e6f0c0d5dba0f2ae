// ==========================================
// ScenarioSession 集成测试
// ==========================================
// 测试范围:
// 1. 加载与本地状态失效
// 2. 预览安装与模式流转
// 3. 保存/重命名/删除生命周期
// 4. 对比模式互斥与退出重置
// 5. 乱序响应丢弃 (序列号守卫)
// ==========================================


use std::sync::Arc;
use std::time::Duration;

use capacity_sim::{
    GlobalParams, ItemOverride, LoadOutcome, OverrideKey, PreviewOutcome, RawSimulationResult,
    ScenarioId, ScenarioSession, ServiceError, SessionError, SessionMode,
};
use chrono::NaiveDate;
use test_helpers::*;

// ==========================================
// 辅助函数
// ==========================================

/// 创建零防抖会话 (测试中时序由 mock 延迟驱动)
fn session_with(service: Arc<MockService>) -> ScenarioSession {
    ScenarioSession::with_debounce(service, Duration::ZERO)
}

fn shift_override(article: &str, center: &str, shifts: u32) -> ItemOverride {
    let mut ov = ItemOverride::new(article, center);
    ov.shift_hours_override = Some(shifts);
    ov
}

// ==========================================
// 加载与本地状态失效
// ==========================================

#[tokio::test(start_paused = true)]
async fn init_loads_base_scenario() {
    let service = Arc::new(MockService::new());
    let session = session_with(service);

    session.init().await.expect("初始化失败");

    assert_eq!(session.mode(), SessionMode::Base);
    assert_eq!(session.scenario_id(), ScenarioId::Base);
    assert!(!session.is_modified());
    let result = session.current_result().expect("应已安装结果");
    assert_eq!(result.summary.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn loading_any_scenario_invalidates_pending_edits() {
    let service = Arc::new(MockService::new());
    let session = session_with(service);
    session.init().await.expect("初始化失败");

    session
        .upsert_override(shift_override("A1", "C1", 8))
        .expect("编辑失败");
    session
        .set_center_config("C2", Some(24))
        .expect("编辑失败");
    assert_eq!(session.overrides().len(), 1);

    // 重新加载 base 也必须清空待定状态
    session
        .load_scenario(ScenarioId::Base)
        .await
        .expect("加载失败");

    assert!(session.overrides().is_empty());
    assert!(session.center_configs().is_empty());
}

#[tokio::test(start_paused = true)]
async fn loading_saved_scenario_hydrates_global_params_and_center_configs() {
    let scenario = with_center_config(saved_scenario(7, "夏季方案", 300, 24), "C1", 8);
    let service = Arc::new(MockService::new().with_scenario(scenario, base_result()));
    let session = session_with(service);
    session.init().await.expect("初始化失败");

    let outcome = session
        .load_scenario(ScenarioId::Saved(7))
        .await
        .expect("加载失败");

    assert_eq!(outcome, LoadOutcome::Loaded);
    assert_eq!(session.mode(), SessionMode::LoadedScenario);
    assert_eq!(
        session.global_params(),
        GlobalParams {
            work_days: 300,
            global_shift_hours: 24
        }
    );
    assert_eq!(
        session.center_configs().get("C1").map(|c| c.shifts),
        Some(8)
    );
    assert_eq!(session.display_name(), "夏季方案");
}

#[tokio::test(start_paused = true)]
async fn load_failure_leaves_prior_state_untouched() {
    let service = Arc::new(MockService::new());
    let session = session_with(service.clone());
    session.init().await.expect("初始化失败");

    session
        .upsert_override(shift_override("A1", "C1", 8))
        .expect("编辑失败");
    let result_before = session.current_result().expect("应有结果");

    service.fail_next(ServiceError::Transport("连接超时".to_string()));
    let err = session
        .load_scenario(ScenarioId::Base)
        .await
        .expect_err("应当失败");
    assert!(matches!(
        err,
        SessionError::Service(ServiceError::Transport(_))
    ));

    // 失败不部分落地: 待定编辑与旧结果均保留, 仅错误指示可见
    assert_eq!(session.overrides().len(), 1);
    assert!(Arc::ptr_eq(
        &result_before,
        &session.current_result().expect("应有结果")
    ));
    assert!(session.last_error().is_some());
}

#[tokio::test(start_paused = true)]
async fn missing_detail_field_is_a_protocol_error() {
    let service = Arc::new(MockService::new());
    let session = session_with(service.clone());
    session.init().await.expect("初始化失败");

    service.raw_next(RawSimulationResult {
        summary: Some(vec![]),
        detail: None,
        meta: None,
    });

    let err = session
        .load_scenario(ScenarioId::Base)
        .await
        .expect_err("缺失 detail 应判定协议错误");
    assert!(matches!(
        err,
        SessionError::Service(ServiceError::Protocol(_))
    ));
}

// ==========================================
// 预览安装与模式流转
// ==========================================

#[tokio::test(start_paused = true)]
async fn preview_installs_result_and_marks_modified() {
    let service = Arc::new(MockService::new());
    let session = session_with(service.clone());
    session.init().await.expect("初始化失败");

    session
        .upsert_override(shift_override("A1", "C1", 8))
        .expect("编辑失败");
    service.push_preview_result(tagged_result("P1"));

    let outcome = session.preview().await.expect("预览失败");

    assert_eq!(outcome, PreviewOutcome::Installed);
    assert_eq!(session.mode(), SessionMode::LivePreview);
    assert!(session.is_modified());
    let result = session.current_result().expect("应有结果");
    assert_eq!(result.summary[0].center, "P1");
}

#[tokio::test(start_paused = true)]
async fn preview_failure_surfaces_error_and_keeps_old_result() {
    let service = Arc::new(MockService::new());
    let session = session_with(service.clone());
    session.init().await.expect("初始化失败");
    let result_before = session.current_result().expect("应有结果");

    service.fail_next(ServiceError::Transport("网络不可达".to_string()));
    session.preview().await.expect_err("应当失败");

    assert!(Arc::ptr_eq(
        &result_before,
        &session.current_result().expect("应有结果")
    ));
    assert!(session.last_error().is_some());
}

#[tokio::test(start_paused = true)]
async fn remove_last_override_reloads_persisted_state() {
    let service = Arc::new(MockService::new());
    let session = session_with(service.clone());
    session.init().await.expect("初始化失败");

    let key = OverrideKey::new("A1", "C1");
    session
        .upsert_override(shift_override("A1", "C1", 8))
        .expect("编辑失败");
    service.push_preview_result(tagged_result("P1"));
    session.preview().await.expect("预览失败");
    assert_eq!(service.preview_calls(), 1);

    // 最后一条覆盖删除后无任何待定变更 → 重新加载而非预览
    let outcome = session
        .remove_override_and_refresh(&key)
        .await
        .expect("刷新失败");

    assert_eq!(outcome, PreviewOutcome::Installed);
    assert_eq!(service.preview_calls(), 1);
    assert_eq!(session.mode(), SessionMode::Base);
    let result = session.current_result().expect("应有结果");
    assert_eq!(result.summary[0].center, "C1");
}

#[tokio::test(start_paused = true)]
async fn remove_override_with_remaining_changes_triggers_preview() {
    let service = Arc::new(MockService::new());
    let session = session_with(service.clone());
    session.init().await.expect("初始化失败");

    session
        .upsert_override(shift_override("A1", "C1", 8))
        .expect("编辑失败");
    session
        .upsert_override(shift_override("A2", "C1", 24))
        .expect("编辑失败");

    session
        .remove_override_and_refresh(&OverrideKey::new("A1", "C1"))
        .await
        .expect("刷新失败");

    assert_eq!(service.preview_calls(), 1);
    assert_eq!(session.overrides().len(), 1);
    assert_eq!(session.mode(), SessionMode::LivePreview);
}

// ==========================================
// 保存与场景管理
// ==========================================

#[tokio::test(start_paused = true)]
async fn save_creates_scenario_and_switches_to_server_copy() {
    let service = Arc::new(MockService::new());
    let session = session_with(service.clone());
    session.init().await.expect("初始化失败");

    session
        .set_global_params(GlobalParams {
            work_days: 250,
            global_shift_hours: 16,
        })
        .expect("编辑失败");
    session
        .upsert_override(shift_override("A1", "C1", 8))
        .expect("编辑失败");

    let saved = session.save("方案A", false).await.expect("保存失败");

    assert_eq!(saved, ScenarioId::Saved(1));
    assert_eq!(session.scenario_id(), ScenarioId::Saved(1));
    assert_eq!(session.mode(), SessionMode::LoadedScenario);
    assert!(!session.is_modified());
    // 本地编辑状态已丢弃, 服务端副本成为事实来源
    assert!(session.overrides().is_empty());

    let stored = service.scenario(1).expect("服务端应有记录");
    assert_eq!(stored.work_days, 250);
    assert_eq!(stored.overrides.len(), 1);
    assert_eq!(session.display_name(), "方案A");
}

#[tokio::test(start_paused = true)]
async fn save_without_pending_changes_is_rejected() {
    let service = Arc::new(MockService::new());
    let session = session_with(service);
    session.init().await.expect("初始化失败");

    let err = session.save("空方案", false).await.expect_err("应当拒绝");
    assert!(matches!(err, SessionError::NothingToSave));
}

#[tokio::test(start_paused = true)]
async fn save_as_update_on_base_is_rejected() {
    let service = Arc::new(MockService::new());
    let session = session_with(service);
    session.init().await.expect("初始化失败");
    session
        .upsert_override(shift_override("A1", "C1", 8))
        .expect("编辑失败");

    let err = session.save("覆盖", true).await.expect_err("应当拒绝");
    assert!(matches!(err, SessionError::CannotUpdateBase));
}

#[tokio::test(start_paused = true)]
async fn save_as_update_rewrites_current_scenario_record() {
    let scenario = saved_scenario(5, "旧名称", 300, 24);
    let service = Arc::new(MockService::new().with_scenario(scenario, base_result()));
    let session = session_with(service.clone());
    session.init().await.expect("初始化失败");
    session
        .load_scenario(ScenarioId::Saved(5))
        .await
        .expect("加载失败");

    session
        .upsert_override(shift_override("A1", "C1", 8))
        .expect("编辑失败");
    let saved = session.save("新名称", true).await.expect("保存失败");

    assert_eq!(saved, ScenarioId::Saved(5));
    let stored = service.scenario(5).expect("服务端应有记录");
    assert_eq!(stored.name, "新名称");
    assert_eq!(stored.overrides.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn validation_error_during_save_is_surfaced_with_message() {
    let service = Arc::new(MockService::new());
    let session = session_with(service.clone());
    session.init().await.expect("初始化失败");
    session
        .upsert_override(shift_override("A1", "C1", 8))
        .expect("编辑失败");

    service.fail_next(ServiceError::Validation("名称已存在".to_string()));
    let err = session.save("重名", false).await.expect_err("应当失败");

    match err {
        SessionError::Service(ServiceError::Validation(msg)) => {
            assert_eq!(msg, "名称已存在");
        }
        other => panic!("意外错误: {:?}", other),
    }
    // 保存失败不得丢弃本地编辑
    assert_eq!(session.overrides().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn deleting_loaded_scenario_falls_back_to_base() {
    let scenario = saved_scenario(5, "方案", 300, 24);
    let service = Arc::new(MockService::new().with_scenario(scenario, base_result()));
    let session = session_with(service);
    session.init().await.expect("初始化失败");
    session
        .load_scenario(ScenarioId::Saved(5))
        .await
        .expect("加载失败");

    session.delete_scenario(5).await.expect("删除失败");

    assert_eq!(session.scenario_id(), ScenarioId::Base);
    assert_eq!(session.mode(), SessionMode::Base);
    assert!(session.scenarios().is_empty());
}

#[tokio::test(start_paused = true)]
async fn deleting_other_scenario_keeps_current_loaded() {
    let service = Arc::new(
        MockService::new()
            .with_scenario(saved_scenario(5, "甲", 238, 16), base_result())
            .with_scenario(saved_scenario(6, "乙", 238, 16), base_result()),
    );
    let session = session_with(service);
    session.init().await.expect("初始化失败");
    session
        .load_scenario(ScenarioId::Saved(5))
        .await
        .expect("加载失败");

    session.delete_scenario(6).await.expect("删除失败");

    assert_eq!(session.scenario_id(), ScenarioId::Saved(5));
    assert_eq!(session.scenarios().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn rename_refreshes_scenario_list_cache() {
    let scenario = saved_scenario(5, "旧名", 238, 16);
    let service = Arc::new(MockService::new().with_scenario(scenario, base_result()));
    let session = session_with(service);
    session.init().await.expect("初始化失败");

    session.rename_scenario(5, "新名").await.expect("重命名失败");

    let list = session.scenarios();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].name, "新名");
}

#[tokio::test(start_paused = true)]
async fn scenario_history_is_passed_through_read_only() {
    let scenario = saved_scenario(5, "方案", 238, 16);
    let service = Arc::new(MockService::new().with_scenario(scenario, base_result()));
    let timestamp = NaiveDate::from_ymd_opt(2026, 1, 15)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap();
    service.set_history(
        5,
        vec![capacity_sim::HistoryEntry {
            timestamp,
            name: "方案".to_string(),
            changes_count: 1,
            snapshot: vec![shift_override("A1", "C1", 8)],
        }],
    );
    let session = session_with(service);
    session.init().await.expect("初始化失败");

    let history = session.scenario_history(5).await.expect("查询失败");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].snapshot[0].shift_hours_override, Some(8));
}

// ==========================================
// 对比模式
// ==========================================

#[tokio::test(start_paused = true)]
async fn comparison_suspends_live_editing_and_preview() {
    let service = Arc::new(MockService::new());
    let session = session_with(service);
    session.init().await.expect("初始化失败");

    session
        .enter_comparison(ScenarioId::Base, ScenarioId::Base)
        .await
        .expect("进入对比失败");
    assert_eq!(session.mode(), SessionMode::Comparison);

    assert!(matches!(
        session.preview().await,
        Err(SessionError::ComparisonModeActive)
    ));
    assert!(matches!(
        session.upsert_override(shift_override("A1", "C1", 8)),
        Err(SessionError::ComparisonModeActive)
    ));
    assert!(matches!(
        session.set_center_config("C1", Some(8)),
        Err(SessionError::ComparisonModeActive)
    ));
    assert!(matches!(
        session
            .enter_comparison(ScenarioId::Base, ScenarioId::Base)
            .await,
        Err(SessionError::ComparisonModeActive)
    ));
}

#[tokio::test(start_paused = true)]
async fn comparison_report_carries_saturation_delta() {
    let result_b = result(
        vec![summary_row("C1", 0.7, 1000.0)],
        vec![detail_row("X", "C1", 0.8, 10.0, 1000.0, 0.7)],
    );
    let scenario = saved_scenario(2, "激进方案", 238, 16);
    let service = Arc::new(MockService::new().with_scenario(scenario, result_b));
    let session = session_with(service.clone());
    session.init().await.expect("初始化失败");

    // base 侧 X 的饱和度为 0.5
    service.set_base(result(
        vec![summary_row("C1", 0.5, 1000.0)],
        vec![detail_row("X", "C1", 0.8, 10.0, 1000.0, 0.5)],
    ));
    session
        .enter_comparison(ScenarioId::Base, ScenarioId::Saved(2))
        .await
        .expect("进入对比失败");

    let comparison = session.comparison().expect("应有对比会话");
    let row = comparison
        .report
        .rows
        .iter()
        .find(|r| r.article == "X")
        .expect("应有 X 行");
    assert!((row.delta_points - 20.0).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn exit_comparison_always_reinitializes_to_base() {
    let scenario = saved_scenario(5, "方案", 300, 24);
    let service = Arc::new(MockService::new().with_scenario(scenario, base_result()));
    let session = session_with(service);
    session.init().await.expect("初始化失败");
    session
        .load_scenario(ScenarioId::Saved(5))
        .await
        .expect("加载失败");

    session
        .enter_comparison(ScenarioId::Saved(5), ScenarioId::Base)
        .await
        .expect("进入对比失败");
    session.exit_comparison().await.expect("退出对比失败");

    // 退出对比不回到之前的 LoadedScenario, 一律回 Base
    assert_eq!(session.mode(), SessionMode::Base);
    assert_eq!(session.scenario_id(), ScenarioId::Base);
    assert!(session.comparison().is_none());
    assert!(session.overrides().is_empty());
}

#[tokio::test(start_paused = true)]
async fn exit_comparison_outside_comparison_is_rejected() {
    let service = Arc::new(MockService::new());
    let session = session_with(service);
    session.init().await.expect("初始化失败");

    assert!(matches!(
        session.exit_comparison().await,
        Err(SessionError::NotInComparisonMode)
    ));
}

#[tokio::test(start_paused = true)]
async fn comparison_fetch_failure_does_not_enter_comparison() {
    let service = Arc::new(MockService::new());
    let session = session_with(service.clone());
    session.init().await.expect("初始化失败");

    service.fail_next(ServiceError::Transport("不可达".to_string()));
    session
        .enter_comparison(ScenarioId::Base, ScenarioId::Base)
        .await
        .expect_err("应当失败");

    assert_ne!(session.mode(), SessionMode::Comparison);
    assert!(session.comparison().is_none());
    assert!(session.last_error().is_some());
}

// ==========================================
// 乱序响应丢弃
// ==========================================

#[tokio::test(start_paused = true)]
async fn out_of_order_responses_install_only_latest_issued() {
    let service = Arc::new(MockService::new());
    let session = Arc::new(session_with(service.clone()));
    session.init().await.expect("初始化失败");
    session
        .upsert_override(shift_override("A1", "C1", 8))
        .expect("编辑失败");

    // 三次请求按发出顺序取结果与延迟:
    // R1 延迟 800ms, R2 延迟 600ms, R3 延迟 1000ms
    // 到达顺序为 R2, R1, R3 — 仅最后发出的 R3 允许安装
    for tag in ["R1", "R2", "R3"] {
        service.push_preview_result(tagged_result(tag));
    }
    service.push_preview_delay(Duration::from_millis(800));
    service.push_preview_delay(Duration::from_millis(600));
    service.push_preview_delay(Duration::from_millis(1000));

    let mut handles = Vec::new();
    for _ in 0..3 {
        let session = session.clone();
        handles.push(tokio::spawn(async move { session.preview().await }));
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.expect("任务失败").expect("预览失败"));
    }

    assert_eq!(
        outcomes,
        vec![
            PreviewOutcome::Stale,
            PreviewOutcome::Stale,
            PreviewOutcome::Installed
        ]
    );
    let result = session.current_result().expect("应有结果");
    assert_eq!(result.summary[0].center, "R3");
}

#[tokio::test(start_paused = true)]
async fn loading_scenario_invalidates_in_flight_preview() {
    let service = Arc::new(MockService::new());
    let session = Arc::new(session_with(service.clone()));
    session.init().await.expect("初始化失败");
    session
        .upsert_override(shift_override("A1", "C1", 8))
        .expect("编辑失败");

    service.push_preview_result(tagged_result("LATE"));
    service.push_preview_delay(Duration::from_millis(500));

    let preview = {
        let session = session.clone();
        tokio::spawn(async move { session.preview().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    // 预览在途时加载场景: 序列号先失效, 迟到响应被丢弃
    session
        .load_scenario(ScenarioId::Base)
        .await
        .expect("加载失败");

    let outcome = preview.await.expect("任务失败").expect("预览失败");
    assert_eq!(outcome, PreviewOutcome::Stale);
    assert_eq!(session.mode(), SessionMode::Base);
    let result = session.current_result().expect("应有结果");
    assert_ne!(result.summary[0].center, "LATE");
}
