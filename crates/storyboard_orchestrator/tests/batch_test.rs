//! Tests for the batch generation loop.

mod test_utils;

use std::sync::Arc;
use std::time::Duration;
use storyboard_core::{
    AspectRatio, BatchEvent, BatchPhase, FALLBACK_SUMMARY, ResultStatus, SceneDescriptor,
};
use storyboard_orchestrator::BatchOrchestrator;
use storyboard_rate_limit::Pacer;
use storyboard_storage::{JsonFileBackend, ResultStore};
use tempfile::TempDir;
use test_utils::{FakeAnalyzer, FakeRenderer, FakeRepair, orchestrator};
use tokio::sync::broadcast;
use tokio::time::Instant;

fn drain(events: &mut broadcast::Receiver<BatchEvent>) -> Vec<BatchEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

#[tokio::test]
async fn test_short_story_all_scenes_succeed() {
    let analyzer = Arc::new(FakeAnalyzer::prompts(&["A girl finds a map", "She sails away"]));
    let renderer = Arc::new(FakeRenderer::new());
    let repair = Arc::new(FakeRepair::suggesting("unused"));
    let (orchestrator, backend) =
        orchestrator(analyzer, renderer.clone(), repair.clone()).await;

    let report = orchestrator
        .start_generation("A girl finds a map and sails away.", AspectRatio::Square)
        .await
        .unwrap();

    assert_eq!(report.progress().phase, BatchPhase::Success);
    assert_eq!(report.results().len(), 2);
    assert_eq!(report.succeeded(), 2);

    let live = orchestrator.live_view().await;
    assert_eq!(&live, report.results());
    assert_eq!(live[0].refined_prompt(), "A girl finds a map");
    assert_eq!(live[1].refined_prompt(), "She sails away");
    assert_eq!(live[0].original_input(), "A girl finds a map and sails away.");
    assert_eq!(live[1].scene_summary().as_deref(), Some("Scene 2"));
    assert!(live.iter().all(|r| *r.aspect_ratio() == AspectRatio::Square));

    assert_eq!(orchestrator.history().await, live);
    assert_eq!(backend.saves(), 2);
    assert_eq!(repair.calls(), 0);
    assert_eq!(renderer.aspect_ratios(), vec![AspectRatio::Square; 2]);
}

#[tokio::test]
async fn test_analyzer_failure_falls_back_to_single_scene() {
    let script = "A lighthouse keeper waits for a ship that never comes.";
    let renderer = Arc::new(FakeRenderer::new());
    let (orchestrator, _) = orchestrator(
        Arc::new(FakeAnalyzer::failing()),
        renderer.clone(),
        Arc::new(FakeRepair::echo()),
    )
    .await;

    let report = orchestrator
        .start_generation(script, AspectRatio::Landscape)
        .await
        .unwrap();

    assert_eq!(report.progress().phase, BatchPhase::Success);
    assert_eq!(report.results().len(), 1);
    let result = &report.results()[0];
    assert_eq!(result.refined_prompt(), script);
    assert_eq!(result.scene_summary().as_deref(), Some(FALLBACK_SUMMARY));
    assert_eq!(result.scene_index(), Some(1));
    assert_eq!(renderer.prompts(), vec![script.to_string()]);
}

#[tokio::test]
async fn test_empty_analysis_falls_back_to_single_scene() {
    let script = "Two cats share a windowsill.";
    let (orchestrator, _) = orchestrator(
        Arc::new(FakeAnalyzer::scenes(vec![SceneDescriptor::new(1, "blank", "   ")])),
        Arc::new(FakeRenderer::new()),
        Arc::new(FakeRepair::echo()),
    )
    .await;

    let report = orchestrator
        .start_generation(script, AspectRatio::Landscape)
        .await
        .unwrap();

    assert_eq!(report.results().len(), 1);
    assert_eq!(report.results()[0].refined_prompt(), script);
}

#[tokio::test]
async fn test_one_failed_scene_does_not_stop_the_batch() {
    let analyzer = Arc::new(FakeAnalyzer::prompts(&["one", "two", "three", "four"]));
    let renderer = Arc::new(FakeRenderer::failing_on(&["two"]));
    let repair = Arc::new(FakeRepair::suggesting("a gentler two"));
    let (orchestrator, _) = orchestrator(analyzer, renderer.clone(), repair.clone()).await;

    let report = orchestrator
        .start_generation("A four part story", AspectRatio::Landscape)
        .await
        .unwrap();

    assert_eq!(report.progress().phase, BatchPhase::Success);
    assert_eq!(report.failed(), 1);

    let live = orchestrator.live_view().await;
    assert_eq!(live.len(), 4);
    let statuses: Vec<_> = live.iter().map(|r| *r.status()).collect();
    assert_eq!(
        statuses,
        vec![
            ResultStatus::Success,
            ResultStatus::Failed,
            ResultStatus::Success,
            ResultStatus::Success
        ]
    );
    assert_eq!(live[1].image_data(), &None);
    assert_eq!(live[1].suggested_prompt().as_deref(), Some("a gentler two"));

    let stored = orchestrator.history().await;
    assert_eq!(stored.len(), 3);
    assert!(stored.iter().all(|r| r.is_success()));
    assert_eq!(renderer.calls(), 4);
    assert_eq!(repair.calls(), 1);
}

#[tokio::test]
async fn test_repair_echo_yields_no_suggestion() {
    let (orchestrator, _) = orchestrator(
        Arc::new(FakeAnalyzer::prompts(&["forbidden"])),
        Arc::new(FakeRenderer::failing_on(&["forbidden"])),
        Arc::new(FakeRepair::echo()),
    )
    .await;

    let report = orchestrator
        .start_generation("story", AspectRatio::Landscape)
        .await
        .unwrap();

    let result = &report.results()[0];
    assert_eq!(*result.status(), ResultStatus::Failed);
    assert_eq!(result.suggested_prompt(), &None);
    assert!(orchestrator.history().await.is_empty());
}

#[tokio::test]
async fn test_events_follow_scene_order() {
    let (orchestrator, _) = orchestrator(
        Arc::new(FakeAnalyzer::scenes(vec![
            SceneDescriptor::new(3, "c", "third"),
            SceneDescriptor::new(1, "a", "first"),
            SceneDescriptor::new(2, "b", "second"),
        ])),
        Arc::new(FakeRenderer::failing_on(&["second"])),
        Arc::new(FakeRepair::echo()),
    )
    .await;
    let mut events = orchestrator.subscribe();

    orchestrator
        .start_generation("story", AspectRatio::Landscape)
        .await
        .unwrap();

    let events = drain(&mut events);
    let indices: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            BatchEvent::Result(r) => r.scene_index(),
            _ => None,
        })
        .collect();
    assert_eq!(indices, vec![1, 2, 3]);

    let progress: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            BatchEvent::Progress(p) => Some((p.phase, p.current_index)),
            _ => None,
        })
        .collect();
    assert_eq!(
        progress,
        vec![
            (BatchPhase::Analyzing, None),
            (BatchPhase::Generating, Some(0)),
            (BatchPhase::Generating, Some(1)),
            (BatchPhase::Generating, Some(2)),
            (BatchPhase::Generating, Some(3)),
            (BatchPhase::Success, Some(3)),
        ]
    );
    assert_eq!(orchestrator.current_progress().phase, BatchPhase::Success);
}

#[tokio::test]
async fn test_blank_script_is_ignored() {
    let analyzer = Arc::new(FakeAnalyzer::prompts(&["x"]));
    let (orchestrator, _) = orchestrator(
        analyzer.clone(),
        Arc::new(FakeRenderer::new()),
        Arc::new(FakeRepair::echo()),
    )
    .await;
    let mut events = orchestrator.subscribe();

    assert!(
        orchestrator
            .start_generation("  \n\t ", AspectRatio::Landscape)
            .await
            .is_none()
    );
    assert_eq!(analyzer.calls(), 0);
    assert!(drain(&mut events).is_empty());
    assert_eq!(orchestrator.current_progress().phase, BatchPhase::Idle);
}

#[tokio::test]
async fn test_duplicate_scene_indices_still_render_every_scene() {
    let renderer = Arc::new(FakeRenderer::new());
    let (orchestrator, _) = orchestrator(
        Arc::new(FakeAnalyzer::scenes(vec![
            SceneDescriptor::new(1, "a", "first"),
            SceneDescriptor::new(1, "b", "again"),
        ])),
        renderer.clone(),
        Arc::new(FakeRepair::echo()),
    )
    .await;

    let report = orchestrator
        .start_generation("a valid story", AspectRatio::Landscape)
        .await
        .unwrap();

    assert_eq!(report.progress().phase, BatchPhase::Success);
    let indices: Vec<_> = report
        .results()
        .iter()
        .filter_map(|r| r.scene_index())
        .collect();
    assert_eq!(indices, vec![1, 2]);
    assert_eq!(renderer.prompts(), vec!["first".to_string(), "again".to_string()]);
}

#[tokio::test]
async fn test_new_batch_keeps_earlier_results() {
    let (orchestrator, _) = orchestrator(
        Arc::new(FakeAnalyzer::prompts(&["one", "two"])),
        Arc::new(FakeRenderer::new()),
        Arc::new(FakeRepair::echo()),
    )
    .await;

    let first = orchestrator
        .start_generation("first story", AspectRatio::Landscape)
        .await
        .unwrap();
    let second = orchestrator
        .start_generation("second story", AspectRatio::Landscape)
        .await
        .unwrap();

    assert_ne!(first.batch_id(), second.batch_id());
    assert_eq!(orchestrator.history().await.len(), 4);
    assert_eq!(orchestrator.live_view().await, *second.results());
    assert_eq!(
        orchestrator.store().batches().await,
        vec![first.batch_id().clone(), second.batch_id().clone()]
    );
}

#[tokio::test(start_paused = true)]
async fn test_scenes_are_paced() {
    let backend_store = Arc::new(ResultStore::in_memory());
    let orchestrator = BatchOrchestrator::new(
        Arc::new(FakeAnalyzer::prompts(&["one", "two", "three"])),
        Arc::new(FakeRenderer::new()),
        Arc::new(FakeRepair::echo()),
        backend_store,
    );

    let start = Instant::now();
    orchestrator
        .start_generation("story", AspectRatio::Landscape)
        .await
        .unwrap();

    assert!(start.elapsed() >= Duration::from_millis(6000));
    assert!(start.elapsed() < Duration::from_millis(9000));
}

#[tokio::test(start_paused = true)]
async fn test_adaptive_pacing_backs_off_after_rate_limiting() {
    let orchestrator = BatchOrchestrator::new(
        Arc::new(FakeAnalyzer::prompts(&["one", "two", "three"])),
        Arc::new(FakeRenderer::failing_on(&["one", "two", "three"]).rate_limited()),
        Arc::new(FakeRepair::echo()),
        Arc::new(ResultStore::in_memory()),
    )
    .with_pacer(Pacer::adaptive(
        Duration::from_secs(1),
        Duration::from_secs(4),
    ));

    let start = Instant::now();
    let report = orchestrator
        .start_generation("story", AspectRatio::Landscape)
        .await
        .unwrap();

    // 2s before scene two, 4s before scene three.
    assert!(start.elapsed() >= Duration::from_secs(6));
    assert_eq!(report.failed(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_stops_between_scenes() {
    let orchestrator = Arc::new(BatchOrchestrator::new(
        Arc::new(FakeAnalyzer::prompts(&["one", "two", "three"])),
        Arc::new(FakeRenderer::new()),
        Arc::new(FakeRepair::echo()),
        Arc::new(ResultStore::in_memory()),
    ));
    let mut events = orchestrator.subscribe();

    let running = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move {
            orchestrator
                .start_generation("story", AspectRatio::Landscape)
                .await
        })
    };

    loop {
        if let BatchEvent::Result(_) = events.recv().await.unwrap() {
            break;
        }
    }
    assert!(orchestrator.is_running());
    orchestrator.cancel();

    let report = running.await.unwrap().unwrap();
    assert_eq!(report.progress().phase, BatchPhase::Cancelled);
    assert_eq!(report.progress().current_index, Some(1));
    assert_eq!(report.results().len(), 1);
    assert_eq!(orchestrator.history().await.len(), 1);
    assert!(!orchestrator.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_second_start_while_running_is_ignored() {
    let analyzer = Arc::new(FakeAnalyzer::prompts(&["one", "two"]));
    let orchestrator = Arc::new(BatchOrchestrator::new(
        analyzer.clone(),
        Arc::new(FakeRenderer::new()),
        Arc::new(FakeRepair::echo()),
        Arc::new(ResultStore::in_memory()),
    ));
    let mut events = orchestrator.subscribe();

    let running = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move {
            orchestrator
                .start_generation("story", AspectRatio::Landscape)
                .await
        })
    };

    events.recv().await.unwrap();
    assert!(
        orchestrator
            .start_generation("another story", AspectRatio::Landscape)
            .await
            .is_none()
    );

    let report = running.await.unwrap().unwrap();
    assert_eq!(report.results().len(), 2);
    assert_eq!(analyzer.calls(), 1);
}

#[tokio::test]
async fn test_history_survives_restart() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("history.json");

    let store = Arc::new(ResultStore::open(Arc::new(JsonFileBackend::new(&path))).await);
    let orchestrator = BatchOrchestrator::new(
        Arc::new(FakeAnalyzer::prompts(&["one", "two", "three"])),
        Arc::new(FakeRenderer::failing_on(&["two"])),
        Arc::new(FakeRepair::suggesting("calmer two")),
        store,
    )
    .with_pacer(Pacer::fixed(Duration::ZERO));

    orchestrator
        .start_generation("story", AspectRatio::Portrait)
        .await
        .unwrap();
    let before = orchestrator.history().await;

    let reopened = ResultStore::open(Arc::new(JsonFileBackend::new(&path))).await;
    assert_eq!(reopened.all().await, before);
    assert_eq!(before.len(), 2);
    Ok(())
}
