//! End-to-end runs of the FROST DKG narration against the recording surface.

#![allow(clippy::unwrap_used, clippy::panic)]

use storyboard::{
    verify_timeline, AnimationVerdict, Directive, ElementId, EntityId, EntityState,
    ObservedEvent, RecordingSurface, ScriptConfig, ShapeSpec, StageKind, StageScript,
    StoryboardError, SurfaceCommand, TurnConfig,
};

fn ids(list: &[&str]) -> Vec<ElementId> {
    list.iter().map(|s| ElementId::from(*s)).collect()
}

fn arrow_draws(surface: &RecordingSurface) -> usize {
    surface
        .commands()
        .iter()
        .filter(|c| {
            matches!(
                c,
                SurfaceCommand::DrawShape {
                    spec: ShapeSpec::Arrow { .. },
                    ..
                }
            )
        })
        .count()
}

#[test]
fn test_stage_one_broadcasts_from_every_participant() {
    let script = StageScript::frost_dkg().unwrap();
    let run = script.run(&mut RecordingSurface::new()).unwrap();
    let stage = &run.outline[0];

    assert_eq!(stage.kind, StageKind::CommitmentBroadcast);
    assert_eq!(stage.sub_steps.len(), 3);
    for step in &stage.sub_steps {
        assert_eq!(step.connectors.len(), 2);
        assert!(step.marks.is_empty());
    }
    assert_eq!(stage.sub_steps[0].connectors, ids(&["P1->P2", "P1->P3"]));
    assert_eq!(stage.sub_steps[1].connectors, ids(&["P2->P1", "P2->P3"]));
    assert_eq!(stage.sub_steps[2].connectors, ids(&["P3->P1", "P3->P2"]));
    assert!(stage.sub_steps[0]
        .labels
        .contains(&ElementId::from("P1#caption")));
}

#[test]
fn test_stage_two_sends_shares_and_marks() {
    let script = StageScript::frost_dkg().unwrap();
    let run = script.run(&mut RecordingSurface::new()).unwrap();
    let stage = &run.outline[1];

    assert_eq!(stage.kind, StageKind::ShareDistribution);
    assert_eq!(stage.sub_steps.len(), 3);
    for step in &stage.sub_steps {
        assert_eq!(step.connectors.len(), 2);
        assert_eq!(step.marks.len(), 2);
    }
    assert_eq!(stage.sub_steps[1].marks, ids(&["P1#mark", "P3#mark"]));
}

#[test]
fn test_stage_three_results_persist() {
    let script = StageScript::frost_dkg().unwrap();
    let mut surface = RecordingSurface::new();
    let run = script.run(&mut surface).unwrap();
    let stage = &run.outline[2];

    assert_eq!(stage.kind, StageKind::Combination);
    assert!(stage.sub_steps.is_empty());
    assert_eq!(stage.connectors, ids(&["P1->result/public", "P2->result/public", "P3->result/public"]));

    for id in ["result/public", "result/private"] {
        assert!(run.scene.is_live(&ElementId::from(id)), "{id} should persist");
    }
    for id in &stage.connectors {
        assert!(run.scene.is_live(id));
    }
    assert!(!run.scene.is_live(&ElementId::from("title")));

    // 6 broadcasts + 6 shares + 3 converging connectors were drawn, only the
    // converging ones are left
    assert_eq!(arrow_draws(&surface), 15);
    let live_arrows = surface
        .live_shapes()
        .into_iter()
        .filter(|s| matches!(s, ShapeSpec::Arrow { .. }))
        .count();
    assert_eq!(live_arrows, 3);

    let texts: Vec<&str> = surface.live_texts().iter().map(|t| t.text.as_str()).collect();
    assert!(texts.iter().any(|t| t.starts_with("Group public key")));
    assert!(texts.iter().any(|t| t.starts_with("Group private key")));
    assert!(texts.contains(&"s_{0}"));
    assert!(!texts.iter().any(|t| t.starts_with("Stage")));
    // 3 boxes + 3 box labels + 3 connectors + 3 contributions + 2 results
    assert_eq!(surface.live_count(), 14);
}

#[test]
fn test_contribution_labels_flank_converging_arrows() {
    let script = StageScript::frost_dkg().unwrap();
    let mut surface = RecordingSurface::new();
    script.run(&mut surface).unwrap();

    let arrow_mid_x = |from_x: f64| {
        surface
            .live_shapes()
            .into_iter()
            .find_map(|s| match s {
                ShapeSpec::Arrow { start, end, .. } if (start.x - from_x).abs() < 1e-9 => {
                    Some((start.x + end.x) / 2.0)
                }
                _ => None,
            })
            .unwrap()
    };
    let label_x = |text: &str| {
        surface
            .live_texts()
            .into_iter()
            .find(|t| t.text == text)
            .unwrap()
            .position
            .x
    };

    // P1 sits left of the row centre, P3 on it and P2 to its right
    assert!(label_x("s_{0}") < arrow_mid_x(-4.0));
    assert!(label_x("s_{1}") > arrow_mid_x(4.0));
    assert!(label_x("s_{2}") > arrow_mid_x(0.0));
}

#[test]
fn test_participants_end_in_summary_row() {
    let script = StageScript::frost_dkg().unwrap();
    let run = script.run(&mut RecordingSurface::new()).unwrap();
    let x = |id: &str| run.scene.get(&EntityId::from(id)).unwrap().position().x;

    assert!((x("P1") + 4.0).abs() < 1e-9);
    assert!(x("P3").abs() < 1e-9);
    assert!((x("P2") - 4.0).abs() < 1e-9);
    for entity in run.scene.iter() {
        assert!((entity.position().y - 1.3).abs() < 1e-9);
        assert_eq!(entity.state(), EntityState::Inactive);
        assert!(entity.is_visible());
    }
}

#[test]
fn test_at_most_one_participant_active() {
    let script = StageScript::frost_dkg().unwrap();
    let compiled = script.compile().unwrap();
    let mut scene = script.scene().clone();
    for directive in compiled.sequencer.directives() {
        if let Directive::Play(unit) = directive {
            for scheduled in unit.schedule() {
                scene.commit(scheduled.op).unwrap();
                assert!(scene.active_ids().len() <= 1);
            }
        }
    }
}

#[test]
fn test_schedule_matches_itself_on_verification() {
    let script = StageScript::frost_dkg().unwrap();
    let run = script.run(&mut RecordingSurface::new()).unwrap();
    let timeline = &run.summary.timeline;

    assert!(timeline.find("annotation#4:exit").is_some());
    assert!(timeline.find("annotation#5:enter").is_none());

    let observed: Vec<ObservedEvent> = timeline
        .events
        .iter()
        .map(|e| ObservedEvent {
            name: e.name.clone(),
            time_secs: e.expected_secs + 0.005,
        })
        .collect();
    let report = verify_timeline(timeline, &observed, 10.0).unwrap();
    assert_eq!(report.verdict, AnimationVerdict::Pass);
    assert_eq!(report.total_events, timeline.event_count());

    let mut names: Vec<&str> = timeline.events.iter().map(|e| e.name.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), timeline.event_count());
}

#[test]
fn test_run_clock_matches_plan() {
    let script = StageScript::frost_dkg().unwrap();
    let compiled = script.compile().unwrap();
    let planned = compiled.sequencer.planned_duration_secs();
    let run = script.run(&mut RecordingSurface::new()).unwrap();

    assert!((run.summary.elapsed_secs - planned).abs() < 1e-9);
    assert!((run.outline[2].end_secs + 4.0 - planned).abs() < 1e-9);
}

#[test]
fn test_unknown_participant_fails_before_rendering() {
    let mut config = ScriptConfig::default();
    config.stages[1].turns = Some(vec![
        TurnConfig {
            active: "P1".to_string(),
            peers: vec!["P2".to_string(), "P3".to_string()],
        },
        TurnConfig {
            active: "P4".to_string(),
            peers: vec!["P1".to_string()],
        },
    ]);

    let surface = RecordingSurface::new();
    let err = StageScript::from_config(&config).unwrap_err();
    match err {
        StoryboardError::Configuration { context, message } => {
            assert_eq!(context.stage.as_deref(), Some("Stage 2 – Share distribution"));
            assert_eq!(context.sub_step, Some(2));
            assert!(message.contains("P4"));
        }
        other => panic!("expected configuration error, got {other:?}"),
    }
    assert!(surface.commands().is_empty());
}

#[test]
fn test_brief_overlays_are_transient() {
    let script = StageScript::frost_dkg().unwrap();
    let mut surface = RecordingSurface::new();
    let run = script.run(&mut surface).unwrap();

    let removed_texts = surface
        .commands()
        .iter()
        .filter(|c| matches!(c, SurfaceCommand::Remove { handle: storyboard::Handle::Text(_), .. }))
        .count();
    assert!(removed_texts >= 4);
    assert!(!surface
        .live_texts()
        .iter()
        .any(|t| t.text.contains("Threshold signing")));
    assert!(run.summary.elapsed_secs > 0.0);
}
