//! Shared test helpers for session integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use scenetour_core::probe::SelectorProbe;
use scenetour_core::pub_center::PubCenter;
use scenetour_engine::application::props::{StepProps, bind_renderer};
use scenetour_engine::application::readiness::ReadinessOptions;
use scenetour_engine::application::session::{TourHandle, TourSession};
use scenetour_engine::domain::events::TourEvent;
use scenetour_engine::domain::tour::TourEngine;
use scenetour_scene::application::service::AppConfig;
use scenetour_scene::domain::scene::SceneDef;
use scenetour_scene::domain::step::{
    FocusStep, InputCheckerStep, InputRule, NoticeStep, Selector, StepBase, StepDef, WaitUntil,
};
use scenetour_test_support::{EventRecorder, FixedClock, StaticSceneService};

/// A running tour under test.
pub struct Harness {
    pub pub_center: Arc<PubCenter<TourEvent>>,
    pub recorder: EventRecorder<TourEvent>,
    pub session: TourSession,
    pub handle: TourHandle,
}

/// Opens a session on `scene`, registered under the name `"demo"`.
pub async fn open(
    scene: SceneDef,
    probe: Arc<dyn SelectorProbe>,
    options: ReadinessOptions,
) -> Harness {
    let pub_center: Arc<PubCenter<TourEvent>> = Arc::new(PubCenter::new());
    let recorder = EventRecorder::attach(&pub_center);
    let engine = TourEngine::new(Arc::clone(&pub_center), Arc::new(FixedClock::default()));
    let config = AppConfig::new(Arc::new(StaticSceneService::new().with_scene("demo", scene)));
    let (session, handle) = TourSession::open(&config, "demo", engine, probe, options)
        .await
        .unwrap();
    Harness {
        pub_center,
        recorder,
        session,
        handle,
    }
}

/// Binds a renderer that keeps every `StepProps` it is given.
pub fn collect_props(harness: &Harness) -> Arc<Mutex<Vec<StepProps>>> {
    let rendered = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&rendered);
    bind_renderer(&harness.pub_center, &harness.handle, move |props| {
        sink.lock().unwrap().push(props);
    });
    rendered
}

pub fn notice(content: &str) -> StepDef {
    StepDef::Notice(NoticeStep {
        base: StepBase::default(),
        top_offset: None,
        left_offset: None,
        content: content.to_owned(),
    })
}

pub fn triggered_notice(content: &str, trigger: &str) -> StepDef {
    StepDef::Notice(NoticeStep {
        base: StepBase {
            next_step_trigger: Some(trigger.to_owned()),
            ..StepBase::default()
        },
        top_offset: None,
        left_offset: None,
        content: content.to_owned(),
    })
}

pub fn waiting_focus(selector: &str, delay: Option<u64>) -> StepDef {
    StepDef::Focus(FocusStep {
        base: StepBase {
            wait_until: Some(WaitUntil {
                selector: Some(selector.to_owned()),
                delay,
            }),
            ..StepBase::default()
        },
        selector: Selector::One(selector.to_owned()),
        position: None,
        content: "look here".to_owned(),
    })
}

pub fn digits_checker() -> StepDef {
    StepDef::InputChecker(InputCheckerStep {
        focus: FocusStep {
            base: StepBase::default(),
            selector: Selector::One("#code".to_owned()),
            position: None,
            content: "enter the code".to_owned(),
        },
        value_collect: "#code".to_owned(),
        value_collect_field: None,
        rules: vec![InputRule {
            pattern: Some(r"^\d+$".to_owned()),
            message: Some("digits only".to_owned()),
        }],
    })
}
