use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use flow_cube::{
    EngineError, WindowEvent,
    camera::Perspective,
    data_structures::scene_graph::Scene,
    flow::{FrameRenderer, FrameSurface},
    window::Events,
};

/// One observable call made by the render loop.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Timers,
    Render,
    Poll,
    Swap(u32),
    Resize(u32, u32),
    Redraw,
}

/// Call log shared between the mock renderer and the mock window.
pub type CallLog = Rc<RefCell<Vec<Call>>>;

pub fn call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// What the mock renderer does on one `render` call.
#[derive(Clone, Copy, Debug)]
pub enum Step {
    Draw,
    Skip,
    Fail,
}

pub struct MockRenderer {
    log: CallLog,
    script: VecDeque<Step>,
    frames: u32,
    pub aspects: Vec<f32>,
}

impl MockRenderer {
    /// Follows `script`, renders nothing once it runs out.
    pub fn new(log: &CallLog, script: &[Step]) -> Self {
        Self {
            log: log.clone(),
            script: script.iter().copied().collect(),
            frames: 0,
            aspects: Vec::new(),
        }
    }
}

impl FrameRenderer for MockRenderer {
    type Frame = u32;

    fn process_gui_timers(&mut self) {
        self.log.borrow_mut().push(Call::Timers);
    }

    fn render(&mut self, _: &Scene, camera: &Perspective) -> flow_cube::Result<Option<u32>> {
        self.log.borrow_mut().push(Call::Render);
        self.aspects.push(camera.aspect);
        match self.script.pop_front().unwrap_or(Step::Skip) {
            Step::Draw => {
                self.frames += 1;
                Ok(Some(self.frames))
            }
            Step::Skip => Ok(None),
            Step::Fail => Err(EngineError::Render("scripted failure".into())),
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.log.borrow_mut().push(Call::Resize(width, height));
    }

    fn request_redraw(&mut self) {
        self.log.borrow_mut().push(Call::Redraw);
    }
}

pub struct MockWindow {
    log: CallLog,
    events: VecDeque<Events>,
}

impl MockWindow {
    /// Hands out `events` one batch per poll, empty batches afterwards.
    pub fn new(log: &CallLog, events: Vec<Events>) -> Self {
        Self {
            log: log.clone(),
            events: events.into(),
        }
    }

    /// Quiet for `polls - 1` polls, then the user closes the window.
    pub fn closing_after(log: &CallLog, polls: usize) -> Self {
        let mut events: Vec<Events> = (1..polls).map(|_| Events::default()).collect();
        events.push(window_events(vec![WindowEvent::CloseRequested]));
        Self::new(log, events)
    }
}

impl FrameSurface for MockWindow {
    type Frame = u32;

    fn poll_events(&mut self) -> Events {
        self.log.borrow_mut().push(Call::Poll);
        self.events.pop_front().unwrap_or_default()
    }

    fn swap_buffers(&mut self, frame: u32) {
        self.log.borrow_mut().push(Call::Swap(frame));
    }
}

pub fn window_events(window: Vec<WindowEvent>) -> Events {
    Events {
        window,
        exit_requested: false,
    }
}

pub fn count(log: &CallLog, call: &Call) -> usize {
    log.borrow().iter().filter(|c| *c == call).count()
}

pub fn swaps(log: &CallLog) -> Vec<u32> {
    log.borrow()
        .iter()
        .filter_map(|c| match c {
            Call::Swap(frame) => Some(*frame),
            _ => None,
        })
        .collect()
}

pub fn assert_close(a: f32, b: f32) {
    assert!((a - b).abs() < 1e-4, "{} != {}", a, b);
}
