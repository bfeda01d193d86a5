//! The frame loop, generic over the window and render backend
use std::cell::Cell;
use std::rc::Rc;

use crate::backend::{Key, RenderBackend, Window};
use crate::error::BackendError;
use crate::frame::FrameState;
use crate::input::{process_input, InputState, KeySnapshot};
use crate::projection::{Camera, ProjectionMode};
use crate::scene::Scene;
use crate::shading::ShadingParams;

/// Loop settings that do not change while running
#[derive(Debug, Clone)]
pub struct LoopOptions {
    pub initial_mode: ProjectionMode,
    /// Key that switches between perspective and orthographic projection
    pub toggle_key: char,
    /// Stop after this many frames
    pub max_frames: Option<u64>,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            initial_mode: ProjectionMode::Perspective,
            toggle_key: 'c',
            max_frames: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub mode: ProjectionMode,
}

/// Run frames until the window asks to close.
///
/// Each iteration samples input, renders every mesh, presents and then
/// polls events. Escape requests a close that takes effect after the
/// current frame has been presented.
pub fn run<W, B>(
    window: &mut W,
    scene: &mut Scene<B>,
    camera: &Camera,
    shading: &ShadingParams,
    options: &LoopOptions,
) -> Result<RunSummary, BackendError>
where
    W: Window,
    B: RenderBackend,
{
    let pending_resize: Rc<Cell<Option<(u32, u32)>>> = Rc::new(Cell::new(None));
    let sink = Rc::clone(&pending_resize);
    window.set_resize_callback(Box::new(move |width, height| {
        sink.set(Some((width, height)));
    }));

    let (width, height) = window.size();
    scene.backend_mut().set_viewport(width, height);

    let mut input = InputState::new(options.initial_mode);
    let mut frames = 0u64;

    while !window.should_close() {
        if options.max_frames.is_some_and(|max| frames >= max) {
            break;
        }

        let keys = KeySnapshot {
            escape: window.key_pressed(Key::Escape),
            toggle: window.key_pressed(Key::Char(options.toggle_key)),
        };
        let (next, actions) = process_input(input, keys);
        input = next;
        if actions.close_requested {
            window.set_should_close(true);
        }

        if let Some((width, height)) = pending_resize.take() {
            log::debug!("viewport resized to {width}x{height}");
            scene.backend_mut().set_viewport(width, height);
        }

        let (width, height) = window.size();
        let frame = FrameState::new(window.elapsed_time(), width, height, input.mode);
        scene.render(&frame, camera, shading);

        window.swap_buffers()?;
        window.poll_events()?;
        frames += 1;
    }

    log::debug!("frame loop finished after {frames} frames");
    Ok(RunSummary {
        frames,
        mode: input.mode,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Mesh;
    use crate::testing::{Call, RecordingBackend, ScriptedWindow};
    use nalgebra::Vector3;

    fn scene() -> Scene<RecordingBackend> {
        let mut scene = Scene::new(RecordingBackend::default(), "vs", "fs").unwrap();
        scene
            .add_mesh(Mesh::cube(1.0), Vector3::zeros(), Vector3::x())
            .unwrap();
        scene.backend().clear();
        scene
    }

    #[test]
    fn test_held_toggle_flips_once_then_escape_closes() {
        let toggle = Key::Char('c');
        let script = vec![
            vec![toggle],
            vec![toggle],
            vec![toggle],
            vec![toggle],
            vec![],
            vec![Key::Escape],
        ];
        let mut window = ScriptedWindow::new((800, 600), script);
        let mut scene = scene();

        let summary = run(
            &mut window,
            &mut scene,
            &Camera::default(),
            &ShadingParams::default(),
            &LoopOptions::default(),
        )
        .unwrap();

        assert_eq!(summary.frames, 6);
        assert_eq!(summary.mode, ProjectionMode::Orthographic);
        assert_eq!(window.presented, 6);
        let draws = scene
            .backend()
            .calls()
            .iter()
            .filter(|call| matches!(call, Call::Draw { .. }))
            .count();
        assert_eq!(draws, 6);
    }

    #[test]
    fn test_max_frames_stops_the_loop() {
        let mut window = ScriptedWindow::new((800, 600), Vec::new());
        let mut scene = scene();
        let options = LoopOptions {
            max_frames: Some(3),
            ..Default::default()
        };

        let summary = run(
            &mut window,
            &mut scene,
            &Camera::default(),
            &ShadingParams::default(),
            &options,
        )
        .unwrap();
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.mode, ProjectionMode::Perspective);
    }

    #[test]
    fn test_resize_updates_viewport() {
        let mut window = ScriptedWindow::new((800, 600), Vec::new());
        window.resize_after = Some((1, (400, 400)));
        let mut scene = scene();
        let options = LoopOptions {
            max_frames: Some(2),
            ..Default::default()
        };

        run(
            &mut window,
            &mut scene,
            &Camera::default(),
            &ShadingParams::default(),
            &options,
        )
        .unwrap();

        let viewports: Vec<_> = scene
            .backend()
            .calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Viewport(..)))
            .collect();
        assert_eq!(viewports, vec![Call::Viewport(800, 600), Call::Viewport(400, 400)]);
    }

    #[test]
    fn test_custom_toggle_key_and_initial_mode() {
        let script = vec![vec![Key::Char('p')], vec![], vec![Key::Char('p')]];
        let mut window = ScriptedWindow::new((800, 600), script);
        let mut scene = scene();
        let options = LoopOptions {
            initial_mode: ProjectionMode::Orthographic,
            toggle_key: 'p',
            max_frames: Some(3),
        };

        let summary = run(
            &mut window,
            &mut scene,
            &Camera::default(),
            &ShadingParams::default(),
            &options,
        )
        .unwrap();
        assert_eq!(summary.mode, ProjectionMode::Orthographic);
    }
}
