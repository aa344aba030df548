//! Winit platform loop: window creation, input routing and redraw pumping.
//!
//! All game and render state lives in [`crate::gfx::Renderer`]; this file only
//! translates window events into input state and drives the frame loop.

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::gfx::Renderer;

#[derive(Default)]
struct App {
    window: Option<Arc<Window>>,
    state: Option<Renderer>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes().with_title("Mossblade");
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };
        match pollster::block_on(Renderer::new(window.clone())) {
            Ok(state) => {
                self.state = Some(state);
                self.window = Some(window);
            }
            Err(e) => {
                log::error!("failed to initialize renderer: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                let down = key_state == ElementState::Pressed;
                match code {
                    KeyCode::KeyW | KeyCode::ArrowUp => state.input.forward = down,
                    KeyCode::KeyS | KeyCode::ArrowDown => state.input.backward = down,
                    KeyCode::KeyA | KeyCode::ArrowLeft => state.input.left = down,
                    KeyCode::KeyD | KeyCode::ArrowRight => state.input.right = down,
                    KeyCode::ShiftLeft | KeyCode::ShiftRight => state.input.run = down,
                    KeyCode::Space => state.input.attack = down,
                    KeyCode::Escape if down => event_loop.exit(),
                    _ => {}
                }
            }
            WindowEvent::Focused(false) => state.input.clear(),
            WindowEvent::RedrawRequested => match state.render() {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    if let Some(w) = &self.window {
                        state.resize(w.inner_size());
                    }
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("surface out of memory");
                    event_loop.exit();
                }
                Err(e) => log::warn!("surface error: {e:?}"),
            },
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = App::default();
    event_loop.run_app(&mut app)?;
    Ok(())
}
