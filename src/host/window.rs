use minifb::{Key, MouseButton, MouseMode, Window, WindowOptions};

use crate::engine::config::EngineOptions;
use crate::engine::controller::Engine;
use crate::engine::decoder::ThreadDecoder;
use crate::engine::schedule::HeadlessScheduler;
use crate::foundation::core::{Rgba8, SurfaceSize};
use crate::foundation::error::{StippleError, StippleResult};
use crate::render::cpu::CpuSurface;
use crate::sampling::decode::ImageSource;

const TARGET_FPS: usize = 60;

/// Open a resizable window and run an engine in it until the window closes or Esc is pressed.
pub fn run_window(
    title: &str,
    size: SurfaceSize,
    source: ImageSource,
    options: EngineOptions,
    background: Rgba8,
) -> StippleResult<()> {
    let mut window = Window::new(
        title,
        size.width as usize,
        size.height as usize,
        WindowOptions {
            resize: true,
            ..WindowOptions::default()
        },
    )
    .map_err(|e| StippleError::render(format!("open window: {e}")))?;
    window.set_target_fps(TARGET_FPS);

    let mut engine = Engine::new(
        CpuSurface::new(size)?,
        HeadlessScheduler::new(),
        source,
        options,
    )?
    .with_decoder(Box::new(ThreadDecoder));
    let events = engine.events();
    engine.init()?;

    let mut current = size;
    let mut inside = false;
    let mut pressed = false;
    let mut buffer: Vec<u32> = Vec::new();

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let (w, h) = window.get_size();
        let measured = SurfaceSize::new(w as u32, h as u32);
        if measured != current {
            events.resize(measured);
            current = measured;
        }

        match window.get_mouse_pos(MouseMode::Discard) {
            Some((x, y)) => {
                events.pointer_move(f64::from(x), f64::from(y));
                inside = true;
            }
            None if inside => {
                events.pointer_leave();
                inside = false;
            }
            None => {}
        }
        let down = window.get_mouse_down(MouseButton::Left);
        if down != pressed {
            if down {
                events.pointer_down();
            } else {
                events.pointer_up();
            }
            pressed = down;
        }

        engine.pump()?;
        for handle in engine.scheduler_mut().take_due() {
            engine.tick(handle);
        }

        let frame = engine.surface().frame().flatten_onto(background);
        if frame.data.is_empty() {
            window.update();
            continue;
        }
        buffer.clear();
        buffer.extend(
            frame
                .data
                .chunks_exact(4)
                .map(|px| (u32::from(px[0]) << 16) | (u32::from(px[1]) << 8) | u32::from(px[2])),
        );
        window
            .update_with_buffer(&buffer, frame.width as usize, frame.height as usize)
            .map_err(|e| StippleError::render(format!("update window: {e}")))?;
    }

    engine.cancel();
    Ok(())
}
