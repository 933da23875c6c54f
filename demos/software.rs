//=========================================================================
// Software Demo
//
// Opens a resizable window with the software driver and animates a
// gradient in the back buffer. Escape or closing the window quits;
// F toggles fullscreen.
//
// Run with:
//   RUST_LOG=debug cargo run --example software
//
//=========================================================================

use aetheric_platform::prelude::*;

fn main() {
    env_logger::init();

    let settings = Settings::default()
        .with_title("Aetheric Platform - Software")
        .with_window_size(640, 360)
        .with_driver(VideoDriverKind::Software);

    let mut session = match PlatformBuilder::new().with_settings(settings).build() {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{}", e);
            for message in e.errors.iter() {
                eprintln!("  {}", message);
            }
            return;
        }
    };

    let mut frame: u32 = 0;
    'running: while session.window_update() {
        while let Some(event) = session.poll_window_event() {
            match event {
                Event::Keyboard(KeyboardEvent {
                    kind: KeyboardEventKind::KeyDown,
                    mapped_key,
                    ..
                }) => match mapped_key {
                    Key::Escape => break 'running,
                    Key::F => {
                        let fullscreen = !session.is_window_fullscreen();
                        if !session.set_window_fullscreen(fullscreen, 0, 0, 0) {
                            log::warn!("Fullscreen switch rejected");
                        }
                    }
                    _ => {}
                },
                Event::Gamepad(GamepadEvent::Connected { device_index }) => {
                    log::info!("Gamepad {} connected", device_index);
                }
                _ => {}
            }
        }

        if let Some(buffer) = session.video_back_buffer() {
            let (width, height) = (buffer.width(), buffer.height());
            for y in 0..height {
                let Some(row) = buffer.row_mut(y) else { continue };
                for (x, pixel) in row.iter_mut().enumerate() {
                    let r = (x as u32 * 255 / width.max(1)) & 0xFF;
                    let g = (y * 255 / height.max(1)) & 0xFF;
                    let b = frame & 0xFF;
                    *pixel = 0xFF00_0000 | (r << 16) | (g << 8) | b;
                }
            }
        }

        session.window_flip();
        frame = frame.wrapping_add(1);
    }

    session.release();
}
