//! Feed synthetic gyroscope reports through the engine and print speeds.
//!
//! A producer thread plays the role of the transport: it holds the device
//! still for calibration, then turns it left at a constant rate.
//!
//! Usage: RUST_LOG=debug cargo run --example stream

use motionplus::SpeedEngine;
use std::time::{Duration, Instant};

/// Build a report with the given raw readings and all axes in fast mode.
fn report(yaw: u16, roll: u16, pitch: u16) -> [u8; 6] {
    let high = |v: u16| ((v >> 8) as u8) << 2 & 0xFC;
    [
        (yaw & 0xFF) as u8,
        (roll & 0xFF) as u8,
        (pitch & 0xFF) as u8,
        high(yaw),
        high(roll),
        high(pitch) | 0x02,
    ]
}

fn main() {
    env_logger::init();

    let mut engine = SpeedEngine::new();
    let stream = engine.stream(256);

    let producer = std::thread::Builder::new()
        .name("motionplus-transport".into())
        .spawn(move || {
            for i in 0..400u16 {
                let jitter = i % 7;
                let yaw = if i < 100 { 8000 + jitter } else { 8120 + jitter };
                let frame = report(yaw, 8190 + jitter, 7950 - jitter);
                if let Err(e) = engine.submit_frame(&frame) {
                    eprintln!("Error: {}", e);
                    break;
                }
                std::thread::sleep(Duration::from_millis(5));
            }
        });

    let producer = match producer {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Failed to spawn transport thread: {}", e);
            std::process::exit(1);
        }
    };

    let start = Instant::now();
    let mut count: u64 = 0;

    loop {
        match stream.recv_timeout(Duration::from_secs(2)) {
            Ok(event) => {
                count += 1;
                if count % 25 == 1 {
                    println!(
                        "t={:<8.3}  yaw={:+8.2}  roll={:+8.2}  pitch={:+8.2}",
                        start.elapsed().as_secs_f64(),
                        event.yaw_left_speed,
                        event.roll_left_speed,
                        event.pitch_down_speed,
                    );
                }
            }
            Err(motionplus::MotionPlusError::Timeout) => {
                eprintln!("Timeout waiting for speed events");
                break;
            }
            Err(_) => break,
        }
    }

    let _ = producer.join();
    println!("\nTotal: {} events in {:.1}s", count, start.elapsed().as_secs_f64());
}
