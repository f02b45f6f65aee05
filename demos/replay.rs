//! Replay captured reports from stdin as JSON lines.
//!
//! Each input line holds one 6-byte report as hex, with or without spaces:
//!
//!   12 34 56 fc fd fe
//!
//! Pass `--passthrough` for captures taken in Nunchuk pass-through mode;
//! secondary-extension reports are then skipped.
//!
//! Usage: cargo run --example replay [-- --passthrough] < capture.txt

use motionplus::{MotionPlus, MotionPlusNunchuk, SpeedEngine, SpeedEvent};
use std::io::{self, BufRead, Write};

fn parse_hex(line: &str) -> Option<Vec<u8>> {
    let digits: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    if !digits.is_ascii() || digits.len() % 2 != 0 {
        return None;
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&digits[i..i + 2], 16).ok())
        .collect()
}

fn main() {
    env_logger::init();

    let passthrough = std::env::args().any(|a| a == "--passthrough");
    let mut skipped: u64 = 0;

    let mut handle: Box<dyn FnMut(&[u8]) -> motionplus::Result<Option<SpeedEvent>>> =
        if passthrough {
            let mut driver = MotionPlusNunchuk::new(SpeedEngine::new(), |_: &[u8; 6]| {});
            Box::new(move |data: &[u8]| driver.handle_report(data))
        } else {
            let mut driver = MotionPlus::new(SpeedEngine::new());
            Box::new(move |data: &[u8]| driver.handle_report(data))
        };

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut events: u64 = 0;

    for (lineno, line) in io::stdin().lock().lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Read error: {}", e);
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let Some(bytes) = parse_hex(trimmed) else {
            eprintln!("line {}: not hex, skipping", lineno + 1);
            skipped += 1;
            continue;
        };

        match handle(&bytes) {
            Ok(Some(event)) => {
                events += 1;
                let _ = writeln!(
                    out,
                    "{{\"yaw\":{:.2},\"roll\":{:.2},\"pitch\":{:.2}}}",
                    event.yaw_left_speed, event.roll_left_speed, event.pitch_down_speed,
                );
            }
            Ok(None) => {}
            Err(e) => {
                eprintln!("line {}: {}", lineno + 1, e);
                skipped += 1;
            }
        }
    }

    let _ = out.flush();
    eprintln!("{} events, {} lines skipped", events, skipped);
}
