//! Interactive session: each stdin line is a tap, a close, or quit.
//!
//! Taps are read while earlier requests are still running, so a fast typist
//! can supersede a selection before its weather arrives.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use pinpoint_core::{Session, Transition, WeatherProvider};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::render::View;

const HELP: &str = "Type `lat,lon` to tap the map, `close` to dismiss, `quit` to exit.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    Tap { latitude: f64, longitude: f64 },
    Close,
    Quit,
    Help,
    Empty,
}

pub fn parse_input(line: &str) -> Result<Input> {
    let line = line.trim();
    match line.to_lowercase().as_str() {
        "" => return Ok(Input::Empty),
        "close" | "c" => return Ok(Input::Close),
        "quit" | "q" | "exit" => return Ok(Input::Quit),
        "help" | "?" => return Ok(Input::Help),
        _ => {}
    }

    let (latitude, longitude) = parse_tap(line)?;
    Ok(Input::Tap {
        latitude,
        longitude,
    })
}

/// Parse `lat,lon` or `lat lon`.
pub fn parse_tap(text: &str) -> Result<(f64, f64)> {
    let parts: Vec<&str> = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();

    let [lat, lon] = parts.as_slice() else {
        bail!("Expected `lat,lon`, got '{text}'.\nHint: {HELP}");
    };

    let latitude: f64 = lat
        .parse()
        .with_context(|| format!("Invalid latitude '{lat}'"))?;
    let longitude: f64 = lon
        .parse()
        .with_context(|| format!("Invalid longitude '{lon}'"))?;

    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(anyhow!("Coordinates must be finite numbers"));
    }

    Ok((latitude, longitude))
}

pub async fn run(provider: Arc<dyn WeatherProvider>) -> Result<()> {
    let mut session = Session::new(provider);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{HELP}");
    print!("{}", View::from(&session.selection()));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };

                match parse_input(&line) {
                    Ok(Input::Tap { latitude, longitude }) => {
                        session.select(latitude, longitude);
                    }
                    Ok(Input::Close) => session.dismiss(),
                    Ok(Input::Quit) => break,
                    Ok(Input::Help) => {
                        println!("{HELP}");
                        continue;
                    }
                    Ok(Input::Empty) => continue,
                    Err(err) => {
                        tracing::debug!(input = %line, "ignoring unparseable input");
                        eprintln!("{err:#}");
                        continue;
                    }
                }

                print!("{}", View::from(&session.selection()));
            }
            Some(transition) = session.next_completion(), if session.in_flight() > 0 => {
                if transition != Transition::Stale {
                    print!("{}", View::from(&session.selection()));
                }
            }
        }
    }

    Ok(())
}
