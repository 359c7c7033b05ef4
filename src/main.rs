// What you SEE:
// • A night sky with snow, stars and drifting festive icons.
// • First the QR gate: scan it with a phone, or press ENTER here to open the gift.
// • Then a foil-covered card: hold Left Mouse and drag to scratch it away.
//   Past 40% the foil vanishes and the page celebrates.
// • S saves the revealed card (or hands it to --share-with). ESC closes a notice, or quits.
// • Resizing the window re-centers the card and lays fresh foil over it.

mod app;
mod background;
mod card;
mod compose;
mod draw;
mod error;
mod export;
mod font;
mod fx;
mod gamma;
mod gate;
mod icons;
mod input;
mod notice;
mod quotes;
mod raster;
mod scratch;
mod theme;
mod timer;
mod types;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use minifb::Key;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

use app::{App, Config, FrameInput};
use card::CardView;
use draw::{Drawer, draw_crosshair};
use error::Error;
use export::ProgramShare;
use types::{FrameBuffer, Point};

#[derive(Parser, Debug)]
#[command(name = "festive-scratch", about = "Scratch-to-reveal Christmas greeting card")]
struct Args {
    /// Page URL; carrying `scanned=true` skips the QR gate
    #[arg(long, default_value = "https://lourdes.greetings/")]
    url: String,

    /// Device pixels per logical pixel
    #[arg(long, default_value_t = 1.0)]
    pixel_ratio: f32,

    /// Seed for the decorative randomness (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Which blessing to start the rotation at
    #[arg(long, default_value_t = 0)]
    quote_offset: usize,

    /// Where saved cards go
    #[arg(long, default_value = ".")]
    export_dir: PathBuf,

    /// Picture behind the card text (PNG / JPEG)
    #[arg(long)]
    background: Option<PathBuf>,

    /// Program that receives the exported card's path instead of the download folder
    #[arg(long)]
    share_with: Option<PathBuf>,
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let page = Url::parse(&args.url)?;
    let seed = args.seed.unwrap_or_else(rand::random);
    let pixel_ratio = if args.pixel_ratio.is_finite() && args.pixel_ratio > 0.0 {
        args.pixel_ratio
    } else {
        warn!(pixel_ratio = args.pixel_ratio, "unusable pixel ratio, using 1.0");
        1.0
    };
    let background = args.background.as_deref().and_then(|path| match CardView::load_background(path) {
        Ok(img) => Some(img),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "card background not loaded");
            None
        }
    });
    info!(%page, seed, pixel_ratio, "starting");

    /* --- Page + window ---
       Visual: window opens on the gate (or straight on the gift when the URL was scanned). */
    let now = Instant::now();
    let mut app = App::new(
        Config { page, pixel_ratio, seed, quote_offset: args.quote_offset, export_dir: args.export_dir, background },
        now,
    )?;
    if let Some(program) = args.share_with {
        info!(program = %program.display(), "sharing through an external program");
        app.set_share_target(Box::new(ProgramShare::new(program, std::env::temp_dir())));
    }
    let (w, h) = app.frame_size();
    let mut drawer = Drawer::new("Christmas Blessing", w, h)?;
    let mut screen = FrameBuffer::new(w, h);

    /* --- FPS --- */
    let mut last_fps_time = now;
    let mut frames_this_second: u32 = 0;

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() {
        let now = Instant::now();

        /* 0) Window resized: new page size, re-centered foil */
        let size = drawer.size();
        if size != (screen.width, screen.height) && size.0 > 0 && size.1 > 0 {
            app.resize(now, size.0, size.1);
            screen = FrameBuffer::new(size.0, size.1);
        }

        /* 1) Inputs: window pixels -> logical page pixels */
        let mouse = drawer.mouse_pos();
        let input = FrameInput {
            pointer: mouse.map(|(x, y)| Point::new(x / pixel_ratio, y / pixel_ratio)),
            pressed: drawer.left_mouse_down(),
            scan: drawer.pressed_once(Key::Enter),
            share: drawer.pressed_once(Key::S),
            escape: drawer.pressed_once(Key::Escape),
        };

        /* 2) Step the page; ESC with no notice open ends the loop */
        if !app.update(now, &input) {
            break;
        }

        /* 3) Draw the page, then the brush cursor while scratching */
        app.render(&mut screen, now)?;
        if let (Some((mx, my)), true) = (mouse, app.is_scratching()) {
            draw_crosshair(&mut screen, mx as i32, my as i32, 12, 0x00_FF_CC_33); // visual: gold + at the brush
        }

        /* 4) Present */
        drawer.present(&screen)?;

        /* 5) FPS counter */
        frames_this_second += 1;
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            debug!(fps = frames_this_second as f32 / secs, stage = ?app.stage(), "frame rate");
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    info!("bye");
    Ok(())
}
