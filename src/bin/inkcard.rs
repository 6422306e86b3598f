use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use inkcard::{
    Card, CardRender, Surface, ViewContext,
    animate::{Animation, STEP_DELAY_MS},
    render_card,
};

#[derive(Parser, Debug)]
#[command(name = "inkcard", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a card to a PNG.
    Render(RenderArgs),
    /// Dump an animated card's reveal as numbered PNG frames.
    Frames(FramesArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input card: JSON (`{"input": ..., "rule": ..., "options": ...}`) or
    /// raw byte markup.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Canvas width in pixels.
    #[arg(long, default_value_t = 600)]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = 848)]
    height: u32,

    /// Background color (#rrggbb) override.
    #[arg(long)]
    background: Option<String>,

    /// Disable the italic shear.
    #[arg(long)]
    no_italics: bool,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    /// Input card (JSON or raw byte markup).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory for `frame_NNNN.png`.
    #[arg(long)]
    out_dir: PathBuf,

    /// Canvas width in pixels.
    #[arg(long, default_value_t = 600)]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = 848)]
    height: u32,

    /// Milliseconds between dumped frames.
    #[arg(long, default_value_t = 16.0)]
    frame_ms: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frames(args) => cmd_frames(args),
    }
}

fn read_card(path: &Path) -> anyhow::Result<Card> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read card '{}'", path.display()))?;
    // Stored cards are JSON; anything that doesn't parse as one is treated
    // as raw markup.
    Ok(serde_json::from_str(&text).unwrap_or_else(|_| Card {
        input: text,
        ..Card::default()
    }))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut card = read_card(&args.in_path)?;
    if let Some(bg) = args.background {
        card.options.background_color = Some(bg);
    }
    if args.no_italics {
        card.options.italics = Some(false);
    }
    // Static output: never animate, regardless of the card's own options.
    card.options.animate = Some(false);

    let mut surface = Surface::new(args.width, args.height)?;
    render_card(&mut surface, &card, ViewContext::Grid);
    surface.write_png(&args.out)?;
    println!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let mut card = read_card(&args.in_path)?;
    card.options.animate = Some(true);

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create '{}'", args.out_dir.display()))?;

    let mut surface = Surface::new(args.width, args.height)?;
    let (ops, opts) = match render_card(&mut surface, &card, ViewContext::Detail) {
        CardRender::Animated { ops, opts } => (ops, opts),
        CardRender::Static => {
            // Nothing to animate; dump the static result as frame 0.
            surface.write_png(&args.out_dir.join("frame_0000.png"))?;
            return Ok(());
        }
    };

    let total_ms = ops.len() as f64 * STEP_DELAY_MS;
    let animation = Animation::new(ops, opts, 0.0);

    let mut now = 0.0;
    let mut index = 0u32;
    loop {
        animation.paint(&mut surface, now)?;
        surface.write_png(&args.out_dir.join(format!("frame_{index:04}.png")))?;
        if animation.is_done(now) {
            break;
        }
        now += args.frame_ms;
        index += 1;
    }
    println!(
        "wrote {} frames ({total_ms:.0}ms of reveal) to {}",
        index + 1,
        args.out_dir.display()
    );
    Ok(())
}
