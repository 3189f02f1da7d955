use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use smp_gen::cli::{Cli, Command};
use smp_gen::format::{TileImageFormat, resolve_output_path};
use smp_gen::package::pack_pyramid;
use smp_gen::pyramid::try_plan_levels;
use smp_gen::tile::GeoExtent;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log);

    match cli.command {
        Command::Plan(args) => {
            let extent = GeoExtent {
                north: args.north,
                south: args.south,
                east: args.east,
                west: args.west,
            };
            if extent.north <= extent.south {
                anyhow::bail!("--north must be greater than --south");
            }
            if extent.east <= extent.west {
                anyhow::bail!("--east must be greater than --west");
            }
            let plan = try_plan_levels(&extent, args.min_zoom, args.max_zoom)?;
            for range in plan.levels.iter() {
                println!(
                    "z={}: x={}..={} y={}..={} tiles={}",
                    range.zoom, range.min_x, range.max_x, range.min_y, range.max_y,
                    range.count()
                );
            }
            println!("total_tiles: {}", plan.total_tiles);
        }
        Command::Pack(args) => {
            let format = TileImageFormat::from_str(&args.format)
                .ok_or_else(|| anyhow::anyhow!("unknown tile format: {}", args.format))?;
            let output = resolve_output_path(&args.tiles, args.output.as_deref());
            let bar = if args.no_progress {
                ProgressBar::hidden()
            } else {
                make_progress_bar(0)
            };
            let mut progress = |done: u64, total: u64| {
                if bar.length() != Some(total) {
                    bar.set_length(total);
                }
                bar.set_position(done);
            };
            let path = pack_pyramid(&args.name, &args.tiles, format, &output, &mut progress)?;
            bar.finish_and_clear();
            println!("pack: output={}", path.display());
        }
    }

    Ok(())
}

fn make_progress_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );
    bar
}

fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_new(level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
