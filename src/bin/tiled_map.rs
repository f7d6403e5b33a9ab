use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use flate2::Compression;

use tiled_map::{Charset, CodecOptions, MapCodec, TiledMap};

#[derive(Parser)]
#[command(name = "tiled-map")]
#[command(about = "Inspect, convert and edit compressed tile map files")]
struct Cli {
    /// Charset of the map name and picture fields
    #[arg(long, value_enum, default_value = "gb2312", global = true)]
    charset: CharsetArg,

    /// Reject maps with more tiles than this
    #[arg(long, default_value_t = 16 * 1024 * 1024, global = true)]
    max_tiles: usize,

    /// zlib level (0-9) used when writing
    #[arg(long, default_value_t = 6, global = true)]
    level: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum CharsetArg {
    Gb2312,
    Utf8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print header fields and section counts
    Info { file: PathBuf },
    /// Decode a map and write it as JSON
    Dump {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Build a map file from a JSON document
    Build {
        json: PathBuf,
        file: PathBuf,
        /// Recompute element/jump point counts and payload lengths
        #[arg(long)]
        sync_counts: bool,
    },
    /// Resize the tile grid, keeping overlapping tiles
    Resize {
        file: PathBuf,
        #[arg(long)]
        cols: i32,
        #[arg(long)]
        rows: i32,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the flags of one tile
    Tile {
        file: PathBuf,
        #[arg(long)]
        x: i32,
        #[arg(long)]
        y: i32,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let codec = MapCodec::new(CodecOptions {
        charset: match cli.charset {
            CharsetArg::Gb2312 => Charset::Gb2312,
            CharsetArg::Utf8 => Charset::Utf8,
        },
        max_tiles: cli.max_tiles,
        compression: Compression::new(cli.level.min(9)),
        ..CodecOptions::default()
    });

    match cli.command {
        Commands::Info { file } => {
            let map = codec.load(&file)?;
            print_info(&map);
        }
        Commands::Dump { file, output } => {
            let map = codec.load(&file)?;
            let json = serde_json::to_string_pretty(&map)?;
            match output {
                Some(path) => {
                    fs::write(&path, json)?;
                    eprintln!("Wrote {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        Commands::Build { json, file, sync_counts } => {
            let mut map: TiledMap = serde_json::from_str(&fs::read_to_string(&json)?)?;
            if sync_counts {
                map.sync_counts();
            }
            codec.save(&map, &file)?;
            eprintln!("Wrote {} ({}x{} tiles)", file.display(), map.tile_col, map.tile_row);
        }
        Commands::Resize { file, cols, rows, output } => {
            let mut map = codec.load(&file)?;
            if !map.resize_tiles(cols, rows) {
                return Err(format!("invalid grid size {cols}x{rows}").into());
            }
            let out = output.unwrap_or(file);
            codec.save(&map, &out)?;
            eprintln!("Resized to {cols}x{rows}, saved {}", out.display());
        }
        Commands::Tile { file, x, y } => {
            let map = codec.load(&file)?;
            let tile = map
                .get_tile(x, y)
                .ok_or_else(|| format!("({x}, {y}) is outside {}x{}", map.tile_col, map.tile_row))?;
            println!("{}", serde_json::to_string_pretty(tile)?);
        }
    }

    Ok(())
}

fn print_info(map: &TiledMap) {
    println!("map_id:         {}", map.map_id);
    println!("map_type:       {}", map.map_type);
    println!("map_name:       {}", map.map_name);
    println!("map_picture:    {}", map.map_picture);
    println!("grid:           {}x{} ({} tiles)", map.tile_col, map.tile_row, map.tiles.len());
    println!("tile size:      {}x{}", map.tw, map.th);
    println!("offset:         ({}, {})", map.offset_x, map.offset_y);
    println!("elements:       {}", map.element_num);
    println!("jump points:    {}", map.jump_point_num);

    let walkable = map.tiles.iter().filter(|t| t.exist).count();
    println!("existing tiles: {walkable}");
}
