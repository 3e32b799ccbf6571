use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;
use std::time::Duration;
use thumbgen::config::{self, Config};
use thumbgen::fetch::{self, Source};
use thumbgen::imaging::{OutputFormat, Quality, RustCodec, SizeSpec};
use thumbgen::job::{self, Destination, Job};
use thumbgen::output;
use thumbgen::storage::{ObjectStore, S3Store};

#[derive(Parser)]
#[command(name = "thumbgen")]
#[command(about = "Resize, crop and compress images, then save or publish them")]
#[command(long_about = "\
Resize, crop and compress images, then save or publish them

A source is a local file or an http(s) URL. Each requested size produces one
output image, named after the source with a prefix recording what was done:

  thumbgen run cat.jpg --scale 2                  → 2.0-cat.jpg
  thumbgen run cat.jpg --width 100 --height 200   → 100,200-cat.jpg
  thumbgen run cat.jpg --width 640 --quality 50   → 50-cmp-640,0-cat.jpg
  thumbgen run cat.jpg --size 64x64 --size 0.5    → 64,64-cat.jpg, 0.5-cat.jpg

With both width and height the image is scaled to cover the box and cropped
around the center. With only one side the other follows the aspect ratio.
Quality below 100 re-encodes the image once at that quality before resizing.

Pass --upload to publish to S3 instead of writing files. Objects are stored
public-read at {key_prefix}/{name}.

Run 'thumbgen gen-config' to generate a documented thumbgen.toml.")]
#[command(version)]
struct Cli {
    /// Config file (missing file = stock defaults)
    #[arg(long, default_value = "thumbgen.toml", global = true)]
    config: PathBuf,

    /// Log every pipeline step
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process one image and save or upload the results
    Run(RunArgs),
    /// Print a presigned URL for an object in the configured bucket
    Presign(PresignArgs),
    /// Print a stock thumbgen.toml with all options documented
    GenConfig,
}

#[derive(Args)]
struct RunArgs {
    /// Image path or http(s) URL
    source: String,

    /// Uniform scale factor (e.g. 0.5, 2)
    #[arg(long)]
    scale: Option<f64>,

    /// Target width; height follows the aspect ratio unless given
    #[arg(long)]
    width: Option<u32>,

    /// Target height; width follows the aspect ratio unless given
    #[arg(long)]
    height: Option<u32>,

    /// Output size, repeatable: WxH for a box, a bare number for a scale
    #[arg(long = "size", value_name = "WxH|SCALE", conflicts_with_all = ["scale", "width", "height"])]
    sizes: Vec<SizeSpec>,

    /// Encoding quality 1-100 (overrides output.quality)
    #[arg(short, long)]
    quality: Option<u32>,

    /// Output format: jpeg, png or webp (overrides output.format)
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Directory for written images (overrides output.directory)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Upload to S3 instead of writing files
    #[arg(long)]
    upload: bool,

    /// Bucket for --upload (overrides storage.bucket)
    #[arg(long)]
    bucket: Option<String>,

    /// Object key prefix for --upload (overrides storage.key_prefix)
    #[arg(long)]
    key_prefix: Option<String>,
}

#[derive(Args)]
struct PresignArgs {
    /// Object key in the bucket
    object: String,

    /// Lifetime in seconds (overrides storage.presign_expiration_secs)
    #[arg(long)]
    expires_in: Option<u64>,

    /// Presign an upload (PUT) instead of a download (GET)
    #[arg(long)]
    upload: bool,

    /// Content type the upload must use
    #[arg(long, default_value = "image/jpeg", requires = "upload")]
    content_type: String,

    /// Bucket (overrides storage.bucket)
    #[arg(long)]
    bucket: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    match cli.command {
        Command::Run(args) => {
            let mut config = config::load_config(&cli.config)?;
            apply_run_overrides(&mut config, &args);
            config.validate()?;
            run(&config, &args)?;
        }
        Command::Presign(args) => {
            let mut config = config::load_config(&cli.config)?;
            if let Some(bucket) = &args.bucket {
                config.storage.bucket = bucket.clone();
            }
            let store = S3Store::connect(&config.storage)?;
            let expiration = Duration::from_secs(
                args.expires_in
                    .unwrap_or(config.storage.presign_expiration_secs),
            );
            let url = if args.upload {
                store.presigned_upload_url(&args.object, &args.content_type, expiration)
            } else {
                store.presigned_url(&args.object, expiration)
            };
            match url {
                Some(url) => println!("{url}"),
                None => return Err(format!("could not presign {}", args.object).into()),
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Layer command-line flags over the loaded config.
fn apply_run_overrides(config: &mut Config, args: &RunArgs) {
    if let Some(quality) = args.quality {
        config.output.quality = quality;
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if let Some(dir) = &args.out_dir {
        config.output.directory = dir.clone();
    }
    if let Some(bucket) = &args.bucket {
        config.storage.bucket = bucket.clone();
    }
    if let Some(prefix) = &args.key_prefix {
        config.storage.key_prefix = prefix.clone();
    }
}

fn run(config: &Config, args: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let specs = if args.sizes.is_empty() {
        vec![job::select_size_spec(args.scale, args.width, args.height)?]
    } else {
        args.sizes.clone()
    };
    let quality = Quality::new(config.output.quality)?;

    // Connect before fetching so a bad bucket fails fast
    let store;
    let destination = if args.upload {
        store = S3Store::connect(&config.storage)?;
        Destination::Upload {
            store: &store,
            key_prefix: config.storage.key_prefix.clone(),
        }
    } else {
        Destination::Directory(config.output.directory.clone())
    };

    let source = fetch::fetch(&Source::parse(&args.source), &config.fetch)?;
    let job = Job {
        specs,
        quality,
        format: config.output.format,
        destination,
    };

    let delivered = job::run(&RustCodec::new(), &job, source)?;
    output::print_delivered(&delivered);
    Ok(())
}
