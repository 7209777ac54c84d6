use anyhow::Context;
use clap::{Parser, Subcommand};
use fatpeek_core::ExtractOptions;
use fatpeek_filesystems::{format_83_name, raw_83_name, Fat12Reader};
use log::{debug, info};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fatpeek")]
#[command(about = "Read files out of FAT12 disk images", long_about = None)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON file with extraction options
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Allow names to match deleted directory entries
    #[arg(long, global = true)]
    include_deleted: bool,

    /// Maximum number of clusters followed in one chain
    #[arg(long, global = true)]
    max_chain: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a file, showing non-printable bytes as '.'
    Cat {
        /// Disk image path
        image: PathBuf,
        /// File name, e.g. README.TXT
        name: String,
        /// Treat the name as the 11-byte padded on-disk form
        #[arg(long)]
        raw: bool,
    },
    /// Copy a file out of the image
    Extract {
        image: PathBuf,
        name: String,
        /// Destination path
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long)]
        raw: bool,
    },
    /// List the root directory
    Ls {
        image: PathBuf,
    },
    /// Show volume geometry
    Info {
        image: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_options(cli: &Cli) -> anyhow::Result<ExtractOptions> {
    let mut options = match &cli.config {
        Some(path) => ExtractOptions::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ExtractOptions::default(),
    };

    if cli.include_deleted {
        options.include_deleted = true;
    }
    if let Some(max) = cli.max_chain {
        options.max_chain_clusters = max;
    }

    debug!("Extraction options: {:?}", options);
    Ok(options)
}

fn disk_name(name: &str, raw: bool) -> anyhow::Result<[u8; 11]> {
    let parsed = if raw { raw_83_name(name) } else { format_83_name(name) };
    Ok(parsed?)
}

fn open(image: &Path, options: &ExtractOptions) -> anyhow::Result<Fat12Reader<fatpeek_core::ImageFile<std::fs::File>>> {
    Fat12Reader::open_path(image, options.clone())
        .with_context(|| format!("Failed to open FAT12 image {}", image.display()))
}

/// Bytes in 0x20..=0x7E pass through, everything else becomes '.'.
fn render_printable(data: &[u8]) -> String {
    data.iter()
        .map(|&b| if (0x20..=0x7E).contains(&b) { b as char } else { '.' })
        .collect()
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let options = load_options(&cli)?;

    match &cli.command {
        Commands::Cat { image, name, raw } => {
            let target = disk_name(name, *raw)?;
            let data = open(image, &options)?
                .extract(&target)
                .with_context(|| format!("Failed to read {}", name))?;

            println!("{}", render_printable(&data));
        }
        Commands::Extract { image, name, output, raw } => {
            let target = disk_name(name, *raw)?;
            let data = open(image, &options)?
                .extract(&target)
                .with_context(|| format!("Failed to read {}", name))?;

            let mut file = std::fs::File::create(output)
                .with_context(|| format!("Failed to create {}", output.display()))?;
            file.write_all(&data)?;
            info!("Wrote {} bytes to {}", data.len(), output.display());
        }
        Commands::Ls { image } => {
            let reader = open(image, &options)?;

            if let Some(label) = reader.directory().volume_label() {
                println!("Volume: {}\n", label);
            }
            println!("{:<12} {:>10} {:>8}  {}", "NAME", "SIZE", "CLUSTER", "ATTR");
            let mut count = 0;
            for entry in reader.entries() {
                let name = if entry.is_deleted() {
                    format!("?{}", entry.display_name().chars().skip(1).collect::<String>())
                } else {
                    entry.display_name()
                };
                println!(
                    "{:<12} {:>10} {:>8}  {}",
                    name,
                    entry.file_size,
                    entry.first_cluster(),
                    entry.attributes.to_string()
                );
                count += 1;
            }
            println!("\n{} entries", count);
        }
        Commands::Info { image, json } => {
            let reader = open(image, &options)?;
            let geometry = reader.geometry();

            if *json {
                println!("{}", serde_json::to_string_pretty(geometry)?);
            } else {
                println!("OEM name:            {}", geometry.oem_name);
                println!("Type:                {}", geometry.fat_type());
                println!("Bytes per sector:    {}", geometry.bytes_per_sector);
                println!("Sectors per cluster: {}", geometry.sectors_per_cluster);
                println!("Reserved sectors:    {}", geometry.reserved_sectors);
                println!("FATs:                {} x {} sectors", geometry.fat_count, geometry.sectors_per_fat);
                println!("Root entries:        {}", geometry.root_entry_count);
                println!("Total sectors:       {}", geometry.total_sectors);
                println!("Media descriptor:    {:#04x}", geometry.media_descriptor);
                println!("First data sector:   {}", geometry.first_data_sector());
                println!("Data clusters:       {}", geometry.data_cluster_count());
                let free = reader.fat().free_cluster_count(geometry.max_cluster())?;
                println!("Free clusters:       {}", free);
                if let Some(ext) = &geometry.extended {
                    println!("Volume serial:       {:08X}", ext.volume_serial);
                    if let Some(label) = &ext.volume_label {
                        println!("Volume label:        {}", label);
                    }
                }
            }
        }
    }

    Ok(())
}
