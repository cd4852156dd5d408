//! Musou CLI - Command-line tool for Koei Tecmo LINKDATA archive extraction.
//!
//! This is the main entry point for the musou command-line application.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use musou_linkdata::{GameProfile, LinkArchive};

/// Musou - Koei Tecmo LINKDATA archive extraction tool
#[derive(Parser)]
#[command(name = "musou")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every archive of a game install
    Extract {
        /// Game profile to use (e.g. orochi, dw5)
        #[arg(short, long, env = "MUSOU_GAME")]
        game: String,

        /// Install directory containing the archive files
        #[arg(short, long, env = "MUSOU_INSTALL_DIR")]
        install_dir: PathBuf,

        /// Output directory
        #[arg(short, long, env = "MUSOU_OUTPUT_DIR")]
        output: PathBuf,

        /// Decompress members on a worker pool
        #[arg(short, long)]
        parallel: bool,
    },

    /// List the members of a game's archives
    List {
        /// Game profile to use (e.g. orochi, dw5)
        #[arg(short, long, env = "MUSOU_GAME")]
        game: String,

        /// Install directory containing the archive files
        #[arg(short, long, env = "MUSOU_INSTALL_DIR")]
        install_dir: PathBuf,

        /// Show offsets, block sizes and compression
        #[arg(short, long)]
        detailed: bool,
    },

    /// List the supported game profiles
    Games,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            game,
            install_dir,
            output,
            parallel,
        } => {
            cmd_extract(&game, &install_dir, &output, parallel)?;
        }
        Commands::List {
            game,
            install_dir,
            detailed,
        } => {
            cmd_list(&game, &install_dir, detailed)?;
        }
        Commands::Games => {
            cmd_games();
        }
    }

    Ok(())
}

fn cmd_extract(game: &str, install_dir: &Path, output: &Path, parallel: bool) -> Result<()> {
    let profile = GameProfile::for_game(game)?;

    for archive_name in profile.archives {
        println!("Starting archive {}", archive_name);

        let start = Instant::now();
        let archive = LinkArchive::open(profile, install_dir.join(archive_name))
            .with_context(|| format!("Failed to open archive {}", archive_name))?;

        let out_dir = output.join(archive_name);
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;

        let pb = ProgressBar::new(archive.entry_count() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
                .progress_chars("#>-"),
        );

        let mut compressed_count = 0usize;
        let sink = |id: usize, compressed: bool, data: &[u8]| -> io::Result<()> {
            if compressed {
                compressed_count += 1;
            }
            fs::write(out_dir.join(format!("{}.bin", id)), data)?;
            pb.inc(1);
            Ok(())
        };

        if parallel {
            archive.extract_parallel(sink)
        } else {
            archive.extract(sink)
        }
        .with_context(|| format!("Failed to extract archive {}", archive_name))?;

        pb.finish_with_message("Done");
        println!(
            "Extracted {} entries ({} compressed) in {:?}",
            archive.entry_count(),
            compressed_count,
            start.elapsed()
        );
    }

    Ok(())
}

fn cmd_list(game: &str, install_dir: &Path, detailed: bool) -> Result<()> {
    let profile = GameProfile::for_game(game)?;

    for archive_name in profile.archives {
        let archive = LinkArchive::open(profile, install_dir.join(archive_name))
            .with_context(|| format!("Failed to open archive {}", archive_name))?;

        println!("{}: {} entries", archive.name(), archive.entry_count());

        for (id, entry) in archive.entries().iter().enumerate() {
            if detailed {
                let compressed = archive.is_entry_compressed(id)?;
                println!(
                    "{:>6} {:>12} {:>12} {:>12} {}",
                    id,
                    entry.offset,
                    entry.size,
                    entry.block_size,
                    if compressed { "LZP2" } else { "" }
                );
            } else {
                println!("{:>6} {:>12}", id, entry.size);
            }
        }

        println!();
    }

    Ok(())
}

fn cmd_games() {
    for profile in GameProfile::all() {
        println!(
            "{:<8} archives: {}",
            profile.name,
            profile.archives.join(", ")
        );
    }
}
