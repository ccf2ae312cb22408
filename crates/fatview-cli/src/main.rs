//! fatview - interactive FAT12 disk image explorer
//!
//! Loads a FAT12 volume into memory and drops into a prompt for browsing
//! the directory tree, inspecting metadata, and extracting files.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;
use fatview_core::Error;
use fatview_volume::{entry, DirEntry, Volume};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fatview")]
#[command(about = "Read-only explorer for FAT12 disk images", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Path to the FAT12 disk image
    image: PathBuf,

    /// Log filter (overridden by RUST_LOG)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let cli = Cli::try_parse().unwrap_or_else(|err| {
        let _ = err.print();
        process::exit(if err.use_stderr() { 1 } else { 0 });
    });

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone())),
        )
        .init();

    let mut volume = match Volume::load(&cli.image) {
        Ok(volume) => volume,
        Err(e) => {
            eprintln!("Couldn't open {}: {}", cli.image.display(), e);
            process::exit(1);
        }
    };
    tracing::debug!(image = %cli.image.display(), "volume loaded");

    if let Err(e) = shell(&mut volume) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// The prompt loop; returns on `exit` or end of input
fn shell(volume: &mut Volume) -> Result<()> {
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        if command == "exit" {
            break;
        }
        dispatch(volume, command, &mut words);
    }

    Ok(())
}

fn dispatch<'a>(volume: &mut Volume, command: &str, args: &mut impl Iterator<Item = &'a str>) {
    match command {
        "dir" => cmd_dir(volume),
        "cd" => match args.next() {
            Some(path) => cmd_cd(volume, path),
            None => println!("  No argument supplied!"),
        },
        "pwd" => println!("  Current directory: {}", volume.pwd()),
        "cat" => match args.next() {
            Some(path) => cmd_cat(volume, path),
            None => println!("  No argument supplied!"),
        },
        "get" => match args.next() {
            Some(path) => cmd_get(volume, path),
            None => println!("  No argument supplied!"),
        },
        "zip" => match (args.next(), args.next(), args.next()) {
            (Some(first), Some(second), Some(output)) => cmd_zip(volume, first, second, output),
            _ => println!("  Not enough arguments supplied!"),
        },
        "rootinfo" => cmd_rootinfo(volume),
        "spaceinfo" => cmd_spaceinfo(volume),
        "volinfo" => cmd_volinfo(volume),
        "fileinfo" => match args.next() {
            Some(path) => cmd_fileinfo(volume, path),
            None => println!("  No argument supplied!"),
        },
        "tree" => show_directory(volume, None, 1, true),
        "help" => cmd_help(),
        _ => println!(
            "  Unknown command '{}', type help for a list of available commands",
            command
        ),
    }
}

fn cmd_dir(volume: &mut Volume) {
    let current = volume.current_dir().cloned();
    show_directory(volume, current.as_ref(), 1, false);
}

/// Print one directory's entries, optionally recursing into
/// subdirectories. Dot entries are real on-disk entries but stay hidden.
fn show_directory(volume: &Volume, dir: Option<&DirEntry>, indent: usize, recursive: bool) {
    let entries = match volume.list_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            println!("  Couldn't read entries cluster! ({})", e);
            return;
        }
    };

    for entry in entries {
        let name = entry.display_name();
        if name.starts_with('.') {
            continue;
        }
        print!("{}", "   ".repeat(indent));
        print!(
            "{}  ",
            format_full_date(entry.creation_time, entry.creation_date)
        );
        if entry.is_directory() {
            print!("<DIRECTORY>");
        } else {
            print!("{} bytes", entry.file_size);
        }
        println!("  {}", name);

        if recursive && entry.is_directory() {
            show_directory(volume, Some(&entry), indent + 1, true);
        }
    }
}

fn cmd_cd(volume: &mut Volume, path: &str) {
    match volume.change_directory(path) {
        Ok(()) => {}
        Err(Error::NotADirectory(_)) => println!("  {} is not a directory.", path),
        Err(Error::DepthExceeded) => println!("  Max depth reached!"),
        Err(_) => println!("  {} doesn't exist.", path),
    }
}

/// Resolve a path to a plain file, with the C-shell style diagnostics
fn fetch_file(volume: &mut Volume, path: &str) -> Option<DirEntry> {
    let handle = match volume.open_file(path) {
        Ok(handle) => handle,
        Err(_) => {
            println!("  {} not found.", path);
            return None;
        }
    };
    let entry = handle.entry().cloned()?;
    if entry.is_directory() {
        println!("  Cannot read {} because it's a directory.", path);
        return None;
    }
    Some(entry)
}

fn cmd_cat(volume: &mut Volume, path: &str) {
    let Some(entry) = fetch_file(volume, path) else {
        return;
    };
    match volume.contents_of(Some(&entry)) {
        Ok(contents) => println!("{}", String::from_utf8_lossy(&contents)),
        Err(e) => println!("  Couldn't read {}: {}", path, e),
    }
}

fn cmd_get(volume: &mut Volume, path: &str) {
    let Some(entry) = fetch_file(volume, path) else {
        return;
    };
    let contents = match volume.contents_of(Some(&entry)) {
        Ok(contents) => contents,
        Err(e) => {
            println!("  Couldn't read {}: {}", path, e);
            return;
        }
    };

    let filename = entry.display_name();
    match fs::write(&filename, &contents) {
        Ok(()) => println!("  {} successfully copied to disk.", filename),
        Err(_) => println!("  Couldn't create {}.", filename),
    }
}

fn cmd_zip(volume: &mut Volume, first: &str, second: &str, output: &str) {
    let (Some(entry1), Some(entry2)) = (
        fetch_entry_quiet(volume, first),
        fetch_entry_quiet(volume, second),
    ) else {
        println!("  Couldn't find files");
        return;
    };
    if entry1.is_directory() || entry2.is_directory() {
        println!("  Cannot zip a directory.");
        return;
    }

    let contents = volume
        .contents_of(Some(&entry1))
        .and_then(|a| volume.contents_of(Some(&entry2)).map(|b| (a.into_owned(), b)));
    let (content1, content2) = match contents {
        Ok((a, b)) => (a, b),
        Err(_) => {
            println!("  Couldn't read file contents!");
            return;
        }
    };

    let zipped = interleave_lines(
        &String::from_utf8_lossy(&content1),
        &String::from_utf8_lossy(&content2),
    );
    match fs::write(output, zipped) {
        Ok(()) => println!("  Successfully zipped files."),
        Err(_) => println!("  Couldn't open {}", output),
    }
}

fn fetch_entry_quiet(volume: &mut Volume, path: &str) -> Option<DirEntry> {
    let handle = volume.open_file(path).ok()?;
    handle.entry().cloned()
}

/// Alternate the lines of two texts, each line newline-terminated, until
/// both run dry
fn interleave_lines(a: &str, b: &str) -> String {
    let mut out = String::new();
    let mut lines_a = a.split('\n');
    let mut lines_b = b.split('\n');
    loop {
        let (la, lb) = (lines_a.next(), lines_b.next());
        if la.is_none() && lb.is_none() {
            break;
        }
        if let Some(line) = la {
            out.push_str(line);
            out.push('\n');
        }
        if let Some(line) = lb {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

fn cmd_rootinfo(volume: &Volume) {
    let max_entries = volume.boot().max_root_entries;
    let entries = match volume.root_entry_count() {
        Ok(count) => count,
        Err(e) => {
            println!("  Couldn't read the root directory: {}", e);
            return;
        }
    };
    let percentage = entries as f64 / max_entries as f64 * 100.0;
    println!("  Max entries in root directory {}", max_entries);
    println!("  Entries in root directory {}", entries);
    println!("  Root directory is {:.2}% full", percentage);
}

fn cmd_spaceinfo(volume: &Volume) {
    let stats = match volume.fat().stats() {
        Ok(stats) => stats,
        Err(e) => {
            println!("  Couldn't scan the FAT: {}", e);
            return;
        }
    };
    let boot = volume.boot();
    println!("  Currently there are");
    println!("    {} used entries", stats.used);
    println!("    {} free entries", stats.free);
    println!("    {} bad entries", stats.bad);
    println!("    {} entries ending a cluster chain", stats.terminal);
    println!(
        "  Each cluster is {} sectors ({} bytes) long",
        boot.sectors_per_cluster,
        boot.cluster_size()
    );
}

fn cmd_volinfo(volume: &Volume) {
    let boot = volume.boot();
    println!("  OEM {}", boot.oem_name());
    println!("  Bytes per sector {}", boot.bytes_per_sector);
    println!("  Reserved area in sectors {}", boot.reserved_sectors);
    println!("  Number of sectors {}", boot.total_sectors());
    println!("  Number of heads {}", boot.head_count);
    println!("  Sectors per cluster {}", boot.sectors_per_cluster);
    println!("  Max files in root directory {}", boot.max_root_entries);
    println!("  Number of FATs {}", boot.fat_count);
    println!("  Size of FAT in sectors {}", boot.fat_size_sectors);
    println!("  Volume label {}", boot.label());
    println!("  File system type {}", boot.system_type_label());
}

fn cmd_fileinfo(volume: &mut Volume, path: &str) {
    let (resolved, parent) = match volume.locate(path) {
        Ok(located) => located,
        Err(_) => {
            println!("  {} not found.", path);
            return;
        }
    };
    let Some(entry) = resolved.entry() else {
        println!("  {} not found.", path);
        return;
    };

    println!("  Full name: {}{}", parent, entry.display_name());

    let mut attributes = Vec::new();
    if entry.is_read_only() {
        attributes.push("READ ONLY");
    }
    if entry.is_hidden() {
        attributes.push("HIDDEN");
    }
    if entry.is_archive() {
        attributes.push("ARCHIVE");
    }
    if entry.is_directory() {
        attributes.push("DIRECTORY");
    }
    if entry.is_system() {
        attributes.push("SYSTEM FILE");
    }
    println!("  Attributes: {}", attributes.join(" "));

    if !entry.is_directory() {
        println!("  Size: {}", entry.file_size);
    }
    println!(
        "  Created: {}",
        format_full_date(entry.creation_time, entry.creation_date)
    );
    println!(
        "  Last modified: {}",
        format_full_date(entry.modified_time, entry.modified_date)
    );
    println!("  Last accessed: {}", format_date(entry.access_date));

    // walk as far as the chain is healthy, the way the chain counter does
    let mut chain = Vec::new();
    for cluster in volume.fat().chain(entry.first_cluster()) {
        match cluster {
            Ok(cluster) => chain.push(cluster.to_string()),
            Err(_) => break,
        }
    }
    println!("  Cluster chain: {}", chain.join(", "));
    println!("  Clusters: {}", chain.len());
}

fn cmd_help() {
    println!("  Available commands:");
    println!("    exit - terminates the program");
    println!("    dir - list current directory's files and folders");
    println!("    cd <directory> - enter directory");
    println!("    pwd - print working directory");
    println!("    cat <filename> - print file's contents");
    println!("    get <filename> - copy file's contents to local folder");
    println!("    zip <filename1> <filename2> <output_name> - save files' contents to output");
    println!("    rootinfo - print information about the root directory");
    println!("    spaceinfo - print information about the disk image");
    println!("    volinfo - print information about the boot sector");
    println!("    fileinfo <filename> - print information about the file");
    println!("    tree - show contents of the whole image");
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn format_time(time: u16) -> String {
    let raw = entry::decode_time(time);
    format!("{}:{:02}:{:02}", raw.hours, raw.minutes, raw.seconds)
}

fn format_date(date: u16) -> String {
    let raw = entry::decode_date(date);
    if !raw.is_valid() {
        return "Invalid date!".to_string();
    }
    format!("{} {} {}", MONTHS[raw.month as usize - 1], raw.day, raw.year)
}

fn format_full_date(time: u16, date: u16) -> String {
    format!("{}, {}", format_time(time), format_date(date))
}
