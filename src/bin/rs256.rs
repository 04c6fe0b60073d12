//! rs256 - split a file into Reed-Solomon shards and rebuild it from any
//! sufficient subset

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use rs256::parallel::{self, DEFAULT_STRIPE_SIZE};
use rs256::payload;
use rs256::shard_file::{load_shard_set, shard_file_name, ShardFile};
use rs256::ReedSolomon;
use std::fs;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    let matches = Command::new("rs256")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Reed-Solomon erasure coding over GF(256)")
        .arg_required_else_help(true)
        .arg(
            Arg::new("threads")
                .short('t')
                .long("threads")
                .help("Number of CPU threads for computation (0 = auto-detect)")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .default_value("0")
                .global(true),
        )
        .arg(
            Arg::new("stripe_size")
                .long("stripe-size")
                .help("Bytes per shard handed to each worker")
                .value_name("BYTES")
                .value_parser(value_parser!(usize))
                .default_value("65536")
                .global(true),
        )
        .subcommand(
            Command::new("encode")
                .visible_alias("e")
                .about("Split a file into data and parity shards")
                .arg(
                    Arg::new("input")
                        .help("File to encode")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("data_shards")
                        .short('k')
                        .long("data-shards")
                        .help("Number of data shards")
                        .value_name("COUNT")
                        .value_parser(value_parser!(usize))
                        .default_value("4"),
                )
                .arg(
                    Arg::new("parity_shards")
                        .short('m')
                        .long("parity-shards")
                        .help("Number of parity shards")
                        .value_name("COUNT")
                        .value_parser(value_parser!(usize))
                        .default_value("2"),
                )
                .arg(
                    Arg::new("output_dir")
                        .short('o')
                        .long("output")
                        .help("Directory for shard files")
                        .value_name("DIR")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("decode")
                .visible_alias("d")
                .about("Rebuild the original file from a shard directory")
                .arg(
                    Arg::new("shard_dir")
                        .help("Directory holding shard files")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("Path of the rebuilt file")
                        .value_name("FILE")
                        .required(true),
                )
                .arg(
                    Arg::new("repair")
                        .long("repair")
                        .help("Also rewrite missing or corrupt shard files")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("verify")
                .visible_alias("v")
                .about("Check that every shard is present and parity matches")
                .arg(
                    Arg::new("shard_dir")
                        .help("Directory holding shard files")
                        .required(true)
                        .index(1),
                ),
        )
        .get_matches();

    let threads = *matches.get_one::<usize>("threads").unwrap_or(&0);
    if threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }
    let stripe_size = *matches
        .get_one::<usize>("stripe_size")
        .unwrap_or(&DEFAULT_STRIPE_SIZE);

    match matches.subcommand() {
        Some(("encode", sub)) => encode(sub, stripe_size),
        Some(("decode", sub)) => decode(sub, stripe_size),
        Some(("verify", sub)) => verify(sub, stripe_size),
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn path_arg(matches: &ArgMatches, name: &str) -> Result<PathBuf> {
    matches
        .get_one::<String>(name)
        .map(PathBuf::from)
        .with_context(|| format!("Missing argument {name}"))
}

fn encode(matches: &ArgMatches, stripe_size: usize) -> Result<()> {
    let input = path_arg(matches, "input")?;
    let output_dir = path_arg(matches, "output_dir")?;
    let data_shards = *matches.get_one::<usize>("data_shards").unwrap_or(&4);
    let parity_shards = *matches.get_one::<usize>("parity_shards").unwrap_or(&2);

    let codec = ReedSolomon::new(data_shards, parity_shards)?;
    let data = fs::read(&input).with_context(|| format!("Failed to read {:?}", input))?;

    // The header keeps the real length; the wrapper zero-pads the last shard
    let shards = payload::encode_padded(&codec, &data, stripe_size)?;
    let shard_len = shards[0].len();

    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {:?}", output_dir))?;
    write_shards(&output_dir, &codec, data.len(), &shards, None)?;

    println!(
        "Encoded {} bytes into {} data + {} parity shards of {} bytes in {:?}",
        data.len(),
        data_shards,
        parity_shards,
        shard_len,
        output_dir
    );
    Ok(())
}

fn decode(matches: &ArgMatches, stripe_size: usize) -> Result<()> {
    let shard_dir = path_arg(matches, "shard_dir")?;
    let output = path_arg(matches, "output")?;
    let repair = matches.get_flag("repair");

    let mut set = load_shard_set(&shard_dir)?;
    let codec = ReedSolomon::new(set.data_shards, set.parity_shards)?;

    let missing: Vec<usize> = (0..set.present.len()).filter(|&i| !set.present[i]).collect();
    if !missing.is_empty() {
        println!("Rebuilding shards {:?}", missing);
    }
    let data = payload::decode_striped(
        &codec,
        &mut set.shards,
        &set.present,
        set.original_len,
        stripe_size,
    )?;
    fs::write(&output, &data).with_context(|| format!("Failed to write {:?}", output))?;

    if repair && !missing.is_empty() {
        write_shards(&shard_dir, &codec, set.original_len, &set.shards, Some(set.present.as_slice()))?;
        println!("Rewrote {} shard files", missing.len());
    }

    println!("Decoded {} bytes to {:?}", data.len(), output);
    Ok(())
}

fn verify(matches: &ArgMatches, stripe_size: usize) -> Result<()> {
    let shard_dir = path_arg(matches, "shard_dir")?;

    let set = load_shard_set(&shard_dir)?;
    let codec = ReedSolomon::new(set.data_shards, set.parity_shards)?;
    let shard_len = set.shards[0].len();

    let missing = set.present.iter().filter(|&&p| !p).count();
    if missing > 0 {
        let verdict = if codec.config().can_recover(missing) {
            "repairable"
        } else {
            "not repairable"
        };
        bail!(
            "{} of {} shards missing or corrupt ({})",
            missing,
            codec.total_shard_count(),
            verdict
        );
    }

    if !parallel::is_parity_correct(&codec, &set.shards, 0, shard_len, stripe_size)? {
        bail!("Parity does not match data shards");
    }

    println!("All {} shards verified", codec.total_shard_count());
    Ok(())
}

/// Save every shard not flagged in `skip`
fn write_shards(
    dir: &Path,
    codec: &ReedSolomon,
    original_len: usize,
    shards: &[Vec<u8>],
    skip: Option<&[bool]>,
) -> Result<()> {
    for (index, shard) in shards.iter().enumerate() {
        if skip.is_some_and(|present| present[index]) {
            continue;
        }
        ShardFile::new(
            codec.data_shard_count() as u16,
            codec.parity_shard_count() as u16,
            index as u16,
            original_len as u64,
            shard.clone(),
        )
        .save(&dir.join(shard_file_name(index)))?;
    }
    Ok(())
}
