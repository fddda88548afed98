use clap::{Arg, App, SubCommand};

use std::io::Write;

use lumpfs::sort::{parse_order, DEFAULT_ORDER};
use lumpfs::{Error, FsConfig, VirtualFileSystem, ListOptions, CheckOptions, DumpOptions};

fn init_logging(verbosity: u64) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn split_pair<'a>(name: &'static str, value: &'a str) -> lumpfs::Result<(&'a str, &'a str)> {
    match value.find('=') {
        Some(index) if index > 0 && index + 1 < value.len() => Ok((&value[..index], &value[index + 1..])),
        _ => Err(Error::illegal_argument(name, value)),
    }
}

fn get_filter<'a>(args: &'a clap::ArgMatches) -> Option<Vec<&'a str>> {
    let paths: Vec<&str> = args.values_of("paths")?.collect();
    if paths.is_empty() {
        None
    } else {
        Some(paths)
    }
}

/// Builds the file system from the global arguments: startup files are game
/// resources, the other files are add-ons loaded after them.
fn open_fs(matches: &clap::ArgMatches) -> lumpfs::Result<VirtualFileSystem> {
    let config = match matches.value_of("base") {
        Some(base) => FsConfig::with_base_path(base),
        None => FsConfig::default(),
    };

    let mut fs = VirtualFileSystem::new(config);
    fs.init()?;

    if let Some(values) = matches.values_of("map-dir") {
        for value in values {
            let (source, destination) = split_pair("--map-dir", value)?;
            fs.add_directory_mapping(source, destination)?;
        }
    }

    fs.begin_startup()?;
    if let Some(paths) = matches.values_of("startup") {
        for path in paths {
            let id = fs.add_file(path)?;
            fs.set_custom(id, false)?;
        }
    }
    fs.end_startup()?;

    if let Some(paths) = matches.values_of("file") {
        for path in paths {
            if let Err(error) = fs.add_file(path) {
                if !error.kind().is_recoverable() {
                    return Err(error);
                }
                tracing::warn!("skipping {}: {}", path, error);
            }
        }
    }

    if let Some(values) = matches.values_of("map-lump") {
        for value in values {
            let (path, lump) = split_pair("--map-lump", value)?;
            fs.add_lump_mapping(lump, path)?;
        }
    }

    Ok(fs)
}

fn run() -> lumpfs::Result<()> {
    let app = App::new("lumpfs")
        .version("0.1")
        .about("Layered virtual file system over WAD and PK3 files")

        .arg(Arg::with_name("base").long("base").short("b").takes_value(true).env("LUMPFS_BASE")
            .help("base directory relative paths are resolved against"))
        .arg(Arg::with_name("startup").long("startup").short("s").takes_value(true).multiple(true).number_of_values(1)
            .help("game resource loaded as startup file"))
        .arg(Arg::with_name("file").long("file").short("f").takes_value(true).multiple(true).number_of_values(1)
            .help("add-on file loaded after the startup files"))
        .arg(Arg::with_name("map-dir").long("map-dir").takes_value(true).multiple(true).number_of_values(1)
            .value_name("SOURCE=DEST")
            .help("make native directory SOURCE visible as DEST"))
        .arg(Arg::with_name("map-lump").long("map-lump").takes_value(true).multiple(true).number_of_values(1)
            .value_name("PATH=LUMP")
            .help("make virtual PATH resolve to lump LUMP"))
        .arg(Arg::with_name("verbose").long("verbose").short("v").multiple(true).takes_value(false))

        .subcommand(SubCommand::with_name("list")
            .alias("l")
            .about("list the lumps in load order")
            .arg(Arg::with_name("sort").long("sort").short("s").takes_value(true))
            .arg(Arg::with_name("human-readable").long("human-readable").short("h").takes_value(false))
            .arg(Arg::with_name("paths").index(1).multiple(true)))

        .subcommand(SubCommand::with_name("files")
            .about("list the loaded files")
            .arg(Arg::with_name("human-readable").long("human-readable").short("h").takes_value(false)))

        .subcommand(SubCommand::with_name("find")
            .about("find paths matching a wildcard pattern")
            .arg(Arg::with_name("pattern").index(1).required(true)))

        .subcommand(SubCommand::with_name("lookup")
            .about("print the lump a name resolves to")
            .arg(Arg::with_name("name").index(1).required(true)))

        .subcommand(SubCommand::with_name("cat")
            .about("write a resolved file to stdout")
            .arg(Arg::with_name("native").long("native").short("n").takes_value(false))
            .arg(Arg::with_name("path").index(1).required(true)))

        .subcommand(SubCommand::with_name("check")
            .alias("c")
            .arg(Arg::with_name("verbose").long("verbose").short("v").takes_value(false))
            .arg(Arg::with_name("stop-on-error").long("stop-on-error").takes_value(false))
            .arg(Arg::with_name("human-readable").long("human-readable").short("h").takes_value(false))
            .arg(Arg::with_name("paths").index(1).multiple(true)))

        .subcommand(SubCommand::with_name("dump")
            .alias("x")
            .arg(Arg::with_name("outdir").long("outdir").short("o").takes_value(true))
            .arg(Arg::with_name("verbose").long("verbose").short("v").takes_value(false))
            .arg(Arg::with_name("check").long("check").short("c").takes_value(false))
            .arg(Arg::with_name("paths").index(1).multiple(true)))

        .subcommand(SubCommand::with_name("crc")
            .about("print the checksum and names of the loaded game files"));

    let matches = match app.get_matches_safe() {
        Ok(matches) => matches,
        Err(error) => match error.kind {
            clap::ErrorKind::HelpDisplayed | clap::ErrorKind::VersionDisplayed => error.exit(),
            _ => return Err(error.into()),
        },
    };

    init_logging(matches.occurrences_of("verbose"));

    let mut fs = open_fs(&matches)?;

    match matches.subcommand() {
        ("list", Some(args)) => {
            let order = match args.value_of("sort") {
                Some(order) => Some(parse_order(order)?),
                None => None,
            };
            let order = match &order {
                Some(order) => &order[..],
                None => &DEFAULT_ORDER[..],
            };
            let filter = get_filter(args);

            lumpfs::list(&fs, ListOptions {
                order,
                human_readable: args.is_present("human-readable"),
                filter: filter.as_deref(),
            })?;
        },
        ("files", Some(args)) => {
            lumpfs::list_files(&fs, args.is_present("human-readable"))?;
        },
        ("find", Some(args)) => {
            let pattern = args.value_of("pattern").unwrap_or("*");
            for path in fs.find_all_paths(pattern) {
                println!("{}", path);
            }
        },
        ("lookup", Some(args)) => {
            let name = args.value_of("name").unwrap_or("");
            match fs.lump_num_for_name(name) {
                Some(lump_num) => {
                    let entry = fs.lump(lump_num)?;
                    println!("{}  {}  {}", lump_num, entry.path(), fs.lump_source_file(lump_num)?);
                },
                None => return Err(Error::not_found(name)),
            }
        },
        ("cat", Some(args)) => {
            let path = args.value_of("path").unwrap_or("");
            let mode = if args.is_present("native") { "rbf" } else { "rb" };
            let mut handle = fs.open_file(path, mode)?;
            let mut stdout = std::io::stdout();
            std::io::copy(&mut handle, &mut stdout)?;
            stdout.flush()?;
            fs.close(handle);
        },
        ("check", Some(args)) => {
            let verbose = args.is_present("verbose");
            let filter  = get_filter(args);

            lumpfs::check(&fs, CheckOptions {
                verbose,
                stop_on_error:  args.is_present("stop-on-error"),
                human_readable: args.is_present("human-readable"),
                filter: filter.as_deref(),
            })?;

            if verbose {
                println!("everything ok");
            }
        },
        ("dump", Some(args)) => {
            let outdir = args.value_of("outdir").unwrap_or(".");
            let filter = get_filter(args);

            lumpfs::dump(&fs, outdir, DumpOptions {
                filter: filter.as_deref(),
                verbose: args.is_present("verbose"),
                check:   args.is_present("check"),
            })?;
        },
        ("crc", Some(_)) => {
            println!("CRC:   0x{:08x}", fs.loaded_files_crc());
            println!("IWAD:  {}", fs.iwad_file_name().unwrap_or_default());
            println!("PWADs: {}", fs.pwad_file_names(';'));
        },
        ("", _) => {
            return Err(Error::other(
                "subcommand required\n\
                 For more information try --help"
            ));
        },
        (cmd, _) => {
            return Err(Error::other(format!(
                "unknown subcommand: {}\n\
                 For more information try --help",
                 cmd
            )));
        }
    }

    fs.shutdown()?;

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        let _ = writeln!(std::io::stderr(), "{}", error);
        std::process::exit(1);
    }
}
